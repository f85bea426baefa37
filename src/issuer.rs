//! Token issuance orchestration.
//!
//! One call composes the header, builds and normalizes the claims, encodes
//! both canonically and signs the result. Collaborators are shared
//! read-only, so a `TokenIssuer` can be cloned freely across tasks.

use crate::config::{Config, SignatureAlgorithm};
use crate::error::IssuanceError;
use crate::jwt::{
    AttributeNormalizer, CanonicalEncoder, ClaimSetBuilder, Clock, HeaderComposer,
    IssuanceRequest, SystemClock, TokenSigner,
};
use crate::kms::{RsaSha256Signer, Signer};
use crate::metrics;
use crate::resolver::{IssuerUrlResolver, SeparatorResolver, SigningKeyResolver, TtlResolver};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, instrument, warn};

/// Mints compact JWS access tokens.
#[derive(Clone)]
pub struct TokenIssuer {
    algorithm: SignatureAlgorithm,
    issuer_urls: Arc<dyn IssuerUrlResolver>,
    ttls: Arc<dyn TtlResolver>,
    separators: Arc<dyn SeparatorResolver>,
    keys: Option<Arc<dyn SigningKeyResolver>>,
    signer: Arc<dyn Signer>,
    clock: Arc<dyn Clock>,
}

impl TokenIssuer {
    /// Starts a builder for the given algorithm.
    pub fn builder(algorithm: SignatureAlgorithm) -> TokenIssuerBuilder {
        TokenIssuerBuilder::new(algorithm)
    }

    /// Issuer backed by a loaded configuration and a key store.
    ///
    /// # Errors
    ///
    /// Returns `Configuration` if the builder rejects the combination.
    pub fn from_config(
        config: Arc<Config>,
        keys: Arc<dyn SigningKeyResolver>,
    ) -> Result<Self, IssuanceError> {
        Self::builder(config.signature_algorithm)
            .config(config)
            .key_resolver(keys)
            .build()
    }

    pub fn algorithm(&self) -> SignatureAlgorithm {
        self.algorithm
    }

    /// Issues a token for the request.
    ///
    /// # Errors
    ///
    /// Propagates every collaborator failure unchanged. No token is returned
    /// unless every step succeeded.
    #[instrument(
        name = "issue_token",
        skip_all,
        fields(tenant = %request.tenant(), algorithm = %self.algorithm)
    )]
    pub async fn issue(&self, request: &IssuanceRequest) -> Result<String, IssuanceError> {
        let started = Instant::now();
        let result = self.issue_inner(request).await;

        match &result {
            Ok(_) => {
                metrics::record_issued(self.algorithm.jws_code(), started.elapsed().as_secs_f64());
                info!("Token issued");
            }
            Err(e) => {
                metrics::record_failure(e.code());
                warn!(error_code = e.code(), retryable = e.is_retryable(), error = %e, "Token issuance failed");
            }
        }

        result
    }

    async fn issue_inner(&self, request: &IssuanceRequest) -> Result<String, IssuanceError> {
        let tenant = request.tenant();

        let composed = HeaderComposer::new(self.algorithm)
            .compose(tenant, self.keys.as_deref())
            .await?;

        let ttl = self.ttls.resolve_ttl(tenant)?;
        let claims = ClaimSetBuilder::from_resolver(self.issuer_urls.as_ref())?
            .ttl_seconds(ttl)
            .issued_at(self.clock.now())
            .build(request)?;

        let normalizer = AttributeNormalizer::new(self.separators.resolve_separator(tenant));
        let claims = normalizer.normalize(claims);
        debug!(claims = claims.len(), ttl, separator = normalizer.separator(), "Built claim set");

        let header_segment = CanonicalEncoder::encode_header(&composed.header)?;
        let payload_segment = CanonicalEncoder::encode_claims(&claims)?;

        TokenSigner::select(self.algorithm, composed.signing_key, Arc::clone(&self.signer))?
            .sign_token(&header_segment, &payload_segment)
            .await
    }
}

/// Builder for [`TokenIssuer`].
pub struct TokenIssuerBuilder {
    algorithm: SignatureAlgorithm,
    issuer_urls: Option<Arc<dyn IssuerUrlResolver>>,
    ttls: Option<Arc<dyn TtlResolver>>,
    separators: Option<Arc<dyn SeparatorResolver>>,
    keys: Option<Arc<dyn SigningKeyResolver>>,
    signer: Option<Arc<dyn Signer>>,
    clock: Option<Arc<dyn Clock>>,
}

impl TokenIssuerBuilder {
    pub fn new(algorithm: SignatureAlgorithm) -> Self {
        Self {
            algorithm,
            issuer_urls: None,
            ttls: None,
            separators: None,
            keys: None,
            signer: None,
            clock: None,
        }
    }

    /// Uses the configuration for issuer URL, TTL and separator resolution.
    #[must_use]
    pub fn config(mut self, config: Arc<Config>) -> Self {
        self.issuer_urls = Some(Arc::clone(&config) as Arc<dyn IssuerUrlResolver>);
        self.ttls = Some(Arc::clone(&config) as Arc<dyn TtlResolver>);
        self.separators = Some(config as Arc<dyn SeparatorResolver>);
        self
    }

    #[must_use]
    pub fn issuer_url_resolver(mut self, resolver: Arc<dyn IssuerUrlResolver>) -> Self {
        self.issuer_urls = Some(resolver);
        self
    }

    #[must_use]
    pub fn ttl_resolver(mut self, resolver: Arc<dyn TtlResolver>) -> Self {
        self.ttls = Some(resolver);
        self
    }

    #[must_use]
    pub fn separator_resolver(mut self, resolver: Arc<dyn SeparatorResolver>) -> Self {
        self.separators = Some(resolver);
        self
    }

    #[must_use]
    pub fn key_resolver(mut self, resolver: Arc<dyn SigningKeyResolver>) -> Self {
        self.keys = Some(resolver);
        self
    }

    /// Replaces the default local RS256 signer.
    #[must_use]
    pub fn signer(mut self, signer: Arc<dyn Signer>) -> Self {
        self.signer = Some(signer);
        self
    }

    #[must_use]
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Builds the issuer.
    ///
    /// # Errors
    ///
    /// Returns `Configuration` if the issuer URL or TTL resolver is missing,
    /// or if a signed algorithm has no key resolver.
    pub fn build(self) -> Result<TokenIssuer, IssuanceError> {
        let issuer_urls = self
            .issuer_urls
            .ok_or_else(|| IssuanceError::config("Issuer URL resolver is required"))?;
        let ttls = self
            .ttls
            .ok_or_else(|| IssuanceError::config("TTL resolver is required"))?;

        if self.algorithm.is_signed() && self.keys.is_none() {
            return Err(IssuanceError::config(format!(
                "{} requires a signing key resolver",
                self.algorithm
            )));
        }

        Ok(TokenIssuer {
            algorithm: self.algorithm,
            issuer_urls,
            ttls,
            separators: self
                .separators
                .unwrap_or_else(|| Arc::new(DefaultSeparator)),
            keys: self.keys,
            signer: self
                .signer
                .unwrap_or_else(|| Arc::new(RsaSha256Signer::new())),
            clock: self.clock.unwrap_or_else(|| Arc::new(SystemClock)),
        })
    }
}

/// Separator resolver deferring to the default for every tenant.
struct DefaultSeparator;

impl SeparatorResolver for DefaultSeparator {
    fn resolve_separator(&self, _tenant: &str) -> Option<String> {
        None
    }
}
