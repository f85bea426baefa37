use crate::config::SignatureAlgorithm;
use crate::error::IssuanceError;
use crate::kms::SigningKey;
use crate::resolver::SigningKeyResolver;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};

/// Media type placed in the `typ` header.
pub const TOKEN_TYPE: &str = "JWT";

/// JWS protected header.
///
/// Members serialize in declaration order: `typ`, `alg`, then the
/// certificate binding members when present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JwsHeader {
    pub typ: String,
    pub alg: String,
    /// Base64url SHA-256 thumbprint of the signing certificate
    #[serde(rename = "x5t#S256", skip_serializing_if = "Option::is_none")]
    pub x5t_s256: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kid: Option<String>,
}

impl JwsHeader {
    /// Header for an unsecured token.
    pub fn unsigned() -> Self {
        Self {
            typ: TOKEN_TYPE.to_string(),
            alg: SignatureAlgorithm::None.jws_code().to_string(),
            x5t_s256: None,
            kid: None,
        }
    }

    /// Header bound to a signing certificate.
    pub fn certificate_bound(algorithm: SignatureAlgorithm, key: &SigningKey) -> Self {
        Self {
            typ: TOKEN_TYPE.to_string(),
            alg: algorithm.jws_code().to_string(),
            x5t_s256: Some(key.certificate_thumbprint()),
            kid: Some(key.key_id().to_string()),
        }
    }
}

/// Header plus the key it was bound to, if any.
#[derive(Debug)]
pub struct ComposedHeader {
    pub header: JwsHeader,
    pub signing_key: Option<Arc<SigningKey>>,
}

/// Builds the JWS header for the configured algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeaderComposer {
    algorithm: SignatureAlgorithm,
}

impl HeaderComposer {
    pub fn new(algorithm: SignatureAlgorithm) -> Self {
        Self { algorithm }
    }

    /// Creates a composer from a configured algorithm name.
    ///
    /// # Errors
    ///
    /// Returns `UnsupportedAlgorithm` for anything but `NONE` and RS256.
    pub fn for_algorithm_name(name: &str) -> Result<Self, IssuanceError> {
        Ok(Self::new(name.parse()?))
    }

    pub fn algorithm(&self) -> SignatureAlgorithm {
        self.algorithm
    }

    /// Composes the header for a tenant.
    ///
    /// Unsigned headers never touch the key resolver. Signed headers require
    /// the tenant's key; its absence is fatal.
    ///
    /// # Errors
    ///
    /// Returns `KeyResolution` when no key or no certificate is available
    /// for the tenant.
    pub async fn compose(
        &self,
        tenant: &str,
        keys: Option<&dyn SigningKeyResolver>,
    ) -> Result<ComposedHeader, IssuanceError> {
        match self.algorithm {
            SignatureAlgorithm::None => Ok(ComposedHeader {
                header: JwsHeader::unsigned(),
                signing_key: None,
            }),
            SignatureAlgorithm::RsaSha256 => {
                let keys = keys.ok_or_else(|| IssuanceError::key_resolution(tenant))?;
                let key = keys.resolve_signing_key(tenant).await?;
                if key.certificate_der().is_empty() {
                    warn!(tenant, kid = %key.key_id(), "Signing key has no certificate");
                    return Err(IssuanceError::key_resolution(tenant));
                }
                debug!(tenant, kid = %key.key_id(), "Bound header to signing certificate");

                Ok(ComposedHeader {
                    header: JwsHeader::certificate_bound(self.algorithm, &key),
                    signing_key: Some(key),
                })
            }
        }
    }
}
