//! Centralized configuration for token issuance.
//!
//! Configuration is loaded once from environment variables, validated, and
//! then shared read-only with the issuer. `Config` also serves as the
//! reference TTL, issuer URL and separator resolver.

use crate::error::IssuanceError;
use crate::resolver::{IssuerUrlResolver, SeparatorResolver, TtlResolver};
use crate::telemetry::TracingConfig;
use std::collections::HashMap;
use std::env;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Separator used for multi-valued attributes when a tenant configures none.
pub const DEFAULT_MULTI_ATTRIBUTE_SEPARATOR: &str = ",";

/// Token lifetime used when no TTL is configured.
pub const DEFAULT_TTL: Duration = Duration::from_secs(900);

/// JWS signature algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SignatureAlgorithm {
    /// Unsecured JWS with an empty signature segment
    None,
    /// RSASSA-PKCS1-v1_5 with SHA-256
    RsaSha256,
}

impl SignatureAlgorithm {
    /// Algorithm code for the JWS `alg` header.
    #[must_use]
    pub const fn jws_code(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::RsaSha256 => "RS256",
        }
    }

    /// Whether tokens carry a signature segment.
    #[must_use]
    pub const fn is_signed(&self) -> bool {
        matches!(self, Self::RsaSha256)
    }
}

impl FromStr for SignatureAlgorithm {
    type Err = IssuanceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "NONE" => Ok(Self::None),
            "RS256" | "SHA256WITHRSA" => Ok(Self::RsaSha256),
            _ => Err(IssuanceError::unsupported_algorithm(s)),
        }
    }
}

impl fmt::Display for SignatureAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.jws_code())
    }
}

/// Token issuance configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Issuer URL placed in the `iss` claim
    pub issuer_url: Option<String>,
    /// Signature algorithm for every issued token
    pub signature_algorithm: SignatureAlgorithm,
    /// Token lifetime for tenants without an override
    pub default_ttl: Duration,
    /// Multi-valued attribute separator for tenants without an override
    pub multi_attribute_separator: String,
    /// Per-tenant token lifetimes
    pub tenant_ttls: HashMap<String, Duration>,
    /// Per-tenant attribute separators
    pub tenant_separators: HashMap<String, String>,
    /// Logging configuration
    pub tracing: TracingConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            issuer_url: None,
            signature_algorithm: SignatureAlgorithm::RsaSha256,
            default_ttl: DEFAULT_TTL,
            multi_attribute_separator: DEFAULT_MULTI_ATTRIBUTE_SEPARATOR.to_string(),
            tenant_ttls: HashMap::new(),
            tenant_separators: HashMap::new(),
            tracing: TracingConfig::default().with_service_name("jws-issuer"),
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is present but invalid.
    pub fn from_env() -> Result<Self, IssuanceError> {
        dotenvy::dotenv().ok();
        Self::from_source(|name| env::var(name).ok())
    }

    /// Load configuration from an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns `UnsupportedAlgorithm` for an unknown `JWT_SIGNATURE_ALGORITHM`
    /// and `Configuration` for malformed numeric values.
    pub fn from_source<F>(lookup: F) -> Result<Self, IssuanceError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let issuer_url = lookup("JWT_ISSUER_URL").filter(|url| !url.trim().is_empty());

        let signature_algorithm = lookup("JWT_SIGNATURE_ALGORITHM")
            .unwrap_or_else(|| "SHA256withRSA".to_string())
            .parse::<SignatureAlgorithm>()?;

        let ttl_seconds: u64 = parse_var(&lookup, "JWT_TTL_SECONDS", DEFAULT_TTL.as_secs())?;
        if ttl_seconds == 0 {
            return Err(IssuanceError::config("JWT_TTL_SECONDS must be greater than zero"));
        }

        let multi_attribute_separator = lookup("JWT_MULTI_ATTRIBUTE_SEPARATOR")
            .filter(|sep| !sep.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_MULTI_ATTRIBUTE_SEPARATOR.to_string());

        let mut tracing = TracingConfig::default()
            .with_service_name("jws-issuer")
            .with_log_level(lookup("LOG_LEVEL").unwrap_or_else(|| "info".to_string()));
        if parse_var(&lookup, "LOG_JSON", false)? {
            tracing = tracing.with_json_output();
        }

        Ok(Self {
            issuer_url,
            signature_algorithm,
            default_ttl: Duration::from_secs(ttl_seconds),
            multi_attribute_separator,
            tenant_ttls: HashMap::new(),
            tenant_separators: HashMap::new(),
            tracing,
        })
    }

    /// Set the issuer URL.
    #[must_use]
    pub fn with_issuer_url(mut self, url: impl Into<String>) -> Self {
        self.issuer_url = Some(url.into());
        self
    }

    /// Set the signature algorithm.
    #[must_use]
    pub const fn with_signature_algorithm(mut self, algorithm: SignatureAlgorithm) -> Self {
        self.signature_algorithm = algorithm;
        self
    }

    /// Set the default token lifetime.
    #[must_use]
    pub const fn with_default_ttl(mut self, ttl: Duration) -> Self {
        self.default_ttl = ttl;
        self
    }

    /// Override the token lifetime for one tenant.
    #[must_use]
    pub fn with_tenant_ttl(mut self, tenant: impl Into<String>, ttl: Duration) -> Self {
        self.tenant_ttls.insert(tenant.into(), ttl);
        self
    }

    /// Override the multi-valued attribute separator for one tenant.
    #[must_use]
    pub fn with_tenant_separator(
        mut self,
        tenant: impl Into<String>,
        separator: impl Into<String>,
    ) -> Self {
        self.tenant_separators.insert(tenant.into(), separator.into());
        self
    }
}

impl TtlResolver for Config {
    fn resolve_ttl(&self, tenant: &str) -> Result<u64, IssuanceError> {
        let ttl = self.tenant_ttls.get(tenant).unwrap_or(&self.default_ttl);
        match ttl.as_secs() {
            0 => Err(IssuanceError::config(format!(
                "No usable TTL policy for tenant {tenant}"
            ))),
            secs => Ok(secs),
        }
    }
}

impl IssuerUrlResolver for Config {
    fn resolve_issuer_url(&self) -> Result<String, IssuanceError> {
        self.issuer_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .map(str::to_string)
            .ok_or_else(|| IssuanceError::config("Issuer URL is not configured"))
    }
}

impl SeparatorResolver for Config {
    fn resolve_separator(&self, tenant: &str) -> Option<String> {
        self.tenant_separators
            .get(tenant)
            .or(Some(&self.multi_attribute_separator))
            .cloned()
    }
}

/// Parse a variable with a default value.
fn parse_var<F, T>(lookup: &F, name: &str, default: T) -> Result<T, IssuanceError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: fmt::Display,
{
    match lookup(name) {
        Some(val) => val
            .trim()
            .parse()
            .map_err(|e| IssuanceError::config(format!("Invalid {name}: {e}"))),
        None => Ok(default),
    }
}
