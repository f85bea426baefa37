//! Error types for token issuance.
//!
//! Every failure is surfaced to the caller as a distinct variant. Nothing
//! here is downgraded to an unsigned or partial token.

use thiserror::Error;

/// Token issuance error.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum IssuanceError {
    /// Issuer URL, TTL policy or another required setting is missing or invalid.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// No signing key or certificate is available for the tenant.
    #[error("No signing key available for tenant {tenant}")]
    KeyResolution {
        /// Tenant whose key lookup failed
        tenant: String,
    },

    /// The configured signature algorithm is not implemented.
    #[error("Unsupported signature algorithm: {0}")]
    UnsupportedAlgorithm(String),

    /// Header or claim set could not be serialized.
    #[error("Encoding error: {0}")]
    Encoding(String),

    /// The signing operation itself failed.
    #[error("Signing error: {0}")]
    Signing(String),
}

impl IssuanceError {
    /// Creates a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Creates a key resolution error for a tenant.
    pub fn key_resolution(tenant: impl Into<String>) -> Self {
        Self::KeyResolution {
            tenant: tenant.into(),
        }
    }

    /// Creates an unsupported algorithm error.
    pub fn unsupported_algorithm(name: impl Into<String>) -> Self {
        Self::UnsupportedAlgorithm(name.into())
    }

    /// Creates an encoding error.
    pub fn encoding(msg: impl Into<String>) -> Self {
        Self::Encoding(msg.into())
    }

    /// Creates a signing error.
    pub fn signing(msg: impl Into<String>) -> Self {
        Self::Signing(msg.into())
    }

    /// Stable error code for logs and metrics labels.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Configuration(_) => TOKEN_CONFIGURATION_ERROR,
            Self::KeyResolution { .. } => TOKEN_KEY_RESOLUTION_ERROR,
            Self::UnsupportedAlgorithm(_) => TOKEN_UNSUPPORTED_ALGORITHM,
            Self::Encoding(_) => TOKEN_ENCODING_ERROR,
            Self::Signing(_) => TOKEN_SIGNING_ERROR,
        }
    }

    /// Whether a caller may reasonably retry the issuance.
    ///
    /// Key stores and signers can be transiently unavailable. Configuration,
    /// algorithm and encoding failures will fail the same way again.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::KeyResolution { .. } | Self::Signing(_))
    }
}

impl From<serde_json::Error> for IssuanceError {
    fn from(err: serde_json::Error) -> Self {
        Self::Encoding(err.to_string())
    }
}

// Error codes for structured logs and metrics
pub const TOKEN_CONFIGURATION_ERROR: &str = "TOKEN_CONFIGURATION_ERROR";
pub const TOKEN_KEY_RESOLUTION_ERROR: &str = "TOKEN_KEY_RESOLUTION_ERROR";
pub const TOKEN_UNSUPPORTED_ALGORITHM: &str = "TOKEN_UNSUPPORTED_ALGORITHM";
pub const TOKEN_ENCODING_ERROR: &str = "TOKEN_ENCODING_ERROR";
pub const TOKEN_SIGNING_ERROR: &str = "TOKEN_SIGNING_ERROR";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes_are_distinct() {
        let errors = [
            IssuanceError::config("x"),
            IssuanceError::key_resolution("t"),
            IssuanceError::unsupported_algorithm("HS256"),
            IssuanceError::encoding("x"),
            IssuanceError::signing("x"),
        ];
        let codes: std::collections::HashSet<_> = errors.iter().map(IssuanceError::code).collect();
        assert_eq!(codes.len(), errors.len());
    }

    #[test]
    fn test_retryability() {
        assert!(IssuanceError::key_resolution("carbon.super").is_retryable());
        assert!(IssuanceError::signing("hsm offline").is_retryable());
        assert!(!IssuanceError::config("missing issuer").is_retryable());
        assert!(!IssuanceError::unsupported_algorithm("HS256").is_retryable());
        assert!(!IssuanceError::encoding("bad").is_retryable());
    }

    #[test]
    fn test_display_includes_context() {
        let err = IssuanceError::key_resolution("wso2.com");
        assert_eq!(err.to_string(), "No signing key available for tenant wso2.com");

        let err = IssuanceError::unsupported_algorithm("HS256");
        assert_eq!(err.to_string(), "Unsupported signature algorithm: HS256");
    }
}
