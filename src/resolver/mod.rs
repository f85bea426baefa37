//! Collaborator interfaces consulted during issuance.
//!
//! Configuration lookups are synchronous reads of already-loaded settings.
//! Key resolution may hit a key store, so it is async and fallible.

pub mod memory;

pub use memory::InMemoryKeyStore;

use crate::error::IssuanceError;
use crate::kms::SigningKey;
use async_trait::async_trait;
use std::sync::Arc;

/// Resolves the token lifetime for a tenant.
pub trait TtlResolver: Send + Sync {
    /// Token lifetime in seconds.
    ///
    /// # Errors
    ///
    /// Returns `Configuration` when no usable TTL policy exists.
    fn resolve_ttl(&self, tenant: &str) -> Result<u64, IssuanceError>;
}

/// Resolves the issuer URL placed in the `iss` claim.
pub trait IssuerUrlResolver: Send + Sync {
    /// Issuer URL of the key manager.
    ///
    /// # Errors
    ///
    /// Returns `Configuration` when the URL is not configured.
    fn resolve_issuer_url(&self) -> Result<String, IssuanceError>;
}

/// Resolves the multi-valued attribute separator for a tenant.
pub trait SeparatorResolver: Send + Sync {
    /// Configured separator, or `None` to use the default.
    fn resolve_separator(&self, tenant: &str) -> Option<String>;
}

/// Resolves certificate and private key material for a tenant.
#[async_trait]
pub trait SigningKeyResolver: Send + Sync {
    /// Signing key for the tenant.
    ///
    /// # Errors
    ///
    /// Returns `KeyResolution` when the tenant has no key.
    async fn resolve_signing_key(&self, tenant: &str) -> Result<Arc<SigningKey>, IssuanceError>;
}
