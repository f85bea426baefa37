use crate::error::IssuanceError;
use crate::kms::SigningKey;
use crate::resolver::SigningKeyResolver;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Key store holding per-tenant signing keys in memory.
#[derive(Debug, Default, Clone)]
pub struct InMemoryKeyStore {
    keys: HashMap<String, Arc<SigningKey>>,
}

impl InMemoryKeyStore {
    /// Creates an empty key store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the signing key for a tenant, replacing any previous one.
    #[must_use]
    pub fn with_key(mut self, tenant: impl Into<String>, key: SigningKey) -> Self {
        self.keys.insert(tenant.into(), Arc::new(key));
        self
    }

    /// Number of tenants with a key.
    #[must_use]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Whether no tenant has a key.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

#[async_trait]
impl SigningKeyResolver for InMemoryKeyStore {
    async fn resolve_signing_key(&self, tenant: &str) -> Result<Arc<SigningKey>, IssuanceError> {
        let key = self
            .keys
            .get(tenant)
            .cloned()
            .ok_or_else(|| IssuanceError::key_resolution(tenant))?;

        debug!(tenant, key_id = %key.key_id(), "Resolved signing key");
        Ok(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_key(id: &str) -> SigningKey {
        SigningKey::from_der(id, vec![0x30, 0x03, 0x02, 0x01, 0x01], vec![0x30, 0x00])
    }

    #[tokio::test]
    async fn test_resolves_registered_tenant() {
        let store = InMemoryKeyStore::new().with_key("wso2.com", test_key("k1"));

        let key = store.resolve_signing_key("wso2.com").await.unwrap();
        assert_eq!(key.key_id(), "k1");
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_unknown_tenant_fails() {
        let store = InMemoryKeyStore::new().with_key("wso2.com", test_key("k1"));

        let err = store.resolve_signing_key("other.com").await.unwrap_err();
        assert!(matches!(err, IssuanceError::KeyResolution { ref tenant } if tenant == "other.com"));
    }

    #[tokio::test]
    async fn test_empty_store() {
        let store = InMemoryKeyStore::new();
        assert!(store.is_empty());
        assert!(store.resolve_signing_key("carbon.super").await.is_err());
    }

    #[tokio::test]
    async fn test_later_key_replaces_earlier() {
        let store = InMemoryKeyStore::new()
            .with_key("wso2.com", test_key("old"))
            .with_key("wso2.com", test_key("new"));

        let key = store.resolve_signing_key("wso2.com").await.unwrap();
        assert_eq!(key.key_id(), "new");
    }
}
