//! RSASSA-PKCS1-v1_5 SHA-256 signer backed by `ring`.

use crate::error::IssuanceError;
use crate::kms::{Signer, SigningKey};
use async_trait::async_trait;
use ring::rand::SystemRandom;
use ring::signature::{RsaKeyPair, RSA_PKCS1_SHA256};

/// Local RS256 signer.
pub struct RsaSha256Signer {
    rng: SystemRandom,
}

impl RsaSha256Signer {
    /// Create a new signer.
    #[must_use]
    pub fn new() -> Self {
        Self {
            rng: SystemRandom::new(),
        }
    }
}

impl Default for RsaSha256Signer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Signer for RsaSha256Signer {
    async fn sign(&self, data: &[u8], key: &SigningKey) -> Result<Vec<u8>, IssuanceError> {
        let key_pair = RsaKeyPair::from_pkcs8(key.private_key_der()).map_err(|e| {
            IssuanceError::signing(format!("Key {} rejected: {e}", key.key_id()))
        })?;

        let mut signature = vec![0u8; key_pair.public().modulus_len()];
        key_pair
            .sign(&RSA_PKCS1_SHA256, &self.rng, data, &mut signature)
            .map_err(|_| IssuanceError::signing(format!("RS256 signing failed with key {}", key.key_id())))?;

        Ok(signature)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CERT_PEM: &str = include_str!("../../tests/fixtures/signing_cert.pem");
    const KEY_PEM: &str = include_str!("../../tests/fixtures/signing_key.pem");

    fn fixture_key() -> SigningKey {
        SigningKey::from_pem(Some("test-key"), CERT_PEM, KEY_PEM).unwrap()
    }

    #[tokio::test]
    async fn test_sign_produces_modulus_sized_signature() {
        let signer = RsaSha256Signer::new();
        let signature = signer.sign(b"header.payload", &fixture_key()).await.unwrap();

        assert_eq!(signature.len(), 256);
    }

    #[tokio::test]
    async fn test_pkcs1_signatures_are_deterministic() {
        let signer = RsaSha256Signer::new();
        let key = fixture_key();

        let sig1 = signer.sign(b"same data", &key).await.unwrap();
        let sig2 = signer.sign(b"same data", &key).await.unwrap();
        assert_eq!(sig1, sig2);

        let sig3 = signer.sign(b"other data", &key).await.unwrap();
        assert_ne!(sig1, sig3);
    }

    #[tokio::test]
    async fn test_malformed_private_key_is_a_signing_error() {
        let signer = RsaSha256Signer::new();
        let key = SigningKey::from_der("broken", vec![0x30, 0x00], vec![0x30, 0x00]);

        let err = signer.sign(b"data", &key).await.unwrap_err();
        assert!(matches!(err, IssuanceError::Signing(ref msg) if msg.contains("broken")));
    }
}
