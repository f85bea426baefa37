//! Signing key material and the signing primitive.

pub mod rsa;

pub use rsa::RsaSha256Signer;

use crate::error::IssuanceError;
use async_trait::async_trait;
use sha2::{Digest, Sha256};
use std::fmt;
use zeroize::Zeroizing;

/// Certificate-bound private key used for asymmetric signing.
pub struct SigningKey {
    key_id: String,
    certificate_der: Vec<u8>,
    private_key_der: Zeroizing<Vec<u8>>,
}

impl SigningKey {
    /// Creates a key from a DER certificate and a PKCS#8 DER private key.
    ///
    /// The private key is not validated here; a malformed key surfaces as a
    /// signing error at issuance time.
    #[must_use]
    pub fn from_der(
        key_id: impl Into<String>,
        certificate_der: Vec<u8>,
        private_key_der: Vec<u8>,
    ) -> Self {
        Self {
            key_id: key_id.into(),
            certificate_der,
            private_key_der: Zeroizing::new(private_key_der),
        }
    }

    /// Creates a key from PEM text.
    ///
    /// When `key_id` is `None` the certificate thumbprint is used.
    ///
    /// # Errors
    ///
    /// Returns `Configuration` if either document is not valid PEM or has
    /// the wrong label.
    pub fn from_pem(
        key_id: Option<&str>,
        certificate_pem: &str,
        private_key_pem: &str,
    ) -> Result<Self, IssuanceError> {
        let certificate_der = parse_pem(certificate_pem, "CERTIFICATE")?;
        let private_key_der = parse_pem(private_key_pem, "PRIVATE KEY")?;

        let key_id = match key_id {
            Some(id) => id.to_string(),
            None => thumbprint(&certificate_der),
        };

        Ok(Self::from_der(key_id, certificate_der, private_key_der))
    }

    /// Key identifier for the `kid` header.
    #[must_use]
    pub fn key_id(&self) -> &str {
        &self.key_id
    }

    /// DER-encoded X.509 certificate.
    #[must_use]
    pub fn certificate_der(&self) -> &[u8] {
        &self.certificate_der
    }

    /// PKCS#8 DER-encoded private key.
    #[must_use]
    pub fn private_key_der(&self) -> &[u8] {
        &self.private_key_der
    }

    /// Base64url SHA-256 thumbprint of the certificate (`x5t#S256`).
    #[must_use]
    pub fn certificate_thumbprint(&self) -> String {
        thumbprint(&self.certificate_der)
    }
}

impl fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SigningKey")
            .field("key_id", &self.key_id)
            .field("certificate_der", &format_args!("{} bytes", self.certificate_der.len()))
            .field("private_key_der", &"[REDACTED]")
            .finish()
    }
}

/// Signs the JWS signing input with a resolved key.
#[async_trait]
pub trait Signer: Send + Sync {
    /// Sign data and return signature bytes.
    ///
    /// # Errors
    ///
    /// Returns `Signing` when the key is unusable or the operation fails.
    async fn sign(&self, data: &[u8], key: &SigningKey) -> Result<Vec<u8>, IssuanceError>;
}

fn thumbprint(der: &[u8]) -> String {
    let hash = Sha256::digest(der);
    base64::Engine::encode(&base64::engine::general_purpose::URL_SAFE_NO_PAD, hash)
}

fn parse_pem(text: &str, expected_tag: &str) -> Result<Vec<u8>, IssuanceError> {
    let parsed = pem::parse(text)
        .map_err(|e| IssuanceError::config(format!("Invalid {expected_tag} PEM: {e}")))?;

    if parsed.tag() != expected_tag {
        return Err(IssuanceError::config(format!(
            "Expected {expected_tag} PEM, found {}",
            parsed.tag()
        )));
    }

    Ok(parsed.into_contents())
}

#[cfg(test)]
mod tests {
    use super::*;

    const CERT_PEM: &str = include_str!("../../tests/fixtures/signing_cert.pem");
    const KEY_PEM: &str = include_str!("../../tests/fixtures/signing_key.pem");

    #[test]
    fn test_from_pem_with_explicit_kid() {
        let key = SigningKey::from_pem(Some("gateway-key"), CERT_PEM, KEY_PEM).unwrap();

        assert_eq!(key.key_id(), "gateway-key");
        assert!(!key.certificate_der().is_empty());
        assert!(!key.private_key_der().is_empty());
    }

    #[test]
    fn test_from_pem_defaults_kid_to_thumbprint() {
        let key = SigningKey::from_pem(None, CERT_PEM, KEY_PEM).unwrap();
        assert_eq!(key.key_id(), key.certificate_thumbprint());
    }

    #[test]
    fn test_thumbprint_is_unpadded_sha256() {
        let key = SigningKey::from_der("k", b"certificate".to_vec(), Vec::new());
        let thumbprint = key.certificate_thumbprint();

        // 32 bytes of SHA-256 encode to 43 unpadded base64url characters
        assert_eq!(thumbprint.len(), 43);
        assert!(!thumbprint.contains('='));
        assert!(!thumbprint.contains('+'));
        assert!(!thumbprint.contains('/'));
    }

    #[test]
    fn test_from_pem_rejects_swapped_documents() {
        let result = SigningKey::from_pem(None, KEY_PEM, CERT_PEM);
        assert!(matches!(result, Err(IssuanceError::Configuration(_))));
    }

    #[test]
    fn test_from_pem_rejects_garbage() {
        let result = SigningKey::from_pem(None, "not pem", KEY_PEM);
        assert!(matches!(result, Err(IssuanceError::Configuration(_))));
    }

    #[test]
    fn test_debug_redacts_private_key() {
        let key = SigningKey::from_der("k", vec![1, 2, 3], vec![0xde, 0xad]);
        let debug = format!("{key:?}");
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("222"));
    }
}
