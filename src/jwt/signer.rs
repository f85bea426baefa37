//! Signing dispatch for the compact serialization.

use crate::config::SignatureAlgorithm;
use crate::error::IssuanceError;
use crate::jwt::serializer::CanonicalEncoder;
use crate::kms::{Signer, SigningKey};
use std::sync::Arc;

/// Signing strategy selected by the configured algorithm.
pub enum TokenSigner {
    /// Unsecured token with an empty signature segment
    Unsigned,
    /// RS256 over the signing input with a certificate-bound key
    RsaSha256 {
        key: Arc<SigningKey>,
        signer: Arc<dyn Signer>,
    },
}

impl TokenSigner {
    /// Selects the strategy for an algorithm and the key its header bound.
    ///
    /// # Errors
    ///
    /// Returns `Signing` if a signed algorithm has no key material.
    pub fn select(
        algorithm: SignatureAlgorithm,
        key: Option<Arc<SigningKey>>,
        signer: Arc<dyn Signer>,
    ) -> Result<Self, IssuanceError> {
        match algorithm {
            SignatureAlgorithm::None => Ok(Self::Unsigned),
            SignatureAlgorithm::RsaSha256 => {
                let key = key.ok_or_else(|| {
                    IssuanceError::signing("No key material resolved for RS256")
                })?;
                Ok(Self::RsaSha256 { key, signer })
            }
        }
    }

    pub fn algorithm(&self) -> SignatureAlgorithm {
        match self {
            Self::Unsigned => SignatureAlgorithm::None,
            Self::RsaSha256 { .. } => SignatureAlgorithm::RsaSha256,
        }
    }

    /// Produces the compact token from encoded header and payload segments.
    ///
    /// # Errors
    ///
    /// Returns `Signing` if the signer fails, whatever error kind the signer
    /// reported. No partial token is produced.
    pub async fn sign_token(
        &self,
        header_segment: &str,
        payload_segment: &str,
    ) -> Result<String, IssuanceError> {
        let signing_input = signing_input(header_segment, payload_segment);

        match self {
            Self::Unsigned => Ok(format!("{signing_input}.")),
            Self::RsaSha256 { key, signer } => {
                let signature = signer
                    .sign(signing_input.as_bytes(), key)
                    .await
                    .map_err(|err| match err {
                        IssuanceError::Signing(_) => err,
                        other => IssuanceError::signing(other.to_string()),
                    })?;
                if signature.is_empty() {
                    return Err(IssuanceError::signing(format!(
                        "Signer returned an empty signature for key {}",
                        key.key_id()
                    )));
                }
                Ok(format!(
                    "{signing_input}.{}",
                    CanonicalEncoder::base64url(&signature)
                ))
            }
        }
    }
}

/// JWS signing input: `header.payload`.
pub fn signing_input(header_segment: &str, payload_segment: &str) -> String {
    format!("{header_segment}.{payload_segment}")
}
