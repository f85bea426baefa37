//! JWS access token issuance for the API gateway key manager.
//!
//! Builds identity and subscription claims for an end user, normalizes
//! multi-valued attributes, encodes header and payload canonically and signs
//! the result into a compact token.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod issuer;
pub mod jwt;
pub mod kms;
pub mod metrics;
pub mod resolver;
pub mod telemetry;

// Re-exports for convenience
pub use config::{Config, SignatureAlgorithm};
pub use error::IssuanceError;
pub use issuer::{TokenIssuer, TokenIssuerBuilder};
pub use jwt::{IssuanceRequest, SubscribedApi};
pub use kms::{RsaSha256Signer, Signer, SigningKey};
pub use resolver::InMemoryKeyStore;
