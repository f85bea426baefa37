pub mod builder;
pub mod claims;
pub mod header;
pub mod normalizer;
pub mod request;
pub mod serializer;
pub mod signer;

pub use builder::{ClaimSetBuilder, Clock, SystemClock};
pub use claims::{ClaimSet, ClaimValue};
pub use header::{ComposedHeader, HeaderComposer, JwsHeader};
pub use normalizer::AttributeNormalizer;
pub use request::{IssuanceRequest, SubscribedApi, DEFAULT_TENANT};
pub use serializer::CanonicalEncoder;
pub use signer::TokenSigner;
