//! Canonical JSON and base64url encoding of token segments.
//!
//! The encoded bytes are the signing input, so they must be reproducible:
//! claims are emitted in lexicographic key order, the header in its fixed
//! member order, both without insignificant whitespace.

use crate::error::IssuanceError;
use crate::jwt::claims::ClaimSet;
use crate::jwt::header::JwsHeader;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde::Serialize;

/// Encodes headers and claim sets into compact JWS segments.
pub struct CanonicalEncoder;

impl CanonicalEncoder {
    /// Compact JSON text of the header.
    ///
    /// # Errors
    ///
    /// Returns `Encoding` if serialization fails.
    pub fn header_json(header: &JwsHeader) -> Result<Vec<u8>, IssuanceError> {
        Self::to_json(header)
    }

    /// Compact JSON text of the claims, keys sorted lexicographically.
    ///
    /// # Errors
    ///
    /// Returns `Encoding` if serialization fails.
    pub fn claims_json(claims: &ClaimSet) -> Result<Vec<u8>, IssuanceError> {
        Self::to_json(claims)
    }

    /// Base64url header segment.
    ///
    /// # Errors
    ///
    /// Returns `Encoding` if serialization fails.
    pub fn encode_header(header: &JwsHeader) -> Result<String, IssuanceError> {
        Ok(Self::base64url(&Self::header_json(header)?))
    }

    /// Base64url payload segment.
    ///
    /// # Errors
    ///
    /// Returns `Encoding` if serialization fails.
    pub fn encode_claims(claims: &ClaimSet) -> Result<String, IssuanceError> {
        Ok(Self::base64url(&Self::claims_json(claims)?))
    }

    /// Unpadded base64url encoding.
    pub fn base64url(bytes: &[u8]) -> String {
        URL_SAFE_NO_PAD.encode(bytes)
    }

    fn to_json<T: Serialize>(value: &T) -> Result<Vec<u8>, IssuanceError> {
        Ok(serde_json::to_vec(value)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jwt::claims::ClaimValue;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_claims_sorted_regardless_of_insertion_order() {
        let exp = Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap();

        let mut forward = ClaimSet::new();
        forward.insert("aud", "aud1");
        forward.insert("enduser", "alice");
        forward.insert("exp", exp);
        forward.insert("roles", vec!["a".to_string(), "b".to_string()]);

        let mut reverse = ClaimSet::new();
        reverse.insert("roles", vec!["a".to_string(), "b".to_string()]);
        reverse.insert("exp", exp);
        reverse.insert("enduser", "alice");
        reverse.insert("aud", "aud1");

        let forward_json = CanonicalEncoder::claims_json(&forward).unwrap();
        assert_eq!(forward_json, CanonicalEncoder::claims_json(&reverse).unwrap());
        assert_eq!(
            String::from_utf8(forward_json).unwrap(),
            r#"{"aud":"aud1","enduser":"alice","exp":1893456000,"roles":["a","b"]}"#
        );
    }

    #[test]
    fn test_uppercase_sorts_before_lowercase() {
        let mut claims = ClaimSet::new();
        claims.insert("subscribedAPIs", ClaimValue::Subscriptions(Vec::new()));
        claims.insert("subscribed", "x");
        claims.insert("Zed", "y");

        let json = String::from_utf8(CanonicalEncoder::claims_json(&claims).unwrap()).unwrap();
        assert_eq!(json, r#"{"Zed":"y","subscribed":"x","subscribedAPIs":[]}"#);
    }

    #[test]
    fn test_header_segment() {
        let segment = CanonicalEncoder::encode_header(&JwsHeader::unsigned()).unwrap();
        // base64url of {"typ":"JWT","alg":"none"}
        assert_eq!(segment, "eyJ0eXAiOiJKV1QiLCJhbGciOiJub25lIn0");
    }

    #[test]
    fn test_base64url_has_no_padding_or_unsafe_chars() {
        let encoded = CanonicalEncoder::base64url(&[0xfb, 0xff, 0xfe, 0x00]);
        assert_eq!(encoded, "-__-AA");
    }

    #[test]
    fn test_non_ascii_values_are_utf8() {
        let mut claims = ClaimSet::new();
        claims.insert("enduser", "jürgen");

        let json = CanonicalEncoder::claims_json(&claims).unwrap();
        assert_eq!(json, "{\"enduser\":\"jürgen\"}".as_bytes());
    }
}
