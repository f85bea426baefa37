//! Multi-valued attribute handling.
//!
//! User stores keep multi-valued attributes (roles, groups) as one string
//! joined by a tenant-specific separator. Verifiers expect JSON arrays, so
//! any string claim containing the separator is split into a list.

use crate::config::DEFAULT_MULTI_ATTRIBUTE_SEPARATOR;
use crate::jwt::claims::{ClaimSet, ClaimValue};
use tracing::debug;

/// Splits separator-joined string claims into ordered lists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeNormalizer {
    separator: String,
}

impl AttributeNormalizer {
    /// Creates a normalizer for a tenant's configured separator.
    ///
    /// A missing or blank separator falls back to the default.
    pub fn new(separator: Option<String>) -> Self {
        let separator = separator
            .filter(|sep| !sep.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_MULTI_ATTRIBUTE_SEPARATOR.to_string());
        Self { separator }
    }

    pub fn separator(&self) -> &str {
        &self.separator
    }

    /// Splits a value on the separator, dropping blank tokens.
    ///
    /// Returns `None` when the separator does not occur. A value made only
    /// of separators and whitespace yields an empty list.
    pub fn split(&self, value: &str) -> Option<Vec<String>> {
        if !value.contains(self.separator.as_str()) {
            return None;
        }

        Some(
            value
                .split(self.separator.as_str())
                .filter(|token| !token.trim().is_empty())
                .map(str::to_string)
                .collect(),
        )
    }

    /// Normalizes a single claim value. Only scalar strings are affected.
    pub fn normalize_value(&self, value: ClaimValue) -> ClaimValue {
        match value {
            ClaimValue::Text(text) => match self.split(&text) {
                Some(items) => ClaimValue::List(items),
                None => ClaimValue::Text(text),
            },
            other => other,
        }
    }

    /// Normalizes every claim of a set.
    ///
    /// Standard claims are not exempt: with a `-` separator the UUID `jti`
    /// becomes a list of its groups.
    pub fn normalize(&self, claims: ClaimSet) -> ClaimSet {
        claims
            .into_iter()
            .map(|(name, value)| {
                let normalized = self.normalize_value(value);
                if let ClaimValue::List(items) = &normalized {
                    debug!(claim = %name, values = items.len(), "Split multi-valued claim");
                }
                (name, normalized)
            })
            .collect()
    }
}

impl Default for AttributeNormalizer {
    fn default() -> Self {
        Self::new(None)
    }
}
