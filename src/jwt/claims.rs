use crate::jwt::request::SubscribedApi;
use chrono::{DateTime, Utc};
use serde::ser::SerializeSeq;
use serde::{Serialize, Serializer};
use std::collections::btree_map;
use std::collections::BTreeMap;

// Standard claim names
pub const JTI: &str = "jti";
pub const ISS: &str = "iss";
pub const AUD: &str = "aud";
pub const EXP: &str = "exp";
pub const IAT: &str = "iat";
pub const ENDUSER: &str = "enduser";
pub const SUBSCRIBED_APIS: &str = "subscribedAPIs";

/// Names a user attribute may not override.
pub const STANDARD_CLAIMS: [&str; 7] = [JTI, ISS, AUD, EXP, IAT, ENDUSER, SUBSCRIBED_APIS];

/// Value of a single claim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClaimValue {
    /// Scalar string
    Text(String),
    /// Ordered list of strings
    List(Vec<String>),
    /// Point in time, emitted as integer seconds since the Unix epoch
    Timestamp(DateTime<Utc>),
    /// Subscription descriptors
    Subscriptions(Vec<SubscribedApi>),
}

impl ClaimValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_timestamp(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::Timestamp(at) => Some(*at),
            _ => None,
        }
    }
}

impl From<&str> for ClaimValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for ClaimValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<Vec<String>> for ClaimValue {
    fn from(value: Vec<String>) -> Self {
        Self::List(value)
    }
}

impl From<DateTime<Utc>> for ClaimValue {
    fn from(value: DateTime<Utc>) -> Self {
        Self::Timestamp(value)
    }
}

impl Serialize for ClaimValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Text(s) => serializer.serialize_str(s),
            Self::List(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Self::Timestamp(at) => serializer.serialize_i64(at.timestamp()),
            Self::Subscriptions(apis) => apis.serialize(serializer),
        }
    }
}

/// Claims of one token, keyed and iterated in lexicographic name order.
///
/// Insertion order never leaks into iteration or serialization, so two sets
/// with equal content always encode to the same bytes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ClaimSet {
    claims: BTreeMap<String, ClaimValue>,
}

impl ClaimSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a claim, returning the value it replaced.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<ClaimValue>) -> Option<ClaimValue> {
        self.claims.insert(name.into(), value.into())
    }

    pub fn get(&self, name: &str) -> Option<&ClaimValue> {
        self.claims.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.claims.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.claims.len()
    }

    pub fn is_empty(&self) -> bool {
        self.claims.is_empty()
    }

    /// Claims in lexicographic name order.
    pub fn iter(&self) -> btree_map::Iter<'_, String, ClaimValue> {
        self.claims.iter()
    }

    /// The `jti` claim, if present as a scalar.
    pub fn jti(&self) -> Option<&str> {
        self.get(JTI).and_then(ClaimValue::as_text)
    }

    /// The `exp` claim.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.get(EXP).and_then(ClaimValue::as_timestamp)
    }
}

impl IntoIterator for ClaimSet {
    type Item = (String, ClaimValue);
    type IntoIter = btree_map::IntoIter<String, ClaimValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.claims.into_iter()
    }
}

impl FromIterator<(String, ClaimValue)> for ClaimSet {
    fn from_iter<I: IntoIterator<Item = (String, ClaimValue)>>(iter: I) -> Self {
        Self {
            claims: iter.into_iter().collect(),
        }
    }
}
