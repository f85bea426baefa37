use crate::error::IssuanceError;
use crate::jwt::claims::{
    ClaimSet, ClaimValue, AUD, ENDUSER, EXP, IAT, ISS, JTI, STANDARD_CLAIMS, SUBSCRIBED_APIS,
};
use crate::jwt::request::IssuanceRequest;
use crate::resolver::IssuerUrlResolver;
use chrono::{DateTime, Duration, Utc};
use tracing::warn;

/// Source of the issuance time.
pub trait Clock: Send + Sync {
    /// Current time.
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Assembles the standard claim set for one issuance request.
pub struct ClaimSetBuilder {
    issuer: String,
    ttl_seconds: u64,
    issued_at: Option<DateTime<Utc>>,
}

impl ClaimSetBuilder {
    pub fn new(issuer: impl Into<String>) -> Self {
        ClaimSetBuilder {
            issuer: issuer.into(),
            ttl_seconds: 900, // 15 minutes default
            issued_at: None,
        }
    }

    /// Starts a builder with the issuer URL from the key manager configuration.
    ///
    /// # Errors
    ///
    /// Returns `Configuration` if the issuer URL cannot be resolved.
    pub fn from_resolver(resolver: &dyn IssuerUrlResolver) -> Result<Self, IssuanceError> {
        Ok(Self::new(resolver.resolve_issuer_url()?))
    }

    pub fn ttl_seconds(mut self, ttl: u64) -> Self {
        self.ttl_seconds = ttl;
        self
    }

    /// Pins the issuance time instead of reading the wall clock.
    pub fn issued_at(mut self, at: DateTime<Utc>) -> Self {
        self.issued_at = Some(at);
        self
    }

    /// Builds the claim set for a request.
    ///
    /// # Errors
    ///
    /// Returns `Configuration` for a zero TTL or one that overflows the
    /// representable time range.
    pub fn build(&self, request: &IssuanceRequest) -> Result<ClaimSet, IssuanceError> {
        if self.ttl_seconds == 0 {
            return Err(IssuanceError::config("Token TTL must be greater than zero"));
        }

        let issued_at = self.issued_at.unwrap_or_else(Utc::now);
        let expires_at = i64::try_from(self.ttl_seconds)
            .ok()
            .and_then(Duration::try_seconds)
            .and_then(|ttl| issued_at.checked_add_signed(ttl))
            .ok_or_else(|| {
                IssuanceError::config(format!("Token TTL {}s is out of range", self.ttl_seconds))
            })?;

        let mut claims = ClaimSet::new();
        claims.insert(JTI, uuid::Uuid::new_v4().to_string());
        claims.insert(ISS, self.issuer.as_str());
        claims.insert(AUD, request.audience());
        claims.insert(EXP, expires_at);
        claims.insert(IAT, issued_at);
        claims.insert(ENDUSER, request.subject());
        claims.insert(
            SUBSCRIBED_APIS,
            ClaimValue::Subscriptions(request.subscribed_apis().to_vec()),
        );

        for (name, value) in request.attributes() {
            if STANDARD_CLAIMS.contains(&name.as_str()) {
                warn!(claim = %name, "Ignoring user attribute that shadows a standard claim");
                continue;
            }
            claims.insert(name.as_str(), value.as_str());
        }

        Ok(claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::jwt::request::SubscribedApi;
    use chrono::TimeZone;

    fn fixed_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, 8, 30, 0).unwrap()
    }

    #[test]
    fn test_builder_basic() {
        let request = IssuanceRequest::new("alice", "aud1");
        let claims = ClaimSetBuilder::new("https://gw.example.com/oauth2/token")
            .ttl_seconds(3600)
            .issued_at(fixed_time())
            .build(&request)
            .unwrap();

        assert_eq!(
            claims.get(ISS).and_then(ClaimValue::as_text),
            Some("https://gw.example.com/oauth2/token")
        );
        assert_eq!(claims.get(AUD).and_then(ClaimValue::as_text), Some("aud1"));
        assert_eq!(claims.get(ENDUSER).and_then(ClaimValue::as_text), Some("alice"));
        assert_eq!(claims.expires_at(), Some(fixed_time() + Duration::seconds(3600)));
        assert_eq!(
            claims.get(IAT).and_then(ClaimValue::as_timestamp),
            Some(fixed_time())
        );
        assert_eq!(claims.len(), STANDARD_CLAIMS.len());
    }

    #[test]
    fn test_jti_is_a_fresh_uuid() {
        let request = IssuanceRequest::new("alice", "aud1");
        let builder = ClaimSetBuilder::new("iss");

        let first = builder.build(&request).unwrap();
        let second = builder.build(&request).unwrap();

        let jti = first.jti().unwrap();
        assert!(uuid::Uuid::parse_str(jti).is_ok());
        assert_ne!(first.jti(), second.jti());
    }

    #[test]
    fn test_subscriptions_are_carried() {
        let request = IssuanceRequest::new("alice", "aud1")
            .with_subscribed_api(SubscribedApi::new("PizzaShack", "/pizzashack/1.0.0", "1.0.0"));

        let claims = ClaimSetBuilder::new("iss").build(&request).unwrap();
        match claims.get(SUBSCRIBED_APIS) {
            Some(ClaimValue::Subscriptions(apis)) => {
                assert_eq!(apis.len(), 1);
                assert_eq!(apis[0].name, "PizzaShack");
            }
            other => panic!("unexpected subscribedAPIs value: {other:?}"),
        }
    }

    #[test]
    fn test_empty_subscription_list_still_emitted() {
        let claims = ClaimSetBuilder::new("iss")
            .build(&IssuanceRequest::new("alice", "aud1"))
            .unwrap();
        assert_eq!(
            claims.get(SUBSCRIBED_APIS),
            Some(&ClaimValue::Subscriptions(Vec::new()))
        );
    }

    #[test]
    fn test_attributes_cannot_shadow_standard_claims() {
        let request = IssuanceRequest::new("alice", "aud1")
            .with_attribute("enduser", "mallory")
            .with_attribute("http://wso2.org/claims/role", "admin");

        let claims = ClaimSetBuilder::new("iss").build(&request).unwrap();
        assert_eq!(claims.get(ENDUSER).and_then(ClaimValue::as_text), Some("alice"));
        assert_eq!(
            claims.get("http://wso2.org/claims/role").and_then(ClaimValue::as_text),
            Some("admin")
        );
    }

    #[test]
    fn test_zero_ttl_rejected() {
        let result = ClaimSetBuilder::new("iss")
            .ttl_seconds(0)
            .build(&IssuanceRequest::new("alice", "aud1"));
        assert!(matches!(result, Err(IssuanceError::Configuration(_))));
    }

    #[test]
    fn test_overflowing_ttl_rejected() {
        let result = ClaimSetBuilder::new("iss")
            .ttl_seconds(u64::MAX)
            .build(&IssuanceRequest::new("alice", "aud1"));
        assert!(matches!(result, Err(IssuanceError::Configuration(_))));
    }

    #[test]
    fn test_missing_issuer_url_is_a_configuration_error() {
        let result = ClaimSetBuilder::from_resolver(&Config::default());
        assert!(matches!(result, Err(IssuanceError::Configuration(_))));
    }
}
