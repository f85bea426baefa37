use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Tenant assumed for subjects without a tenant domain.
pub const DEFAULT_TENANT: &str = "carbon.super";

/// Descriptor of one API the end user is subscribed to.
///
/// Fields are declared in lexicographic order of their JSON names so the
/// nested objects of `subscribedAPIs` serialize canonically.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscribedApi {
    /// API context path
    pub context: String,
    /// API name
    pub name: String,
    /// API publisher
    pub publisher: String,
    /// Tenant domain of the subscriber
    pub subscriber_tenant_domain: String,
    /// Subscription tier (throttling policy)
    pub subscription_tier: String,
    /// API version
    pub version: String,
}

impl SubscribedApi {
    pub fn new(
        name: impl Into<String>,
        context: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            context: context.into(),
            name: name.into(),
            publisher: String::new(),
            subscriber_tenant_domain: String::new(),
            subscription_tier: String::new(),
            version: version.into(),
        }
    }

    #[must_use]
    pub fn with_publisher(mut self, publisher: impl Into<String>) -> Self {
        self.publisher = publisher.into();
        self
    }

    #[must_use]
    pub fn with_subscription_tier(mut self, tier: impl Into<String>) -> Self {
        self.subscription_tier = tier.into();
        self
    }

    #[must_use]
    pub fn with_subscriber_tenant_domain(mut self, domain: impl Into<String>) -> Self {
        self.subscriber_tenant_domain = domain.into();
        self
    }
}

/// One token issuance request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuanceRequest {
    subject: String,
    audience: String,
    subscribed_apis: Vec<SubscribedApi>,
    tenant: Option<String>,
    attributes: BTreeMap<String, String>,
}

impl IssuanceRequest {
    /// Creates a request for an end user and audience.
    pub fn new(subject: impl Into<String>, audience: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            audience: audience.into(),
            subscribed_apis: Vec::new(),
            tenant: None,
            attributes: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn with_subscribed_apis(mut self, apis: Vec<SubscribedApi>) -> Self {
        self.subscribed_apis = apis;
        self
    }

    #[must_use]
    pub fn with_subscribed_api(mut self, api: SubscribedApi) -> Self {
        self.subscribed_apis.push(api);
        self
    }

    /// Sets the tenant explicitly instead of deriving it from the subject.
    #[must_use]
    pub fn with_tenant(mut self, tenant: impl Into<String>) -> Self {
        self.tenant = Some(tenant.into());
        self
    }

    /// Adds a user attribute emitted as an extra string claim.
    #[must_use]
    pub fn with_attribute(mut self, claim: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(claim.into(), value.into());
        self
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    pub fn audience(&self) -> &str {
        &self.audience
    }

    pub fn subscribed_apis(&self) -> &[SubscribedApi] {
        &self.subscribed_apis
    }

    pub fn attributes(&self) -> &BTreeMap<String, String> {
        &self.attributes
    }

    /// Tenant owning the subject.
    ///
    /// An explicit non-blank tenant wins. Otherwise the domain after the last
    /// `@` in the subject is used, falling back to [`DEFAULT_TENANT`].
    pub fn tenant(&self) -> &str {
        if let Some(tenant) = self.tenant.as_deref().filter(|t| !t.trim().is_empty()) {
            return tenant;
        }

        match self.subject.rsplit_once('@') {
            Some((_, domain)) if !domain.is_empty() => domain,
            _ => DEFAULT_TENANT,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tenant_derived_from_subject() {
        assert_eq!(IssuanceRequest::new("alice@wso2.com", "aud").tenant(), "wso2.com");
        assert_eq!(
            IssuanceRequest::new("alice@example.org@wso2.com", "aud").tenant(),
            "wso2.com"
        );
    }

    #[test]
    fn test_tenant_defaults_for_plain_subject() {
        assert_eq!(IssuanceRequest::new("alice", "aud").tenant(), DEFAULT_TENANT);
        assert_eq!(IssuanceRequest::new("alice@", "aud").tenant(), DEFAULT_TENANT);
    }

    #[test]
    fn test_explicit_tenant_wins() {
        let request = IssuanceRequest::new("alice@wso2.com", "aud").with_tenant("acme.io");
        assert_eq!(request.tenant(), "acme.io");

        let request = IssuanceRequest::new("alice@wso2.com", "aud").with_tenant(" ");
        assert_eq!(request.tenant(), "wso2.com");
    }

    #[test]
    fn test_subscribed_api_serializes_members_in_order() {
        let api = SubscribedApi::new("PizzaShack", "/pizzashack/1.0.0", "1.0.0")
            .with_publisher("admin")
            .with_subscription_tier("Unlimited")
            .with_subscriber_tenant_domain("carbon.super");

        let json = serde_json::to_string(&api).unwrap();
        assert_eq!(
            json,
            r#"{"context":"/pizzashack/1.0.0","name":"PizzaShack","publisher":"admin","subscriberTenantDomain":"carbon.super","subscriptionTier":"Unlimited","version":"1.0.0"}"#
        );
    }
}
