//! Subscription service configuration

use serde::Deserialize;

use super::error::ValidationError;

/// Subscription service configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SubscriptionConfig {
    /// Base URL of the subscription service's internal API
    pub service_url: String,

    /// Encrypted bearer token for the internal API, if it requires one
    pub api_token: Option<String>,

    /// Timeout for extension calls in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl SubscriptionConfig {
    /// Validate subscription service configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.service_url.is_empty() {
            return Err(ValidationError::MissingRequired("SUBSCRIPTION_SERVICE_URL"));
        }
        if !self.service_url.starts_with("http://") && !self.service_url.starts_with("https://") {
            return Err(ValidationError::InvalidServiceUrl);
        }
        if self.timeout_secs == 0 || self.timeout_secs > 120 {
            return Err(ValidationError::InvalidTimeout);
        }
        Ok(())
    }
}

fn default_timeout() -> u64 {
    10
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_config_passes() {
        let config = SubscriptionConfig {
            service_url: "http://subscription.internal:8081".into(),
            api_token: None,
            timeout_secs: 10,
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn empty_url_is_missing_required() {
        let config = SubscriptionConfig {
            service_url: String::new(),
            api_token: None,
            timeout_secs: 10,
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn non_http_url_is_rejected() {
        let config = SubscriptionConfig {
            service_url: "subscription.internal:8081".into(),
            api_token: None,
            timeout_secs: 10,
        };
        assert!(config.validate().is_err());
    }
}
