//! HTTP client for the subscription service.
//!
//! Subscription management (plan semantics, panel provisioning) is a
//! separate service; this adapter speaks its internal extend endpoint.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::json;

use crate::domain::foundation::{DomainError, ErrorCode, PlanId, Timestamp, UserId};
use crate::ports::{SubscriptionExtender, SubscriptionPeriod};

/// Extends subscriptions through the subscription service's HTTP API.
pub struct HttpSubscriptionExtender {
    base_url: String,
    api_token: Option<SecretString>,
    http: reqwest::Client,
}

impl HttpSubscriptionExtender {
    pub fn new(
        base_url: impl Into<String>,
        api_token: Option<SecretString>,
        http: reqwest::Client,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            api_token,
            http,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ExtendResponse {
    plan_id: String,
    expires_at: DateTime<Utc>,
}

fn parse_extend_response(body: &[u8]) -> Result<SubscriptionPeriod, DomainError> {
    let response: ExtendResponse = serde_json::from_slice(body).map_err(|e| {
        DomainError::new(
            ErrorCode::ExternalServiceError,
            format!("Unreadable extend response: {}", e),
        )
    })?;

    Ok(SubscriptionPeriod {
        plan_id: PlanId::new(response.plan_id)
            .map_err(|e| DomainError::new(ErrorCode::ExternalServiceError, e.to_string()))?,
        expires_at: Timestamp::from_datetime(response.expires_at),
    })
}

#[async_trait]
impl SubscriptionExtender for HttpSubscriptionExtender {
    async fn extend(
        &self,
        user_id: &UserId,
        plan_id: &PlanId,
        duration_days: u32,
    ) -> Result<SubscriptionPeriod, DomainError> {
        let url = format!("{}/internal/subscriptions/extend", self.base_url);
        let mut request = self.http.post(&url).json(&json!({
            "user_id": user_id,
            "plan_id": plan_id,
            "duration_days": duration_days,
        }));

        if let Some(token) = &self.api_token {
            request = request.bearer_auth(token.expose_secret());
        }

        let response = request.send().await.map_err(|e| {
            DomainError::new(
                ErrorCode::ExternalServiceError,
                format!("Subscription service unreachable: {}", e),
            )
        })?;

        if !response.status().is_success() {
            let status = response.status();
            return Err(DomainError::new(
                ErrorCode::ExternalServiceError,
                format!("Subscription service returned {}", status),
            ));
        }

        let body = response.bytes().await.map_err(|e| {
            DomainError::new(ErrorCode::ExternalServiceError, e.to_string())
        })?;

        parse_extend_response(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extend_response_parses_to_period() {
        let body = br#"{"plan_id": "plan-30d", "expires_at": "2026-09-06T12:00:00Z"}"#;

        let period = parse_extend_response(body).unwrap();

        assert_eq!(period.plan_id.as_str(), "plan-30d");
        assert_eq!(
            period.expires_at.as_datetime().to_rfc3339(),
            "2026-09-06T12:00:00+00:00"
        );
    }

    #[test]
    fn garbage_response_is_an_external_service_error() {
        let err = parse_extend_response(b"not json").unwrap_err();
        assert_eq!(err.code, ErrorCode::ExternalServiceError);
    }
}
