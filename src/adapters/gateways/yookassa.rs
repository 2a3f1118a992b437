//! YooKassa payment gateway adapter.
//!
//! Redirect-checkout provider: `create_payment` builds an order against the
//! YooKassa API and hands back the hosted checkout URL. Webhooks carry no
//! signature; the security boundary is network origin, so `authenticate`
//! checks the source address against the provider's published ranges.

use std::net::IpAddr;

use async_trait::async_trait;
use http::HeaderMap;
use ipnet::IpNet;
use once_cell::sync::Lazy;
use secrecy::{ExposeSecret, SecretString};
use serde_json::json;

use crate::domain::foundation::{Currency, Money};
use crate::domain::payment::{
    GatewayKind, OutcomeStatus, PaymentReference, WebhookAuthenticator, WebhookOutcome,
};
use crate::ports::{CreatePaymentRequest, GatewayError, PaymentAction, PaymentGateway, PaymentIntent};

/// YooKassa order API endpoint.
const API_BASE: &str = "https://api.yookassa.ru/v3/payments";

/// Networks YooKassa publishes as webhook sources.
///
/// <https://yookassa.ru/developers/using-api/webhooks#ip>
static PUBLISHED_NETWORKS: Lazy<Vec<IpNet>> = Lazy::new(|| {
    [
        "185.71.76.0/27",
        "185.71.77.0/27",
        "77.75.153.0/25",
        "77.75.156.11/32",
        "77.75.156.35/32",
        "77.75.154.128/25",
        "2a02:5180::/32",
    ]
    .iter()
    .map(|s| s.parse().expect("published network list is well-formed"))
    .collect()
});

/// YooKassa gateway adapter.
pub struct YookassaGateway {
    shop_id: String,
    secret_key: SecretString,
    return_url: String,
    currency: Currency,
    api_base: String,
    authenticator: WebhookAuthenticator,
    http: reqwest::Client,
}

impl YookassaGateway {
    /// Creates the gateway with the provider's published webhook networks.
    pub fn new(
        shop_id: impl Into<String>,
        secret_key: SecretString,
        return_url: impl Into<String>,
        currency: Currency,
        http: reqwest::Client,
    ) -> Self {
        Self::with_trusted_networks(
            shop_id,
            secret_key,
            return_url,
            currency,
            PUBLISHED_NETWORKS.clone(),
            http,
        )
    }

    /// Creates the gateway with an explicit allowlist (tests, staging
    /// environments behind tunnels).
    pub fn with_trusted_networks(
        shop_id: impl Into<String>,
        secret_key: SecretString,
        return_url: impl Into<String>,
        currency: Currency,
        trusted_networks: Vec<IpNet>,
        http: reqwest::Client,
    ) -> Self {
        Self {
            shop_id: shop_id.into(),
            secret_key,
            return_url: return_url.into(),
            currency,
            api_base: API_BASE.to_string(),
            authenticator: WebhookAuthenticator::IpAllowlist(trusted_networks),
            http,
        }
    }

    /// Points the adapter at a different API host (tests).
    pub fn with_api_base(mut self, base: impl Into<String>) -> Self {
        self.api_base = base.into();
        self
    }

    fn order_body(&self, request: &CreatePaymentRequest) -> serde_json::Value {
        json!({
            "amount": {
                "value": request.amount.to_provider_string(),
                "currency": self.currency.code(),
            },
            "capture": true,
            "confirmation": {
                "type": "redirect",
                "return_url": self.return_url,
            },
            "description": request.description,
            "metadata": {
                "transaction_id": request.transaction_id.to_string(),
            },
        })
    }
}

/// Extracts the payment id and checkout URL from an order response.
fn parse_order_response(response: &serde_json::Value) -> Result<PaymentIntent, GatewayError> {
    let id = response
        .get("id")
        .and_then(|v| v.as_str())
        .ok_or_else(|| GatewayError::MalformedPayload("order response missing 'id'".into()))?;

    let url = response
        .pointer("/confirmation/confirmation_url")
        .and_then(|v| v.as_str())
        .ok_or_else(|| {
            GatewayError::MalformedPayload("order response missing 'confirmation_url'".into())
        })?;

    Ok(PaymentIntent {
        provider_payment_id: Some(id.to_string()),
        action: PaymentAction::Redirect {
            url: url.to_string(),
        },
    })
}

/// Parses the webhook body `{"object": {"id": ..., "status": ...}}`.
fn parse_webhook_body(body: &[u8], currency: Currency) -> Result<WebhookOutcome, GatewayError> {
    let value: serde_json::Value = serde_json::from_slice(body)
        .map_err(|e| GatewayError::MalformedPayload(format!("invalid JSON: {}", e)))?;

    let object = value
        .get("object")
        .ok_or_else(|| GatewayError::MalformedPayload("webhook missing 'object'".into()))?;

    let payment_id = object
        .get("id")
        .and_then(|v| v.as_str())
        .ok_or_else(|| GatewayError::MalformedPayload("webhook missing 'id'".into()))?;

    let status_str = object
        .get("status")
        .and_then(|v| v.as_str())
        .ok_or_else(|| GatewayError::MalformedPayload("webhook missing 'status'".into()))?;

    let status = match status_str {
        "succeeded" => OutcomeStatus::Completed,
        "canceled" => OutcomeStatus::Canceled,
        other => return Err(GatewayError::UnsupportedStatus(other.to_string())),
    };

    // Amount is informational: used for cross-checking, absent in some
    // notification types.
    let amount = object
        .pointer("/amount/value")
        .and_then(|v| v.as_str())
        .and_then(|s| s.parse().ok())
        .map(|value| Money::new(value, currency));

    Ok(WebhookOutcome {
        reference: PaymentReference::External(payment_id.to_string()),
        external_id: None,
        status,
        amount,
    })
}

#[async_trait]
impl PaymentGateway for YookassaGateway {
    fn kind(&self) -> GatewayKind {
        GatewayKind::Yookassa
    }

    async fn create_payment(
        &self,
        request: CreatePaymentRequest,
    ) -> Result<PaymentIntent, GatewayError> {
        if !request.amount.is_positive() {
            return Err(GatewayError::InvalidAmount(request.amount.amount));
        }

        let response = self
            .http
            .post(&self.api_base)
            .basic_auth(&self.shop_id, Some(self.secret_key.expose_secret()))
            .header("Idempotence-Key", request.transaction_id.to_string())
            .json(&self.order_body(&request))
            .send()
            .await
            .map_err(|e| {
                tracing::warn!(error = %e, "YooKassa order request failed");
                GatewayError::Unavailable(e.to_string())
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(%status, body, "YooKassa rejected order creation");
            return Err(GatewayError::Unavailable(format!(
                "order creation returned {}",
                status
            )));
        }

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| GatewayError::MalformedPayload(format!("invalid JSON: {}", e)))?;

        parse_order_response(&body)
    }

    fn parse_webhook(
        &self,
        body: &[u8],
        _headers: &HeaderMap,
    ) -> Result<WebhookOutcome, GatewayError> {
        parse_webhook_body(body, self.currency)
    }

    fn authenticate(
        &self,
        body: &[u8],
        headers: &HeaderMap,
        source_ip: IpAddr,
    ) -> Result<bool, GatewayError> {
        Ok(self.authenticator.verify(body, headers, source_ip))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::TransactionId;
    use rust_decimal::Decimal;

    fn test_gateway() -> YookassaGateway {
        YookassaGateway::new(
            "shop-123",
            SecretString::new("test_secret".into()),
            "https://shop.example/return",
            Currency::Rub,
            reqwest::Client::new(),
        )
    }

    fn webhook(id: &str, status: &str) -> Vec<u8> {
        serde_json::to_vec(&json!({"object": {"id": id, "status": status}})).unwrap()
    }

    // ══════════════════════════════════════════════════════════════
    // Order Response Parsing Tests
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn order_response_yields_redirect_intent() {
        let response = json!({
            "id": "2d7f5b1c-000f-5000-8000-1c3a5a7e9f01",
            "confirmation": {"confirmation_url": "https://yookassa.ru/checkout/abc"},
        });

        let intent = parse_order_response(&response).unwrap();

        assert_eq!(
            intent.provider_payment_id.as_deref(),
            Some("2d7f5b1c-000f-5000-8000-1c3a5a7e9f01")
        );
        assert_eq!(
            intent.action,
            PaymentAction::Redirect {
                url: "https://yookassa.ru/checkout/abc".into()
            }
        );
    }

    #[test]
    fn order_response_missing_id_fails() {
        let response = json!({
            "confirmation": {"confirmation_url": "https://yookassa.ru/checkout/abc"},
        });

        let result = parse_order_response(&response);

        assert!(
            matches!(result, Err(GatewayError::MalformedPayload(ref m)) if m.contains("'id'"))
        );
    }

    #[test]
    fn order_response_missing_confirmation_url_fails() {
        let response = json!({"id": "abc", "confirmation": {}});

        let result = parse_order_response(&response);

        assert!(matches!(
            result,
            Err(GatewayError::MalformedPayload(ref m)) if m.contains("'confirmation_url'")
        ));
    }

    // ══════════════════════════════════════════════════════════════
    // Webhook Parsing Tests
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn succeeded_webhook_parses_to_completed() {
        let gateway = test_gateway();

        let outcome = gateway
            .parse_webhook(&webhook("abc123", "succeeded"), &HeaderMap::new())
            .unwrap();

        assert_eq!(outcome.status, OutcomeStatus::Completed);
        assert_eq!(
            outcome.reference,
            PaymentReference::External("abc123".into())
        );
        assert!(outcome.external_id.is_none());
    }

    #[test]
    fn canceled_webhook_parses_to_canceled() {
        let gateway = test_gateway();

        let outcome = gateway
            .parse_webhook(&webhook("abc123", "canceled"), &HeaderMap::new())
            .unwrap();

        assert_eq!(outcome.status, OutcomeStatus::Canceled);
    }

    #[test]
    fn unknown_status_is_a_hard_failure() {
        let gateway = test_gateway();

        let result = gateway.parse_webhook(&webhook("abc123", "refunded"), &HeaderMap::new());

        assert!(matches!(
            result,
            Err(GatewayError::UnsupportedStatus(ref s)) if s == "refunded"
        ));
    }

    #[test]
    fn webhook_missing_object_fails() {
        let gateway = test_gateway();

        let result = gateway.parse_webhook(br#"{"event": "payment.succeeded"}"#, &HeaderMap::new());

        assert!(matches!(result, Err(GatewayError::MalformedPayload(_))));
    }

    #[test]
    fn webhook_missing_status_fails() {
        let gateway = test_gateway();
        let body = serde_json::to_vec(&json!({"object": {"id": "abc123"}})).unwrap();

        let result = gateway.parse_webhook(&body, &HeaderMap::new());

        assert!(matches!(result, Err(GatewayError::MalformedPayload(_))));
    }

    #[test]
    fn webhook_with_amount_carries_it_for_cross_check() {
        let gateway = test_gateway();
        let body = serde_json::to_vec(&json!({
            "object": {
                "id": "abc123",
                "status": "succeeded",
                "amount": {"value": "100.00", "currency": "RUB"},
            }
        }))
        .unwrap();

        let outcome = gateway.parse_webhook(&body, &HeaderMap::new()).unwrap();

        let amount = outcome.amount.unwrap();
        assert_eq!(amount.amount, Decimal::from(100));
        assert_eq!(amount.currency, Currency::Rub);
    }

    #[test]
    fn non_json_webhook_fails() {
        let gateway = test_gateway();

        let result = gateway.parse_webhook(b"not json", &HeaderMap::new());

        assert!(matches!(result, Err(GatewayError::MalformedPayload(_))));
    }

    // ══════════════════════════════════════════════════════════════
    // Authentication Tests
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn published_network_address_is_trusted() {
        let gateway = test_gateway();
        let trusted = gateway
            .authenticate(b"{}", &HeaderMap::new(), "185.71.76.5".parse().unwrap())
            .unwrap();
        assert!(trusted);
    }

    #[test]
    fn outside_address_is_rejected() {
        let gateway = test_gateway();
        let trusted = gateway
            .authenticate(b"{}", &HeaderMap::new(), "203.0.113.9".parse().unwrap())
            .unwrap();
        assert!(!trusted);
    }

    #[test]
    fn custom_allowlist_overrides_published_ranges() {
        let gateway = YookassaGateway::with_trusted_networks(
            "shop-123",
            SecretString::new("test_secret".into()),
            "https://shop.example/return",
            Currency::Rub,
            vec!["10.0.0.0/8".parse().unwrap()],
            reqwest::Client::new(),
        );

        assert!(gateway
            .authenticate(b"{}", &HeaderMap::new(), "10.1.2.3".parse().unwrap())
            .unwrap());
        assert!(!gateway
            .authenticate(b"{}", &HeaderMap::new(), "185.71.76.5".parse().unwrap())
            .unwrap());
    }

    // ══════════════════════════════════════════════════════════════
    // Create Payment Validation Tests
    // ══════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn zero_amount_is_rejected_before_any_network_call() {
        let gateway = test_gateway();
        let request = CreatePaymentRequest {
            transaction_id: TransactionId::new(),
            amount: Money::new(Decimal::ZERO, Currency::Rub),
            description: "30 days".into(),
        };

        let result = gateway.create_payment(request).await;

        assert!(matches!(result, Err(GatewayError::InvalidAmount(_))));
    }

    #[tokio::test]
    async fn negative_amount_is_rejected() {
        let gateway = test_gateway();
        let request = CreatePaymentRequest {
            transaction_id: TransactionId::new(),
            amount: Money::new(Decimal::from(-10), Currency::Rub),
            description: "30 days".into(),
        };

        let result = gateway.create_payment(request).await;

        assert!(matches!(result, Err(GatewayError::InvalidAmount(_))));
    }

    #[test]
    fn order_body_carries_transaction_id_and_formatted_amount() {
        let gateway = test_gateway();
        let id = TransactionId::new();
        let request = CreatePaymentRequest {
            transaction_id: id,
            amount: Money::new(Decimal::new(10050, 2), Currency::Rub),
            description: "30 days of service".into(),
        };

        let body = gateway.order_body(&request);

        assert_eq!(body["amount"]["value"], "100.50");
        assert_eq!(body["amount"]["currency"], "RUB");
        assert_eq!(body["metadata"]["transaction_id"], id.to_string());
        assert_eq!(body["confirmation"]["type"], "redirect");
    }
}
