//! Cryptomus payment gateway adapter.
//!
//! Crypto-invoice provider: `create_payment` creates a hosted invoice and
//! returns its payment page URL. Requests and webhooks are both signed with
//! HMAC-SHA256; webhook verification goes through the shared
//! `WebhookAuthenticator::SignedBody` strategy with constant-time
//! comparison. New redirect providers with signed webhooks follow this
//! adapter's shape.

use std::net::IpAddr;

use async_trait::async_trait;
use http::HeaderMap;
use secrecy::{ExposeSecret, SecretString};
use serde_json::json;

use crate::domain::foundation::{Currency, Money, TransactionId};
use crate::domain::payment::{
    compute_signature, GatewayKind, OutcomeStatus, PaymentReference, WebhookAuthenticator,
    WebhookOutcome,
};
use crate::ports::{CreatePaymentRequest, GatewayError, PaymentAction, PaymentGateway, PaymentIntent};

/// Invoice creation endpoint.
const API_BASE: &str = "https://api.cryptomus.com/v1/payment";

/// Header carrying the hex HMAC signature, on requests and webhooks alike.
const SIGN_HEADER: &str = "sign";

/// Cryptomus gateway adapter.
pub struct CryptomusGateway {
    merchant_id: String,
    api_key: SecretString,
    currency: Currency,
    api_base: String,
    authenticator: WebhookAuthenticator,
    http: reqwest::Client,
}

impl CryptomusGateway {
    pub fn new(
        merchant_id: impl Into<String>,
        api_key: SecretString,
        webhook_secret: Option<SecretString>,
        allow_unsigned: bool,
        currency: Currency,
        http: reqwest::Client,
    ) -> Self {
        Self {
            merchant_id: merchant_id.into(),
            api_key,
            currency,
            api_base: API_BASE.to_string(),
            authenticator: WebhookAuthenticator::SignedBody {
                secret: webhook_secret,
                header: SIGN_HEADER,
                allow_unsigned,
            },
            http,
        }
    }

    /// Points the adapter at a different API host (tests).
    pub fn with_api_base(mut self, base: impl Into<String>) -> Self {
        self.api_base = base.into();
        self
    }

    fn invoice_body(&self, request: &CreatePaymentRequest) -> serde_json::Value {
        json!({
            "amount": request.amount.to_provider_string(),
            "currency": self.currency.code(),
            "order_id": request.transaction_id.to_string(),
            "lifetime": 3600,
        })
    }
}

/// Extracts the invoice uuid and payment page URL from a creation response.
fn parse_invoice_response(response: &serde_json::Value) -> Result<PaymentIntent, GatewayError> {
    let result = response
        .get("result")
        .ok_or_else(|| GatewayError::MalformedPayload("invoice response missing 'result'".into()))?;

    let uuid = result
        .get("uuid")
        .and_then(|v| v.as_str())
        .ok_or_else(|| GatewayError::MalformedPayload("invoice response missing 'uuid'".into()))?;

    let url = result
        .get("url")
        .and_then(|v| v.as_str())
        .ok_or_else(|| GatewayError::MalformedPayload("invoice response missing 'url'".into()))?;

    Ok(PaymentIntent {
        provider_payment_id: Some(uuid.to_string()),
        action: PaymentAction::Redirect {
            url: url.to_string(),
        },
    })
}

/// Parses the webhook body `{"uuid", "order_id", "status", "amount"?}`.
fn parse_webhook_body(body: &[u8], currency: Currency) -> Result<WebhookOutcome, GatewayError> {
    let value: serde_json::Value = serde_json::from_slice(body)
        .map_err(|e| GatewayError::MalformedPayload(format!("invalid JSON: {}", e)))?;

    let order_id = value
        .get("order_id")
        .and_then(|v| v.as_str())
        .ok_or_else(|| GatewayError::MalformedPayload("webhook missing 'order_id'".into()))?;

    // order_id is the transaction id we sent at invoice creation.
    let transaction_id: TransactionId = order_id.parse().map_err(|_| {
        GatewayError::MalformedPayload(format!("order_id is not a transaction id: {}", order_id))
    })?;

    let status_str = value
        .get("status")
        .and_then(|v| v.as_str())
        .ok_or_else(|| GatewayError::MalformedPayload("webhook missing 'status'".into()))?;

    let status = match status_str {
        "paid" => OutcomeStatus::Completed,
        "cancel" => OutcomeStatus::Canceled,
        other => return Err(GatewayError::UnsupportedStatus(other.to_string())),
    };

    let external_id = value
        .get("uuid")
        .and_then(|v| v.as_str())
        .map(String::from);

    let amount = value
        .get("amount")
        .and_then(|v| v.as_str())
        .and_then(|s| s.parse().ok())
        .map(|amount| Money::new(amount, currency));

    Ok(WebhookOutcome {
        reference: PaymentReference::Transaction(transaction_id),
        external_id,
        status,
        amount,
    })
}

#[async_trait]
impl PaymentGateway for CryptomusGateway {
    fn kind(&self) -> GatewayKind {
        GatewayKind::Cryptomus
    }

    async fn create_payment(
        &self,
        request: CreatePaymentRequest,
    ) -> Result<PaymentIntent, GatewayError> {
        if !request.amount.is_positive() {
            return Err(GatewayError::InvalidAmount(request.amount.amount));
        }

        let body = serde_json::to_vec(&self.invoice_body(&request))
            .map_err(|e| GatewayError::MalformedPayload(e.to_string()))?;
        let signature = hex::encode(compute_signature(
            self.api_key.expose_secret().as_bytes(),
            &body,
        ));

        let response = self
            .http
            .post(&self.api_base)
            .header("merchant", &self.merchant_id)
            .header(SIGN_HEADER, signature)
            .header("content-type", "application/json")
            .body(body)
            .send()
            .await
            .map_err(|e| {
                tracing::warn!(error = %e, "Cryptomus invoice request failed");
                GatewayError::Unavailable(e.to_string())
            })?;

        if !response.status().is_success() {
            let status = response.status();
            tracing::warn!(%status, "Cryptomus rejected invoice creation");
            return Err(GatewayError::Unavailable(format!(
                "invoice creation returned {}",
                status
            )));
        }

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| GatewayError::MalformedPayload(format!("invalid JSON: {}", e)))?;

        parse_invoice_response(&body)
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
