//! Telegram Stars payment gateway adapter.
//!
//! In-platform provider with no HTTP webhook. `create_payment` issues an
//! invoice link through the Bot API; confirmation arrives as a
//! `successful_payment` platform update that the orchestrator feeds into
//! the ledger through `ConfirmPlatformPaymentHandler`. Both webhook
//! operations fail closed with `NotSupported`.

use std::net::IpAddr;

use async_trait::async_trait;
use http::HeaderMap;
use secrecy::{ExposeSecret, SecretString};
use serde_json::json;

use crate::domain::foundation::Currency;
use crate::domain::payment::{GatewayKind, WebhookOutcome};
use crate::ports::{CreatePaymentRequest, GatewayError, PaymentAction, PaymentGateway, PaymentIntent};

/// Bot API host.
const API_BASE: &str = "https://api.telegram.org";

/// Telegram Stars gateway adapter.
pub struct TelegramStarsGateway {
    bot_token: SecretString,
    currency: Currency,
    api_base: String,
    http: reqwest::Client,
}

impl TelegramStarsGateway {
    pub fn new(bot_token: SecretString, currency: Currency, http: reqwest::Client) -> Self {
        Self {
            bot_token,
            currency,
            api_base: API_BASE.to_string(),
            http,
        }
    }

    /// Points the adapter at a different Bot API host (tests).
    pub fn with_api_base(mut self, base: impl Into<String>) -> Self {
        self.api_base = base.into();
        self
    }

    fn invoice_body(&self, request: &CreatePaymentRequest) -> serde_json::Value {
        // Stars invoices take whole-unit integer amounts and a single
        // labeled price; the payload is our transaction id, echoed back in
        // the successful_payment update.
        json!({
            "title": request.description,
            "description": request.description,
            "payload": request.transaction_id.to_string(),
            "currency": self.currency.code(),
            "prices": [{
                "label": self.currency.code(),
                "amount": request.amount.whole_units(),
            }],
        })
    }
}

/// Extracts the invoice link from a Bot API response envelope.
fn parse_invoice_response(response: &serde_json::Value) -> Result<PaymentIntent, GatewayError> {
    let ok = response.get("ok").and_then(|v| v.as_bool()).unwrap_or(false);
    if !ok {
        let description = response
            .get("description")
            .and_then(|v| v.as_str())
            .unwrap_or("no description");
        return Err(GatewayError::Unavailable(format!(
            "Bot API error: {}",
            description
        )));
    }

    let link = response
        .get("result")
        .and_then(|v| v.as_str())
        .ok_or_else(|| GatewayError::MalformedPayload("invoice response missing 'result'".into()))?;

    Ok(PaymentIntent {
        // Telegram assigns its charge id only at payment time; there is
        // nothing to bind yet.
        provider_payment_id: None,
        action: PaymentAction::Invoice {
            link: link.to_string(),
        },
    })
}

#[async_trait]
impl PaymentGateway for TelegramStarsGateway {
    fn kind(&self) -> GatewayKind {
        GatewayKind::TelegramStars
    }

    async fn create_payment(
        &self,
        request: CreatePaymentRequest,
    ) -> Result<PaymentIntent, GatewayError> {
        if !request.amount.is_positive() {
            return Err(GatewayError::InvalidAmount(request.amount.amount));
        }

        let url = format!(
            "{}/bot{}/createInvoiceLink",
            self.api_base,
            self.bot_token.expose_secret()
        );

        let response = self
            .http
            .post(&url)
            .json(&self.invoice_body(&request))
            .send()
            .await
            .map_err(|e| {
                tracing::warn!(error = %e, "createInvoiceLink request failed");
                GatewayError::Unavailable(e.to_string())
            })?;

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| GatewayError::MalformedPayload(format!("invalid JSON: {}", e)))?;

        parse_invoice_response(&body)
    }

    fn parse_webhook(
        &self,
        _body: &[u8],
        _headers: &HeaderMap,
    ) -> Result<WebhookOutcome, GatewayError> {
        // No HTTP surface: confirmation travels through the platform update
        // stream, never through a webhook endpoint.
        Err(GatewayError::NotSupported)
    }

    fn authenticate(
        &self,
        _body: &[u8],
        _headers: &HeaderMap,
        _source_ip: IpAddr,
    ) -> Result<bool, GatewayError> {
        Err(GatewayError::NotSupported)
    }
}
