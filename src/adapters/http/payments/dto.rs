//! Request/response DTOs for the payment endpoints.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::application::handlers::payment::InitiatePaymentResult;
use crate::domain::foundation::Currency;
use crate::domain::payment::GatewayKind;
use crate::ports::PaymentAction;

/// Body of `POST /payments`.
#[derive(Debug, Clone, Deserialize)]
pub struct CreatePaymentRequestBody {
    /// Plan being purchased.
    pub plan_id: String,

    /// Purchased access duration in days.
    pub duration_days: u32,

    /// Amount as a decimal string, e.g. "199.90".
    pub amount: Decimal,

    /// Charge currency.
    pub currency: Currency,

    /// Provider to pay through.
    pub gateway: GatewayKind,

    /// Purchase description shown on the payment page.
    #[serde(default)]
    pub description: Option<String>,
}

/// Response of `POST /payments`.
#[derive(Debug, Clone, Serialize)]
pub struct PaymentCreatedResponse {
    pub transaction_id: String,
    pub action: PaymentActionResponse,
}

/// How the user completes the payment.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PaymentActionResponse {
    Redirect { url: String },
    Invoice { link: String },
}

impl From<InitiatePaymentResult> for PaymentCreatedResponse {
    fn from(result: InitiatePaymentResult) -> Self {
        let action = match result.action {
            PaymentAction::Redirect { url } => PaymentActionResponse::Redirect { url },
            PaymentAction::Invoice { link } => PaymentActionResponse::Invoice { link },
        };
        Self {
            transaction_id: result.transaction_id.to_string(),
            action,
        }
    }
}

/// Acknowledgement returned to providers for accepted webhooks.
///
/// Duplicates acknowledge the same way as fresh deliveries; a provider
/// retrying a webhook only needs to see 200.
#[derive(Debug, Clone, Serialize)]
pub struct WebhookAckResponse {
    pub result: &'static str,
}

impl WebhookAckResponse {
    pub fn processed() -> Self {
        Self {
            result: "processed",
        }
    }

    pub fn duplicate() -> Self {
        Self {
            result: "duplicate",
        }
    }
}

/// Error payload for failed requests.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::TransactionId;

    #[test]
    fn create_body_deserializes_from_decimal_string() {
        let body: CreatePaymentRequestBody = serde_json::from_value(serde_json::json!({
            "plan_id": "plan-30d",
            "duration_days": 30,
            "amount": "199.90",
            "currency": "RUB",
            "gateway": "yookassa",
        }))
        .unwrap();

        assert_eq!(body.amount.to_string(), "199.90");
        assert_eq!(body.gateway, GatewayKind::Yookassa);
        assert!(body.description.is_none());
    }

    #[test]
    fn created_response_tags_the_action() {
        let result = InitiatePaymentResult {
            transaction_id: TransactionId::new(),
            action: PaymentAction::Redirect {
                url: "https://pay.example/abc".into(),
            },
        };
        let response = PaymentCreatedResponse::from(result);
        let json = serde_json::to_value(&response).unwrap();

        assert_eq!(json["action"]["type"], "redirect");
        assert_eq!(json["action"]["url"], "https://pay.example/abc");
    }
}
