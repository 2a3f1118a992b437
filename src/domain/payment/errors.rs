//! Error taxonomy for the payment flow.
//!
//! Maps every failure mode to an HTTP status so providers retry exactly
//! when we want them to: 2xx acknowledges (including duplicates), 4xx
//! stops redelivery, 5xx invites another attempt.

use axum::http::StatusCode;
use thiserror::Error;

use crate::domain::foundation::{DomainError, TransactionId};
use crate::ports::GatewayError;

use super::GatewayKind;

/// Errors raised by payment initiation and webhook processing.
#[derive(Debug, Error)]
pub enum PaymentError {
    /// Gateway disabled or credentials missing; rejected before any call.
    #[error("Gateway {gateway} is not usable: {reason}")]
    Configuration {
        gateway: GatewayKind,
        reason: String,
    },

    /// Untrusted webhook origin or bad signature. Rejected before parsing,
    /// never retried, no ledger mutation.
    #[error("Webhook authentication failed for {gateway}")]
    Authentication { gateway: GatewayKind },

    /// Failure inside a gateway operation (amount validation, provider
    /// outage, unparseable or unsupported payload).
    #[error(transparent)]
    Gateway(#[from] GatewayError),

    /// Webhook references a transaction the ledger never created.
    #[error("Unknown transaction: {reference}")]
    UnknownTransaction { reference: String },

    /// The subscription side effect failed after the transaction was
    /// already committed as completed. Money was received; the transaction
    /// is not rolled back and the failure is surfaced for reconciliation.
    #[error("Subscription extension failed for transaction {transaction_id}: {source}")]
    Extension {
        transaction_id: TransactionId,
        source: DomainError,
    },

    /// Storage failure.
    #[error("Storage error: {0}")]
    Storage(DomainError),
}

impl PaymentError {
    /// Shorthand for configuration rejections.
    pub fn configuration(gateway: GatewayKind, reason: impl Into<String>) -> Self {
        PaymentError::Configuration {
            gateway,
            reason: reason.into(),
        }
    }

    /// True if the provider should redeliver the webhook later.
    ///
    /// Only infrastructure trouble on our side qualifies; authentication
    /// and parse failures are final for that delivery.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            PaymentError::Storage(_) | PaymentError::Extension { .. }
        )
    }

    /// Maps the error to the HTTP status returned to the provider.
    pub fn status_code(&self) -> StatusCode {
        match self {
            // Rejected before any work - the provider is misconfigured on
            // our side, redelivery won't help
            PaymentError::Configuration { .. } => StatusCode::SERVICE_UNAVAILABLE,

            // Untrusted origin - don't reveal more than necessary
            PaymentError::Authentication { .. } => StatusCode::UNAUTHORIZED,

            PaymentError::Gateway(err) => match err {
                GatewayError::InvalidAmount(_) => StatusCode::UNPROCESSABLE_ENTITY,
                GatewayError::Unavailable(_) => StatusCode::BAD_GATEWAY,
                GatewayError::MalformedPayload(_) | GatewayError::UnsupportedStatus(_) => {
                    StatusCode::BAD_REQUEST
                }
                GatewayError::NotSupported => StatusCode::METHOD_NOT_ALLOWED,
            },

            // Flagged for manual follow-up, never silently accepted
            PaymentError::UnknownTransaction { .. } => StatusCode::NOT_FOUND,

            // Our side failed after taking the money - retryable
            PaymentError::Extension { .. } | PaymentError::Storage(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl From<DomainError> for PaymentError {
    fn from(err: DomainError) -> Self {
        PaymentError::Storage(err)
    }
}
