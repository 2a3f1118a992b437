//! Payment gateway port for external payment providers.
//!
//! Defines the contract every provider integration implements: creating a
//! payment order, parsing the provider's confirmation callback into a
//! canonical outcome, and authenticating the callback's origin.
//!
//! # Design
//!
//! - **Provider agnostic**: the orchestrator and ledger only see this trait
//! - **Open/closed**: adding a provider is a new implementation, never a
//!   branch in existing code
//! - **Fail closed**: gateways without an HTTP callback surface reject both
//!   `parse_webhook` and `authenticate` with `NotSupported`

use std::net::IpAddr;
use std::sync::Arc;

use async_trait::async_trait;
use http::HeaderMap;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::foundation::{Money, TransactionId};
use crate::domain::payment::{GatewayKind, PaymentError, WebhookOutcome};

/// Port for payment provider integrations.
///
/// `create_payment` is safe for the caller to retry until a result has been
/// handed to the user; the core never retries it automatically.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// The provider this gateway talks to.
    fn kind(&self) -> GatewayKind;

    /// Create a payment order with the provider.
    ///
    /// Returns the provider-side handle the user needs to pay (a hosted
    /// checkout redirect or an in-platform invoice link).
    ///
    /// # Errors
    ///
    /// - `InvalidAmount` - amount is zero or negative, nothing was sent
    /// - `Unavailable` - network or provider failure, propagated to the caller
    /// - `MalformedPayload` - provider answered with an unusable response
    async fn create_payment(
        &self,
        request: CreatePaymentRequest,
    ) -> Result<PaymentIntent, GatewayError>;

    /// Parse a provider callback into a canonical outcome.
    ///
    /// # Errors
    ///
    /// - `MalformedPayload` - required fields are absent or not JSON
    /// - `UnsupportedStatus` - the provider reported a status outside the
    ///   variant's known set (hard failure, never mapped to pending)
    /// - `NotSupported` - this gateway has no HTTP callback surface
    fn parse_webhook(&self, body: &[u8], headers: &HeaderMap)
        -> Result<WebhookOutcome, GatewayError>;

    /// Check whether an inbound callback originates from the provider.
    ///
    /// Pure predicate: `Ok(true)` means trusted, `Ok(false)` means reject.
    /// Runs before any payload parsing and never touches stored state.
    ///
    /// # Errors
    ///
    /// - `NotSupported` - this gateway has no HTTP callback surface;
    ///   confirmation arrives through the platform update channel instead
    fn authenticate(
        &self,
        body: &[u8],
        headers: &HeaderMap,
        source_ip: IpAddr,
    ) -> Result<bool, GatewayError>;
}

/// Port for resolving the gateway that serves a provider kind.
///
/// Implementations validate enablement and credentials before handing a
/// gateway out; a disabled or misconfigured provider is rejected with
/// `PaymentError::Configuration` and no network traffic happens.
pub trait GatewayFactory: Send + Sync {
    /// Build (or fetch) the gateway for `kind`.
    fn create(&self, kind: GatewayKind) -> Result<Arc<dyn PaymentGateway>, PaymentError>;
}

/// Request to create a payment order with a provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePaymentRequest {
    /// Our transaction id; travels to the provider as the idempotence key
    /// or invoice payload so confirmations can be correlated back.
    pub transaction_id: TransactionId,

    /// Amount to charge.
    pub amount: Money,

    /// Human-readable purchase description shown on the payment page.
    pub description: String,
}

/// Provider-side result of creating a payment order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentIntent {
    /// The provider's own id for the order, when the provider assigns one
    /// at creation time (redirect gateways do; in-platform invoices don't).
    pub provider_payment_id: Option<String>,

    /// How the user completes the payment.
    pub action: PaymentAction,
}

/// The user-facing continuation of a created payment.
///
/// A sum type rather than one overloaded url string: redirect checkouts and
/// in-platform invoices are different things and callers render them
/// differently.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PaymentAction {
    /// Send the user to the provider's hosted checkout page.
    Redirect { url: String },

    /// Present an in-platform invoice the user pays without leaving the chat.
    Invoice { link: String },
}

impl PaymentAction {
    /// The link to present, whichever shape it takes.
    pub fn link(&self) -> &str {
        match self {
            PaymentAction::Redirect { url } => url,
            PaymentAction::Invoice { link } => link,
        }
    }
}

/// Errors from payment gateway operations.
#[derive(Debug, Clone, Error)]
pub enum GatewayError {
    /// Payment amounts must be strictly positive.
    #[error("Invalid amount: {0}")]
    InvalidAmount(Decimal),

    /// Network or provider-side failure; the caller may retry with backoff
    /// until a payment result has been returned to the user.
    #[error("Gateway unavailable: {0}")]
    Unavailable(String),

    /// Payload or provider response is missing required fields.
    #[error("Malformed payload: {0}")]
    MalformedPayload(String),

    /// Provider reported a status string outside the known set.
    #[error("Unsupported payment status '{0}'")]
    UnsupportedStatus(String),

    /// The operation does not exist for this gateway.
    #[error("Operation not supported by this gateway")]
    NotSupported,
}

impl GatewayError {
    /// True for failures that a retry might resolve.
    pub fn is_retryable(&self) -> bool {
        matches!(self, GatewayError::Unavailable(_))
    }
}
