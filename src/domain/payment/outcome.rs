//! Canonical confirmation outcome produced by gateway parsing.
//!
//! Every confirmation channel - HTTP webhook or platform update - reduces
//! to a `WebhookOutcome` before it reaches the ledger, so the transition
//! function has exactly one input shape.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{Money, TransactionId};

/// How a confirmation names the transaction it belongs to.
///
/// Redirect providers call back with their own payment id, which was bound
/// to the transaction when the order was created. In-platform payments echo
/// our transaction id back in the invoice payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "by", content = "id", rename_all = "snake_case")]
pub enum PaymentReference {
    /// The provider's own payment id.
    External(String),
    /// Our transaction id, echoed back by the platform.
    Transaction(TransactionId),
}

impl std::fmt::Display for PaymentReference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PaymentReference::External(id) => write!(f, "external:{}", id),
            PaymentReference::Transaction(id) => write!(f, "transaction:{}", id),
        }
    }
}

/// Final status a provider can report for a payment.
///
/// Anything outside this set is a parse-time hard failure
/// (`GatewayError::UnsupportedStatus`), never silently mapped to pending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeStatus {
    Completed,
    Canceled,
}

/// Parsed confirmation, ready for the ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebhookOutcome {
    /// Key used to locate the transaction.
    pub reference: PaymentReference,

    /// Provider charge id, when the confirmation is the first place it
    /// appears (in-platform payments). Bound first-write-wins.
    pub external_id: Option<String>,

    /// What the provider reported.
    pub status: OutcomeStatus,

    /// Amount as reported by the provider, for cross-checking when present.
    pub amount: Option<Money>,
}
