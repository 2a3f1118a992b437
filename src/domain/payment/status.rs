//! Transaction status state machine.
//!
//! A transaction starts pending and resolves to exactly one terminal
//! status. There are no transitions out of a terminal status; duplicate
//! provider deliveries against a resolved transaction are answered from
//! the recorded outcome.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::StateMachine;

/// Lifecycle status of a payment transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionStatus {
    /// Opened, waiting for the provider's confirmation.
    Pending,

    /// Provider confirmed the payment; the subscription was extended.
    Completed,

    /// Provider reported cancellation, or the stale sweep gave up waiting.
    Canceled,

    /// Marked unrecoverable by an operator (provider dispute, broken order).
    Failed,
}

impl TransactionStatus {
    /// Stable string form used in storage.
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionStatus::Pending => "pending",
            TransactionStatus::Completed => "completed",
            TransactionStatus::Canceled => "canceled",
            TransactionStatus::Failed => "failed",
        }
    }
}

impl StateMachine for TransactionStatus {
    fn can_transition_to(&self, target: &Self) -> bool {
        use TransactionStatus::*;
        matches!(
            (self, target),
            (Pending, Completed) | (Pending, Canceled) | (Pending, Failed)
        )
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use TransactionStatus::*;
        match self {
            Pending => vec![Completed, Canceled, Failed],
            Completed | Canceled | Failed => vec![],
        }
    }
}
