//! Transaction aggregate - one payment attempt, end to end.
//!
//! A transaction is opened pending before anything is sent to a provider,
//! so a crash after the provider created its order still leaves a row to
//! reconcile against. Rows are never deleted; they resolve to a terminal
//! status and stay as the audit trail.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{
    Money, PlanId, StateMachine, Timestamp, TransactionId, UserId, ValidationError,
};

use super::{GatewayKind, TransactionStatus};

/// A payment transaction owned by the ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Our identity for the payment; also the provider-facing idempotence
    /// key / invoice payload.
    pub id: TransactionId,

    /// Who is paying.
    pub user_id: UserId,

    /// Which provider the payment runs through.
    pub gateway: GatewayKind,

    /// The provider's own payment id. Unset until the provider confirms the
    /// order; immutable once bound.
    pub external_id: Option<String>,

    /// Amount charged.
    pub amount: Money,

    /// Plan being purchased; consumed by the extension side effect.
    pub plan_id: PlanId,

    /// Purchased access duration in days.
    pub duration_days: u32,

    /// Purchase description shown on the payment page.
    pub description: String,

    /// Lifecycle status, mutated only through the ledger.
    pub status: TransactionStatus,

    pub created_at: Timestamp,

    /// When the transaction reached a terminal status.
    pub resolved_at: Option<Timestamp>,
}

impl Transaction {
    /// Opens a new pending transaction.
    pub fn open(
        user_id: UserId,
        gateway: GatewayKind,
        amount: Money,
        plan_id: PlanId,
        duration_days: u32,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: TransactionId::new(),
            user_id,
            gateway,
            external_id: None,
            amount,
            plan_id,
            duration_days,
            description: description.into(),
            status: TransactionStatus::Pending,
            created_at: Timestamp::now(),
            resolved_at: None,
        }
    }

    /// True once the transaction reached a terminal status.
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Binds the provider's payment id, first write wins.
    ///
    /// A second bind attempt with a different id is rejected; rebinding the
    /// same id is a no-op (providers repeat themselves).
    pub fn bind_external_id(&mut self, external_id: &str) -> Result<(), ValidationError> {
        match &self.external_id {
            None => {
                self.external_id = Some(external_id.to_string());
                Ok(())
            }
            Some(existing) if existing == external_id => Ok(()),
            Some(existing) => Err(ValidationError::invalid_format(
                "external_id",
                format!("Already bound to {}, refusing {}", existing, external_id),
            )),
        }
    }

    /// Transitions to a terminal status, stamping `resolved_at`.
    ///
    /// Only the ledger calls this, after winning the storage-level guard.
    pub fn resolve(
        &mut self,
        status: TransactionStatus,
        at: Timestamp,
    ) -> Result<(), ValidationError> {
        self.status = self.status.transition_to(status)?;
        self.resolved_at = Some(at);
        Ok(())
    }
}
