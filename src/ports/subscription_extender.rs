//! SubscriptionExtender port - the subscription service boundary.
//!
//! The ledger invokes this exactly once per completed transaction. The
//! implementation lives outside the payment core (subscription management
//! owns plan semantics and the panel integration).

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, PlanId, Timestamp, UserId};

/// Summary of a subscription after an extension was applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscriptionPeriod {
    /// Plan the subscription is on after the extension.
    pub plan_id: PlanId,
    /// When access now ends.
    pub expires_at: Timestamp,
}

/// Port for extending a user's subscription after payment.
#[async_trait]
pub trait SubscriptionExtender: Send + Sync {
    /// Extend `user`'s subscription on `plan` by `duration_days`.
    ///
    /// Must be safe to call for users without an existing subscription
    /// (a fresh period starts now). Failures are surfaced to the caller for
    /// reconciliation; the paid transaction is already durable by the time
    /// this runs and is never rolled back.
    async fn extend(
        &self,
        user_id: &UserId,
        plan_id: &PlanId,
        duration_days: u32,
    ) -> Result<SubscriptionPeriod, DomainError>;
}
