//! TaskQueue port - asynchronous task handoff for outbound notifications.
//!
//! Payment completion enqueues a notification task; delivery (bot message,
//! email) is owned by workers outside this core.

use async_trait::async_trait;

use crate::domain::foundation::DomainError;

/// Port for enqueueing background tasks.
#[async_trait]
pub trait TaskQueue: Send + Sync {
    /// Enqueue `task` with a JSON payload.
    ///
    /// Enqueueing is fire-and-forget from the payment flow's perspective;
    /// a failure is logged and surfaced but never rolls back a completed
    /// transaction.
    async fn enqueue(&self, task: &str, payload: serde_json::Value) -> Result<(), DomainError>;
}
