//! TransactionRepository port - persistent storage for payment transactions.
//!
//! The repository is where the ledger's concurrency guarantees live: the
//! resolving update is a compare-and-swap scoped to the transaction row
//! (`WHERE status = 'pending'`), so two concurrent duplicate deliveries
//! serialize at the storage layer and exactly one observes `Applied`.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, Timestamp, TransactionId};
use crate::domain::payment::{Transaction, TransactionStatus};

/// Result of the guarded resolving update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolveResult {
    /// This caller won the race; the row was transitioned.
    Applied,
    /// The row was no longer pending; another caller got there first.
    AlreadyResolved,
}

/// Port for storing and transitioning payment transactions.
///
/// Rows are never deleted; terminal rows are the audit trail.
#[async_trait]
pub trait TransactionRepository: Send + Sync {
    /// Insert a freshly opened pending transaction.
    ///
    /// Fails with `TransactionExists` if the id is already present.
    async fn insert(&self, transaction: &Transaction) -> Result<(), DomainError>;

    /// Find a transaction by our id.
    async fn find_by_id(&self, id: &TransactionId) -> Result<Option<Transaction>, DomainError>;

    /// Find a transaction by the provider's payment id.
    async fn find_by_external_id(
        &self,
        external_id: &str,
    ) -> Result<Option<Transaction>, DomainError>;

    /// Bind the provider's payment id to a transaction, first write wins.
    ///
    /// Implementations must guard with `WHERE external_id IS NULL`; a second
    /// call with a different id is a silent no-op at the storage layer and
    /// the id already bound stays immutable.
    async fn bind_external_id(
        &self,
        id: &TransactionId,
        external_id: &str,
    ) -> Result<(), DomainError>;

    /// Atomically transition a pending transaction to a terminal status.
    ///
    /// Sets status and `resolved_at`, and binds `external_id` when provided
    /// and still unset. Guarded by `WHERE status = 'pending'`: returns
    /// `AlreadyResolved` without touching the row when the transaction is
    /// no longer pending.
    async fn mark_resolved(
        &self,
        id: &TransactionId,
        status: TransactionStatus,
        external_id: Option<&str>,
        resolved_at: Timestamp,
    ) -> Result<ResolveResult, DomainError>;

    /// List pending transactions created before the cutoff (sweep input).
    async fn list_pending_older_than(
        &self,
        cutoff: Timestamp,
    ) -> Result<Vec<Transaction>, DomainError>;
}
