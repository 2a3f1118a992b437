//! CancelStaleTransactionsHandler - sweep entry for abandoned payments.
//!
//! Checkout links expire; users wander off. An external scheduler runs
//! this periodically to cancel pending transactions older than the
//! configured TTL, going through the ledger's guarded transition like any
//! other resolution - a webhook racing the sweep loses or wins cleanly,
//! never both.

use std::sync::Arc;

use crate::domain::payment::{PaymentError, TransactionLedger};

/// Command to cancel pending transactions past their TTL.
#[derive(Debug, Clone)]
pub struct CancelStaleTransactionsCommand {
    /// Age in seconds beyond which a pending transaction is abandoned.
    pub ttl_secs: u64,
}

/// Result of a sweep run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CancelStaleTransactionsResult {
    /// How many transactions this run canceled.
    pub canceled: u32,
}

/// Handler for the stale-transaction sweep.
pub struct CancelStaleTransactionsHandler {
    ledger: Arc<TransactionLedger>,
}

impl CancelStaleTransactionsHandler {
    pub fn new(ledger: Arc<TransactionLedger>) -> Self {
        Self { ledger }
    }

    pub async fn handle(
        &self,
        cmd: CancelStaleTransactionsCommand,
    ) -> Result<CancelStaleTransactionsResult, PaymentError> {
        let canceled = self.ledger.cancel_stale(cmd.ttl_secs).await?;

        if canceled > 0 {
            tracing::info!(canceled, ttl_secs = cmd.ttl_secs, "Stale payment sweep finished");
        }

        Ok(CancelStaleTransactionsResult { canceled })
    }
}
