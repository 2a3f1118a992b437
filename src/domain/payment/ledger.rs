//! Transaction ledger - the state machine and idempotency guard.
//!
//! Owns every transaction from open to terminal. The resolving transition
//! is serialized per transaction by the repository's compare-and-swap
//! (`WHERE status = 'pending'`): of any number of concurrent duplicate
//! deliveries, exactly one wins the update and runs the subscription side
//! effect; the rest observe a terminal row and get the recorded outcome.
//!
//! ## Duplicate deliveries are not errors
//!
//! Providers deliver at least once. A callback naming an already-resolved
//! transaction returns the previous outcome without re-running the side
//! effect and without an error; that is the contract that absorbs retries.

use std::sync::Arc;

use crate::domain::foundation::{Money, PlanId, Timestamp, UserId};
use crate::ports::{ResolveResult, SubscriptionExtender, TransactionRepository};

use super::{
    GatewayKind, OutcomeStatus, PaymentError, PaymentReference, Transaction, TransactionStatus,
    WebhookOutcome,
};

/// Result of feeding a confirmation through the ledger.
#[derive(Debug, Clone)]
pub enum LedgerOutcome {
    /// This delivery performed the transition (and the side effect, for
    /// completions).
    Applied(Transaction),

    /// The transaction was already terminal; previous outcome returned,
    /// nothing re-run.
    Duplicate(Transaction),
}

impl LedgerOutcome {
    /// The transaction in its current (terminal) state.
    pub fn transaction(&self) -> &Transaction {
        match self {
            LedgerOutcome::Applied(tx) | LedgerOutcome::Duplicate(tx) => tx,
        }
    }

    /// True when this delivery was the one that performed the transition.
    pub fn was_applied(&self) -> bool {
        matches!(self, LedgerOutcome::Applied(_))
    }
}

/// The transaction state machine and idempotency guard.
pub struct TransactionLedger {
    repository: Arc<dyn TransactionRepository>,
    extender: Arc<dyn SubscriptionExtender>,
}

impl TransactionLedger {
    pub fn new(
        repository: Arc<dyn TransactionRepository>,
        extender: Arc<dyn SubscriptionExtender>,
    ) -> Self {
        Self {
            repository,
            extender,
        }
    }

    /// Opens a pending transaction.
    ///
    /// Called before anything is sent to a provider, so a crash mid-flight
    /// never leaves provider-side money without a row to reconcile against.
    pub async fn open(
        &self,
        user_id: UserId,
        gateway: GatewayKind,
        amount: Money,
        plan_id: PlanId,
        duration_days: u32,
        description: impl Into<String>,
    ) -> Result<Transaction, PaymentError> {
        let transaction =
            Transaction::open(user_id, gateway, amount, plan_id, duration_days, description);
        self.repository.insert(&transaction).await?;

        tracing::info!(
            transaction_id = %transaction.id,
            gateway = %transaction.gateway,
            amount = %transaction.amount,
            "Opened pending transaction"
        );

        Ok(transaction)
    }

    /// Binds the provider's payment id after order creation.
    ///
    /// First write wins; the repository ignores rebinding attempts.
    pub async fn bind_provider_id(
        &self,
        transaction: &Transaction,
        external_id: &str,
    ) -> Result<(), PaymentError> {
        self.repository
            .bind_external_id(&transaction.id, external_id)
            .await?;

        tracing::debug!(
            transaction_id = %transaction.id,
            external_id,
            "Bound provider payment id"
        );

        Ok(())
    }

    /// Applies a parsed confirmation to the transaction it names.
    ///
    /// # Algorithm
    ///
    /// 1. Locate the transaction by the outcome's reference.
    /// 2. Not found: `UnknownTransaction` - webhooks never create rows.
    /// 3. Terminal: return the recorded outcome (duplicate delivery).
    /// 4. Pending: compare-and-swap the transition; losing the race means
    ///    another delivery resolved it first, so re-read and report the
    ///    duplicate.
    /// 5. The winner of a transition to completed extends the subscription
    ///    exactly once, synchronously, before returning. Extension failure
    ///    surfaces as an error while the transaction stays completed.
    pub async fn resolve(&self, outcome: WebhookOutcome) -> Result<LedgerOutcome, PaymentError> {
        let mut transaction = self
            .find_by_reference(&outcome.reference)
            .await?
            .ok_or_else(|| PaymentError::UnknownTransaction {
                reference: outcome.reference.to_string(),
            })?;

        if transaction.is_terminal() {
            tracing::info!(
                transaction_id = %transaction.id,
                status = ?transaction.status,
                "Duplicate delivery for resolved transaction"
            );
            return Ok(LedgerOutcome::Duplicate(transaction));
        }

        if let Some(reported) = &outcome.amount {
            if *reported != transaction.amount {
                tracing::warn!(
                    transaction_id = %transaction.id,
                    expected = %transaction.amount,
                    reported = %reported,
                    "Provider reported a different amount than we charged"
                );
            }
        }

        let status = match outcome.status {
            OutcomeStatus::Completed => TransactionStatus::Completed,
            OutcomeStatus::Canceled => TransactionStatus::Canceled,
        };
        let resolved_at = Timestamp::now();

        let result = self
            .repository
            .mark_resolved(
                &transaction.id,
                status,
                outcome.external_id.as_deref(),
                resolved_at,
            )
            .await?;

        match result {
            ResolveResult::Applied => {
                if let Some(external_id) = &outcome.external_id {
                    // Mirrors what the guarded update wrote; a mismatch can
                    // only mean the id was already bound, which the storage
                    // layer keeps immutable.
                    let _ = transaction.bind_external_id(external_id);
                }
                transaction
                    .resolve(status, resolved_at)
                    .map_err(|e| PaymentError::Storage(e.into()))?;

                tracing::info!(
                    transaction_id = %transaction.id,
                    status = ?status,
                    "Transaction resolved"
                );

                if status == TransactionStatus::Completed {
                    self.extend_subscription(&transaction).await?;
                }

                Ok(LedgerOutcome::Applied(transaction))
            }
            ResolveResult::AlreadyResolved => {
                // Lost the race against a concurrent delivery; report what
                // the winner recorded.
                let current = self
                    .repository
                    .find_by_id(&transaction.id)
                    .await?
                    .unwrap_or(transaction);

                tracing::info!(
                    transaction_id = %current.id,
                    status = ?current.status,
                    "Concurrent delivery already resolved transaction"
                );

                Ok(LedgerOutcome::Duplicate(current))
            }
        }
    }

    /// Cancels pending transactions older than `ttl_secs`.
    ///
    /// The background sweep's entry point; goes through the same guarded
    /// transition as webhook deliveries, never around it. Returns how many
    /// transactions were canceled.
    pub async fn cancel_stale(&self, ttl_secs: u64) -> Result<u32, PaymentError> {
        let cutoff = Timestamp::now().minus_secs(ttl_secs);
        let stale = self.repository.list_pending_older_than(cutoff).await?;

        let mut canceled = 0u32;
        for transaction in stale {
            let result = self
                .repository
                .mark_resolved(
                    &transaction.id,
                    TransactionStatus::Canceled,
                    None,
                    Timestamp::now(),
                )
                .await?;

            if result == ResolveResult::Applied {
                canceled += 1;
                tracing::info!(
                    transaction_id = %transaction.id,
                    created_at = %transaction.created_at,
                    "Canceled stale pending transaction"
                );
            }
        }

        Ok(canceled)
    }

    async fn find_by_reference(
        &self,
        reference: &PaymentReference,
    ) -> Result<Option<Transaction>, PaymentError> {
        let found = match reference {
            PaymentReference::External(external_id) => {
                self.repository.find_by_external_id(external_id).await?
            }
            PaymentReference::Transaction(id) => self.repository.find_by_id(id).await?,
        };
        Ok(found)
    }

    async fn extend_subscription(&self, transaction: &Transaction) -> Result<(), PaymentError> {
        self.extender
            .extend(
                &transaction.user_id,
                &transaction.plan_id,
                transaction.duration_days,
            )
            .await
            .map_err(|source| {
                tracing::error!(
                    transaction_id = %transaction.id,
                    user_id = %transaction.user_id,
                    error = %source,
                    "Subscription extension failed after completed payment"
                );
                PaymentError::Extension {
                    transaction_id: transaction.id,
                    source,
                }
            })?;

        tracing::info!(
            transaction_id = %transaction.id,
            user_id = %transaction.user_id,
            plan_id = %transaction.plan_id,
            days = transaction.duration_days,
            "Subscription extended"
        );

        Ok(())
    }
}
