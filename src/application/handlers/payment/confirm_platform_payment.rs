//! ConfirmPlatformPaymentHandler - Command handler for in-platform
//! payment confirmations.
//!
//! Telegram Stars payments have no HTTP webhook: the platform delivers a
//! `successful_payment` update through the bot's update stream. The bot
//! layer maps that update into this command; from here on the flow joins
//! the same ledger transition as every webhook.

use std::sync::Arc;

use rust_decimal::Decimal;

use crate::domain::foundation::{Currency, Money, TransactionId};
use crate::domain::payment::{
    LedgerOutcome, OutcomeStatus, PaymentError, PaymentReference, Transaction, TransactionLedger,
    TransactionStatus, WebhookOutcome,
};
use crate::ports::{GatewayError, TaskQueue};

/// Command carrying a `successful_payment` platform update.
#[derive(Debug, Clone)]
pub struct ConfirmPlatformPaymentCommand {
    /// The invoice payload we set at creation: our transaction id.
    pub invoice_payload: String,
    /// The platform's charge id, first known now.
    pub provider_charge_id: String,
    /// Currency code reported by the platform.
    pub currency: String,
    /// Amount in whole currency units as the platform reports it.
    pub total_amount: i64,
}

/// Result of confirming an in-platform payment.
#[derive(Debug, Clone)]
pub enum ConfirmPlatformPaymentResult {
    /// This update performed the transition.
    Resolved {
        transaction_id: TransactionId,
        status: TransactionStatus,
    },
    /// The platform re-delivered an update for a resolved transaction.
    Duplicate {
        transaction_id: TransactionId,
        status: TransactionStatus,
    },
}

/// Handler for in-platform payment confirmations.
pub struct ConfirmPlatformPaymentHandler {
    ledger: Arc<TransactionLedger>,
    task_queue: Arc<dyn TaskQueue>,
}

impl ConfirmPlatformPaymentHandler {
    pub fn new(ledger: Arc<TransactionLedger>, task_queue: Arc<dyn TaskQueue>) -> Self {
        Self { ledger, task_queue }
    }

    pub async fn handle(
        &self,
        cmd: ConfirmPlatformPaymentCommand,
    ) -> Result<ConfirmPlatformPaymentResult, PaymentError> {
        // The payload must be the transaction id we minted at initiation;
        // anything else never came from one of our invoices.
        let transaction_id: TransactionId = cmd.invoice_payload.parse().map_err(|_| {
            PaymentError::Gateway(GatewayError::MalformedPayload(format!(
                "invoice payload is not a transaction id: {}",
                cmd.invoice_payload
            )))
        })?;

        let amount = cmd
            .currency
            .parse::<Currency>()
            .ok()
            .map(|currency| Money::new(Decimal::from(cmd.total_amount), currency));

        let outcome = WebhookOutcome {
            reference: PaymentReference::Transaction(transaction_id),
            external_id: Some(cmd.provider_charge_id),
            // The platform only emits the update for a paid invoice.
            status: OutcomeStatus::Completed,
            amount,
        };

        match self.ledger.resolve(outcome).await? {
            LedgerOutcome::Applied(transaction) => {
                self.enqueue_completed_notification(&transaction).await;
                Ok(ConfirmPlatformPaymentResult::Resolved {
                    transaction_id: transaction.id,
                    status: transaction.status,
                })
            }
            LedgerOutcome::Duplicate(transaction) => {
                Ok(ConfirmPlatformPaymentResult::Duplicate {
                    transaction_id: transaction.id,
                    status: transaction.status,
                })
            }
        }
    }

    async fn enqueue_completed_notification(&self, transaction: &Transaction) {
        let payload = serde_json::json!({
            "transaction_id": transaction.id,
            "user_id": transaction.user_id,
            "plan_id": transaction.plan_id,
            "duration_days": transaction.duration_days,
        });

        if let Err(err) = self.task_queue.enqueue("payment.completed", payload).await {
            tracing::error!(
                transaction_id = %transaction.id,
                error = %err,
                "Failed to enqueue completion notification"
            );
        }
    }
}
