//! HandleGatewayWebhookHandler - Command handler for inbound provider webhooks.
//!
//! Fixed order: authenticate, parse, resolve. A failure at either of the
//! first two steps stops processing before the ledger is touched.

use std::net::IpAddr;
use std::sync::Arc;

use http::HeaderMap;

use crate::domain::foundation::TransactionId;
use crate::domain::payment::{
    GatewayKind, LedgerOutcome, PaymentError, Transaction, TransactionLedger, TransactionStatus,
};
use crate::ports::{GatewayFactory, TaskQueue};

/// Command carrying a raw provider callback.
#[derive(Debug, Clone)]
pub struct HandleGatewayWebhookCommand {
    /// Which provider's endpoint received the callback.
    pub gateway: GatewayKind,
    /// Raw request body, untouched for signature verification.
    pub body: Vec<u8>,
    /// Request headers.
    pub headers: HeaderMap,
    /// Peer address the callback arrived from.
    pub source_ip: IpAddr,
}

/// Result of webhook processing.
#[derive(Debug, Clone)]
pub enum HandleGatewayWebhookResult {
    /// This delivery performed the transition.
    Resolved {
        transaction_id: TransactionId,
        status: TransactionStatus,
    },
    /// Duplicate delivery; previously recorded outcome returned.
    Duplicate {
        transaction_id: TransactionId,
        status: TransactionStatus,
    },
}

/// Handler for inbound provider webhooks.
pub struct HandleGatewayWebhookHandler {
    factory: Arc<dyn GatewayFactory>,
    ledger: Arc<TransactionLedger>,
    task_queue: Arc<dyn TaskQueue>,
}

impl HandleGatewayWebhookHandler {
    pub fn new(
        factory: Arc<dyn GatewayFactory>,
        ledger: Arc<TransactionLedger>,
        task_queue: Arc<dyn TaskQueue>,
    ) -> Self {
        Self {
            factory,
            ledger,
            task_queue,
        }
    }

    pub async fn handle(
        &self,
        cmd: HandleGatewayWebhookCommand,
    ) -> Result<HandleGatewayWebhookResult, PaymentError> {
        let gateway = self.factory.create(cmd.gateway)?;

        // 1. Authenticate the origin before reading a byte of payload.
        let trusted = gateway
            .authenticate(&cmd.body, &cmd.headers, cmd.source_ip)
            .map_err(PaymentError::Gateway)?;
        if !trusted {
            tracing::warn!(
                gateway = %cmd.gateway,
                source_ip = %cmd.source_ip,
                "Rejected webhook from untrusted source"
            );
            return Err(PaymentError::Authentication {
                gateway: cmd.gateway,
            });
        }

        // 2. Parse into the canonical outcome.
        let outcome = gateway
            .parse_webhook(&cmd.body, &cmd.headers)
            .map_err(|err| {
                // Money may be in flight at the provider: keep the payload
                // visible for manual follow-up.
                tracing::error!(
                    gateway = %cmd.gateway,
                    error = %err,
                    body = %String::from_utf8_lossy(&cmd.body),
                    "Unprocessable webhook payload"
                );
                PaymentError::Gateway(err)
            })?;

        // 3. Apply through the ledger.
        match self.ledger.resolve(outcome).await? {
            LedgerOutcome::Applied(transaction) => {
                if transaction.status == TransactionStatus::Completed {
                    self.enqueue_completed_notification(&transaction).await;
                }
                Ok(HandleGatewayWebhookResult::Resolved {
                    transaction_id: transaction.id,
                    status: transaction.status,
                })
            }
            LedgerOutcome::Duplicate(transaction) => Ok(HandleGatewayWebhookResult::Duplicate {
                transaction_id: transaction.id,
                status: transaction.status,
            }),
        }
    }

    /// Best-effort notification handoff; the payment is already durable and
    /// a queue hiccup must not turn a completed webhook into a retry.
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
