//! InitiatePaymentHandler - Command handler for starting a payment.
//!
//! Opens the pending transaction first, then asks the provider for an
//! order. The ordering is deliberate: a crash or timeout after the
//! provider call leaves a pending row to reconcile against instead of
//! provider-side money with no trace on our side.

use std::sync::Arc;
use std::time::Duration;

use crate::domain::foundation::{Money, PlanId, TransactionId, UserId};
use crate::domain::payment::{GatewayKind, PaymentError, TransactionLedger};
use crate::ports::{
    CreatePaymentRequest, GatewayError, GatewayFactory, PaymentAction, PaymentGateway,
    PaymentIntent,
};

/// Attempts per outbound order creation, including the first.
const CREATE_ATTEMPTS: u32 = 3;

/// Base delay for the exponential backoff between attempts.
const BACKOFF_BASE: Duration = Duration::from_millis(200);

/// Command to start a payment for a plan purchase.
#[derive(Debug, Clone)]
pub struct InitiatePaymentCommand {
    pub user_id: UserId,
    pub plan_id: PlanId,
    pub duration_days: u32,
    pub amount: Money,
    pub gateway: GatewayKind,
    pub description: String,
}

/// Result of a successful initiation: the handle the user pays with.
#[derive(Debug, Clone)]
pub struct InitiatePaymentResult {
    pub transaction_id: TransactionId,
    pub action: PaymentAction,
}

/// Handler for starting payments.
pub struct InitiatePaymentHandler {
    factory: Arc<dyn GatewayFactory>,
    ledger: Arc<TransactionLedger>,
}

impl InitiatePaymentHandler {
    pub fn new(factory: Arc<dyn GatewayFactory>, ledger: Arc<TransactionLedger>) -> Self {
        Self { factory, ledger }
    }

    pub async fn handle(
        &self,
        cmd: InitiatePaymentCommand,
    ) -> Result<InitiatePaymentResult, PaymentError> {
        // 1. Resolve the gateway; disabled or misconfigured providers are
        //    rejected before anything is persisted.
        let gateway = self.factory.create(cmd.gateway)?;

        // 2. Reject bad amounts before opening a row the sweep would have
        //    to clean up. The gateway enforces the same rule.
        if !cmd.amount.is_positive() {
            return Err(PaymentError::Gateway(GatewayError::InvalidAmount(
                cmd.amount.amount,
            )));
        }

        // 3. Pending transaction first, provider call second.
        let transaction = self
            .ledger
            .open(
                cmd.user_id,
                cmd.gateway,
                cmd.amount,
                cmd.plan_id,
                cmd.duration_days,
                cmd.description.clone(),
            )
            .await?;

        // 4. Create the provider order, retrying transient failures while
        //    no result has reached the user yet. If every attempt fails the
        //    transaction stays pending for the sweep - an audit trail, not
        //    garbage.
        let request = CreatePaymentRequest {
            transaction_id: transaction.id,
            amount: cmd.amount,
            description: cmd.description,
        };

        let intent = self.create_with_retry(gateway.as_ref(), request).await?;

        // 5. Redirect providers assign their payment id at creation; bind
        //    it now so their webhook can find the transaction.
        if let Some(provider_id) = &intent.provider_payment_id {
            self.ledger
                .bind_provider_id(&transaction, provider_id)
                .await?;
        }

        Ok(InitiatePaymentResult {
            transaction_id: transaction.id,
            action: intent.action,
        })
    }

    async fn create_with_retry(
        &self,
        gateway: &dyn PaymentGateway,
        request: CreatePaymentRequest,
    ) -> Result<PaymentIntent, PaymentError> {
        let mut attempt = 0u32;
        loop {
            match gateway.create_payment(request.clone()).await {
                Ok(intent) => return Ok(intent),
                Err(err) if err.is_retryable() && attempt + 1 < CREATE_ATTEMPTS => {
                    let delay = BACKOFF_BASE * 2u32.pow(attempt);
                    tracing::warn!(
                        transaction_id = %request.transaction_id,
                        attempt,
                        error = %err,
                        delay_ms = delay.as_millis() as u64,
                        "Order creation failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(err) => {
                    tracing::warn!(
                        transaction_id = %request.transaction_id,
                        error = %err,
                        "Order creation failed, transaction left pending"
                    );
                    return Err(PaymentError::Gateway(err));
                }
            }
        }
    }
}
