//! Payment command handlers.
//!
//! Orchestration of the payment flow: initiation, webhook intake,
//! in-platform confirmation, and the stale sweep. Handlers wire the
//! gateway factory and the ledger together; all state transitions happen
//! inside the ledger.

mod cancel_stale_transactions;
mod confirm_platform_payment;
mod handle_gateway_webhook;
mod initiate_payment;

pub use cancel_stale_transactions::{
    CancelStaleTransactionsCommand, CancelStaleTransactionsHandler, CancelStaleTransactionsResult,
};
pub use confirm_platform_payment::{
    ConfirmPlatformPaymentCommand, ConfirmPlatformPaymentHandler, ConfirmPlatformPaymentResult,
};
pub use handle_gateway_webhook::{
    HandleGatewayWebhookCommand, HandleGatewayWebhookHandler, HandleGatewayWebhookResult,
};
pub use initiate_payment::{InitiatePaymentCommand, InitiatePaymentHandler, InitiatePaymentResult};
