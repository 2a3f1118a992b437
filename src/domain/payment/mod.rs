//! Payment domain - transactions, reconciliation, webhook authentication.
//!
//! The flow: a pending `Transaction` is opened before any provider call, a
//! gateway turns the provider's confirmation into a `WebhookOutcome`, and
//! the `TransactionLedger` applies it exactly once. `WebhookAuthenticator`
//! decides whether a callback is worth parsing at all.

mod authenticator;
mod errors;
mod gateway_kind;
mod ledger;
mod outcome;
mod status;
mod transaction;

pub use authenticator::{compute_signature, WebhookAuthenticator};
pub use errors::PaymentError;
pub use gateway_kind::GatewayKind;
pub use ledger::{LedgerOutcome, TransactionLedger};
pub use outcome::{OutcomeStatus, PaymentReference, WebhookOutcome};
pub use status::TransactionStatus;
pub use transaction::Transaction;
