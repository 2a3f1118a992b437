//! Foundation layer - shared value objects for the payment domain.
//!
//! Contains strongly-typed identifiers, timestamps, money, error types,
//! and the state machine trait used by lifecycle status enums.

mod errors;
mod ids;
mod money;
mod state_machine;
mod timestamp;

pub use errors::{DomainError, ErrorCode, ValidationError};
pub use ids::{PlanId, TransactionId, UserId};
pub use money::{Currency, Money};
pub use state_machine::StateMachine;
pub use timestamp::Timestamp;
