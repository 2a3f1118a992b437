//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! ## Payment Ports
//!
//! - `PaymentGateway` - per-provider create/parse/authenticate contract
//! - `GatewayFactory` - resolves the gateway serving a provider kind
//! - `TransactionRepository` - transaction persistence and the row-level
//!   compare-and-swap the idempotency guard relies on
//!
//! ## Collaborator Ports (implemented outside this core)
//!
//! - `SubscriptionExtender` - applies a paid period to a subscription
//! - `SecretCipher` - decrypts stored gateway credentials on demand
//! - `TaskQueue` - hands off outbound notification tasks

mod payment_gateway;
mod secret_cipher;
mod subscription_extender;
mod task_queue;
mod transaction_repository;

pub use payment_gateway::{
    CreatePaymentRequest, GatewayError, GatewayFactory, PaymentAction, PaymentGateway,
    PaymentIntent,
};
pub use secret_cipher::SecretCipher;
pub use subscription_extender::{SubscriptionExtender, SubscriptionPeriod};
pub use task_queue::TaskQueue;
pub use transaction_repository::{ResolveResult, TransactionRepository};
