//! PostgreSQL adapters.

mod transaction_repository;

pub use transaction_repository::PostgresTransactionRepository;
