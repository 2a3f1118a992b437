//! TaskQueue adapters.

mod postgres_queue;

pub use postgres_queue::PostgresTaskQueue;
