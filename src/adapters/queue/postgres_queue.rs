//! Postgres-backed task handoff.
//!
//! Outbox-style: tasks are inserted into a table in the same database the
//! ledger writes to, and external workers drain them. Keeps notification
//! handoff durable without introducing a broker dependency into the
//! payment core.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::foundation::{DomainError, ErrorCode};
use crate::ports::TaskQueue;

/// TaskQueue implementation writing to the `outbox_tasks` table.
pub struct PostgresTaskQueue {
    pool: PgPool,
}

impl PostgresTaskQueue {
    /// Creates a new queue with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TaskQueue for PostgresTaskQueue {
    async fn enqueue(&self, task: &str, payload: serde_json::Value) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO outbox_tasks (id, task, payload)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(task)
        .bind(payload)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(ErrorCode::QueueError, format!("Failed to enqueue task: {}", e))
        })?;

        tracing::debug!(task, "Task enqueued");
        Ok(())
    }
}
