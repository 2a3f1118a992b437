//! PostgreSQL implementation of TransactionRepository.
//!
//! The idempotency guard lives here: `mark_resolved` is a single UPDATE
//! filtered on `status = 'pending'`, so concurrent duplicate deliveries
//! serialize on the row and exactly one caller sees an affected row.
//! `bind_external_id` is guarded the same way with `external_id IS NULL`,
//! which keeps the provider id immutable once bound.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::foundation::{
    Currency, DomainError, ErrorCode, Money, PlanId, Timestamp, TransactionId, UserId,
};
use crate::domain::payment::{GatewayKind, Transaction, TransactionStatus};
use crate::ports::{ResolveResult, TransactionRepository};

/// PostgreSQL implementation of the TransactionRepository port.
pub struct PostgresTransactionRepository {
    pool: PgPool,
}

impl PostgresTransactionRepository {
    /// Creates a new repository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Database row representation of a transaction.
#[derive(Debug, sqlx::FromRow)]
struct TransactionRow {
    id: Uuid,
    user_id: String,
    gateway: String,
    external_id: Option<String>,
    amount: Decimal,
    currency: String,
    plan_id: String,
    duration_days: i32,
    description: String,
    status: String,
    created_at: DateTime<Utc>,
    resolved_at: Option<DateTime<Utc>>,
}

impl TryFrom<TransactionRow> for Transaction {
    type Error = DomainError;

    fn try_from(row: TransactionRow) -> Result<Self, Self::Error> {
        let gateway: GatewayKind = row
            .gateway
            .parse()
            .map_err(|_| bad_column("gateway", &row.gateway))?;
        let status = parse_status(&row.status)?;
        let currency: Currency = row
            .currency
            .parse()
            .map_err(|_| bad_column("currency", &row.currency))?;

        Ok(Transaction {
            id: TransactionId::from_uuid(row.id),
            user_id: UserId::new(row.user_id)
                .map_err(|e| DomainError::new(ErrorCode::DatabaseError, e.to_string()))?,
            gateway,
            external_id: row.external_id,
            amount: Money::new(row.amount, currency),
            plan_id: PlanId::new(row.plan_id)
                .map_err(|e| DomainError::new(ErrorCode::DatabaseError, e.to_string()))?,
            duration_days: row.duration_days.max(0) as u32,
            description: row.description,
            status,
            created_at: Timestamp::from_datetime(row.created_at),
            resolved_at: row.resolved_at.map(Timestamp::from_datetime),
        })
    }
}

fn parse_status(s: &str) -> Result<TransactionStatus, DomainError> {
    match s {
        "pending" => Ok(TransactionStatus::Pending),
        "completed" => Ok(TransactionStatus::Completed),
        "canceled" => Ok(TransactionStatus::Canceled),
        "failed" => Ok(TransactionStatus::Failed),
        other => Err(bad_column("status", other)),
    }
}

fn bad_column(column: &str, value: &str) -> DomainError {
    DomainError::new(
        ErrorCode::DatabaseError,
        format!("Invalid {} value: {}", column, value),
    )
}

fn db_error(context: &str, e: sqlx::Error) -> DomainError {
    DomainError::new(ErrorCode::DatabaseError, format!("{}: {}", context, e))
}

const SELECT_COLUMNS: &str = "id, user_id, gateway, external_id, amount, currency, plan_id, \
                              duration_days, description, status, created_at, resolved_at";

#[async_trait]
impl TransactionRepository for PostgresTransactionRepository {
    async fn insert(&self, transaction: &Transaction) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO transactions (
                id, user_id, gateway, external_id, amount, currency, plan_id,
                duration_days, description, status, created_at, resolved_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            "#,
        )
        .bind(transaction.id.as_uuid())
        .bind(transaction.user_id.as_str())
        .bind(transaction.gateway.as_str())
        .bind(&transaction.external_id)
        .bind(transaction.amount.amount)
        .bind(transaction.amount.currency.code())
        .bind(transaction.plan_id.as_str())
        .bind(transaction.duration_days as i32)
        .bind(&transaction.description)
        .bind(transaction.status.as_str())
        .bind(transaction.created_at.as_datetime())
        .bind(transaction.resolved_at.map(|t| *t.as_datetime()))
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.constraint() == Some("transactions_pkey") {
                    return DomainError::new(
                        ErrorCode::TransactionExists,
                        "Transaction id already exists",
                    );
                }
            }
            db_error("Failed to insert transaction", e)
        })?;

        Ok(())
    }

    async fn find_by_id(&self, id: &TransactionId) -> Result<Option<Transaction>, DomainError> {
        let row: Option<TransactionRow> = sqlx::query_as(&format!(
            "SELECT {} FROM transactions WHERE id = $1",
            SELECT_COLUMNS
        ))
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("Failed to load transaction", e))?;

        row.map(Transaction::try_from).transpose()
    }

    async fn find_by_external_id(
        &self,
        external_id: &str,
    ) -> Result<Option<Transaction>, DomainError> {
        let row: Option<TransactionRow> = sqlx::query_as(&format!(
            "SELECT {} FROM transactions WHERE external_id = $1",
            SELECT_COLUMNS
        ))
        .bind(external_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("Failed to load transaction by external id", e))?;

        row.map(Transaction::try_from).transpose()
    }

    async fn bind_external_id(
        &self,
        id: &TransactionId,
        external_id: &str,
    ) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            UPDATE transactions
            SET external_id = $2
            WHERE id = $1 AND external_id IS NULL
            "#,
        )
        .bind(id.as_uuid())
        .bind(external_id)
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("Failed to bind external id", e))?;

        Ok(())
    }

    async fn mark_resolved(
        &self,
        id: &TransactionId,
        status: TransactionStatus,
        external_id: Option<&str>,
        resolved_at: Timestamp,
    ) -> Result<ResolveResult, DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE transactions
            SET status = $2,
                resolved_at = $3,
                external_id = COALESCE(external_id, $4)
            WHERE id = $1 AND status = 'pending'
            "#,
        )
        .bind(id.as_uuid())
        .bind(status.as_str())
        .bind(resolved_at.as_datetime())
        .bind(external_id)
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("Failed to resolve transaction", e))?;

        if result.rows_affected() == 1 {
            Ok(ResolveResult::Applied)
        } else {
            Ok(ResolveResult::AlreadyResolved)
        }
    }

    async fn list_pending_older_than(
        &self,
        cutoff: Timestamp,
    ) -> Result<Vec<Transaction>, DomainError> {
        let rows: Vec<TransactionRow> = sqlx::query_as(&format!(
            "SELECT {} FROM transactions WHERE status = 'pending' AND created_at < $1 \
             ORDER BY created_at",
            SELECT_COLUMNS
        ))
        .bind(cutoff.as_datetime())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("Failed to list stale transactions", e))?;

        rows.into_iter().map(Transaction::try_from).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_round_trips_through_storage_form() {
        for status in [
            TransactionStatus::Pending,
            TransactionStatus::Completed,
            TransactionStatus::Canceled,
            TransactionStatus::Failed,
        ] {
            assert_eq!(parse_status(status.as_str()).unwrap(), status);
        }
    }

    #[test]
    fn unexpected_status_value_is_a_database_error() {
        let err = parse_status("refunded").unwrap_err();
        assert_eq!(err.code, ErrorCode::DatabaseError);
    }

    #[test]
    fn row_converts_to_transaction() {
        let row = TransactionRow {
            id: Uuid::new_v4(),
            user_id: "42".into(),
            gateway: "yookassa".into(),
            external_id: Some("prov-1".into()),
            amount: Decimal::from(100),
            currency: "RUB".into(),
            plan_id: "plan-30d".into(),
            duration_days: 30,
            description: "30 days of service".into(),
            status: "completed".into(),
            created_at: Utc::now(),
            resolved_at: Some(Utc::now()),
        };

        let tx = Transaction::try_from(row).unwrap();

        assert_eq!(tx.gateway, GatewayKind::Yookassa);
        assert_eq!(tx.status, TransactionStatus::Completed);
        assert_eq!(tx.amount.currency, Currency::Rub);
        assert_eq!(tx.duration_days, 30);
        assert!(tx.resolved_at.is_some());
    }

    #[test]
    fn row_with_unknown_gateway_fails_conversion() {
        let row = TransactionRow {
            id: Uuid::new_v4(),
            user_id: "42".into(),
            gateway: "paypal".into(),
            external_id: None,
            amount: Decimal::from(100),
            currency: "RUB".into(),
            plan_id: "plan-30d".into(),
            duration_days: 30,
            description: String::new(),
            status: "pending".into(),
            created_at: Utc::now(),
            resolved_at: None,
        };

        assert!(Transaction::try_from(row).is_err());
    }
}
