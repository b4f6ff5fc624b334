//! # Payment Repository
//!
//! Database operations for provider payments.

use sqlx::SqlitePool;
use tracing::debug;

use shopdash_core::validation::validate_payment;
use shopdash_core::Payment;

use super::fetch_rows;
use crate::error::DbResult;
use crate::query::Query;

/// Repository for payment database operations.
#[derive(Debug, Clone)]
pub struct PaymentRepository {
    pool: SqlitePool,
}

impl PaymentRepository {
    /// Creates a new PaymentRepository.
    pub fn new(pool: SqlitePool) -> Self {
        PaymentRepository { pool }
    }

    /// Lists payments matching `query`.
    pub async fn find(&self, query: &Query) -> DbResult<Vec<Payment>> {
        let payments: Vec<Payment> = fetch_rows::<Payment, Payment>(&self.pool, query).await?;
        debug!(count = payments.len(), "Fetched payments");
        Ok(payments)
    }

    /// Records a payment against an existing order.
    pub async fn insert(&self, payment: &Payment) -> DbResult<()> {
        debug!(
            order_id = %payment.order_id,
            amount_cents = payment.amount_cents,
            provider = %payment.provider,
            "Recording payment"
        );
        validate_payment(payment)?;

        sqlx::query(
            r#"
            INSERT INTO payments (
                id, order_id, provider, transaction_id, payment_status,
                amount_cents, fee_cents, net_amount_cents, currency,
                created_at, completed_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            "#,
        )
        .bind(&payment.id)
        .bind(&payment.order_id)
        .bind(payment.provider)
        .bind(&payment.transaction_id)
        .bind(payment.payment_status)
        .bind(payment.amount_cents)
        .bind(payment.fee_cents)
        .bind(payment.net_amount_cents)
        .bind(&payment.currency)
        .bind(payment.created_at)
        .bind(payment.completed_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::pool::{Database, DbConfig};
    use crate::query::Query;
    use crate::testing::{at, contact, order, payment};
    use shopdash_core::{CustomerType, OrderStatus, PaymentStatus};

    #[tokio::test]
    async fn test_insert_and_filter_by_status() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.contacts().insert(&contact("c1", CustomerType::Customer)).await.unwrap();
        db.orders()
            .insert(&order("o1", "c1", OrderStatus::Paid, 5070, at(2025, 1, 10)))
            .await
            .unwrap();

        let repo = db.payments();
        repo.insert(&payment("p1", "o1", PaymentStatus::Completed, 5070)).await.unwrap();
        repo.insert(&payment("p2", "o1", PaymentStatus::Failed, 5070)).await.unwrap();

        let completed = repo
            .find(&Query::new().eq("payment_status", PaymentStatus::Completed))
            .await
            .unwrap();
        assert_eq!(completed.len(), 1);
        assert_eq!(completed[0].fee_cents, 172);
        assert_eq!(completed[0].net_amount_cents, 4898);
    }
}
