//! # Order Repository
//!
//! Database operations for orders.
//!
//! ## Line Items as JSON
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  orders.items  TEXT                                                     │
//! │  '[{"product_id":"p1","product_name":"Bundle Branding",                 │
//! │     "quantity":2,"unit_price_cents":24900,"subtotal_cents":49800}]'     │
//! │                                                                         │
//! │  OrderRow (items: String) ──TryFrom──► Order (items: Vec<LineItem>)     │
//! │                                                                         │
//! │  The schema CHECK guards the total identity; the item sum is checked    │
//! │  on decode because SQLite cannot look inside the JSON.                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use sqlx::{FromRow, SqlitePool};
use tracing::{debug, warn};

use shopdash_core::validation::validate_order;
use shopdash_core::{LineItem, Order, OrderStatus};

use super::fetch_rows;
use crate::error::{DbError, DbResult};
use crate::query::Query;

/// Raw `orders` row.
#[derive(Debug, FromRow)]
struct OrderRow {
    id: String,
    order_number: String,
    contact_id: String,
    status: OrderStatus,
    items: String,
    subtotal_cents: i64,
    shipping_cents: i64,
    tax_cents: i64,
    discount_cents: i64,
    total_cents: i64,
    currency: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    paid_at: Option<DateTime<Utc>>,
}

impl TryFrom<OrderRow> for Order {
    type Error = DbError;

    fn try_from(row: OrderRow) -> Result<Self, Self::Error> {
        let items: Vec<LineItem> =
            serde_json::from_str(&row.items).map_err(|e| DbError::decode("Order", &row.id, e))?;

        let order = Order {
            id: row.id,
            order_number: row.order_number,
            contact_id: row.contact_id,
            status: row.status,
            items,
            subtotal_cents: row.subtotal_cents,
            shipping_cents: row.shipping_cents,
            tax_cents: row.tax_cents,
            discount_cents: row.discount_cents,
            total_cents: row.total_cents,
            currency: row.currency,
            created_at: row.created_at,
            updated_at: row.updated_at,
            paid_at: row.paid_at,
        };

        validate_order(&order).map_err(|e| DbError::decode("Order", &order.id, e))?;
        Ok(order)
    }
}

/// Repository for order database operations.
#[derive(Debug, Clone)]
pub struct OrderRepository {
    pool: SqlitePool,
}

impl OrderRepository {
    /// Creates a new OrderRepository.
    pub fn new(pool: SqlitePool) -> Self {
        OrderRepository { pool }
    }

    /// Lists orders matching `query`.
    ///
    /// ## Example
    /// ```rust,ignore
    /// let counted = db
    ///     .orders()
    ///     .find(&Query::new().is_in("status", COUNTED_STATUSES))
    ///     .await?;
    /// ```
    pub async fn find(&self, query: &Query) -> DbResult<Vec<Order>> {
        let rows: Vec<OrderRow> = fetch_rows::<Order, OrderRow>(&self.pool, query).await?;
        let orders = rows
            .into_iter()
            .map(Order::try_from)
            .collect::<DbResult<Vec<_>>>()
            .inspect_err(|e| warn!(error = %e, "Stored order failed to decode"))?;

        debug!(count = orders.len(), "Fetched orders");
        Ok(orders)
    }

    /// Gets an order by its ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Order>> {
        let row = sqlx::query_as::<_, OrderRow>("SELECT * FROM orders WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(Order::try_from).transpose()
    }

    /// Inserts a new order with its line items.
    ///
    /// ## Returns
    /// * `Err(DbError::Core)` - Totals don't add up
    /// * `Err(DbError::ForeignKeyViolation)` - Contact doesn't exist
    /// * `Err(DbError::UniqueViolation)` - Order number already exists
    pub async fn insert(&self, order: &Order) -> DbResult<()> {
        debug!(
            id = %order.id,
            order_number = %order.order_number,
            total_cents = order.total_cents,
            "Inserting order"
        );
        validate_order(order)?;

        let items = serde_json::to_string(&order.items)
            .map_err(|e| DbError::decode("Order", &order.id, e))?;

        sqlx::query(
            r#"
            INSERT INTO orders (
                id, order_number, contact_id, status, items,
                subtotal_cents, shipping_cents, tax_cents, discount_cents, total_cents,
                currency, created_at, updated_at, paid_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)
            "#,
        )
        .bind(&order.id)
        .bind(&order.order_number)
        .bind(&order.contact_id)
        .bind(order.status)
        .bind(items)
        .bind(order.subtotal_cents)
        .bind(order.shipping_cents)
        .bind(order.tax_cents)
        .bind(order.discount_cents)
        .bind(order.total_cents)
        .bind(&order.currency)
        .bind(order.created_at)
        .bind(order.updated_at)
        .bind(order.paid_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Moves an order to `status`, stamping `paid_at` the first time it
    /// becomes counted.
    pub async fn update_status(&self, id: &str, status: OrderStatus, now: DateTime<Utc>) -> DbResult<()> {
        debug!(id = %id, status = %status, "Updating order status");

        let paid_at = status.is_counted().then_some(now);
        let result = sqlx::query(
            r#"
            UPDATE orders SET
                status = ?2,
                updated_at = ?3,
                paid_at = COALESCE(paid_at, ?4)
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(status)
        .bind(now)
        .bind(paid_at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Order", id));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::pool::{Database, DbConfig};
    use crate::query::Query;
    use crate::testing::{at, contact, order};
    use crate::DbError;
    use shopdash_core::{CoreError, CustomerType, OrderStatus, ValidationError, COUNTED_STATUSES};

    async fn setup() -> Database {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.contacts().insert(&contact("c1", CustomerType::Customer)).await.unwrap();
        db
    }

    #[tokio::test]
    async fn test_items_round_trip_through_json() {
        let db = setup().await;
        let original = order("o1", "c1", OrderStatus::Paid, 3400, at(2025, 1, 10));
        db.orders().insert(&original).await.unwrap();

        let stored = db.orders().get_by_id("o1").await.unwrap().unwrap();
        assert_eq!(stored, original);
        assert_eq!(stored.items.len(), 1);
    }

    #[tokio::test]
    async fn test_find_counted_orders() {
        let db = setup().await;
        let repo = db.orders();
        repo.insert(&order("o1", "c1", OrderStatus::Paid, 1000, at(2025, 1, 10))).await.unwrap();
        repo.insert(&order("o2", "c1", OrderStatus::Draft, 2000, at(2025, 1, 11))).await.unwrap();
        repo.insert(&order("o3", "c1", OrderStatus::Delivered, 3000, at(2025, 1, 12))).await.unwrap();

        let counted = repo
            .find(&Query::new().is_in("status", COUNTED_STATUSES))
            .await
            .unwrap();
        let ids: Vec<_> = counted.iter().map(|o| o.id.as_str()).collect();
        assert_eq!(ids, vec!["o1", "o3"]);

        let recent = repo.find(&Query::new().gte("created_at", at(2025, 1, 11))).await.unwrap();
        assert_eq!(recent.len(), 2);
    }

    #[tokio::test]
    async fn test_unknown_contact_is_rejected() {
        let db = setup().await;
        let err = db
            .orders()
            .insert(&order("o1", "ghost", OrderStatus::Paid, 1000, at(2025, 1, 10)))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::ForeignKeyViolation { .. }));
    }

    #[tokio::test]
    async fn test_inconsistent_totals_are_rejected() {
        let db = setup().await;
        let mut broken = order("o1", "c1", OrderStatus::Paid, 1000, at(2025, 1, 10));
        broken.total_cents += 1;

        let err = db.orders().insert(&broken).await.unwrap_err();
        assert!(matches!(err, DbError::Core(_)));
    }

    #[tokio::test]
    async fn test_oversized_amounts_are_rejected() {
        let db = setup().await;
        let mut huge = order("o1", "c1", OrderStatus::Paid, 2, at(2025, 1, 10));
        huge.items[0].quantity = i64::MAX;

        let err = db.orders().insert(&huge).await.unwrap_err();
        assert!(matches!(
            err,
            DbError::Core(CoreError::Validation(ValidationError::OutOfRange { .. }))
        ));
        assert!(db.orders().get_by_id("o1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_status_stamps_paid_at_once() {
        let db = setup().await;
        let repo = db.orders();
        repo.insert(&order("o1", "c1", OrderStatus::Pending, 1000, at(2025, 1, 10))).await.unwrap();

        repo.update_status("o1", OrderStatus::Paid, at(2025, 1, 11)).await.unwrap();
        repo.update_status("o1", OrderStatus::Shipped, at(2025, 1, 12)).await.unwrap();

        let stored = repo.get_by_id("o1").await.unwrap().unwrap();
        assert_eq!(stored.status, OrderStatus::Shipped);
        assert_eq!(stored.paid_at, Some(at(2025, 1, 11)));

        let err = repo.update_status("nope", OrderStatus::Paid, at(2025, 1, 11)).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }
}
