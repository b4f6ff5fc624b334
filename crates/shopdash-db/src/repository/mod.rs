//! # Repository Module
//!
//! SQLite repositories, one per entity set.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern                                   │
//! │                                                                         │
//! │  DashboardService / seed binary                                        │
//! │       │                                                                 │
//! │       │  db.orders().find(&Query::new().eq("contact_id", id))          │
//! │       ▼                                                                 │
//! │  OrderRepository                                                       │
//! │  ├── find(&self, query)        ← shared query contract                 │
//! │  ├── get_by_id(&self, id)                                              │
//! │  └── insert(&self, order)      ← validated before it is written        │
//! │       │                                                                 │
//! │       │  SELECT * FROM orders WHERE ... (bound parameters)             │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! │                                                                         │
//! │  Reads go through `fetch_rows`, so every repository interprets a       │
//! │  Query the same way.                                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`ContactRepository`](contact::ContactRepository) - CRM contacts
//! - [`OrderRepository`](order::OrderRepository) - Orders with JSON line items
//! - [`PaymentRepository`](payment::PaymentRepository) - Provider payments
//! - [`ProductRepository`](product::ProductRepository) - Catalog CRUD and search
//! - [`PromotionRepository`](promotion::PromotionRepository) - Promotions CRUD
//! - [`ReviewRepository`](review::ReviewRepository) - Customer reviews
//! - [`SalesRepository`](sales::SalesRepository) - `daily_sales` view

use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, QueryBuilder, Sqlite, SqlitePool};

use crate::error::DbResult;
use crate::query::{push_query, Query, Record};

pub mod contact;
pub mod order;
pub mod payment;
pub mod product;
pub mod promotion;
pub mod review;
pub mod sales;

/// Runs `query` against `R::TABLE` and decodes each row as `T`.
///
/// `T` is `R` itself for flat entities, or a row struct for entities with
/// JSON columns.
pub(crate) async fn fetch_rows<R, T>(pool: &SqlitePool, query: &Query) -> DbResult<Vec<T>>
where
    R: Record,
    T: for<'r> FromRow<'r, SqliteRow> + Send + Unpin,
{
    let mut builder = QueryBuilder::<Sqlite>::new(format!("SELECT * FROM {}", R::TABLE));
    push_query::<R>(&mut builder, query)?;

    let rows = builder.build_query_as::<T>().fetch_all(pool).await?;
    Ok(rows)
}
