//! # Sales Repository
//!
//! Reads the `daily_sales` view: one row per UTC day over counted orders
//! (paid, processing, shipped, delivered).

use sqlx::SqlitePool;
use tracing::debug;

use shopdash_core::DailySalesPoint;

use super::fetch_rows;
use crate::error::DbResult;
use crate::query::{Direction, Query};

/// Repository for the daily sales aggregate.
#[derive(Debug, Clone)]
pub struct SalesRepository {
    pool: SqlitePool,
}

impl SalesRepository {
    /// Creates a new SalesRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SalesRepository { pool }
    }

    /// Lists daily sales matching `query`, oldest first unless the query
    /// says otherwise.
    pub async fn daily(&self, query: &Query) -> DbResult<Vec<DailySalesPoint>> {
        let mut query = query.clone();
        if query.order_by.is_none() {
            query = query.order_by("sale_date", Direction::Asc);
        }

        let points: Vec<DailySalesPoint> =
            fetch_rows::<DailySalesPoint, DailySalesPoint>(&self.pool, &query).await?;
        debug!(days = points.len(), "Fetched daily sales");
        Ok(points)
    }
}
