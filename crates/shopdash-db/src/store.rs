//! # Entity Store
//!
//! The read interface the dashboard needs from a backend.
//!
//! ```text
//! ┌──────────────────────┐        ┌──────────────────────────────┐
//! │  DashboardService<S> │──────► │  S: EntityStore              │
//! └──────────────────────┘        │  ├── Database    (SQLite)    │
//!                                 │  └── MemoryStore (fixtures)  │
//!                                 └──────────────────────────────┘
//! ```
//!
//! Method names are prefixed with `find_` so they never shadow the
//! repository accessors on [`Database`].
//!
//! Both backends interpret [`Query`] with the same rules, so a service test
//! on a `MemoryStore` exercises the same semantics as production.

use std::future::Future;

use shopdash_core::{Contact, DailySalesPoint, Order, Payment, Product, Promotion, Review};

use crate::error::DbResult;
use crate::pool::Database;
use crate::query::Query;

/// Read access to every entity set.
pub trait EntityStore: Send + Sync {
    fn find_contacts(&self, query: &Query) -> impl Future<Output = DbResult<Vec<Contact>>> + Send;

    fn find_orders(&self, query: &Query) -> impl Future<Output = DbResult<Vec<Order>>> + Send;

    fn find_payments(&self, query: &Query) -> impl Future<Output = DbResult<Vec<Payment>>> + Send;

    fn find_products(&self, query: &Query) -> impl Future<Output = DbResult<Vec<Product>>> + Send;

    fn find_promotions(&self, query: &Query) -> impl Future<Output = DbResult<Vec<Promotion>>> + Send;

    fn find_reviews(&self, query: &Query) -> impl Future<Output = DbResult<Vec<Review>>> + Send;

    /// Daily sales over counted orders, oldest first unless `query` orders
    /// them otherwise.
    fn find_daily_sales(&self, query: &Query) -> impl Future<Output = DbResult<Vec<DailySalesPoint>>> + Send;
}

impl EntityStore for Database {
    async fn find_contacts(&self, query: &Query) -> DbResult<Vec<Contact>> {
        self.contacts().find(query).await
    }

    async fn find_orders(&self, query: &Query) -> DbResult<Vec<Order>> {
        self.orders().find(query).await
    }

    async fn find_payments(&self, query: &Query) -> DbResult<Vec<Payment>> {
        self.payments().find(query).await
    }

    async fn find_products(&self, query: &Query) -> DbResult<Vec<Product>> {
        self.products().find(query).await
    }

    async fn find_promotions(&self, query: &Query) -> DbResult<Vec<Promotion>> {
        self.promotions().find(query).await
    }

    async fn find_reviews(&self, query: &Query) -> DbResult<Vec<Review>> {
        self.reviews().find(query).await
    }

    async fn find_daily_sales(&self, query: &Query) -> DbResult<Vec<DailySalesPoint>> {
        self.sales().daily(query).await
    }
}
