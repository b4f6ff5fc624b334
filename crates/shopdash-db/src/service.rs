//! # Dashboard Service
//!
//! Reads raw rows from an [`EntityStore`] and hands them to the pure core.
//!
//! ```text
//! EntityStore ──rows──► DashboardService ──slices──► shopdash-core ──► view-models
//!  (SQLite or memory)    (async fetch)                (pure, sync)
//! ```
//!
//! The service owns no state besides its store; every call re-reads what it
//! needs, so results always reflect the rows currently stored.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use shopdash_core::dashboard::{build_dashboard_report, DashboardInput, DashboardReport, DashboardSettings};
use shopdash_core::promotion::{price_product, PricedProduct};
use shopdash_core::rollup::{
    compute_all_contact_stats, compute_contact_stats, compute_segment_stats, contact_profile,
    ContactProfile, ContactSummary, SegmentStats,
};

use crate::error::{DbError, DbResult};
use crate::query::{Direction, Query};
use crate::store::EntityStore;

/// Contacts page: every contact with its stats, plus segment totals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContactsOverview {
    pub contacts: Vec<ContactSummary>,
    pub segments: SegmentStats,
}

/// Turns stored rows into dashboard view-models.
#[derive(Debug, Clone)]
pub struct DashboardService<S> {
    store: S,
}

impl<S: EntityStore> DashboardService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Builds the full dashboard report as of `now`.
    ///
    /// All entity sets are fetched concurrently.
    pub async fn report(&self, settings: &DashboardSettings, now: DateTime<Utc>) -> DbResult<DashboardReport> {
        let all = Query::new();
        let (orders, contacts, reviews, payments, products, promotions, daily_sales) = tokio::try_join!(
            self.store.find_orders(&all),
            self.store.find_contacts(&all),
            self.store.find_reviews(&all),
            self.store.find_payments(&all),
            self.store.find_products(&all),
            self.store.find_promotions(&all),
            self.store.find_daily_sales(&all),
        )?;

        debug!(
            orders = orders.len(),
            contacts = contacts.len(),
            days = daily_sales.len(),
            "Loaded dashboard rows"
        );

        let input = DashboardInput {
            orders: &orders,
            contacts: &contacts,
            reviews: &reviews,
            payments: &payments,
            products: &products,
            promotions: &promotions,
            daily_sales: &daily_sales,
        };
        let report = build_dashboard_report(input, settings, now)?;

        info!(
            revenue_cents = report.stats.revenue.cents(),
            total_orders = report.stats.total_orders,
            granularity = %settings.granularity,
            "Built dashboard report"
        );
        Ok(report)
    }

    /// Contacts list with lifetime stats, newest contacts first.
    pub async fn contacts_overview(&self) -> DbResult<ContactsOverview> {
        let newest_first = Query::new().order_by("created_at", Direction::Desc);
        let all_orders = Query::new();
        let (contacts, orders) = tokio::try_join!(
            self.store.find_contacts(&newest_first),
            self.store.find_orders(&all_orders),
        )?;

        let contacts = compute_all_contact_stats(&contacts, &orders);
        let segments = compute_segment_stats(&contacts);
        Ok(ContactsOverview { contacts, segments })
    }

    /// Detail view of one contact.
    pub async fn contact_profile(&self, contact_id: &str, now: DateTime<Utc>) -> DbResult<ContactProfile> {
        let contact = self
            .store
            .find_contacts(&Query::new().eq("id", contact_id).limit(1))
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| DbError::not_found("Contact", contact_id))?;

        let orders = self
            .store
            .find_orders(&Query::new().eq("contact_id", contact_id))
            .await?;

        let stats = compute_contact_stats(&contact, &orders);
        Ok(contact_profile(&contact, stats, now))
    }

    /// Active catalog priced with the promotions running at `now`.
    pub async fn priced_catalog(&self, now: DateTime<Utc>) -> DbResult<Vec<PricedProduct>> {
        let active_by_name = Query::new().eq("is_active", true).order_by("name", Direction::Asc);
        let all_promotions = Query::new();
        let (products, promotions) = tokio::try_join!(
            self.store.find_products(&active_by_name),
            self.store.find_promotions(&all_promotions),
        )?;

        let priced = products
            .iter()
            .map(|product| price_product(product, &promotions, now))
            .collect::<Result<Vec<PricedProduct>, _>>()?;

        debug!(
            products = priced.len(),
            discounted = priced.iter().filter(|p| p.is_discounted()).count(),
            "Priced catalog"
        );
        Ok(priced)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::demo::DemoGenerator;
    use crate::memory::MemoryStore;
    use crate::pool::{Database, DbConfig};
    use crate::testing::{at, contact, date, order, product, promotion, review};
    use shopdash_core::money::Money;
    use shopdash_core::{CustomerType, Granularity, OrderStatus};

    fn store() -> MemoryStore {
        let mut store = MemoryStore::new();
        store.insert_contact(contact("c1", CustomerType::Customer)).unwrap();
        store.insert_contact(contact("c2", CustomerType::Vip)).unwrap();
        store.insert_contact(contact("c3", CustomerType::Lead)).unwrap();
        store
            .insert_order(order("o1", "c1", OrderStatus::Paid, 1740, at(2025, 1, 10)))
            .unwrap();
        store
            .insert_order(order("o2", "c1", OrderStatus::Shipped, 2500, at(2025, 1, 11)))
            .unwrap();
        store
            .insert_order(order("o3", "c1", OrderStatus::Draft, 840, at(2025, 1, 12)))
            .unwrap();
        store
            .insert_order(order("o4", "c2", OrderStatus::Cancelled, 1290, at(2025, 1, 12)))
            .unwrap();
        store.insert_review(review("r1", "c1", 5)).unwrap();
        store.insert_review(review("r2", "c2", 4)).unwrap();
        store
    }

    #[tokio::test]
    async fn test_report_from_memory() {
        let service = DashboardService::new(store());
        let settings = DashboardSettings {
            granularity: Granularity::Day,
            ..DashboardSettings::default()
        };

        let report = service.report(&settings, at(2025, 1, 12)).await.unwrap();
        assert_eq!(report.stats.revenue.cents(), 4240);
        assert_eq!(report.stats.total_orders, 2);
        assert_eq!(report.stats.avg_rating, 4.5);
        assert_eq!(report.average_basket.cents(), 2120);
        assert_eq!(report.revenue_series.len(), 2);
        assert_eq!(report.streak.current, 2);
    }

    #[tokio::test]
    async fn test_invalid_objective_is_an_error() {
        let service = DashboardService::new(store());
        let settings = DashboardSettings {
            objective: Money::zero(),
            ..DashboardSettings::default()
        };

        let err = service.report(&settings, at(2025, 1, 12)).await.unwrap_err();
        assert!(matches!(err, DbError::Core(_)));
    }

    #[tokio::test]
    async fn test_contacts_and_profile() {
        let service = DashboardService::new(store());

        let overview = service.contacts_overview().await.unwrap();
        assert_eq!(overview.segments.total, 3);
        assert_eq!(overview.segments.total_revenue.cents(), 4240);
        assert!((overview.segments.conversion_rate - 200.0 / 3.0).abs() < 1e-9);

        let c1 = overview.contacts.iter().find(|s| s.contact.id == "c1").unwrap();
        assert_eq!(c1.stats.total_orders, 2);

        let profile = service.contact_profile("c1", at(2025, 1, 12)).await.unwrap();
        assert_eq!(profile.stats.total_spent.cents(), 4240);
        assert_eq!(profile.average_order_value.cents(), 2120);
        assert_eq!(profile.order_progress, 50.0);

        let err = service.contact_profile("ghost", at(2025, 1, 12)).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_priced_catalog() {
        let mut store = MemoryStore::new();
        store.insert_product(product("p1", "Audit Instagram", 10_000, 8)).unwrap();
        store.insert_product(product("p2", "Coaching", 5_000, 8)).unwrap();
        let mut retired = product("p3", "Ancien pack", 1_000, 0);
        retired.is_active = false;
        store.insert_product(retired).unwrap();
        store
            .insert_promotion(promotion("promo_1", &["p1"], date(2025, 1, 1), date(2025, 1, 31)))
            .unwrap();

        let service = DashboardService::new(store);
        let priced = service.priced_catalog(at(2025, 1, 31)).await.unwrap();
        assert_eq!(priced.len(), 2);
        assert_eq!(priced[0].product_id, "p1");
        assert_eq!(priced[0].final_price.cents(), 8_000);
        assert_eq!(priced[1].promotion_id, None);

        let after = service.priced_catalog(at(2025, 2, 1)).await.unwrap();
        assert!(after.iter().all(|p| !p.is_discounted()));
    }

    #[tokio::test]
    async fn test_backends_agree_on_report() {
        let now = at(2025, 6, 15);
        let dataset = DemoGenerator::new(42, now).generate(30).unwrap();

        let memory = DashboardService::new(MemoryStore::try_from(dataset.clone()).unwrap());
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        dataset.insert_into(&db).await.unwrap();
        let sqlite = DashboardService::new(db);

        for granularity in [Granularity::Day, Granularity::Week, Granularity::Month, Granularity::Year] {
            let settings = DashboardSettings {
                granularity,
                ..DashboardSettings::default()
            };
            assert_eq!(
                memory.report(&settings, now).await.unwrap(),
                sqlite.report(&settings, now).await.unwrap()
            );
        }
    }
}
