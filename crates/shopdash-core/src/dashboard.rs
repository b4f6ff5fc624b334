//! # Dashboard View-Models
//!
//! Assembles the analytics dashboard from raw rows.
//!
//! ## Report Layout
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  DashboardReport                                                        │
//! │  ├── stats            revenue, orders, messages, rating, conversion     │
//! │  ├── objective        progress gauge + motivation tier                  │
//! │  ├── streak / badges  gamification                                      │
//! │  ├── revenue_series   chart for the selected granularity                │
//! │  ├── top_products     best sellers                                      │
//! │  ├── status_breakdown orders per status                                 │
//! │  ├── payments         settlement summary                                │
//! │  └── catalog          low stock, running promotions, conflicts          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::promotion::{find_promotion_conflicts, running_promotions, PromotionConflict};
use crate::rollup::{
    compute_dashboard_stats, order_status_breakdown, rank_top_products, summarize_payments,
    DashboardStats, PaymentSummary, StatusCount, TopProduct,
};
use crate::series::{build_revenue_series, Granularity, SeriesPoint};
use crate::types::{
    low_stock_products, Contact, DailySalesPoint, Order, Payment, Product, Promotion, Review,
};

/// Monthly revenue objective used when none is configured (10 000.00).
pub const DEFAULT_REVENUE_OBJECTIVE: Money = Money::from_cents(1_000_000);

/// Number of best sellers shown.
pub const DEFAULT_TOP_PRODUCTS: usize = 3;

// =============================================================================
// Objective
// =============================================================================

/// Encouragement tier derived from objective progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum MotivationTier {
    /// Below 25 %.
    Starting,
    /// 25 % and up.
    GoodStart,
    /// 50 % and up.
    Halfway,
    /// 75 % and up.
    FinalStretch,
    /// Objective reached.
    Exceeded,
}

impl MotivationTier {
    fn from_percent(percent: f64) -> Self {
        match percent {
            p if p >= 100.0 => MotivationTier::Exceeded,
            p if p >= 75.0 => MotivationTier::FinalStretch,
            p if p >= 50.0 => MotivationTier::Halfway,
            p if p >= 25.0 => MotivationTier::GoodStart,
            _ => MotivationTier::Starting,
        }
    }
}

/// Progress of revenue towards the objective.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ObjectiveProgress {
    pub objective: Money,
    /// 0.0 to 100.0, capped.
    pub percent: f64,
    /// Amount still to sell, never negative.
    pub remaining: Money,
    pub reached: bool,
    pub tier: MotivationTier,
}

impl ObjectiveProgress {
    /// Computes progress of `revenue` against `objective`.
    ///
    /// # Errors
    /// [`CoreError::InvalidObjective`] if `objective` is not positive.
    pub fn compute(revenue: Money, objective: Money) -> CoreResult<Self> {
        if objective.cents() <= 0 {
            return Err(CoreError::InvalidObjective {
                cents: objective.cents(),
            });
        }

        let raw = revenue.cents().max(0) as f64 * 100.0 / objective.cents() as f64;

        Ok(Self {
            objective,
            percent: raw.min(100.0),
            remaining: (objective - revenue).floor_at_zero(),
            reached: revenue >= objective,
            tier: MotivationTier::from_percent(raw),
        })
    }
}

/// Average basket: revenue / orders, with zero orders counted as one.
#[inline]
pub fn average_basket(revenue: Money, total_orders: usize) -> Money {
    Money::average(revenue, total_orders.max(1))
}

// =============================================================================
// Streak
// =============================================================================

/// Consecutive selling days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SalesStreak {
    /// Run ending at the latest selling day.
    pub current: u32,
    /// Longest run in the history.
    pub best: u32,
}

/// Computes selling streaks from daily sales.
///
/// Days with zero orders break a run, as do missing days.
pub fn sales_streak(daily_sales: &[DailySalesPoint]) -> SalesStreak {
    let mut days: Vec<NaiveDate> = daily_sales
        .iter()
        .filter(|p| p.total_orders > 0)
        .map(|p| p.sale_date)
        .collect();
    days.sort_unstable();
    days.dedup();

    let mut streak = SalesStreak::default();
    let mut run = 0u32;
    let mut previous: Option<NaiveDate> = None;

    for day in days {
        run = match previous {
            Some(prev) if day - prev == Duration::days(1) => run + 1,
            _ => 1,
        };
        streak.best = streak.best.max(run);
        previous = Some(day);
    }

    streak.current = run;
    streak
}

// =============================================================================
// Badges
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum BadgeKind {
    /// 25 % of the objective.
    FirstObjective,
    /// 10 counted orders.
    TenSales,
    /// 7 consecutive selling days.
    SevenDayStreak,
    /// Average rating of 4.5 or more.
    FiveStars,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Badge {
    pub kind: BadgeKind,
    pub unlocked: bool,
}

/// Evaluates the four dashboard badges, in display order.
pub fn evaluate_badges(
    stats: &DashboardStats,
    progress: &ObjectiveProgress,
    streak: &SalesStreak,
) -> Vec<Badge> {
    vec![
        Badge {
            kind: BadgeKind::FirstObjective,
            unlocked: progress.percent >= 25.0,
        },
        Badge {
            kind: BadgeKind::TenSales,
            unlocked: stats.total_orders >= 10,
        },
        Badge {
            kind: BadgeKind::SevenDayStreak,
            unlocked: streak.current >= 7,
        },
        Badge {
            kind: BadgeKind::FiveStars,
            unlocked: stats.avg_rating >= 4.5,
        },
    ]
}

// =============================================================================
// Report
// =============================================================================

/// Raw rows the dashboard is built from.
#[derive(Debug, Clone, Copy)]
pub struct DashboardInput<'a> {
    pub orders: &'a [Order],
    pub contacts: &'a [Contact],
    pub reviews: &'a [Review],
    pub payments: &'a [Payment],
    pub products: &'a [Product],
    pub promotions: &'a [Promotion],
    pub daily_sales: &'a [DailySalesPoint],
}

/// User-selected knobs of the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardSettings {
    pub granularity: Granularity,
    pub objective: Money,
    pub top_products: usize,
}

impl Default for DashboardSettings {
    fn default() -> Self {
        Self {
            granularity: Granularity::default(),
            objective: DEFAULT_REVENUE_OBJECTIVE,
            top_products: DEFAULT_TOP_PRODUCTS,
        }
    }
}

/// Catalog health shown next to the KPIs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CatalogOverview {
    pub low_stock_product_ids: Vec<String>,
    pub running_promotion_ids: Vec<String>,
    pub promotion_conflicts: Vec<PromotionConflict>,
}

/// Everything the dashboard page renders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DashboardReport {
    #[ts(as = "String")]
    pub generated_at: DateTime<Utc>,
    pub stats: DashboardStats,
    pub average_basket: Money,
    pub objective: ObjectiveProgress,
    pub streak: SalesStreak,
    pub badges: Vec<Badge>,
    pub granularity: Granularity,
    pub revenue_series: Vec<SeriesPoint>,
    pub top_products: Vec<TopProduct>,
    pub status_breakdown: Vec<StatusCount>,
    pub payments: PaymentSummary,
    pub catalog: CatalogOverview,
}

/// Builds the dashboard report as of `now`.
///
/// # Errors
/// [`CoreError::InvalidObjective`] if the configured objective is not positive.
pub fn build_dashboard_report(
    input: DashboardInput<'_>,
    settings: &DashboardSettings,
    now: DateTime<Utc>,
) -> CoreResult<DashboardReport> {
    let stats = compute_dashboard_stats(input.orders, input.contacts, input.reviews);
    let objective = ObjectiveProgress::compute(stats.revenue, settings.objective)?;
    let streak = sales_streak(input.daily_sales);
    let badges = evaluate_badges(&stats, &objective, &streak);

    let catalog = CatalogOverview {
        low_stock_product_ids: low_stock_products(input.products)
            .into_iter()
            .map(|p| p.id.clone())
            .collect(),
        running_promotion_ids: running_promotions(input.promotions, now)
            .into_iter()
            .map(|p| p.id.clone())
            .collect(),
        promotion_conflicts: find_promotion_conflicts(
            input.products.iter().map(|p| p.id.as_str()),
            input.promotions,
            now,
        ),
    };

    Ok(DashboardReport {
        generated_at: now,
        average_basket: average_basket(stats.revenue, stats.total_orders),
        objective,
        streak,
        badges,
        granularity: settings.granularity,
        revenue_series: build_revenue_series(input.daily_sales, settings.granularity),
        top_products: rank_top_products(input.orders, settings.top_products),
        status_breakdown: order_status_breakdown(input.orders),
        payments: summarize_payments(input.payments),
        catalog,
        stats,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rollup::daily_sales_from_orders;
    use crate::types::{CustomerType, LineItem, OrderStatus};
    use chrono::TimeZone;

    fn point(date: NaiveDate, orders: i64) -> DailySalesPoint {
        DailySalesPoint {
            sale_date: date,
            total_orders: orders,
            revenue_cents: orders * 1000,
            avg_order_value_cents: 1000,
            unique_customers: orders,
        }
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, d).unwrap()
    }

    fn stats(total_orders: usize, avg_rating: f64) -> DashboardStats {
        DashboardStats {
            revenue: Money::zero(),
            total_orders,
            total_messages: 0,
            avg_rating,
            conversion_rate: 0.0,
        }
    }

    #[test]
    fn test_objective_progress() {
        let objective = Money::from_cents(1_000_000);

        let p = ObjectiveProgress::compute(Money::from_cents(250_000), objective).unwrap();
        assert!((p.percent - 25.0).abs() < 1e-9);
        assert_eq!(p.tier, MotivationTier::GoodStart);
        assert_eq!(p.remaining.cents(), 750_000);
        assert!(!p.reached);

        let p = ObjectiveProgress::compute(Money::from_cents(1_500_000), objective).unwrap();
        assert_eq!(p.percent, 100.0);
        assert_eq!(p.remaining, Money::zero());
        assert_eq!(p.tier, MotivationTier::Exceeded);
        assert!(p.reached);

        let p = ObjectiveProgress::compute(Money::from_cents(749_999), objective).unwrap();
        assert_eq!(p.tier, MotivationTier::Halfway);

        assert!(matches!(
            ObjectiveProgress::compute(Money::zero(), Money::zero()),
            Err(CoreError::InvalidObjective { cents: 0 })
        ));
    }

    #[test]
    fn test_average_basket() {
        assert_eq!(average_basket(Money::from_cents(5000), 0).cents(), 5000);
        assert_eq!(average_basket(Money::from_cents(5000), 4).cents(), 1250);
    }

    #[test]
    fn test_sales_streak() {
        let history = vec![
            point(day(1), 2),
            point(day(2), 1),
            point(day(3), 4),
            point(day(5), 1),
            point(day(6), 0),
            point(day(7), 3),
            point(day(8), 1),
        ];
        let streak = sales_streak(&history);
        assert_eq!(streak.best, 3);
        assert_eq!(streak.current, 2);

        assert_eq!(sales_streak(&[]), SalesStreak::default());
    }

    #[test]
    fn test_badges() {
        let progress = ObjectiveProgress::compute(Money::from_cents(300_000), DEFAULT_REVENUE_OBJECTIVE).unwrap();
        let streak = SalesStreak { current: 7, best: 7 };

        let badges = evaluate_badges(&stats(10, 4.5), &progress, &streak);
        assert_eq!(badges.len(), 4);
        assert!(badges.iter().all(|b| b.unlocked));

        let none = evaluate_badges(
            &stats(9, 4.4),
            &ObjectiveProgress::compute(Money::zero(), DEFAULT_REVENUE_OBJECTIVE).unwrap(),
            &SalesStreak { current: 6, best: 9 },
        );
        assert!(none.iter().all(|b| !b.unlocked));
        assert_eq!(none[2].kind, BadgeKind::SevenDayStreak);
    }

    #[test]
    fn test_build_report() {
        let now = Utc.with_ymd_and_hms(2025, 1, 20, 12, 0, 0).unwrap();
        let contact = Contact {
            id: "c1".to_string(),
            username: "marie".to_string(),
            full_name: "Marie".to_string(),
            email: "marie@example.com".to_string(),
            phone: None,
            customer_type: CustomerType::Customer,
            total_messages: 12,
            created_at: now,
            last_contact_at: None,
        };
        let order = Order {
            id: "o1".to_string(),
            order_number: "CMD-1".to_string(),
            contact_id: "c1".to_string(),
            status: OrderStatus::Paid,
            items: vec![LineItem {
                product_id: "p1".to_string(),
                product_name: "Bougie".to_string(),
                quantity: 2,
                unit_price_cents: 1700,
                subtotal_cents: 3400,
            }],
            subtotal_cents: 3400,
            shipping_cents: 990,
            tax_cents: 680,
            discount_cents: 0,
            total_cents: 5070,
            currency: "EUR".to_string(),
            created_at: now,
            updated_at: now,
            paid_at: Some(now),
        };
        let orders = vec![order];
        let daily = daily_sales_from_orders(&orders);
        let contacts = vec![contact];

        let input = DashboardInput {
            orders: &orders,
            contacts: &contacts,
            reviews: &[],
            payments: &[],
            products: &[],
            promotions: &[],
            daily_sales: &daily,
        };
        let report = build_dashboard_report(input, &DashboardSettings::default(), now).unwrap();

        assert_eq!(report.stats.revenue.cents(), 5070);
        assert_eq!(report.average_basket.cents(), 5070);
        assert_eq!(report.revenue_series.len(), 1);
        assert_eq!(report.top_products[0].units_sold, 2);
        assert_eq!(report.streak.current, 1);
        assert_eq!(report.badges.len(), 4);
        assert!(report.catalog.low_stock_product_ids.is_empty());

        let bad = DashboardSettings {
            objective: Money::from_cents(-1),
            ..DashboardSettings::default()
        };
        assert!(build_dashboard_report(input, &bad, now).is_err());
    }
}
