//! # Rollup Engine
//!
//! Derived aggregates over raw rows: per-contact lifetime value, dashboard
//! KPIs, segment counts, payment summaries and daily sales.
//!
//! ## Counted Orders
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  draft  pending  pending_payment │ paid  processing  shipped  delivered │
//! │  cancelled  refunded             │                                      │
//! │  ──────── never contribute ───── │ ─── revenue, order counts, LTV ───── │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Empty Input
//! Every rollup is total over empty slices: counts are 0, sums are 0.00,
//! means and rates are 0.0. Nothing here divides by zero.

use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::{round_div, Money};
use crate::types::{
    Contact, CustomerType, DailySalesPoint, Order, OrderStatus, Payment, PaymentStatus, Review,
};

// =============================================================================
// Contact Stats
// =============================================================================

/// Lifetime order count and spend of one contact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ContactStats {
    pub total_orders: usize,
    pub total_spent: Money,
}

/// Computes a contact's stats from its counted orders.
///
/// `orders` may contain other contacts' orders; they are ignored.
///
/// ## Example
/// ```text
/// paid 17.40, shipped 25.00, draft 8.40, cancelled 12.90
///   → { total_orders: 2, total_spent: 42.40 }
/// ```
pub fn compute_contact_stats(contact: &Contact, orders: &[Order]) -> ContactStats {
    orders
        .iter()
        .filter(|order| order.contact_id == contact.id && order.is_counted())
        .fold(ContactStats::default(), |mut stats, order| {
            stats.total_orders += 1;
            stats.total_spent += order.total();
            stats
        })
}

/// A contact together with its derived stats (contacts list row).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ContactSummary {
    pub contact: Contact,
    pub stats: ContactStats,
}

/// Computes stats for every contact in one pass over `orders`.
///
/// The result follows the order of `contacts`.
pub fn compute_all_contact_stats(contacts: &[Contact], orders: &[Order]) -> Vec<ContactSummary> {
    let mut by_contact: HashMap<&str, ContactStats> = HashMap::new();
    for order in orders.iter().filter(|order| order.is_counted()) {
        let stats = by_contact.entry(order.contact_id.as_str()).or_default();
        stats.total_orders += 1;
        stats.total_spent += order.total();
    }

    contacts
        .iter()
        .map(|contact| ContactSummary {
            contact: contact.clone(),
            stats: by_contact
                .get(contact.id.as_str())
                .copied()
                .unwrap_or_default(),
        })
        .collect()
}

// =============================================================================
// Dashboard Stats
// =============================================================================

/// Headline KPIs of the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DashboardStats {
    /// Σ total over counted orders.
    pub revenue: Money,
    /// Number of counted orders.
    pub total_orders: usize,
    /// Σ messages over all contacts.
    pub total_messages: i64,
    /// Mean review rating, 0.0 without reviews.
    pub avg_rating: f64,
    /// Converted contacts / all contacts × 100, 0.0 without contacts.
    pub conversion_rate: f64,
}

/// Computes the dashboard KPIs.
pub fn compute_dashboard_stats(
    orders: &[Order],
    contacts: &[Contact],
    reviews: &[Review],
) -> DashboardStats {
    let counted = orders.iter().filter(|order| order.is_counted());

    let (total_orders, revenue) = counted.fold((0usize, Money::zero()), |(n, sum), order| {
        (n + 1, sum + order.total())
    });

    DashboardStats {
        revenue,
        total_orders,
        total_messages: contacts.iter().map(|c| c.total_messages).sum(),
        avg_rating: average_rating(reviews),
        conversion_rate: conversion_rate(contacts),
    }
}

/// Arithmetic mean of review ratings, 0.0 when there are none.
pub fn average_rating(reviews: &[Review]) -> f64 {
    if reviews.is_empty() {
        return 0.0;
    }
    let sum: i64 = reviews.iter().map(|r| r.rating).sum();
    sum as f64 / reviews.len() as f64
}

/// Share of customers and VIPs among contacts, in percent.
pub fn conversion_rate(contacts: &[Contact]) -> f64 {
    let converted = contacts
        .iter()
        .filter(|c| c.customer_type.is_converted())
        .count();
    percent(converted, contacts.len())
}

fn percent(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    part as f64 * 100.0 / whole as f64
}

// =============================================================================
// Segments
// =============================================================================

/// Contact counts per segment plus aggregated lifetime value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SegmentStats {
    pub total: usize,
    pub leads: usize,
    pub customers: usize,
    pub vip: usize,
    /// Σ total_spent over all contacts.
    pub total_revenue: Money,
    /// total_revenue / total, 0.00 without contacts.
    pub avg_spent: Money,
    pub conversion_rate: f64,
}

/// Aggregates a contacts list into segment stats.
pub fn compute_segment_stats(summaries: &[ContactSummary]) -> SegmentStats {
    let count = |kind: CustomerType| {
        summaries
            .iter()
            .filter(|s| s.contact.customer_type == kind)
            .count()
    };

    let total = summaries.len();
    let customers = count(CustomerType::Customer);
    let vip = count(CustomerType::Vip);
    let total_revenue: Money = summaries.iter().map(|s| s.stats.total_spent).sum();

    SegmentStats {
        total,
        leads: count(CustomerType::Lead),
        customers,
        vip,
        total_revenue,
        avg_spent: Money::average(total_revenue, total),
        conversion_rate: percent(customers + vip, total),
    }
}

// =============================================================================
// Contact Profile
// =============================================================================

/// Spend at which the value gauge of a contact is full (200.00).
pub const VALUE_GAUGE_FULL: Money = Money::from_cents(20_000);

/// Detail view-model of a single contact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ContactProfile {
    pub stats: ContactStats,
    /// total_spent / total_orders, 0.00 without orders.
    pub average_order_value: Money,
    pub days_since_first_contact: i64,
    /// Days between orders on average, absent without orders.
    pub purchase_frequency_days: Option<i64>,
    /// min(100, orders × 15 + days / 10)
    pub loyalty_score: f64,
    /// min(100, orders × 25)
    pub order_progress: f64,
    /// min(100, spent / 200.00 × 100)
    pub value_progress: f64,
}

/// Builds the profile of `contact` as seen at `now`.
pub fn contact_profile(contact: &Contact, stats: ContactStats, now: DateTime<Utc>) -> ContactProfile {
    let days = (now - contact.created_at).num_days().max(0);
    let orders = stats.total_orders;

    // No orders, no frequency
    let purchase_frequency_days = round_div(days as i128, orders as i128);

    ContactProfile {
        stats,
        average_order_value: Money::average(stats.total_spent, orders),
        days_since_first_contact: days,
        purchase_frequency_days,
        loyalty_score: (orders as f64 * 15.0 + days as f64 / 10.0).min(100.0),
        order_progress: (orders as f64 * 25.0).min(100.0),
        value_progress: (stats.total_spent.cents() as f64 * 100.0
            / VALUE_GAUGE_FULL.cents() as f64)
            .clamp(0.0, 100.0),
    }
}

// =============================================================================
// Payments
// =============================================================================

/// Settlement summary over a set of payments.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PaymentSummary {
    pub completed: usize,
    pub pending: usize,
    pub failed: usize,
    pub refunded: usize,
    /// Σ amount over completed payments.
    pub gross: Money,
    /// Σ fee over completed payments.
    pub fees: Money,
    /// Σ net over completed payments.
    pub net: Money,
}

/// Summarizes payments; only completed ones contribute money.
pub fn summarize_payments(payments: &[Payment]) -> PaymentSummary {
    let mut summary = PaymentSummary::default();

    for payment in payments {
        match payment.payment_status {
            PaymentStatus::Completed => {
                summary.completed += 1;
                summary.gross += payment.amount();
                summary.fees += payment.fee();
                summary.net += payment.net_amount();
            }
            PaymentStatus::Pending => summary.pending += 1,
            PaymentStatus::Failed => summary.failed += 1,
            PaymentStatus::Refunded => summary.refunded += 1,
        }
    }

    summary
}

// =============================================================================
// Daily Sales
// =============================================================================

/// Derives one [`DailySalesPoint`] per UTC calendar day with counted orders.
///
/// Points are ascending by date. Days without counted orders are absent.
pub fn daily_sales_from_orders(orders: &[Order]) -> Vec<DailySalesPoint> {
    let mut days: BTreeMap<NaiveDate, (i64, Money, HashSet<&str>)> = BTreeMap::new();

    for order in orders.iter().filter(|order| order.is_counted()) {
        let day = days
            .entry(order.created_at.date_naive())
            .or_insert_with(|| (0, Money::zero(), HashSet::new()));
        day.0 += 1;
        day.1 += order.total();
        day.2.insert(order.contact_id.as_str());
    }

    days.into_iter()
        .map(|(sale_date, (count, revenue, customers))| DailySalesPoint {
            sale_date,
            total_orders: count,
            revenue_cents: revenue.cents(),
            avg_order_value_cents: Money::average(revenue, count as usize).cents(),
            unique_customers: customers.len() as i64,
        })
        .collect()
}

// =============================================================================
// Status Breakdown
// =============================================================================

/// Number of orders in one status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct StatusCount {
    pub status: OrderStatus,
    pub count: usize,
    /// No further transition is expected from this status.
    pub terminal: bool,
}

/// Counts orders per status, in lifecycle order. Statuses with no orders
/// are left out.
pub fn order_status_breakdown(orders: &[Order]) -> Vec<StatusCount> {
    let mut counts: BTreeMap<OrderStatus, usize> = BTreeMap::new();
    for order in orders {
        *counts.entry(order.status).or_insert(0) += 1;
    }

    counts
        .into_iter()
        .map(|(status, count)| StatusCount {
            status,
            count,
            terminal: status.is_terminal(),
        })
        .collect()
}

// =============================================================================
// Top Products
// =============================================================================

/// Sales of one product across counted orders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TopProduct {
    pub product_id: String,
    pub product_name: String,
    pub units_sold: i64,
    pub revenue: Money,
}

/// Ranks products by units sold in counted orders.
///
/// Ties are broken by revenue (desc) then name (asc). The name shown is the
/// first one seen for the product.
pub fn rank_top_products(orders: &[Order], limit: usize) -> Vec<TopProduct> {
    let mut by_product: HashMap<&str, TopProduct> = HashMap::new();

    for item in orders
        .iter()
        .filter(|order| order.is_counted())
        .flat_map(|order| order.items.iter())
    {
        let entry = by_product
            .entry(item.product_id.as_str())
            .or_insert_with(|| TopProduct {
                product_id: item.product_id.clone(),
                product_name: item.product_name.clone(),
                units_sold: 0,
                revenue: Money::zero(),
            });
        entry.units_sold += item.quantity;
        entry.revenue += item.subtotal();
    }

    let mut ranked: Vec<TopProduct> = by_product.into_values().collect();
    ranked.sort_by(|a, b| {
        b.units_sold
            .cmp(&a.units_sold)
            .then_with(|| b.revenue.cmp(&a.revenue))
            .then_with(|| a.product_name.cmp(&b.product_name))
            .then_with(|| a.product_id.cmp(&b.product_id))
    });
    ranked.truncate(limit);
    ranked
}

// =============================================================================
// Unit Tests
// =============================================================================
