//! # Domain Types
//!
//! Entity rows as the repository hands them to the core.
//!
//! ## Type Map
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Contact      │◄──│     Order       │◄──│    Payment      │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  customer_type  │   │  status         │   │  payment_status │       │
//! │  │  total_messages │   │  items[]        │   │  amount / fee   │       │
//! │  └────────┬────────┘   │  total_cents    │   └─────────────────┘       │
//! │           │            └────────┬────────┘                             │
//! │           ▼                     ▼                                       │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Review       │   │    LineItem     │──►│    Product      │◄──┐   │
//! │  │  rating 1..=5   │   │  qty × price    │   │  price / stock  │   │   │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘   │   │
//! │                                                                     │   │
//! │  ┌─────────────────┐   ┌─────────────────┐                         │   │
//! │  │ DailySalesPoint │   │   Promotion     │── product_ids ──────────┘   │
//! │  │  one per day    │   │  [start, end]   │                             │
//! │  └─────────────────┘   └─────────────────┘                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Raw Cents + Typed Accessors
//! Monetary fields are stored as `*_cents: i64` (exactly what the database
//! holds) and read through `Money` accessors such as [`Order::total`].
//!
//! All entities are immutable inputs for the core: the repository creates
//! and mutates them, the core only reads and derives.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use ts_rs::TS;

use crate::error::ValidationError;
use crate::money::{Money, Rate};
use crate::validation::{typed_discount, ValidationResult};

/// Implements `as_str`, `Display` and `FromStr` for a snake_case enum.
macro_rules! string_enum {
    ($ty:ident, $field:literal, { $($variant:ident => $name:literal),+ $(,)? }) => {
        impl $ty {
            /// Every variant, in declaration order.
            pub const ALL: &'static [$ty] = &[$($ty::$variant),+];

            /// Returns the wire/database name of the variant.
            pub const fn as_str(&self) -> &'static str {
                match self {
                    $($ty::$variant => $name),+
                }
            }
        }

        impl std::fmt::Display for $ty {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $ty {
            type Err = ValidationError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_lowercase().as_str() {
                    $($name => Ok($ty::$variant),)+
                    other => Err(ValidationError::InvalidFormat {
                        field: $field.to_string(),
                        reason: format!("unknown value '{}'", other),
                    }),
                }
            }
        }
    };
}

// =============================================================================
// Customer Type
// =============================================================================

/// CRM classification of a contact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum CustomerType {
    /// Has talked to the shop, never bought.
    #[default]
    Lead,
    /// Has bought at least once.
    Customer,
    /// High-value customer.
    Vip,
}

string_enum!(CustomerType, "customer_type", {
    Lead => "lead",
    Customer => "customer",
    Vip => "vip",
});

impl CustomerType {
    /// Customers and VIPs count as converted contacts.
    #[inline]
    pub const fn is_converted(&self) -> bool {
        matches!(self, CustomerType::Customer | CustomerType::Vip)
    }
}

// =============================================================================
// Order Status
// =============================================================================

/// Order lifecycle status.
///
/// ## State Machine (not enforced by the core)
/// ```text
/// draft ──► pending ──► pending_payment ──► paid ──► processing ──► shipped ──► delivered
///   │          │               │              │
///   └──────────┴───────────────┴──► cancelled └──► refunded
/// ```
/// The application moves orders between states with direct updates. The
/// core only classifies a status as counted or not counted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    #[default]
    Draft,
    Pending,
    PendingPayment,
    Paid,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
    Refunded,
}

string_enum!(OrderStatus, "status", {
    Draft => "draft",
    Pending => "pending",
    PendingPayment => "pending_payment",
    Paid => "paid",
    Processing => "processing",
    Shipped => "shipped",
    Delivered => "delivered",
    Cancelled => "cancelled",
    Refunded => "refunded",
});

/// Statuses that contribute to revenue and order-count rollups.
pub const COUNTED_STATUSES: [OrderStatus; 4] = [
    OrderStatus::Paid,
    OrderStatus::Processing,
    OrderStatus::Shipped,
    OrderStatus::Delivered,
];

impl OrderStatus {
    /// Returns true if orders in this status count towards revenue,
    /// order counts and contact lifetime value.
    #[inline]
    pub const fn is_counted(&self) -> bool {
        matches!(
            self,
            OrderStatus::Paid
                | OrderStatus::Processing
                | OrderStatus::Shipped
                | OrderStatus::Delivered
        )
    }

    /// Returns true for statuses no further transition is expected from.
    ///
    /// Informational only; nothing in the core blocks transitions.
    #[inline]
    pub const fn is_terminal(&self) -> bool {
        matches!(
            self,
            OrderStatus::Delivered | OrderStatus::Cancelled | OrderStatus::Refunded
        )
    }
}

// =============================================================================
// Payment Enums
// =============================================================================

/// Payment provider used to collect an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum PaymentProvider {
    Stripe,
    Paypal,
}

string_enum!(PaymentProvider, "provider", {
    Stripe => "stripe",
    Paypal => "paypal",
});

/// Settlement status of a payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Pending,
    Completed,
    Failed,
    Refunded,
}

string_enum!(PaymentStatus, "payment_status", {
    Pending => "pending",
    Completed => "completed",
    Failed => "failed",
    Refunded => "refunded",
});

// =============================================================================
// Discount Type
// =============================================================================

/// How a promotion's `discount_value` is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum DiscountType {
    /// `discount_value` is in basis points (1500 = 15 %).
    Percentage,
    /// `discount_value` is in cents.
    Fixed,
}

string_enum!(DiscountType, "discount_type", {
    Percentage => "percentage",
    Fixed => "fixed",
});

/// A typed discount, built from a promotion's raw fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Discount {
    Percentage(Rate),
    Fixed(Money),
}

// =============================================================================
// Contact
// =============================================================================

/// A CRM contact.
///
/// `total_orders` / `total_spent` are intentionally absent: they are derived
/// by [`compute_contact_stats`](crate::rollup::compute_contact_stats).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Contact {
    pub id: String,
    pub username: String,
    pub full_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub customer_type: CustomerType,
    /// Messages exchanged with this contact.
    pub total_messages: i64,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "Option<String>")]
    pub last_contact_at: Option<DateTime<Utc>>,
}

// =============================================================================
// Line Item
// =============================================================================

/// One product line of an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct LineItem {
    pub product_id: String,
    /// Product name at time of order (frozen).
    pub product_name: String,
    pub quantity: i64,
    /// Unit price in cents at time of order (frozen).
    pub unit_price_cents: i64,
    /// `quantity × unit_price_cents`.
    pub subtotal_cents: i64,
}

impl LineItem {
    /// Returns the unit price as Money.
    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_cents(self.unit_price_cents)
    }

    /// Returns the line subtotal as Money.
    #[inline]
    pub fn subtotal(&self) -> Money {
        Money::from_cents(self.subtotal_cents)
    }
}

// =============================================================================
// Order
// =============================================================================

/// A customer order with its computed monetary fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Order {
    pub id: String,
    pub order_number: String,
    pub contact_id: String,
    pub status: OrderStatus,
    pub items: Vec<LineItem>,
    pub subtotal_cents: i64,
    pub shipping_cents: i64,
    pub tax_cents: i64,
    pub discount_cents: i64,
    pub total_cents: i64,
    /// ISO 4217 code ("EUR").
    pub currency: String,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
    #[ts(as = "Option<String>")]
    pub paid_at: Option<DateTime<Utc>>,
}

impl Order {
    /// Returns the order total as Money.
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }

    /// Returns the subtotal as Money.
    #[inline]
    pub fn subtotal(&self) -> Money {
        Money::from_cents(self.subtotal_cents)
    }

    /// Returns true if this order counts towards rollups.
    #[inline]
    pub fn is_counted(&self) -> bool {
        self.status.is_counted()
    }
}

// =============================================================================
// Payment
// =============================================================================

/// A payment collected (or attempted) for an order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Payment {
    pub id: String,
    pub order_id: String,
    pub provider: PaymentProvider,
    /// Provider-side reference.
    pub transaction_id: String,
    pub payment_status: PaymentStatus,
    pub amount_cents: i64,
    pub fee_cents: i64,
    /// `amount_cents − fee_cents`.
    pub net_amount_cents: i64,
    pub currency: String,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "Option<String>")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl Payment {
    /// Returns the gross amount as Money.
    #[inline]
    pub fn amount(&self) -> Money {
        Money::from_cents(self.amount_cents)
    }

    /// Returns the provider fee as Money.
    #[inline]
    pub fn fee(&self) -> Money {
        Money::from_cents(self.fee_cents)
    }

    /// Returns the net amount as Money.
    #[inline]
    pub fn net_amount(&self) -> Money {
        Money::from_cents(self.net_amount_cents)
    }
}

// =============================================================================
// Product
// =============================================================================

/// A catalog product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Product {
    pub id: String,
    pub sku: Option<String>,
    pub name: String,
    pub description: Option<String>,
    pub category: String,
    pub price_cents: i64,
    pub stock_quantity: i64,
    /// At or below this stock level the product is flagged as low stock.
    pub low_stock_threshold: i64,
    pub is_active: bool,
    pub is_featured: bool,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Returns the price as Money.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }

    /// Stock at or below the threshold.
    #[inline]
    pub fn is_low_stock(&self) -> bool {
        self.stock_quantity <= self.low_stock_threshold
    }

    /// Case-insensitive match over name, SKU and category.
    ///
    /// An empty term matches everything.
    pub fn matches_search(&self, term: &str) -> bool {
        let term = term.trim().to_lowercase();
        if term.is_empty() {
            return true;
        }

        self.name.to_lowercase().contains(&term)
            || self
                .sku
                .as_deref()
                .is_some_and(|sku| sku.to_lowercase().contains(&term))
            || self.category.to_lowercase().contains(&term)
    }
}

/// Returns the active products that are at or below their stock threshold.
pub fn low_stock_products(products: &[Product]) -> Vec<&Product> {
    products
        .iter()
        .filter(|p| p.is_active && p.is_low_stock())
        .collect()
}

// =============================================================================
// Promotion
// =============================================================================

/// A time-boxed discount on a set of products.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Promotion {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub discount_type: DiscountType,
    /// Basis points for percentage promotions, cents for fixed ones.
    pub discount_value: i64,
    /// First day of the window (inclusive).
    #[ts(as = "String")]
    pub start_date: NaiveDate,
    /// Last day of the window (inclusive).
    #[ts(as = "String")]
    pub end_date: NaiveDate,
    pub is_active: bool,
    pub product_ids: Vec<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl Promotion {
    /// Returns the typed discount, or the validation error of an
    /// out-of-range raw value.
    pub fn discount(&self) -> ValidationResult<Discount> {
        typed_discount(self.discount_type, self.discount_value)
    }

    /// Returns true if the promotion targets `product_id`.
    #[inline]
    pub fn covers(&self, product_id: &str) -> bool {
        self.product_ids.iter().any(|id| id == product_id)
    }
}

// =============================================================================
// Review
// =============================================================================

/// A customer review.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Review {
    pub id: String,
    pub contact_id: String,
    pub order_id: Option<String>,
    /// 1 to 5 stars.
    pub rating: i64,
    pub comment: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Daily Sales
// =============================================================================

/// Sales aggregate for one calendar day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct DailySalesPoint {
    #[ts(as = "String")]
    pub sale_date: NaiveDate,
    pub total_orders: i64,
    pub revenue_cents: i64,
    pub avg_order_value_cents: i64,
    pub unique_customers: i64,
}

impl DailySalesPoint {
    /// Returns the revenue as Money.
    #[inline]
    pub fn revenue(&self) -> Money {
        Money::from_cents(self.revenue_cents)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
