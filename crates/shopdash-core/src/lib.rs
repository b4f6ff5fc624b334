//! # shopdash-core: Pure Derivation Logic for Shopdash
//!
//! Turns the raw rows of a small-retail CRM (contacts, orders, payments,
//! products, promotions, reviews) into the statistics and view-models the
//! dashboard renders. Every function is pure: no I/O, no clock, no logging.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Shopdash Architecture                            │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                Web UI (out of tree, reads JSON + .ts)           │   │
//! │  └─────────────────────────────▲───────────────────────────────────┘   │
//! │                                │ view-models                            │
//! │  ┌─────────────────────────────┴───────────────────────────────────┐   │
//! │  │               ★ shopdash-core (THIS CRATE) ★                    │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │  rollup   │  │ promotion │  │  totals   │  │  series   │  │   │
//! │  │   │  KPIs     │  │ resolver  │  │  order €  │  │  charts   │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │ dashboard │  │   types   │  │   money   │  │validation │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────▲───────────────────────────────────┘   │
//! │                                │ raw rows                               │
//! │  ┌─────────────────────────────┴───────────────────────────────────┐   │
//! │  │            shopdash-db (SQLite + in-memory repositories)        │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain entities (Contact, Order, Product, Promotion, ...)
//! - [`money`] - Integer money, rates and the single rounding function
//! - [`totals`] - Order totals and payment fees
//! - [`promotion`] - Active promotion resolution and discounted prices
//! - [`rollup`] - Contact stats, dashboard KPIs, segments, daily sales
//! - [`series`] - Revenue chart bucketing
//! - [`dashboard`] - Objective, streak, badges and the full report
//! - [`validation`] - Row validation
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use shopdash_core::money::Money;
//! use shopdash_core::totals::{build_line_item, compute_order_totals, PricingPolicy};
//!
//! let items = vec![build_line_item("1", "Coffret", 1, Money::from_cents(25_001)).unwrap()];
//! let totals = compute_order_totals(&items, &PricingPolicy::default()).unwrap();
//!
//! // Above 200.00: free shipping
//! assert!(totals.shipping.is_zero());
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod dashboard;
pub mod error;
pub mod money;
pub mod promotion;
pub mod rollup;
pub mod series;
pub mod totals;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ValidationError};
pub use money::{Money, Rate};
pub use series::Granularity;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Currency of every order and payment.
pub const DEFAULT_CURRENCY: &str = "EUR";

/// Maximum quantity of a single line item.
///
/// Catches typos such as 1000 instead of 10.
pub const MAX_ITEM_QUANTITY: i64 = 999;

/// Largest amount accepted for a price, line subtotal, order subtotal or
/// payment (one trillion in major units).
///
/// Tax, shipping and discounts on top of it stay far inside `i64`.
pub const MAX_AMOUNT_CENTS: i64 = 100_000_000_000_000;

/// Maximum length of display names.
pub const MAX_NAME_LENGTH: usize = 200;

/// Maximum length of a catalog search term.
pub const MAX_SEARCH_LENGTH: usize = 100;
