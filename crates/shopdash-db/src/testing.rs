//! Row fixtures shared by the unit tests.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};

use shopdash_core::money::Money;
use shopdash_core::totals::{compute_payment_fees, PaymentFeePolicy};
use shopdash_core::{
    Contact, CustomerType, DiscountType, LineItem, Order, OrderStatus, Payment, PaymentProvider,
    PaymentStatus, Product, Promotion, Review, DEFAULT_CURRENCY,
};

/// 09:00 UTC on the given day.
pub(crate) fn at(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, 9, 0, 0).unwrap()
}

pub(crate) fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

pub(crate) fn contact(id: &str, customer_type: CustomerType) -> Contact {
    Contact {
        id: id.to_string(),
        username: format!("user_{}", id),
        full_name: format!("Contact {}", id),
        email: format!("{}@example.com", id),
        phone: None,
        customer_type,
        total_messages: 0,
        created_at: at(2024, 12, 1),
        last_contact_at: None,
    }
}

/// A single-line order whose totals all equal `cents`.
pub(crate) fn order(
    id: &str,
    contact_id: &str,
    status: OrderStatus,
    cents: i64,
    created_at: DateTime<Utc>,
) -> Order {
    Order {
        id: id.to_string(),
        order_number: format!("ORD-{}", id),
        contact_id: contact_id.to_string(),
        status,
        items: vec![LineItem {
            product_id: "p1".to_string(),
            product_name: "Audit Instagram".to_string(),
            quantity: 1,
            unit_price_cents: cents,
            subtotal_cents: cents,
        }],
        subtotal_cents: cents,
        shipping_cents: 0,
        tax_cents: 0,
        discount_cents: 0,
        total_cents: cents,
        currency: DEFAULT_CURRENCY.to_string(),
        created_at,
        updated_at: created_at,
        paid_at: None,
    }
}

pub(crate) fn payment(id: &str, order_id: &str, status: PaymentStatus, amount_cents: i64) -> Payment {
    let fees = compute_payment_fees(Money::from_cents(amount_cents), &PaymentFeePolicy::default());
    Payment {
        id: id.to_string(),
        order_id: order_id.to_string(),
        provider: PaymentProvider::Stripe,
        transaction_id: format!("txn-{}", id),
        payment_status: status,
        amount_cents,
        fee_cents: fees.fee.cents(),
        net_amount_cents: fees.net.cents(),
        currency: DEFAULT_CURRENCY.to_string(),
        created_at: at(2025, 1, 10),
        completed_at: None,
    }
}

pub(crate) fn product(id: &str, name: &str, price_cents: i64, stock: i64) -> Product {
    Product {
        id: id.to_string(),
        sku: Some(format!("SKU-{}", id.to_uppercase())),
        name: name.to_string(),
        description: None,
        category: "Services".to_string(),
        price_cents,
        stock_quantity: stock,
        low_stock_threshold: 5,
        is_active: true,
        is_featured: false,
        created_at: at(2024, 11, 1),
        updated_at: at(2024, 11, 1),
    }
}

/// A 20 % promotion, active between `start` and `end` inclusive.
pub(crate) fn promotion(id: &str, product_ids: &[&str], start: NaiveDate, end: NaiveDate) -> Promotion {
    Promotion {
        id: id.to_string(),
        name: format!("Promo {}", id),
        description: None,
        discount_type: DiscountType::Percentage,
        discount_value: 2000,
        start_date: start,
        end_date: end,
        is_active: true,
        product_ids: product_ids.iter().map(|p| p.to_string()).collect(),
        created_at: at(2024, 11, 1),
    }
}

pub(crate) fn review(id: &str, contact_id: &str, rating: i64) -> Review {
    Review {
        id: id.to_string(),
        contact_id: contact_id.to_string(),
        order_id: None,
        rating,
        comment: Some("Super service".to_string()),
        created_at: at(2025, 1, 15),
    }
}
