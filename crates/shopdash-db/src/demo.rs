//! # Demo Data
//!
//! Deterministic demo dataset for local development and screenshots.
//!
//! ## Determinism
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  DemoGenerator::new(seed, now)                                          │
//! │       │  StdRng::seed_from_u64(seed) drives every choice, ids included  │
//! │       ▼                                                                 │
//! │  catalog (5 products) → promotions (2) → contacts (N)                   │
//! │       → 0..=3 orders per contact → payment per order status             │
//! │       → review for some delivered orders                                │
//! │                                                                         │
//! │  Same (seed, now, N) ⇒ byte-identical dataset.                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every row carries a recognisable prefix so
//! [`Database::purge_demo_data`](crate::pool::Database::purge_demo_data)
//! can remove it without touching real data.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info};

use shopdash_core::money::{Money, Rate};
use shopdash_core::totals::{
    build_line_item, compute_order_totals, compute_payment_fees, PaymentFeePolicy, PricingPolicy,
};
use shopdash_core::{
    Contact, CoreResult, CustomerType, DiscountType, Order, OrderStatus, Payment, PaymentProvider,
    PaymentStatus, Product, Promotion, Review, DEFAULT_CURRENCY,
};

use crate::error::DbResult;
use crate::pool::Database;

/// Username prefix of demo contacts.
pub const DEMO_USERNAME_PREFIX: &str = "demo_user_";

/// Order number prefix of demo orders.
pub const DEMO_ORDER_PREFIX: &str = "DEMO-";

/// Transaction id prefix of demo payments.
pub const DEMO_TRANSACTION_PREFIX: &str = "demo-";

/// SKU prefix of demo products.
pub const DEMO_SKU_PREFIX: &str = "DEMO-";

/// Id prefix of demo promotions.
pub const DEMO_PROMOTION_PREFIX: &str = "demo-promo-";

/// Contacts generated when no count is given.
pub const DEFAULT_CONTACT_COUNT: usize = 100;

/// Order status and the payment status it implies (`None`: no payment yet).
const ORDER_STATUS_BLUEPRINT: [(OrderStatus, Option<PaymentStatus>); 9] = [
    (OrderStatus::Paid, Some(PaymentStatus::Completed)),
    (OrderStatus::Processing, Some(PaymentStatus::Completed)),
    (OrderStatus::Shipped, Some(PaymentStatus::Completed)),
    (OrderStatus::Delivered, Some(PaymentStatus::Completed)),
    (OrderStatus::PendingPayment, Some(PaymentStatus::Pending)),
    (OrderStatus::Draft, None),
    (OrderStatus::Cancelled, Some(PaymentStatus::Failed)),
    (OrderStatus::Pending, Some(PaymentStatus::Pending)),
    (OrderStatus::Refunded, Some(PaymentStatus::Refunded)),
];

/// (name, sku, category, price in cents)
const CATALOG: [(&str, &str, &str, i64); 5] = [
    ("Pack Réseaux Sociaux", "DEMO-PACK-RS", "Social", 12_900),
    ("Coaching Reels", "DEMO-COACH-REELS", "Coaching", 8_900),
    ("Bundle Branding", "DEMO-BRANDING", "Design", 24_900),
    ("Template Canva Premium", "DEMO-CANVA", "Design", 4_900),
    ("Audit Instagram", "DEMO-AUDIT-IG", "Audit", 15_900),
];

const PROVIDERS: [PaymentProvider; 2] = [PaymentProvider::Stripe, PaymentProvider::Paypal];

const REVIEW_COMMENTS: [&str; 4] = [
    "Super accompagnement, je recommande !",
    "Livraison rapide, contenu de qualité.",
    "Très utile pour mon compte.",
    "Bon rapport qualité prix.",
];

// =============================================================================
// Dataset
// =============================================================================

/// A complete, internally consistent set of demo rows.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DemoDataset {
    pub products: Vec<Product>,
    pub promotions: Vec<Promotion>,
    pub contacts: Vec<Contact>,
    pub orders: Vec<Order>,
    pub payments: Vec<Payment>,
    pub reviews: Vec<Review>,
}

impl DemoDataset {
    /// Writes the dataset, parents before children.
    pub async fn insert_into(&self, db: &Database) -> DbResult<()> {
        let products = db.products();
        for product in &self.products {
            products.insert(product).await?;
        }
        let promotions = db.promotions();
        for promotion in &self.promotions {
            promotions.insert(promotion).await?;
        }
        let contacts = db.contacts();
        for contact in &self.contacts {
            contacts.insert(contact).await?;
        }
        let orders = db.orders();
        for order in &self.orders {
            orders.insert(order).await?;
        }
        let payments = db.payments();
        for payment in &self.payments {
            payments.insert(payment).await?;
        }
        let reviews = db.reviews();
        for review in &self.reviews {
            reviews.insert(review).await?;
        }

        info!(
            contacts = self.contacts.len(),
            orders = self.orders.len(),
            payments = self.payments.len(),
            reviews = self.reviews.len(),
            "Demo dataset written"
        );
        Ok(())
    }
}

// =============================================================================
// Generator
// =============================================================================

/// Seeded demo data generator.
///
/// ## Example
/// ```rust
/// use chrono::Utc;
/// use shopdash_db::demo::DemoGenerator;
///
/// let now = Utc::now();
/// let a = DemoGenerator::new(7, now).generate(10).unwrap();
/// let b = DemoGenerator::new(7, now).generate(10).unwrap();
/// assert_eq!(a, b);
/// ```
pub struct DemoGenerator {
    rng: StdRng,
    now: DateTime<Utc>,
    pricing: PricingPolicy,
    fees: PaymentFeePolicy,
}

impl DemoGenerator {
    /// Creates a generator. `now` anchors every generated date.
    pub fn new(seed: u64, now: DateTime<Utc>) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            now,
            pricing: PricingPolicy::default(),
            fees: PaymentFeePolicy::default(),
        }
    }

    /// Uses `pricing` for order totals instead of the default policy.
    pub fn with_pricing(mut self, pricing: PricingPolicy) -> Self {
        self.pricing = pricing;
        self
    }

    /// Generates the catalog, promotions and `contact_count` contacts with
    /// their orders, payments and reviews.
    pub fn generate(&mut self, contact_count: usize) -> CoreResult<DemoDataset> {
        let products = self.products();
        let mut dataset = DemoDataset {
            promotions: self.promotions(&products),
            ..DemoDataset::default()
        };

        for index in 1..=contact_count {
            let contact = self.contact(index);
            self.orders_for(&contact, index, &products, &mut dataset)?;
            dataset.contacts.push(contact);
        }
        dataset.products = products;

        debug!(
            contacts = dataset.contacts.len(),
            orders = dataset.orders.len(),
            payments = dataset.payments.len(),
            "Generated demo dataset"
        );
        Ok(dataset)
    }

    fn products(&mut self) -> Vec<Product> {
        let created_at = self.now - Duration::days(365);
        CATALOG
            .iter()
            .enumerate()
            .map(|(i, (name, sku, category, price))| Product {
                id: self.uuid(),
                sku: Some(sku.to_string()),
                name: name.to_string(),
                description: None,
                category: category.to_string(),
                price_cents: *price,
                stock_quantity: self.rng.gen_range(0..=40),
                low_stock_threshold: 5,
                is_active: true,
                is_featured: i == 0,
                created_at,
                updated_at: created_at,
            })
            .collect()
    }

    /// One running percentage promotion and one expired fixed one.
    fn promotions(&mut self, products: &[Product]) -> Vec<Promotion> {
        let today = self.now.date_naive();
        let ids = |range: std::ops::Range<usize>| -> Vec<String> {
            products[range].iter().map(|p| p.id.clone()).collect()
        };

        vec![
            Promotion {
                id: format!("{}1", DEMO_PROMOTION_PREFIX),
                name: "Soldes de saison".to_string(),
                description: Some("-20 % sur les packs".to_string()),
                discount_type: DiscountType::Percentage,
                discount_value: Rate::from_percent(20).bps() as i64,
                start_date: days_from(today, -7),
                end_date: days_from(today, 7),
                is_active: true,
                product_ids: ids(0..2),
                created_at: self.now - Duration::days(8),
            },
            Promotion {
                id: format!("{}2", DEMO_PROMOTION_PREFIX),
                name: "Offre Canva".to_string(),
                description: None,
                discount_type: DiscountType::Fixed,
                discount_value: Money::from_cents(1_000).cents(),
                start_date: days_from(today, -30),
                end_date: days_from(today, -1),
                is_active: true,
                product_ids: ids(3..4),
                created_at: self.now - Duration::days(31),
            },
        ]
    }

    fn contact(&mut self, index: usize) -> Contact {
        let created_at = self.date_within_days(365);
        let last_contact_at = (created_at + Duration::days(self.rng.gen_range(1..=15))).min(self.now);
        let username = format!("{}{}", DEMO_USERNAME_PREFIX, index);

        Contact {
            id: self.uuid(),
            email: format!("{}@example.com", username),
            username,
            full_name: format!("Client Demo {}", index),
            phone: Some(format!("+336{}", self.rng.gen_range(10_000_000..=99_999_999))),
            customer_type: CustomerType::ALL[self.rng.gen_range(0..CustomerType::ALL.len())],
            total_messages: self.rng.gen_range(5..=120),
            created_at,
            last_contact_at: Some(last_contact_at),
        }
    }

    fn orders_for(
        &mut self,
        contact: &Contact,
        index: usize,
        products: &[Product],
        dataset: &mut DemoDataset,
    ) -> CoreResult<()> {
        let order_count = self.rng.gen_range(0..=3);

        for i in 1..=order_count {
            let (status, payment_status) =
                ORDER_STATUS_BLUEPRINT[self.rng.gen_range(0..ORDER_STATUS_BLUEPRINT.len())];

            let mut items = Vec::new();
            for _ in 0..self.rng.gen_range(1..=4) {
                let product = &products[self.rng.gen_range(0..products.len())];
                let quantity = self.rng.gen_range(1..=3);
                items.push(build_line_item(
                    &product.id,
                    &product.name,
                    quantity,
                    product.price(),
                )?);
            }
            let totals = compute_order_totals(&items, &self.pricing)?;

            let created_at = self.date_within_days(180);
            let paid_at = status
                .is_counted()
                .then(|| created_at + Duration::days(self.rng.gen_range(1..=7)));

            let order = Order {
                id: self.uuid(),
                order_number: format!("{}{:03}-{:02}", DEMO_ORDER_PREFIX, index, i),
                contact_id: contact.id.clone(),
                status,
                items,
                subtotal_cents: totals.subtotal.cents(),
                shipping_cents: totals.shipping.cents(),
                tax_cents: totals.tax.cents(),
                discount_cents: totals.discount.cents(),
                total_cents: totals.total.cents(),
                currency: DEFAULT_CURRENCY.to_string(),
                created_at,
                updated_at: created_at,
                paid_at,
            };

            if let Some(payment_status) = payment_status {
                let payment = self.payment(&order, i, payment_status);
                dataset.payments.push(payment);
            }

            if status == OrderStatus::Delivered && self.rng.gen_bool(0.5) {
                let review = self.review(contact, &order);
                dataset.reviews.push(review);
            }

            dataset.orders.push(order);
        }

        Ok(())
    }

    fn payment(&mut self, order: &Order, i: usize, status: PaymentStatus) -> Payment {
        let fees = compute_payment_fees(order.total(), &self.fees);
        let settled_at = order
            .paid_at
            .unwrap_or_else(|| order.created_at + Duration::days(self.rng.gen_range(1..=10)));

        Payment {
            id: self.uuid(),
            order_id: order.id.clone(),
            provider: PROVIDERS[self.rng.gen_range(0..PROVIDERS.len())],
            transaction_id: format!("{}{}-{}", DEMO_TRANSACTION_PREFIX, &order.id[..8], i),
            payment_status: status,
            amount_cents: order.total_cents,
            fee_cents: fees.fee.cents(),
            net_amount_cents: fees.net.cents(),
            currency: DEFAULT_CURRENCY.to_string(),
            created_at: order.created_at,
            completed_at: (status == PaymentStatus::Completed).then_some(settled_at),
        }
    }

    fn review(&mut self, contact: &Contact, order: &Order) -> Review {
        let delivered_at = order.paid_at.unwrap_or(order.created_at);
        Review {
            id: self.uuid(),
            contact_id: contact.id.clone(),
            order_id: Some(order.id.clone()),
            rating: self.rng.gen_range(3..=5),
            comment: Some(REVIEW_COMMENTS[self.rng.gen_range(0..REVIEW_COMMENTS.len())].to_string()),
            created_at: delivered_at + Duration::days(self.rng.gen_range(1..=5)),
        }
    }

    /// A v4 UUID drawn from the seeded generator.
    fn uuid(&mut self) -> String {
        uuid::Builder::from_random_bytes(self.rng.gen()).into_uuid().to_string()
    }

    fn date_within_days(&mut self, days: i64) -> DateTime<Utc> {
        let seconds = self.rng.gen_range(0..=days * 24 * 60 * 60);
        self.now - Duration::seconds(seconds)
    }
}

fn days_from(date: NaiveDate, days: i64) -> NaiveDate {
    date + Duration::days(days)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::DbConfig;
    use crate::query::Query;
    use chrono::TimeZone;
    use shopdash_core::validation::{validate_order, validate_payment};
    use uuid::Uuid;

    fn is_v4(id: &str) -> bool {
        Uuid::parse_str(id).is_ok_and(|u| u.get_version_num() == 4)
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 15, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_same_seed_same_data() {
        let a = DemoGenerator::new(42, now()).generate(20).unwrap();
        let b = DemoGenerator::new(42, now()).generate(20).unwrap();
        assert_eq!(a, b);

        let c = DemoGenerator::new(43, now()).generate(20).unwrap();
        assert_ne!(a, c);
    }

    #[test]
    fn test_rows_follow_the_blueprint() {
        let data = DemoGenerator::new(1, now()).generate(DEFAULT_CONTACT_COUNT).unwrap();

        assert_eq!(data.contacts.len(), DEFAULT_CONTACT_COUNT);
        assert_eq!(data.products.len(), CATALOG.len());
        assert!(data.contacts.iter().all(|c| c.username.starts_with(DEMO_USERNAME_PREFIX)));
        assert!(data.contacts.iter().all(|c| (5..=120).contains(&c.total_messages)));
        assert!(data.contacts.iter().all(|c| is_v4(&c.id)));

        for order in &data.orders {
            validate_order(order).unwrap();
            assert!(order.order_number.starts_with(DEMO_ORDER_PREFIX));
            assert!((1..=4).contains(&order.items.len()));
            assert_eq!(order.paid_at.is_some(), order.status.is_counted());
        }

        for payment in &data.payments {
            validate_payment(payment).unwrap();
            assert!(payment.transaction_id.starts_with(DEMO_TRANSACTION_PREFIX));
            let order = data.orders.iter().find(|o| o.id == payment.order_id).unwrap();
            assert_ne!(order.status, OrderStatus::Draft);
            assert_eq!(payment.amount_cents, order.total_cents);
            assert_eq!(
                payment.completed_at.is_some(),
                payment.payment_status == PaymentStatus::Completed
            );
        }

        let drafts = data.orders.iter().filter(|o| o.status == OrderStatus::Draft).count();
        assert_eq!(data.payments.len(), data.orders.len() - drafts);
        assert!(data.reviews.iter().all(|r| (3..=5).contains(&r.rating)));
    }

    #[test]
    fn test_one_promotion_running() {
        let data = DemoGenerator::new(1, now()).generate(0).unwrap();
        let running = shopdash_core::promotion::running_promotions(&data.promotions, now());
        assert_eq!(running.len(), 1);
        assert_eq!(running[0].product_ids.len(), 2);
        assert!(data.contacts.is_empty());
    }

    #[tokio::test]
    async fn test_insert_then_purge() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let data = DemoGenerator::new(9, now()).generate(15).unwrap();
        data.insert_into(&db).await.unwrap();

        assert_eq!(db.contacts().count().await.unwrap(), 15);
        assert_eq!(db.orders().find(&Query::new()).await.unwrap().len(), data.orders.len());

        let summary = db.purge_demo_data().await.unwrap();
        assert_eq!(summary.contacts, 15);
        assert_eq!(summary.orders as usize, data.orders.len());
        assert_eq!(summary.products, 5);
        assert!(db.reviews().find(&Query::new()).await.unwrap().is_empty());

        // Reseeding after a purge must not collide
        data.insert_into(&db).await.unwrap();
    }
}
