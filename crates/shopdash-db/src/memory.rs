//! # In-Memory Store
//!
//! A plain value holding every entity set, for tests and offline demos.
//!
//! ## Same Rules As SQLite
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  MemoryStore                        Database                           │
//! │  ─────────────                      ─────────                          │
//! │  apply_query(&rows, q)              push_query(builder, q)             │
//! │  validate_* before insert           validate_* before insert           │
//! │  unique username / sku / number     UNIQUE indexes                     │
//! │  contact / order must exist         FOREIGN KEY constraints            │
//! │  daily_sales_from_orders            daily_sales view                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Writes take `&mut self`; there is no interior mutability and no global
//! instance. Share it behind your own lock if several tasks need to write.

use chrono::{DateTime, Utc};
use tracing::debug;

use shopdash_core::rollup::daily_sales_from_orders;
use shopdash_core::validation::{
    validate_contact, validate_order, validate_payment, validate_product, validate_promotion,
    validate_review,
};
use shopdash_core::{Contact, DailySalesPoint, Order, Payment, Product, Promotion, Review};

use crate::demo::{
    DemoDataset, DEMO_ORDER_PREFIX, DEMO_PROMOTION_PREFIX, DEMO_SKU_PREFIX,
    DEMO_TRANSACTION_PREFIX, DEMO_USERNAME_PREFIX,
};
use crate::error::{DbError, DbResult};
use crate::pool::PurgeSummary;
use crate::query::{apply_query, Direction, Query};
use crate::store::EntityStore;

/// In-memory entity store.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemoryStore {
    contacts: Vec<Contact>,
    orders: Vec<Order>,
    payments: Vec<Payment>,
    products: Vec<Product>,
    promotions: Vec<Promotion>,
    reviews: Vec<Review>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    // =========================================================================
    // Inserts
    // =========================================================================

    pub fn insert_contact(&mut self, contact: Contact) -> DbResult<()> {
        validate_contact(&contact)?;
        self.ensure_unique_id("contacts", self.contacts.iter().map(|c| &c.id), &contact.id)?;
        if self.contacts.iter().any(|c| c.username == contact.username) {
            return Err(DbError::duplicate("contacts.username", &contact.username));
        }

        debug!(id = %contact.id, "Storing contact");
        self.contacts.push(contact);
        Ok(())
    }

    pub fn insert_order(&mut self, order: Order) -> DbResult<()> {
        validate_order(&order)?;
        self.ensure_unique_id("orders", self.orders.iter().map(|o| &o.id), &order.id)?;
        if self.orders.iter().any(|o| o.order_number == order.order_number) {
            return Err(DbError::duplicate("orders.order_number", &order.order_number));
        }
        if !self.contacts.iter().any(|c| c.id == order.contact_id) {
            return Err(missing_parent("order", "contact", &order.contact_id));
        }

        debug!(id = %order.id, "Storing order");
        self.orders.push(order);
        Ok(())
    }

    pub fn insert_payment(&mut self, payment: Payment) -> DbResult<()> {
        validate_payment(&payment)?;
        self.ensure_unique_id("payments", self.payments.iter().map(|p| &p.id), &payment.id)?;
        if self.payments.iter().any(|p| p.transaction_id == payment.transaction_id) {
            return Err(DbError::duplicate("payments.transaction_id", &payment.transaction_id));
        }
        if !self.orders.iter().any(|o| o.id == payment.order_id) {
            return Err(missing_parent("payment", "order", &payment.order_id));
        }

        self.payments.push(payment);
        Ok(())
    }

    pub fn insert_product(&mut self, product: Product) -> DbResult<()> {
        validate_product(&product)?;
        self.ensure_unique_id("products", self.products.iter().map(|p| &p.id), &product.id)?;
        if let Some(sku) = &product.sku {
            if self.products.iter().any(|p| p.sku.as_ref() == Some(sku)) {
                return Err(DbError::duplicate("products.sku", sku));
            }
        }

        self.products.push(product);
        Ok(())
    }

    pub fn insert_promotion(&mut self, promotion: Promotion) -> DbResult<()> {
        validate_promotion(&promotion)?;
        self.ensure_unique_id("promotions", self.promotions.iter().map(|p| &p.id), &promotion.id)?;

        self.promotions.push(promotion);
        Ok(())
    }

    pub fn insert_review(&mut self, review: Review) -> DbResult<()> {
        validate_review(&review)?;
        self.ensure_unique_id("reviews", self.reviews.iter().map(|r| &r.id), &review.id)?;
        if !self.contacts.iter().any(|c| c.id == review.contact_id) {
            return Err(missing_parent("review", "contact", &review.contact_id));
        }

        self.reviews.push(review);
        Ok(())
    }

    // =========================================================================
    // Updates and Deletes
    // =========================================================================

    /// Replaces a product, stamping `updated_at` with `now`.
    pub fn update_product(&mut self, product: Product, now: DateTime<Utc>) -> DbResult<()> {
        validate_product(&product)?;
        let slot = self
            .products
            .iter_mut()
            .find(|p| p.id == product.id)
            .ok_or_else(|| DbError::not_found("Product", &product.id))?;

        *slot = Product {
            created_at: slot.created_at,
            updated_at: now,
            ..product
        };
        Ok(())
    }

    pub fn delete_product(&mut self, id: &str) -> DbResult<()> {
        let index = self
            .products
            .iter()
            .position(|p| p.id == id)
            .ok_or_else(|| DbError::not_found("Product", id))?;
        self.products.remove(index);
        Ok(())
    }

    pub fn update_promotion(&mut self, promotion: Promotion) -> DbResult<()> {
        validate_promotion(&promotion)?;
        let slot = self
            .promotions
            .iter_mut()
            .find(|p| p.id == promotion.id)
            .ok_or_else(|| DbError::not_found("Promotion", &promotion.id))?;

        *slot = Promotion {
            created_at: slot.created_at,
            ..promotion
        };
        Ok(())
    }

    pub fn delete_promotion(&mut self, id: &str) -> DbResult<()> {
        let index = self
            .promotions
            .iter()
            .position(|p| p.id == id)
            .ok_or_else(|| DbError::not_found("Promotion", id))?;
        self.promotions.remove(index);
        Ok(())
    }

    /// Removes demo rows by prefix, cascading like the SQLite schema.
    pub fn purge_demo_data(&mut self) -> PurgeSummary {
        let mut summary = PurgeSummary::default();

        let demo_contacts: Vec<String> = self
            .contacts
            .iter()
            .filter(|c| c.username.starts_with(DEMO_USERNAME_PREFIX))
            .map(|c| c.id.clone())
            .collect();
        let is_demo_order =
            |o: &Order| o.order_number.starts_with(DEMO_ORDER_PREFIX) || demo_contacts.contains(&o.contact_id);

        let removed_orders: Vec<String> = self
            .orders
            .iter()
            .filter(|o| is_demo_order(o))
            .map(|o| o.id.clone())
            .collect();

        let before = self.payments.len();
        self.payments.retain(|p| {
            !p.transaction_id.starts_with(DEMO_TRANSACTION_PREFIX) && !removed_orders.contains(&p.order_id)
        });
        summary.payments = (before - self.payments.len()) as u64;

        summary.orders = removed_orders.len() as u64;
        self.orders.retain(|o| !removed_orders.contains(&o.id));

        self.reviews.retain(|r| !demo_contacts.contains(&r.contact_id));
        for review in &mut self.reviews {
            if review.order_id.as_ref().is_some_and(|id| removed_orders.contains(id)) {
                review.order_id = None;
            }
        }

        summary.contacts = demo_contacts.len() as u64;
        self.contacts.retain(|c| !demo_contacts.contains(&c.id));

        let before = self.products.len();
        self.products
            .retain(|p| !p.sku.as_deref().is_some_and(|sku| sku.starts_with(DEMO_SKU_PREFIX)));
        summary.products = (before - self.products.len()) as u64;

        let before = self.promotions.len();
        self.promotions.retain(|p| !p.id.starts_with(DEMO_PROMOTION_PREFIX));
        summary.promotions = (before - self.promotions.len()) as u64;

        debug!(?summary, "Purged demo data from memory");
        summary
    }

    fn ensure_unique_id<'a>(
        &self,
        table: &str,
        mut existing: impl Iterator<Item = &'a String>,
        id: &str,
    ) -> DbResult<()> {
        if existing.any(|e| e == id) {
            return Err(DbError::duplicate(format!("{}.id", table), id));
        }
        Ok(())
    }
}

fn missing_parent(child: &str, parent: &str, id: &str) -> DbError {
    DbError::ForeignKeyViolation {
        message: format!("{} references unknown {} {}", child, parent, id),
    }
}

/// Loads a generated dataset, checking it like any other write.
impl TryFrom<DemoDataset> for MemoryStore {
    type Error = DbError;

    fn try_from(dataset: DemoDataset) -> Result<Self, Self::Error> {
        let mut store = MemoryStore::new();
        for product in dataset.products {
            store.insert_product(product)?;
        }
        for promotion in dataset.promotions {
            store.insert_promotion(promotion)?;
        }
        for contact in dataset.contacts {
            store.insert_contact(contact)?;
        }
        for order in dataset.orders {
            store.insert_order(order)?;
        }
        for payment in dataset.payments {
            store.insert_payment(payment)?;
        }
        for review in dataset.reviews {
            store.insert_review(review)?;
        }
        Ok(store)
    }
}

impl EntityStore for MemoryStore {
    async fn find_contacts(&self, query: &Query) -> DbResult<Vec<Contact>> {
        apply_query(&self.contacts, query)
    }

    async fn find_orders(&self, query: &Query) -> DbResult<Vec<Order>> {
        apply_query(&self.orders, query)
    }

    async fn find_payments(&self, query: &Query) -> DbResult<Vec<Payment>> {
        apply_query(&self.payments, query)
    }

    async fn find_products(&self, query: &Query) -> DbResult<Vec<Product>> {
        apply_query(&self.products, query)
    }

    async fn find_promotions(&self, query: &Query) -> DbResult<Vec<Promotion>> {
        apply_query(&self.promotions, query)
    }

    async fn find_reviews(&self, query: &Query) -> DbResult<Vec<Review>> {
        apply_query(&self.reviews, query)
    }

    async fn find_daily_sales(&self, query: &Query) -> DbResult<Vec<DailySalesPoint>> {
        let mut query = query.clone();
        if query.order_by.is_none() {
            query = query.order_by("sale_date", Direction::Asc);
        }
        apply_query(&daily_sales_from_orders(&self.orders), &query)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::demo::DemoGenerator;
    use crate::pool::{Database, DbConfig};
    use crate::testing::{at, contact, date, order, payment, product, promotion, review};
    use shopdash_core::{
        CoreError, CustomerType, OrderStatus, PaymentStatus, ValidationError, COUNTED_STATUSES,
    };

    fn seeded() -> MemoryStore {
        let mut store = MemoryStore::new();
        store.insert_contact(contact("c1", CustomerType::Customer)).unwrap();
        store.insert_contact(contact("c2", CustomerType::Lead)).unwrap();
        store
            .insert_order(order("o1", "c1", OrderStatus::Paid, 3400, at(2025, 1, 10)))
            .unwrap();
        store
            .insert_order(order("o2", "c1", OrderStatus::Draft, 1000, at(2025, 1, 11)))
            .unwrap();
        store
            .insert_order(order("o3", "c2", OrderStatus::Delivered, 800, at(2025, 1, 11)))
            .unwrap();
        store
    }

    #[tokio::test]
    async fn test_reads_use_the_query_contract() {
        let store = seeded();

        let c1_orders = store.find_orders(&Query::new().eq("contact_id", "c1")).await.unwrap();
        assert_eq!(c1_orders.len(), 2);

        let sales = store.find_daily_sales(&Query::new()).await.unwrap();
        assert_eq!(sales.len(), 2);
        assert_eq!(sales[0].sale_date, date(2025, 1, 10));
        assert_eq!(sales[1].total_orders, 1);

        let err = store.find_orders(&Query::new().eq("colour", "red")).await.unwrap_err();
        assert!(matches!(err, DbError::InvalidQuery { .. }));
    }

    #[test]
    fn test_constraints_mirror_sqlite() {
        let mut store = seeded();

        let err = store
            .insert_order(order("o9", "ghost", OrderStatus::Paid, 100, at(2025, 1, 1)))
            .unwrap_err();
        assert!(matches!(err, DbError::ForeignKeyViolation { .. }));

        let err = store.insert_contact(contact("c1", CustomerType::Vip)).unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { .. }));

        let err = store.insert_review(review("r1", "c1", 0)).unwrap_err();
        assert!(matches!(err, DbError::Core(_)));

        let mut huge = order("o9", "c1", OrderStatus::Paid, i64::MAX, at(2025, 1, 1));
        huge.items[0].quantity = 2;
        let err = store.insert_order(huge).unwrap_err();
        assert!(matches!(
            err,
            DbError::Core(CoreError::Validation(ValidationError::OutOfRange { .. }))
        ));

        store.insert_payment(payment("p1", "o1", PaymentStatus::Completed, 3400)).unwrap();
        let err = store
            .insert_payment(payment("p1", "o1", PaymentStatus::Completed, 3400))
            .unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { .. }));
    }

    #[tokio::test]
    async fn test_product_and_promotion_writes() {
        let mut store = MemoryStore::new();
        store.insert_product(product("p1", "Audit Instagram", 15_900, 2)).unwrap();

        let mut updated = product("p1", "Audit Instagram+", 17_900, 2);
        updated.created_at = at(2030, 1, 1);
        store.update_product(updated, at(2025, 5, 1)).unwrap();

        let stored = store.find_products(&Query::new()).await.unwrap().remove(0);
        assert_eq!(stored.name, "Audit Instagram+");
        assert_eq!(stored.updated_at, at(2025, 5, 1));
        assert_ne!(stored.created_at, at(2030, 1, 1));

        store.delete_product("p1").unwrap();
        assert!(matches!(store.delete_product("p1"), Err(DbError::NotFound { .. })));

        let mut promo = promotion("promo_1", &["p1"], date(2025, 1, 1), date(2025, 1, 31));
        store.insert_promotion(promo.clone()).unwrap();
        promo.discount_value = 1500;
        store.update_promotion(promo).unwrap();
        assert_eq!(store.find_promotions(&Query::new()).await.unwrap()[0].discount_value, 1500);
        store.delete_promotion("promo_1").unwrap();
        assert!(store.find_promotions(&Query::new()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_purge_matches_sqlite() {
        let now = at(2025, 6, 15);
        let dataset = DemoGenerator::new(5, now).generate(12).unwrap();

        let mut store = MemoryStore::try_from(dataset.clone()).unwrap();
        store.insert_contact(contact("real", CustomerType::Vip)).unwrap();

        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        dataset.insert_into(&db).await.unwrap();
        db.contacts().insert(&contact("real", CustomerType::Vip)).await.unwrap();

        let in_memory = store.purge_demo_data();
        let in_sqlite = db.purge_demo_data().await.unwrap();
        assert_eq!(in_memory, in_sqlite);

        assert_eq!(store.find_contacts(&Query::new()).await.unwrap().len(), 1);
        assert!(store.find_reviews(&Query::new()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_same_answers_as_sqlite() {
        let dataset = DemoGenerator::new(11, at(2025, 6, 15)).generate(25).unwrap();
        let store = MemoryStore::try_from(dataset.clone()).unwrap();
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        dataset.insert_into(&db).await.unwrap();

        let query = Query::new()
            .is_in("status", COUNTED_STATUSES)
            .order_by("total_cents", Direction::Desc)
            .limit(5);
        assert_eq!(
            store.find_orders(&query).await.unwrap(),
            db.find_orders(&query).await.unwrap()
        );
        assert_eq!(
            store.find_daily_sales(&Query::new()).await.unwrap(),
            db.find_daily_sales(&Query::new()).await.unwrap()
        );
    }
}
