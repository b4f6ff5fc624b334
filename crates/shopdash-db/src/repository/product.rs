//! # Product Repository
//!
//! Database operations for catalog products.
//!
//! ## Key Operations
//! - Catalog search over name, SKU and category
//! - CRUD operations
//! - Stock adjustments
//!
//! ## Search
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  User types: "brand"                                                   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  '%brand%' LIKE over name, sku, category (ASCII case-insensitive)      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  BRD-001 | Bundle Branding | Design   ← MATCH                          │
//! │  CNV-001 | Template Canva  | Design                                    │
//! │                                                                         │
//! │  % and _ in the term are escaped, so they match literally.             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;

use shopdash_core::validation::{validate_product, validate_search_query};
use shopdash_core::Product;

use super::fetch_rows;
use crate::error::{DbError, DbResult};
use crate::query::Query;

/// Repository for product database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = db.products();
///
/// let results = repo.search("brand", 20).await?;
/// let product = repo.get_by_id("uuid-here").await?;
/// ```
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Lists products matching `query`.
    pub async fn find(&self, query: &Query) -> DbResult<Vec<Product>> {
        let products: Vec<Product> = fetch_rows::<Product, Product>(&self.pool, query).await?;
        debug!(count = products.len(), "Fetched products");
        Ok(products)
    }

    /// Searches active products by name, SKU or category.
    ///
    /// ## Arguments
    /// * `term` - Search term (partial match). Empty lists active products.
    /// * `limit` - Maximum results to return
    pub async fn search(&self, term: &str, limit: u32) -> DbResult<Vec<Product>> {
        let term = validate_search_query(term)?;

        debug!(term = %term, limit = %limit, "Searching products");

        let pattern = format!("%{}%", escape_like(&term));
        let products = sqlx::query_as::<_, Product>(
            r#"
            SELECT * FROM products
            WHERE is_active = 1
            AND (
                name LIKE ?1 ESCAPE '\'
                OR sku LIKE ?1 ESCAPE '\'
                OR category LIKE ?1 ESCAPE '\'
            )
            ORDER BY name
            LIMIT ?2
            "#,
        )
        .bind(pattern)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        debug!(count = products.len(), "Search returned products");
        Ok(products)
    }

    /// Gets a product by its ID.
    ///
    /// ## Returns
    /// * `Ok(Some(Product))` - Product found
    /// * `Ok(None)` - Product not found
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>("SELECT * FROM products WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(product)
    }

    /// Gets a product by its SKU.
    pub async fn get_by_sku(&self, sku: &str) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>("SELECT * FROM products WHERE sku = ?1")
            .bind(sku)
            .fetch_optional(&self.pool)
            .await?;

        Ok(product)
    }

    /// Inserts a new product.
    ///
    /// ## Returns
    /// * `Err(DbError::UniqueViolation)` - SKU already exists
    pub async fn insert(&self, product: &Product) -> DbResult<()> {
        debug!(id = %product.id, sku = ?product.sku, "Inserting product");
        validate_product(product)?;

        sqlx::query(
            r#"
            INSERT INTO products (
                id, sku, name, description, category,
                price_cents, stock_quantity, low_stock_threshold,
                is_active, is_featured, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
            "#,
        )
        .bind(&product.id)
        .bind(&product.sku)
        .bind(&product.name)
        .bind(&product.description)
        .bind(&product.category)
        .bind(product.price_cents)
        .bind(product.stock_quantity)
        .bind(product.low_stock_threshold)
        .bind(product.is_active)
        .bind(product.is_featured)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| match DbError::from(e) {
            DbError::UniqueViolation { field, .. } => {
                DbError::duplicate(field, product.sku.as_deref().unwrap_or_default())
            }
            other => other,
        })?;

        Ok(())
    }

    /// Updates an existing product, stamping `updated_at` with `now`.
    ///
    /// ## Returns
    /// * `Err(DbError::NotFound)` - Product doesn't exist
    pub async fn update(&self, product: &Product, now: DateTime<Utc>) -> DbResult<()> {
        debug!(id = %product.id, "Updating product");
        validate_product(product)?;

        let result = sqlx::query(
            r#"
            UPDATE products SET
                sku = ?2,
                name = ?3,
                description = ?4,
                category = ?5,
                price_cents = ?6,
                stock_quantity = ?7,
                low_stock_threshold = ?8,
                is_active = ?9,
                is_featured = ?10,
                updated_at = ?11
            WHERE id = ?1
            "#,
        )
        .bind(&product.id)
        .bind(&product.sku)
        .bind(&product.name)
        .bind(&product.description)
        .bind(&product.category)
        .bind(product.price_cents)
        .bind(product.stock_quantity)
        .bind(product.low_stock_threshold)
        .bind(product.is_active)
        .bind(product.is_featured)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", &product.id));
        }

        Ok(())
    }

    /// Adjusts stock by `delta` (negative when sold, positive when restocked).
    ///
    /// Stock never goes below zero: the schema CHECK rejects the update.
    pub async fn adjust_stock(&self, id: &str, delta: i64, now: DateTime<Utc>) -> DbResult<()> {
        debug!(id = %id, delta = %delta, "Adjusting stock");

        let result = sqlx::query(
            r#"
            UPDATE products
            SET
                stock_quantity = stock_quantity + ?2,
                updated_at = ?3
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(delta)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        Ok(())
    }

    /// Deletes a product.
    ///
    /// Past orders keep their frozen name and price in their line items.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting product");

        let result = sqlx::query("DELETE FROM products WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        Ok(())
    }

    /// Counts active products.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products WHERE is_active = 1")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

/// Escapes LIKE wildcards so the term matches literally.
fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use crate::testing::{at, product};

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("50%_off"), "50\\%\\_off");
        assert_eq!(escape_like("canva"), "canva");
    }

    #[tokio::test]
    async fn test_search() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.products();
        repo.insert(&product("p1", "Bundle Branding", 24_900, 10)).await.unwrap();
        repo.insert(&product("p2", "Template Canva Premium", 4_900, 10)).await.unwrap();
        let mut hidden = product("p3", "Brand Audit", 15_900, 10);
        hidden.is_active = false;
        repo.insert(&hidden).await.unwrap();

        let found = repo.search("BRAND", 20).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, "p1");

        assert_eq!(repo.search("", 20).await.unwrap().len(), 2);
        assert!(repo.search("100%", 20).await.unwrap().is_empty());
        assert_eq!(repo.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_update_adjust_and_delete() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.products();
        let mut p = product("p1", "Coaching Reels", 8_900, 10);
        repo.insert(&p).await.unwrap();

        p.price_cents = 7_900;
        repo.update(&p, at(2025, 2, 1)).await.unwrap();
        repo.adjust_stock("p1", -7, at(2025, 2, 2)).await.unwrap();

        let stored = repo.get_by_id("p1").await.unwrap().unwrap();
        assert_eq!(stored.price_cents, 7_900);
        assert_eq!(stored.stock_quantity, 3);
        assert!(stored.is_low_stock());
        assert_eq!(stored.updated_at, at(2025, 2, 2));

        // Would go negative
        assert!(repo.adjust_stock("p1", -10, at(2025, 2, 3)).await.is_err());

        repo.delete("p1").await.unwrap();
        assert!(repo.get_by_id("p1").await.unwrap().is_none());
        assert!(matches!(
            repo.delete("p1").await.unwrap_err(),
            DbError::NotFound { .. }
        ));
    }

    #[tokio::test]
    async fn test_duplicate_sku() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.products();
        repo.insert(&product("p1", "Pack Réseaux Sociaux", 12_900, 10)).await.unwrap();

        let mut twin = product("p2", "Pack bis", 12_900, 10);
        twin.sku = Some("SKU-P1".to_string());
        let err = repo.insert(&twin).await.unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { .. }));
        assert!(repo.get_by_sku("SKU-P1").await.unwrap().is_some());
    }
}
