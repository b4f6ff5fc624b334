//! # Promotion Repository
//!
//! Database operations for promotions. `product_ids` is a JSON array column.

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{FromRow, SqlitePool};
use tracing::debug;

use shopdash_core::validation::validate_promotion;
use shopdash_core::{DiscountType, Promotion};

use super::fetch_rows;
use crate::error::{DbError, DbResult};
use crate::query::Query;

/// Raw `promotions` row.
#[derive(Debug, FromRow)]
struct PromotionRow {
    id: String,
    name: String,
    description: Option<String>,
    discount_type: DiscountType,
    discount_value: i64,
    start_date: NaiveDate,
    end_date: NaiveDate,
    is_active: bool,
    product_ids: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<PromotionRow> for Promotion {
    type Error = DbError;

    fn try_from(row: PromotionRow) -> Result<Self, Self::Error> {
        let product_ids: Vec<String> = serde_json::from_str(&row.product_ids)
            .map_err(|e| DbError::decode("Promotion", &row.id, e))?;

        Ok(Promotion {
            id: row.id,
            name: row.name,
            description: row.description,
            discount_type: row.discount_type,
            discount_value: row.discount_value,
            start_date: row.start_date,
            end_date: row.end_date,
            is_active: row.is_active,
            product_ids,
            created_at: row.created_at,
        })
    }
}

fn encode_product_ids(promotion: &Promotion) -> DbResult<String> {
    serde_json::to_string(&promotion.product_ids)
        .map_err(|e| DbError::decode("Promotion", &promotion.id, e))
}

/// Repository for promotion database operations.
#[derive(Debug, Clone)]
pub struct PromotionRepository {
    pool: SqlitePool,
}

impl PromotionRepository {
    /// Creates a new PromotionRepository.
    pub fn new(pool: SqlitePool) -> Self {
        PromotionRepository { pool }
    }

    /// Lists promotions matching `query`.
    pub async fn find(&self, query: &Query) -> DbResult<Vec<Promotion>> {
        let rows: Vec<PromotionRow> = fetch_rows::<Promotion, PromotionRow>(&self.pool, query).await?;
        let promotions = rows
            .into_iter()
            .map(Promotion::try_from)
            .collect::<DbResult<Vec<_>>>()?;

        debug!(count = promotions.len(), "Fetched promotions");
        Ok(promotions)
    }

    /// Gets a promotion by its ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Promotion>> {
        let row = sqlx::query_as::<_, PromotionRow>("SELECT * FROM promotions WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(Promotion::try_from).transpose()
    }

    /// Inserts a new promotion.
    pub async fn insert(&self, promotion: &Promotion) -> DbResult<()> {
        debug!(id = %promotion.id, name = %promotion.name, "Inserting promotion");
        validate_promotion(promotion)?;
        let product_ids = encode_product_ids(promotion)?;

        sqlx::query(
            r#"
            INSERT INTO promotions (
                id, name, description, discount_type, discount_value,
                start_date, end_date, is_active, product_ids, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
        )
        .bind(&promotion.id)
        .bind(&promotion.name)
        .bind(&promotion.description)
        .bind(promotion.discount_type)
        .bind(promotion.discount_value)
        .bind(promotion.start_date)
        .bind(promotion.end_date)
        .bind(promotion.is_active)
        .bind(product_ids)
        .bind(promotion.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Updates an existing promotion.
    ///
    /// ## Returns
    /// * `Err(DbError::NotFound)` - Promotion doesn't exist
    pub async fn update(&self, promotion: &Promotion) -> DbResult<()> {
        debug!(id = %promotion.id, "Updating promotion");
        validate_promotion(promotion)?;
        let product_ids = encode_product_ids(promotion)?;

        let result = sqlx::query(
            r#"
            UPDATE promotions SET
                name = ?2,
                description = ?3,
                discount_type = ?4,
                discount_value = ?5,
                start_date = ?6,
                end_date = ?7,
                is_active = ?8,
                product_ids = ?9
            WHERE id = ?1
            "#,
        )
        .bind(&promotion.id)
        .bind(&promotion.name)
        .bind(&promotion.description)
        .bind(promotion.discount_type)
        .bind(promotion.discount_value)
        .bind(promotion.start_date)
        .bind(promotion.end_date)
        .bind(promotion.is_active)
        .bind(product_ids)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Promotion", &promotion.id));
        }

        Ok(())
    }

    /// Deletes a promotion.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting promotion");

        let result = sqlx::query("DELETE FROM promotions WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Promotion", id));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::pool::{Database, DbConfig};
    use crate::query::Query;
    use crate::testing::{date, promotion};
    use crate::DbError;

    #[tokio::test]
    async fn test_crud() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.promotions();

        let mut promo = promotion("promo_1", &["p1", "p2"], date(2025, 1, 1), date(2025, 1, 31));
        repo.insert(&promo).await.unwrap();
        assert_eq!(repo.get_by_id("promo_1").await.unwrap().unwrap(), promo);

        promo.product_ids.push("p3".to_string());
        promo.is_active = false;
        repo.update(&promo).await.unwrap();

        let inactive = repo.find(&Query::new().eq("is_active", false)).await.unwrap();
        assert_eq!(inactive.len(), 1);
        assert_eq!(inactive[0].product_ids, vec!["p1", "p2", "p3"]);

        repo.delete("promo_1").await.unwrap();
        assert!(repo.find(&Query::new()).await.unwrap().is_empty());
        assert!(matches!(
            repo.update(&promo).await.unwrap_err(),
            DbError::NotFound { .. }
        ));
    }

    #[tokio::test]
    async fn test_window_filters() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.promotions();
        repo.insert(&promotion("jan", &["p1"], date(2025, 1, 1), date(2025, 1, 31))).await.unwrap();
        repo.insert(&promotion("feb", &["p1"], date(2025, 2, 1), date(2025, 2, 28))).await.unwrap();

        let today = date(2025, 2, 14);
        let running = repo
            .find(&Query::new().lte("start_date", today).gte("end_date", today))
            .await
            .unwrap();
        assert_eq!(running.len(), 1);
        assert_eq!(running[0].id, "feb");
    }

    #[tokio::test]
    async fn test_inverted_window_is_rejected() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let promo = promotion("bad", &["p1"], date(2025, 2, 1), date(2025, 1, 1));
        assert!(matches!(
            db.promotions().insert(&promo).await.unwrap_err(),
            DbError::Core(_)
        ));
    }
}
