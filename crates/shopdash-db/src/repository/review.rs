//! # Review Repository

use sqlx::SqlitePool;
use tracing::debug;

use shopdash_core::validation::validate_review;
use shopdash_core::Review;

use super::fetch_rows;
use crate::error::DbResult;
use crate::query::Query;

/// Repository for review database operations.
#[derive(Debug, Clone)]
pub struct ReviewRepository {
    pool: SqlitePool,
}

impl ReviewRepository {
    /// Creates a new ReviewRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ReviewRepository { pool }
    }

    /// Lists reviews matching `query`.
    pub async fn find(&self, query: &Query) -> DbResult<Vec<Review>> {
        let reviews: Vec<Review> = fetch_rows::<Review, Review>(&self.pool, query).await?;
        debug!(count = reviews.len(), "Fetched reviews");
        Ok(reviews)
    }

    /// Inserts a review (rating 1 to 5).
    pub async fn insert(&self, review: &Review) -> DbResult<()> {
        debug!(id = %review.id, rating = review.rating, "Inserting review");
        validate_review(review)?;

        sqlx::query(
            r#"
            INSERT INTO reviews (id, contact_id, order_id, rating, comment, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(&review.id)
        .bind(&review.contact_id)
        .bind(&review.order_id)
        .bind(review.rating)
        .bind(&review.comment)
        .bind(review.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::pool::{Database, DbConfig};
    use crate::query::Query;
    use crate::testing::{contact, review};
    use crate::DbError;
    use shopdash_core::rollup::average_rating;
    use shopdash_core::CustomerType;

    #[tokio::test]
    async fn test_insert_and_average() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.contacts().insert(&contact("c1", CustomerType::Customer)).await.unwrap();

        let repo = db.reviews();
        repo.insert(&review("r1", "c1", 5)).await.unwrap();
        repo.insert(&review("r2", "c1", 4)).await.unwrap();

        let reviews = repo.find(&Query::new()).await.unwrap();
        assert_eq!(average_rating(&reviews), 4.5);

        let err = repo.insert(&review("r3", "c1", 6)).await.unwrap_err();
        assert!(matches!(err, DbError::Core(_)));
    }
}
