//! # Contact Repository
//!
//! Database operations for CRM contacts.

use sqlx::SqlitePool;
use tracing::debug;

use shopdash_core::validation::validate_contact;
use shopdash_core::Contact;

use super::fetch_rows;
use crate::error::{DbError, DbResult};
use crate::query::Query;

/// Repository for contact database operations.
#[derive(Debug, Clone)]
pub struct ContactRepository {
    pool: SqlitePool,
}

impl ContactRepository {
    /// Creates a new ContactRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ContactRepository { pool }
    }

    /// Lists contacts matching `query`.
    pub async fn find(&self, query: &Query) -> DbResult<Vec<Contact>> {
        let contacts: Vec<Contact> = fetch_rows::<Contact, Contact>(&self.pool, query).await?;
        debug!(count = contacts.len(), "Fetched contacts");
        Ok(contacts)
    }

    /// Gets a contact by its ID.
    ///
    /// ## Returns
    /// * `Ok(Some(Contact))` - Contact found
    /// * `Ok(None)` - Contact not found
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Contact>> {
        let contact = sqlx::query_as::<_, Contact>("SELECT * FROM contacts WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(contact)
    }

    /// Inserts a new contact.
    ///
    /// ## Returns
    /// * `Err(DbError::UniqueViolation)` - Username already exists
    /// * `Err(DbError::Core)` - Contact row is malformed
    pub async fn insert(&self, contact: &Contact) -> DbResult<()> {
        debug!(id = %contact.id, username = %contact.username, "Inserting contact");
        validate_contact(contact)?;

        sqlx::query(
            r#"
            INSERT INTO contacts (
                id, username, full_name, email, phone,
                customer_type, total_messages, created_at, last_contact_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
        )
        .bind(&contact.id)
        .bind(&contact.username)
        .bind(&contact.full_name)
        .bind(&contact.email)
        .bind(&contact.phone)
        .bind(contact.customer_type)
        .bind(contact.total_messages)
        .bind(contact.created_at)
        .bind(contact.last_contact_at)
        .execute(&self.pool)
        .await
        .map_err(|e| match DbError::from(e) {
            DbError::UniqueViolation { field, .. } => DbError::duplicate(field, &contact.username),
            other => other,
        })?;

        Ok(())
    }

    /// Counts all contacts.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM contacts")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use crate::pool::{Database, DbConfig};
    use crate::query::{Direction, Query};
    use crate::testing::contact;
    use crate::DbError;
    use shopdash_core::CustomerType;

    #[tokio::test]
    async fn test_insert_and_find() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.contacts();

        repo.insert(&contact("c1", CustomerType::Lead)).await.unwrap();
        repo.insert(&contact("c2", CustomerType::Vip)).await.unwrap();
        repo.insert(&contact("c3", CustomerType::Customer)).await.unwrap();

        let vips = repo.find(&Query::new().eq("customer_type", CustomerType::Vip)).await.unwrap();
        assert_eq!(vips.len(), 1);
        assert_eq!(vips[0].id, "c2");
        assert_eq!(vips[0].customer_type, CustomerType::Vip);

        let sorted = repo
            .find(&Query::new().order_by("username", Direction::Desc).limit(2))
            .await
            .unwrap();
        assert_eq!(sorted.len(), 2);
        assert_eq!(sorted[0].id, "c3");

        assert_eq!(repo.count().await.unwrap(), 3);
        assert!(repo.get_by_id("c1").await.unwrap().is_some());
        assert!(repo.get_by_id("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_username() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.contacts();

        repo.insert(&contact("c1", CustomerType::Lead)).await.unwrap();
        let mut twin = contact("c2", CustomerType::Lead);
        twin.username = "user_c1".to_string();

        let err = repo.insert(&twin).await.unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { .. }));
    }
}
