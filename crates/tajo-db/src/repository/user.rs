//! # User Repository
//!
//! Users are light reference entities a ticket optionally links (who
//! processed the sale). Create and list only; nothing here mutates them.

use chrono::{DateTime, Utc};
use sqlx::{FromRow, SqlitePool};
use tracing::debug;

use crate::error::DbResult;
use crate::repository::new_id;
use tajo_core::User;

#[derive(Debug, FromRow)]
struct UserRow {
    id: String,
    name: String,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Repository for user operations.
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    /// Creates a new UserRepository.
    pub fn new(pool: SqlitePool) -> Self {
        UserRepository { pool }
    }

    /// Creates an active user.
    pub async fn create(&self, name: &str) -> DbResult<User> {
        let id = new_id();
        let now = Utc::now();

        debug!(name = %name, "Creating user");

        sqlx::query(
            "INSERT INTO users (id, name, is_active, created_at, updated_at) \
             VALUES (?, ?, 1, ?, ?)",
        )
        .bind(&id)
        .bind(name)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(User {
            id,
            name: name.to_string(),
            is_active: true,
            created_at: now,
            updated_at: now,
        })
    }

    /// Lists active users, name-sorted.
    pub async fn list_active(&self) -> DbResult<Vec<User>> {
        let rows = sqlx::query_as::<_, UserRow>(
            "SELECT id, name, is_active, created_at, updated_at \
             FROM users WHERE is_active = 1 ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| User {
                id: row.id,
                name: row.name,
                is_active: row.is_active,
                created_at: row.created_at,
                updated_at: row.updated_at,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};

    #[tokio::test]
    async fn test_create_and_list_users() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        db.users().create("Rosa").await.unwrap();
        db.users().create("Alma").await.unwrap();

        let users = db.users().list_active().await.unwrap();
        let names: Vec<&str> = users.iter().map(|u| u.name.as_str()).collect();
        assert_eq!(names, vec!["Alma", "Rosa"]);
        assert!(users.iter().all(|u| u.is_active));
    }
}
