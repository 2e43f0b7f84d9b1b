//! # Client Repository
//!
//! Clients are light reference entities a ticket optionally links (who
//! bought). Create and list only.

use chrono::{DateTime, Utc};
use sqlx::{FromRow, SqlitePool};
use tracing::debug;

use crate::error::DbResult;
use crate::repository::new_id;
use tajo_core::Client;

#[derive(Debug, FromRow)]
struct ClientRow {
    id: String,
    name: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Repository for client operations.
#[derive(Debug, Clone)]
pub struct ClientRepository {
    pool: SqlitePool,
}

impl ClientRepository {
    /// Creates a new ClientRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ClientRepository { pool }
    }

    /// Creates a client.
    pub async fn create(&self, name: &str) -> DbResult<Client> {
        let id = new_id();
        let now = Utc::now();

        debug!(name = %name, "Creating client");

        sqlx::query(
            "INSERT INTO clients (id, name, created_at, updated_at) VALUES (?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(name)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(Client {
            id,
            name: name.to_string(),
            created_at: now,
            updated_at: now,
        })
    }

    /// Lists clients, name-sorted.
    pub async fn list(&self) -> DbResult<Vec<Client>> {
        let rows = sqlx::query_as::<_, ClientRow>(
            "SELECT id, name, created_at, updated_at FROM clients ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| Client {
                id: row.id,
                name: row.name,
                created_at: row.created_at,
                updated_at: row.updated_at,
            })
            .collect())
    }
}
