//! # Catalog Reference Data
//!
//! Units, categories and cuts: small name-unique tables the products hang
//! off. Created during setup (or by the seed tool), listed by the catalog
//! screens, effectively immutable afterwards.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{FromRow, SqlitePool};
use tracing::debug;

use crate::error::DbResult;
use crate::repository::{new_id, parse_decimal};
use tajo_core::{Category, Cut, NewCategory, NewCut, NewUnit, Unit};

#[derive(Debug, FromRow)]
struct UnitRow {
    id: String,
    name: String,
    abbreviation: String,
    conversion_factor: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl UnitRow {
    fn into_unit(self) -> DbResult<Unit> {
        Ok(Unit {
            conversion_factor: parse_decimal("unit", "conversion_factor", &self.conversion_factor)?,
            id: self.id,
            name: self.name,
            abbreviation: self.abbreviation,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(Debug, FromRow)]
struct NamedRow {
    id: String,
    name: String,
    description: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Repository for units, categories and cuts.
#[derive(Debug, Clone)]
pub struct CatalogRepository {
    pool: SqlitePool,
}

impl CatalogRepository {
    /// Creates a new CatalogRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CatalogRepository { pool }
    }

    // -------------------------------------------------------------------------
    // Units
    // -------------------------------------------------------------------------

    /// Lists all units, name-sorted.
    pub async fn list_units(&self) -> DbResult<Vec<Unit>> {
        let rows = sqlx::query_as::<_, UnitRow>(
            "SELECT id, name, abbreviation, conversion_factor, created_at, updated_at \
             FROM units ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(UnitRow::into_unit).collect()
    }

    /// Creates a unit. Fails with UniqueViolation on a duplicate name.
    pub async fn create_unit(&self, dto: &NewUnit) -> DbResult<Unit> {
        let id = new_id();
        let now = Utc::now();
        let factor = dto.conversion_factor.unwrap_or(Decimal::ONE);

        debug!(name = %dto.name, "Creating unit");

        sqlx::query(
            "INSERT INTO units (id, name, abbreviation, conversion_factor, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(&dto.name)
        .bind(&dto.abbreviation)
        .bind(factor.to_string())
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(Unit {
            id,
            name: dto.name.clone(),
            abbreviation: dto.abbreviation.clone(),
            conversion_factor: factor,
            created_at: now,
            updated_at: now,
        })
    }

    // -------------------------------------------------------------------------
    // Categories
    // -------------------------------------------------------------------------

    /// Lists all categories, name-sorted.
    pub async fn list_categories(&self) -> DbResult<Vec<Category>> {
        let rows = sqlx::query_as::<_, NamedRow>(
            "SELECT id, name, description, created_at, updated_at FROM categories ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| Category {
                id: row.id,
                name: row.name,
                description: row.description,
                created_at: row.created_at,
                updated_at: row.updated_at,
            })
            .collect())
    }

    /// Creates a category. Fails with UniqueViolation on a duplicate name.
    pub async fn create_category(&self, dto: &NewCategory) -> DbResult<Category> {
        let id = new_id();
        let now = Utc::now();

        debug!(name = %dto.name, "Creating category");

        sqlx::query(
            "INSERT INTO categories (id, name, description, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(&dto.name)
        .bind(&dto.description)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(Category {
            id,
            name: dto.name.clone(),
            description: dto.description.clone(),
            created_at: now,
            updated_at: now,
        })
    }

    // -------------------------------------------------------------------------
    // Cuts
    // -------------------------------------------------------------------------

    /// Lists all cuts, name-sorted.
    pub async fn list_cuts(&self) -> DbResult<Vec<Cut>> {
        let rows = sqlx::query_as::<_, NamedRow>(
            "SELECT id, name, description, created_at, updated_at FROM cuts ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| Cut {
                id: row.id,
                name: row.name,
                description: row.description,
                created_at: row.created_at,
                updated_at: row.updated_at,
            })
            .collect())
    }

    /// Creates a cut. Fails with UniqueViolation on a duplicate name.
    pub async fn create_cut(&self, dto: &NewCut) -> DbResult<Cut> {
        let id = new_id();
        let now = Utc::now();

        debug!(name = %dto.name, "Creating cut");

        sqlx::query(
            "INSERT INTO cuts (id, name, description, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(&dto.name)
        .bind(&dto.description)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(Cut {
            id,
            name: dto.name.clone(),
            description: dto.description.clone(),
            created_at: now,
            updated_at: now,
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
