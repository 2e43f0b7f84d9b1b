//! # Product Repository
//!
//! The catalog query engine: listing with filter/search/sort/pagination
//! and selective relation projection, full detail loads, and mutations
//! with nested relation replacement.
//!
//! ## Nested Relation Replacement
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │            update(id, patch with cuts: [a, b])                          │
//! │                                                                         │
//! │  BEGIN TRANSACTION                                                      │
//! │    UPDATE products SET ...            ← parent row                      │
//! │    DELETE FROM product_cuts WHERE product_id = id                       │
//! │    INSERT product_cuts (id, a)        ← the supplied set, wholesale    │
//! │    INSERT product_cuts (id, b)                                          │
//! │  COMMIT                                                                 │
//! │                                                                         │
//! │  A crash mid-replacement rolls the whole thing back: the product       │
//! │  never ends up with zero cuts when the caller sent a full set.         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Supplying a relation array replaces the whole set; omitting it leaves
//! the stored set untouched. There is no row-level merge.

use chrono::{DateTime, Utc};
use sqlx::{FromRow, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use crate::repository::{like_pattern, money_text, new_id, parse_opt_money};
use tajo_core::validation::{validate_new_product, validate_product_patch};
use tajo_core::{
    Cut, CutPrice, IncludeSpec, Money, NewProduct, Page, PageParams, Pagination, Product,
    ProductCutDetail, ProductDetail, ProductPatch, ProductSortBy, ProductSummary, SortOrder,
};

const PRODUCT_COLUMNS: &str = "id, name, description, sku, barcode, image_url, \
     price_per_kg, price_per_unit, is_active, base_unit_id, created_at, updated_at";

// =============================================================================
// Row Types
// =============================================================================

#[derive(Debug, FromRow)]
struct ProductRow {
    id: String,
    name: String,
    description: Option<String>,
    sku: Option<String>,
    barcode: Option<String>,
    image_url: Option<String>,
    price_per_kg: Option<String>,
    price_per_unit: Option<String>,
    is_active: bool,
    base_unit_id: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ProductRow {
    fn into_product(self) -> DbResult<Product> {
        Ok(Product {
            price_per_kg: parse_opt_money("product", "price_per_kg", self.price_per_kg.as_deref())?,
            price_per_unit: parse_opt_money(
                "product",
                "price_per_unit",
                self.price_per_unit.as_deref(),
            )?,
            id: self.id,
            name: self.name,
            description: self.description,
            sku: self.sku,
            barcode: self.barcode,
            image_url: self.image_url,
            is_active: self.is_active,
            base_unit_id: self.base_unit_id,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(Debug, FromRow)]
struct CutPriceRow {
    cut_id: String,
    cut_name: String,
    price_per_kg: Option<String>,
    price_per_unit: Option<String>,
}

#[derive(Debug, FromRow)]
struct CutDetailRow {
    cut_id: String,
    price_per_kg: Option<String>,
    price_per_unit: Option<String>,
    cut_name: String,
    cut_description: Option<String>,
    cut_created_at: DateTime<Utc>,
    cut_updated_at: DateTime<Utc>,
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for product database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = db.products();
/// let page = repo
///     .list_active(IncludeSpec::NONE, PageParams::default(), None, None, None)
///     .await?;
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

    // -------------------------------------------------------------------------
    // Listing
    // -------------------------------------------------------------------------

    /// Lists active products, paginated.
    ///
    /// ## Filtering
    /// - always `is_active = 1`
    /// - `search` (trimmed, blank means none): case-insensitive substring
    ///   against name OR sku
    ///
    /// ## Sorting
    /// `sort_by` defaults to name, `order` to ascending.
    ///
    /// ## Projection
    /// `include.categories` attaches the category-id set; `include.cuts`
    /// attaches cut id/name plus override prices. Nothing else is loaded,
    /// so listing payloads stay small.
    pub async fn list_active(
        &self,
        include: IncludeSpec,
        params: PageParams,
        search: Option<&str>,
        sort_by: Option<ProductSortBy>,
        order: Option<SortOrder>,
    ) -> DbResult<Page<ProductSummary>> {
        params.validate()?;

        let sort_by = sort_by.unwrap_or_default();
        let order = order.unwrap_or_else(|| sort_by.default_order());

        let pattern = search
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(like_pattern);

        debug!(?params, search = ?pattern, "Listing active products");

        let mut where_sql = String::from(" WHERE is_active = 1");
        if pattern.is_some() {
            where_sql.push_str(
                r" AND (LOWER(name) LIKE ? ESCAPE '\' OR LOWER(COALESCE(sku, '')) LIKE ? ESCAPE '\')",
            );
        }

        let count_sql = format!("SELECT COUNT(*) FROM products{where_sql}");
        let mut count_q = sqlx::query_scalar::<_, i64>(&count_sql);
        if let Some(p) = &pattern {
            count_q = count_q.bind(p).bind(p);
        }
        let total = count_q.fetch_one(&self.pool).await?;

        let data_sql = format!(
            "SELECT {PRODUCT_COLUMNS} FROM products{where_sql} ORDER BY {} LIMIT ? OFFSET ?",
            sort_sql(sort_by, order),
        );
        let mut data_q = sqlx::query_as::<_, ProductRow>(&data_sql);
        if let Some(p) = &pattern {
            data_q = data_q.bind(p).bind(p);
        }
        let rows = data_q
            .bind(i64::from(params.limit))
            .bind(i64::from(params.offset()))
            .fetch_all(&self.pool)
            .await?;

        let mut data = Vec::with_capacity(rows.len());
        for row in rows {
            let product = row.into_product()?;
            let categories = if include.categories {
                Some(self.category_ids(&product.id).await?)
            } else {
                None
            };
            let cuts = if include.cuts {
                Some(self.cut_prices(&product.id).await?)
            } else {
                None
            };
            data.push(ProductSummary {
                product,
                categories,
                cuts,
            });
        }

        Ok(Page {
            data,
            pagination: Pagination::new(params, total as u64),
        })
    }

    // -------------------------------------------------------------------------
    // Detail
    // -------------------------------------------------------------------------

    /// Full detail load: product plus category-id set plus cuts with the
    /// cut entity nested. Fails with NotFound if the id is absent.
    pub async fn get(&self, id: &str) -> DbResult<ProductDetail> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?");
        let row = sqlx::query_as::<_, ProductRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("product", id))?;

        Ok(ProductDetail {
            product: row.into_product()?,
            categories: self.category_ids(id).await?,
            cuts: self.cut_details(id).await?,
        })
    }

    // -------------------------------------------------------------------------
    // Mutations
    // -------------------------------------------------------------------------

    /// Creates a product with its nested categories/cuts in one
    /// transaction. Incoming zero prices are stored as absent.
    pub async fn create(&self, dto: &NewProduct) -> DbResult<ProductDetail> {
        validate_new_product(dto)?;

        let id = new_id();
        let now = Utc::now();
        let price_per_kg = money_text(Money::from_input(dto.price_per_kg)?);
        let price_per_unit = money_text(Money::from_input(dto.price_per_unit)?);

        debug!(id = %id, name = %dto.name, "Creating product");

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        sqlx::query(
            "INSERT INTO products (id, name, description, sku, barcode, image_url, \
             price_per_kg, price_per_unit, is_active, base_unit_id, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(&dto.name)
        .bind(&dto.description)
        .bind(&dto.sku)
        .bind(&dto.barcode)
        .bind(&dto.image_url)
        .bind(&price_per_kg)
        .bind(&price_per_unit)
        .bind(dto.is_active.unwrap_or(true))
        .bind(&dto.base_unit_id)
        .bind(now)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        if let Some(categories) = &dto.categories {
            for cat in categories {
                sqlx::query(
                    "INSERT INTO product_categories (product_id, category_id) VALUES (?, ?)",
                )
                .bind(&id)
                .bind(&cat.category_id)
                .execute(&mut *tx)
                .await?;
            }
        }

        if let Some(cuts) = &dto.cuts {
            for cut in cuts {
                sqlx::query(
                    "INSERT INTO product_cuts (product_id, cut_id, price_per_kg, price_per_unit) \
                     VALUES (?, ?, ?, ?)",
                )
                .bind(&id)
                .bind(&cut.cut_id)
                .bind(money_text(Money::from_input(cut.price_per_kg)?))
                .bind(money_text(Money::from_input(cut.price_per_unit)?))
                .execute(&mut *tx)
                .await?;
            }
        }

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        self.get(&id).await
    }

    /// Updates a product.
    ///
    /// Scalar fields merge over the stored row; a supplied `categories` or
    /// `cuts` array replaces the entire relation set inside the same
    /// transaction as the parent write. Fails with NotFound if the id does
    /// not exist (existence probe before mutating).
    pub async fn update(&self, id: &str, patch: &ProductPatch) -> DbResult<ProductDetail> {
        validate_product_patch(patch)?;
        self.ensure_exists(id).await?;

        debug!(id = %id, "Updating product");

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?");
        let current = sqlx::query_as::<_, ProductRow>(&sql)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| DbError::not_found("product", id))?;

        // Merge: supplied fields win, zero prices become absent
        let price_per_kg = match patch.price_per_kg {
            Some(v) => money_text(Money::from_input(Some(v))?),
            None => current.price_per_kg,
        };
        let price_per_unit = match patch.price_per_unit {
            Some(v) => money_text(Money::from_input(Some(v))?),
            None => current.price_per_unit,
        };

        sqlx::query(
            "UPDATE products SET name = ?, description = ?, sku = ?, barcode = ?, \
             image_url = ?, price_per_kg = ?, price_per_unit = ?, is_active = ?, \
             base_unit_id = ?, updated_at = ? WHERE id = ?",
        )
        .bind(patch.name.as_ref().unwrap_or(&current.name))
        .bind(patch.description.as_ref().or(current.description.as_ref()))
        .bind(patch.sku.as_ref().or(current.sku.as_ref()))
        .bind(patch.barcode.as_ref().or(current.barcode.as_ref()))
        .bind(patch.image_url.as_ref().or(current.image_url.as_ref()))
        .bind(&price_per_kg)
        .bind(&price_per_unit)
        .bind(patch.is_active.unwrap_or(current.is_active))
        .bind(patch.base_unit_id.as_ref().unwrap_or(&current.base_unit_id))
        .bind(Utc::now())
        .bind(id)
        .execute(&mut *tx)
        .await?;

        if let Some(categories) = &patch.categories {
            let replace = async {
                sqlx::query("DELETE FROM product_categories WHERE product_id = ?")
                    .bind(id)
                    .execute(&mut *tx)
                    .await?;
                for cat in categories {
                    sqlx::query(
                        "INSERT INTO product_categories (product_id, category_id) VALUES (?, ?)",
                    )
                    .bind(id)
                    .bind(&cat.category_id)
                    .execute(&mut *tx)
                    .await?;
                }
                Ok::<(), DbError>(())
            };
            replace
                .await
                .map_err(|e| DbError::relation_replacement("product", id, "categories", e))?;
        }

        if let Some(cuts) = &patch.cuts {
            let replace = async {
                sqlx::query("DELETE FROM product_cuts WHERE product_id = ?")
                    .bind(id)
                    .execute(&mut *tx)
                    .await?;
                for cut in cuts {
                    sqlx::query(
                        "INSERT INTO product_cuts (product_id, cut_id, price_per_kg, price_per_unit) \
                         VALUES (?, ?, ?, ?)",
                    )
                    .bind(id)
                    .bind(&cut.cut_id)
                    .bind(money_text(Money::from_input(cut.price_per_kg)?))
                    .bind(money_text(Money::from_input(cut.price_per_unit)?))
                    .execute(&mut *tx)
                    .await?;
                }
                Ok::<(), DbError>(())
            };
            replace
                .await
                .map_err(|e| DbError::relation_replacement("product", id, "cuts", e))?;
        }

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        self.get(id).await
    }

    /// Hard-deletes a product; join rows cascade.
    ///
    /// Returns the deleted detail so the caller can hand the image URL to
    /// the image-store collaborator.
    pub async fn remove(&self, id: &str) -> DbResult<ProductDetail> {
        let detail = self.get(id).await?;

        debug!(id = %id, "Deleting product");

        let result = sqlx::query("DELETE FROM products WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            // Deleted between probe and write; surface it as NotFound anyway
            return Err(DbError::not_found("product", id));
        }

        Ok(detail)
    }

    /// Counts active products (for diagnostics).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products WHERE is_active = 1")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    // -------------------------------------------------------------------------
    // Internals
    // -------------------------------------------------------------------------

    /// Existence probe: turns "0 rows affected" ambiguity into NotFound.
    async fn ensure_exists(&self, id: &str) -> DbResult<()> {
        let exists: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products WHERE id = ?")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;

        if exists == 0 {
            return Err(DbError::not_found("product", id));
        }
        Ok(())
    }

    async fn category_ids(&self, product_id: &str) -> DbResult<Vec<String>> {
        let ids = sqlx::query_scalar::<_, String>(
            "SELECT category_id FROM product_categories WHERE product_id = ? ORDER BY category_id",
        )
        .bind(product_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(ids)
    }

    async fn cut_prices(&self, product_id: &str) -> DbResult<Vec<CutPrice>> {
        let rows = sqlx::query_as::<_, CutPriceRow>(
            "SELECT pc.cut_id, c.name AS cut_name, pc.price_per_kg, pc.price_per_unit \
             FROM product_cuts pc JOIN cuts c ON c.id = pc.cut_id \
             WHERE pc.product_id = ? ORDER BY c.name",
        )
        .bind(product_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|row| {
                Ok(CutPrice {
                    price_per_kg: parse_opt_money(
                        "product_cut",
                        "price_per_kg",
                        row.price_per_kg.as_deref(),
                    )?,
                    price_per_unit: parse_opt_money(
                        "product_cut",
                        "price_per_unit",
                        row.price_per_unit.as_deref(),
                    )?,
                    cut_id: row.cut_id,
                    name: row.cut_name,
                })
            })
            .collect()
    }

    async fn cut_details(&self, product_id: &str) -> DbResult<Vec<ProductCutDetail>> {
        let rows = sqlx::query_as::<_, CutDetailRow>(
            "SELECT pc.cut_id, pc.price_per_kg, pc.price_per_unit, \
             c.name AS cut_name, c.description AS cut_description, \
             c.created_at AS cut_created_at, c.updated_at AS cut_updated_at \
             FROM product_cuts pc JOIN cuts c ON c.id = pc.cut_id \
             WHERE pc.product_id = ? ORDER BY c.name",
        )
        .bind(product_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|row| {
                Ok(ProductCutDetail {
                    price_per_kg: parse_opt_money(
                        "product_cut",
                        "price_per_kg",
                        row.price_per_kg.as_deref(),
                    )?,
                    price_per_unit: parse_opt_money(
                        "product_cut",
                        "price_per_unit",
                        row.price_per_unit.as_deref(),
                    )?,
                    cut: Cut {
                        id: row.cut_id.clone(),
                        name: row.cut_name,
                        description: row.cut_description,
                        created_at: row.cut_created_at,
                        updated_at: row.cut_updated_at,
                    },
                    cut_id: row.cut_id,
                })
            })
            .collect()
    }
}

fn sort_sql(sort_by: ProductSortBy, order: SortOrder) -> String {
    let column = match sort_by {
        ProductSortBy::CreatedAt => "created_at",
        ProductSortBy::UpdatedAt => "updated_at",
        ProductSortBy::Name => "name",
        ProductSortBy::IsActive => "is_active",
    };
    let direction = match order {
        SortOrder::Asc => "ASC",
        SortOrder::Desc => "DESC",
    };
    format!("{column} {direction}")
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use rust_decimal_macros::dec;
    use tajo_core::{CategoryRef, CutPriceInput, NewCategory, NewCut, NewUnit};

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    async fn seed_unit(db: &Database) -> String {
        db.catalog()
            .create_unit(&NewUnit {
                name: "Kilogramo".to_string(),
                abbreviation: "kg".to_string(),
                conversion_factor: None,
            })
            .await
            .unwrap()
            .id
    }

    async fn seed_cut(db: &Database, name: &str) -> String {
        db.catalog()
            .create_cut(&NewCut {
                name: name.to_string(),
                description: None,
            })
            .await
            .unwrap()
            .id
    }

    async fn seed_category(db: &Database, name: &str) -> String {
        db.catalog()
            .create_category(&NewCategory {
                name: name.to_string(),
                description: None,
            })
            .await
            .unwrap()
            .id
    }

    fn product(name: &str, unit_id: &str, price_per_kg: rust_decimal::Decimal) -> NewProduct {
        NewProduct {
            name: name.to_string(),
            base_unit_id: unit_id.to_string(),
            price_per_kg: Some(price_per_kg),
            ..NewProduct::default()
        }
    }

    #[tokio::test]
    async fn test_create_and_get_with_priced_cut() {
        let db = test_db().await;
        let unit = seed_unit(&db).await;
        let cut = seed_cut(&db, "Por Mitad").await;

        let mut dto = product("Ribeye", &unit, dec!(250));
        dto.cuts = Some(vec![CutPriceInput {
            cut_id: cut.clone(),
            price_per_kg: Some(dec!(300)),
            price_per_unit: None,
        }]);

        let created = db.products().create(&dto).await.unwrap();
        let fetched = db.products().get(&created.product.id).await.unwrap();

        assert_eq!(fetched.product.name, "Ribeye");
        assert_eq!(
            fetched.product.price_per_kg,
            Some(Money::new(dec!(250)).unwrap())
        );
        assert!(fetched.categories.is_empty());
        assert_eq!(fetched.cuts.len(), 1);
        assert_eq!(fetched.cuts[0].cut_id, cut);
        assert_eq!(
            fetched.cuts[0].price_per_kg,
            Some(Money::new(dec!(300)).unwrap())
        );
        assert_eq!(fetched.cuts[0].cut.name, "Por Mitad");
    }

    #[tokio::test]
    async fn test_zero_price_stored_absent() {
        let db = test_db().await;
        let unit = seed_unit(&db).await;

        let mut dto = product("Panza", &unit, dec!(0));
        dto.price_per_unit = Some(dec!(30));

        let created = db.products().create(&dto).await.unwrap();
        assert_eq!(created.product.price_per_kg, None);
        assert_eq!(
            created.product.price_per_unit,
            Some(Money::new(dec!(30)).unwrap())
        );

        // The column really is NULL, not '0'
        let raw: Option<String> =
            sqlx::query_scalar("SELECT price_per_kg FROM products WHERE id = ?")
                .bind(&created.product.id)
                .fetch_one(db.pool())
                .await
                .unwrap();
        assert_eq!(raw, None);
    }

    #[tokio::test]
    async fn test_update_replaces_cut_set_wholesale() {
        let db = test_db().await;
        let unit = seed_unit(&db).await;
        let halved = seed_cut(&db, "Por Mitad").await;
        let quartered = seed_cut(&db, "En Cuatro").await;
        let sliced = seed_cut(&db, "Rodajas").await;

        let mut dto = product("Menudo National", &unit, dec!(60));
        dto.cuts = Some(vec![
            CutPriceInput {
                cut_id: halved.clone(),
                price_per_kg: Some(dec!(60)),
                price_per_unit: None,
            },
            CutPriceInput {
                cut_id: quartered,
                price_per_kg: Some(dec!(62)),
                price_per_unit: None,
            },
        ]);
        let created = db.products().create(&dto).await.unwrap();
        assert_eq!(created.cuts.len(), 2);

        // Replace both rows with a single different one
        let patch = ProductPatch {
            cuts: Some(vec![CutPriceInput {
                cut_id: sliced.clone(),
                price_per_kg: Some(dec!(65)),
                price_per_unit: None,
            }]),
            ..ProductPatch::default()
        };
        let updated = db.products().update(&created.product.id, &patch).await.unwrap();

        assert_eq!(updated.cuts.len(), 1);
        assert_eq!(updated.cuts[0].cut_id, sliced);
        assert_eq!(
            updated.cuts[0].price_per_kg,
            Some(Money::new(dec!(65)).unwrap())
        );

        // No leftover prior rows in storage either
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM product_cuts WHERE product_id = ?")
            .bind(&created.product.id)
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(count, 1);

        // Omitting the field leaves the set untouched
        let rename_only = ProductPatch {
            name: Some("Menudo Nacional".to_string()),
            ..ProductPatch::default()
        };
        let untouched = db.products().update(&created.product.id, &rename_only).await.unwrap();
        assert_eq!(untouched.product.name, "Menudo Nacional");
        assert_eq!(untouched.cuts.len(), 1);
    }

    #[tokio::test]
    async fn test_update_replaces_category_set() {
        let db = test_db().await;
        let unit = seed_unit(&db).await;
        let menudo = seed_category(&db, "Cajas de Menudo").await;
        let blanca = seed_category(&db, "Viscera Blanca").await;

        let mut dto = product("Libro", &unit, dec!(52));
        dto.categories = Some(vec![CategoryRef {
            category_id: menudo.clone(),
        }]);
        let created = db.products().create(&dto).await.unwrap();
        assert_eq!(created.categories, vec![menudo]);

        let patch = ProductPatch {
            categories: Some(vec![CategoryRef {
                category_id: blanca.clone(),
            }]),
            ..ProductPatch::default()
        };
        let updated = db.products().update(&created.product.id, &patch).await.unwrap();
        assert_eq!(updated.categories, vec![blanca]);
    }

    #[tokio::test]
    async fn test_update_missing_product_is_not_found() {
        let db = test_db().await;
        let err = db
            .products()
            .update("no-such-id", &ProductPatch::default())
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));

        let err = db.products().get("no-such-id").await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_search_matches_name_or_sku() {
        let db = test_db().await;
        let unit = seed_unit(&db).await;

        let mut a = product("Panza", &unit, dec!(50));
        a.sku = Some("VB-01".to_string());
        let mut b = product("Libro", &unit, dec!(52));
        b.sku = Some("vb-02".to_string());
        let c = product("Pata Morena", &unit, dec!(45));

        db.products().create(&a).await.unwrap();
        db.products().create(&b).await.unwrap();
        db.products().create(&c).await.unwrap();

        // OR semantics across name and sku, case-insensitive
        let page = db
            .products()
            .list_active(IncludeSpec::NONE, PageParams::default(), Some("vb"), None, None)
            .await
            .unwrap();
        assert_eq!(page.pagination.total, 2);

        let page = db
            .products()
            .list_active(IncludeSpec::NONE, PageParams::default(), Some("  PATA "), None, None)
            .await
            .unwrap();
        assert_eq!(page.pagination.total, 1);
        assert_eq!(page.data[0].product.name, "Pata Morena");

        // Blank search is no filter
        let page = db
            .products()
            .list_active(IncludeSpec::NONE, PageParams::default(), Some("   "), None, None)
            .await
            .unwrap();
        assert_eq!(page.pagination.total, 3);
    }

    #[tokio::test]
    async fn test_listing_excludes_inactive_and_sorts_by_name() {
        let db = test_db().await;
        let unit = seed_unit(&db).await;

        db.products().create(&product("Sesos", &unit, dec!(70))).await.unwrap();
        db.products().create(&product("Libro", &unit, dec!(52))).await.unwrap();
        let mut inactive = product("Retirado", &unit, dec!(10));
        inactive.is_active = Some(false);
        db.products().create(&inactive).await.unwrap();

        let page = db
            .products()
            .list_active(IncludeSpec::NONE, PageParams::default(), None, None, None)
            .await
            .unwrap();

        let names: Vec<&str> = page.data.iter().map(|p| p.product.name.as_str()).collect();
        assert_eq!(names, vec!["Libro", "Sesos"]);

        // Explicit descending flips it
        let page = db
            .products()
            .list_active(
                IncludeSpec::NONE,
                PageParams::default(),
                None,
                Some(ProductSortBy::Name),
                Some(SortOrder::Desc),
            )
            .await
            .unwrap();
        let names: Vec<&str> = page.data.iter().map(|p| p.product.name.as_str()).collect();
        assert_eq!(names, vec!["Sesos", "Libro"]);
    }

    #[tokio::test]
    async fn test_pagination_over_25_products() {
        let db = test_db().await;
        let unit = seed_unit(&db).await;

        for i in 1..=25 {
            db.products()
                .create(&product(&format!("Producto {i:02}"), &unit, dec!(10)))
                .await
                .unwrap();
        }

        let page1 = db
            .products()
            .list_active(IncludeSpec::NONE, PageParams::new(1, 10), None, None, None)
            .await
            .unwrap();
        assert_eq!(page1.data.len(), 10);
        assert_eq!(page1.pagination.total, 25);
        assert_eq!(page1.pagination.total_pages, 3);
        assert!(page1.pagination.has_next);
        assert!(!page1.pagination.has_prev);

        let page3 = db
            .products()
            .list_active(IncludeSpec::NONE, PageParams::new(3, 10), None, None, None)
            .await
            .unwrap();
        assert_eq!(page3.data.len(), 5);
        assert!(!page3.pagination.has_next);
        assert!(page3.pagination.has_prev);
        assert_eq!(page3.data[0].product.name, "Producto 21");
    }

    #[tokio::test]
    async fn test_zero_limit_rejected() {
        let db = test_db().await;
        let err = db
            .products()
            .list_active(IncludeSpec::NONE, PageParams::new(1, 0), None, None, None)
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Core(_)));
    }

    #[tokio::test]
    async fn test_include_projection() {
        let db = test_db().await;
        let unit = seed_unit(&db).await;
        let category = seed_category(&db, "Viscera Roja").await;
        let cut = seed_cut(&db, "Rodajas").await;

        let mut dto = product("Corazon", &unit, dec!(55));
        dto.categories = Some(vec![CategoryRef {
            category_id: category.clone(),
        }]);
        dto.cuts = Some(vec![CutPriceInput {
            cut_id: cut.clone(),
            price_per_kg: None,
            price_per_unit: Some(dec!(20)),
        }]);
        db.products().create(&dto).await.unwrap();

        // Nothing attached by default
        let bare = db
            .products()
            .list_active(IncludeSpec::NONE, PageParams::default(), None, None, None)
            .await
            .unwrap();
        assert!(bare.data[0].categories.is_none());
        assert!(bare.data[0].cuts.is_none());

        // Both attached when asked for
        let full = db
            .products()
            .list_active(
                IncludeSpec::parse("categories,cuts").unwrap(),
                PageParams::default(),
                None,
                None,
                None,
            )
            .await
            .unwrap();
        let row = &full.data[0];
        assert_eq!(row.categories.as_deref(), Some(&[category][..]));
        let cuts = row.cuts.as_ref().unwrap();
        assert_eq!(cuts.len(), 1);
        assert_eq!(cuts[0].cut_id, cut);
        assert_eq!(cuts[0].name, "Rodajas");
        assert_eq!(cuts[0].price_per_unit, Some(Money::new(dec!(20)).unwrap()));
        assert_eq!(cuts[0].price_per_kg, None);
    }

    #[tokio::test]
    async fn test_remove_cascades_join_rows() {
        let db = test_db().await;
        let unit = seed_unit(&db).await;
        let category = seed_category(&db, "Cajas de Menudo").await;
        let cut = seed_cut(&db, "Cruz").await;

        let mut dto = product("Menudo Excel", &unit, dec!(62));
        dto.categories = Some(vec![CategoryRef {
            category_id: category,
        }]);
        dto.cuts = Some(vec![CutPriceInput {
            cut_id: cut,
            price_per_kg: Some(dec!(64)),
            price_per_unit: None,
        }]);
        let created = db.products().create(&dto).await.unwrap();
        let id = created.product.id.clone();

        let removed = db.products().remove(&id).await.unwrap();
        assert_eq!(removed.product.id, id);

        assert!(matches!(
            db.products().get(&id).await.unwrap_err(),
            DbError::NotFound { .. }
        ));

        let cuts: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM product_cuts WHERE product_id = ?")
            .bind(&id)
            .fetch_one(db.pool())
            .await
            .unwrap();
        let cats: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM product_categories WHERE product_id = ?")
                .bind(&id)
                .fetch_one(db.pool())
                .await
                .unwrap();
        assert_eq!((cuts, cats), (0, 0));
    }

    #[tokio::test]
    async fn test_create_with_unknown_cut_fails_fk() {
        let db = test_db().await;
        let unit = seed_unit(&db).await;

        let mut dto = product("Tripa", &unit, dec!(40));
        dto.cuts = Some(vec![CutPriceInput {
            cut_id: "no-such-cut".to_string(),
            price_per_kg: Some(dec!(42)),
            price_per_unit: None,
        }]);

        let err = db.products().create(&dto).await.unwrap_err();
        assert!(matches!(err, DbError::ForeignKeyViolation { .. }));

        // The transaction rolled back: no orphan product row
        assert_eq!(db.products().count().await.unwrap(), 0);
    }
}
