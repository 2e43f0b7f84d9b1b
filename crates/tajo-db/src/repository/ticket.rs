//! # Ticket Repository
//!
//! The ledger query engine: paginated ticket listings, atomic ticket
//! creation, item replacement and the daily-summary loader.
//!
//! ## Snapshot Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                 Sale completion freezes prices                          │
//! │                                                                         │
//! │  catalog: Ribeye pricePerKg 250 ──┐                                    │
//! │                                   │ copied at sale time                │
//! │                                   ▼                                     │
//! │  ticket_items: unit_price 250, subtotal 875  ← authoritative forever   │
//! │                                                                         │
//! │  Next week the catalog says 290. The ticket still says 250.            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! `ticket.total` is likewise a frozen snapshot the caller asserts equals
//! the item subtotals; storage never recomputes it.

use chrono::{DateTime, Utc};
use sqlx::{FromRow, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use crate::repository::{like_pattern, new_id, parse_decimal, parse_money};
use tajo_core::summary::{daily_summary, parse_date_input, resolve_day};
use tajo_core::validation::{validate_new_ticket, validate_ticket_patch};
use tajo_core::{
    DailySummary, Money, NewTicket, NewTicketItem, Page, PageParams, Pagination, SaleUnit,
    SortOrder, Ticket, TicketItem, TicketItemDetail, TicketPatch, TicketSortBy, TicketWithItems,
};

const TICKET_COLUMNS: &str =
    "id, date, total, payment_type, user_id, client_id, printed, created_at, updated_at";

// =============================================================================
// Row Types
// =============================================================================

#[derive(Debug, FromRow)]
struct TicketRow {
    id: String,
    date: DateTime<Utc>,
    total: String,
    payment_type: String,
    user_id: Option<String>,
    client_id: Option<String>,
    printed: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TicketRow {
    fn into_ticket(self) -> DbResult<Ticket> {
        Ok(Ticket {
            total: parse_money("ticket", "total", &self.total)?,
            id: self.id,
            date: self.date,
            payment_type: self.payment_type,
            user_id: self.user_id,
            client_id: self.client_id,
            printed: self.printed,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(Debug, FromRow)]
struct TicketItemRow {
    id: String,
    ticket_id: String,
    product_id: String,
    cut_id: Option<String>,
    quantity: String,
    unit_price: String,
    subtotal: String,
    unit: String,
    product_name: String,
    cut_name: Option<String>,
}

impl TicketItemRow {
    fn into_detail(self) -> DbResult<TicketItemDetail> {
        let unit = SaleUnit::parse(&self.unit).map_err(|e| DbError::CorruptRow {
            entity: "ticket_item".to_string(),
            column: "unit".to_string(),
            message: e.to_string(),
        })?;

        Ok(TicketItemDetail {
            item: TicketItem {
                quantity: parse_decimal("ticket_item", "quantity", &self.quantity)?,
                unit_price: parse_money("ticket_item", "unit_price", &self.unit_price)?,
                subtotal: parse_money("ticket_item", "subtotal", &self.subtotal)?,
                id: self.id,
                ticket_id: self.ticket_id,
                product_id: self.product_id,
                cut_id: self.cut_id,
                unit,
            },
            product_name: self.product_name,
            cut_name: self.cut_name,
        })
    }
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for ticket database operations.
#[derive(Debug, Clone)]
pub struct TicketRepository {
    pool: SqlitePool,
}

impl TicketRepository {
    /// Creates a new TicketRepository.
    pub fn new(pool: SqlitePool) -> Self {
        TicketRepository { pool }
    }

    // -------------------------------------------------------------------------
    // Listing
    // -------------------------------------------------------------------------

    /// Lists tickets, paginated, most recent first by default.
    ///
    /// ## Filtering
    /// - `search` (trimmed, blank means none): case-insensitive substring
    ///   against payment type OR any item's product name; a ticket
    ///   qualifies if at least one of its items matches
    /// - `user_id`: exact match
    /// - `start_date` / `end_date`: inclusive bounds on `date`, usable
    ///   independently or together; unparsable input fails with
    ///   InvalidDate
    #[allow(clippy::too_many_arguments)]
    pub async fn list(
        &self,
        params: PageParams,
        search: Option<&str>,
        user_id: Option<&str>,
        start_date: Option<&str>,
        end_date: Option<&str>,
        sort_by: Option<TicketSortBy>,
        order: Option<SortOrder>,
    ) -> DbResult<Page<TicketWithItems>> {
        params.validate()?;

        let sort_by = sort_by.unwrap_or_default();
        let order = order.unwrap_or_else(|| sort_by.default_order());

        let pattern = search
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(like_pattern);
        let start = start_date.map(parse_date_input).transpose()?;
        let end = end_date.map(parse_date_input).transpose()?;

        debug!(?params, search = ?pattern, user_id = ?user_id, "Listing tickets");

        let mut where_sql = String::from(" WHERE 1 = 1");
        if pattern.is_some() {
            where_sql.push_str(
                r" AND (LOWER(payment_type) LIKE ? ESCAPE '\' OR EXISTS (
                    SELECT 1 FROM ticket_items ti
                    JOIN products p ON p.id = ti.product_id
                    WHERE ti.ticket_id = tickets.id AND LOWER(p.name) LIKE ? ESCAPE '\'))",
            );
        }
        if user_id.is_some() {
            where_sql.push_str(" AND user_id = ?");
        }
        if start.is_some() {
            where_sql.push_str(" AND date >= ?");
        }
        if end.is_some() {
            where_sql.push_str(" AND date <= ?");
        }

        let count_sql = format!("SELECT COUNT(*) FROM tickets{where_sql}");
        let mut count_q = sqlx::query_scalar::<_, i64>(&count_sql);
        if let Some(p) = &pattern {
            count_q = count_q.bind(p).bind(p);
        }
        if let Some(u) = user_id {
            count_q = count_q.bind(u);
        }
        if let Some(s) = start {
            count_q = count_q.bind(s);
        }
        if let Some(e) = end {
            count_q = count_q.bind(e);
        }
        let total = count_q.fetch_one(&self.pool).await?;

        let data_sql = format!(
            "SELECT {TICKET_COLUMNS} FROM tickets{where_sql} ORDER BY {} LIMIT ? OFFSET ?",
            sort_sql(sort_by, order),
        );
        let mut data_q = sqlx::query_as::<_, TicketRow>(&data_sql);
        if let Some(p) = &pattern {
            data_q = data_q.bind(p).bind(p);
        }
        if let Some(u) = user_id {
            data_q = data_q.bind(u);
        }
        if let Some(s) = start {
            data_q = data_q.bind(s);
        }
        if let Some(e) = end {
            data_q = data_q.bind(e);
        }
        let rows = data_q
            .bind(i64::from(params.limit))
            .bind(i64::from(params.offset()))
            .fetch_all(&self.pool)
            .await?;

        let mut data = Vec::with_capacity(rows.len());
        for row in rows {
            let ticket = row.into_ticket()?;
            let items = self.items_for_ticket(&ticket.id).await?;
            data.push(TicketWithItems { ticket, items });
        }

        Ok(Page {
            data,
            pagination: Pagination::new(params, total as u64),
        })
    }

    // -------------------------------------------------------------------------
    // Detail
    // -------------------------------------------------------------------------

    /// Loads one ticket with its items, or NotFound.
    pub async fn get(&self, id: &str) -> DbResult<TicketWithItems> {
        let sql = format!("SELECT {TICKET_COLUMNS} FROM tickets WHERE id = ?");
        let row = sqlx::query_as::<_, TicketRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("ticket", id))?;

        let ticket = row.into_ticket()?;
        let items = self.items_for_ticket(id).await?;
        Ok(TicketWithItems { ticket, items })
    }

    // -------------------------------------------------------------------------
    // Mutations
    // -------------------------------------------------------------------------

    /// Creates a ticket with its items in one atomic write.
    ///
    /// Item product/cut references are enforced by the foreign keys, not
    /// pre-checked; `total`, `unit_price` and `subtotal` freeze exactly as
    /// submitted.
    pub async fn create(&self, dto: &NewTicket) -> DbResult<TicketWithItems> {
        validate_new_ticket(dto)?;

        let id = new_id();
        let now = Utc::now();
        let date = dto.date.unwrap_or(now);
        let total = Money::new(dto.total)?;

        debug!(id = %id, items = dto.items.len(), "Creating ticket");

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        sqlx::query(
            "INSERT INTO tickets (id, date, total, payment_type, user_id, client_id, \
             printed, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(date)
        .bind(total.amount().to_string())
        .bind(&dto.payment_type)
        .bind(&dto.user_id)
        .bind(&dto.client_id)
        .bind(dto.printed.unwrap_or(false))
        .bind(now)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        insert_items(&mut tx, &id, &dto.items).await?;

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        self.get(&id).await
    }

    /// Updates a ticket.
    ///
    /// Scalar fields merge over the stored row; a supplied `items` array
    /// wholesale-replaces the item set inside the same transaction. Fails
    /// with NotFound if the id does not exist.
    pub async fn update(&self, id: &str, patch: &TicketPatch) -> DbResult<TicketWithItems> {
        validate_ticket_patch(patch)?;
        self.ensure_exists(id).await?;

        debug!(id = %id, "Updating ticket");

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        let sql = format!("SELECT {TICKET_COLUMNS} FROM tickets WHERE id = ?");
        let current = sqlx::query_as::<_, TicketRow>(&sql)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| DbError::not_found("ticket", id))?;

        let total = match patch.total {
            Some(v) => Money::new(v)?.amount().to_string(),
            None => current.total,
        };

        sqlx::query(
            "UPDATE tickets SET date = ?, total = ?, payment_type = ?, user_id = ?, \
             client_id = ?, printed = ?, updated_at = ? WHERE id = ?",
        )
        .bind(patch.date.unwrap_or(current.date))
        .bind(&total)
        .bind(patch.payment_type.as_ref().unwrap_or(&current.payment_type))
        .bind(patch.user_id.as_ref().or(current.user_id.as_ref()))
        .bind(patch.client_id.as_ref().or(current.client_id.as_ref()))
        .bind(patch.printed.unwrap_or(current.printed))
        .bind(Utc::now())
        .bind(id)
        .execute(&mut *tx)
        .await?;

        if let Some(items) = &patch.items {
            let replace = async {
                sqlx::query("DELETE FROM ticket_items WHERE ticket_id = ?")
                    .bind(id)
                    .execute(&mut *tx)
                    .await?;
                insert_items(&mut tx, id, items).await
            };
            replace
                .await
                .map_err(|e| DbError::relation_replacement("ticket", id, "items", e))?;
        }

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        self.get(id).await
    }

    /// Hard-deletes a ticket; its items cascade. Returns the deleted
    /// ticket with items.
    pub async fn remove(&self, id: &str) -> DbResult<TicketWithItems> {
        let detail = self.get(id).await?;

        debug!(id = %id, "Deleting ticket");

        let result = sqlx::query("DELETE FROM tickets WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("ticket", id));
        }

        Ok(detail)
    }

    // -------------------------------------------------------------------------
    // Daily Summary
    // -------------------------------------------------------------------------

    /// Produces the daily sales summary for the given day.
    ///
    /// Loads every ticket in the `[00:00:00.000, 23:59:59.999]` window of
    /// the resolved day, items joined with product and cut names, and
    /// hands them to the pure aggregation. `None` means today; unparsable
    /// input fails with InvalidDate.
    pub async fn daily_summary(&self, date: Option<&str>) -> DbResult<DailySummary> {
        let window = resolve_day(date, Utc::now())?;

        debug!(start = %window.start, end = %window.end, "Building daily summary");

        let sql =
            format!("SELECT {TICKET_COLUMNS} FROM tickets WHERE date >= ? AND date <= ? ORDER BY date");
        let rows = sqlx::query_as::<_, TicketRow>(&sql)
            .bind(window.start)
            .bind(window.end)
            .fetch_all(&self.pool)
            .await?;

        let mut tickets = Vec::with_capacity(rows.len());
        for row in rows {
            let ticket = row.into_ticket()?;
            let items = self.items_for_ticket(&ticket.id).await?;
            tickets.push(TicketWithItems { ticket, items });
        }

        Ok(daily_summary(&window, &tickets))
    }

    // -------------------------------------------------------------------------
    // Internals
    // -------------------------------------------------------------------------

    async fn ensure_exists(&self, id: &str) -> DbResult<()> {
        let exists: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM tickets WHERE id = ?")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;

        if exists == 0 {
            return Err(DbError::not_found("ticket", id));
        }
        Ok(())
    }

    /// Items in entry order, joined with product/cut display names.
    async fn items_for_ticket(&self, ticket_id: &str) -> DbResult<Vec<TicketItemDetail>> {
        let rows = sqlx::query_as::<_, TicketItemRow>(
            "SELECT i.id, i.ticket_id, i.product_id, i.cut_id, i.quantity, i.unit_price, \
             i.subtotal, i.unit, p.name AS product_name, c.name AS cut_name \
             FROM ticket_items i \
             JOIN products p ON p.id = i.product_id \
             LEFT JOIN cuts c ON c.id = i.cut_id \
             WHERE i.ticket_id = ? ORDER BY i.position",
        )
        .bind(ticket_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(TicketItemRow::into_detail).collect()
    }
}

async fn insert_items(
    tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
    ticket_id: &str,
    items: &[NewTicketItem],
) -> DbResult<()> {
    for (position, item) in items.iter().enumerate() {
        sqlx::query(
            "INSERT INTO ticket_items (id, ticket_id, product_id, cut_id, quantity, \
             unit_price, subtotal, unit, position) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(new_id())
        .bind(ticket_id)
        .bind(&item.product_id)
        .bind(&item.cut_id)
        .bind(item.quantity.to_string())
        .bind(Money::new(item.unit_price)?.amount().to_string())
        .bind(Money::new(item.subtotal)?.amount().to_string())
        .bind(item.unit.as_str())
        .bind(position as i64)
        .execute(&mut **tx)
        .await?;
    }
    Ok(())
}

fn sort_sql(sort_by: TicketSortBy, order: SortOrder) -> String {
    // total is stored as exact decimal TEXT; the cast is for ordering only
    let column = match sort_by {
        TicketSortBy::Date => "date",
        TicketSortBy::CreatedAt => "created_at",
        TicketSortBy::UpdatedAt => "updated_at",
        TicketSortBy::Total => "CAST(total AS REAL)",
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
