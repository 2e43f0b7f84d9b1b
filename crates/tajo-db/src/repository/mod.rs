//! # Repositories
//!
//! One repository per aggregate:
//!
//! - [`product`] - catalog query engine (listing, detail, nested writes)
//! - [`ticket`] - ledger query engine (listing, atomic creates, summary)
//! - [`catalog`] - units / categories / cuts reference data
//! - [`user`] / [`client`] - light reference entities
//!
//! ## Row Mapping
//! Decimals travel through SQLite as TEXT so they stay exact; the helpers
//! below parse them back out and tag corruption with the owning
//! entity/column. Timestamps are bound as chrono values and decoded by
//! sqlx.

use rust_decimal::Decimal;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use tajo_core::Money;

pub mod catalog;
pub mod client;
pub mod product;
pub mod ticket;
pub mod user;

/// Generates a fresh entity id (UUID v4).
pub(crate) fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// Builds a case-insensitive substring LIKE pattern.
///
/// `%`, `_` and `\` in the term are escaped; every LIKE in this crate
/// pairs with `ESCAPE '\'`. Matching lowercases both sides.
pub(crate) fn like_pattern(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len() + 2);
    for c in term.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    format!("%{}%", escaped.to_lowercase())
}

/// Parses a stored decimal column.
pub(crate) fn parse_decimal(entity: &str, column: &str, raw: &str) -> DbResult<Decimal> {
    Decimal::from_str(raw).map_err(|e| DbError::CorruptRow {
        entity: entity.to_string(),
        column: column.to_string(),
        message: e.to_string(),
    })
}

/// Parses a stored money column.
pub(crate) fn parse_money(entity: &str, column: &str, raw: &str) -> DbResult<Money> {
    let amount = parse_decimal(entity, column, raw)?;
    Money::new(amount).map_err(|e| DbError::CorruptRow {
        entity: entity.to_string(),
        column: column.to_string(),
        message: e.to_string(),
    })
}

/// Parses an optional stored money column. NULL means "no price set".
pub(crate) fn parse_opt_money(
    entity: &str,
    column: &str,
    raw: Option<&str>,
) -> DbResult<Option<Money>> {
    raw.map(|s| parse_money(entity, column, s)).transpose()
}

/// The stored TEXT form of an optional money value. NULL for absent.
pub(crate) fn money_text(value: Option<Money>) -> Option<String> {
    value.map(|m| m.amount().to_string())
}
