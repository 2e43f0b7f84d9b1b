//! # Daily Summary
//!
//! The daily sales-summary aggregation: pure functions over tickets the
//! storage layer has already loaded.
//!
//! ## Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Daily Aggregation Pipeline                           │
//! │                                                                         │
//! │  "2026-08-06" ──► resolve_day ──► [00:00:00.000 .. 23:59:59.999]       │
//! │                                          │                              │
//! │                     tajo-db loads tickets in window                     │
//! │                                          │                              │
//! │                                          ▼                              │
//! │  daily_summary:                                                        │
//! │    totalSales   = Σ ticket.total          (exact decimal)              │
//! │    totalTickets = count                                                │
//! │    items        = group by (productId, cutId|"null", unit)             │
//! │                   Σ quantity, Σ subtotal per group                     │
//! │                   sorted by totalAmount, descending                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Grouping is by ids, not display names: two products can share a name,
//! and a missing cut is its own group. Display names are captured from the
//! first item seen in each group and are not re-validated against renames.

use std::collections::HashMap;

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, SecondsFormat, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::{SaleUnit, TicketWithItems};

// =============================================================================
// Day Window
// =============================================================================

/// A resolved calendar-day window in UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayWindow {
    /// The instant the caller asked about.
    pub target: DateTime<Utc>,
    /// 00:00:00.000 of the target day.
    pub start: DateTime<Utc>,
    /// 23:59:59.999 of the target day.
    pub end: DateTime<Utc>,
}

/// Resolves the target day for a summary.
///
/// Accepts an RFC 3339 timestamp or a plain `YYYY-MM-DD` date; `None`
/// means `now`. Anything else fails with [`CoreError::InvalidDate`]:
/// an unreadable date must not silently mean "today".
pub fn resolve_day(input: Option<&str>, now: DateTime<Utc>) -> CoreResult<DayWindow> {
    let target = match input.map(str::trim).filter(|s| !s.is_empty()) {
        None => now,
        Some(raw) => parse_date_input(raw)?,
    };

    let start = target.date_naive().and_time(NaiveTime::MIN).and_utc();
    let end = start + Duration::days(1) - Duration::milliseconds(1);

    Ok(DayWindow { target, start, end })
}

/// Parses a caller-supplied date string.
///
/// Shared by the summary and the ticket range filters, so both reject
/// garbage the same way.
pub fn parse_date_input(raw: &str) -> CoreResult<DateTime<Utc>> {
    let raw = raw.trim();

    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(ts.with_timezone(&Utc));
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Ok(date.and_time(NaiveTime::MIN).and_utc());
    }

    Err(CoreError::InvalidDate {
        input: raw.to_string(),
    })
}

// =============================================================================
// Summary Types
// =============================================================================

/// One ranked row of the daily summary.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct SummaryLine {
    pub product_name: String,
    pub cut_name: Option<String>,
    #[ts(as = "String")]
    pub quantity: Decimal,
    pub unit: SaleUnit,
    pub total_amount: Money,
}

/// The daily sales summary.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct DailySummary {
    /// RFC 3339 form of the resolved target instant.
    pub date: String,
    pub total_sales: Money,
    pub total_tickets: u64,
    pub items: Vec<SummaryLine>,
}

// =============================================================================
// Aggregation
// =============================================================================

/// Composite grouping key. A missing cut is its own group ("null"), never
/// merged with any cut-bearing row of the same product.
type GroupKey = (String, String, SaleUnit);

fn group_key(product_id: &str, cut_id: Option<&str>, unit: SaleUnit) -> GroupKey {
    (
        product_id.to_string(),
        cut_id.unwrap_or("null").to_string(),
        unit,
    )
}

/// Aggregates one day of tickets into the summary shape.
///
/// `tickets` is the full set for the window; totals reconcile exactly with
/// their constituent tickets (decimal equality, no floating approximation).
/// Ties in the ranking keep first-seen order.
pub fn daily_summary(window: &DayWindow, tickets: &[TicketWithItems]) -> DailySummary {
    let total_sales: Money = tickets.iter().map(|t| t.ticket.total).sum();
    let total_tickets = tickets.len() as u64;

    // First-seen order is kept in the Vec; the map only finds the slot.
    let mut slots: HashMap<GroupKey, usize> = HashMap::new();
    let mut lines: Vec<SummaryLine> = Vec::new();

    for ticket in tickets {
        for detail in &ticket.items {
            let item = &detail.item;
            let key = group_key(&item.product_id, item.cut_id.as_deref(), item.unit);

            match slots.get(&key) {
                Some(&idx) => {
                    let line = &mut lines[idx];
                    line.quantity += item.quantity;
                    line.total_amount += item.subtotal;
                }
                None => {
                    slots.insert(key, lines.len());
                    lines.push(SummaryLine {
                        product_name: detail.product_name.clone(),
                        cut_name: detail.cut_name.clone(),
                        quantity: item.quantity,
                        unit: item.unit,
                        total_amount: item.subtotal,
                    });
                }
            }
        }
    }

    // Stable sort: equal amounts stay in first-seen order
    lines.sort_by(|a, b| b.total_amount.cmp(&a.total_amount));

    DailySummary {
        date: window.target.to_rfc3339_opts(SecondsFormat::Millis, true),
        total_sales,
        total_tickets,
        items: lines,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Ticket, TicketItem, TicketItemDetail};
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    fn money(d: Decimal) -> Money {
        Money::new(d).unwrap()
    }

    fn ticket(id: &str, total: Decimal, items: Vec<TicketItemDetail>) -> TicketWithItems {
        let now = Utc.with_ymd_and_hms(2026, 8, 6, 12, 0, 0).unwrap();
        TicketWithItems {
            ticket: Ticket {
                id: id.to_string(),
                date: now,
                total: money(total),
                payment_type: "cash".to_string(),
                user_id: None,
                client_id: None,
                printed: false,
                created_at: now,
                updated_at: now,
            },
            items,
        }
    }

    fn item(
        product_id: &str,
        product_name: &str,
        cut: Option<(&str, &str)>,
        quantity: Decimal,
        subtotal: Decimal,
        unit: SaleUnit,
    ) -> TicketItemDetail {
        TicketItemDetail {
            item: TicketItem {
                id: format!("item-{product_id}-{quantity}"),
                ticket_id: "t".to_string(),
                product_id: product_id.to_string(),
                cut_id: cut.map(|(id, _)| id.to_string()),
                quantity,
                unit_price: money(dec!(60)),
                subtotal: money(subtotal),
                unit,
            },
            product_name: product_name.to_string(),
            cut_name: cut.map(|(_, name)| name.to_string()),
        }
    }

    fn window() -> DayWindow {
        resolve_day(Some("2026-08-06"), Utc::now()).unwrap()
    }

    #[test]
    fn test_resolve_day_window_bounds() {
        let w = resolve_day(Some("2026-08-06T15:30:00Z"), Utc::now()).unwrap();
        assert_eq!(
            w.start,
            Utc.with_ymd_and_hms(2026, 8, 6, 0, 0, 0).unwrap()
        );
        assert_eq!(
            w.end,
            Utc.with_ymd_and_hms(2026, 8, 6, 23, 59, 59).unwrap()
                + Duration::milliseconds(999)
        );
    }

    #[test]
    fn test_resolve_day_defaults_to_now() {
        let now = Utc.with_ymd_and_hms(2026, 8, 6, 9, 15, 0).unwrap();
        let w = resolve_day(None, now).unwrap();
        assert_eq!(w.target, now);
        // Blank input behaves like missing input
        let w = resolve_day(Some("  "), now).unwrap();
        assert_eq!(w.target, now);
    }

    #[test]
    fn test_resolve_day_rejects_garbage() {
        assert!(matches!(
            resolve_day(Some("mañana"), Utc::now()),
            Err(CoreError::InvalidDate { .. })
        ));
        assert!(resolve_day(Some("06/08/2026"), Utc::now()).is_err());
    }

    #[test]
    fn test_same_key_merges_across_tickets() {
        // Two tickets, one item each, same product+cut+unit: 2.0 kg and 1.5 kg
        let cut = Some(("cut-1", "Por Mitad"));
        let tickets = vec![
            ticket(
                "t1",
                dec!(120),
                vec![item("p1", "Menudo National", cut, dec!(2.0), dec!(120), SaleUnit::Kg)],
            ),
            ticket(
                "t2",
                dec!(90),
                vec![item("p1", "Menudo National", cut, dec!(1.5), dec!(90), SaleUnit::Kg)],
            ),
        ];

        let summary = daily_summary(&window(), &tickets);

        assert_eq!(summary.total_tickets, 2);
        assert_eq!(summary.total_sales, money(dec!(210)));
        assert_eq!(summary.items.len(), 1);
        assert_eq!(summary.items[0].quantity, dec!(3.5));
        assert_eq!(summary.items[0].total_amount, money(dec!(210)));
        assert_eq!(summary.items[0].cut_name.as_deref(), Some("Por Mitad"));
    }

    #[test]
    fn test_null_cut_never_merges_with_cut() {
        let tickets = vec![ticket(
            "t1",
            dec!(150),
            vec![
                item("p1", "Panza", None, dec!(1), dec!(50), SaleUnit::Kg),
                item("p1", "Panza", Some(("cut-1", "Rodajas")), dec!(1), dec!(100), SaleUnit::Kg),
            ],
        )];

        let summary = daily_summary(&window(), &tickets);
        assert_eq!(summary.items.len(), 2);
    }

    #[test]
    fn test_same_product_different_unit_stays_split() {
        let tickets = vec![ticket(
            "t1",
            dec!(110),
            vec![
                item("p1", "Pata", None, dec!(2), dec!(80), SaleUnit::Kg),
                item("p1", "Pata", None, dec!(1), dec!(30), SaleUnit::Piece),
            ],
        )];

        let summary = daily_summary(&window(), &tickets);
        assert_eq!(summary.items.len(), 2);
    }

    #[test]
    fn test_ranking_descends_by_amount() {
        let tickets = vec![ticket(
            "t1",
            dec!(180),
            vec![
                item("p1", "Libro", None, dec!(1), dec!(30), SaleUnit::Kg),
                item("p2", "Panza", None, dec!(1), dec!(100), SaleUnit::Kg),
                item("p3", "Sesos", None, dec!(1), dec!(50), SaleUnit::Kg),
            ],
        )];

        let summary = daily_summary(&window(), &tickets);
        let names: Vec<&str> = summary.items.iter().map(|l| l.product_name.as_str()).collect();
        assert_eq!(names, vec!["Panza", "Sesos", "Libro"]);
    }

    #[test]
    fn test_total_sales_is_decimal_exact() {
        // 0.1 + 0.2 style sums must come out exact
        let tickets = vec![
            ticket("t1", dec!(0.1), vec![]),
            ticket("t2", dec!(0.2), vec![]),
        ];
        let summary = daily_summary(&window(), &tickets);
        assert_eq!(summary.total_sales, money(dec!(0.3)));
    }

    #[test]
    fn test_empty_day() {
        let summary = daily_summary(&window(), &[]);
        assert_eq!(summary.total_tickets, 0);
        assert_eq!(summary.total_sales, Money::zero());
        assert!(summary.items.is_empty());
        assert!(summary.date.starts_with("2026-08-06T00:00:00"));
    }
}
