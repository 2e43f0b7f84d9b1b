//! # Query Primitives
//!
//! Pagination, sorting and relation-inclusion types shared by the catalog
//! and ledger listing engines.
//!
//! ## Pagination Contract
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  page is 1-indexed, skip = (page - 1) × limit                           │
//! │                                                                         │
//! │  total = 25, limit = 10                                                 │
//! │    page 1 → rows 1..10    hasPrev = false  hasNext = true              │
//! │    page 2 → rows 11..20   hasPrev = true   hasNext = true              │
//! │    page 3 → rows 21..25   hasPrev = true   hasNext = false             │
//! │                                                                         │
//! │  totalPages = ceil(total / limit), and 0 when limit is 0: the          │
//! │  degenerate limit never divides.                                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Raw `page`/`limit` text coerces leniently (bad input falls back to the
//! defaults, like the HTTP layer always has); sort fields, order and
//! include tokens are validated strictly and fail with
//! [`CoreError::InvalidQuery`].

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use ts_rs::TS;

use crate::error::CoreError;

// =============================================================================
// Page Parameters
// =============================================================================

/// Caller-requested page window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageParams {
    /// 1-indexed page number.
    pub page: u32,
    /// Rows per page.
    pub limit: u32,
}

impl PageParams {
    pub const DEFAULT_PAGE: u32 = 1;
    pub const DEFAULT_LIMIT: u32 = 10;

    pub fn new(page: u32, limit: u32) -> Self {
        PageParams { page, limit }
    }

    /// Coerces raw query-string text.
    ///
    /// Missing, non-numeric or below-1 values fall back to the defaults
    /// (page 1, limit 10) rather than failing; listing endpoints have
    /// always been forgiving about this.
    pub fn from_raw(page: Option<&str>, limit: Option<&str>) -> Self {
        fn coerce(raw: Option<&str>, default: u32) -> u32 {
            raw.and_then(|s| s.trim().parse::<u32>().ok())
                .filter(|&n| n >= 1)
                .unwrap_or(default)
        }

        PageParams {
            page: coerce(page, Self::DEFAULT_PAGE),
            limit: coerce(limit, Self::DEFAULT_LIMIT),
        }
    }

    /// Rows to skip before this page starts.
    pub fn offset(&self) -> u32 {
        (self.page.saturating_sub(1)) * self.limit
    }

    /// Rejects windows a listing cannot serve.
    ///
    /// `from_raw` never produces these, but typed callers can construct
    /// them directly.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.page < 1 {
            return Err(CoreError::InvalidQuery {
                reason: "page must be at least 1".to_string(),
            });
        }
        if self.limit < 1 {
            return Err(CoreError::InvalidQuery {
                reason: "limit must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

impl Default for PageParams {
    fn default() -> Self {
        PageParams {
            page: Self::DEFAULT_PAGE,
            limit: Self::DEFAULT_LIMIT,
        }
    }
}

// =============================================================================
// Pagination Metadata
// =============================================================================

/// The pagination block returned alongside every listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
    pub total: u64,
    pub total_pages: u64,
    pub has_next: bool,
    pub has_prev: bool,
}

impl Pagination {
    /// Derives the metadata for a window over `total` rows.
    pub fn new(params: PageParams, total: u64) -> Self {
        let total_pages = if params.limit == 0 {
            0
        } else {
            total.div_ceil(u64::from(params.limit))
        };

        Pagination {
            page: params.page,
            limit: params.limit,
            total,
            total_pages,
            has_next: u64::from(params.page) < total_pages,
            has_prev: params.page > 1,
        }
    }
}

/// One page of listing results.
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export)]
pub struct Page<T> {
    pub data: Vec<T>,
    pub pagination: Pagination,
}

// =============================================================================
// Sorting
// =============================================================================

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

impl FromStr for SortOrder {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            other => Err(CoreError::InvalidQuery {
                reason: format!("unknown sort order {other:?} (expected asc or desc)"),
            }),
        }
    }
}

/// Sortable fields of the product listing. Defaults to name, ascending.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub enum ProductSortBy {
    CreatedAt,
    UpdatedAt,
    #[default]
    Name,
    IsActive,
}

impl ProductSortBy {
    /// Catalog listings read naturally in alphabetical order.
    pub fn default_order(&self) -> SortOrder {
        SortOrder::Asc
    }
}

impl FromStr for ProductSortBy {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "createdAt" => Ok(ProductSortBy::CreatedAt),
            "updatedAt" => Ok(ProductSortBy::UpdatedAt),
            "name" => Ok(ProductSortBy::Name),
            "isActive" => Ok(ProductSortBy::IsActive),
            other => Err(CoreError::InvalidQuery {
                reason: format!("unknown product sort field {other:?}"),
            }),
        }
    }
}

/// Sortable fields of the ticket listing. Defaults to date, descending:
/// the ledger reads most-recent-first, the opposite of the catalog.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub enum TicketSortBy {
    #[default]
    Date,
    CreatedAt,
    UpdatedAt,
    Total,
}

impl TicketSortBy {
    pub fn default_order(&self) -> SortOrder {
        SortOrder::Desc
    }
}

impl FromStr for TicketSortBy {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "date" => Ok(TicketSortBy::Date),
            "createdAt" => Ok(TicketSortBy::CreatedAt),
            "updatedAt" => Ok(TicketSortBy::UpdatedAt),
            "total" => Ok(TicketSortBy::Total),
            other => Err(CoreError::InvalidQuery {
                reason: format!("unknown ticket sort field {other:?}"),
            }),
        }
    }
}

// =============================================================================
// Include Spec
// =============================================================================

/// Which optional relations a product listing should attach.
///
/// Parsed once at the boundary from the comma-separated `include`
/// parameter; the repositories only ever see this struct. Unknown tokens
/// are rejected rather than silently dropped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IncludeSpec {
    /// Attach the category-id set.
    pub categories: bool,
    /// Attach cut id/name and override prices.
    pub cuts: bool,
}

impl IncludeSpec {
    /// Nothing attached.
    pub const NONE: IncludeSpec = IncludeSpec {
        categories: false,
        cuts: false,
    };

    /// Parses `"categories,cuts"`-style input. Blank input means none;
    /// empty tokens are skipped; anything else unknown fails.
    pub fn parse(raw: &str) -> Result<Self, CoreError> {
        let mut spec = IncludeSpec::NONE;

        for token in raw.split(',').map(str::trim).filter(|t| !t.is_empty()) {
            match token {
                "categories" => spec.categories = true,
                "cuts" => spec.cuts = true,
                other => {
                    return Err(CoreError::InvalidQuery {
                        reason: format!("unknown include option {other:?}"),
                    })
                }
            }
        }

        Ok(spec)
    }

    pub fn is_none(&self) -> bool {
        !self.categories && !self.cuts
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_params_coercion() {
        let p = PageParams::from_raw(Some("3"), Some("25"));
        assert_eq!(p, PageParams::new(3, 25));

        // Missing, junk and below-1 input all fall back to defaults
        assert_eq!(PageParams::from_raw(None, None), PageParams::new(1, 10));
        assert_eq!(
            PageParams::from_raw(Some("abc"), Some("-2")),
            PageParams::new(1, 10)
        );
        assert_eq!(
            PageParams::from_raw(Some("0"), Some("0")),
            PageParams::new(1, 10)
        );
    }

    #[test]
    fn test_offset() {
        assert_eq!(PageParams::new(1, 10).offset(), 0);
        assert_eq!(PageParams::new(3, 10).offset(), 20);
    }

    #[test]
    fn test_pagination_contract() {
        // total = 25, limit = 10
        let p1 = Pagination::new(PageParams::new(1, 10), 25);
        assert_eq!(p1.total_pages, 3);
        assert!(p1.has_next);
        assert!(!p1.has_prev);

        let p3 = Pagination::new(PageParams::new(3, 10), 25);
        assert!(!p3.has_next);
        assert!(p3.has_prev);
    }

    #[test]
    fn test_pagination_exact_fit_and_empty() {
        let exact = Pagination::new(PageParams::new(2, 10), 20);
        assert_eq!(exact.total_pages, 2);
        assert!(!exact.has_next);

        let empty = Pagination::new(PageParams::new(1, 10), 0);
        assert_eq!(empty.total_pages, 0);
        assert!(!empty.has_next);
        assert!(!empty.has_prev);
    }

    #[test]
    fn test_zero_limit_never_divides() {
        let degenerate = Pagination::new(PageParams::new(1, 0), 25);
        assert_eq!(degenerate.total_pages, 0);

        assert!(PageParams::new(1, 0).validate().is_err());
        assert!(PageParams::new(1, 10).validate().is_ok());
    }

    #[test]
    fn test_pagination_wire_names() {
        let json = serde_json::to_value(Pagination::new(PageParams::new(1, 10), 25)).unwrap();
        assert_eq!(json["totalPages"], serde_json::json!(3));
        assert_eq!(json["hasNext"], serde_json::json!(true));
        assert_eq!(json["hasPrev"], serde_json::json!(false));
    }

    #[test]
    fn test_sort_parsing() {
        assert_eq!(
            "createdAt".parse::<ProductSortBy>().unwrap(),
            ProductSortBy::CreatedAt
        );
        assert!("price".parse::<ProductSortBy>().is_err());

        assert_eq!("total".parse::<TicketSortBy>().unwrap(), TicketSortBy::Total);
        assert!("ticket".parse::<TicketSortBy>().is_err());

        assert_eq!("desc".parse::<SortOrder>().unwrap(), SortOrder::Desc);
        assert!("up".parse::<SortOrder>().is_err());
    }

    #[test]
    fn test_sort_defaults_differ_by_engine() {
        assert_eq!(ProductSortBy::default(), ProductSortBy::Name);
        assert_eq!(ProductSortBy::default().default_order(), SortOrder::Asc);

        assert_eq!(TicketSortBy::default(), TicketSortBy::Date);
        assert_eq!(TicketSortBy::default().default_order(), SortOrder::Desc);
    }

    #[test]
    fn test_include_spec_parse() {
        assert_eq!(IncludeSpec::parse("").unwrap(), IncludeSpec::NONE);
        assert_eq!(
            IncludeSpec::parse("categories").unwrap(),
            IncludeSpec {
                categories: true,
                cuts: false
            }
        );
        assert_eq!(
            IncludeSpec::parse(" cuts , categories ").unwrap(),
            IncludeSpec {
                categories: true,
                cuts: true
            }
        );
        // Empty tokens are harmless
        assert_eq!(
            IncludeSpec::parse("cuts,").unwrap(),
            IncludeSpec {
                categories: false,
                cuts: true
            }
        );
        // Unknown tokens are not
        assert!(IncludeSpec::parse("categories,images").is_err());
    }
}
