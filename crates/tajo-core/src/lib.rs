//! # tajo-core: Pure Business Logic for Tajo POS
//!
//! This crate is the **heart** of the Tajo POS backend. It contains the
//! pricing rules, the ledger aggregation and every domain type, as pure
//! functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Tajo POS Architecture                            │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                       HTTP Adapter (external)                   │   │
//! │  │   parses requests ──► typed DTOs ──► maps errors to statuses   │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ tajo-core (THIS CRATE) ★                        │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │  summary  │  │   query   │  │   │
//! │  │   │  Product  │  │   Money   │  │  daily    │  │ Pagination│  │   │
//! │  │   │  Ticket   │  │  decimal  │  │  rollup   │  │  Include  │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    tajo-db (Database Layer)                     │   │
//! │  │              SQLite queries, migrations, repositories           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, Cut, Ticket, TicketItem, ...)
//! - [`money`] - Exact-decimal monetary values (no floating point!)
//! - [`query`] - Pagination, sorting and relation-inclusion primitives
//! - [`summary`] - Daily sales-summary aggregation
//! - [`validation`] - Business rule validation
//! - [`image`] - Image-store collaborator seam
//! - [`error`] - Domain error types
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: every function is deterministic - same input = same output
//! 2. **No I/O**: database, network, file system access is FORBIDDEN here
//! 3. **Decimal Money**: all monetary values are exact decimals, end to end
//! 4. **Explicit Errors**: all errors are typed, never strings or panics
//!
//! ## Example Usage
//!
//! ```rust
//! use tajo_core::money::Money;
//! use rust_decimal::Decimal;
//!
//! // A price arriving as zero is stored as "no price set"
//! let stored = Money::from_input(Some(Decimal::ZERO)).unwrap();
//! assert_eq!(stored, None);
//!
//! // Decimal arithmetic is exact
//! let a = Money::new(Decimal::new(1, 1)).unwrap(); // 0.1
//! let b = Money::new(Decimal::new(2, 1)).unwrap(); // 0.2
//! assert_eq!((a + b).amount(), Decimal::new(3, 1)); // exactly 0.3
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod image;
pub mod money;
pub mod query;
pub mod summary;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use tajo_core::Money` instead of
// `use tajo_core::money::Money`

pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use query::{IncludeSpec, Page, PageParams, Pagination, ProductSortBy, SortOrder, TicketSortBy};
pub use summary::{daily_summary, resolve_day, DailySummary, DayWindow, SummaryLine};
pub use types::*;
