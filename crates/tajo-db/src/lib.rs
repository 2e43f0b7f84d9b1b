//! # tajo-db: Database Layer for Tajo POS
//!
//! This crate provides database access for the Tajo POS backend.
//! It uses SQLite for storage with sqlx for async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Tajo POS Data Flow                               │
//! │                                                                         │
//! │  HTTP adapter (list products / create ticket / daily summary)          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     tajo-db (THIS CRATE)                        │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │ (product.rs,  │    │  (embedded)  │  │   │
//! │  │   │               │    │  ticket.rs,   │    │              │  │   │
//! │  │   │ SqlitePool    │◄───│  catalog.rs,  │    │ 001_init.sql │  │   │
//! │  │   │ WAL + FK ON   │    │  user/client) │    │              │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite database file (decimals stored as exact TEXT)                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Repository implementations (product, ticket, etc.)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use tajo_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("path/to/tajo.db")).await?;
//!
//! let page = db
//!     .products()
//!     .list_active(IncludeSpec::NONE, PageParams::default(), None, None, None)
//!     .await?;
//! let summary = db.tickets().daily_summary(Some("2026-08-06")).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::catalog::CatalogRepository;
pub use repository::client::ClientRepository;
pub use repository::product::ProductRepository;
pub use repository::ticket::TicketRepository;
pub use repository::user::UserRepository;
