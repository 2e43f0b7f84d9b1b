//! # Error Types
//!
//! Domain-specific error types for tajo-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  tajo-core errors (this file)                                          │
//! │  ├── CoreError        - Malformed money, query or date input           │
//! │  └── ValidationError  - Business rule violations on DTOs               │
//! │                                                                         │
//! │  tajo-db errors (separate crate)                                       │
//! │  └── DbError          - NotFound, constraint and storage failures      │
//! │                                                                         │
//! │  HTTP adapter (out of scope)                                           │
//! │  └── maps NotFound→404, InvalidQuery/InvalidMonetaryValue→400          │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → DbError → adapter → client        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (field, id, raw input)
//! 3. Errors are enum variants, never String
//! 4. Nothing is logged-and-swallowed; every failure reaches the caller

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Failures produced while interpreting caller input.
///
/// These are raised before any storage work happens and translate to
/// client errors at the transport boundary.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A monetary amount was negative or not a finite number.
    #[error("invalid monetary value: {reason}")]
    InvalidMonetaryValue { reason: String },

    /// Malformed pagination, sort or include parameters.
    ///
    /// ## When This Occurs
    /// - `limit` of zero handed directly to a listing
    /// - an unrecognized `include` token ("categories,foo")
    /// - an unrecognized sort field or order
    #[error("invalid query: {reason}")]
    InvalidQuery { reason: String },

    /// A date string could not be parsed.
    ///
    /// The daily summary and the ticket range filters refuse to guess:
    /// an unreadable date fails loudly instead of silently meaning "today".
    #[error("invalid date: {input:?}")]
    InvalidDate { input: String },

    /// Validation error (wraps ValidationError).
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when a DTO doesn't meet business requirements.
/// Used for early validation before any storage work runs.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Value must be strictly positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Value is not in the allowed set.
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },

    /// A product carried both base prices at once.
    ///
    /// The base price is the default sale price; a product is priced per
    /// kilogram or per piece, never both.
    #[error("a product takes either pricePerKg or pricePerUnit, not both")]
    AmbiguousBasePrice,

    /// A product declared no base price and no priced cut either.
    #[error("a product without a base price needs at least one cut with an override price")]
    UnpricedProduct,

    /// A ticket arrived with no line items.
    #[error("a ticket must contain at least one item")]
    EmptyTicket,
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
