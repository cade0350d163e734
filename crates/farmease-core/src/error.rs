//! # Error Types
//!
//! Domain-specific error types for farmease-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  farmease-core errors (this file)                                      │
//! │  ├── CoreError        - Cart, stock and checkout rule violations       │
//! │  ├── RentalError      - Why a rental quote could not be produced       │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  farmease-store errors (separate crate)                                │
//! │  └── DbError          - SQLite operation failures                      │
//! │                                                                         │
//! │  storefront errors (in app)                                            │
//! │  ├── ServiceError     - Backend / e-mail / storage collaborator faults │
//! │  └── ApiError         - What the UI sees (serialized)                  │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → ApiError → UI notification        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::NaiveDate;
use thiserror::Error;

use crate::checkout::CheckoutState;
use crate::types::UserType;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
///
/// None of these are fatal for the storefront: each is translated into a
/// user-facing notification at the command boundary.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Product cannot be found in the catalog.
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// Requested quantity exceeds the last known stock level.
    ///
    /// ## User Workflow
    /// ```text
    /// Cart page: click "+" (qty 3 → 4)
    ///      │
    ///      ▼
    /// Known stock for item: 3
    ///      │
    ///      ▼
    /// StockCeilingReached { available: 3, requested: 4 }
    ///      │
    ///      ▼
    /// UI shows: "Maximum stock reached - Only 3 items available in stock."
    /// ```
    #[error("Only {available} items available in stock (requested {requested})")]
    StockCeilingReached {
        id: String,
        available: i64,
        requested: i64,
    },

    /// Nothing left to sell or rent.
    #[error("Product {id} is out of stock")]
    OutOfStock { id: String },

    /// Quantity cannot be represented (sum overflow or absurd input).
    #[error("Quantity {requested} is too large")]
    QuantityTooLarge { requested: i64 },

    /// A date-range booking was requested for a product that is not rental equipment.
    #[error("Product {id} cannot be rented")]
    NotRentable { id: String },

    /// A quantity purchase was requested for a product sold by date range or
    /// not sold through the cart at all.
    #[error("Product {id} ({category}) cannot be added to the cart by quantity")]
    NotPurchasable { id: String, category: String },

    /// The action belongs to the other side of the marketplace.
    #[error("Only {required} accounts can {action}")]
    WrongAccountType {
        required: UserType,
        action: &'static str,
    },

    /// A seller tried to change a listing that belongs to someone else.
    #[error("Product {id} is not one of your listings")]
    NotListingOwner { id: String },

    /// Checkout was requested with nothing in the cart.
    #[error("Cart is empty")]
    EmptyCart,

    /// The checkout state machine refused a transition.
    #[error("Cannot {action} while checkout is {from:?}")]
    InvalidCheckoutTransition {
        from: CheckoutState,
        action: &'static str,
    },

    /// A persisted cart snapshot could not be decoded.
    #[error("Persisted cart is corrupt: {0}")]
    CorruptSnapshot(String),

    /// Rental quote could not be produced.
    #[error(transparent)]
    Rental(#[from] RentalError),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Rental Error
// =============================================================================

/// Reasons a rental quote is not produced.
///
/// While any of these holds the UI must block adding the booking.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RentalError {
    /// One or both ends of the date range are missing.
    #[error("You must select both start and end dates for rental equipment")]
    MissingDates,

    /// The end date precedes the start date.
    #[error("Rental end date {to} is before start date {from}")]
    EndBeforeStart { from: NaiveDate, to: NaiveDate },

    /// The daily rate has no numeric content.
    #[error("Daily rate '{0}' is not a price")]
    UnparseableRate(String),

    /// Daily rate times days does not fit in money.
    #[error("Rental total for {days} days is too large")]
    TotalTooLarge { days: i64 },
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too short.
    #[error("{field} must be at least {min} characters")]
    TooShort { field: String, min: usize },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., unparseable price, malformed e-mail).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
