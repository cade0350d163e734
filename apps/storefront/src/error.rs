//! # API Error Type
//!
//! Unified error type for storefront commands.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in the Storefront                         │
//! │                                                                         │
//! │  UI                          Rust Backend                               │
//! │  ──                          ────────────                               │
//! │                                                                         │
//! │  add_to_cart(...)                                                       │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │  Command Function                                                │  │
//! │  │  Result<T, ApiError>                                             │  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  Backend down? ──── ServiceError::Http(..) ────────┐            │  │
//! │  │         │                                          │            │  │
//! │  │         ▼                                          ▼            │  │
//! │  │  Rule broken? ──── CoreError::NotRentable ──── ApiError ───────►│  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  Success ──────────────────────────────────────────────────────►│  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! │                                                                         │
//! │  { "code": "NOT_FOUND", "message": "Product not found: t-1" }          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Internal causes (SQL text, HTTP bodies) are logged and replaced with a
//! generic message before they reach the UI.

use serde::Serialize;

use crate::services::ServiceError;
use crate::state::ConfigError;
use farmease_core::CoreError;
use farmease_store::DbError;

/// API error returned from commands.
///
/// ## Serialization
/// ```json
/// {
///   "code": "INSUFFICIENT_STOCK",
///   "message": "Only 3 items available in stock (requested 5)"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,
}

/// Error codes for API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Resource not found (404)
    NotFound,

    /// Input validation failed (400)
    ValidationError,

    /// Local database operation failed (500)
    DatabaseError,

    /// Business rule refused the request (422)
    BusinessLogic,

    /// Internal error (500)
    Internal,

    /// Cart operation failed
    CartError,

    /// Requested quantity above known stock
    InsufficientStock,

    /// Checkout transition refused
    CheckoutError,

    /// Hosted backend or e-mail API unreachable or misbehaving
    ServiceUnavailable,

    /// Credentials or session rejected
    Unauthorized,

    /// Signed in, but the account may not do this (403)
    Forbidden,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }

    /// Creates a not found error.
    pub fn not_found(resource: &str, id: &str) -> Self {
        ApiError::new(ErrorCode::NotFound, format!("{} not found: {}", resource, id))
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Internal, message)
    }
}

/// Converts database errors to API errors.
impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => ApiError::not_found(&entity, &id),
            DbError::UniqueViolation { field, value } => ApiError::new(
                ErrorCode::ValidationError,
                format!("{} '{}' already exists", field, value),
            ),
            DbError::ConstraintViolation(message) => {
                tracing::error!("Constraint violation: {}", message);
                ApiError::new(ErrorCode::ValidationError, "Invalid value")
            }
            DbError::ConnectionFailed(_) => {
                ApiError::new(ErrorCode::DatabaseError, "Database connection failed")
            }
            DbError::MigrationFailed(_) => {
                ApiError::new(ErrorCode::DatabaseError, "Database migration failed")
            }
            DbError::QueryFailed(e) => {
                // Log the actual error but return a generic message
                tracing::error!("Database query failed: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
            DbError::PoolExhausted => {
                ApiError::new(ErrorCode::DatabaseError, "Database pool exhausted")
            }
            DbError::Internal(e) => {
                tracing::error!("Internal database error: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
        }
    }
}

/// Converts core errors to API errors.
impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ProductNotFound(id) => ApiError::not_found("Product", &id),
            err @ (CoreError::StockCeilingReached { .. } | CoreError::OutOfStock { .. }) => {
                ApiError::new(ErrorCode::InsufficientStock, err.to_string())
            }
            err @ CoreError::QuantityTooLarge { .. } => ApiError::validation(err.to_string()),
            err @ (CoreError::NotRentable { .. } | CoreError::NotPurchasable { .. }) => {
                ApiError::new(ErrorCode::BusinessLogic, err.to_string())
            }
            err @ (CoreError::WrongAccountType { .. } | CoreError::NotListingOwner { .. }) => {
                ApiError::new(ErrorCode::Forbidden, err.to_string())
            }
            CoreError::EmptyCart => ApiError::new(ErrorCode::CartError, "Your cart is empty"),
            err @ CoreError::InvalidCheckoutTransition { .. } => {
                ApiError::new(ErrorCode::CheckoutError, err.to_string())
            }
            CoreError::CorruptSnapshot(reason) => {
                tracing::error!("Corrupt cart snapshot: {}", reason);
                ApiError::new(ErrorCode::CartError, "Saved cart could not be read")
            }
            CoreError::Rental(e) => ApiError::validation(e.to_string()),
            CoreError::Validation(e) => ApiError::validation(e.to_string()),
        }
    }
}

/// Converts collaborator errors to API errors.
impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Http(e) => {
                tracing::error!("HTTP request failed: {}", e);
                ApiError::new(ErrorCode::ServiceUnavailable, "Service is unavailable")
            }
            ServiceError::UnexpectedResponse { status, body } => {
                tracing::error!(status, body = %body, "Unexpected service response");
                ApiError::new(ErrorCode::ServiceUnavailable, "Service returned an error")
            }
            ServiceError::Unauthorized(reason) => ApiError::new(ErrorCode::Unauthorized, reason),
            ServiceError::NotConfigured(what) => ApiError::new(
                ErrorCode::ServiceUnavailable,
                format!("{} is not configured", what),
            ),
            ServiceError::Storage(e) => ApiError::from(e),
            ServiceError::Serialization(e) => {
                tracing::error!("Serialization failed: {}", e);
                ApiError::internal("Stored data could not be processed")
            }
            ServiceError::Validation(e) => ApiError::validation(e.to_string()),
        }
    }
}

impl From<ConfigError> for ApiError {
    fn from(err: ConfigError) -> Self {
        ApiError::internal(err.to_string())
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use farmease_core::{CheckoutState, RentalError, UserType};

    #[test]
    fn test_stock_ceiling_maps_to_insufficient_stock() {
        let err = ApiError::from(CoreError::StockCeilingReached {
            id: "mango".into(),
            available: 3,
            requested: 5,
        });
        assert_eq!(err.code, ErrorCode::InsufficientStock);
        assert!(err.message.contains("Only 3 items"));
    }

    #[test]
    fn test_rental_errors_are_validation() {
        let d = NaiveDate::from_ymd_opt(2024, 1, 3).unwrap();
        let err = ApiError::from(CoreError::from(RentalError::EndBeforeStart {
            from: d,
            to: d.pred_opt().unwrap(),
        }));
        assert_eq!(err.code, ErrorCode::ValidationError);
    }

    #[test]
    fn test_internal_details_are_hidden() {
        let err = ApiError::from(DbError::QueryFailed("syntax error near SELEC".into()));
        assert_eq!(err.message, "Database operation failed");

        let err = ApiError::from(ServiceError::UnexpectedResponse {
            status: 500,
            body: "stack trace".into(),
        });
        assert_eq!(err.code, ErrorCode::ServiceUnavailable);
        assert!(!err.message.contains("stack trace"));
    }

    #[test]
    fn test_account_rules_map_to_forbidden() {
        let err = ApiError::from(CoreError::WrongAccountType {
            required: UserType::Buyer,
            action: "book rentals",
        });
        assert_eq!(err.code, ErrorCode::Forbidden);
        assert_eq!(err.message, "Only buyer accounts can book rentals");

        let err = ApiError::from(CoreError::NotListingOwner { id: "p-1".into() });
        assert_eq!(err.code, ErrorCode::Forbidden);

        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["code"], "FORBIDDEN");
    }

    #[test]
    fn test_sold_out_rental_maps_to_insufficient_stock() {
        let err = ApiError::from(CoreError::OutOfStock { id: "mini-tractor".into() });
        assert_eq!(err.code, ErrorCode::InsufficientStock);
    }

    #[test]
    fn test_checkout_transition() {
        let err = ApiError::from(CoreError::InvalidCheckoutTransition {
            from: CheckoutState::Processing,
            action: "begin checkout",
        });
        assert_eq!(err.code, ErrorCode::CheckoutError);
    }

    #[test]
    fn test_serialized_shape() {
        let json = serde_json::to_value(ApiError::not_found("Product", "t-1")).unwrap();
        assert_eq!(json["code"], "NOT_FOUND");
        assert_eq!(json["message"], "Product not found: t-1");
    }
}
