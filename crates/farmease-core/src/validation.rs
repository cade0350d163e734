//! # Validation Module
//!
//! Input validation for storefront commands and catalog writes.
//!
//! ## Validation Layers
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Layer 1: Web UI                                                        │
//! │  ├── Date pickers, quantity buttons                                    │
//! │  └── Immediate user feedback                                           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Storefront command (Rust)                                    │
//! │  ├── Type validation (deserialization)                                 │
//! │  └── THIS MODULE: Business rule validation                             │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Storage (SQLite)                                             │
//! │  ├── NOT NULL constraints                                              │
//! │  └── CHECK (stock >= 0)                                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use farmease_core::validation::{validate_email, validate_quantity};
//!
//! assert_eq!(validate_quantity(5).unwrap(), 5);
//! assert!(validate_email("farmer@example.com").is_ok());
//! ```

use crate::error::ValidationError;
use crate::money::{parse_price, Money};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Longest product name the catalog accepts.
const MAX_NAME_LEN: usize = 200;

/// Shortest product name a seller may list.
const MIN_NAME_LEN: usize = 3;

/// Shortest listing description.
const MIN_DESCRIPTION_LEN: usize = 10;

/// Longest search query accepted.
const MAX_QUERY_LEN: usize = 100;

/// Longest feedback message accepted.
const MAX_FEEDBACK_LEN: usize = 2000;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a product name.
///
/// ```rust
/// use farmease_core::validation::validate_product_name;
///
/// assert!(validate_product_name("Mini Tractor").is_ok());
/// assert!(validate_product_name("   ").is_err());
/// ```
pub fn validate_product_name(name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "name".to_string(),
        });
    }

    if name.chars().count() > MAX_NAME_LEN {
        return Err(ValidationError::TooLong {
            field: "name".to_string(),
            max: MAX_NAME_LEN,
        });
    }

    Ok(())
}

/// Validates the name on a new or edited listing. Stricter than
/// [`validate_product_name`]: listings need at least three characters.
pub fn validate_listing_name(name: &str) -> ValidationResult<()> {
    validate_product_name(name)?;

    if name.trim().chars().count() < MIN_NAME_LEN {
        return Err(ValidationError::TooShort {
            field: "name".to_string(),
            min: MIN_NAME_LEN,
        });
    }

    Ok(())
}

/// Validates a listing description.
pub fn validate_description(description: &str) -> ValidationResult<()> {
    if description.trim().chars().count() < MIN_DESCRIPTION_LEN {
        return Err(ValidationError::TooShort {
            field: "description".to_string(),
            min: MIN_DESCRIPTION_LEN,
        });
    }

    Ok(())
}

/// Validates a product image link: an absolute `http` or `https` URL with
/// a host.
///
/// ```rust
/// use farmease_core::validation::validate_image_url;
///
/// assert!(validate_image_url("https://cdn.example.com/tractor.jpg").is_ok());
/// assert!(validate_image_url("tractor.jpg").is_err());
/// ```
pub fn validate_image_url(url: &str) -> ValidationResult<()> {
    let url = url.trim();

    if url.is_empty() {
        return Err(ValidationError::Required {
            field: "image".to_string(),
        });
    }

    let rest = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"));

    let valid = matches!(rest, Some(rest) if !rest.is_empty() && !rest.starts_with('/'))
        && !url.contains(char::is_whitespace);

    if !valid {
        return Err(ValidationError::InvalidFormat {
            field: "image".to_string(),
            reason: "must be an http(s) URL".to_string(),
        });
    }

    Ok(())
}

/// Validates feedback text and returns it trimmed.
pub fn validate_feedback_text(text: &str) -> ValidationResult<String> {
    let text = text.trim();

    if text.is_empty() {
        return Err(ValidationError::Required {
            field: "feedback".to_string(),
        });
    }

    if text.chars().count() > MAX_FEEDBACK_LEN {
        return Err(ValidationError::TooLong {
            field: "feedback".to_string(),
            max: MAX_FEEDBACK_LEN,
        });
    }

    Ok(text.to_string())
}

/// Validates a search query and returns it trimmed. Empty is allowed.
pub fn validate_search_query(query: &str) -> ValidationResult<String> {
    let query = query.trim();

    if query.chars().count() > MAX_QUERY_LEN {
        return Err(ValidationError::TooLong {
            field: "query".to_string(),
            max: MAX_QUERY_LEN,
        });
    }

    Ok(query.to_string())
}

/// Validates the display price a seller entered and returns its amount.
///
/// The catalog keeps the raw string, but a new listing must at least parse.
///
/// ```rust
/// use farmease_core::money::Money;
/// use farmease_core::validation::validate_display_price;
///
/// assert_eq!(validate_display_price("₹250").unwrap(), Money::from_minor(25_000));
/// assert!(validate_display_price("ask me").is_err());
/// ```
pub fn validate_display_price(raw: &str) -> ValidationResult<Money> {
    if raw.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "price".to_string(),
        });
    }

    parse_price(raw).ok_or_else(|| ValidationError::InvalidFormat {
        field: "price".to_string(),
        reason: "must contain a number".to_string(),
    })
}

/// Minimal shape check for an e-mail address: one `@` with text on both
/// sides and a dot in the domain.
pub fn validate_email(email: &str) -> ValidationResult<()> {
    let email = email.trim();

    if email.is_empty() {
        return Err(ValidationError::Required {
            field: "email".to_string(),
        });
    }

    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
        }
        None => false,
    };

    if !valid {
        return Err(ValidationError::InvalidFormat {
            field: "email".to_string(),
            reason: "must look like name@domain.tld".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a requested quantity and narrows it to the line-item width.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must fit in a `u32`
pub fn validate_quantity(qty: i64) -> ValidationResult<u32> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    u32::try_from(qty).map_err(|_| ValidationError::OutOfRange {
        field: "quantity".to_string(),
        min: 1,
        max: i64::from(u32::MAX),
    })
}

/// Validates a star rating.
pub fn validate_rating(rating: i64) -> ValidationResult<u8> {
    match u8::try_from(rating) {
        Ok(stars @ 1..=5) => Ok(stars),
        _ => Err(ValidationError::OutOfRange {
            field: "rating".to_string(),
            min: 1,
            max: 5,
        }),
    }
}

/// Validates a stock level. Zero (sold out) is allowed.
pub fn validate_stock(stock: i64) -> ValidationResult<()> {
    if stock < 0 {
        return Err(ValidationError::OutOfRange {
            field: "stock".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_product_name() {
        assert!(validate_product_name("Organic Spinach").is_ok());
        assert!(validate_product_name("").is_err());
        assert!(validate_product_name(&"a".repeat(201)).is_err());
        assert!(validate_product_name(&"a".repeat(200)).is_ok());
    }

    #[test]
    fn test_search_query_trims() {
        assert_eq!(validate_search_query("  tractor ").unwrap(), "tractor");
        assert_eq!(validate_search_query("").unwrap(), "");
        assert!(validate_search_query(&"x".repeat(101)).is_err());
    }

    #[test]
    fn test_quantity() {
        assert_eq!(validate_quantity(1).unwrap(), 1);
        assert!(matches!(
            validate_quantity(0),
            Err(ValidationError::MustBePositive { .. })
        ));
        assert!(validate_quantity(-4).is_err());
        assert!(matches!(
            validate_quantity(i64::from(u32::MAX) + 1),
            Err(ValidationError::OutOfRange { .. })
        ));
    }

    #[test]
    fn test_stock() {
        assert!(validate_stock(0).is_ok());
        assert!(validate_stock(12).is_ok());
        assert!(validate_stock(-1).is_err());
    }

    #[test]
    fn test_display_price() {
        assert_eq!(validate_display_price("45.99").unwrap(), Money::from_minor(4599));
        assert!(matches!(
            validate_display_price(""),
            Err(ValidationError::Required { .. })
        ));
        assert!(matches!(
            validate_display_price("free"),
            Err(ValidationError::InvalidFormat { .. })
        ));
    }

    #[test]
    fn test_listing_name_minimum() {
        assert!(validate_listing_name("Hoe").is_ok());
        assert!(matches!(
            validate_listing_name(" ab "),
            Err(ValidationError::TooShort { min: 3, .. })
        ));
        assert!(matches!(
            validate_listing_name(""),
            Err(ValidationError::Required { .. })
        ));
    }

    #[test]
    fn test_description_minimum() {
        assert!(validate_description("Ten chars!").is_ok());
        assert!(validate_description("   short   ").is_err());
    }

    #[test]
    fn test_image_url() {
        assert!(validate_image_url("http://img.example.com/a.png").is_ok());
        assert!(validate_image_url("").is_err());
        assert!(validate_image_url("ftp://img.example.com/a.png").is_err());
        assert!(validate_image_url("https://").is_err());
        assert!(validate_image_url("https:///a.png").is_err());
        assert!(validate_image_url("https://img.example.com/a b.png").is_err());
    }

    #[test]
    fn test_rating_bounds() {
        assert_eq!(validate_rating(1).unwrap(), 1);
        assert_eq!(validate_rating(5).unwrap(), 5);
        assert!(validate_rating(0).is_err());
        assert!(validate_rating(6).is_err());
        assert!(validate_rating(-3).is_err());
        assert!(validate_rating(300).is_err());
    }

    #[test]
    fn test_feedback_text() {
        assert_eq!(validate_feedback_text("  great  ").unwrap(), "great");
        assert!(matches!(
            validate_feedback_text(" \n "),
            Err(ValidationError::Required { .. })
        ));
        assert!(validate_feedback_text(&"x".repeat(2001)).is_err());
    }

    #[test]
    fn test_email() {
        assert!(validate_email("farmer@example.com").is_ok());
        assert!(validate_email("").is_err());
        assert!(validate_email("farmer").is_err());
        assert!(validate_email("@example.com").is_err());
        assert!(validate_email("farmer@localhost").is_err());
        assert!(validate_email("a@b@c.com").is_err());
    }
}
