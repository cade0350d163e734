//! # Money Module
//!
//! Provides the `Money` type and the display-price utilities.
//!
//! ## Display Prices vs. Money
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  The backend stores prices as DISPLAY STRINGS: "₹45.99", "120", "45"   │
//! │                                                                         │
//! │  parse_price("₹45.99")  ──►  Money(4599)   (integer paise)             │
//! │                                  │                                      │
//! │                                  ▼                                      │
//! │                     all arithmetic happens here                        │
//! │                                  │                                      │
//! │                                  ▼                                      │
//! │  format_price(Money(9198))  ──►  "₹91.98"                              │
//! │                                                                         │
//! │  Strings never take part in arithmetic; floats never appear at all.   │
//! │  Every operation is checked: an overflow yields None, never a wrap.    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use farmease_core::money::{format_price, parse_price, Money};
//!
//! let price = parse_price("₹49.50").unwrap();
//! assert_eq!(price, Money::from_minor(4950));
//! assert_eq!(format_price(price.checked_mul(2).unwrap()), "₹99.00");
//! assert!(parse_price("free").is_none());
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

use crate::CURRENCY_SYMBOL;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in the smallest currency unit (paise).
///
/// ## Design Decisions
/// - **i64 (signed)**: same width as the backend's integer columns
/// - **Single field tuple struct**: zero-cost abstraction over i64
/// - **No float constructor**: money only enters through [`parse_price`]
///   or [`Money::from_minor`]
/// - **No operator impls**: seller prices are arbitrary text, so every sum
///   and product goes through `checked_*` and the caller decides what an
///   overflow means
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize, TS,
)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from minor units.
    ///
    /// ```rust
    /// use farmease_core::money::Money;
    ///
    /// let price = Money::from_minor(1099); // ₹10.99
    /// assert_eq!(price.minor(), 1099);
    /// ```
    #[inline]
    pub const fn from_minor(minor: i64) -> Self {
        Money(minor)
    }

    /// Returns the value in minor units.
    #[inline]
    pub const fn minor(&self) -> i64 {
        self.0
    }

    /// Returns the major unit portion (rupees).
    #[inline]
    pub const fn major(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor unit portion, always 0-99.
    #[inline]
    pub const fn minor_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Multiplies money by a count (units, days). `None` on overflow.
    ///
    /// ```rust
    /// use farmease_core::money::Money;
    ///
    /// let daily_rate = Money::from_minor(10_000); // ₹100.00
    /// assert_eq!(daily_rate.checked_mul(3), Some(Money::from_minor(30_000)));
    /// assert_eq!(Money::from_minor(i64::MAX).checked_mul(2), None);
    /// ```
    #[inline]
    pub const fn checked_mul(self, qty: i64) -> Option<Self> {
        match self.0.checked_mul(qty) {
            Some(minor) => Some(Money(minor)),
            None => None,
        }
    }

    /// Adds two amounts. `None` on overflow.
    #[inline]
    pub const fn checked_add(self, other: Self) -> Option<Self> {
        match self.0.checked_add(other.0) {
            Some(minor) => Some(Money(minor)),
            None => None,
        }
    }
}

// =============================================================================
// Display Price Utilities
// =============================================================================

/// Parses a display price string into money.
///
/// ## Rules
/// 1. Every character that is not an ASCII digit or `.` is stripped
///    (currency glyphs, commas, spaces, letters).
/// 2. What remains is read as a decimal number prefix: `"1.2.3"` reads as
///    `1.2`, a leading `.` reads as `0.`.
/// 3. Fractions beyond two decimals round half-up to paise.
///
/// Returns `None` when no digits survive the stripping. Callers treat that
/// as "unparseable" and fall back to showing the original string.
///
/// ```rust
/// use farmease_core::money::{parse_price, Money};
///
/// assert_eq!(parse_price("₹1,299.5"), Some(Money::from_minor(129_950)));
/// assert_eq!(parse_price("45"), Some(Money::from_minor(4_500)));
/// assert_eq!(parse_price("0.125"), Some(Money::from_minor(13)));
/// assert_eq!(parse_price("₹"), None);
/// ```
pub fn parse_price(display: &str) -> Option<Money> {
    let stripped: String = display
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();

    let mut parts = stripped.splitn(3, '.');
    let whole = parts.next().unwrap_or_default();
    let fraction = parts.next().unwrap_or_default();

    if whole.is_empty() && fraction.is_empty() {
        return None;
    }

    let whole: i64 = if whole.is_empty() { 0 } else { whole.parse().ok()? };

    let mut digits = fraction.bytes().map(|b| i64::from(b - b'0'));
    let tenths = digits.next().unwrap_or(0);
    let hundredths = digits.next().unwrap_or(0);
    let round_up = digits.next().is_some_and(|d| d >= 5);

    let minor = whole
        .checked_mul(100)?
        .checked_add(tenths * 10 + hundredths)?
        .checked_add(i64::from(round_up))?;

    Some(Money(minor))
}

/// Formats money with the currency glyph and exactly two decimals.
///
/// ```rust
/// use farmease_core::money::{format_price, parse_price, Money};
///
/// assert_eq!(format_price(Money::from_minor(4950)), "₹49.50");
/// assert_eq!(parse_price(&format_price(Money::from_minor(4950))), Some(Money::from_minor(4950)));
/// ```
pub fn format_price(amount: Money) -> String {
    let sign = if amount.is_negative() { "-" } else { "" };
    format!(
        "{}{}{}.{:02}",
        sign,
        CURRENCY_SYMBOL,
        amount.major().abs(),
        amount.minor_part()
    )
}

/// Normalizes a display price for rendering.
///
/// Parseable prices are re-formatted; anything else is returned unchanged
/// so the UI never loses what the seller typed.
///
/// ```rust
/// use farmease_core::money::display_price;
///
/// assert_eq!(display_price("45.9"), "₹45.90");
/// assert_eq!(display_price("Ask seller"), "Ask seller");
/// ```
pub fn display_price(raw: &str) -> String {
    match parse_price(raw) {
        Some(amount) => format_price(amount),
        None => raw.to_string(),
    }
}

/// Formats `price × quantity` for a cart row, or `"N/A"` when the price is
/// unparseable or the product does not fit in money.
pub fn line_total_display(raw: &str, quantity: u32) -> String {
    match parse_price(raw).and_then(|amount| amount.checked_mul(i64::from(quantity))) {
        Some(total) => format_price(total),
        None => "N/A".to_string(),
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_price(*self))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
