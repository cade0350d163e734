//! # farmease-core: Pure Business Logic for the FarmEase storefront
//!
//! This crate holds the pricing engine behind the storefront: the shopping
//! cart, rental date-range billing, stock ceilings and the checkout state
//! machine. Everything here is a pure function over owned data.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       FarmEase Architecture                             │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Web UI / farmease CLI                        │   │
//! │  │   Product page ──► Cart page ──► Payment dialog ──► Invoice    │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │          apps/storefront (commands, CartStore, Checkout)        │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │             ★ farmease-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌─────────┐ ┌─────────┐ ┌─────────┐ ┌─────────┐ ┌──────────┐ │   │
//! │  │   │  money  │ │  cart   │ │ rental  │ │  stock  │ │ checkout │ │   │
//! │  │   │ parse / │ │LineItem │ │  Quote  │ │ Snapshot│ │ Machine  │ │   │
//! │  │   │ format  │ │  Cart   │ │         │ │         │ │ OrderNo  │ │   │
//! │  │   └─────────┘ └─────────┘ └─────────┘ └─────────┘ └──────────┘ │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`money`] - Integer minor-unit money plus display price parsing/formatting
//! - [`types`] - Products, categories, rental dates, sessions, feedback, order summaries
//! - [`cart`] - Line items and the cart aggregate
//! - [`rental`] - Date-range rental quotes
//! - [`stock`] - Stock snapshots and ceiling checks
//! - [`checkout`] - Checkout state machine and order numbers
//! - [`listing`] - Seller product drafts and their rules
//! - [`validation`] - Input validation
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use farmease_core::cart::{Cart, LineItem, QuantityItem};
//! use farmease_core::money::format_price;
//!
//! let mut cart = Cart::new();
//! cart.add_item(LineItem::Quantity(QuantityItem {
//!     id: "tomatoes".to_string(),
//!     name: "Organic Tomatoes".to_string(),
//!     price: "₹45.50".to_string(),
//!     image: String::new(),
//!     category: "Organic Produce".to_string(),
//!     quantity: 2,
//! }))
//! .unwrap();
//!
//! assert_eq!(format_price(cart.total()), "₹91.00");
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod checkout;
pub mod error;
pub mod listing;
pub mod money;
pub mod rental;
pub mod stock;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use cart::{Cart, CartEvent, CartTotals, LineItem, QuantityChange, QuantityItem, RentalItem};
pub use checkout::{generate_order_number, CheckoutMachine, CheckoutState};
pub use error::{CoreError, CoreResult, RentalError, ValidationError};
pub use listing::ProductDraft;
pub use money::{display_price, format_price, line_total_display, parse_price, Money};
pub use rental::RentalQuote;
pub use stock::{QuantitySelector, StockSnapshot};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Currency glyph prefixed to every formatted price.
pub const CURRENCY_SYMBOL: &str = "₹";

/// Prefix of every generated order number (`ORD-xxxxxxxxx`).
pub const ORDER_NUMBER_PREFIX: &str = "ORD-";

/// Number of random alphanumeric characters after the order prefix.
pub const ORDER_NUMBER_LEN: usize = 9;
