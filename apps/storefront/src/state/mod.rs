//! # State Module
//!
//! Shared storefront state. Each piece is its own type so commands take
//! exactly what they touch and tests can build one piece over fakes.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    State Architecture                                   │
//! │                                                                         │
//! │  ┌──────────────┐  ┌──────────────┐  ┌──────────────┐  ┌────────────┐  │
//! │  │ SessionState │  │  CartStore   │  │  StockState  │  │ Checkout   │  │
//! │  │              │  │              │  │              │  │ Sequencer  │  │
//! │  │ RwLock<      │◄─┤ Mutex<Cart>  │◄─┤ RwLock<      │  │ Mutex<     │  │
//! │  │  Option<     │  │ + storage    │  │  Stock       │  │  Checkout  │  │
//! │  │  Session>>   │  │ + auth gate  │  │  Snapshot>   │  │  Machine>  │  │
//! │  └──────────────┘  └──────────────┘  └──────────────┘  └────────────┘  │
//! │                                                                         │
//! │  THREAD SAFETY:                                                        │
//! │  • CartStore: one writer at a time, persisted under the lock           │
//! │  • StockState: advisory levels, replaced wholesale on refresh          │
//! │  • CheckoutSequencer: lock released across delay and invoice call      │
//! │  • StorefrontConfig: read-only after initialization                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod cart;
mod checkout;
mod config;
mod session;
mod stock;

pub use cart::{AddOutcome, CartStore};
pub use checkout::{CheckoutOutcome, CheckoutSequencer, EMPTY_CART_MESSAGE, PAYMENT_FAILED_MESSAGE};
pub use config::{ConfigError, StorefrontConfig};
pub use session::SessionState;
pub use stock::{StockDecision, StockState};
