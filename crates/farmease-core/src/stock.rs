//! # Stock
//!
//! Advisory stock ceilings for the cart and the product page.
//!
//! A [`StockSnapshot`] is fetched in one batched lookup for the ids in the
//! cart each time the cart is shown. It is never re-verified at checkout,
//! so a quantity accepted here can still exceed what the backend holds by
//! the time the order is placed.
//!
//! ```rust
//! use farmease_core::stock::StockSnapshot;
//!
//! let snapshot: StockSnapshot = [("seeds".to_string(), 3)].into_iter().collect();
//! assert!(snapshot.check_quantity("seeds", 3).is_ok());
//! assert!(snapshot.check_quantity("seeds", 5).is_err());
//! // Unknown ids have no ceiling.
//! assert!(snapshot.check_quantity("unknown", 500).is_ok());
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};

// =============================================================================
// Stock Snapshot
// =============================================================================

/// Product id → available units, as last fetched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct StockSnapshot {
    levels: HashMap<String, i64>,
}

impl StockSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_levels(levels: HashMap<String, i64>) -> Self {
        StockSnapshot { levels }
    }

    pub fn insert(&mut self, id: impl Into<String>, available: i64) {
        self.levels.insert(id.into(), available);
    }

    /// Last known stock for `id`, if it was part of the lookup.
    pub fn available(&self, id: &str) -> Option<i64> {
        self.levels.get(id).copied()
    }

    /// Checks a requested quantity against the ceiling.
    ///
    /// Requests up to and including the stock level pass. An id the
    /// snapshot does not know about is not limited.
    pub fn check_quantity(&self, id: &str, requested: i64) -> CoreResult<()> {
        match self.available(id) {
            Some(available) if requested > available => Err(CoreError::StockCeilingReached {
                id: id.to_string(),
                available,
                requested,
            }),
            _ => Ok(()),
        }
    }

    /// Whether `quantity` already sits at (or above) the known ceiling, used
    /// to disable the "+" control.
    pub fn is_at_ceiling(&self, id: &str, quantity: u32) -> bool {
        self.available(id)
            .is_some_and(|available| i64::from(quantity) >= available)
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }
}

impl FromIterator<(String, i64)> for StockSnapshot {
    fn from_iter<I: IntoIterator<Item = (String, i64)>>(iter: I) -> Self {
        StockSnapshot {
            levels: iter.into_iter().collect(),
        }
    }
}

// =============================================================================
// Quantity Selector
// =============================================================================

/// The quantity picker on a product page.
///
/// Starts at one and stays within `1..=max_stock`. With no stock the
/// selector stays at one and cannot grow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct QuantitySelector {
    pub quantity: u32,
    pub max_stock: i64,
}

impl QuantitySelector {
    pub fn new(max_stock: i64) -> Self {
        QuantitySelector {
            quantity: 1,
            max_stock,
        }
    }

    /// Steps up by one if below stock. Returns whether the value changed.
    pub fn increment(&mut self) -> bool {
        if i64::from(self.quantity) < self.max_stock {
            self.quantity += 1;
            true
        } else {
            false
        }
    }

    /// Steps down by one if above one. Returns whether the value changed.
    pub fn decrement(&mut self) -> bool {
        if self.quantity > 1 {
            self.quantity -= 1;
            true
        } else {
            false
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
