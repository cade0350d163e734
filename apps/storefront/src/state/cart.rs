//! # Cart Store
//!
//! The shared cart. One explicitly constructed store is handed to every
//! command through [`crate::AppContext`].
//!
//! ## Persistence
//! Every mutation rewrites the whole snapshot under the cart key while the
//! cart lock is still held, so the stored snapshot always matches a state
//! the cart actually passed through.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart Store Operations                                │
//! │                                                                         │
//! │  UI Action             CartStore              Cart + Storage           │
//! │  ─────────             ─────────              ──────────────           │
//! │                                                                         │
//! │  Add to cart ─────────► add_item() ──────────► auth gate, merge, save  │
//! │                                                                         │
//! │  Change quantity ─────► update_quantity() ───► set / remove, save      │
//! │                                                                         │
//! │  Remove ──────────────► remove_item() ───────► remove, save            │
//! │                                                                         │
//! │  Checkout success ────► clear() ─────────────► empty, save             │
//! │                                                                         │
//! │  View cart ───────────► with_cart() ─────────► (read only)             │
//! │                                                                         │
//! │  NOTE: persistence failures are logged, never returned. The in-memory  │
//! │        cart stays authoritative for this process.                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use crate::services::{AuthService, ClientStorage, ServiceResult};
use farmease_core::{Cart, CartEvent, CartTotals, CoreResult, LineItem, Money, QuantityChange};

/// What an add request did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum AddOutcome {
    Added,
    QuantityUpdated { quantity: u32 },
    Replaced,
    /// No session: nothing changed, the UI should send the user to login.
    LoginRequired,
}

impl From<CartEvent> for AddOutcome {
    fn from(event: CartEvent) -> Self {
        match event {
            CartEvent::Added => AddOutcome::Added,
            CartEvent::QuantityUpdated { quantity } => AddOutcome::QuantityUpdated { quantity },
            CartEvent::Replaced => AddOutcome::Replaced,
        }
    }
}

pub struct CartStore {
    cart: Mutex<Cart>,
    storage: Arc<dyn ClientStorage>,
    auth: Arc<dyn AuthService>,
    key: String,
}

impl CartStore {
    /// Restores the cart from storage.
    ///
    /// A corrupt snapshot is discarded and the cart starts empty. Only a
    /// failing storage backend is an error.
    pub async fn load(
        storage: Arc<dyn ClientStorage>,
        auth: Arc<dyn AuthService>,
        key: impl Into<String>,
    ) -> ServiceResult<Self> {
        let key = key.into();

        let cart = match storage.get(&key).await? {
            None => Cart::new(),
            Some(raw) => match Cart::from_snapshot(&raw) {
                Ok(cart) => {
                    debug!(lines = cart.len(), "Restored cart");
                    cart
                }
                Err(e) => {
                    warn!(error = %e, "Discarding corrupt cart snapshot");
                    storage.remove(&key).await?;
                    Cart::new()
                }
            },
        };

        Ok(CartStore {
            cart: Mutex::new(cart),
            storage,
            auth,
            key,
        })
    }

    /// Executes a function with read access to the cart.
    pub async fn with_cart<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&Cart) -> R,
    {
        let cart = self.cart.lock().await;
        f(&cart)
    }

    /// Applies `f` and persists the result before releasing the lock.
    async fn mutate<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut Cart) -> R,
    {
        let mut cart = self.cart.lock().await;
        let result = f(&mut cart);
        self.persist(&cart).await;
        result
    }

    async fn persist(&self, cart: &Cart) {
        let snapshot = match cart.to_snapshot() {
            Ok(snapshot) => snapshot,
            Err(e) => {
                error!(error = %e, "Failed to encode cart snapshot");
                return;
            }
        };

        if let Err(e) = self.storage.set(&self.key, &snapshot).await {
            error!(error = %e, "Failed to persist cart");
        }
    }

    // =========================================================================
    // Operations
    // =========================================================================

    /// Adds a line, merging quantities for a known id. Refused without a
    /// session.
    pub async fn add_item(&self, item: LineItem) -> CoreResult<AddOutcome> {
        if !self.auth.is_authenticated().await {
            info!(id = %item.id(), "Add to cart refused: not signed in");
            return Ok(AddOutcome::LoginRequired);
        }

        let mut cart = self.cart.lock().await;
        let event = cart.add_item(item)?;
        self.persist(&cart).await;
        Ok(event.into())
    }

    /// Removes the line with `id`. Absent ids are a no-op.
    pub async fn remove_item(&self, id: &str) -> bool {
        self.mutate(|cart| cart.remove_item(id)).await
    }

    /// Sets the quantity of `id`; zero or less removes the line. No stock
    /// ceiling is applied here.
    pub async fn update_quantity(&self, id: &str, quantity: i64) -> CoreResult<QuantityChange> {
        self.mutate(|cart| cart.update_quantity(id, quantity)).await
    }

    pub async fn clear(&self) {
        self.mutate(Cart::clear).await
    }

    /// Sum over lines; unparseable prices count as zero.
    pub async fn total(&self) -> Money {
        self.with_cart(Cart::total).await
    }

    pub async fn total_item_count(&self) -> u64 {
        self.with_cart(Cart::total_item_count).await
    }

    /// Totals, logging any line whose price could not be parsed.
    pub async fn totals(&self) -> CartTotals {
        let totals = self.with_cart(Cart::totals).await;
        if !totals.unpriced.is_empty() {
            warn!(ids = ?totals.unpriced, "Cart lines with unparseable prices count as zero");
        }
        totals
    }

    pub async fn snapshot(&self) -> Cart {
        self.with_cart(Cart::clone).await
    }

    pub async fn ids(&self) -> Vec<String> {
        self.with_cart(Cart::ids).await
    }

    pub async fn is_empty(&self) -> bool {
        self.with_cart(Cart::is_empty).await
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
