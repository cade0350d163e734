//! # Stock Reconciliation
//!
//! Keeps the last stock levels fetched for the cart's products and checks
//! quantity changes against them before they reach the cart.
//!
//! The levels are advisory. They are fetched once per cart view and are
//! not re-checked at checkout, so the backend may no longer hold the stock
//! by the time an order is placed.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use super::CartStore;
use crate::services::DataService;
use farmease_core::{CoreError, CoreResult, QuantityChange, StockSnapshot};

/// Result of a stock-checked quantity change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum StockDecision {
    /// The change was handed to the cart.
    Applied { change: QuantityChange },
    /// Above the known stock; the cart was left alone.
    MaxStockReached { available: i64 },
}

pub struct StockState {
    snapshot: RwLock<StockSnapshot>,
    data: Arc<dyn DataService>,
}

impl StockState {
    pub fn new(data: Arc<dyn DataService>) -> Self {
        StockState {
            snapshot: RwLock::new(StockSnapshot::new()),
            data,
        }
    }

    /// Fetches stock for `ids` in one batched lookup.
    ///
    /// On failure the previous snapshot stays in place and the failure is
    /// only logged; quantity changes then fall back to the old levels.
    pub async fn refresh(&self, ids: &[String]) -> StockSnapshot {
        match self.data.fetch_stock_levels(ids).await {
            Ok(fresh) => {
                debug!(products = fresh.len(), "Stock refreshed");
                *self.snapshot.write().await = fresh.clone();
                fresh
            }
            Err(e) => {
                warn!(error = %e, "Stock refresh failed, keeping previous levels");
                self.snapshot.read().await.clone()
            }
        }
    }

    pub async fn snapshot(&self) -> StockSnapshot {
        self.snapshot.read().await.clone()
    }

    /// Applies `requested` to the cart line `id` unless it exceeds the
    /// known stock.
    pub async fn request_quantity_change(
        &self,
        cart: &CartStore,
        id: &str,
        requested: i64,
    ) -> CoreResult<StockDecision> {
        let check = self.snapshot.read().await.check_quantity(id, requested);

        match check {
            Ok(()) => {
                let change = cart.update_quantity(id, requested).await?;
                Ok(StockDecision::Applied { change })
            }
            Err(CoreError::StockCeilingReached { available, .. }) => {
                info!(id = %id, requested, available, "Maximum stock reached");
                Ok(StockDecision::MaxStockReached { available })
            }
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::{MemoryStorage, ServiceError, ServiceResult, SignUp};
    use crate::state::cart::tests::{produce, signed_in_store};
    use async_trait::async_trait;
    use farmease_core::{Product, UserSession, UserType};
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Serves fixed stock levels, or fails when `levels` is `None`.
    struct FakeStock {
        levels: Option<Vec<(&'static str, i64)>>,
        calls: AtomicUsize,
    }

    impl FakeStock {
        fn new(levels: Option<Vec<(&'static str, i64)>>) -> Arc<Self> {
            Arc::new(FakeStock {
                levels,
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl DataService for FakeStock {
        async fn fetch_stock_levels(&self, ids: &[String]) -> ServiceResult<StockSnapshot> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.levels {
                Some(levels) => Ok(levels
                    .iter()
                    .filter(|(id, _)| ids.iter().any(|wanted| wanted.as_str() == *id))
                    .map(|(id, stock)| (id.to_string(), *stock))
                    .collect()),
                None => Err(ServiceError::UnexpectedResponse {
                    status: 503,
                    body: "down".into(),
                }),
            }
        }

        async fn fetch_product(&self, _id: &str) -> ServiceResult<Option<Product>> {
            Ok(None)
        }

        async fn sign_in(&self, _email: &str, _password: &str) -> ServiceResult<UserSession> {
            Err(ServiceError::Unauthorized("not here".into()))
        }

        async fn sign_up(
            &self,
            _email: &str,
            _password: &str,
            _user_type: UserType,
        ) -> ServiceResult<SignUp> {
            Err(ServiceError::Unauthorized("not here".into()))
        }

        async fn fetch_auth_session(
            &self,
            _session: &UserSession,
        ) -> ServiceResult<Option<UserSession>> {
            Ok(None)
        }
    }

    #[tokio::test]
    async fn test_request_above_stock_is_rejected() {
        let cart = signed_in_store(Arc::new(MemoryStorage::new())).await;
        cart.add_item(produce("mango", "₹650", 2)).await.unwrap();

        let stock = StockState::new(FakeStock::new(Some(vec![("mango", 3)])));
        stock.refresh(&cart.ids().await).await;

        let decision = stock.request_quantity_change(&cart, "mango", 5).await.unwrap();
        assert_eq!(decision, StockDecision::MaxStockReached { available: 3 });
        assert_eq!(cart.snapshot().await.get("mango").unwrap().quantity(), 2);
    }

    #[tokio::test]
    async fn test_request_within_stock_is_applied() {
        let cart = signed_in_store(Arc::new(MemoryStorage::new())).await;
        cart.add_item(produce("mango", "₹650", 2)).await.unwrap();

        let stock = StockState::new(FakeStock::new(Some(vec![("mango", 3)])));
        stock.refresh(&cart.ids().await).await;

        let decision = stock.request_quantity_change(&cart, "mango", 3).await.unwrap();
        assert_eq!(
            decision,
            StockDecision::Applied {
                change: QuantityChange::Updated { quantity: 3 }
            }
        );
        assert_eq!(cart.snapshot().await.get("mango").unwrap().quantity(), 3);
    }

    #[tokio::test]
    async fn test_zero_request_removes_through_cart() {
        let cart = signed_in_store(Arc::new(MemoryStorage::new())).await;
        cart.add_item(produce("mango", "₹650", 2)).await.unwrap();

        let stock = StockState::new(FakeStock::new(Some(vec![("mango", 3)])));
        stock.refresh(&cart.ids().await).await;

        let decision = stock.request_quantity_change(&cart, "mango", 0).await.unwrap();
        assert_eq!(
            decision,
            StockDecision::Applied {
                change: QuantityChange::Removed
            }
        );
        assert!(cart.is_empty().await);
    }

    #[tokio::test]
    async fn test_refresh_is_one_batched_call() {
        let data = FakeStock::new(Some(vec![("a", 1), ("b", 2), ("c", 3)]));
        let stock = StockState::new(data.clone());

        let ids = vec!["a".to_string(), "b".to_string(), "c".to_string()];
        let snapshot = stock.refresh(&ids).await;

        assert_eq!(data.calls.load(Ordering::SeqCst), 1);
        assert_eq!(snapshot.len(), 3);
    }

    #[tokio::test]
    async fn test_failed_refresh_keeps_previous_levels() {
        let stock = StockState::new(FakeStock::new(None));
        *stock.snapshot.write().await = [("mango".to_string(), 4)].into_iter().collect();

        let snapshot = stock.refresh(&["mango".to_string()]).await;
        assert_eq!(snapshot.available("mango"), Some(4));
    }

    #[tokio::test]
    async fn test_unknown_id_is_not_limited() {
        let cart = signed_in_store(Arc::new(MemoryStorage::new())).await;
        cart.add_item(produce("okra", "₹40", 1)).await.unwrap();

        let stock = StockState::new(FakeStock::new(Some(vec![])));
        stock.refresh(&cart.ids().await).await;

        let decision = stock.request_quantity_change(&cart, "okra", 9).await.unwrap();
        assert!(matches!(decision, StockDecision::Applied { .. }));
    }
}
