//! # Checkout Commands
//!
//! Thin wrappers over the [`crate::state::CheckoutSequencer`].
//!
//! ## Checkout Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Cart page          begin_checkout() ──► payment form opens            │
//! │                                                                         │
//! │  Payment form       submit_payment() ──► "Processing..." (delay)       │
//! │                          │                                              │
//! │                ┌─────────┴──────────┐                                   │
//! │                ▼                    ▼                                   │
//! │     Succeeded { order number }   Failed { message }                    │
//! │     cart emptied                 form stays open, retry allowed        │
//! │                                                                         │
//! │  Payment form       cancel_checkout() ──► back to cart                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Orders are not stored anywhere: the invoice e-mail is the only record.

use serde::Serialize;
use tracing::debug;

use crate::error::ApiError;
use crate::state::CheckoutOutcome;
use crate::AppContext;
use farmease_core::CheckoutState;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutStateResponse {
    pub state: CheckoutState,
    /// Set while the payment form is reopened after a failed attempt.
    pub last_failure: Option<String>,
}

impl CheckoutStateResponse {
    fn settled(state: CheckoutState) -> Self {
        CheckoutStateResponse {
            state,
            last_failure: None,
        }
    }
}

pub async fn get_checkout_state(ctx: &AppContext) -> Result<CheckoutStateResponse, ApiError> {
    debug!("get_checkout_state command");
    let (state, last_failure) = ctx.checkout.status().await;
    Ok(CheckoutStateResponse {
        state,
        last_failure,
    })
}

/// Opens the payment form. Fails with `CART_ERROR` for an empty cart.
pub async fn begin_checkout(ctx: &AppContext) -> Result<CheckoutStateResponse, ApiError> {
    debug!("begin_checkout command");
    let state = ctx.checkout.begin(&ctx.cart).await?;
    Ok(CheckoutStateResponse::settled(state))
}

pub async fn cancel_checkout(ctx: &AppContext) -> Result<CheckoutStateResponse, ApiError> {
    debug!("cancel_checkout command");
    let state = ctx.checkout.cancel().await?;
    Ok(CheckoutStateResponse::settled(state))
}

/// Submits the payment details.
///
/// A failed payment is a normal outcome, not an `Err`: the UI shows the
/// message and keeps the form open.
pub async fn submit_payment(ctx: &AppContext) -> Result<CheckoutOutcome, ApiError> {
    debug!("submit_payment command");
    Ok(ctx.checkout.submit_payment(&ctx.cart, &ctx.session).await?)
}

/// Leaves the success screen.
pub async fn finish_checkout(ctx: &AppContext) -> Result<CheckoutStateResponse, ApiError> {
    debug!("finish_checkout command");
    ctx.checkout.reset().await;
    Ok(CheckoutStateResponse::settled(ctx.checkout.state().await))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::cart::add_to_cart;
    use crate::commands::test_support::context;
    use crate::error::ErrorCode;

    #[tokio::test]
    async fn test_checkout_happy_path() {
        let (ctx, invoices) = context(true).await;
        add_to_cart(&ctx, "forest-honey", 2).await.unwrap();

        let opened = begin_checkout(&ctx).await.unwrap();
        assert_eq!(opened.state, CheckoutState::AwaitingPaymentDetails);

        let outcome = submit_payment(&ctx).await.unwrap();
        let CheckoutOutcome::Succeeded { total_amount, .. } = outcome else {
            panic!("expected success, got {outcome:?}");
        };
        assert_eq!(total_amount, "₹798.00");
        assert!(ctx.cart.is_empty().await);
        assert_eq!(invoices.sent.lock().unwrap().len(), 1);

        // persisted as empty too
        let stored = ctx.db.storage().get("cart").await.unwrap().unwrap();
        assert_eq!(stored, "[]");

        let done = finish_checkout(&ctx).await.unwrap();
        assert_eq!(done.state, CheckoutState::Idle);
    }

    #[tokio::test]
    async fn test_invoice_failure_keeps_cart() {
        let (ctx, invoices) = context(true).await;
        add_to_cart(&ctx, "forest-honey", 1).await.unwrap();
        *invoices.fail.lock().unwrap() = true;

        begin_checkout(&ctx).await.unwrap();
        let outcome = submit_payment(&ctx).await.unwrap();
        assert!(matches!(outcome, CheckoutOutcome::Failed { .. }));
        assert_eq!(ctx.cart.total_item_count().await, 1);

        let state = get_checkout_state(&ctx).await.unwrap();
        assert_eq!(state.state, CheckoutState::AwaitingPaymentDetails);
        assert_eq!(
            state.last_failure.as_deref(),
            Some(crate::state::PAYMENT_FAILED_MESSAGE)
        );

        let json = serde_json::to_value(&state).unwrap();
        assert_eq!(json["state"], "awaiting_payment_details");
        assert!(json["lastFailure"].is_string());
    }

    #[tokio::test]
    async fn test_cart_cleared_after_begin_fails_payment() {
        let (ctx, invoices) = context(true).await;
        add_to_cart(&ctx, "tomatoes", 1).await.unwrap();
        begin_checkout(&ctx).await.unwrap();
        crate::commands::cart::clear_cart(&ctx).await.unwrap();

        let outcome = submit_payment(&ctx).await.unwrap();
        assert!(matches!(outcome, CheckoutOutcome::Failed { .. }));
        assert!(invoices.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_begin_with_empty_cart() {
        let (ctx, _) = context(true).await;
        let err = begin_checkout(&ctx).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::CartError);
    }

    #[tokio::test]
    async fn test_cancel_and_submit_out_of_order() {
        let (ctx, _) = context(true).await;

        let err = submit_payment(&ctx).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::CheckoutError);

        add_to_cart(&ctx, "tomatoes", 1).await.unwrap();
        begin_checkout(&ctx).await.unwrap();
        let cancelled = cancel_checkout(&ctx).await.unwrap();
        assert_eq!(cancelled.state, CheckoutState::Idle);
    }
}
