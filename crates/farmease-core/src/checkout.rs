//! # Checkout State Machine
//!
//! Pure transition rules for checkout. The async work (simulated payment
//! delay, invoice dispatch, clearing the cart) lives in the storefront's
//! sequencer, which drives this machine.
//!
//! ## States
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │          begin (cart not empty)            submit_payment               │
//! │   Idle ─────────────────────────► Awaiting ───────────────► Processing │
//! │    ▲                              Payment  ◄───────────────     │      │
//! │    │          cancel              Details       fail            │      │
//! │    └──────────────────────────────  │                     succeed│      │
//! │                                     │                           ▼      │
//! │                      begin again ◄──┴───────────────────── Succeeded   │
//! │                                                                         │
//! │  "Failed" is not a resting state: a failure reports to the user and    │
//! │  lands back in AwaitingPaymentDetails so the same flow can be retried. │
//! │  The failure message stays readable until the next submit, cancel or   │
//! │  begin. Processing cannot be cancelled.                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::cart::Cart;
use crate::error::{CoreError, CoreResult};
use crate::money::{display_price, format_price};
use crate::types::{OrderLine, OrderSummary};
use crate::{ORDER_NUMBER_LEN, ORDER_NUMBER_PREFIX};

// =============================================================================
// Checkout State
// =============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum CheckoutState {
    #[default]
    Idle,
    AwaitingPaymentDetails,
    Processing,
    Succeeded,
}

// =============================================================================
// Checkout Machine
// =============================================================================

/// Checkout transitions plus a count of payment attempts in this checkout.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckoutMachine {
    state: CheckoutState,
    attempts: u32,
    last_failure: Option<String>,
}

impl CheckoutMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> CheckoutState {
        self.state
    }

    /// Payment submissions since the last `begin`.
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Why the most recent attempt failed, while the form is still open
    /// after that failure.
    pub fn last_failure(&self) -> Option<&str> {
        self.last_failure.as_deref()
    }

    /// Opens the payment form. Requires a non-empty cart.
    pub fn begin(&mut self, cart: &Cart) -> CoreResult<()> {
        match self.state {
            CheckoutState::Idle | CheckoutState::Succeeded => {}
            from => {
                return Err(CoreError::InvalidCheckoutTransition {
                    from,
                    action: "begin checkout",
                })
            }
        }

        if cart.is_empty() {
            return Err(CoreError::EmptyCart);
        }

        self.state = CheckoutState::AwaitingPaymentDetails;
        self.attempts = 0;
        self.last_failure = None;
        Ok(())
    }

    /// Moves to `Processing` and returns the attempt number (1-based).
    pub fn submit_payment(&mut self) -> CoreResult<u32> {
        self.require(CheckoutState::AwaitingPaymentDetails, "submit payment")?;
        self.state = CheckoutState::Processing;
        self.attempts += 1;
        self.last_failure = None;
        Ok(self.attempts)
    }

    pub fn succeed(&mut self) -> CoreResult<()> {
        self.require(CheckoutState::Processing, "complete payment")?;
        self.state = CheckoutState::Succeeded;
        Ok(())
    }

    /// Records a failed attempt and reopens the payment form.
    pub fn fail(&mut self, reason: impl Into<String>) -> CoreResult<()> {
        self.require(CheckoutState::Processing, "fail payment")?;
        self.state = CheckoutState::AwaitingPaymentDetails;
        self.last_failure = Some(reason.into());
        Ok(())
    }

    /// Closes the payment form without paying.
    pub fn cancel(&mut self) -> CoreResult<()> {
        self.require(CheckoutState::AwaitingPaymentDetails, "cancel checkout")?;
        self.state = CheckoutState::Idle;
        self.last_failure = None;
        Ok(())
    }

    /// Returns to `Idle` unconditionally (leaving the success screen).
    pub fn reset(&mut self) {
        self.state = CheckoutState::Idle;
        self.attempts = 0;
        self.last_failure = None;
    }

    fn require(&self, required: CheckoutState, action: &'static str) -> CoreResult<()> {
        if self.state == required {
            Ok(())
        } else {
            Err(CoreError::InvalidCheckoutTransition {
                from: self.state,
                action,
            })
        }
    }
}

// =============================================================================
// Order Number & Summary
// =============================================================================

/// Generates an order number: `ORD-` followed by nine random lowercase
/// alphanumerics.
///
/// Uniqueness rests on the randomness alone; nothing checks for collisions.
///
/// ```rust
/// use farmease_core::checkout::generate_order_number;
///
/// let order = generate_order_number();
/// assert!(order.starts_with("ORD-"));
/// assert_eq!(order.len(), 13);
/// ```
pub fn generate_order_number() -> String {
    let token: String = Uuid::new_v4()
        .simple()
        .to_string()
        .chars()
        .take(ORDER_NUMBER_LEN)
        .collect();
    format!("{ORDER_NUMBER_PREFIX}{token}")
}

impl OrderSummary {
    /// Builds the invoice summary from the cart as it stands at payment.
    pub fn from_cart(order_number: impl Into<String>, cart: &Cart) -> Self {
        OrderSummary {
            order_number: order_number.into(),
            total_amount: format_price(cart.total()),
            items: cart
                .items()
                .iter()
                .map(|item| OrderLine {
                    name: item.name().to_string(),
                    quantity: item.quantity(),
                    price: display_price(item.price()),
                })
                .collect(),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
