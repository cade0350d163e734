//! # Checkout Sequencer
//!
//! Drives the checkout state machine through the simulated payment, the
//! invoice e-mail and the cart clear.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Checkout Sequence                                    │
//! │                                                                         │
//! │  begin() ──────► AwaitingPaymentDetails                                │
//! │                         │                                               │
//! │                  submit_payment() ── cart snapshot (empty? fail now)   │
//! │                         ▼                                               │
//! │                    Processing ──── sleep(payment_delay) ────┐          │
//! │                                                              ▼          │
//! │                          order number + OrderSummary(snapshot)          │
//! │                                                              │          │
//! │                                        send_invoice(email, summary)     │
//! │                                       ok │              │ err           │
//! │                                          ▼              ▼               │
//! │                            cart.clear()         cart untouched          │
//! │                            Succeeded            AwaitingPaymentDetails  │
//! │                                                 (retry runs it all     │
//! │                                                  again, new invoice)   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The machine lock is not held across the delay or the invoice call; the
//! `Processing` state itself rejects a second submission. The invoice bills
//! the cart as it was when the payment was submitted, whatever happens to
//! the cart during the delay.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{debug, error, info};

use super::{CartStore, SessionState};
use crate::services::InvoiceService;
use farmease_core::{generate_order_number, CheckoutMachine, CheckoutState, CoreResult, OrderSummary};

/// Message shown for any failed payment attempt.
pub const PAYMENT_FAILED_MESSAGE: &str =
    "There was an error processing your payment. Please try again.";

/// Message shown when the cart was emptied after the payment form opened.
pub const EMPTY_CART_MESSAGE: &str = "Your cart is empty. Add items before paying.";

/// Result of one payment submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum CheckoutOutcome {
    #[serde(rename_all = "camelCase")]
    Succeeded {
        order_number: String,
        total_amount: String,
    },
    Failed { message: String },
}

pub struct CheckoutSequencer {
    machine: Mutex<CheckoutMachine>,
    invoices: Arc<dyn InvoiceService>,
    payment_delay: Duration,
}

impl CheckoutSequencer {
    pub fn new(invoices: Arc<dyn InvoiceService>, payment_delay: Duration) -> Self {
        CheckoutSequencer {
            machine: Mutex::new(CheckoutMachine::new()),
            invoices,
            payment_delay,
        }
    }

    pub async fn state(&self) -> CheckoutState {
        self.machine.lock().await.state()
    }

    /// State plus the message of a failed attempt the form is still showing.
    pub async fn status(&self) -> (CheckoutState, Option<String>) {
        let machine = self.machine.lock().await;
        (machine.state(), machine.last_failure().map(str::to_string))
    }

    /// Opens the payment form. Refused for an empty cart.
    pub async fn begin(&self, cart: &CartStore) -> CoreResult<CheckoutState> {
        let snapshot = cart.snapshot().await;
        let mut machine = self.machine.lock().await;
        machine.begin(&snapshot)?;
        debug!(lines = snapshot.len(), "Checkout started");
        Ok(machine.state())
    }

    /// Closes the payment form without paying.
    pub async fn cancel(&self) -> CoreResult<CheckoutState> {
        let mut machine = self.machine.lock().await;
        machine.cancel()?;
        Ok(machine.state())
    }

    /// Back to `Idle` from any state.
    pub async fn reset(&self) {
        self.machine.lock().await.reset();
    }

    /// Runs the simulated payment and sends the invoice.
    ///
    /// Returns `Err` only when the machine is not awaiting payment details.
    /// Everything that goes wrong after that is reported as
    /// [`CheckoutOutcome::Failed`] with the state back at
    /// `AwaitingPaymentDetails` and the cart untouched.
    pub async fn submit_payment(
        &self,
        cart: &CartStore,
        session: &SessionState,
    ) -> CoreResult<CheckoutOutcome> {
        let attempt = self.machine.lock().await.submit_payment()?;
        let snapshot = cart.snapshot().await;

        if snapshot.is_empty() {
            info!(attempt, "Payment refused: cart emptied after checkout began");
            self.machine.lock().await.fail(EMPTY_CART_MESSAGE)?;
            return Ok(CheckoutOutcome::Failed {
                message: EMPTY_CART_MESSAGE.to_string(),
            });
        }

        info!(attempt, lines = snapshot.len(), "Processing payment");

        tokio::time::sleep(self.payment_delay).await;

        let order_number = generate_order_number();
        let summary = OrderSummary::from_cart(order_number.clone(), &snapshot);

        let sent = match session.email().await {
            Some(email) => self
                .invoices
                .send_invoice(&email, &summary)
                .await
                .map_err(|e| e.to_string()),
            None => Err("signed-in user has no e-mail address".to_string()),
        };

        let mut machine = self.machine.lock().await;
        match sent {
            Ok(()) => {
                cart.clear().await;
                machine.succeed()?;
                info!(order = %order_number, total = %summary.total_amount, "Order placed");
                Ok(CheckoutOutcome::Succeeded {
                    order_number,
                    total_amount: summary.total_amount,
                })
            }
            Err(cause) => {
                error!(order = %order_number, attempt, error = %cause, "Payment failed");
                machine.fail(PAYMENT_FAILED_MESSAGE)?;
                Ok(CheckoutOutcome::Failed {
                    message: PAYMENT_FAILED_MESSAGE.to_string(),
                })
            }
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
