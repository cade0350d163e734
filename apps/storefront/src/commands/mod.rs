//! # Commands
//!
//! One async function per UI action. Every command borrows the
//! [`crate::AppContext`] and returns `Result<T, ApiError>` with a
//! serializable `T`.
//!
//! | Module       | Commands                                                     |
//! |--------------|--------------------------------------------------------------|
//! | `cart`       | get_cart, add_to_cart, update_cart_item, remove_from_cart,   |
//! |              | clear_cart, refresh_stock                                    |
//! | `rental`     | quote_rental, book_rental                                    |
//! | `product`    | get_product, search_products, list_category                  |
//! | `checkout`   | begin_checkout, cancel_checkout, submit_payment,             |
//! |              | get_checkout_state                                           |
//! | `session`    | sign_in, sign_up, sign_out, current_session                  |
//! | `seller`     | my_products, add_product, update_product, update_stock,      |
//! |              | delete_product                                               |
//! | `feedback`   | submit_feedback, list_feedback                               |
//!
//! Buying commands (`add_to_cart`, `book_rental`) belong to buyers; listing
//! commands and reading feedback belong to sellers.

pub mod cart;
pub mod checkout;
pub mod feedback;
pub mod product;
pub mod rental;
pub mod seller;
pub mod session;

use tracing::info;

use crate::error::{ApiError, ErrorCode};
use crate::AppContext;
use farmease_core::{CoreError, UserSession, UserType};

/// The signed-in buyer, `None` when nobody is signed in.
///
/// Runs before any product lookup so a signed-out visitor is always sent to
/// login, whatever they tried to add.
pub(crate) async fn buyer_session(
    ctx: &AppContext,
    action: &'static str,
) -> Result<Option<UserSession>, ApiError> {
    match ctx.session.current().await {
        Some(session) if session.is_seller() => {
            info!(user_id = %session.user_id, action, "Refused: seller account");
            Err(CoreError::WrongAccountType {
                required: UserType::Buyer,
                action,
            }
            .into())
        }
        session => Ok(session),
    }
}

/// The signed-in seller.
pub(crate) async fn seller_session(
    ctx: &AppContext,
    action: &'static str,
) -> Result<UserSession, ApiError> {
    let Some(session) = ctx.session.current().await else {
        return Err(ApiError::new(
            ErrorCode::Unauthorized,
            format!("Please sign in to {action}"),
        ));
    };

    if !session.is_seller() {
        info!(user_id = %session.user_id, action, "Refused: buyer account");
        return Err(CoreError::WrongAccountType {
            required: UserType::Seller,
            action,
        }
        .into());
    }

    Ok(session)
}
