//! # Cart Commands
//!
//! Commands for viewing and changing the cart.
//!
//! ## Cart Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart Lifecycle                                       │
//! │                                                                         │
//! │  ┌──────────┐     ┌──────────┐     ┌──────────┐     ┌──────────┐       │
//! │  │  Empty   │────►│ In Cart  │────►│ Payment  │────►│  Order   │       │
//! │  │  Cart    │     │          │     │  Form    │     │  Placed  │       │
//! │  └──────────┘     └──────────┘     └──────────┘     └──────────┘       │
//! │                        │                                  │             │
//! │                   add_to_cart                        cart cleared      │
//! │                   book_rental (rental.rs)            (checkout.rs)     │
//! │                   update_cart_item                                      │
//! │                   remove_from_cart                                      │
//! │                        │                                                │
//! │                        ▼                                                │
//! │                   clear_cart ──────────────────────►                   │
//! │                                                      (back to empty)   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::Serialize;
use tracing::{debug, info, warn};

use super::buyer_session;
use crate::error::ApiError;
use crate::state::{AddOutcome, StockDecision};
use crate::AppContext;
use farmease_core::validation::validate_quantity;
use farmease_core::{
    display_price, format_price, line_total_display, Cart, CartTotals, CoreError, LineItem,
    QuantityItem, StockSnapshot,
};

/// One cart row as the cart page renders it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLineView {
    #[serde(flatten)]
    pub item: LineItem,
    /// Normalized price, or the raw string when it does not parse.
    pub display_price: String,
    /// `price × quantity`, or `"N/A"`.
    pub line_total: String,
    /// Last known stock; `None` when the product was not in the lookup.
    pub max_stock: Option<i64>,
    /// Whether the "+" control should be disabled.
    pub at_max_stock: bool,
}

/// Cart response including rows and totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartResponse {
    pub items: Vec<CartLineView>,
    pub totals: CartTotals,
    pub total_display: String,
}

impl CartResponse {
    pub fn new(cart: &Cart, stock: &StockSnapshot) -> Self {
        let items = cart
            .items()
            .iter()
            .map(|item| {
                let quantity = item.quantity();
                let fixed = matches!(item, LineItem::Rental(_));
                CartLineView {
                    display_price: display_price(item.price()),
                    line_total: match item {
                        LineItem::Quantity(_) => line_total_display(item.price(), quantity),
                        LineItem::Rental(_) => display_price(item.price()),
                    },
                    max_stock: stock.available(item.id()),
                    at_max_stock: fixed || stock.is_at_ceiling(item.id(), quantity),
                    item: item.clone(),
                }
            })
            .collect();

        let totals = cart.totals();
        CartResponse {
            items,
            total_display: format_price(totals.total),
            totals,
        }
    }
}

/// Result of an add, with the cart as it now stands.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddToCartResponse {
    pub outcome: AddOutcome,
    pub cart: CartResponse,
}

impl AddToCartResponse {
    pub(crate) async fn login_required(ctx: &AppContext) -> Self {
        info!("Add refused: not signed in");
        AddToCartResponse {
            outcome: AddOutcome::LoginRequired,
            cart: cart_response(ctx).await,
        }
    }
}

/// Result of a stock-checked quantity change, with the cart as it now
/// stands.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateQuantityResponse {
    pub decision: StockDecision,
    pub cart: CartResponse,
}

pub(crate) async fn cart_response(ctx: &AppContext) -> CartResponse {
    let stock = ctx.stock.snapshot().await;
    ctx.cart.with_cart(|cart| CartResponse::new(cart, &stock)).await
}

/// Gets the cart for the cart page.
///
/// Opening the cart page is what refreshes stock: the levels for every
/// product in the cart are fetched in one lookup before the rows are built.
/// A failed lookup keeps the previous levels.
pub async fn get_cart(ctx: &AppContext) -> Result<CartResponse, ApiError> {
    debug!("get_cart command");

    let ids = ctx.cart.ids().await;
    ctx.stock.refresh(&ids).await;
    let response = cart_response(ctx).await;

    if !response.totals.unpriced.is_empty() {
        warn!(ids = ?response.totals.unpriced, "Unparseable prices counted as zero");
    }
    Ok(response)
}

/// Adds `quantity` units of a produce product.
///
/// ## Behavior
/// - Without a session nothing changes and the outcome is `LoginRequired`,
///   checked before anything else
/// - Seller accounts are refused with `FORBIDDEN`
/// - Product must exist and be sold by quantity (rentals go through
///   `book_rental`)
/// - `quantity` must be within the product's stock, like the product
///   page's selector
/// - A product already in the cart has its quantity increased
pub async fn add_to_cart(
    ctx: &AppContext,
    product_id: &str,
    quantity: i64,
) -> Result<AddToCartResponse, ApiError> {
    debug!(product_id = %product_id, quantity = %quantity, "add_to_cart command");

    if buyer_session(ctx, "add items to the cart").await?.is_none() {
        return Ok(AddToCartResponse::login_required(ctx).await);
    }

    let quantity = validate_quantity(quantity).map_err(CoreError::from)?;

    let product = ctx
        .data
        .fetch_product(product_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Product", product_id))?;

    if !product.category.is_purchasable() {
        return Err(CoreError::NotPurchasable {
            id: product.id,
            category: product.category.to_string(),
        }
        .into());
    }

    if i64::from(quantity) > product.stock {
        return Err(CoreError::StockCeilingReached {
            id: product.id,
            available: product.stock,
            requested: i64::from(quantity),
        }
        .into());
    }

    let outcome = ctx
        .cart
        .add_item(LineItem::Quantity(QuantityItem {
            id: product.id.clone(),
            name: product.name.clone(),
            price: product.price.clone(),
            image: product.image.clone(),
            category: product.category.display_name().to_string(),
            quantity,
        }))
        .await?;

    Ok(AddToCartResponse {
        outcome,
        cart: cart_response(ctx).await,
    })
}

/// Sets the quantity of a cart line, checked against the last known stock.
///
/// ## Behavior
/// - Quantity above stock: cart untouched, `MaxStockReached { available }`
/// - Quantity 0 or less: the line is removed
pub async fn update_cart_item(
    ctx: &AppContext,
    product_id: &str,
    quantity: i64,
) -> Result<UpdateQuantityResponse, ApiError> {
    debug!(product_id = %product_id, quantity = %quantity, "update_cart_item command");

    let decision = ctx
        .stock
        .request_quantity_change(&ctx.cart, product_id, quantity)
        .await?;

    Ok(UpdateQuantityResponse {
        decision,
        cart: cart_response(ctx).await,
    })
}

/// Removes a line. Removing a product that is not in the cart is a no-op.
pub async fn remove_from_cart(ctx: &AppContext, product_id: &str) -> Result<CartResponse, ApiError> {
    debug!(product_id = %product_id, "remove_from_cart command");

    ctx.cart.remove_item(product_id).await;
    Ok(cart_response(ctx).await)
}

pub async fn clear_cart(ctx: &AppContext) -> Result<CartResponse, ApiError> {
    debug!("clear_cart command");

    ctx.cart.clear().await;
    Ok(cart_response(ctx).await)
}

/// Re-fetches stock for the cart's products.
pub async fn refresh_stock(ctx: &AppContext) -> Result<StockSnapshot, ApiError> {
    debug!("refresh_stock command");

    let ids = ctx.cart.ids().await;
    Ok(ctx.stock.refresh(&ids).await)
}
