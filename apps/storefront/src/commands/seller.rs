//! # Seller Commands
//!
//! A seller's own listings: the "My Products" page with its add, edit,
//! stock and delete actions.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  My Products (seller only)                                             │
//! │                                                                         │
//! │  my_products()          products WHERE seller_id = me                  │
//! │  add_product(draft)     validate ──► new id ──► insert (seller_id = me)│
//! │  update_product(id, d)  owner? ──► validate ──► replace fields         │
//! │  update_stock(id, n)    owner? ──► n >= 0 ──► set_stock                │
//! │  delete_product(id)     owner? ──► delete                              │
//! │                                                                         │
//! │  Someone else's listing ──► FORBIDDEN, nothing written                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Listings are written to the local catalog.

use tracing::{debug, info};
use uuid::Uuid;

use super::seller_session;
use crate::error::ApiError;
use crate::AppContext;
use farmease_core::validation::validate_stock;
use farmease_core::{CoreError, Product, ProductDraft, UserSession};

/// Loads a product and checks it belongs to `seller`.
async fn owned_product(
    ctx: &AppContext,
    seller: &UserSession,
    product_id: &str,
) -> Result<Product, ApiError> {
    let product = ctx
        .db
        .products()
        .get_by_id(product_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Product", product_id))?;

    if product.seller_id.as_deref() != Some(seller.user_id.as_str()) {
        info!(product_id = %product_id, user_id = %seller.user_id, "Refused: not the listing owner");
        return Err(CoreError::NotListingOwner {
            id: product.id,
        }
        .into());
    }

    Ok(product)
}

/// Lists the signed-in seller's products, sorted by name.
pub async fn my_products(ctx: &AppContext) -> Result<Vec<Product>, ApiError> {
    debug!("my_products command");

    let seller = seller_session(ctx, "view your listings").await?;
    Ok(ctx.db.products().list_by_seller(&seller.user_id).await?)
}

/// Lists a new product under the signed-in seller.
pub async fn add_product(ctx: &AppContext, draft: ProductDraft) -> Result<Product, ApiError> {
    debug!(name = %draft.name, "add_product command");

    let seller = seller_session(ctx, "list products").await?;
    draft.validate().map_err(CoreError::from)?;

    let product = draft.into_product(Uuid::new_v4().to_string(), seller.user_id);
    ctx.db.products().insert(&product).await?;

    info!(id = %product.id, name = %product.name, "Product listed");
    Ok(product)
}

/// Replaces every listing field of one of the seller's products.
pub async fn update_product(
    ctx: &AppContext,
    product_id: &str,
    draft: ProductDraft,
) -> Result<Product, ApiError> {
    debug!(product_id = %product_id, "update_product command");

    let seller = seller_session(ctx, "edit products").await?;
    let existing = owned_product(ctx, &seller, product_id).await?;
    draft.validate().map_err(CoreError::from)?;

    let product = draft.into_product(existing.id, seller.user_id);
    ctx.db.products().update(&product).await?;

    info!(id = %product.id, "Product updated");
    Ok(product)
}

/// Sets the stock of one of the seller's products. Zero marks it sold out.
pub async fn update_stock(
    ctx: &AppContext,
    product_id: &str,
    stock: i64,
) -> Result<Product, ApiError> {
    debug!(product_id = %product_id, stock, "update_stock command");

    let seller = seller_session(ctx, "manage stock").await?;
    let mut product = owned_product(ctx, &seller, product_id).await?;
    validate_stock(stock).map_err(CoreError::from)?;

    ctx.db.products().set_stock(product_id, stock).await?;
    product.stock = stock;
    Ok(product)
}

/// Removes one of the seller's products from the catalog.
///
/// Carts that already hold it keep their line; the next stock refresh no
/// longer finds the product.
pub async fn delete_product(ctx: &AppContext, product_id: &str) -> Result<(), ApiError> {
    debug!(product_id = %product_id, "delete_product command");

    let seller = seller_session(ctx, "delete products").await?;
    owned_product(ctx, &seller, product_id).await?;

    ctx.db.products().delete(product_id).await?;
    info!(id = %product_id, "Product deleted");
    Ok(())
}
