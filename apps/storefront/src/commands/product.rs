//! # Product Commands
//!
//! Product page lookups and local catalog browsing.
//!
//! `get_product` goes through the active data service (hosted backend or
//! local catalog). Search and category listing read the local SQLite
//! catalog, which the `seed` binary fills for offline use.

use serde::Serialize;
use std::time::Instant;
use tracing::{debug, info};

use crate::error::ApiError;
use crate::AppContext;
use farmease_core::validation::validate_search_query;
use farmease_core::{display_price, CoreError, Product, ProductCategory, QuantitySelector};

const DEFAULT_LIMIT: u32 = 20;
const MAX_LIMIT: u32 = 100;

/// Product DTO for the product page and listings.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductView {
    #[serde(flatten)]
    pub product: Product,
    /// Normalized price ("₹650.00"), or the raw string.
    pub display_price: String,
    pub is_rental: bool,
    pub in_stock: bool,
    /// Initial state of the quantity picker; absent for rental equipment,
    /// which is booked by date range instead.
    pub quantity_selector: Option<QuantitySelector>,
}

impl From<Product> for ProductView {
    fn from(product: Product) -> Self {
        let is_rental = product.category.is_rental();
        ProductView {
            display_price: display_price(&product.price),
            is_rental,
            in_stock: product.in_stock(),
            quantity_selector: (!is_rental).then(|| QuantitySelector::new(product.stock)),
            product,
        }
    }
}

/// Gets one product by id.
pub async fn get_product(ctx: &AppContext, id: &str) -> Result<ProductView, ApiError> {
    debug!(id = %id, "get_product command");

    let product = ctx
        .data
        .fetch_product(id)
        .await?
        .ok_or(CoreError::ProductNotFound(id.to_string()))?;

    Ok(ProductView::from(product))
}

/// Name search over the local catalog.
///
/// ## Arguments
/// * `query` - Substring of the product name (empty lists everything)
/// * `limit` - Maximum results to return (default: 20, max: 100)
pub async fn search_products(
    ctx: &AppContext,
    query: &str,
    limit: Option<u32>,
) -> Result<Vec<ProductView>, ApiError> {
    let start = Instant::now();
    let query = validate_search_query(query).map_err(CoreError::from)?;
    let limit = limit.unwrap_or(DEFAULT_LIMIT).min(MAX_LIMIT);

    debug!(query = %query, limit = %limit, "search_products command");

    let products = ctx.db.products().search(&query, limit).await?;
    let views: Vec<ProductView> = products.into_iter().map(ProductView::from).collect();

    info!(
        elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
        count = views.len(),
        query = %query,
        "search_products complete"
    );

    Ok(views)
}

/// Lists one category of the local catalog, e.g. "Rental Equipment".
pub async fn list_category(
    ctx: &AppContext,
    category: &str,
    limit: Option<u32>,
) -> Result<Vec<ProductView>, ApiError> {
    let category = ProductCategory::from_name(category);
    let limit = limit.unwrap_or(DEFAULT_LIMIT).min(MAX_LIMIT);

    debug!(category = %category, limit = %limit, "list_category command");

    let products = ctx.db.products().list_by_category(&category, limit).await?;
    Ok(products.into_iter().map(ProductView::from).collect())
}
