//! # Seller Listings
//!
//! What a seller submits when adding or editing a product, and the rules a
//! listing must satisfy before it reaches the catalog.
//!
//! ```text
//! Add / Edit form ──► ProductDraft ──► validate() ──► Product (seller_id set)
//!                                          │
//!                                          └── ValidationError on the first bad field
//! ```
//!
//! Edits replace every field of the listing; id and seller never change.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::ValidationError;
use crate::types::{Product, ProductCategory};
use crate::validation::{
    validate_description, validate_display_price, validate_image_url, validate_listing_name,
    ValidationResult,
};

/// A listing as entered on the add or edit form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ProductDraft {
    pub name: String,
    /// Display price, kept as typed (e.g. `₹1,500/day`).
    pub price: String,
    pub description: String,
    pub image: String,
    pub category: String,
    pub stock: i64,
}

impl ProductDraft {
    /// Checks every field, in form order.
    ///
    /// A listing must offer at least one unit; sold-out items are managed
    /// through the stock command instead.
    pub fn validate(&self) -> ValidationResult<()> {
        validate_listing_name(&self.name)?;
        validate_display_price(&self.price)?;
        validate_description(&self.description)?;
        validate_image_url(&self.image)?;

        if self.category.trim().is_empty() {
            return Err(ValidationError::Required {
                field: "category".to_string(),
            });
        }

        if self.stock < 1 {
            return Err(ValidationError::OutOfRange {
                field: "stock".to_string(),
                min: 1,
                max: i64::MAX,
            });
        }

        Ok(())
    }

    /// Builds the catalog product for this draft. Call [`validate`] first.
    ///
    /// [`validate`]: ProductDraft::validate
    pub fn into_product(self, id: String, seller_id: String) -> Product {
        Product {
            id,
            name: self.name.trim().to_string(),
            price: self.price.trim().to_string(),
            image: self.image.trim().to_string(),
            category: ProductCategory::from_name(&self.category),
            stock: self.stock,
            description: Some(self.description.trim().to_string()),
            seller_id: Some(seller_id),
        }
    }
}
