//! # Domain Types
//!
//! Core domain types shared by the cart, the catalog and checkout.
//!
//! ## Type Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │ ProductCategory │   │  RentalDates    │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id             │   │  RentalEquip.   │   │  from (date)    │       │
//! │  │  price (string) │   │  OrganicProduce │   │  to   (date)    │       │
//! │  │  stock          │   │  FruitsAndVeg.  │   └─────────────────┘       │
//! │  │  category       │   │  Other(name)    │                              │
//! │  └─────────────────┘   └─────────────────┘                              │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │  UserSession    │   │  OrderSummary   │   │   Feedback      │       │
//! │  │  user_id, email │   │  order_number   │   │  rating 1..=5   │       │
//! │  │  user_type      │   │  total, items   │   │  text, email    │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

// =============================================================================
// Product Category
// =============================================================================

/// Category of a catalog product.
///
/// The backend stores the category by display name. Only rental equipment
/// is booked by date range; only produce categories are bought by quantity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ProductCategory {
    RentalEquipment,
    OrganicProduce,
    FruitsAndVegetables,
    Other(String),
}

impl ProductCategory {
    /// Resolves a category from its stored display name.
    pub fn from_name(name: &str) -> Self {
        match name.trim() {
            "Rental Equipment" => ProductCategory::RentalEquipment,
            "Organic Produce" => ProductCategory::OrganicProduce,
            "Fruits and Vegetables" => ProductCategory::FruitsAndVegetables,
            other => ProductCategory::Other(other.to_string()),
        }
    }

    /// Display label shown in the UI and stored on cart lines.
    pub fn display_name(&self) -> &str {
        match self {
            ProductCategory::RentalEquipment => "Rental Equipment",
            ProductCategory::OrganicProduce => "Organic Produce",
            ProductCategory::FruitsAndVegetables => "Fruits and Vegetables",
            ProductCategory::Other(name) => name,
        }
    }

    /// Whether products in this category are booked by date range.
    pub fn is_rental(&self) -> bool {
        matches!(self, ProductCategory::RentalEquipment)
    }

    /// Whether products in this category are bought by quantity.
    pub fn is_purchasable(&self) -> bool {
        matches!(
            self,
            ProductCategory::OrganicProduce | ProductCategory::FruitsAndVegetables
        )
    }
}

impl From<String> for ProductCategory {
    fn from(name: String) -> Self {
        ProductCategory::from_name(&name)
    }
}

impl From<ProductCategory> for String {
    fn from(category: ProductCategory) -> Self {
        category.display_name().to_string()
    }
}

impl fmt::Display for ProductCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

// =============================================================================
// Product
// =============================================================================

/// A product listed by a seller.
///
/// `price` is the display string the seller entered (daily rate for rental
/// equipment, unit price otherwise). It is parsed only when money is needed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: String,
    pub name: String,
    pub price: String,
    pub image: String,
    #[ts(type = "string")]
    pub category: ProductCategory,
    /// Units (or rentable machines) available right now.
    pub stock: i64,
    pub description: Option<String>,
    pub seller_id: Option<String>,
}

impl Product {
    /// Whether any stock is available.
    #[inline]
    pub fn in_stock(&self) -> bool {
        self.stock > 0
    }
}

// =============================================================================
// Rental Dates
// =============================================================================

/// Inclusive calendar date range of a rental booking. Time of day is not
/// part of the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct RentalDates {
    #[ts(type = "string")]
    pub from: NaiveDate,
    #[ts(type = "string")]
    pub to: NaiveDate,
}

// =============================================================================
// Session
// =============================================================================

/// Which side of the marketplace an account is on, chosen at sign-up.
///
/// Sellers list and manage products and read customer feedback. Only buyers
/// add to the cart or book rentals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum UserType {
    #[default]
    Buyer,
    Seller,
}

impl UserType {
    /// Stored form, as written to the `profiles` table and user metadata.
    pub fn as_str(&self) -> &'static str {
        match self {
            UserType::Buyer => "buyer",
            UserType::Seller => "seller",
        }
    }

    /// Parses the stored form. Unknown values are `None`.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "buyer" => Some(UserType::Buyer),
            "seller" => Some(UserType::Seller),
            _ => None,
        }
    }
}

impl fmt::Display for UserType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An authenticated storefront session.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSession {
    pub user_id: String,
    pub email: Option<String>,
    /// Bearer token for the hosted backend; `None` for offline sessions.
    pub access_token: Option<String>,
    /// Sessions persisted before accounts carried a type restore as buyers.
    #[serde(default)]
    pub user_type: UserType,
}

impl UserSession {
    #[inline]
    pub fn is_seller(&self) -> bool {
        self.user_type == UserType::Seller
    }
}

impl fmt::Debug for UserSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserSession")
            .field("user_id", &self.user_id)
            .field("email", &self.email)
            .field("access_token", &self.access_token.as_ref().map(|_| "<redacted>"))
            .field("user_type", &self.user_type)
            .finish()
    }
}

// =============================================================================
// Order Summary
// =============================================================================

/// One row of an invoice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct OrderLine {
    pub name: String,
    pub quantity: u32,
    /// Display price of the line (unit price, or booking total for rentals).
    pub price: String,
}

/// What the invoice e-mail carries. Built by checkout from the cart snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct OrderSummary {
    pub order_number: String,
    pub total_amount: String,
    pub items: Vec<OrderLine>,
}

// =============================================================================
// Feedback
// =============================================================================

/// A customer's rating of the storefront, left from the site footer.
///
/// Anyone may leave one; only sellers read them back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Feedback {
    pub id: String,
    pub user_id: Option<String>,
    pub user_email: Option<String>,
    pub feedback: String,
    /// Stars, 1 to 5.
    pub rating: u8,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
}

impl Feedback {
    /// Case-insensitive match on the text or the author's e-mail.
    pub fn matches(&self, query: &str) -> bool {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return true;
        }
        self.feedback.to_lowercase().contains(&query)
            || self
                .user_email
                .as_deref()
                .is_some_and(|email| email.to_lowercase().contains(&query))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_round_trip_names() {
        for name in ["Rental Equipment", "Organic Produce", "Fruits and Vegetables", "Seeds"] {
            assert_eq!(ProductCategory::from_name(name).display_name(), name);
        }
    }

    #[test]
    fn test_category_kinds() {
        assert!(ProductCategory::RentalEquipment.is_rental());
        assert!(!ProductCategory::RentalEquipment.is_purchasable());
        assert!(ProductCategory::OrganicProduce.is_purchasable());
        assert!(!ProductCategory::Other("Seeds".into()).is_purchasable());
    }

    #[test]
    fn test_category_serializes_as_name() {
        let json = serde_json::to_string(&ProductCategory::FruitsAndVegetables).unwrap();
        assert_eq!(json, "\"Fruits and Vegetables\"");
        let back: ProductCategory = serde_json::from_str("\"Rental Equipment\"").unwrap();
        assert_eq!(back, ProductCategory::RentalEquipment);
    }

    #[test]
    fn test_session_debug_redacts_token() {
        let session = UserSession {
            user_id: "u-1".into(),
            email: Some("farmer@example.com".into()),
            access_token: Some("secret-jwt".into()),
            user_type: UserType::Buyer,
        };
        let debug = format!("{session:?}");
        assert!(!debug.contains("secret-jwt"));
        assert!(debug.contains("<redacted>"));
    }

    #[test]
    fn test_session_without_type_restores_as_buyer() {
        let session: UserSession =
            serde_json::from_str(r#"{"userId":"u-1","email":null,"accessToken":null}"#).unwrap();
        assert_eq!(session.user_type, UserType::Buyer);
        assert!(!session.is_seller());
    }

    #[test]
    fn test_user_type_stored_form() {
        assert_eq!(UserType::parse("Seller"), Some(UserType::Seller));
        assert_eq!(UserType::parse("buyer"), Some(UserType::Buyer));
        assert_eq!(UserType::parse("admin"), None);
        assert_eq!(serde_json::to_string(&UserType::Seller).unwrap(), "\"seller\"");
    }

    #[test]
    fn test_feedback_search_matches_text_or_email() {
        let item = Feedback {
            id: "f-1".into(),
            user_id: None,
            user_email: Some("Ravi@Example.com".into()),
            feedback: "Fresh produce, prompt delivery".into(),
            rating: 5,
            created_at: Utc::now(),
        };
        assert!(item.matches("PROMPT"));
        assert!(item.matches("ravi@"));
        assert!(item.matches("  "));
        assert!(!item.matches("missing"));
    }
}
