//! # Cart
//!
//! Line items and the cart aggregate.
//!
//! ## Two Kinds of Line
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  LineItem::Quantity                 LineItem::Rental                    │
//! │  ──────────────────                 ────────────────                    │
//! │  price    = UNIT price              price    = TOTAL booking cost       │
//! │  quantity = N (≥ 1)                 quantity = 1, always                │
//! │  total    = price × N               total    = price (days were        │
//! │                                                 multiplied at quote)   │
//! │                                                                         │
//! │  Adding an id already in the cart:                                     │
//! │  Quantity → quantities are summed   Rental → booking is replaced       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Invariants
//! - At most one line per product id
//! - Every quantity line has `quantity >= 1`; asking for less removes the line
//! - Prices stay display strings; unparseable prices contribute zero to totals
//!
//! ## Persistence Shape
//! The snapshot written to client storage is a JSON array of flat rows
//! (`id, name, price, image, quantity, category, rentalDates?`), the shape
//! the web storefront has always kept under its `cart` key. Rows are
//! validated into [`LineItem`]s on the way in.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::money::{parse_price, Money};
use crate::types::RentalDates;
use crate::validation::validate_quantity;

// =============================================================================
// Line Items
// =============================================================================

/// N units of a stocked product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct QuantityItem {
    pub id: String,
    pub name: String,
    /// Per-unit display price.
    pub price: String,
    pub image: String,
    pub category: String,
    pub quantity: u32,
}

/// One date-range booking of a piece of rental equipment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct RentalItem {
    pub id: String,
    pub name: String,
    /// Display price of the WHOLE booking (daily rate × inclusive days).
    pub price: String,
    pub image: String,
    pub category: String,
    pub rental_dates: RentalDates,
}

/// A row in the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum LineItem {
    Quantity(QuantityItem),
    Rental(RentalItem),
}

impl LineItem {
    pub fn id(&self) -> &str {
        match self {
            LineItem::Quantity(item) => &item.id,
            LineItem::Rental(item) => &item.id,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            LineItem::Quantity(item) => &item.name,
            LineItem::Rental(item) => &item.name,
        }
    }

    /// Display price: unit price for quantity lines, booking total for rentals.
    pub fn price(&self) -> &str {
        match self {
            LineItem::Quantity(item) => &item.price,
            LineItem::Rental(item) => &item.price,
        }
    }

    pub fn image(&self) -> &str {
        match self {
            LineItem::Quantity(item) => &item.image,
            LineItem::Rental(item) => &item.image,
        }
    }

    pub fn category(&self) -> &str {
        match self {
            LineItem::Quantity(item) => &item.category,
            LineItem::Rental(item) => &item.category,
        }
    }

    /// Units on this line. A rental booking always counts as one.
    pub fn quantity(&self) -> u32 {
        match self {
            LineItem::Quantity(item) => item.quantity,
            LineItem::Rental(_) => 1,
        }
    }

    pub fn rental_dates(&self) -> Option<&RentalDates> {
        match self {
            LineItem::Quantity(_) => None,
            LineItem::Rental(item) => Some(&item.rental_dates),
        }
    }

    /// Line total, or `None` when the display price is unparseable or
    /// `price × quantity` overflows.
    ///
    /// Rental prices are already booking totals and are never multiplied
    /// again here.
    pub fn line_total(&self) -> Option<Money> {
        let price = parse_price(self.price())?;
        match self {
            LineItem::Quantity(item) => price.checked_mul(i64::from(item.quantity)),
            LineItem::Rental(_) => Some(price),
        }
    }
}

// =============================================================================
// Events
// =============================================================================

/// What an add did to the cart, for the "Added to cart" / "Cart updated"
/// notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum CartEvent {
    /// A new line was appended.
    Added,
    /// An existing quantity line grew to `quantity`.
    QuantityUpdated { quantity: u32 },
    /// An existing line for the id was replaced (rental rebooking).
    Replaced,
}

/// Result of a quantity update request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum QuantityChange {
    Updated { quantity: u32 },
    Removed,
    /// No line with that id; nothing changed.
    NotInCart,
    /// The line is a rental booking whose quantity is fixed at one.
    FixedQuantity,
}

// =============================================================================
// Cart
// =============================================================================

/// The shopping cart: an ordered list of line items, unique by id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cart {
    items: Vec<LineItem>,
}

impl Cart {
    /// Creates a new empty cart.
    pub fn new() -> Self {
        Cart { items: Vec::new() }
    }

    /// Line items in insertion order.
    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    pub fn get(&self, id: &str) -> Option<&LineItem> {
        self.items.iter().find(|item| item.id() == id)
    }

    /// Product ids present in the cart, in cart order.
    pub fn ids(&self) -> Vec<String> {
        self.items.iter().map(|item| item.id().to_string()).collect()
    }

    /// Adds a line or merges it into the existing line for the same id.
    ///
    /// ## Behavior
    /// - Quantity line, id present as a quantity line: quantities are summed
    /// - Rental line, or a line whose kind differs from the one present:
    ///   the existing line is replaced in place
    /// - Otherwise the line is appended
    ///
    /// ```rust
    /// use farmease_core::cart::{Cart, CartEvent, LineItem, QuantityItem};
    ///
    /// let apples = |quantity| LineItem::Quantity(QuantityItem {
    ///     id: "apples".into(),
    ///     name: "Apples".into(),
    ///     price: "₹120".into(),
    ///     image: String::new(),
    ///     category: "Fruits and Vegetables".into(),
    ///     quantity,
    /// });
    ///
    /// let mut cart = Cart::new();
    /// assert_eq!(cart.add_item(apples(2)).unwrap(), CartEvent::Added);
    /// assert_eq!(
    ///     cart.add_item(apples(3)).unwrap(),
    ///     CartEvent::QuantityUpdated { quantity: 5 }
    /// );
    /// assert_eq!(cart.len(), 1);
    /// ```
    pub fn add_item(&mut self, item: LineItem) -> CoreResult<CartEvent> {
        if let LineItem::Quantity(new) = &item {
            validate_quantity(i64::from(new.quantity))?;
        }

        let Some(existing) = self.items.iter_mut().find(|i| i.id() == item.id()) else {
            self.items.push(item);
            return Ok(CartEvent::Added);
        };

        match (existing, item) {
            (LineItem::Quantity(current), LineItem::Quantity(new)) => {
                let quantity = current.quantity.checked_add(new.quantity).ok_or(
                    CoreError::QuantityTooLarge {
                        requested: i64::from(current.quantity) + i64::from(new.quantity),
                    },
                )?;
                current.quantity = quantity;
                Ok(CartEvent::QuantityUpdated { quantity })
            }
            (slot, replacement) => {
                *slot = replacement;
                Ok(CartEvent::Replaced)
            }
        }
    }

    /// Removes the line with `id`. Returns whether a line was removed;
    /// removing an absent id is not an error.
    pub fn remove_item(&mut self, id: &str) -> bool {
        let initial_len = self.items.len();
        self.items.retain(|item| item.id() != id);
        self.items.len() != initial_len
    }

    /// Sets the quantity of a line in place.
    ///
    /// `new_quantity <= 0` removes the line. No stock ceiling is applied
    /// here; callers reconcile against stock first.
    pub fn update_quantity(&mut self, id: &str, new_quantity: i64) -> CoreResult<QuantityChange> {
        if new_quantity <= 0 {
            return Ok(if self.remove_item(id) {
                QuantityChange::Removed
            } else {
                QuantityChange::NotInCart
            });
        }

        let quantity = u32::try_from(new_quantity).map_err(|_| CoreError::QuantityTooLarge {
            requested: new_quantity,
        })?;

        match self.items.iter_mut().find(|item| item.id() == id) {
            None => Ok(QuantityChange::NotInCart),
            Some(LineItem::Rental(_)) => Ok(QuantityChange::FixedQuantity),
            Some(LineItem::Quantity(item)) => {
                item.quantity = quantity;
                Ok(QuantityChange::Updated { quantity })
            }
        }
    }

    /// Empties the cart.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Number of distinct lines.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Sum of quantities over all lines.
    pub fn total_item_count(&self) -> u64 {
        self.items.iter().map(|item| u64::from(item.quantity())).sum()
    }

    /// Grand total. Lines with unparseable prices contribute zero.
    pub fn total(&self) -> Money {
        self.priced_sum().0
    }

    /// Totals summary, including the ids whose price could not be parsed so
    /// the caller can log them.
    pub fn totals(&self) -> CartTotals {
        let (total, unpriced) = self.priced_sum();

        CartTotals {
            line_count: self.len(),
            total_quantity: self.total_item_count(),
            total,
            unpriced,
        }
    }

    /// Sums line totals in cart order. A line that has no total, or whose
    /// total would push the sum past `i64`, is left out and reported.
    fn priced_sum(&self) -> (Money, Vec<String>) {
        let mut total = Money::zero();
        let mut unpriced = Vec::new();

        for item in &self.items {
            match item.line_total().and_then(|line| total.checked_add(line)) {
                Some(sum) => total = sum,
                None => unpriced.push(item.id().to_string()),
            }
        }

        (total, unpriced)
    }

    // -------------------------------------------------------------------------
    // Snapshot (de)serialization
    // -------------------------------------------------------------------------

    /// Serializes the cart into the persisted JSON snapshot.
    pub fn to_snapshot(&self) -> CoreResult<String> {
        let rows: Vec<StoredLineItem> = self.items.iter().map(StoredLineItem::from).collect();
        serde_json::to_string(&rows).map_err(|e| CoreError::CorruptSnapshot(e.to_string()))
    }

    /// Restores a cart from a persisted JSON snapshot.
    ///
    /// Any malformed row (bad JSON, non-positive quantity, duplicate id)
    /// rejects the whole snapshot.
    pub fn from_snapshot(snapshot: &str) -> CoreResult<Cart> {
        let rows: Vec<StoredLineItem> = serde_json::from_str(snapshot)
            .map_err(|e| CoreError::CorruptSnapshot(e.to_string()))?;

        let mut seen = HashSet::new();
        let mut items = Vec::with_capacity(rows.len());
        for row in rows {
            if !seen.insert(row.id.clone()) {
                return Err(CoreError::CorruptSnapshot(format!(
                    "duplicate line for product {}",
                    row.id
                )));
            }
            items.push(LineItem::try_from(row)?);
        }

        Ok(Cart { items })
    }
}

// =============================================================================
// Totals
// =============================================================================

/// Cart totals summary for UI responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CartTotals {
    pub line_count: usize,
    pub total_quantity: u64,
    pub total: Money,
    /// Ids of lines left out of `total`: the price did not parse or the
    /// amount overflowed.
    pub unpriced: Vec<String>,
}

// =============================================================================
// Persisted Row
// =============================================================================

/// Flat row as kept in client storage.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredLineItem {
    id: String,
    name: String,
    price: String,
    #[serde(default)]
    image: String,
    quantity: i64,
    #[serde(default)]
    category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    rental_dates: Option<RentalDates>,
}

impl From<&LineItem> for StoredLineItem {
    fn from(item: &LineItem) -> Self {
        StoredLineItem {
            id: item.id().to_string(),
            name: item.name().to_string(),
            price: item.price().to_string(),
            image: item.image().to_string(),
            quantity: i64::from(item.quantity()),
            category: item.category().to_string(),
            rental_dates: item.rental_dates().copied(),
        }
    }
}

impl TryFrom<StoredLineItem> for LineItem {
    type Error = CoreError;

    fn try_from(row: StoredLineItem) -> Result<Self, Self::Error> {
        if let Some(rental_dates) = row.rental_dates {
            return Ok(LineItem::Rental(RentalItem {
                id: row.id,
                name: row.name,
                price: row.price,
                image: row.image,
                category: row.category,
                rental_dates,
            }));
        }

        let quantity = u32::try_from(row.quantity)
            .ok()
            .filter(|quantity| *quantity >= 1)
            .ok_or_else(|| {
                CoreError::CorruptSnapshot(format!(
                    "line {} has invalid quantity {}",
                    row.id, row.quantity
                ))
            })?;

        Ok(LineItem::Quantity(QuantityItem {
            id: row.id,
            name: row.name,
            price: row.price,
            image: row.image,
            category: row.category,
            quantity,
        }))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn produce(id: &str, price: &str, quantity: u32) -> LineItem {
        LineItem::Quantity(QuantityItem {
            id: id.to_string(),
            name: format!("Product {id}"),
            price: price.to_string(),
            image: format!("https://img.example/{id}.jpg"),
            category: "Organic Produce".to_string(),
            quantity,
        })
    }

    fn rental(id: &str, total: &str, from: (i32, u32, u32), to: (i32, u32, u32)) -> LineItem {
        LineItem::Rental(RentalItem {
            id: id.to_string(),
            name: format!("Tractor {id}"),
            price: total.to_string(),
            image: String::new(),
            category: "Rental Equipment".to_string(),
            rental_dates: RentalDates {
                from: NaiveDate::from_ymd_opt(from.0, from.1, from.2).unwrap(),
                to: NaiveDate::from_ymd_opt(to.0, to.1, to.2).unwrap(),
            },
        })
    }

    #[test]
    fn test_repeated_adds_sum_quantities() {
        let mut cart = Cart::new();
        for quantity in [1, 4, 2, 7] {
            cart.add_item(produce("p-1", "₹10", quantity)).unwrap();
        }

        assert_eq!(cart.len(), 1);
        assert_eq!(cart.get("p-1").unwrap().quantity(), 14);
    }

    #[test]
    fn test_add_reports_events() {
        let mut cart = Cart::new();
        assert_eq!(cart.add_item(produce("a", "₹1", 1)).unwrap(), CartEvent::Added);
        assert_eq!(
            cart.add_item(produce("a", "₹1", 2)).unwrap(),
            CartEvent::QuantityUpdated { quantity: 3 }
        );
        assert_eq!(cart.add_item(produce("b", "₹1", 1)).unwrap(), CartEvent::Added);
        assert_eq!(cart.ids(), vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn test_add_zero_quantity_rejected() {
        let mut cart = Cart::new();
        assert!(matches!(
            cart.add_item(produce("a", "₹1", 0)),
            Err(CoreError::Validation(_))
        ));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_add_overflow_rejected() {
        let mut cart = Cart::new();
        cart.add_item(produce("a", "₹1", u32::MAX)).unwrap();
        assert!(matches!(
            cart.add_item(produce("a", "₹1", 1)),
            Err(CoreError::QuantityTooLarge { .. })
        ));
        assert_eq!(cart.get("a").unwrap().quantity(), u32::MAX);
    }

    #[test]
    fn test_rental_rebooking_replaces_line() {
        let mut cart = Cart::new();
        cart.add_item(rental("t-1", "₹300.00", (2024, 1, 1), (2024, 1, 3))).unwrap();
        let event = cart
            .add_item(rental("t-1", "₹500.00", (2024, 2, 1), (2024, 2, 5)))
            .unwrap();

        assert_eq!(event, CartEvent::Replaced);
        assert_eq!(cart.len(), 1);
        let line = cart.get("t-1").unwrap();
        assert_eq!(line.quantity(), 1);
        assert_eq!(line.price(), "₹500.00");
    }

    #[test]
    fn test_update_quantity_zero_and_negative_remove() {
        let mut cart = Cart::new();
        cart.add_item(produce("a", "₹1", 2)).unwrap();
        cart.add_item(produce("b", "₹1", 2)).unwrap();

        assert_eq!(cart.update_quantity("a", 0).unwrap(), QuantityChange::Removed);
        assert_eq!(cart.update_quantity("b", -3).unwrap(), QuantityChange::Removed);
        assert!(cart.is_empty());
        assert_eq!(cart.update_quantity("b", 0).unwrap(), QuantityChange::NotInCart);
    }

    #[test]
    fn test_update_quantity_replaces_in_place() {
        let mut cart = Cart::new();
        cart.add_item(produce("a", "₹1", 2)).unwrap();
        cart.add_item(produce("b", "₹1", 2)).unwrap();

        assert_eq!(
            cart.update_quantity("a", 9).unwrap(),
            QuantityChange::Updated { quantity: 9 }
        );
        assert_eq!(cart.items()[0].quantity(), 9);
        assert_eq!(cart.update_quantity("zzz", 4).unwrap(), QuantityChange::NotInCart);
    }

    #[test]
    fn test_update_quantity_on_rental_is_fixed() {
        let mut cart = Cart::new();
        cart.add_item(rental("t", "₹300", (2024, 1, 1), (2024, 1, 3))).unwrap();
        assert_eq!(cart.update_quantity("t", 4).unwrap(), QuantityChange::FixedQuantity);
        assert_eq!(cart.get("t").unwrap().quantity(), 1);
    }

    #[test]
    fn test_remove_absent_is_noop() {
        let mut cart = Cart::new();
        cart.add_item(produce("a", "₹1", 1)).unwrap();
        assert!(!cart.remove_item("missing"));
        assert!(cart.remove_item("a"));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_total_skips_unparseable_and_does_not_remultiply_rentals() {
        let mut cart = Cart::new();
        cart.add_item(produce("a", "₹45.99", 2)).unwrap();
        cart.add_item(produce("b", "price on request", 3)).unwrap();
        cart.add_item(rental("t", "₹300.00", (2024, 1, 1), (2024, 1, 3))).unwrap();

        assert_eq!(cart.total(), Money::from_minor(9198 + 30_000));
        assert_eq!(cart.total_item_count(), 6);

        let totals = cart.totals();
        assert_eq!(totals.line_count, 3);
        assert_eq!(totals.unpriced, vec!["b".to_string()]);
        assert_eq!(totals.total, cart.total());
    }

    #[test]
    fn test_overflowing_lines_count_as_unpriced() {
        let mut cart = Cart::new();
        cart.add_item(produce("a", "₹45.99", 2)).unwrap();
        cart.add_item(produce("huge", "₹50000000000000000", 2)).unwrap();
        assert_eq!(cart.get("huge").unwrap().line_total(), None);
        assert_eq!(cart.total(), Money::from_minor(9198));

        // each line fits on its own, their sum does not
        let mut cart = Cart::new();
        cart.add_item(produce("x", "₹50000000000000000", 1)).unwrap();
        cart.add_item(produce("y", "₹50000000000000000", 1)).unwrap();
        let totals = cart.totals();
        assert_eq!(totals.total, Money::from_minor(5_000_000_000_000_000_000));
        assert_eq!(totals.unpriced, vec!["y".to_string()]);
    }

    #[test]
    fn test_clear() {
        let mut cart = Cart::new();
        cart.add_item(produce("a", "₹1", 1)).unwrap();
        cart.clear();
        assert!(cart.is_empty());
        assert_eq!(cart.total(), Money::zero());
    }

    #[test]
    fn test_snapshot_round_trip_preserves_order_and_contents() {
        let mut cart = Cart::new();
        cart.add_item(produce("c", "₹3", 3)).unwrap();
        cart.add_item(rental("t", "₹300.00", (2024, 1, 1), (2024, 1, 3))).unwrap();
        cart.add_item(produce("a", "not a price", 1)).unwrap();

        let snapshot = cart.to_snapshot().unwrap();
        let restored = Cart::from_snapshot(&snapshot).unwrap();
        assert_eq!(restored, cart);
    }

    #[test]
    fn test_snapshot_uses_flat_rows() {
        let mut cart = Cart::new();
        cart.add_item(rental("t", "₹300.00", (2024, 1, 1), (2024, 1, 3))).unwrap();
        let value: serde_json::Value = serde_json::from_str(&cart.to_snapshot().unwrap()).unwrap();

        assert_eq!(value[0]["quantity"], 1);
        assert_eq!(value[0]["rentalDates"]["from"], "2024-01-01");
        assert_eq!(value[0]["rentalDates"]["to"], "2024-01-03");
    }

    #[test]
    fn test_corrupt_snapshots_rejected() {
        for corrupt in [
            "not json",
            "{\"id\":\"a\"}",
            r#"[{"id":"a","name":"A","price":"1","quantity":0}]"#,
            r#"[{"id":"a","name":"A","price":"1","quantity":1},{"id":"a","name":"A","price":"1","quantity":2}]"#,
        ] {
            assert!(
                matches!(Cart::from_snapshot(corrupt), Err(CoreError::CorruptSnapshot(_))),
                "accepted: {corrupt}"
            );
        }
    }

    #[test]
    fn test_snapshot_without_optional_fields_loads() {
        let cart =
            Cart::from_snapshot(r#"[{"id":"a","name":"A","price":"₹12","quantity":2}]"#).unwrap();
        assert_eq!(cart.total(), Money::from_minor(2400));
    }
}
