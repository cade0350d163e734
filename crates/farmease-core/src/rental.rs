//! # Rental Pricing
//!
//! Quotes for date-range bookings of rental equipment.
//!
//! ## Billing Rule
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  daily rate "₹100"   from 2024-01-01   to 2024-01-03                   │
//! │                                                                         │
//! │  total_days  = (to - from) + 1 = 3       both endpoints are billed     │
//! │  total_price = ₹100.00 × 3     = ₹300.00                               │
//! │                                                                         │
//! │  Added to the cart as ONE line: price "₹300.00", quantity 1.          │
//! │  The cart never multiplies this price again.                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A quote is derived, never stored: it is recomputed whenever either date
//! or the product changes.

use chrono::NaiveDate;
use serde::Serialize;
use ts_rs::TS;

use crate::cart::{LineItem, RentalItem};
use crate::error::{CoreError, CoreResult, RentalError};
use crate::money::{format_price, parse_price, Money};
use crate::types::{Product, RentalDates};

/// A priced rental booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct RentalQuote {
    pub daily_rate: Money,
    #[ts(type = "string")]
    pub from: NaiveDate,
    #[ts(type = "string")]
    pub to: NaiveDate,
    pub total_days: i64,
    pub total_price: Money,
}

impl RentalQuote {
    /// Computes a quote from a display daily rate and two calendar dates.
    ///
    /// No quote is produced when either date is missing, when `to` is
    /// before `from`, when the rate has no numeric content, or when the
    /// booking total does not fit in money.
    ///
    /// ```rust
    /// use chrono::NaiveDate;
    /// use farmease_core::money::Money;
    /// use farmease_core::rental::RentalQuote;
    ///
    /// let from = NaiveDate::from_ymd_opt(2024, 1, 1);
    /// let to = NaiveDate::from_ymd_opt(2024, 1, 3);
    ///
    /// let quote = RentalQuote::compute("₹100", from, to).unwrap();
    /// assert_eq!(quote.total_days, 3);
    /// assert_eq!(quote.total_price, Money::from_minor(30_000));
    ///
    /// assert!(RentalQuote::compute("₹100", to, from).is_err());
    /// ```
    pub fn compute(
        daily_rate: &str,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<Self, RentalError> {
        let (Some(from), Some(to)) = (from, to) else {
            return Err(RentalError::MissingDates);
        };

        if to < from {
            return Err(RentalError::EndBeforeStart { from, to });
        }

        let rate =
            parse_price(daily_rate).ok_or_else(|| RentalError::UnparseableRate(daily_rate.to_string()))?;

        let total_days = (to - from).num_days() + 1;
        let total_price = rate
            .checked_mul(total_days)
            .ok_or(RentalError::TotalTooLarge { days: total_days })?;

        Ok(RentalQuote {
            daily_rate: rate,
            from,
            to,
            total_days,
            total_price,
        })
    }

    /// Quotes a booking of `product`, refusing products that are not rental
    /// equipment and equipment with no unit free to rent.
    pub fn for_product(
        product: &Product,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> CoreResult<Self> {
        if !product.category.is_rental() {
            return Err(CoreError::NotRentable {
                id: product.id.clone(),
            });
        }

        if !product.in_stock() {
            return Err(CoreError::OutOfStock {
                id: product.id.clone(),
            });
        }

        Ok(Self::compute(&product.price, from, to)?)
    }

    pub fn dates(&self) -> RentalDates {
        RentalDates {
            from: self.from,
            to: self.to,
        }
    }

    /// Turns the quote into the cart line for `product`: the formatted
    /// total becomes the line price.
    pub fn into_line_item(self, product: &Product) -> LineItem {
        LineItem::Rental(RentalItem {
            id: product.id.clone(),
            name: product.name.clone(),
            price: format_price(self.total_price),
            image: product.image.clone(),
            category: product.category.display_name().to_string(),
            rental_dates: self.dates(),
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cart::Cart;
    use crate::types::ProductCategory;

    fn date(y: i32, m: u32, d: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(y, m, d)
    }

    fn tractor(price: &str) -> Product {
        Product {
            id: "tractor-1".into(),
            name: "Mini Tractor".into(),
            price: price.into(),
            image: "tractor.jpg".into(),
            category: ProductCategory::RentalEquipment,
            stock: 2,
            description: None,
            seller_id: None,
        }
    }

    #[test]
    fn test_three_day_booking() {
        let quote = RentalQuote::compute("₹100", date(2024, 1, 1), date(2024, 1, 3)).unwrap();
        assert_eq!(quote.total_days, 3);
        assert_eq!(quote.daily_rate, Money::from_minor(10_000));
        assert_eq!(format_price(quote.total_price), "₹300.00");
    }

    #[test]
    fn test_same_day_is_one_day() {
        let quote = RentalQuote::compute("250.50", date(2024, 5, 5), date(2024, 5, 5)).unwrap();
        assert_eq!(quote.total_days, 1);
        assert_eq!(quote.total_price, Money::from_minor(25_050));
    }

    #[test]
    fn test_crosses_leap_day() {
        let quote = RentalQuote::compute("10", date(2024, 2, 28), date(2024, 3, 1)).unwrap();
        assert_eq!(quote.total_days, 3);
    }

    #[test]
    fn test_no_quote_cases() {
        assert_eq!(
            RentalQuote::compute("₹100", None, date(2024, 1, 3)),
            Err(RentalError::MissingDates)
        );
        assert_eq!(
            RentalQuote::compute("₹100", date(2024, 1, 1), None),
            Err(RentalError::MissingDates)
        );
        assert!(matches!(
            RentalQuote::compute("₹100", date(2024, 1, 3), date(2024, 1, 1)),
            Err(RentalError::EndBeforeStart { .. })
        ));
        assert!(matches!(
            RentalQuote::compute("on request", date(2024, 1, 1), date(2024, 1, 3)),
            Err(RentalError::UnparseableRate(_))
        ));
    }

    #[test]
    fn test_total_overflow_is_not_a_quote() {
        assert_eq!(
            RentalQuote::compute("₹1000000000000", date(2024, 1, 1), date(200_000, 1, 1)),
            Err(RentalError::TotalTooLarge {
                days: (NaiveDate::from_ymd_opt(200_000, 1, 1).unwrap()
                    - NaiveDate::from_ymd_opt(2024, 1, 1).unwrap())
                .num_days()
                    + 1
            })
        );
    }

    #[test]
    fn test_for_product_requires_free_unit() {
        let mut sold_out = tractor("₹100");
        sold_out.stock = 0;
        assert!(matches!(
            RentalQuote::for_product(&sold_out, date(2024, 1, 1), date(2024, 1, 2)),
            Err(CoreError::OutOfStock { .. })
        ));
    }

    #[test]
    fn test_for_product_requires_rental_category() {
        let mut produce = tractor("₹40");
        produce.category = ProductCategory::OrganicProduce;
        assert!(matches!(
            RentalQuote::for_product(&produce, date(2024, 1, 1), date(2024, 1, 2)),
            Err(CoreError::NotRentable { .. })
        ));
    }

    #[test]
    fn test_booked_line_is_not_remultiplied_by_cart() {
        let product = tractor("₹100");
        let quote = RentalQuote::for_product(&product, date(2024, 1, 1), date(2024, 1, 3)).unwrap();
        let line = quote.into_line_item(&product);

        assert_eq!(line.price(), "₹300.00");
        assert_eq!(line.quantity(), 1);
        assert_eq!(line.category(), "Rental Equipment");

        let mut cart = Cart::new();
        cart.add_item(line).unwrap();
        assert_eq!(cart.total(), Money::from_minor(30_000));
    }
}
