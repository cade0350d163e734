//! # Rental Commands
//!
//! Quoting and booking rental equipment by date range.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Product page (rental equipment)                                       │
//! │                                                                         │
//! │  From [2024-01-01]  To [2024-01-03]      ──► quote_rental()            │
//! │                                                                         │
//! │  ₹100/day × 3 days = ₹300.00                                           │
//! │                                                                         │
//! │  [ Book now ]                            ──► book_rental()             │
//! │     cart line: price "₹300.00", quantity 1, rentalDates {from, to}     │
//! │                                                                         │
//! │  A missing date or `to < from` yields no quote and the button stays    │
//! │  disabled.                                                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::NaiveDate;
use serde::Serialize;
use tracing::debug;

use super::buyer_session;
use super::cart::{cart_response, AddToCartResponse};
use crate::error::ApiError;
use crate::AppContext;
use farmease_core::{format_price, Product, RentalQuote};

/// A quote as the product page shows it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RentalQuoteResponse {
    pub product_id: String,
    pub daily_rate: String,
    pub from: NaiveDate,
    pub to: NaiveDate,
    pub total_days: i64,
    pub total_price: String,
}

impl RentalQuoteResponse {
    fn new(product: &Product, quote: &RentalQuote) -> Self {
        RentalQuoteResponse {
            product_id: product.id.clone(),
            daily_rate: format_price(quote.daily_rate),
            from: quote.from,
            to: quote.to,
            total_days: quote.total_days,
            total_price: format_price(quote.total_price),
        }
    }
}

async fn quote(
    ctx: &AppContext,
    product_id: &str,
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
) -> Result<(Product, RentalQuote), ApiError> {
    let product = ctx
        .data
        .fetch_product(product_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Product", product_id))?;

    let quote = RentalQuote::for_product(&product, from, to)?;
    Ok((product, quote))
}

/// Prices a booking without touching the cart.
pub async fn quote_rental(
    ctx: &AppContext,
    product_id: &str,
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
) -> Result<RentalQuoteResponse, ApiError> {
    debug!(product_id = %product_id, ?from, ?to, "quote_rental command");

    let (product, quote) = quote(ctx, product_id, from, to).await?;
    Ok(RentalQuoteResponse::new(&product, &quote))
}

/// Books the equipment for the range: the cart gets one line whose price
/// is the booking total. Booking the same equipment again replaces the
/// previous dates.
///
/// Signed-out visitors get `LoginRequired` before the dates are looked at;
/// seller accounts are refused.
pub async fn book_rental(
    ctx: &AppContext,
    product_id: &str,
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
) -> Result<AddToCartResponse, ApiError> {
    debug!(product_id = %product_id, ?from, ?to, "book_rental command");

    if buyer_session(ctx, "book rentals").await?.is_none() {
        return Ok(AddToCartResponse::login_required(ctx).await);
    }

    let (product, quote) = quote(ctx, product_id, from, to).await?;
    let outcome = ctx.cart.add_item(quote.into_line_item(&product)).await?;

    Ok(AddToCartResponse {
        outcome,
        cart: cart_response(ctx).await,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::cart::add_to_cart;
    use crate::commands::test_support::{context, seller_context};
    use crate::error::ErrorCode;
    use crate::state::AddOutcome;

    fn day(d: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(2024, 1, d)
    }

    #[tokio::test]
    async fn test_quote_three_days() {
        let (ctx, _) = context(false).await;

        let quote = quote_rental(&ctx, "mini-tractor", day(1), day(3)).await.unwrap();
        assert_eq!(quote.total_days, 3);
        assert_eq!(quote.total_price, "₹300.00");
        assert_eq!(quote.daily_rate, "₹100.00");
    }

    #[tokio::test]
    async fn test_no_quote_for_bad_range() {
        let (ctx, _) = context(false).await;

        let err = quote_rental(&ctx, "mini-tractor", day(3), day(1)).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);

        let err = quote_rental(&ctx, "mini-tractor", day(1), None).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);

        let err = quote_rental(&ctx, "tomatoes", day(1), day(2)).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::BusinessLogic);
    }

    #[tokio::test]
    async fn test_booking_total_is_not_multiplied_again() {
        let (ctx, _) = context(true).await;

        let booked = book_rental(&ctx, "mini-tractor", day(1), day(3)).await.unwrap();
        assert_eq!(booked.outcome, AddOutcome::Added);
        add_to_cart(&ctx, "tomatoes", 2).await.unwrap();

        let cart = ctx.cart.snapshot().await;
        let line = cart.get("mini-tractor").unwrap();
        assert_eq!(line.price(), "₹300.00");
        assert_eq!(line.quantity(), 1);
        // 300.00 + 2 × 45.50
        assert_eq!(ctx.cart.total().await.minor(), 39_100);
    }

    #[tokio::test]
    async fn test_rebooking_replaces_dates() {
        let (ctx, _) = context(true).await;

        book_rental(&ctx, "mini-tractor", day(1), day(3)).await.unwrap();
        let rebooked = book_rental(&ctx, "mini-tractor", day(10), day(11)).await.unwrap();
        assert_eq!(rebooked.outcome, AddOutcome::Replaced);

        let cart = ctx.cart.snapshot().await;
        assert_eq!(cart.len(), 1);
        let line = cart.get("mini-tractor").unwrap();
        assert_eq!(line.price(), "₹200.00");
        assert_eq!(line.rental_dates().unwrap().from, day(10).unwrap());
    }

    #[tokio::test]
    async fn test_booking_requires_session() {
        let (ctx, _) = context(false).await;

        let response = book_rental(&ctx, "mini-tractor", day(1), day(3)).await.unwrap();
        assert_eq!(response.outcome, AddOutcome::LoginRequired);
        assert!(ctx.cart.is_empty().await);
    }

    #[tokio::test]
    async fn test_signed_out_booking_skips_date_checks() {
        let (ctx, _) = context(false).await;

        let response = book_rental(&ctx, "mini-tractor", day(3), day(1)).await.unwrap();
        assert_eq!(response.outcome, AddOutcome::LoginRequired);
    }

    #[tokio::test]
    async fn test_seller_cannot_book() {
        let ctx = seller_context().await;

        let err = book_rental(&ctx, "mini-tractor", day(1), day(3)).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::Forbidden);

        // quoting stays open to everyone
        assert!(quote_rental(&ctx, "mini-tractor", day(1), day(3)).await.is_ok());
    }

    #[tokio::test]
    async fn test_sold_out_equipment_cannot_be_quoted_or_booked() {
        let (ctx, _) = context(true).await;
        ctx.db.products().set_stock("mini-tractor", 0).await.unwrap();

        let err = quote_rental(&ctx, "mini-tractor", day(1), day(3)).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::InsufficientStock);

        let err = book_rental(&ctx, "mini-tractor", day(1), day(3)).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::InsufficientStock);
        assert!(ctx.cart.is_empty().await);
    }

    #[tokio::test]
    async fn test_overflowing_rental_total_is_refused() {
        let (ctx, _) = context(true).await;
        let far = NaiveDate::from_ymd_opt(200_000, 1, 1);

        // ₹100/day is safe for any calendar range, so raise the rate first
        let mut tractor = ctx.db.products().get_by_id("mini-tractor").await.unwrap().unwrap();
        tractor.price = "₹1000000000000".to_string();
        ctx.db.products().update(&tractor).await.unwrap();

        let err = quote_rental(&ctx, "mini-tractor", day(1), far).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert!(err.message.contains("too large"));
    }
}
