//! Pricing

use rust_decimal::{Decimal, RoundingStrategy, prelude::ToPrimitive};
use rusty_money::{Money, iso::Currency};
use thiserror::Error;

/// Currency every storefront price is quoted in.
pub const STORE_CURRENCY: &Currency = rusty_money::iso::VND;

/// Shown instead of a price when the catalog has none.
pub const CONTACT_US: &str = "Contact us";

/// Errors raised while converting prices.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PriceError {
    /// The amount does not fit into the currency's minor units.
    #[error("price {0} cannot be represented in minor units")]
    Overflow(Decimal),

    /// Prices must not be negative.
    #[error("price {0} is negative")]
    Negative(Decimal),
}

/// A price split into what is displayed prominently and what is struck through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayPrice {
    /// Price the shopper pays.
    pub primary: Option<Decimal>,

    /// Former price, present only while a sale price applies.
    pub struck: Option<Decimal>,
}

/// Whether `price` is present and not negative.
pub fn is_valid_price(price: Option<Decimal>) -> bool {
    price.is_some_and(|price| price >= Decimal::ZERO)
}

/// Format a price in the store currency, or [`CONTACT_US`] when there is none.
pub fn format_price(price: Option<Decimal>) -> String {
    let Some(amount) = price else {
        return CONTACT_US.to_string();
    };

    match to_minor_units(amount, STORE_CURRENCY) {
        Ok(minor) => format!("{}", Money::from_minor(minor, STORE_CURRENCY)),
        Err(_overflow) => format!("{amount} {}", STORE_CURRENCY.iso_alpha_code),
    }
}

/// Convert a major-unit amount into the currency's minor units, rounding half away from zero.
///
/// # Errors
///
/// Returns [`PriceError::Overflow`] when the scaled amount does not fit in an `i64`.
pub fn to_minor_units(amount: Decimal, currency: &Currency) -> Result<i64, PriceError> {
    let scale = 10_i64
        .checked_pow(currency.exponent)
        .ok_or(PriceError::Overflow(amount))?;

    amount
        .checked_mul(Decimal::from(scale))
        .ok_or(PriceError::Overflow(amount))?
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
        .ok_or(PriceError::Overflow(amount))
}

/// Percentage saved by paying `sale_price` instead of `final_price`, rounded to a whole number.
///
/// Returns 0 when either price is missing or `final_price` is zero.
pub fn calculate_discount(sale_price: Option<Decimal>, final_price: Option<Decimal>) -> i64 {
    let (Some(sale), Some(list)) = (sale_price, final_price) else {
        return 0;
    };

    if list.is_zero() {
        return 0;
    }

    (list - sale)
        .checked_div(list)
        .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
        .map(|percent| percent.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero))
        .and_then(|percent| percent.to_i64())
        .unwrap_or(0)
}

/// The unit price a shopper pays: the sale price when it is valid and non-zero, otherwise the
/// final price.
pub fn effective_price(sale_price: Option<Decimal>, final_price: Option<Decimal>) -> Option<Decimal> {
    match sale_price {
        Some(sale) if is_valid_price(Some(sale)) && !sale.is_zero() => Some(sale),
        _ => final_price,
    }
}

/// Split a variation's prices into the prominent and struck-through parts.
pub fn display_price(sale_price: Option<Decimal>, final_price: Option<Decimal>) -> DisplayPrice {
    match sale_price {
        Some(sale) if is_valid_price(Some(sale)) && !sale.is_zero() => DisplayPrice {
            primary: Some(sale),
            struck: final_price,
        },
        _ => DisplayPrice {
            primary: final_price,
            struck: None,
        },
    }
}
