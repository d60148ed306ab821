//! Form-input validation for prices, stock counts and quantities.

use rust_decimal::Decimal;
use std::str::FromStr;
use thiserror::Error;

/// Malformed admin or shopper input. Recovered locally by re-prompting.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Invalid price format: use digits with up to 2 decimal places")]
    PriceFormat,
    #[error("Price must be positive")]
    PriceNotPositive,
    #[error("Price must not exceed {}", format_amount(MAX_UNIT_PRICE))]
    PriceTooLarge,
    #[error("Order total is too large")]
    TotalOverflow,
    #[error("Stock must be a non-negative whole number")]
    StockFormat,
    #[error("Quantity must be a positive whole number")]
    QuantityFormat,
    #[error("Name must not be empty")]
    EmptyName,
    #[error("Reason must not be empty")]
    EmptyReason,
}

/// Highest accepted unit price. Keeps a full-stock line total and the
/// revenue sums far from `Decimal::MAX`.
pub const MAX_UNIT_PRICE: Decimal = Decimal::from_parts(1_000_000_000, 0, 0, false, 0);

/// Parses a unit price such as `10`, `10.5` or `10,99`.
pub fn parse_price(input: &str) -> Result<Decimal, ValidationError> {
    let normalized = input.trim().replace(',', ".");
    let (whole, fraction) = match normalized.split_once('.') {
        Some((whole, fraction)) => (whole, Some(fraction)),
        None => (normalized.as_str(), None),
    };

    let digits = |s: &str| !s.is_empty() && s.chars().all(|c| c.is_ascii_digit());
    let well_formed =
        digits(whole) && fraction.map_or(true, |f| f.len() <= 2 && digits(f));
    if !well_formed {
        return Err(ValidationError::PriceFormat);
    }

    let price = Decimal::from_str(&normalized).map_err(|_| ValidationError::PriceFormat)?;
    if price <= Decimal::ZERO {
        return Err(ValidationError::PriceNotPositive);
    }
    if price > MAX_UNIT_PRICE {
        return Err(ValidationError::PriceTooLarge);
    }
    Ok(price)
}

pub fn parse_stock(input: &str) -> Result<u32, ValidationError> {
    let trimmed = input.trim();
    if trimmed.is_empty() || !trimmed.chars().all(|c| c.is_ascii_digit()) {
        return Err(ValidationError::StockFormat);
    }
    trimmed.parse().map_err(|_| ValidationError::StockFormat)
}

pub fn parse_quantity(input: &str) -> Result<u32, ValidationError> {
    match input.trim().parse::<u32>() {
        Ok(quantity) if quantity > 0 => Ok(quantity),
        _ => Err(ValidationError::QuantityFormat),
    }
}

/// `unit_price × quantity`, or `TotalOverflow` when it does not fit.
pub fn line_total(unit_price: Decimal, quantity: u32) -> Result<Decimal, ValidationError> {
    unit_price
        .checked_mul(Decimal::from(quantity))
        .ok_or(ValidationError::TotalOverflow)
}

pub fn format_amount(amount: Decimal) -> String {
    format!("R${:.2}", amount)
}
