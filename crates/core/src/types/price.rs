//! Decimal prices.
//!
//! Backend `numeric` columns arrive as JSON numbers or strings; both decode
//! into [`rust_decimal::Decimal`] so totals never go through floating point.

use core::fmt;
use core::iter::Sum;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// ISO 4217 currency codes the shop can price in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CurrencyCode {
    #[default]
    UAH,
    USD,
    EUR,
}

impl CurrencyCode {
    /// Display symbol for the currency.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::UAH => "₴",
            Self::USD => "$",
            Self::EUR => "€",
        }
    }
}

/// A price with currency information.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Price {
    /// Amount in the currency's standard unit (hryvnias, not kopecks).
    pub amount: Decimal,
    /// ISO 4217 currency code.
    pub currency_code: CurrencyCode,
}

impl Price {
    /// Create a new price.
    #[must_use]
    pub const fn new(amount: Decimal, currency_code: CurrencyCode) -> Self {
        Self {
            amount,
            currency_code,
        }
    }

    /// Create a price in the shop's default currency.
    #[must_use]
    pub fn uah(amount: Decimal) -> Self {
        Self::new(amount, CurrencyCode::UAH)
    }

    /// Price of `quantity` units.
    #[must_use]
    pub fn times(self, quantity: u32) -> Self {
        Self::new(self.amount * Decimal::from(quantity), self.currency_code)
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:.2} {}",
            self.amount.round_dp(2),
            self.currency_code.symbol()
        )
    }
}

impl Sum for Price {
    /// Sums amounts; the currency of the first price wins (the shop prices in
    /// a single currency).
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        let mut iter = iter.peekable();
        let currency_code = iter.peek().map(|p| p.currency_code).unwrap_or_default();
        let amount = iter.map(|p| p.amount).sum();
        Self::new(amount, currency_code)
    }
}
