//! Type-safe price representation using decimal arithmetic.

use core::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`Price`] from user input.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PriceError {
    /// The input is empty.
    #[error("price is required")]
    Empty,
    /// The input is not a decimal number.
    #[error("price must be a number, got {0:?}")]
    NotANumber(String),
    /// The amount is below zero.
    #[error("price cannot be negative")]
    Negative,
    /// More than two fractional digits.
    #[error("price can have at most 2 decimal places")]
    TooPrecise,
}

/// A non-negative amount in the shop's currency, with cent precision.
///
/// Maps to a `NUMERIC(10,2)` column. Never round-trips through floating point.
///
/// ```
/// use shopfront_core::Price;
///
/// let price = Price::parse("9.99").unwrap();
/// assert_eq!(price.to_string(), "$9.99");
/// assert_eq!(Price::parse("10").unwrap().to_string(), "$10.00");
/// assert!(Price::parse("-1").is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price(Decimal);

impl Price {
    /// Zero.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Parse a price from form input such as `"9.99"` or `"10"`.
    ///
    /// # Errors
    ///
    /// Returns a [`PriceError`] if the input is empty, not a number, negative,
    /// or has more than two decimal places.
    pub fn parse(input: &str) -> Result<Self, PriceError> {
        let s = input.trim().trim_start_matches('$');
        if s.is_empty() {
            return Err(PriceError::Empty);
        }
        let amount =
            Decimal::from_str(s).map_err(|_| PriceError::NotANumber(input.trim().to_owned()))?;
        Self::try_from(amount)
    }

    /// The underlying decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Price of `quantity` units.
    #[must_use]
    pub fn times(self, quantity: i32) -> Self {
        Self(self.0 * Decimal::from(quantity.max(0)))
    }
}

impl TryFrom<Decimal> for Price {
    type Error = PriceError;

    fn try_from(amount: Decimal) -> Result<Self, Self::Error> {
        if amount.is_zero() {
            return Ok(Self::ZERO);
        }
        if amount.is_sign_negative() {
            return Err(PriceError::Negative);
        }
        if amount.normalize().scale() > 2 {
            return Err(PriceError::TooPrecise);
        }
        Ok(Self(amount))
    }
}

impl FromStr for Price {
    type Err = PriceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${:.2}", self.0)
    }
}

impl core::iter::Sum for Price {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        Self(iter.map(|p| p.0).sum())
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for Price {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <Decimal as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <Decimal as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for Price {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        // CHECK (price >= 0) and NUMERIC(10,2) hold on the column
        <Decimal as sqlx::Decode<sqlx::Postgres>>::decode(value).map(Self)
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for Price {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <Decimal as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_decimal_and_integer() {
        assert_eq!(Price::parse("9.99").unwrap().amount(), Decimal::new(999, 2));
        assert_eq!(Price::parse("5").unwrap().amount(), Decimal::from(5));
        assert_eq!(Price::parse(" $12.50 ").unwrap().amount(), Decimal::new(1250, 2));
    }

    #[test]
    fn test_parse_zero() {
        assert_eq!(Price::parse("0").unwrap(), Price::ZERO);
        assert_eq!(Price::parse("-0").unwrap().to_string(), "$0.00");
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert_eq!(Price::parse(""), Err(PriceError::Empty));
        assert!(matches!(
            Price::parse("nine"),
            Err(PriceError::NotANumber(_))
        ));
    }

    #[test]
    fn test_parse_rejects_negative() {
        assert_eq!(Price::parse("-0.01"), Err(PriceError::Negative));
    }

    #[test]
    fn test_parse_rejects_sub_cent_precision() {
        assert_eq!(Price::parse("1.999"), Err(PriceError::TooPrecise));
        // Trailing zeros are not extra precision
        assert!(Price::parse("1.500").is_ok());
    }

    #[test]
    fn test_display_pads_cents() {
        assert_eq!(Price::parse("3.5").unwrap().to_string(), "$3.50");
    }

    #[test]
    fn test_times_and_sum() {
        let unit = Price::parse("2.25").unwrap();
        let total: Price = [unit.times(2), Price::parse("0.50").unwrap()]
            .into_iter()
            .sum();
        assert_eq!(total.to_string(), "$5.00");
    }
}
