//! Value object trait: equality by value, not identity.
//!
//! Value objects have **no identity**: two values with the same attributes
//! are the same value. `Money` is the one the storefront leans on.

use core::iter::Sum;
use core::ops::{Add, Mul};

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{DomainError, DomainResult};

/// Marker trait for value objects.
///
/// Value objects are immutable and compared by their attribute values. To
/// "modify" one, build a new one.
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}

/// Display prefix for Saudi riyal amounts.
pub const CURRENCY_SYMBOL: &str = "ر.س";

/// A non-negative amount of Saudi riyal.
///
/// Decimal arithmetic keeps boundary checks such as "subtotal ≥ 100" exact.
/// Serialized as a plain JSON number so persisted carts stay readable by the
/// storefront scripts that wrote them. Deserializing goes through
/// [`Money::new`], so a negative amount on disk is an error.
/// Arithmetic saturates at `Decimal::MAX` instead of overflowing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Money(#[serde(with = "rust_decimal::serde::float")] Decimal);

impl ValueObject for Money {}

impl Money {
    pub const ZERO: Money = Money(Decimal::ZERO);

    /// Build an amount, rejecting negative values.
    pub fn new(amount: Decimal) -> DomainResult<Self> {
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(DomainError::validation("money amount cannot be negative"));
        }
        Ok(Self(amount))
    }

    /// Whole riyal amount (e.g. `Money::riyals(15)`).
    pub fn riyals(amount: u32) -> Self {
        Self(Decimal::from(amount))
    }

    /// Amount in halalas (1/100 riyal), e.g. `Money::halalas(9999)` is 99.99.
    pub fn halalas(amount: u64) -> Self {
        Self(Decimal::from(amount) / Decimal::ONE_HUNDRED)
    }

    pub fn amount(&self) -> Decimal {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let amount = rust_decimal::serde::float::deserialize(deserializer)?;
        Money::new(amount).map_err(serde::de::Error::custom)
    }
}

impl Add for Money {
    type Output = Money;

    fn add(self, rhs: Money) -> Money {
        Money(self.0.saturating_add(rhs.0))
    }
}

impl Mul<u32> for Money {
    type Output = Money;

    fn mul(self, rhs: u32) -> Money {
        Money(self.0.saturating_mul(Decimal::from(rhs)))
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::ZERO, Add::add)
    }
}

impl core::fmt::Display for Money {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{CURRENCY_SYMBOL} {:.2}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_amounts_are_rejected() {
        let err = Money::new(Decimal::new(-1, 2)).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
        assert!(Money::new(Decimal::ZERO).is_ok());
    }

    #[test]
    fn displays_with_two_decimals() {
        assert_eq!(Money::riyals(15).to_string(), "ر.س 15.00");
        assert_eq!(Money::halalas(9999).to_string(), "ر.س 99.99");
    }

    #[test]
    fn serializes_as_json_number() {
        let json = serde_json::to_string(&Money::halalas(1250)).unwrap();
        assert_eq!(json, "12.5");

        let back: Money = serde_json::from_str("45").unwrap();
        assert_eq!(back, Money::riyals(45));
    }

    #[test]
    fn negative_json_amount_does_not_deserialize() {
        assert!(serde_json::from_str::<Money>("-5").is_err());
        assert!(serde_json::from_str::<Money>("-0.01").is_err());
        assert_eq!(serde_json::from_str::<Money>("0").unwrap(), Money::ZERO);
    }

    #[test]
    fn arithmetic_saturates_instead_of_panicking() {
        let max = Money::new(Decimal::MAX).unwrap();
        assert_eq!(max * u32::MAX, max);
        assert_eq!(max + Money::riyals(1), max);
        let total: Money = [max, max].into_iter().sum();
        assert_eq!(total, max);
    }

    #[test]
    fn sums_and_multiplies_exactly() {
        let total: Money = [Money::halalas(3333), Money::halalas(3333), Money::halalas(3334)]
            .into_iter()
            .sum();
        assert_eq!(total, Money::riyals(100));
        assert_eq!(Money::halalas(1999) * 3, Money::halalas(5997));
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Property: halala amounts add and multiply without rounding.
            #[test]
            fn arithmetic_is_exact(a in 0u64..10_000_000, b in 0u64..10_000_000, n in 0u32..1_000) {
                prop_assert_eq!(Money::halalas(a) + Money::halalas(b), Money::halalas(a + b));
                prop_assert_eq!(Money::halalas(a) * n, Money::halalas(a * u64::from(n)));
            }
        }
    }
}
