//! Monetary amounts using decimal arithmetic.
//!
//! The store operates in a single currency (INR). Amounts are held as
//! `rust_decimal::Decimal` in the currency's standard unit (rupees); the
//! payment gateway requires integer subunits (paise), so conversion happens
//! only at that boundary.

use std::iter::Sum;
use std::ops::{Add, AddAssign};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A monetary amount in the store currency.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
#[serde(transparent)]
pub struct Money(Decimal);

impl Money {
    /// Zero amount.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create a money value from a decimal amount.
    #[must_use]
    pub const fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// The underlying decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Line total for `quantity` units at this unit price.
    #[must_use]
    pub fn times(&self, quantity: u32) -> Self {
        Self(self.0 * Decimal::from(quantity))
    }

    /// Convert to integer subunits (paise) for the payment gateway.
    ///
    /// Rounds half-up to the nearest paisa. Returns `None` if the amount
    /// does not fit in an `i64` of subunits.
    #[must_use]
    pub fn to_subunits(&self) -> Option<i64> {
        use rust_decimal::prelude::ToPrimitive;
        let paise = (self.0 * Decimal::ONE_HUNDRED).round();
        paise.to_i64()
    }

    /// Whether the amount is negative.
    #[must_use]
    pub fn is_negative(&self) -> bool {
        self.0.is_sign_negative() && !self.0.is_zero()
    }
}

impl From<Decimal> for Money {
    fn from(amount: Decimal) -> Self {
        Self(amount)
    }
}

impl From<Money> for Decimal {
    fn from(money: Money) -> Self {
        money.0
    }
}

impl Add for Money {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl std::fmt::Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rupees(n: i64) -> Money {
        Money::new(Decimal::from(n))
    }

    #[test]
    fn test_times_multiplies_by_quantity() {
        assert_eq!(rupees(1000).times(3), rupees(3000));
        assert_eq!(rupees(250).times(0), Money::ZERO);
    }

    #[test]
    fn test_sum_over_lines() {
        let total: Money = [rupees(100), rupees(200), rupees(50)].into_iter().sum();
        assert_eq!(total, rupees(350));
    }

    #[test]
    fn test_to_subunits_converts_rupees_to_paise() {
        assert_eq!(rupees(1499).to_subunits(), Some(149_900));
        assert_eq!(
            Money::new(Decimal::new(99950, 2)).to_subunits(),
            Some(99_950)
        );
        assert_eq!(Money::ZERO.to_subunits(), Some(0));
    }

    #[test]
    fn test_display_two_decimal_places() {
        assert_eq!(rupees(1000).to_string(), "1000.00");
        assert_eq!(Money::new(Decimal::new(12345, 2)).to_string(), "123.45");
    }
}
