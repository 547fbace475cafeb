//! Monetary amounts in the smallest currency unit.

use serde::{Deserialize, Serialize};

/// Non-negative amount in the smallest currency unit (e.g., cents).
///
/// Arithmetic saturates instead of wrapping; prices never go negative.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(u64);

impl Money {
    pub const ZERO: Money = Money(0);

    pub fn from_cents(cents: u64) -> Self {
        Self(cents)
    }

    pub fn cents(self) -> u64 {
        self.0
    }

    /// Unit price multiplied by a quantity.
    pub fn times(self, quantity: u64) -> Self {
        Self(self.0.saturating_mul(quantity))
    }

    pub fn plus(self, other: Money) -> Self {
        Self(self.0.saturating_add(other.0))
    }

    /// `percent`% of this amount, rounded half-up to the nearest unit.
    pub fn percent_of(self, percent: u64) -> Self {
        let scaled = (self.0 as u128) * (percent as u128) + 50;
        Self(u64::try_from(scaled / 100).unwrap_or(u64::MAX))
    }
}

impl core::iter::Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::ZERO, Money::plus)
    }
}

impl core::fmt::Display for Money {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}.{:02}", self.0 / 100, self.0 % 100)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percent_of_rounds_half_up() {
        assert_eq!(Money::from_cents(2000).percent_of(90), Money::from_cents(1800));
        assert_eq!(Money::from_cents(5).percent_of(90), Money::from_cents(5));
        assert_eq!(Money::from_cents(1).percent_of(90), Money::from_cents(1));
        assert_eq!(Money::from_cents(999).percent_of(90), Money::from_cents(899));
    }

    #[test]
    fn times_and_sum_saturate() {
        assert_eq!(Money::from_cents(u64::MAX).times(2).cents(), u64::MAX);
        let total: Money = [Money::from_cents(150), Money::from_cents(250)].into_iter().sum();
        assert_eq!(total, Money::from_cents(400));
    }

    #[test]
    fn displays_with_two_decimals() {
        assert_eq!(Money::from_cents(1805).to_string(), "18.05");
        assert_eq!(Money::ZERO.to_string(), "0.00");
    }
}
