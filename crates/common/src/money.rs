use serde::{Deserialize, Serialize};

/// Monetary amount in minor units (haléř, 1/100 CZK).
///
/// Stored as an integer so that per-gram pricing never accumulates
/// floating point error.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Money(i64);

impl Money {
    /// Creates an amount from minor units.
    pub fn from_minor(minor: i64) -> Self {
        Self(minor)
    }

    /// Creates an amount from whole crowns.
    pub fn from_major(major: i64) -> Self {
        Self(major * 100)
    }

    pub fn zero() -> Self {
        Self(0)
    }

    /// Returns the amount in minor units.
    pub fn minor(&self) -> i64 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    pub fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Multiplies a per-unit price by a quantity (e.g. price per gram × grams).
    ///
    /// Returns `None` when the product does not fit.
    pub fn times(&self, quantity: i64) -> Option<Money> {
        self.0.checked_mul(quantity).map(Money)
    }

    /// Adds, returning `None` on overflow.
    pub fn checked_add(&self, other: Money) -> Option<Money> {
        self.0.checked_add(other.0).map(Money)
    }

    /// Adds, clamping at the largest representable amount.
    pub fn saturating_add(&self, other: Money) -> Money {
        Money(self.0.saturating_add(other.0))
    }

    /// Subtracts, clamping the result at zero.
    pub fn saturating_sub(&self, other: Money) -> Money {
        Money((self.0 - other.0).max(0))
    }

    /// Takes `percent` % of the amount, rounding half up.
    pub fn percent(&self, percent: u8) -> Money {
        Money((self.0 * i64::from(percent) + 50) / 100)
    }
}

impl std::fmt::Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.abs();
        write!(f, "{sign}{}.{:02} CZK", abs / 100, abs % 100)
    }
}

impl std::ops::Add for Money {
    type Output = Money;

    fn add(self, rhs: Self) -> Self::Output {
        Money(self.0 + rhs.0)
    }
}

impl std::ops::Sub for Money {
    type Output = Money;

    fn sub(self, rhs: Self) -> Self::Output {
        Money(self.0 - rhs.0)
    }
}

impl std::ops::AddAssign for Money {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl std::iter::Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_formats_crowns() {
        assert_eq!(Money::from_minor(123_456).to_string(), "1234.56 CZK");
        assert_eq!(Money::from_minor(5).to_string(), "0.05 CZK");
        assert_eq!(Money::from_minor(-250).to_string(), "-2.50 CZK");
    }

    #[test]
    fn per_gram_multiplication() {
        let per_gram = Money::from_minor(1_250);
        assert_eq!(per_gram.times(80), Some(Money::from_minor(100_000)));
    }

    #[test]
    fn multiplication_overflow_is_reported() {
        let per_gram = Money::from_minor(3_000);
        assert_eq!(per_gram.times(i64::MAX / 2), None);
        assert_eq!(Money::from_minor(i64::MAX).checked_add(Money::from_minor(1)), None);
    }

    #[test]
    fn saturating_sub_never_goes_negative() {
        let total = Money::from_major(100);
        assert_eq!(total.saturating_sub(Money::from_major(30)), Money::from_major(70));
        assert_eq!(total.saturating_sub(Money::from_major(300)), Money::zero());
    }

    #[test]
    fn percent_rounds_half_up() {
        assert_eq!(Money::from_minor(1_000).percent(10).minor(), 100);
        assert_eq!(Money::from_minor(999).percent(15).minor(), 150);
    }

    #[test]
    fn sums_an_iterator() {
        let total: Money = [100, 250, 650].into_iter().map(Money::from_minor).sum();
        assert_eq!(total, Money::from_minor(1_000));
    }
}
