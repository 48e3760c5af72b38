//! Monetary amounts in the smallest currency unit.

use core::iter::Sum;
use core::ops::{Add, AddAssign};

use serde::{Deserialize, Serialize};

use crate::value_object::ValueObject;

/// Basis points in one whole (100%).
const BPS_PER_WHOLE: u128 = 10_000;

/// An amount of money in cents.
///
/// Integer-only so that totals are exactly reproducible by re-summation.
/// Arithmetic saturates instead of wrapping or panicking.
#[derive(
    Debug, Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Money(u64);

impl Money {
    pub const ZERO: Money = Money(0);

    pub const fn from_cents(cents: u64) -> Self {
        Self(cents)
    }

    pub const fn cents(self) -> u64 {
        self.0
    }

    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Unit price times a quantity.
    pub fn times(self, quantity: u32) -> Money {
        Money(self.0.saturating_mul(u64::from(quantity)))
    }

    /// Apply a rate expressed in basis points (1000 = 10%), rounding half-up to the cent.
    pub fn basis_points(self, bps: u32) -> Money {
        let scaled = u128::from(self.0) * u128::from(bps) + BPS_PER_WHOLE / 2;
        let cents = scaled / BPS_PER_WHOLE;
        Money(u64::try_from(cents).unwrap_or(u64::MAX))
    }
}

impl ValueObject for Money {}

impl Add for Money {
    type Output = Money;

    fn add(self, rhs: Money) -> Money {
        Money(self.0.saturating_add(rhs.0))
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Money) {
        *self = *self + rhs;
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::ZERO, Add::add)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

impl core::fmt::Display for Money {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "${}.{:02}", self.0 / 100, self.0 % 100)
    }
}
