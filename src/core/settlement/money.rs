use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};

use super::SettlementError;

const MINOR_UNITS_PER_MAJOR: i64 = 100;

/// Signed amount of money held as a whole number of minor units (cents).
///
/// Arithmetic never drifts; conversion to and from two-decimal major units
/// happens only at the edges (`from_major` / `as_major`). Serializes as a JSON
/// number in major units so `Money::from_cents(4000)` renders as `40.0`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Money(i64);

impl Money {
    pub const ZERO: Money = Money(0);

    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Converts a major-unit amount (e.g. `12.34`) into cents, rounding half
    /// away from zero to the nearest cent.
    pub fn from_major(amount: f64) -> Result<Self, SettlementError> {
        if !amount.is_finite() {
            return Err(SettlementError::NonFiniteAmount(amount));
        }
        let cents = (amount * MINOR_UNITS_PER_MAJOR as f64).round();
        if cents.abs() >= i64::MAX as f64 {
            return Err(SettlementError::AmountOutOfRange(amount));
        }
        Ok(Money(cents as i64))
    }

    pub const fn cents(self) -> i64 {
        self.0
    }

    pub fn as_major(self) -> f64 {
        self.0 as f64 / MINOR_UNITS_PER_MAJOR as f64
    }

    pub const fn abs(self) -> Self {
        Money(self.0.abs())
    }

    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }

    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        let per = MINOR_UNITS_PER_MAJOR as u64;
        write!(f, "{}{}.{:02}", sign, abs / per, abs % per)
    }
}

impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.as_major())
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let amount = f64::deserialize(deserializer)?;
        Money::from_major(amount).map_err(serde::de::Error::custom)
    }
}

impl Add for Money {
    type Output = Money;

    fn add(self, rhs: Money) -> Money {
        Money(self.0 + rhs.0)
    }
}

impl Sub for Money {
    type Output = Money;

    fn sub(self, rhs: Money) -> Money {
        Money(self.0 - rhs.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Money) {
        self.0 += rhs.0;
    }
}

impl SubAssign for Money {
    fn sub_assign(&mut self, rhs: Money) {
        self.0 -= rhs.0;
    }
}

impl Neg for Money {
    type Output = Money;

    fn neg(self) -> Money {
        Money(-self.0)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Money {
        iter.fold(Money::ZERO, Add::add)
    }
}
