//! Precision-safe price type.
//!
//! Uses `rust_decimal` for exact decimal arithmetic, avoiding
//! floating-point rounding errors in gap sizes, stop distances,
//! and P/L accumulation.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Div, Mul, Neg, Sub};
use std::str::FromStr;

/// Price in instrument points with exact decimal precision.
///
/// Differences between two prices are also expressed as `Price`
/// (a distance in points), so gap sizes and stop distances stay
/// in the same type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price(pub Decimal);

impl Price {
    pub const ZERO: Self = Self(Decimal::ZERO);
    pub const ONE: Self = Self(Decimal::ONE);

    #[inline]
    pub fn new(value: Decimal) -> Self {
        Self(value)
    }

    #[inline]
    pub fn inner(&self) -> Decimal {
        self.0
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    #[inline]
    pub fn is_positive(&self) -> bool {
        self.0.is_sign_positive() && !self.0.is_zero()
    }

    #[inline]
    pub fn is_negative(&self) -> bool {
        self.0.is_sign_negative() && !self.0.is_zero()
    }

    /// Absolute distance to another price, in points.
    #[inline]
    pub fn distance_to(&self, other: Price) -> Price {
        Self((self.0 - other.0).abs())
    }

    #[inline]
    pub fn abs(&self) -> Price {
        Self(self.0.abs())
    }

    #[inline]
    pub fn min(self, other: Price) -> Price {
        if self.0 <= other.0 {
            self
        } else {
            other
        }
    }

    #[inline]
    pub fn max(self, other: Price) -> Price {
        if self.0 >= other.0 {
            self
        } else {
            other
        }
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Price {
    type Err = rust_decimal::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.parse()?))
    }
}

impl From<Decimal> for Price {
    fn from(d: Decimal) -> Self {
        Self(d)
    }
}

impl Add for Price {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl Sub for Price {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}

impl Neg for Price {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Self(-self.0)
    }
}

impl Mul<Decimal> for Price {
    type Output = Self;

    fn mul(self, rhs: Decimal) -> Self::Output {
        Self(self.0 * rhs)
    }
}

impl Div<Decimal> for Price {
    type Output = Self;

    fn div(self, rhs: Decimal) -> Self::Output {
        Self(self.0 / rhs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_distance_is_symmetric() {
        let a = Price::new(dec!(14710));
        let b = Price::new(dec!(14715.5));
        assert_eq!(a.distance_to(b), Price::new(dec!(5.5)));
        assert_eq!(b.distance_to(a), Price::new(dec!(5.5)));
    }

    #[test]
    fn test_arithmetic() {
        let p = Price::new(dec!(100)) + Price::new(dec!(2.5)) - Price::new(dec!(0.5));
        assert_eq!(p, Price::new(dec!(102)));
        assert_eq!(p * dec!(2), Price::new(dec!(204)));
        assert_eq!(p / dec!(2), Price::new(dec!(51)));
    }

    #[test]
    fn test_sign_predicates() {
        assert!(Price::new(dec!(1)).is_positive());
        assert!(!Price::ZERO.is_positive());
        assert!((Price::ZERO - Price::ONE).is_negative());
    }

    #[test]
    fn test_parse() {
        let p: Price = "14685.50".parse().unwrap();
        assert_eq!(p, Price::new(dec!(14685.50)));
    }
}
