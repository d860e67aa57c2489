//! The [`Rational`] value type.

use crate::error::{ConversionError, Result};
use num_bigint::BigInt;
use num_integer::Integer;
use num_rational::BigRational;
use num_traits::{One, Signed, ToPrimitive, Zero};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, Mul, Neg, Sub};
use std::str::FromStr;

/// An exact fraction with arbitrary-precision numerator and denominator.
///
/// Always stored in lowest terms with a positive denominator, so derived
/// equality and hashing are structural. Values are immutable; every
/// operation returns a new value.
///
/// # Examples
///
/// ```
/// use u_unitconv::rational::Rational;
///
/// let foot = Rational::new(3048, 10_000).unwrap();
/// assert_eq!(foot.to_string(), "381/1250");
///
/// let twelve_feet = &foot * &Rational::from_integer(12);
/// assert_eq!(twelve_feet.to_string(), "2286/625");
/// ```
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Rational(BigRational);

impl Rational {
    /// The value 0.
    pub fn zero() -> Self {
        Self(BigRational::zero())
    }

    /// The value 1.
    pub fn one() -> Self {
        Self(BigRational::one())
    }

    /// Creates an integral value.
    pub fn from_integer(value: impl Into<BigInt>) -> Self {
        Self(BigRational::from_integer(value.into()))
    }

    /// Creates `numerator / denominator`, reduced to lowest terms.
    ///
    /// Fails with [`ConversionError::DivisionByZero`] for a zero denominator.
    pub fn new(numerator: impl Into<BigInt>, denominator: impl Into<BigInt>) -> Result<Self> {
        let denominator = denominator.into();
        if denominator.is_zero() {
            return Err(ConversionError::DivisionByZero);
        }
        Ok(Self(BigRational::new(numerator.into(), denominator)))
    }

    /// Creates the exact value of a float's binary representation.
    ///
    /// `0.1` becomes `3602879701896397/36028797018963968`, not `1/10`: the
    /// conversion never goes through the rounded decimal printout.
    pub fn from_f64(value: f64) -> Result<Self> {
        BigRational::from_float(value)
            .map(Self)
            .ok_or_else(|| ConversionError::NonFiniteValue {
                value: value.to_string(),
            })
    }

    /// Exact power of ten, `10^exponent`.
    pub fn pow10(exponent: i32) -> Self {
        let magnitude = BigInt::from(10u32).pow(exponent.unsigned_abs());
        if exponent >= 0 {
            Self(BigRational::from_integer(magnitude))
        } else {
            Self(BigRational::new(BigInt::one(), magnitude))
        }
    }

    /// The reduced numerator (carries the sign).
    pub fn numerator(&self) -> &BigInt {
        self.0.numer()
    }

    /// The reduced denominator (always positive).
    pub fn denominator(&self) -> &BigInt {
        self.0.denom()
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    pub fn is_negative(&self) -> bool {
        self.0.is_negative()
    }

    pub fn is_integer(&self) -> bool {
        self.0.is_integer()
    }

    pub fn abs(&self) -> Self {
        Self(self.0.abs())
    }

    /// Largest integer not greater than this value.
    pub fn floor(&self) -> Self {
        Self(self.0.floor())
    }

    /// Smallest integer not less than this value.
    pub fn ceil(&self) -> Self {
        Self(self.0.ceil())
    }

    /// `self / other`, failing on a zero divisor.
    pub fn checked_div(&self, other: &Rational) -> Result<Self> {
        if other.is_zero() {
            return Err(ConversionError::DivisionByZero);
        }
        Ok(Self(&self.0 / &other.0))
    }

    /// `1 / self`, failing on zero.
    pub fn reciprocal(&self) -> Result<Self> {
        if self.is_zero() {
            return Err(ConversionError::DivisionByZero);
        }
        Ok(Self(self.0.recip()))
    }

    /// Integer power. Negative exponents of zero fail.
    pub fn pow(&self, exponent: i32) -> Result<Self> {
        let magnitude = exponent.unsigned_abs();
        let raised = Self(BigRational::new(
            self.0.numer().pow(magnitude),
            self.0.denom().pow(magnitude),
        ));
        if exponent < 0 {
            raised.reciprocal()
        } else {
            Ok(raised)
        }
    }

    /// Lossy conversion to `f64`, for boundary use only.
    pub fn to_f64(&self) -> f64 {
        self.0.to_f64().unwrap_or(f64::NAN)
    }

    /// Lossy decimal rendering with at most `max_fraction_digits` digits
    /// after the point, rounding half away from zero and trimming trailing
    /// zeros.
    ///
    /// ```
    /// use u_unitconv::rational::Rational;
    ///
    /// let third = Rational::new(1, 3).unwrap();
    /// assert_eq!(third.to_decimal_string(4), "0.3333");
    /// assert_eq!(Rational::new(-1, 8).unwrap().to_decimal_string(2), "-0.13");
    /// ```
    pub fn to_decimal_string(&self, max_fraction_digits: usize) -> String {
        let scale = BigInt::from(10u32).pow(max_fraction_digits as u32);
        let scaled_numerator = self.0.numer().abs() * &scale;
        let denominator = self.0.denom();
        let (mut quotient, remainder) = scaled_numerator.div_rem(denominator);
        if remainder * 2 >= *denominator {
            quotient += 1;
        }

        let mut digits = quotient.to_string();
        if digits.len() <= max_fraction_digits {
            let padding = "0".repeat(max_fraction_digits + 1 - digits.len());
            digits.insert_str(0, &padding);
        }
        let split = digits.len() - max_fraction_digits;
        let (integer_part, fraction_part) = digits.split_at(split);
        let fraction_part = fraction_part.trim_end_matches('0');

        let sign = if self.is_negative() && !quotient.is_zero() {
            "-"
        } else {
            ""
        };
        if fraction_part.is_empty() {
            format!("{sign}{integer_part}")
        } else {
            format!("{sign}{integer_part}.{fraction_part}")
        }
    }
}

impl Default for Rational {
    fn default() -> Self {
        Self::zero()
    }
}

impl fmt::Display for Rational {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.denom().is_one() {
            write!(f, "{}", self.0.numer())
        } else {
            write!(f, "{}/{}", self.0.numer(), self.0.denom())
        }
    }
}

impl fmt::Debug for Rational {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Rational({self})")
    }
}

impl FromStr for Rational {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self> {
        super::RationalParser::new().parse(s)
    }
}

impl From<i64> for Rational {
    fn from(value: i64) -> Self {
        Self::from_integer(value)
    }
}

impl From<i32> for Rational {
    fn from(value: i32) -> Self {
        Self::from_integer(value)
    }
}

impl From<u32> for Rational {
    fn from(value: u32) -> Self {
        Self::from_integer(value)
    }
}

impl From<BigInt> for Rational {
    fn from(value: BigInt) -> Self {
        Self::from_integer(value)
    }
}

macro_rules! forward_binop {
    ($imp:ident, $method:ident) => {
        impl $imp for Rational {
            type Output = Rational;

            fn $method(self, rhs: Rational) -> Rational {
                Rational(self.0.$method(rhs.0))
            }
        }

        impl<'a> $imp<&'a Rational> for Rational {
            type Output = Rational;

            fn $method(self, rhs: &'a Rational) -> Rational {
                Rational(self.0.$method(&rhs.0))
            }
        }

        impl<'a> $imp<&'a Rational> for &'a Rational {
            type Output = Rational;

            fn $method(self, rhs: &'a Rational) -> Rational {
                Rational((&self.0).$method(&rhs.0))
            }
        }
    };
}

forward_binop!(Add, add);
forward_binop!(Sub, sub);
forward_binop!(Mul, mul);

impl Neg for Rational {
    type Output = Rational;

    fn neg(self) -> Rational {
        Rational(-self.0)
    }
}

impl Neg for &Rational {
    type Output = Rational;

    fn neg(self) -> Rational {
        Rational(-&self.0)
    }
}

impl Sum for Rational {
    fn sum<I: Iterator<Item = Rational>>(iter: I) -> Self {
        iter.fold(Rational::zero(), |acc, x| acc + x)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn r(n: i64, d: i64) -> Rational {
        Rational::new(n, d).unwrap()
    }

    #[test]
    fn test_reduced_on_construction() {
        let x = r(3048, 10_000);
        assert_eq!(x.numerator(), &BigInt::from(381));
        assert_eq!(x.denominator(), &BigInt::from(1250));
    }

    #[test]
    fn test_sign_moves_to_numerator() {
        let x = r(2, -4);
        assert_eq!(x, r(-1, 2));
        assert!(x.denominator() > &BigInt::zero());
    }

    #[test]
    fn test_zero_denominator() {
        assert_eq!(Rational::new(1, 0), Err(ConversionError::DivisionByZero));
    }

    #[test]
    fn test_arithmetic() {
        let a = r(1, 3);
        let b = r(1, 6);
        assert_eq!(&a + &b, r(1, 2));
        assert_eq!(&a - &b, r(1, 6));
        assert_eq!(&a * &b, r(1, 18));
        assert_eq!(a.checked_div(&b).unwrap(), Rational::from_integer(2));
        assert_eq!(-a, r(-1, 3));
    }

    #[test]
    fn test_division_by_zero() {
        let a = r(5, 7);
        assert_eq!(
            a.checked_div(&Rational::zero()),
            Err(ConversionError::DivisionByZero)
        );
        assert_eq!(
            Rational::zero().reciprocal(),
            Err(ConversionError::DivisionByZero)
        );
        assert_eq!(
            Rational::zero().pow(-2),
            Err(ConversionError::DivisionByZero)
        );
    }

    #[test]
    fn test_reciprocal_and_pow() {
        assert_eq!(r(-2, 3).reciprocal().unwrap(), r(-3, 2));
        assert_eq!(r(2, 3).pow(3).unwrap(), r(8, 27));
        assert_eq!(r(2, 3).pow(-2).unwrap(), r(9, 4));
        assert_eq!(r(2, 3).pow(0).unwrap(), Rational::one());
    }

    #[test]
    fn test_pow10() {
        assert_eq!(Rational::pow10(3), Rational::from_integer(1000));
        assert_eq!(Rational::pow10(-2), r(1, 100));
        assert_eq!(Rational::pow10(0), Rational::one());
    }

    #[test]
    fn test_from_f64_is_exact_binary() {
        assert_eq!(Rational::from_f64(0.5).unwrap(), r(1, 2));
        assert_eq!(Rational::from_f64(-3.0).unwrap(), Rational::from_integer(-3));

        let tenth = Rational::from_f64(0.1).unwrap();
        assert_ne!(tenth, r(1, 10), "0.1 has no exact binary representation");
        assert_eq!(
            tenth.denominator(),
            &BigInt::from(36_028_797_018_963_968_i64)
        );
    }

    #[test]
    fn test_from_f64_rejects_non_finite() {
        assert!(matches!(
            Rational::from_f64(f64::NAN),
            Err(ConversionError::NonFiniteValue { .. })
        ));
        assert!(Rational::from_f64(f64::INFINITY).is_err());
    }

    #[test]
    fn test_floor_and_ceil() {
        assert_eq!(r(7, 2).floor(), Rational::from_integer(3));
        assert_eq!(r(-7, 2).floor(), Rational::from_integer(-4));
        assert_eq!(r(7, 2).ceil(), Rational::from_integer(4));
        assert!(r(7, 2).floor().is_integer());
    }

    #[test]
    fn test_ordering() {
        let mut values = vec![r(1, 2), r(-1, 3), r(2, 3), Rational::zero()];
        values.sort();
        assert_eq!(values, vec![r(-1, 3), Rational::zero(), r(1, 2), r(2, 3)]);
    }

    #[test]
    fn test_display() {
        assert_eq!(r(381, 1250).to_string(), "381/1250");
        assert_eq!(r(10, 5).to_string(), "2");
        assert_eq!(r(-1, 3).to_string(), "-1/3");
        assert_eq!(format!("{:?}", r(1, 3)), "Rational(1/3)");
    }

    #[test]
    fn test_to_decimal_string() {
        assert_eq!(r(1, 3).to_decimal_string(5), "0.33333");
        assert_eq!(r(2, 3).to_decimal_string(5), "0.66667");
        assert_eq!(r(381, 1250).to_decimal_string(10), "0.3048");
        assert_eq!(Rational::from_integer(212).to_decimal_string(3), "212");
        assert_eq!(r(-1, 8).to_decimal_string(2), "-0.13");
        assert_eq!(r(-1, 1000).to_decimal_string(2), "0");
        assert_eq!(r(5, 2).to_decimal_string(0), "3");
    }

    #[test]
    fn test_to_f64() {
        assert!((r(381, 1250).to_f64() - 0.3048).abs() < 1e-15);
        assert!((r(-1, 3).to_f64() + 1.0 / 3.0).abs() < 1e-15);
    }

    #[test]
    fn test_sum() {
        let total: Rational = vec![r(1, 2), r(1, 3), r(1, 6)].into_iter().sum();
        assert_eq!(total, Rational::one());
    }
}
