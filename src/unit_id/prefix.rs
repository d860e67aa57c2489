//! Decimal and binary unit prefixes.

use crate::error::ConversionError;
use crate::rational::Rational;
use num_bigint::BigInt;
use std::fmt;
use std::str::FromStr;

/// A magnitude prefix fused to a unit symbol (`kilo` in `kilometer`).
///
/// Prefixes never become graph nodes. They fold into the factor of the
/// element they are attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Prefix {
    Quecto,
    Ronto,
    Yocto,
    Zepto,
    Atto,
    Femto,
    Pico,
    Nano,
    Micro,
    Milli,
    Centi,
    Deci,
    Deka,
    Hecto,
    Kilo,
    Mega,
    Giga,
    Tera,
    Peta,
    Exa,
    Zetta,
    Yotta,
    Ronna,
    Quetta,
    Kibi,
    Mebi,
    Gibi,
    Tebi,
    Pebi,
    Exbi,
    Zebi,
    Yobi,
}

impl Prefix {
    /// Every prefix, decimal ones in ascending magnitude followed by binary ones.
    pub const ALL: [Prefix; 32] = [
        Prefix::Quecto,
        Prefix::Ronto,
        Prefix::Yocto,
        Prefix::Zepto,
        Prefix::Atto,
        Prefix::Femto,
        Prefix::Pico,
        Prefix::Nano,
        Prefix::Micro,
        Prefix::Milli,
        Prefix::Centi,
        Prefix::Deci,
        Prefix::Deka,
        Prefix::Hecto,
        Prefix::Kilo,
        Prefix::Mega,
        Prefix::Giga,
        Prefix::Tera,
        Prefix::Peta,
        Prefix::Exa,
        Prefix::Zetta,
        Prefix::Yotta,
        Prefix::Ronna,
        Prefix::Quetta,
        Prefix::Kibi,
        Prefix::Mebi,
        Prefix::Gibi,
        Prefix::Tebi,
        Prefix::Pebi,
        Prefix::Exbi,
        Prefix::Zebi,
        Prefix::Yobi,
    ];

    /// Text fused in front of the unit symbol.
    pub fn symbol(self) -> &'static str {
        match self {
            Prefix::Quecto => "quecto",
            Prefix::Ronto => "ronto",
            Prefix::Yocto => "yocto",
            Prefix::Zepto => "zepto",
            Prefix::Atto => "atto",
            Prefix::Femto => "femto",
            Prefix::Pico => "pico",
            Prefix::Nano => "nano",
            Prefix::Micro => "micro",
            Prefix::Milli => "milli",
            Prefix::Centi => "centi",
            Prefix::Deci => "deci",
            Prefix::Deka => "deka",
            Prefix::Hecto => "hecto",
            Prefix::Kilo => "kilo",
            Prefix::Mega => "mega",
            Prefix::Giga => "giga",
            Prefix::Tera => "tera",
            Prefix::Peta => "peta",
            Prefix::Exa => "exa",
            Prefix::Zetta => "zetta",
            Prefix::Yotta => "yotta",
            Prefix::Ronna => "ronna",
            Prefix::Quetta => "quetta",
            Prefix::Kibi => "kibi",
            Prefix::Mebi => "mebi",
            Prefix::Gibi => "gibi",
            Prefix::Tebi => "tebi",
            Prefix::Pebi => "pebi",
            Prefix::Exbi => "exbi",
            Prefix::Zebi => "zebi",
            Prefix::Yobi => "yobi",
        }
    }

    /// Power of ten for decimal prefixes.
    pub fn decimal_exponent(self) -> Option<i32> {
        let exponent = match self {
            Prefix::Quecto => -30,
            Prefix::Ronto => -27,
            Prefix::Yocto => -24,
            Prefix::Zepto => -21,
            Prefix::Atto => -18,
            Prefix::Femto => -15,
            Prefix::Pico => -12,
            Prefix::Nano => -9,
            Prefix::Micro => -6,
            Prefix::Milli => -3,
            Prefix::Centi => -2,
            Prefix::Deci => -1,
            Prefix::Deka => 1,
            Prefix::Hecto => 2,
            Prefix::Kilo => 3,
            Prefix::Mega => 6,
            Prefix::Giga => 9,
            Prefix::Tera => 12,
            Prefix::Peta => 15,
            Prefix::Exa => 18,
            Prefix::Zetta => 21,
            Prefix::Yotta => 24,
            Prefix::Ronna => 27,
            Prefix::Quetta => 30,
            _ => return None,
        };
        Some(exponent)
    }

    /// Power of two for binary prefixes.
    pub fn binary_exponent(self) -> Option<u32> {
        let exponent = match self {
            Prefix::Kibi => 10,
            Prefix::Mebi => 20,
            Prefix::Gibi => 30,
            Prefix::Tebi => 40,
            Prefix::Pebi => 50,
            Prefix::Exbi => 60,
            Prefix::Zebi => 70,
            Prefix::Yobi => 80,
            _ => return None,
        };
        Some(exponent)
    }

    /// Exact multiplier of the prefix.
    pub fn factor(self) -> Rational {
        match (self.decimal_exponent(), self.binary_exponent()) {
            (Some(exponent), _) => Rational::pow10(exponent),
            (None, Some(exponent)) => Rational::from_integer(BigInt::from(1u8) << exponent),
            (None, None) => Rational::one(),
        }
    }

    /// Finds the prefix a token starts with, returning it with the rest of the token.
    ///
    /// Every candidate is yielded, since `exa` and `exbi` share leading letters.
    pub fn strip(token: &str) -> impl Iterator<Item = (Prefix, &str)> + '_ {
        Prefix::ALL.iter().filter_map(move |&prefix| {
            token
                .strip_prefix(prefix.symbol())
                .filter(|rest| !rest.is_empty())
                .map(|rest| (prefix, rest))
        })
    }
}

impl fmt::Display for Prefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl FromStr for Prefix {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Prefix::ALL
            .iter()
            .copied()
            .find(|prefix| prefix.symbol() == s)
            .ok_or_else(|| ConversionError::UnknownPrefix {
                input: s.to_string(),
                prefix: s.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decimal_factors() {
        assert_eq!(Prefix::Kilo.factor(), Rational::from_integer(1000));
        assert_eq!(Prefix::Centi.factor(), Rational::new(1, 100).unwrap());
        assert_eq!(Prefix::Deka.factor(), Rational::from_integer(10));
        assert_eq!(Prefix::Quecto.factor(), Rational::pow10(-30));
    }

    #[test]
    fn test_binary_factors() {
        assert_eq!(Prefix::Kibi.factor(), Rational::from_integer(1024));
        assert_eq!(Prefix::Mebi.factor(), Rational::from_integer(1_048_576));
        let yobi = Prefix::Yobi.factor();
        assert_eq!(yobi, Rational::from_integer(1024).pow(8).unwrap());
    }

    #[test]
    fn test_decimal_prefixes_ascend() {
        let decimal: Vec<Rational> = Prefix::ALL
            .iter()
            .filter(|p| p.decimal_exponent().is_some())
            .map(|p| p.factor())
            .collect();
        assert_eq!(decimal.len(), 24);
        assert!(decimal.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_from_str() {
        assert_eq!("mega".parse::<Prefix>().unwrap(), Prefix::Mega);
        assert_eq!("gibi".parse::<Prefix>().unwrap(), Prefix::Gibi);
        assert!(matches!(
            "kilobyte".parse::<Prefix>(),
            Err(ConversionError::UnknownPrefix { .. })
        ));
    }

    #[test]
    fn test_strip() {
        let found: Vec<(Prefix, &str)> = Prefix::strip("kilometer").collect();
        assert_eq!(found, vec![(Prefix::Kilo, "meter")]);

        let found: Vec<Prefix> = Prefix::strip("exbibyte").map(|(p, _)| p).collect();
        assert_eq!(found, vec![Prefix::Exa, Prefix::Exbi]);

        assert_eq!(Prefix::strip("kilo").count(), 0);
    }
}
