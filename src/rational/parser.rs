//! Literal parser for exact factors.

use super::Rational;
use crate::error::{ConversionError, Result};
use num_bigint::BigInt;
use rustc_hash::FxHashMap;

/// Largest decimal exponent accepted in a literal.
const MAX_EXPONENT: i32 = 10_000;

/// Parses rational literals as they appear in unit-definition feeds.
///
/// Grammar:
///
/// ```text
/// input   = product ("/" product)?
/// product = atom ("*" atom)*
/// atom    = decimal | constant
/// decimal = "-"? digits ("." digits)? (("e" | "E") "-"? digits)?
/// ```
///
/// Commas are ignored anywhere (`1,609.344`). Constants are named values
/// registered once, so feed factors can be written relative to each other
/// (`ft_to_m*3` for a yard).
///
/// # Examples
///
/// ```
/// use u_unitconv::rational::{Rational, RationalParser};
///
/// let parser = RationalParser::new()
///     .with_constant("ft_to_m", "0.3048")
///     .unwrap();
/// let yard = parser.parse("ft_to_m*3").unwrap();
/// assert_eq!(yard, Rational::new(1143, 1250).unwrap());
/// ```
#[derive(Debug, Clone, Default)]
pub struct RationalParser {
    constants: FxHashMap<String, Rational>,
}

impl RationalParser {
    /// Creates a parser with no constants.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a constant from a literal, which may refer to earlier constants.
    pub fn with_constant(mut self, name: &str, literal: &str) -> Result<Self> {
        let value = self.parse(literal)?;
        self.add_constant(name, value)?;
        Ok(self)
    }

    /// Registers a constant. A name can only be defined once.
    pub fn add_constant(&mut self, name: &str, value: Rational) -> Result<()> {
        if !is_constant_name(name) {
            return Err(invalid(name, "constant names are letters, digits and '_'"));
        }
        if self.constants.contains_key(name) {
            return Err(invalid(name, "constant is already defined"));
        }
        self.constants.insert(name.to_string(), value);
        Ok(())
    }

    /// Looks up a registered constant.
    pub fn constant(&self, name: &str) -> Option<&Rational> {
        self.constants.get(name)
    }

    /// Number of registered constants.
    pub fn constant_count(&self) -> usize {
        self.constants.len()
    }

    /// Parses a literal into an exact value.
    pub fn parse(&self, input: &str) -> Result<Rational> {
        let cleaned: String = input.chars().filter(|&c| c != ',').collect();
        let cleaned = cleaned.trim();
        if cleaned.is_empty() {
            return Err(invalid(input, "empty literal"));
        }

        let parts: Vec<&str> = cleaned.split('/').collect();
        match parts.as_slice() {
            [single] => self.parse_product(input, single),
            [numerator, denominator] => {
                let numerator = self.parse_product(input, numerator)?;
                let denominator = self.parse_product(input, denominator)?;
                numerator.checked_div(&denominator)
            }
            _ => Err(invalid(input, "too many '/'")),
        }
    }

    fn parse_product(&self, input: &str, product: &str) -> Result<Rational> {
        let mut result = Rational::one();
        for atom in product.split('*') {
            let atom = atom.trim();
            if atom.is_empty() {
                return Err(invalid(input, "empty operand"));
            }
            result = result * self.parse_atom(input, atom)?;
        }
        Ok(result)
    }

    fn parse_atom(&self, input: &str, atom: &str) -> Result<Rational> {
        let starts_numeric = atom
            .chars()
            .next()
            .is_some_and(|c| c == '-' || c == '.' || c.is_ascii_digit());
        if starts_numeric {
            return parse_decimal(input, atom);
        }
        if !is_constant_name(atom) {
            return Err(invalid(input, format!("bad characters in '{atom}'")));
        }
        self.constants
            .get(atom)
            .cloned()
            .ok_or_else(|| invalid(input, format!("constant '{atom}' is not defined")))
    }
}

fn parse_decimal(input: &str, atom: &str) -> Result<Rational> {
    let (mantissa, exponent) = match atom.find(['e', 'E']) {
        Some(pos) => {
            let exponent: i32 = atom[pos + 1..]
                .parse()
                .map_err(|_| invalid(input, format!("bad exponent in '{atom}'")))?;
            (&atom[..pos], exponent)
        }
        None => (atom, 0),
    };
    if exponent.abs() > MAX_EXPONENT {
        return Err(invalid(input, "exponent out of range"));
    }

    let (negative, unsigned) = match mantissa.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, mantissa),
    };
    let (integer_part, fraction_part) = unsigned.split_once('.').unwrap_or((unsigned, ""));
    let digits = format!("{integer_part}{fraction_part}");
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid(input, format!("bad number '{atom}'")));
    }
    let unscaled = BigInt::parse_bytes(digits.as_bytes(), 10)
        .ok_or_else(|| invalid(input, format!("bad number '{atom}'")))?;

    let scale = exponent - fraction_part.len() as i32;
    let value = Rational::from_integer(unscaled) * Rational::pow10(scale);
    Ok(if negative { -value } else { value })
}

fn is_constant_name(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn invalid(input: &str, reason: impl Into<String>) -> ConversionError {
    ConversionError::InvalidRational {
        input: input.to_string(),
        reason: reason.into(),
    }
}
