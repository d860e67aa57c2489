//! Exact rational arithmetic.
//!
//! [`Rational`] is the only numeric representation used inside the engine:
//! every factor, offset and amount is an arbitrary-precision fraction kept
//! in lowest terms, so chained conversions never accumulate rounding error.
//! Lossy conversions ([`Rational::to_f64`], [`Rational::to_decimal_string`])
//! exist only for the API boundary.
//!
//! [`RationalParser`] turns the literal forms found in unit-definition feeds
//! (`0.3048`, `1/3`, `ft_to_m*12`, `6.02214076E23`) into exact values.

mod number;
mod parser;

pub use number::Rational;
pub use parser::RationalParser;
