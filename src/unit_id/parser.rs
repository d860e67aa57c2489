//! Parser for textual unit identifiers.

use super::prefix::Prefix;
use super::types::{SymbolTable, UnitElement, UnitIdentifier};
use crate::error::{ConversionError, Result};

/// Separator between numerator and denominator.
pub const PER: &str = "per";

/// Separator between the units of a mixed unit.
pub const AND: &str = "and";

/// Largest exponent a `powN` word may carry.
pub const MAX_POWER: i32 = 64;

/// Parses a power word: `square`, `cubic` or `powN` with
/// `2 <= N <= MAX_POWER`.
///
/// Returns `Ok(None)` for tokens that are not power words.
pub fn power_word(input: &str, token: &str) -> Result<Option<i32>> {
    match token {
        "square" => return Ok(Some(2)),
        "cubic" => return Ok(Some(3)),
        _ => {}
    }
    let Some(digits) = token.strip_prefix("pow") else {
        return Ok(None);
    };
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Ok(None);
    }
    match digits.parse::<i32>() {
        Ok(n) if (2..=MAX_POWER).contains(&n) => Ok(Some(n)),
        Ok(n) if n > MAX_POWER => Err(ConversionError::syntax(
            input,
            format!("power '{token}' exceeds pow{MAX_POWER}"),
        )),
        _ => Err(ConversionError::syntax(
            input,
            format!("malformed power '{token}'"),
        )),
    }
}

/// Whether a token is a grammar keyword and can never be part of a symbol.
pub fn is_reserved(token: &str) -> bool {
    token == PER
        || token == AND
        || token == "square"
        || token == "cubic"
        || token
            .strip_prefix("pow")
            .is_some_and(|d| !d.is_empty() && d.bytes().all(|b| b.is_ascii_digit()))
}

/// Whether a string only uses the characters allowed in identifiers.
pub fn has_valid_chars(input: &str) -> bool {
    input
        .bytes()
        .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-')
}

/// Matches a (possibly hyphenated) word against the vocabulary.
///
/// An exact symbol wins over a prefixed reading.
fn resolve_word<S: SymbolTable + ?Sized>(
    word: &str,
    symbols: &S,
) -> Option<(Option<Prefix>, String)> {
    if symbols.contains_symbol(word) {
        return Some((None, word.to_string()));
    }
    Prefix::strip(word)
        .find(|(_, rest)| symbols.contains_symbol(rest))
        .map(|(prefix, rest)| (Some(prefix), rest.to_string()))
}

fn unknown_token<S: SymbolTable + ?Sized>(
    input: &str,
    token: &str,
    symbols: &S,
) -> ConversionError {
    let known_tail = (1..token.len())
        .filter(|&i| token.is_char_boundary(i))
        .find(|&i| symbols.contains_symbol(&token[i..]));
    match known_tail {
        Some(i) => ConversionError::UnknownPrefix {
            input: input.to_string(),
            prefix: token[..i].to_string(),
        },
        None => ConversionError::UnknownBaseUnit {
            input: input.to_string(),
            symbol: token.to_string(),
        },
    }
}

impl UnitIdentifier {
    /// Parses an identifier such as `kilometer-per-square-second`.
    ///
    /// Elements keep their written order; use
    /// [`ConversionGraph::parse_unit`](crate::graph::ConversionGraph::parse_unit)
    /// to obtain the canonical form. The empty string is dimensionless.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::collections::HashSet;
    /// use u_unitconv::unit_id::{Prefix, UnitIdentifier};
    ///
    /// let symbols: HashSet<String> =
    ///     ["meter", "second", "gallon-imperial"].iter().map(|s| s.to_string()).collect();
    ///
    /// let accel = UnitIdentifier::parse("kilometer-per-square-second", &symbols).unwrap();
    /// assert_eq!(accel.elements()[0].prefix, Some(Prefix::Kilo));
    /// assert_eq!(accel.elements()[1].power, -2);
    ///
    /// let volume = UnitIdentifier::parse("gallon-imperial", &symbols).unwrap();
    /// assert_eq!(volume.as_symbol(), Some("gallon-imperial"));
    /// ```
    pub fn parse<S: SymbolTable + ?Sized>(input: &str, symbols: &S) -> Result<UnitIdentifier> {
        if input.is_empty() {
            return Ok(UnitIdentifier::dimensionless());
        }
        if !has_valid_chars(input) {
            return Err(ConversionError::syntax(
                input,
                "only lowercase letters, digits and '-' are allowed",
            ));
        }
        let tokens: Vec<&str> = input.split('-').collect();
        if tokens.iter().any(|t| t.is_empty()) {
            return Err(ConversionError::syntax(input, "empty token"));
        }

        let mut elements = Vec::new();
        let mut sign = 1;
        let mut pending_power: Option<i32> = None;
        let mut i = 0;
        while i < tokens.len() {
            let token = tokens[i];
            if token == PER {
                if sign < 0 {
                    return Err(ConversionError::syntax(input, "repeated 'per'"));
                }
                if pending_power.is_some() {
                    return Err(ConversionError::syntax(input, "power word before 'per'"));
                }
                if i + 1 == tokens.len() {
                    return Err(ConversionError::syntax(input, "dangling 'per'"));
                }
                sign = -1;
                i += 1;
                continue;
            }
            if token == AND {
                return Err(ConversionError::syntax(
                    input,
                    "'and' only separates the units of a mixed unit",
                ));
            }
            if let Some(power) = power_word(input, token)? {
                if pending_power.is_some() {
                    return Err(ConversionError::syntax(input, "consecutive power words"));
                }
                if i + 1 == tokens.len() {
                    return Err(ConversionError::syntax(input, "dangling power word"));
                }
                pending_power = Some(power);
                i += 1;
                continue;
            }

            // Longest run of non-reserved tokens that names a symbol.
            let run_end = tokens[i..]
                .iter()
                .position(|t| is_reserved(t))
                .map_or(tokens.len(), |p| i + p);
            let matched = (i + 1..=run_end)
                .rev()
                .find_map(|end| resolve_word(&tokens[i..end].join("-"), symbols).map(|m| (end, m)));
            let Some((end, (prefix, symbol))) = matched else {
                return Err(unknown_token(input, token, symbols));
            };

            let power = pending_power.take().unwrap_or(1) * sign;
            elements.push(UnitElement::new(prefix, symbol, power));
            i = end;
        }

        Ok(UnitIdentifier::from_elements(elements))
    }
}
