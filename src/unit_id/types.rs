//! Unit identifier values.

use super::prefix::Prefix;
use rustc_hash::FxHashMap;
use std::collections::HashSet;
use std::fmt;
use std::hash::BuildHasher;

/// Vocabulary of atomic unit symbols known to a parser.
///
/// Implemented by the conversion graph and by plain string sets.
pub trait SymbolTable {
    /// Whether `symbol` names an atomic unit (no prefix, no power).
    fn contains_symbol(&self, symbol: &str) -> bool;
}

impl<S: BuildHasher> SymbolTable for HashSet<String, S> {
    fn contains_symbol(&self, symbol: &str) -> bool {
        self.contains(symbol)
    }
}

impl<T: SymbolTable + ?Sized> SymbolTable for &T {
    fn contains_symbol(&self, symbol: &str) -> bool {
        (**self).contains_symbol(symbol)
    }
}

/// One factor of a compound unit: `[prefix]symbol^power`.
///
/// Negative powers belong to the denominator.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct UnitElement {
    /// Optional magnitude prefix.
    pub prefix: Option<Prefix>,
    /// Atomic unit symbol, as defined in the feed.
    pub symbol: String,
    /// Signed exponent, never zero in a constructed identifier.
    pub power: i32,
}

impl UnitElement {
    /// Creates an element.
    pub fn new(prefix: Option<Prefix>, symbol: impl Into<String>, power: i32) -> Self {
        Self {
            prefix,
            symbol: symbol.into(),
            power,
        }
    }

    /// An unprefixed element with power 1.
    pub fn plain(symbol: impl Into<String>) -> Self {
        Self::new(None, symbol, 1)
    }

    /// Symbol with its prefix fused in front.
    pub fn prefixed_symbol(&self) -> String {
        match self.prefix {
            Some(prefix) => format!("{}{}", prefix.symbol(), self.symbol),
            None => self.symbol.clone(),
        }
    }

    fn with_power(&self, power: i32) -> Self {
        Self {
            prefix: self.prefix,
            symbol: self.symbol.clone(),
            power,
        }
    }
}

/// A possibly compound unit, such as `kilometer-per-square-second`.
///
/// Parsing keeps the written order of elements. Canonical form (merged powers
/// and a stable component order) is produced by
/// [`ConversionGraph::canonicalize`](crate::graph::ConversionGraph::canonicalize);
/// two identifiers denote the same unit when their canonical forms are equal.
///
/// # Examples
///
/// ```
/// use u_unitconv::unit_id::{UnitElement, UnitIdentifier};
///
/// let speed = UnitIdentifier::from_elements(vec![
///     UnitElement::plain("meter"),
///     UnitElement::new(None, "second", -1),
/// ]);
/// assert_eq!(speed.to_string(), "meter-per-second");
/// assert_eq!(speed.reciprocal().to_string(), "second-per-meter");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct UnitIdentifier {
    elements: Vec<UnitElement>,
}

impl UnitIdentifier {
    /// The empty (dimensionless) identifier.
    pub fn dimensionless() -> Self {
        Self::default()
    }

    /// A single unprefixed symbol with power 1.
    pub fn simple(symbol: impl Into<String>) -> Self {
        Self {
            elements: vec![UnitElement::plain(symbol)],
        }
    }

    /// Builds an identifier from elements, dropping zero powers.
    pub fn from_elements(elements: Vec<UnitElement>) -> Self {
        Self {
            elements: elements.into_iter().filter(|e| e.power != 0).collect(),
        }
    }

    /// All elements in order.
    pub fn elements(&self) -> &[UnitElement] {
        &self.elements
    }

    /// Elements with positive power.
    pub fn numerator(&self) -> impl Iterator<Item = &UnitElement> {
        self.elements.iter().filter(|e| e.power > 0)
    }

    /// Elements with negative power.
    pub fn denominator(&self) -> impl Iterator<Item = &UnitElement> {
        self.elements.iter().filter(|e| e.power < 0)
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Whether the identifier has no elements.
    pub fn is_dimensionless(&self) -> bool {
        self.elements.is_empty()
    }

    /// A single element with power 1, possibly prefixed.
    pub fn is_simple(&self) -> bool {
        matches!(self.elements.as_slice(), [e] if e.power == 1)
    }

    /// The symbol of a single unprefixed element with power 1.
    pub fn as_symbol(&self) -> Option<&str> {
        match self.elements.as_slice() {
            [e] if e.power == 1 && e.prefix.is_none() => Some(&e.symbol),
            _ => None,
        }
    }

    /// Swaps numerator and denominator.
    pub fn reciprocal(&self) -> Self {
        Self {
            elements: self
                .elements
                .iter()
                .map(|e| e.with_power(e.power.saturating_neg()))
                .collect(),
        }
    }

    /// Sums the powers of identical `(prefix, symbol)` elements, keeping the
    /// position of the first occurrence, and drops elements whose power cancels.
    pub fn merged(&self) -> Self {
        let mut merged: Vec<UnitElement> = Vec::with_capacity(self.elements.len());
        let mut index: FxHashMap<(Option<Prefix>, &str), usize> = FxHashMap::default();
        for element in &self.elements {
            let key = (element.prefix, element.symbol.as_str());
            match index.get(&key) {
                Some(&i) => merged[i].power = merged[i].power.saturating_add(element.power),
                None => {
                    index.insert(key, merged.len());
                    merged.push(element.clone());
                }
            }
        }
        Self::from_elements(merged)
    }

    /// Product of two units, merged.
    pub fn times(&self, other: &UnitIdentifier) -> Self {
        let mut elements = self.elements.clone();
        elements.extend(other.elements.iter().cloned());
        Self { elements }.merged()
    }

    /// Raises every element to `exponent`, merged.
    pub fn pow(&self, exponent: i32) -> Self {
        Self {
            elements: self
                .elements
                .iter()
                .map(|e| e.with_power(e.power.saturating_mul(exponent)))
                .collect(),
        }
        .merged()
    }

    pub(crate) fn into_elements(self) -> Vec<UnitElement> {
        self.elements
    }
}

impl From<UnitElement> for UnitIdentifier {
    fn from(element: UnitElement) -> Self {
        Self::from_elements(vec![element])
    }
}

fn write_element(f: &mut fmt::Formatter<'_>, element: &UnitElement) -> fmt::Result {
    match element.power.unsigned_abs() {
        1 => {}
        2 => f.write_str("square-")?,
        3 => f.write_str("cubic-")?,
        n => write!(f, "pow{n}-")?,
    }
    if let Some(prefix) = element.prefix {
        f.write_str(prefix.symbol())?;
    }
    f.write_str(&element.symbol)
}

fn write_run<'a>(
    f: &mut fmt::Formatter<'_>,
    elements: impl Iterator<Item = &'a UnitElement>,
) -> fmt::Result {
    for (i, element) in elements.enumerate() {
        if i > 0 {
            f.write_str("-")?;
        }
        write_element(f, element)?;
    }
    Ok(())
}

impl fmt::Display for UnitIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let has_numerator = self.numerator().next().is_some();
        let has_denominator = self.denominator().next().is_some();
        write_run(f, self.numerator())?;
        if has_denominator {
            f.write_str(if has_numerator { "-per-" } else { "per-" })?;
            write_run(f, self.denominator())?;
        }
        Ok(())
    }
}
