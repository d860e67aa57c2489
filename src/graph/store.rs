//! The immutable conversion graph.

use super::builder::GraphBuilder;
use super::types::{ConversionEdge, UnitSystem};
use crate::error::Result;
use crate::rational::Rational;
use crate::unit_id::{SymbolTable, UnitElement, UnitIdentifier};
use rustc_hash::{FxHashMap, FxHashSet};
use std::cmp::Ordering;

/// Mapping from units to their base-unit conversions.
///
/// Built once by [`GraphBuilder`] and never mutated afterwards, so it can be
/// shared freely across threads. Edges form a forest: every unit points
/// directly at the base unit of its quantity.
///
/// # Examples
///
/// ```
/// use u_unitconv::graph::{ConversionGraph, EdgeRecord};
///
/// let foot = EdgeRecord::new("length", "foot", "meter").with_factor("0.3048".parse().unwrap());
/// let graph = ConversionGraph::builder()
///     .with_record(EdgeRecord::base("length", "meter"))
///     .with_record(foot)
///     .with_record(EdgeRecord::base("duration", "second"))
///     .build()
///     .unwrap();
///
/// let foot = graph.parse_unit("foot").unwrap();
/// assert_eq!(graph.lookup(&foot).unwrap().info.factor.to_string(), "381/1250");
///
/// // Components follow the graph's order regardless of how they were written.
/// let a = graph.parse_unit("second-meter").unwrap();
/// assert_eq!(a.to_string(), "meter-second");
/// ```
#[derive(Debug, Clone, Default)]
pub struct ConversionGraph {
    pub(super) edges: FxHashMap<UnitIdentifier, ConversionEdge>,
    pub(super) symbols: FxHashSet<String>,
    pub(super) component_order: Vec<String>,
    pub(super) component_rank: FxHashMap<String, usize>,
    pub(super) quantity_order: Vec<String>,
    pub(super) quantity_bases: FxHashMap<String, UnitIdentifier>,
    pub(super) base_quantities: FxHashMap<UnitIdentifier, Vec<String>>,
    pub(super) quantity_units: FxHashMap<String, Vec<UnitIdentifier>>,
    pub(super) system_units: FxHashMap<UnitSystem, Vec<UnitIdentifier>>,
    pub(super) aliases: FxHashMap<String, UnitIdentifier>,
}

impl ConversionGraph {
    /// Starts building a graph.
    pub fn builder() -> GraphBuilder {
        GraphBuilder::new()
    }

    /// Parses an identifier into canonical form. A whole-id alias is
    /// replaced by its target first.
    pub fn parse_unit(&self, input: &str) -> Result<UnitIdentifier> {
        if let Some(unit) = self.aliases.get(input) {
            return Ok(unit.clone());
        }
        let parsed = UnitIdentifier::parse(input, self)?;
        Ok(self.canonicalize(&parsed))
    }

    /// Canonical form: a prefix fused into a known symbol (`kilo` + `gram`
    /// becomes `kilogram`), powers merged, then numerator and denominator
    /// each ordered by component rank, symbol and prefix magnitude.
    pub fn canonicalize(&self, unit: &UnitIdentifier) -> UnitIdentifier {
        let fused = unit
            .elements()
            .iter()
            .map(|element| {
                let spelled = element.prefixed_symbol();
                if element.prefix.is_some() && self.symbols.contains(&spelled) {
                    UnitElement::new(None, spelled, element.power)
                } else {
                    element.clone()
                }
            })
            .collect();
        let merged = UnitIdentifier::from_elements(fused).merged();
        let (mut numerator, mut denominator): (Vec<UnitElement>, Vec<UnitElement>) =
            merged.into_elements().into_iter().partition(|e| e.power > 0);
        numerator.sort_by(|a, b| self.compare_elements(a, b));
        denominator.sort_by(|a, b| self.compare_elements(a, b));
        numerator.extend(denominator);
        UnitIdentifier::from_elements(numerator)
    }

    fn compare_elements(&self, a: &UnitElement, b: &UnitElement) -> Ordering {
        let rank = |e: &UnitElement| {
            self.component_rank.get(&e.symbol).copied().unwrap_or(usize::MAX)
        };
        let magnitude = |e: &UnitElement| e.prefix.map_or_else(Rational::one, |p| p.factor());
        rank(a)
            .cmp(&rank(b))
            .then_with(|| a.symbol.cmp(&b.symbol))
            .then_with(|| magnitude(a).cmp(&magnitude(b)))
    }

    /// Canonical target of an alias.
    pub fn resolve_alias(&self, alias: &str) -> Option<&UnitIdentifier> {
        self.aliases.get(alias)
    }

    /// Whether two identifiers denote the same unit.
    pub fn same_unit(&self, a: &UnitIdentifier, b: &UnitIdentifier) -> bool {
        self.canonicalize(a) == self.canonicalize(b)
    }

    /// The edge of a unit, if the feed defines it directly.
    pub fn lookup(&self, unit: &UnitIdentifier) -> Option<&ConversionEdge> {
        self.edges
            .get(unit)
            .or_else(|| self.edges.get(&self.canonicalize(unit)))
    }

    /// The edge of a unit given as text.
    pub fn lookup_symbol(&self, unit: &str) -> Option<&ConversionEdge> {
        let unit = self.parse_unit(unit).ok()?;
        self.edges.get(&unit)
    }

    /// Base unit of a quantity.
    pub fn base_unit_of(&self, quantity: &str) -> Option<&UnitIdentifier> {
        self.quantity_bases.get(quantity)
    }

    /// Quantities a directly defined unit belongs to.
    pub fn quantities_of(&self, unit: &UnitIdentifier) -> &[String] {
        self.lookup(unit)
            .map(|edge| edge.quantities.as_slice())
            .unwrap_or_default()
    }

    /// Quantities whose base unit is `base`.
    pub fn quantities_for_base(&self, base: &UnitIdentifier) -> &[String] {
        self.base_quantities
            .get(base)
            .or_else(|| self.base_quantities.get(&self.canonicalize(base)))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// All quantities in feed order.
    pub fn quantities(&self) -> impl Iterator<Item = &str> {
        self.quantity_order.iter().map(String::as_str)
    }

    /// Units of a quantity in feed order, base unit first.
    pub fn units_of_quantity(&self, quantity: &str) -> &[UnitIdentifier] {
        self.quantity_units
            .get(quantity)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Units tagged with a measurement system, in feed order.
    pub fn units_in_system(&self, system: UnitSystem) -> &[UnitIdentifier] {
        self.system_units
            .get(&system)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Measurement systems of a directly defined unit.
    pub fn systems_of(&self, unit: &UnitIdentifier) -> &[UnitSystem] {
        self.lookup(unit)
            .map(|edge| edge.systems.as_slice())
            .unwrap_or_default()
    }

    /// Total order of atomic symbols used for canonical forms.
    pub fn component_order(&self) -> &[String] {
        &self.component_order
    }

    /// Position of a symbol in [`component_order`](Self::component_order).
    pub fn component_rank(&self, symbol: &str) -> Option<usize> {
        self.component_rank.get(symbol).copied()
    }

    /// All edges, in no particular order.
    pub fn edges(&self) -> impl Iterator<Item = &ConversionEdge> {
        self.edges.values()
    }

    /// Number of directly defined units.
    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }
}

impl SymbolTable for ConversionGraph {
    fn contains_symbol(&self, symbol: &str) -> bool {
        self.symbols.contains(symbol)
    }
}
