//! Validating graph construction.

use super::store::ConversionGraph;
use super::types::{ConversionEdge, EdgeRecord, UnitSystem};
use crate::error::{ConversionError, Result};
use crate::ordering::TotalOrderResolver;
use crate::unit_id::{has_valid_chars, is_reserved, UnitIdentifier};
use rustc_hash::{FxHashMap, FxHashSet};
use tracing::{debug, info, warn};

/// Collects feed records and builds a [`ConversionGraph`].
///
/// Building either succeeds completely or fails with the first problem
/// found; no partially built graph is ever returned. See
/// [`GraphBuilder::build`] for the checks performed.
#[derive(Debug, Clone, Default)]
pub struct GraphBuilder {
    records: Vec<EdgeRecord>,
    order_hints: Vec<Vec<String>>,
    aliases: Vec<(String, String)>,
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a feed record.
    pub fn with_record(mut self, record: EdgeRecord) -> Self {
        self.add_record(record);
        self
    }

    /// Adds a feed record in place.
    pub fn add_record(&mut self, record: EdgeRecord) {
        self.records.push(record);
    }

    /// Adds many feed records in order.
    pub fn extend(mut self, records: impl IntoIterator<Item = EdgeRecord>) -> Self {
        self.records.extend(records);
        self
    }

    /// Adds a component-order row: these symbols appear in this relative
    /// order inside canonical compound units.
    ///
    /// Hint rows take precedence over the order derived from the feed.
    pub fn with_component_order<S: Into<String>>(
        mut self,
        row: impl IntoIterator<Item = S>,
    ) -> Self {
        self.order_hints.push(row.into_iter().map(Into::into).collect());
        self
    }

    /// Adds an alternate spelling of a whole unit id, such as
    /// `meter-per-second-squared` for `meter-per-square-second`.
    ///
    /// Aliases may point at other aliases; chains are flattened at build
    /// time. Only complete identifiers are replaced, never components.
    pub fn with_alias(mut self, alias: impl Into<String>, target: impl Into<String>) -> Self {
        self.add_alias(alias, target);
        self
    }

    /// Adds an alias in place.
    pub fn add_alias(&mut self, alias: impl Into<String>, target: impl Into<String>) {
        self.aliases.push((alias.into(), target.into()));
    }

    /// Number of records added.
    pub fn record_count(&self) -> usize {
        self.records.len()
    }

    /// Validates the records and builds the graph.
    ///
    /// # Errors
    ///
    /// - [`ConversionError::InvalidDefinition`]: malformed symbol, empty
    ///   quantity, zero factor, non-identity base declaration, a compound unit
    ///   naming an unknown symbol, or an unknown symbol in an order hint.
    /// - [`ConversionError::ConflictingBaseUnit`]: two bases for one quantity.
    /// - [`ConversionError::ChainedDefinition`]: a record targets a unit that is
    ///   itself converted, or a compound base built from non-base symbols.
    /// - [`ConversionError::DuplicateUnitDefinition`]: a unit defined twice.
    /// - [`ConversionError::AmbiguousQuantity`]: a unit shared by quantities
    ///   that are not all flagged multi-quantity.
    /// - [`ConversionError::IncompatibleOrdering`]: contradictory order hints.
    ///
    /// Aliases fail with [`ConversionError::InvalidDefinition`] when malformed,
    /// when they already name a unit, when defined twice with different
    /// targets, when they form a cycle, or when their target does not parse.
    pub fn build(self) -> Result<ConversionGraph> {
        let record_count = self.records.len();
        match self.try_build() {
            Ok(graph) => {
                info!(
                    records = record_count,
                    units = graph.len(),
                    quantities = graph.quantity_order.len(),
                    "conversion graph built"
                );
                Ok(graph)
            }
            Err(error) => {
                warn!(%error, kind = error.kind(), "conversion graph build failed");
                Err(error)
            }
        }
    }

    fn try_build(self) -> Result<ConversionGraph> {
        for record in &self.records {
            validate_record(record)?;
        }

        let symbols: FxHashSet<String> = self
            .records
            .iter()
            .flat_map(|r| [&r.source, &r.base])
            .filter(|s| is_atomic(s))
            .cloned()
            .collect();

        let (quantity_order, quantity_base_text) = self.quantity_bases()?;
        self.check_chaining()?;

        let mut graph = ConversionGraph {
            symbols,
            quantity_order,
            ..ConversionGraph::default()
        };
        self.resolve_component_order(&mut graph, &quantity_base_text)?;

        // Canonical base of each quantity.
        for quantity in &graph.quantity_order {
            let text = &quantity_base_text[quantity];
            let base = parse_defined(&graph, text)?;
            if base
                .elements()
                .iter()
                .any(|e| e.prefix.is_some() || !is_base_symbol(&e.symbol, &quantity_base_text))
            {
                return Err(ConversionError::ChainedDefinition {
                    unit: quantity.clone(),
                    base: text.clone(),
                });
            }
            graph.quantity_bases.insert(quantity.clone(), base);
        }

        let flagged: FxHashSet<&str> = self
            .records
            .iter()
            .filter(|r| r.multi_quantity)
            .map(|r| r.quantity.as_str())
            .collect();

        insert_base_edges(&mut graph);
        for record in &self.records {
            insert_record(&mut graph, record)?;
        }

        let mut shared: Vec<&ConversionEdge> =
            graph.edges.values().filter(|e| e.quantities.len() > 1).collect();
        shared.sort_by_key(|e| e.source.to_string());
        if let Some(edge) = shared
            .into_iter()
            .find(|e| !e.quantities.iter().all(|q| flagged.contains(q.as_str())))
        {
            return Err(ConversionError::AmbiguousQuantity {
                unit: edge.source.to_string(),
                quantities: edge.quantities.clone(),
            });
        }

        graph.aliases = self.resolve_aliases(&graph)?;
        Ok(graph)
    }

    /// Flattens alias chains and parses every final target.
    fn resolve_aliases(
        &self,
        graph: &ConversionGraph,
    ) -> Result<FxHashMap<String, UnitIdentifier>> {
        let mut direct: FxHashMap<&str, &str> = FxHashMap::default();
        for (alias, target) in &self.aliases {
            if !is_well_formed(alias) {
                return Err(ConversionError::definition(
                    alias.clone(),
                    "aliases use lowercase letters, digits and single '-' separators",
                ));
            }
            if graph.parse_unit(alias).is_ok() {
                return Err(ConversionError::definition(
                    alias.clone(),
                    "alias spells a unit that is already defined",
                ));
            }
            match direct.insert(alias.as_str(), target.as_str()) {
                Some(previous) if previous != target.as_str() => {
                    return Err(ConversionError::definition(
                        alias.clone(),
                        format!("alias maps to both '{previous}' and '{target}'"),
                    ));
                }
                _ => {}
            }
        }

        let mut resolved = FxHashMap::default();
        for (alias, _) in &self.aliases {
            let mut target = alias.as_str();
            let mut visited: FxHashSet<&str> = FxHashSet::default();
            while let Some(&next) = direct.get(target) {
                if !visited.insert(target) {
                    return Err(ConversionError::definition(alias.clone(), "alias cycle"));
                }
                target = next;
            }
            let unit = parse_defined(graph, target)?;
            resolved.insert(alias.clone(), unit);
        }
        debug!(aliases = resolved.len(), "aliases resolved");
        Ok(resolved)
    }

    /// Base unit text of every quantity, in declaration order.
    fn quantity_bases(&self) -> Result<(Vec<String>, FxHashMap<String, String>)> {
        let mut order = Vec::new();
        let mut bases: FxHashMap<String, String> = FxHashMap::default();
        for record in &self.records {
            match bases.get(&record.quantity) {
                Some(existing) if *existing != record.base => {
                    return Err(ConversionError::ConflictingBaseUnit {
                        quantity: record.quantity.clone(),
                        existing: existing.clone(),
                        found: record.base.clone(),
                    });
                }
                Some(_) => {}
                None => {
                    order.push(record.quantity.clone());
                    bases.insert(record.quantity.clone(), record.base.clone());
                }
            }
        }
        Ok((order, bases))
    }

    /// Rejects records whose target is itself a converted unit.
    fn check_chaining(&self) -> Result<()> {
        let converted: FxHashSet<&str> = self
            .records
            .iter()
            .filter(|r| !r.is_base_declaration())
            .map(|r| r.source.as_str())
            .collect();
        match self.records.iter().find(|r| converted.contains(r.base.as_str())) {
            Some(record) => Err(ConversionError::ChainedDefinition {
                unit: record.source.clone(),
                base: record.base.clone(),
            }),
            None => Ok(()),
        }
    }

    /// Component order rows: hints, then per quantity in feed order its base
    /// followed by its other units. Units shared between quantities are only
    /// placed in the first row.
    fn resolve_component_order(
        &self,
        graph: &mut ConversionGraph,
        quantity_bases: &FxHashMap<String, String>,
    ) -> Result<()> {
        let mut resolver = TotalOrderResolver::new();
        for row in &self.order_hints {
            if let Some(unknown) = row.iter().find(|s| !graph.symbols.contains(*s)) {
                return Err(ConversionError::definition(
                    unknown.clone(),
                    "component order names an unknown symbol",
                ));
            }
            resolver.add_row(row.iter().cloned());
        }

        let mut placed: FxHashSet<&str> = FxHashSet::default();
        for quantity in &graph.quantity_order {
            let base = &quantity_bases[quantity];
            let mut row: Vec<String> = Vec::new();
            if is_atomic(base) {
                row.push(base.clone());
                placed.insert(base);
            }
            for record in self.records.iter().filter(|r| &r.quantity == quantity) {
                if is_atomic(&record.source) && placed.insert(record.source.as_str()) {
                    row.push(record.source.clone());
                }
            }
            resolver.add_row(row);
        }

        let order = resolver.resolve()?;
        debug!(symbols = order.len(), "component order resolved");
        graph.component_rank = order.iter().enumerate().map(|(i, s)| (s.clone(), i)).collect();
        graph.component_order = order;
        Ok(())
    }
}

/// Identity edges for every quantity's base unit.
fn insert_base_edges(graph: &mut ConversionGraph) {
    for quantity in graph.quantity_order.clone() {
        let base = graph.quantity_bases[&quantity].clone();
        graph
            .base_quantities
            .entry(base.clone())
            .or_default()
            .push(quantity.clone());
        graph
            .quantity_units
            .entry(quantity.clone())
            .or_default()
            .push(base.clone());
        match graph.edges.get_mut(&base) {
            Some(edge) => edge.quantities.push(quantity),
            None => {
                graph.edges.insert(
                    base.clone(),
                    ConversionEdge {
                        source: base.clone(),
                        base,
                        quantities: vec![quantity],
                        info: Default::default(),
                        systems: Vec::new(),
                        provenance: None,
                    },
                );
            }
        }
    }
}

fn insert_record(graph: &mut ConversionGraph, record: &EdgeRecord) -> Result<()> {
    let source = parse_defined(graph, &record.source)?;
    let base = graph.quantity_bases[&record.quantity].clone();
    let info = record.info();

    if source == base {
        // Base declaration, possibly spelled differently from the canonical base.
        if !info.is_identity() {
            return Err(ConversionError::definition(
                record.source.clone(),
                "a base unit must convert to itself with factor 1 and no offset",
            ));
        }
        if let Some(edge) = graph.edges.get_mut(&base) {
            merge_systems(&mut edge.systems, &record.systems);
            if edge.provenance.is_none() {
                edge.provenance = record.provenance.clone();
            }
        }
        register_systems(graph, &base, record);
        return Ok(());
    }

    match graph.edges.get_mut(&source) {
        Some(edge)
            if edge.base == base
                && edge.info == info
                && !edge.quantities.contains(&record.quantity) =>
        {
            edge.quantities.push(record.quantity.clone());
            merge_systems(&mut edge.systems, &record.systems);
        }
        Some(_) => {
            return Err(ConversionError::DuplicateUnitDefinition {
                unit: source.to_string(),
                provenance: record.describe(),
            });
        }
        None => {
            graph.edges.insert(
                source.clone(),
                ConversionEdge {
                    source: source.clone(),
                    base,
                    quantities: vec![record.quantity.clone()],
                    info,
                    systems: record.systems.clone(),
                    provenance: record.provenance.clone(),
                },
            );
        }
    }
    graph
        .quantity_units
        .entry(record.quantity.clone())
        .or_default()
        .push(source.clone());
    register_systems(graph, &source, record);
    Ok(())
}

fn register_systems(graph: &mut ConversionGraph, unit: &UnitIdentifier, record: &EdgeRecord) {
    for system in &record.systems {
        let units = graph.system_units.entry(*system).or_default();
        if !units.contains(unit) {
            units.push(unit.clone());
        }
    }
}

fn merge_systems(into: &mut Vec<UnitSystem>, from: &[UnitSystem]) {
    for system in from {
        if !into.contains(system) {
            into.push(*system);
        }
    }
}

fn validate_record(record: &EdgeRecord) -> Result<()> {
    if record.quantity.trim().is_empty() {
        return Err(ConversionError::definition(
            record.source.clone(),
            "record has no quantity",
        ));
    }
    for symbol in [&record.source, &record.base] {
        if !is_well_formed(symbol) {
            return Err(ConversionError::definition(
                symbol.clone(),
                "unit ids use lowercase letters, digits and single '-' separators",
            ));
        }
    }
    if record.factor.is_zero() {
        return Err(ConversionError::definition(record.source.clone(), "factor is zero"));
    }
    if record.is_base_declaration() && !record.info().is_identity() {
        return Err(ConversionError::definition(
            record.source.clone(),
            "a base unit must convert to itself with factor 1 and no offset",
        ));
    }
    Ok(())
}

/// Parses a unit id of the feed itself; failures are build errors.
fn parse_defined(graph: &ConversionGraph, text: &str) -> Result<UnitIdentifier> {
    graph
        .parse_unit(text)
        .map_err(|e| ConversionError::definition(text.to_string(), e.to_string()))
}

fn is_well_formed(id: &str) -> bool {
    !id.is_empty() && has_valid_chars(id) && id.split('-').all(|token| !token.is_empty())
}

fn is_atomic(symbol: &str) -> bool {
    !symbol.split('-').any(is_reserved)
}

fn is_base_symbol(symbol: &str, quantity_bases: &FxHashMap<String, String>) -> bool {
    quantity_bases.values().any(|b| b == symbol)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::UnitSystem;
    use crate::rational::Rational;
    use crate::testing::{fixture_records, init_tracing};

    fn r(s: &str) -> Rational {
        s.parse().unwrap()
    }

    fn length() -> GraphBuilder {
        GraphBuilder::new()
            .with_record(EdgeRecord::base("length", "meter"))
            .with_record(EdgeRecord::new("length", "foot", "meter").with_factor(r("0.3048")))
    }

    #[test]
    fn test_fixture_builds() {
        init_tracing();
        let graph = GraphBuilder::new().extend(fixture_records()).build().unwrap();
        assert!(graph.len() > 30);
        assert!(!graph.is_empty());
    }

    #[test]
    fn test_implicit_base() {
        let graph = GraphBuilder::new()
            .with_record(EdgeRecord::new("length", "foot", "meter").with_factor(r("0.3048")))
            .build()
            .unwrap();
        let meter = graph.lookup_symbol("meter").unwrap();
        assert!(meter.is_base());
        assert!(meter.info.is_identity());
        assert_eq!(graph.len(), 2);
    }

    #[test]
    fn test_duplicate_definition() {
        let err = length()
            .with_record(
                EdgeRecord::new("length", "foot", "meter")
                    .with_factor(r("0.3"))
                    .with_provenance("second feed"),
            )
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            ConversionError::DuplicateUnitDefinition {
                unit: "foot".into(),
                provenance: "second feed".into(),
            }
        );
        assert!(err.is_build_error());
    }

    #[test]
    fn test_conflicting_base() {
        let err = length()
            .with_record(EdgeRecord::new("length", "inch", "centimeter").with_factor(r("2.54")))
            .build()
            .unwrap_err();
        assert!(matches!(err, ConversionError::ConflictingBaseUnit { .. }));
    }

    #[test]
    fn test_chained_definition() {
        let err = length()
            .with_record(EdgeRecord::new("distance", "inch", "foot").with_factor(r("1/12")))
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            ConversionError::ChainedDefinition {
                unit: "inch".into(),
                base: "foot".into(),
            }
        );
    }

    #[test]
    fn test_compound_base_of_converted_units() {
        let err = length()
            .with_record(EdgeRecord::base("duration", "second"))
            .with_record(EdgeRecord::new("duration", "hour", "second").with_factor(r("3600")))
            .with_record(EdgeRecord::new("speed", "knot", "foot-per-hour").with_factor(r("6076/1")))
            .build()
            .unwrap_err();
        assert!(matches!(err, ConversionError::ChainedDefinition { .. }), "{err:?}");
    }

    #[test]
    fn test_bad_records() {
        let zero = length()
            .with_record(EdgeRecord::new("length", "inch", "meter").with_factor(r("0")))
            .build();
        assert!(matches!(zero, Err(ConversionError::InvalidDefinition { .. })));

        let scaled_base = GraphBuilder::new()
            .with_record(EdgeRecord::base("length", "meter").with_factor(r("2")))
            .build();
        assert!(matches!(scaled_base, Err(ConversionError::InvalidDefinition { .. })));

        let bad_symbol = GraphBuilder::new()
            .with_record(EdgeRecord::base("length", "Meter"))
            .build();
        assert!(matches!(bad_symbol, Err(ConversionError::InvalidDefinition { .. })));

        let unknown = length()
            .with_record(EdgeRecord::new("speed", "knot", "meter-per-second"))
            .build();
        assert!(
            matches!(unknown, Err(ConversionError::InvalidDefinition { .. })),
            "second is undefined"
        );
    }

    #[test]
    fn test_aliases_resolve_through_chains() {
        let graph = length()
            .with_record(EdgeRecord::base("duration", "second"))
            .with_alias("meter-per-second-squared", "meter-per-square-second")
            .with_alias("metre", "meter")
            .with_alias("metres", "metre")
            .with_alias("metre", "meter")
            .build()
            .unwrap();
        let accel = graph.parse_unit("meter-per-second-squared").unwrap();
        assert_eq!(accel.to_string(), "meter-per-square-second");
        assert_eq!(graph.parse_unit("metres").unwrap(), graph.parse_unit("meter").unwrap());
        assert_eq!(graph.resolve_alias("metre").map(|u| u.to_string()), Some("meter".into()));
        assert!(graph.resolve_alias("meter").is_none());
        assert!(graph.parse_unit("kilometre").is_err(), "aliases replace whole ids only");
    }

    #[test]
    fn test_alias_errors() {
        let definition_error = |builder: GraphBuilder, expected: &str| {
            match builder.build() {
                Err(ConversionError::InvalidDefinition { unit, .. }) => assert_eq!(unit, expected),
                other => panic!("expected InvalidDefinition for {expected}, got {other:?}"),
            }
        };
        definition_error(length().with_alias("yd", "yard"), "yard");
        definition_error(length().with_alias("a", "b").with_alias("b", "a"), "a");
        definition_error(length().with_alias("loop", "loop"), "loop");
        definition_error(length().with_alias("ft", "foot").with_alias("ft", "meter"), "ft");
        definition_error(length().with_alias("foot", "meter"), "foot");
        definition_error(length().with_alias("kilofoot", "meter"), "kilofoot");
        definition_error(length().with_alias("Feet", "foot"), "Feet");
    }

    #[test]
    fn test_ambiguous_quantity_needs_flag() {
        let unflagged = GraphBuilder::new()
            .with_record(EdgeRecord::base("length", "meter"))
            .with_record(EdgeRecord::base("area", "square-meter"))
            .with_record(EdgeRecord::base("consumption", "cubic-meter-per-meter"))
            .build()
            .unwrap_err();
        assert_eq!(
            unflagged,
            ConversionError::AmbiguousQuantity {
                unit: "square-meter".into(),
                quantities: vec!["area".into(), "consumption".into()],
            }
        );

        let flagged = GraphBuilder::new()
            .with_record(EdgeRecord::base("length", "meter"))
            .with_record(EdgeRecord::base("area", "square-meter").multi_quantity())
            .with_record(EdgeRecord::base("consumption", "cubic-meter-per-meter").multi_quantity())
            .build()
            .unwrap();
        let base = flagged.base_unit_of("area").unwrap();
        assert_eq!(flagged.quantities_of(base), ["area", "consumption"]);
    }

    #[test]
    fn test_shared_source_unit() {
        let graph = GraphBuilder::new()
            .with_record(EdgeRecord::base("portion", "part").multi_quantity())
            .with_record(EdgeRecord::base("concentration", "part").multi_quantity())
            .with_record(
                EdgeRecord::new("portion", "percent", "part")
                    .with_factor(r("1/100"))
                    .multi_quantity(),
            )
            .with_record(
                EdgeRecord::new("concentration", "percent", "part")
                    .with_factor(r("1/100"))
                    .multi_quantity(),
            )
            .build()
            .unwrap();
        let percent = graph.lookup_symbol("percent").unwrap();
        assert_eq!(percent.quantities, vec!["portion", "concentration"]);
    }

    #[test]
    fn test_component_order_hints() {
        let graph = length()
            .with_record(EdgeRecord::base("duration", "second"))
            .with_component_order(["second", "meter"])
            .build()
            .unwrap();
        assert_eq!(graph.parse_unit("meter-second").unwrap().to_string(), "second-meter");

        let conflict = length()
            .with_record(EdgeRecord::base("duration", "second"))
            .with_component_order(["second", "meter"])
            .with_component_order(["meter", "second"])
            .build();
        assert!(matches!(conflict, Err(ConversionError::IncompatibleOrdering { .. })));

        let unknown = length().with_component_order(["furlong"]).build();
        assert!(matches!(unknown, Err(ConversionError::InvalidDefinition { .. })));
    }

    #[test]
    fn test_systems_are_recorded() {
        let graph = GraphBuilder::new()
            .with_record(EdgeRecord::base("length", "meter").with_systems([UnitSystem::Si]))
            .with_record(
                EdgeRecord::new("length", "foot", "meter")
                    .with_factor(r("0.3048"))
                    .with_systems([UnitSystem::Ussystem, UnitSystem::Uksystem]),
            )
            .build()
            .unwrap();
        let meter = graph.parse_unit("meter").unwrap();
        assert_eq!(graph.systems_of(&meter), [UnitSystem::Si]);
        assert_eq!(graph.units_in_system(UnitSystem::Uksystem).len(), 1);
        assert_eq!(graph.units_of_quantity("length").len(), 2);
    }
}
