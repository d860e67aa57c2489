//! Conversion resolution over a [`ConversionGraph`].

use super::config::ResolverConfig;
use crate::error::{ConversionError, Result};
use crate::graph::{ConversionGraph, ConversionInfo};
use crate::mixed::MixedUnitConverter;
use crate::rational::Rational;
use crate::unit_id::UnitIdentifier;
use rustc_hash::FxHashSet;
use tracing::debug;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// A unit resolved to the base unit of its dimension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedUnit {
    /// Canonical form of the unit.
    pub unit: UnitIdentifier,
    /// Canonical base unit.
    pub base: UnitIdentifier,
    /// Conversion from `unit` to `base`.
    pub info: ConversionInfo,
    /// Quantities whose base unit is `base`. Empty for dimensions the feed
    /// does not name, such as `meter-second`.
    pub quantities: Vec<String>,
    /// Whether the unit was derived from its components rather than found
    /// directly in the graph.
    pub derived: bool,
}

/// A ready-to-apply conversion between two specific units.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ConversionPlan {
    /// Composed map from the source unit.
    pub info: ConversionInfo,
    /// The units measure reciprocal quantities; the mapped value is inverted.
    pub reciprocal: bool,
}

impl ConversionPlan {
    /// Applies the plan: `amount * factor + offset`, or `1 / (amount * factor)`
    /// for reciprocal plans.
    pub fn apply(&self, amount: &Rational) -> Result<Rational> {
        if self.reciprocal {
            (amount * &self.info.factor).reciprocal()
        } else {
            Ok(self.info.apply(amount))
        }
    }
}

/// Dimension of a unit as seen by [`ConversionResolver::is_convertible`].
struct Dimension {
    base: UnitIdentifier,
    offset: bool,
}

/// Converts amounts between units of a [`ConversionGraph`].
///
/// # Examples
///
/// ```
/// use u_unitconv::graph::{ConversionGraph, EdgeRecord};
/// use u_unitconv::rational::Rational;
/// use u_unitconv::resolver::ConversionResolver;
///
/// let foot = EdgeRecord::new("length", "foot", "meter").with_factor("0.3048".parse().unwrap());
/// let hour = EdgeRecord::new("duration", "hour", "second").with_factor("3600".parse().unwrap());
/// let graph = ConversionGraph::builder()
///     .with_record(foot)
///     .with_record(hour)
///     .build()
///     .unwrap();
/// let resolver = ConversionResolver::new(&graph);
///
/// let meters = resolver.convert_str(&Rational::one(), "foot", "meter").unwrap();
/// assert_eq!(meters, Rational::new(381, 1250).unwrap());
///
/// // Not in the graph: derived from `foot` and `hour`.
/// let fph = resolver.convert_str(&Rational::one(), "meter-per-second", "foot-per-hour");
/// assert_eq!(fph.unwrap(), Rational::new(4_500_000, 381).unwrap());
/// ```
#[derive(Debug, Clone)]
pub struct ConversionResolver<'g> {
    graph: &'g ConversionGraph,
    config: ResolverConfig,
}

impl<'g> ConversionResolver<'g> {
    /// Creates a resolver with the default configuration.
    pub fn new(graph: &'g ConversionGraph) -> Self {
        Self {
            graph,
            config: ResolverConfig::default(),
        }
    }

    /// Creates a resolver with a validated configuration.
    pub fn with_config(graph: &'g ConversionGraph, config: ResolverConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { graph, config })
    }

    pub fn graph(&self) -> &'g ConversionGraph {
        self.graph
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Resolves a unit to its base unit and conversion.
    ///
    /// Units absent from the graph are derived element by element: each
    /// element contributes `(prefix * factor)^power` and its base unit raised
    /// to `power`. An offset is only allowed for a lone element with power 1.
    pub fn resolve(&self, unit: &UnitIdentifier) -> Result<ResolvedUnit> {
        let unit = self.graph.canonicalize(unit);
        if let Some(edge) = self.graph.lookup(&unit) {
            return Ok(ResolvedUnit {
                quantities: self.graph.quantities_for_base(&edge.base).to_vec(),
                base: edge.base.clone(),
                info: edge.info.clone(),
                unit,
                derived: false,
            });
        }
        if !self.config.structural_derivation {
            return Err(ConversionError::UnconvertibleUnit {
                unit: unit.to_string(),
            });
        }

        let lone = unit.len() == 1;
        let mut factor = Rational::one();
        let mut offset = Rational::zero();
        let mut base = UnitIdentifier::dimensionless();
        for element in unit.elements() {
            let edge = self
                .graph
                .lookup(&UnitIdentifier::simple(element.symbol.clone()))
                .ok_or_else(|| ConversionError::UnconvertibleUnit {
                    unit: unit.to_string(),
                })?;
            let scale = match element.prefix {
                Some(prefix) => prefix.factor() * &edge.info.factor,
                None => edge.info.factor.clone(),
            };
            if edge.info.has_offset() {
                if !(lone && element.power == 1) {
                    return Err(ConversionError::OffsetInCompoundUnit {
                        unit: unit.to_string(),
                    });
                }
                offset = edge.info.offset.clone();
            }
            factor = factor * scale.pow(element.power)?;
            base = base.times(&edge.base.pow(element.power));
        }
        let base = self.graph.canonicalize(&base);
        debug!(unit = %unit, base = %base, factor = %factor, "derived unit");

        Ok(ResolvedUnit {
            quantities: self.graph.quantities_for_base(&base).to_vec(),
            info: ConversionInfo::new(factor, offset),
            base,
            unit,
            derived: true,
        })
    }

    /// Builds the conversion from `source` to `target`.
    ///
    /// # Errors
    ///
    /// [`ConversionError::IncompatibleUnits`] when the units measure neither
    /// the same dimension nor, with the reciprocal fallback enabled,
    /// reciprocal ones. Errors from [`resolve`](Self::resolve) pass through.
    pub fn plan(&self, source: &UnitIdentifier, target: &UnitIdentifier) -> Result<ConversionPlan> {
        let source = self.resolve(source)?;
        let target = self.resolve(target)?;

        if source.base == target.base {
            let info = source.info.compose_to(&target.info)?;
            debug!(source = %source.unit, target = %target.unit, %info, "conversion plan");
            return Ok(ConversionPlan {
                info,
                reciprocal: false,
            });
        }

        let reciprocal_base = self.graph.canonicalize(&target.base.reciprocal());
        let offsets = source.info.has_offset() || target.info.has_offset();
        if self.config.reciprocal_fallback && source.base == reciprocal_base && !offsets {
            let info = ConversionInfo::scale(&source.info.factor * &target.info.factor);
            debug!(
                source = %source.unit,
                target = %target.unit,
                %info,
                "reciprocal conversion plan"
            );
            return Ok(ConversionPlan {
                info,
                reciprocal: true,
            });
        }

        Err(ConversionError::incompatible(&source.unit, &target.unit))
    }

    /// Converts an exact amount.
    pub fn convert(
        &self,
        amount: &Rational,
        source: &UnitIdentifier,
        target: &UnitIdentifier,
    ) -> Result<Rational> {
        self.plan(source, target)?.apply(amount)
    }

    /// Converts an exact amount between units given as text.
    pub fn convert_str(&self, amount: &Rational, source: &str, target: &str) -> Result<Rational> {
        let source = self.graph.parse_unit(source)?;
        let target = self.graph.parse_unit(target)?;
        self.convert(amount, &source, &target)
    }

    /// Boundary conversion for floats. The input is taken at its exact binary
    /// value and only the result is rounded.
    pub fn convert_lossy(
        &self,
        value: f64,
        source: &UnitIdentifier,
        target: &UnitIdentifier,
    ) -> Result<f64> {
        let amount = Rational::from_f64(value)?;
        Ok(self.convert(&amount, source, target)?.to_f64())
    }

    /// Boundary conversion to a decimal string with the configured number of
    /// fraction digits.
    pub fn convert_decimal(
        &self,
        amount: &Rational,
        source: &UnitIdentifier,
        target: &UnitIdentifier,
    ) -> Result<String> {
        let result = self.convert(amount, source, target)?;
        Ok(result.to_decimal_string(self.config.decimal_digits))
    }

    /// Converts many amounts with one plan.
    pub fn convert_batch(
        &self,
        amounts: &[Rational],
        source: &UnitIdentifier,
        target: &UnitIdentifier,
    ) -> Result<Vec<Rational>> {
        let plan = self.plan(source, target)?;
        apply_all(&plan, amounts, self.config.parallel)
    }

    /// Splits an amount over decreasing units; see [`MixedUnitConverter::decompose`].
    pub fn convert_mixed(
        &self,
        amount: &Rational,
        source: &UnitIdentifier,
        targets: &[UnitIdentifier],
    ) -> Result<Vec<Rational>> {
        MixedUnitConverter::new(self).decompose(amount, source, targets)
    }

    /// Whether the two units measure the same dimension, or reciprocal ones
    /// when the fallback is enabled.
    ///
    /// Reciprocal pairs involving an offset unit are rejected, as in
    /// [`plan`](Self::plan). For same-dimension pairs the check stays
    /// dimensional: a compound offset unit such as `celsius-per-second` passes
    /// here even though converting it fails with
    /// [`ConversionError::OffsetInCompoundUnit`].
    pub fn is_convertible(&self, source: &UnitIdentifier, target: &UnitIdentifier) -> bool {
        let (Some(source), Some(target)) = (self.dimension_of(source), self.dimension_of(target))
        else {
            return false;
        };
        if source.base == target.base {
            return true;
        }
        self.config.reciprocal_fallback
            && !source.offset
            && !target.offset
            && source.base == self.graph.canonicalize(&target.base.reciprocal())
    }

    /// Base unit of a unit's dimension and whether any of its components
    /// carries an offset.
    fn dimension_of(&self, unit: &UnitIdentifier) -> Option<Dimension> {
        let unit = self.graph.canonicalize(unit);
        if let Some(edge) = self.graph.lookup(&unit) {
            return Some(Dimension {
                base: edge.base.clone(),
                offset: edge.info.has_offset(),
            });
        }
        if !self.config.structural_derivation {
            return None;
        }
        let mut base = UnitIdentifier::dimensionless();
        let mut offset = false;
        for element in unit.elements() {
            let edge = self.graph.lookup(&UnitIdentifier::simple(element.symbol.clone()))?;
            offset |= edge.info.has_offset();
            base = base.times(&edge.base.pow(element.power));
        }
        Some(Dimension {
            base: self.graph.canonicalize(&base),
            offset,
        })
    }

    /// Units of the graph that measure one of the quantities of `unit`,
    /// in feed order without repeats.
    ///
    /// Units whose base belongs to no named quantity have no convertible
    /// units listed, even though they may still convert structurally.
    pub fn convertible_units(&self, unit: &UnitIdentifier) -> Result<Vec<UnitIdentifier>> {
        let resolved = self.resolve(unit)?;
        let mut seen = FxHashSet::default();
        Ok(self
            .graph
            .quantities_for_base(&resolved.base)
            .iter()
            .flat_map(|quantity| self.graph.units_of_quantity(quantity))
            .filter(|unit| seen.insert(*unit))
            .cloned()
            .collect())
    }

    /// Quantities a unit measures. Reciprocals of named quantities get an
    /// `-inverse` suffix (`speed-inverse` for pace units).
    pub fn quantity_of(&self, unit: &UnitIdentifier) -> Result<Vec<String>> {
        let resolved = self.resolve(unit)?;
        if !resolved.quantities.is_empty() {
            return Ok(resolved.quantities);
        }
        let inverse = self.graph.canonicalize(&resolved.base.reciprocal());
        Ok(self
            .graph
            .quantities_for_base(&inverse)
            .iter()
            .map(|q| format!("{q}-inverse"))
            .collect())
    }
}

/// Applies one plan to every amount.
#[cfg(feature = "parallel")]
fn apply_all(
    plan: &ConversionPlan,
    amounts: &[Rational],
    parallel: bool,
) -> Result<Vec<Rational>> {
    if parallel {
        amounts.par_iter().map(|amount| plan.apply(amount)).collect()
    } else {
        amounts.iter().map(|amount| plan.apply(amount)).collect()
    }
}

#[cfg(not(feature = "parallel"))]
fn apply_all(
    plan: &ConversionPlan,
    amounts: &[Rational],
    _parallel: bool,
) -> Result<Vec<Rational>> {
    amounts.iter().map(|amount| plan.apply(amount)).collect()
}
