//! Mixed-radix decomposition over decreasing units.

use crate::error::{ConversionError, Result};
use crate::graph::ConversionGraph;
use crate::rational::Rational;
use crate::resolver::{ConversionResolver, ResolvedUnit};
use crate::unit_id::UnitIdentifier;
use tracing::debug;

/// Separator between the units of a mixed unit (`foot-and-inch`).
pub const MIXED_SEPARATOR: &str = "-and-";

/// Splits amounts over sequences like `[hour, minute, second]` and joins them
/// back.
///
/// # Examples
///
/// ```
/// use u_unitconv::graph::{ConversionGraph, EdgeRecord};
/// use u_unitconv::mixed::{parse_mixed_unit, MixedUnitConverter};
/// use u_unitconv::rational::Rational;
/// use u_unitconv::resolver::ConversionResolver;
///
/// let hour = EdgeRecord::new("duration", "hour", "second").with_factor(Rational::from(3600));
/// let minute = EdgeRecord::new("duration", "minute", "second").with_factor(Rational::from(60));
/// let graph = ConversionGraph::builder()
///     .with_record(hour)
///     .with_record(minute)
///     .build()
///     .unwrap();
/// let resolver = ConversionResolver::new(&graph);
/// let converter = MixedUnitConverter::new(&resolver);
///
/// let second = graph.parse_unit("second").unwrap();
/// let hms = parse_mixed_unit(&graph, "hour-and-minute-and-second").unwrap();
/// let parts = converter.decompose(&Rational::from(5400), &second, &hms).unwrap();
/// assert_eq!(parts, vec![Rational::from(1), Rational::from(30), Rational::from(0)]);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct MixedUnitConverter<'r, 'g> {
    resolver: &'r ConversionResolver<'g>,
}

impl<'r, 'g> MixedUnitConverter<'r, 'g> {
    pub fn new(resolver: &'r ConversionResolver<'g>) -> Self {
        Self { resolver }
    }

    /// Resolves and validates a unit sequence.
    ///
    /// # Errors
    ///
    /// - [`ConversionError::EmptyMixedUnit`] for an empty sequence.
    /// - [`ConversionError::IncompatibleUnits`] if the units differ in dimension.
    /// - [`ConversionError::OffsetInCompoundUnit`] if a sequence of several
    ///   units contains an offset unit.
    /// - [`ConversionError::DecreasingMagnitudeRequired`] unless every unit is
    ///   strictly smaller than the one before it.
    pub fn magnitudes(&self, units: &[UnitIdentifier]) -> Result<Vec<ResolvedUnit>> {
        if units.is_empty() {
            return Err(ConversionError::EmptyMixedUnit);
        }
        let resolved = units
            .iter()
            .map(|unit| self.resolver.resolve(unit))
            .collect::<Result<Vec<_>>>()?;
        if resolved.len() == 1 {
            return Ok(resolved);
        }

        let first = &resolved[0];
        if let Some(other) = resolved.iter().find(|r| r.base != first.base) {
            return Err(ConversionError::incompatible(&first.unit, &other.unit));
        }
        if resolved.iter().any(|r| r.info.has_offset()) {
            return Err(ConversionError::OffsetInCompoundUnit {
                unit: format_mixed_unit(units),
            });
        }
        if let Some(pair) = resolved.windows(2).find(|w| w[0].info.factor <= w[1].info.factor) {
            return Err(ConversionError::DecreasingMagnitudeRequired {
                previous: pair[0].unit.to_string(),
                next: pair[1].unit.to_string(),
            });
        }
        Ok(resolved)
    }

    /// Splits `amount` of `source` over `targets`.
    ///
    /// Every component but the last is an integer, and converting the
    /// components back to the base unit sums to the original amount exactly.
    /// Negative amounts give all components negative. A single target is an
    /// ordinary conversion.
    pub fn decompose(
        &self,
        amount: &Rational,
        source: &UnitIdentifier,
        targets: &[UnitIdentifier],
    ) -> Result<Vec<Rational>> {
        let units = self.magnitudes(targets)?;
        if let [single] = units.as_slice() {
            return Ok(vec![self.resolver.convert(amount, source, &single.unit)?]);
        }

        let source = self.resolver.resolve(source)?;
        let first = &units[0];
        if source.base != first.base {
            return Err(ConversionError::incompatible(&source.unit, &first.unit));
        }

        let base_amount = source.info.apply(amount);
        let negative = base_amount.is_negative();
        let mut remainder = base_amount.abs();
        let mut components = Vec::with_capacity(units.len());
        for unit in &units[..units.len() - 1] {
            let whole = remainder.checked_div(&unit.info.factor)?.floor();
            remainder = remainder - &whole * &unit.info.factor;
            components.push(whole);
        }
        let last = &units[units.len() - 1];
        components.push(remainder.checked_div(&last.info.factor)?);

        if negative {
            components = components.into_iter().map(|c| -c).collect();
        }
        debug!(
            source = %source.unit,
            targets = %format_mixed_unit(targets),
            "mixed decomposition"
        );
        Ok(components)
    }

    /// Joins components back into one amount of `target`.
    pub fn recompose(
        &self,
        components: &[Rational],
        units: &[UnitIdentifier],
        target: &UnitIdentifier,
    ) -> Result<Rational> {
        let resolved = self.magnitudes(units)?;
        if components.len() != resolved.len() {
            return Err(ConversionError::ComponentCountMismatch {
                expected: resolved.len(),
                found: components.len(),
            });
        }
        let first = &resolved[0];
        let mut total = Rational::zero();
        for (component, unit) in components.iter().zip(&resolved) {
            total = total + component * &unit.info.factor.checked_div(&first.info.factor)?;
        }
        self.resolver.convert(&total, &first.unit, target)
    }
}

/// Parses a mixed unit such as `foot-and-inch` into canonical units.
pub fn parse_mixed_unit(graph: &ConversionGraph, input: &str) -> Result<Vec<UnitIdentifier>> {
    if input.is_empty() {
        return Err(ConversionError::EmptyMixedUnit);
    }
    input
        .split(MIXED_SEPARATOR)
        .map(|part| {
            if part.is_empty() {
                Err(ConversionError::syntax(input, "empty unit in mixed unit"))
            } else {
                graph.parse_unit(part)
            }
        })
        .collect()
}

/// Formats units as a mixed unit such as `foot-and-inch`.
pub fn format_mixed_unit(units: &[UnitIdentifier]) -> String {
    units
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(MIXED_SEPARATOR)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{fixture_graph, unit};
    use proptest::prelude::*;

    fn r(s: &str) -> Rational {
        s.parse().unwrap()
    }

    fn decompose(amount: &str, source: &str, targets: &str) -> Result<Vec<Rational>> {
        let graph = fixture_graph();
        let resolver = ConversionResolver::new(&graph);
        let targets = parse_mixed_unit(&graph, targets)?;
        MixedUnitConverter::new(&resolver).decompose(&r(amount), &unit(&graph, source), &targets)
    }

    #[test]
    fn test_hours_minutes_seconds() {
        assert_eq!(
            decompose("5400", "second", "hour-and-minute-and-second").unwrap(),
            vec![r("1"), r("30"), r("0")]
        );
        assert_eq!(
            decompose("3725.5", "second", "hour-and-minute-and-second").unwrap(),
            vec![r("1"), r("2"), r("5.5")]
        );
    }

    #[test]
    fn test_feet_and_inches() {
        assert_eq!(
            decompose("1", "meter", "foot-and-inch").unwrap(),
            vec![r("3"), r("428/127")]
        );
        assert_eq!(decompose("1", "mile", "yard-and-foot").unwrap(), vec![r("1760"), r("0")]);
    }

    #[test]
    fn test_negative_amounts() {
        assert_eq!(
            decompose("-5400", "second", "hour-and-minute-and-second").unwrap(),
            vec![r("-1"), r("-30"), r("0")]
        );
        assert_eq!(
            decompose("-90", "second", "minute-and-second").unwrap(),
            vec![r("-1"), r("-30")]
        );
    }

    #[test]
    fn test_single_target_is_plain_conversion() {
        assert_eq!(decompose("100", "celsius", "fahrenheit").unwrap(), vec![r("212")]);
        assert_eq!(
            decompose("10", "kilometer-per-hour", "minute-per-kilometer").unwrap(),
            vec![r("6")]
        );
    }

    #[test]
    fn test_sequence_errors() {
        assert_eq!(
            decompose("1", "second", "minute-and-hour"),
            Err(ConversionError::DecreasingMagnitudeRequired {
                previous: "minute".into(),
                next: "hour".into(),
            })
        );
        assert!(matches!(
            decompose("1", "second", "minute-and-minute"),
            Err(ConversionError::DecreasingMagnitudeRequired { .. })
        ));
        assert!(matches!(
            decompose("1", "second", "hour-and-foot"),
            Err(ConversionError::IncompatibleUnits { .. })
        ));
        assert!(matches!(
            decompose("1", "meter", "hour-and-minute"),
            Err(ConversionError::IncompatibleUnits { .. })
        ));
        assert!(matches!(
            decompose("1", "kelvin", "kelvin-and-celsius"),
            Err(ConversionError::OffsetInCompoundUnit { .. })
        ));

        let graph = fixture_graph();
        let resolver = ConversionResolver::new(&graph);
        let converter = MixedUnitConverter::new(&resolver);
        assert_eq!(
            converter.decompose(&r("1"), &unit(&graph, "second"), &[]),
            Err(ConversionError::EmptyMixedUnit)
        );
    }

    #[test]
    fn test_recompose() {
        let graph = fixture_graph();
        let resolver = ConversionResolver::new(&graph);
        let converter = MixedUnitConverter::new(&resolver);
        let hms = parse_mixed_unit(&graph, "hour-and-minute-and-second").unwrap();
        let seconds = converter
            .recompose(&[r("1"), r("30"), r("15")], &hms, &unit(&graph, "second"))
            .unwrap();
        assert_eq!(seconds, r("5415"));

        let ft_in = parse_mixed_unit(&graph, "foot-and-inch").unwrap();
        let meters = converter
            .recompose(&[r("3"), r("428/127")], &ft_in, &unit(&graph, "meter"))
            .unwrap();
        assert_eq!(meters, r("1"));

        assert_eq!(
            converter.recompose(&[r("1")], &ft_in, &unit(&graph, "meter")),
            Err(ConversionError::ComponentCountMismatch { expected: 2, found: 1 })
        );
    }

    #[test]
    fn test_parse_and_format_mixed_unit() {
        let graph = fixture_graph();
        let units = parse_mixed_unit(&graph, "foot-and-inch").unwrap();
        assert_eq!(units.len(), 2);
        assert_eq!(format_mixed_unit(&units), "foot-and-inch");

        let units = parse_mixed_unit(&graph, "gallon-imperial-and-liter").unwrap();
        assert_eq!(units[0].to_string(), "gallon-imperial");

        assert_eq!(parse_mixed_unit(&graph, ""), Err(ConversionError::EmptyMixedUnit));
        assert!(parse_mixed_unit(&graph, "foot-and-").is_err());
        assert!(parse_mixed_unit(&graph, "foot-and-and-inch").is_err());
    }

    #[test]
    fn test_resolver_entry_point() {
        let graph = fixture_graph();
        let resolver = ConversionResolver::new(&graph);
        let targets = parse_mixed_unit(&graph, "day-and-hour").unwrap();
        let parts = resolver
            .convert_mixed(&r("1.5"), &unit(&graph, "week"), &targets)
            .unwrap();
        assert_eq!(parts, vec![r("10"), r("12")]);
    }

    fn sequence() -> impl Strategy<Value = &'static str> {
        prop::sample::select(vec![
            "hour-and-minute-and-second",
            "week-and-day-and-hour",
            "mile-and-yard-and-foot-and-inch",
            "foot-and-inch",
            "kilometer-and-meter-and-centimeter",
            "pound-and-gram",
        ])
    }

    proptest! {
        #[test]
        fn prop_decomposition_sums_back(
            targets in sequence(),
            numerator in -10_000_000i64..10_000_000,
            denominator in 1i64..1000,
        ) {
            let graph = fixture_graph();
            let resolver = ConversionResolver::new(&graph);
            let converter = MixedUnitConverter::new(&resolver);
            let units = parse_mixed_unit(&graph, targets).unwrap();
            let resolved = converter.magnitudes(&units).unwrap();
            let base = resolved[0].base.clone();
            let x = Rational::new(numerator, denominator).unwrap();

            let parts = converter.decompose(&x, &base, &units).unwrap();
            prop_assert_eq!(parts.len(), units.len());
            for part in &parts[..parts.len() - 1] {
                prop_assert!(part.is_integer());
            }
            let sum: Rational = parts
                .iter()
                .zip(&resolved)
                .map(|(part, unit)| part * &unit.info.factor)
                .sum();
            prop_assert_eq!(sum, x);
        }
    }
}
