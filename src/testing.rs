//! Shared fixtures for unit tests.

use crate::graph::{ConversionGraph, EdgeRecord, UnitSystem};
use crate::rational::Rational;
use crate::unit_id::UnitIdentifier;
use once_cell::sync::Lazy;

static FIXTURE: Lazy<ConversionGraph> = Lazy::new(|| {
    ConversionGraph::builder()
        .extend(fixture_records())
        .with_alias("metre", "meter")
        .with_alias("mph", "mile-per-hour")
        .build()
        .unwrap()
});

fn r(s: &str) -> Rational {
    s.parse().unwrap()
}

fn edge(quantity: &str, source: &str, base: &str, factor: &str) -> EdgeRecord {
    EdgeRecord::new(quantity, source, base).with_factor(r(factor))
}

/// A small CLDR-like feed covering every kind of unit the engine handles.
pub(crate) fn fixture_records() -> Vec<EdgeRecord> {
    use UnitSystem::*;
    vec![
        EdgeRecord::base("mass", "kilogram").with_systems([Si, Metric]),
        edge("mass", "gram", "kilogram", "1/1000").with_systems([Si, Metric]),
        edge("mass", "pound", "kilogram", "0.45359237").with_systems([Ussystem, Uksystem]),
        EdgeRecord::base("length", "meter").with_systems([Si, Metric]),
        edge("length", "foot", "meter", "0.3048").with_systems([Ussystem, Uksystem]),
        edge("length", "inch", "meter", "0.0254").with_systems([Ussystem, Uksystem]),
        edge("length", "yard", "meter", "0.9144").with_systems([Ussystem, Uksystem]),
        edge("length", "mile", "meter", "1609.344").with_systems([Ussystem, Uksystem]),
        EdgeRecord::base("duration", "second").with_systems([Si, Metric]),
        edge("duration", "minute", "second", "60"),
        edge("duration", "hour", "second", "3600"),
        edge("duration", "day", "second", "86400"),
        edge("duration", "week", "second", "604800"),
        EdgeRecord::base("temperature", "kelvin").with_systems([Si, Metric]),
        EdgeRecord::new("temperature", "celsius", "kelvin")
            .with_offset(r("273.15"))
            .with_systems([Metric]),
        edge("temperature", "fahrenheit", "kelvin", "5/9")
            .with_offset(r("45967/180"))
            .with_systems([Ussystem]),
        EdgeRecord::base("speed", "meter-per-second"),
        edge("speed", "knot", "meter-per-second", "1852/3600"),
        EdgeRecord::base("area", "square-meter").multi_quantity(),
        edge("area", "acre", "square-meter", "4046.8564224").with_systems([Ussystem]),
        edge("area", "hectare", "square-meter", "10000").with_systems([Metric]),
        EdgeRecord::base("consumption", "cubic-meter-per-meter").multi_quantity(),
        edge("consumption", "liter-per-kilometer", "cubic-meter-per-meter", "1/1000000"),
        EdgeRecord::base("volume", "cubic-meter"),
        edge("volume", "liter", "cubic-meter", "1/1000").with_systems([Metric]),
        edge("volume", "gallon", "cubic-meter", "0.003785411784").with_systems([Ussystem]),
        edge("volume", "gallon-imperial", "cubic-meter", "0.00454609").with_systems([Uksystem]),
        EdgeRecord::base("force", "kilogram-meter-per-square-second"),
        edge("force", "newton", "kilogram-meter-per-square-second", "1").with_systems([Si]),
        EdgeRecord::base("energy", "kilogram-square-meter-per-square-second").multi_quantity(),
        edge("energy", "joule", "kilogram-square-meter-per-square-second", "1").with_systems([Si]),
        edge("energy", "calorie", "kilogram-square-meter-per-square-second", "4.184"),
        EdgeRecord::base("torque", "kilogram-square-meter-per-square-second").multi_quantity(),
        EdgeRecord::base("portion", "part"),
        edge("portion", "percent", "part", "1/100"),
        edge("portion", "permille", "part", "1/1000"),
        EdgeRecord::base("digital", "bit"),
        edge("digital", "byte", "bit", "8"),
    ]
}

/// The graph built from [`fixture_records`], shared between tests.
pub(crate) fn fixture_graph() -> ConversionGraph {
    FIXTURE.clone()
}

/// Parses and canonicalizes `text` against `graph`.
pub(crate) fn unit(graph: &ConversionGraph, text: &str) -> UnitIdentifier {
    graph.parse_unit(text).unwrap()
}

/// Installs a test subscriber honoring `RUST_LOG`; repeated calls are no-ops.
pub(crate) fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
