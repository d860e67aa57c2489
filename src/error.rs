//! Error taxonomy for the conversion engine.
//!
//! Every failure mode has its own variant so that validation tooling can
//! attribute a specific fault instead of a generic failure. Graph
//! construction errors ([`ConversionError::is_build_error`]) are fatal:
//! a graph is either built completely or not at all.

use thiserror::Error;

/// Errors produced by parsing, building, resolving and converting.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConversionError {
    /// Division by zero, or the reciprocal of zero.
    #[error("division by zero")]
    DivisionByZero,

    /// A floating-point input was NaN or infinite.
    #[error("value is not finite: {value}")]
    NonFiniteValue {
        /// Textual form of the rejected value.
        value: String,
    },

    /// A rational literal could not be parsed.
    #[error("invalid rational literal '{input}': {reason}")]
    InvalidRational {
        /// The literal as given.
        input: String,
        /// What is wrong with it.
        reason: String,
    },

    /// A unit identifier is malformed.
    #[error("invalid unit syntax in '{input}': {reason}")]
    InvalidUnitSyntax {
        /// The identifier as given.
        input: String,
        /// What is wrong with it.
        reason: String,
    },

    /// A token ends in a known unit but starts with something that is not a prefix.
    #[error("unknown prefix '{prefix}' in '{input}'")]
    UnknownPrefix {
        /// The identifier as given.
        input: String,
        /// The unrecognized leading part.
        prefix: String,
    },

    /// A token does not name any known unit.
    #[error("unknown unit '{symbol}' in '{input}'")]
    UnknownBaseUnit {
        /// The identifier as given.
        input: String,
        /// The unrecognized symbol.
        symbol: String,
    },

    /// A unit-system tag is not recognized.
    #[error("unknown unit system '{name}'")]
    UnknownUnitSystem {
        /// The rejected tag.
        name: String,
    },

    /// A source unit is defined twice in the feed.
    #[error("duplicate definition of unit '{unit}' ({provenance})")]
    DuplicateUnitDefinition {
        /// The redefined unit.
        unit: String,
        /// Where the second definition came from.
        provenance: String,
    },

    /// Two records assign different base units to the same quantity.
    #[error("quantity '{quantity}' has base unit '{existing}', record declares '{found}'")]
    ConflictingBaseUnit {
        /// The quantity name.
        quantity: String,
        /// Base unit from the first record.
        existing: String,
        /// Base unit from the conflicting record.
        found: String,
    },

    /// A record converts to something that is not a base unit.
    #[error("unit '{unit}' converts to '{base}', which is not a base unit")]
    ChainedDefinition {
        /// The source unit of the record.
        unit: String,
        /// The non-base target of the record.
        base: String,
    },

    /// A unit belongs to several quantities without the multi-quantity flag.
    #[error(
        "unit '{unit}' is claimed by quantities [{}] without the multi-quantity flag",
        .quantities.join(", ")
    )]
    AmbiguousQuantity {
        /// The ambiguous unit.
        unit: String,
        /// All quantities claiming it.
        quantities: Vec<String>,
    },

    /// A feed record is otherwise invalid.
    #[error("invalid definition of '{unit}': {reason}")]
    InvalidDefinition {
        /// The offending unit or quantity.
        unit: String,
        /// What is wrong with it.
        reason: String,
    },

    /// A unit cannot be resolved to any base unit.
    #[error("unit '{unit}' cannot be converted")]
    UnconvertibleUnit {
        /// The unit (normalized when possible).
        unit: String,
    },

    /// Two units do not measure the same (or reciprocal) quantity.
    #[error("cannot convert '{source_unit}' to '{target_unit}'")]
    IncompatibleUnits {
        /// Normalized source identifier.
        source_unit: String,
        /// Normalized target identifier.
        target_unit: String,
    },

    /// An offset-bearing unit (such as a temperature scale) used inside a compound.
    #[error("offset unit cannot be used in compound unit '{unit}'")]
    OffsetInCompoundUnit {
        /// The compound identifier.
        unit: String,
    },

    /// Ordering rows contradict each other.
    #[error("incompatible ordering among [{}]", .items.join(", "))]
    IncompatibleOrdering {
        /// A minimal set of items whose relative order is contradictory.
        items: Vec<String>,
    },

    /// An ordering row lists the same item twice.
    #[error("item '{item}' appears twice in one ordering row")]
    DuplicateOrderingItem {
        /// The repeated item.
        item: String,
    },

    /// Mixed-unit targets are not strictly decreasing in magnitude.
    #[error("mixed units must strictly decrease in magnitude: '{previous}' then '{next}'")]
    DecreasingMagnitudeRequired {
        /// The earlier unit.
        previous: String,
        /// The unit that is not smaller than the earlier one.
        next: String,
    },

    /// A mixed-unit conversion was requested with no target units.
    #[error("mixed unit needs at least one target unit")]
    EmptyMixedUnit,

    /// Mixed-unit components do not match the number of units.
    #[error("expected {expected} mixed-unit components, found {found}")]
    ComponentCountMismatch {
        /// Number of units.
        expected: usize,
        /// Number of components given.
        found: usize,
    },

    /// Configuration failed validation.
    #[error("invalid configuration: {message}")]
    InvalidConfig {
        /// What is wrong with the configuration.
        message: String,
    },
}

impl ConversionError {
    pub(crate) fn syntax(input: &str, reason: impl Into<String>) -> Self {
        Self::InvalidUnitSyntax {
            input: input.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn definition(unit: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidDefinition {
            unit: unit.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn incompatible(source: impl ToString, target: impl ToString) -> Self {
        Self::IncompatibleUnits {
            source_unit: source.to_string(),
            target_unit: target.to_string(),
        }
    }

    /// Whether this error comes from graph construction and must abort startup.
    pub fn is_build_error(&self) -> bool {
        matches!(
            self,
            Self::DuplicateUnitDefinition { .. }
                | Self::ConflictingBaseUnit { .. }
                | Self::ChainedDefinition { .. }
                | Self::AmbiguousQuantity { .. }
                | Self::InvalidDefinition { .. }
                | Self::IncompatibleOrdering { .. }
                | Self::DuplicateOrderingItem { .. }
        )
    }

    /// Stable short name of the error kind, for attribution in reports.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::DivisionByZero => "division-by-zero",
            Self::NonFiniteValue { .. } => "non-finite-value",
            Self::InvalidRational { .. } => "invalid-rational",
            Self::InvalidUnitSyntax { .. } => "invalid-unit-syntax",
            Self::UnknownPrefix { .. } => "unknown-prefix",
            Self::UnknownBaseUnit { .. } => "unknown-base-unit",
            Self::UnknownUnitSystem { .. } => "unknown-unit-system",
            Self::DuplicateUnitDefinition { .. } => "duplicate-unit-definition",
            Self::ConflictingBaseUnit { .. } => "conflicting-base-unit",
            Self::ChainedDefinition { .. } => "chained-definition",
            Self::AmbiguousQuantity { .. } => "ambiguous-quantity",
            Self::InvalidDefinition { .. } => "invalid-definition",
            Self::UnconvertibleUnit { .. } => "unconvertible-unit",
            Self::IncompatibleUnits { .. } => "incompatible-units",
            Self::OffsetInCompoundUnit { .. } => "offset-in-compound-unit",
            Self::IncompatibleOrdering { .. } => "incompatible-ordering",
            Self::DuplicateOrderingItem { .. } => "duplicate-ordering-item",
            Self::DecreasingMagnitudeRequired { .. } => "decreasing-magnitude-required",
            Self::EmptyMixedUnit => "empty-mixed-unit",
            Self::ComponentCountMismatch { .. } => "component-count-mismatch",
            Self::InvalidConfig { .. } => "invalid-config",
        }
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, ConversionError>;
