//! Graph value types: conversions, feed records and edges.

use crate::error::{ConversionError, Result};
use crate::rational::Rational;
use crate::unit_id::UnitIdentifier;
use std::fmt;
use std::str::FromStr;

/// Measurement system a unit is used in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum UnitSystem {
    /// SI units proper.
    Si,
    /// Metric but outside SI (`liter`, `hectare`).
    Metric,
    /// Accepted for use with SI (`minute`, `degree`).
    SiAcceptable,
    /// Commonly used alongside metric units.
    MetricAdjacent,
    /// Astronomical units (`light-year`, `parsec`).
    Astronomical,
    /// United States customary.
    Ussystem,
    /// British imperial.
    Uksystem,
    /// Traditional Japanese.
    Jpsystem,
    /// Units for ages of people.
    PersonAge,
    /// Anything else.
    Other,
}

impl UnitSystem {
    /// All systems.
    pub const ALL: [UnitSystem; 10] = [
        UnitSystem::Si,
        UnitSystem::Metric,
        UnitSystem::SiAcceptable,
        UnitSystem::MetricAdjacent,
        UnitSystem::Astronomical,
        UnitSystem::Ussystem,
        UnitSystem::Uksystem,
        UnitSystem::Jpsystem,
        UnitSystem::PersonAge,
        UnitSystem::Other,
    ];

    /// Tag as written in unit feeds.
    pub fn as_str(self) -> &'static str {
        match self {
            UnitSystem::Si => "si",
            UnitSystem::Metric => "metric",
            UnitSystem::SiAcceptable => "si_acceptable",
            UnitSystem::MetricAdjacent => "metric_adjacent",
            UnitSystem::Astronomical => "astronomical",
            UnitSystem::Ussystem => "ussystem",
            UnitSystem::Uksystem => "uksystem",
            UnitSystem::Jpsystem => "jpsystem",
            UnitSystem::PersonAge => "person_age",
            UnitSystem::Other => "other",
        }
    }

    /// SI, metric, or used alongside them.
    pub fn is_metric_like(self) -> bool {
        matches!(
            self,
            UnitSystem::Si
                | UnitSystem::Metric
                | UnitSystem::SiAcceptable
                | UnitSystem::MetricAdjacent
        )
    }
}

impl fmt::Display for UnitSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UnitSystem {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self> {
        UnitSystem::ALL
            .iter()
            .copied()
            .find(|system| system.as_str() == s)
            .ok_or_else(|| ConversionError::UnknownUnitSystem { name: s.to_string() })
    }
}

/// Affine map to a base unit: `base = amount * factor + offset`.
///
/// Ordered by factor, then offset.
///
/// # Examples
///
/// ```
/// use u_unitconv::graph::ConversionInfo;
/// use u_unitconv::rational::Rational;
///
/// let celsius = ConversionInfo::new(Rational::one(), "273.15".parse().unwrap());
/// let kelvin = celsius.apply(&Rational::from_integer(100));
/// assert_eq!(kelvin, "373.15".parse().unwrap());
/// assert_eq!(celsius.unapply(&kelvin).unwrap(), Rational::from_integer(100));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ConversionInfo {
    /// Multiplier.
    pub factor: Rational,
    /// Added after multiplying; non-zero only for scales like temperature.
    pub offset: Rational,
}

impl ConversionInfo {
    /// Creates a conversion.
    pub fn new(factor: Rational, offset: Rational) -> Self {
        Self { factor, offset }
    }

    /// Pure scaling without offset.
    pub fn scale(factor: Rational) -> Self {
        Self::new(factor, Rational::zero())
    }

    /// The identity conversion.
    pub fn identity() -> Self {
        Self::scale(Rational::one())
    }

    /// `amount * factor + offset`.
    pub fn apply(&self, amount: &Rational) -> Rational {
        amount * &self.factor + self.offset.clone()
    }

    /// `(amount - offset) / factor`.
    pub fn unapply(&self, amount: &Rational) -> Result<Rational> {
        (amount - &self.offset).checked_div(&self.factor)
    }

    /// The inverse map.
    pub fn invert(&self) -> Result<Self> {
        let factor = self.factor.reciprocal()?;
        let offset = -(&self.offset * &factor);
        Ok(Self { factor, offset })
    }

    /// Composes this to-base map with the inverse of `target`'s, giving a
    /// direct map from this unit to the target unit.
    pub fn compose_to(&self, target: &ConversionInfo) -> Result<Self> {
        let factor = self.factor.checked_div(&target.factor)?;
        let offset = (&self.offset - &target.offset).checked_div(&target.factor)?;
        Ok(Self { factor, offset })
    }

    /// Whether the offset is non-zero.
    pub fn has_offset(&self) -> bool {
        !self.offset.is_zero()
    }

    /// Whether this is the identity map.
    pub fn is_identity(&self) -> bool {
        !self.has_offset() && self.factor == Rational::one()
    }
}

impl Default for ConversionInfo {
    fn default() -> Self {
        Self::identity()
    }
}

impl fmt::Display for ConversionInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "x*{}", self.factor)?;
        if self.has_offset() {
            if self.offset.is_negative() {
                write!(f, " - {}", self.offset.abs())?;
            } else {
                write!(f, " + {}", self.offset)?;
            }
        }
        Ok(())
    }
}

/// One record of the unit-definition feed.
///
/// `source` converts to `base` (the base unit of `quantity`) by
/// `base = source * factor + offset`. A record whose source equals its base
/// declares the base unit of the quantity explicitly.
///
/// # Examples
///
/// ```
/// use u_unitconv::graph::{EdgeRecord, UnitSystem};
///
/// let foot = EdgeRecord::new("length", "foot", "meter")
///     .with_factor("0.3048".parse().unwrap())
///     .with_systems([UnitSystem::Ussystem, UnitSystem::Uksystem]);
/// assert!(!foot.is_base_declaration());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EdgeRecord {
    /// Quantity name.
    pub quantity: String,
    /// Unit being defined.
    pub source: String,
    /// Base unit of the quantity.
    pub base: String,
    /// Multiplier to the base unit.
    pub factor: Rational,
    /// Offset added after multiplying.
    pub offset: Rational,
    /// Systems the unit belongs to.
    pub systems: Vec<UnitSystem>,
    /// Allows the unit to be shared with other quantities.
    pub multi_quantity: bool,
    /// Where the record came from, for diagnostics only.
    pub provenance: Option<String>,
}

impl EdgeRecord {
    /// A record with identity conversion.
    pub fn new(
        quantity: impl Into<String>,
        source: impl Into<String>,
        base: impl Into<String>,
    ) -> Self {
        Self {
            quantity: quantity.into(),
            source: source.into(),
            base: base.into(),
            factor: Rational::one(),
            offset: Rational::zero(),
            systems: Vec::new(),
            multi_quantity: false,
            provenance: None,
        }
    }

    /// Declares `unit` as the base unit of `quantity`.
    pub fn base(quantity: impl Into<String>, unit: impl Into<String>) -> Self {
        let unit = unit.into();
        Self::new(quantity, unit.clone(), unit)
    }

    pub fn with_factor(mut self, factor: Rational) -> Self {
        self.factor = factor;
        self
    }

    pub fn with_offset(mut self, offset: Rational) -> Self {
        self.offset = offset;
        self
    }

    pub fn with_systems(mut self, systems: impl IntoIterator<Item = UnitSystem>) -> Self {
        self.systems = systems.into_iter().collect();
        self
    }

    /// Flags the unit as legitimately belonging to several quantities.
    pub fn multi_quantity(mut self) -> Self {
        self.multi_quantity = true;
        self
    }

    pub fn with_provenance(mut self, provenance: impl Into<String>) -> Self {
        self.provenance = Some(provenance.into());
        self
    }

    /// Whether the record declares a base unit.
    pub fn is_base_declaration(&self) -> bool {
        self.source == self.base
    }

    /// Conversion to the base unit.
    pub fn info(&self) -> ConversionInfo {
        ConversionInfo::new(self.factor.clone(), self.offset.clone())
    }

    /// Provenance, or a description of the record when none was given.
    pub fn describe(&self) -> String {
        match &self.provenance {
            Some(provenance) => provenance.clone(),
            None => format!("{} -> {} in {}", self.source, self.base, self.quantity),
        }
    }
}

/// A resolved graph edge from a unit to the base unit of its quantity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionEdge {
    /// Canonical source unit.
    pub source: UnitIdentifier,
    /// Canonical base unit.
    pub base: UnitIdentifier,
    /// Quantities the unit belongs to, in feed order.
    pub quantities: Vec<String>,
    /// Conversion to the base unit.
    pub info: ConversionInfo,
    /// Systems the unit belongs to.
    pub systems: Vec<UnitSystem>,
    /// Provenance of the defining record.
    pub provenance: Option<String>,
}

impl ConversionEdge {
    /// Whether this is the identity edge of a base unit.
    pub fn is_base(&self) -> bool {
        self.source == self.base
    }
}
