//! Mixed-unit representation.
//!
//! An amount written over several decreasing units of one dimension, such
//! as `1 hour 30 minutes` or `5 feet 11 inches`. Every component but the
//! last is a whole number and the last carries the exact remainder, so
//! recomposing loses nothing. Mixed units are written with an `-and-`
//! separator (`hour-and-minute-and-second`).

mod converter;

pub use converter::{format_mixed_unit, parse_mixed_unit, MixedUnitConverter, MIXED_SEPARATOR};
