//! Exact-rational unit conversion engine.
//!
//! Converts amounts between measurement units with no floating-point error:
//!
//! - **Rational**: arbitrary-precision fractions for every factor, offset
//!   and amount, plus a parser for the literal forms of definition feeds.
//! - **Unit identifiers**: the `kilogram-meter-per-square-second` grammar
//!   with SI and binary prefixes and powers.
//! - **Ordering**: merges partial orders into one total order, which fixes
//!   the canonical spelling of compound units.
//! - **Conversion graph**: validated one-hop edges from every unit to the
//!   base unit of its quantity.
//! - **Resolver**: direct, derived, offset and reciprocal conversions, with a
//!   concurrent plan cache.
//! - **Mixed units**: `hour-and-minute-and-second` style decomposition with
//!   an exact remainder.
//!
//! # Architecture
//!
//! The graph is built once from a feed of [`EdgeRecord`](graph::EdgeRecord)s
//! and is immutable afterwards, so any number of resolvers and threads can
//! share it. Nothing in the engine is tied to a particular unit catalog:
//! callers supply the feed.
//!
//! # Examples
//!
//! ```
//! use u_unitconv::graph::{ConversionGraph, EdgeRecord};
//! use u_unitconv::rational::Rational;
//! use u_unitconv::resolver::ConversionResolver;
//!
//! let foot = EdgeRecord::new("length", "foot", "meter").with_factor("0.3048".parse().unwrap());
//! let graph = ConversionGraph::builder()
//!     .with_record(EdgeRecord::base("length", "meter"))
//!     .with_record(foot)
//!     .build()
//!     .unwrap();
//! let resolver = ConversionResolver::new(&graph);
//! let meters = resolver.convert_str(&Rational::from(10), "foot", "meter").unwrap();
//! assert_eq!(meters, "3.048".parse().unwrap());
//! ```

pub mod error;
pub mod graph;
pub mod mixed;
pub mod ordering;
pub mod rational;
pub mod resolver;
pub mod unit_id;

#[cfg(test)]
mod testing;

pub use error::{ConversionError, Result};
pub use graph::{ConversionGraph, EdgeRecord};
pub use mixed::MixedUnitConverter;
pub use rational::Rational;
pub use resolver::{ConversionCache, ConversionResolver, ResolverConfig};
pub use unit_id::UnitIdentifier;
