//! Conversion resolution.
//!
//! [`ConversionResolver`] turns a `(source, target)` pair into a
//! [`ConversionPlan`]:
//!
//! 1. Resolve both units to their base unit. Units missing from the graph
//!    are derived from their components (`foot-per-hour` from `foot` and
//!    `hour`).
//! 2. Same base: compose `source -> base -> target`. Offsets survive only for
//!    lone offset units such as temperature scales.
//! 3. Reciprocal bases (speed and pace): compose the factors and invert the
//!    final value once.
//! 4. Otherwise the units are incompatible.
//!
//! All arithmetic is exact; [`ConversionResolver::convert_lossy`] and
//! [`ConversionResolver::convert_decimal`] round only the final result.
//! [`ConversionCache`] memoizes the plans of one resolver for concurrent
//! callers.

mod cache;
mod config;
mod engine;

pub use cache::ConversionCache;
pub use config::ResolverConfig;
pub use engine::{ConversionPlan, ConversionResolver, ResolvedUnit};
