//! Conversion graph.
//!
//! Built once from a feed of [`EdgeRecord`]s, each saying how a unit converts
//! to the base unit of its quantity. Edges are never chained: every unit
//! points straight at its base, and composition happens at resolve time.
//!
//! Construction validates the whole feed before anything is served
//! (duplicate units, conflicting or chained bases, undeclared multi-quantity
//! units) and fixes a total order of atomic symbols with
//! [`TotalOrderResolver`](crate::ordering::TotalOrderResolver), which gives
//! every compound unit a single canonical spelling.
//!
//! # References
//!
//! - Unicode CLDR, UTS #35 Part 6, "Unit Conversion"

mod builder;
mod store;
mod types;

pub use builder::GraphBuilder;
pub use store::ConversionGraph;
pub use types::{ConversionEdge, ConversionInfo, EdgeRecord, UnitSystem};
