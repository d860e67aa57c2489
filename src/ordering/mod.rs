//! Partial-order to total-order resolution.
//!
//! Input rows are often partial: each one only says "these items come in
//! this order". [`TotalOrderResolver`] merges them by repeatedly emitting an
//! item that no row places after another item, then removing it from every
//! row. Each step is a pure reduction over the remaining rows
//! ([`extract_head`]), so a single step can be tested in isolation.
//!
//! The conversion graph uses it to fix the order of components inside
//! canonical compound units.
//!
//! # References
//!
//! - Kahn (1962), "Topological sorting of large networks"

mod resolver;

pub use resolver::{extract_head, has_consistent_order, TotalOrderResolver};
