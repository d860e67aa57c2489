//! Unit identifiers.
//!
//! Textual form of compound units as served to localization data:
//!
//! ```text
//! unit    = run ("-per-" run)? | "per-" run
//! run     = element ("-" element)*
//! element = (power "-")? prefix? symbol
//! power   = "square" | "cubic" | "pow" N        (2 <= N <= 64)
//! ```
//!
//! Symbols may contain hyphens (`gallon-imperial`), so element boundaries
//! are found against a [`SymbolTable`] by longest match. Prefixes are fused
//! to the symbol (`kilometer`, `kibibyte`) and fold into the magnitude of
//! the element.
//!
//! # References
//!
//! - Unicode CLDR, UTS #35 Part 6, "Unit Identifiers"
//! - BIPM (2019), "The International System of Units", 9th ed., Table 7
//! - IEC 80000-13:2008, binary prefixes

mod parser;
mod prefix;
mod types;

pub use parser::{has_valid_chars, is_reserved, power_word, AND, MAX_POWER, PER};
pub use prefix::Prefix;
pub use types::{SymbolTable, UnitElement, UnitIdentifier};
