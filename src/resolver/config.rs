//! Resolver configuration.

use crate::error::{ConversionError, Result};

/// Configuration for [`ConversionResolver`](super::ConversionResolver).
///
/// # Examples
///
/// ```
/// use u_unitconv::resolver::ResolverConfig;
///
/// let config = ResolverConfig::default()
///     .with_reciprocal_fallback(false)
///     .with_decimal_digits(12);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ResolverConfig {
    /// Convert between reciprocal quantities (speed and pace) by inverting
    /// the final result.
    pub reciprocal_fallback: bool,

    /// Derive units absent from the graph from their components
    /// (`foot-per-hour` from `foot` and `hour`).
    pub structural_derivation: bool,

    /// Fraction digits of [`convert_decimal`](super::ConversionResolver::convert_decimal).
    pub decimal_digits: usize,

    /// Run batch conversions on the rayon pool. Needs the `parallel` feature.
    pub parallel: bool,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            reciprocal_fallback: true,
            structural_derivation: true,
            decimal_digits: 34,
            parallel: false,
        }
    }
}

impl ResolverConfig {
    pub fn with_reciprocal_fallback(mut self, enabled: bool) -> Self {
        self.reciprocal_fallback = enabled;
        self
    }

    pub fn with_structural_derivation(mut self, enabled: bool) -> Self {
        self.structural_derivation = enabled;
        self
    }

    pub fn with_decimal_digits(mut self, digits: usize) -> Self {
        self.decimal_digits = digits;
        self
    }

    pub fn with_parallel(mut self, enabled: bool) -> Self {
        self.parallel = enabled;
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.decimal_digits == 0 {
            return Err(invalid("decimal_digits must be positive"));
        }
        if self.decimal_digits > 1000 {
            return Err(invalid(format!(
                "decimal_digits must be at most 1000, got {}",
                self.decimal_digits
            )));
        }
        Ok(())
    }
}

fn invalid(message: impl Into<String>) -> ConversionError {
    ConversionError::InvalidConfig {
        message: message.into(),
    }
}
