//! Tunables of the facade and of the integer search
use serde::Deserialize;

use crate::error::Result;

/// Digits rendered when `solve` is called without a precision
pub const DEFAULT_RENDER_PRECISION: usize = 2;

/// Relative slack when comparing objective values during the integer search
pub const DEFAULT_OBJECTIVE_TOLERANCE: f64 = 1e-9;

/// Settings shared by every solve of a [crate::Clp] instance.
///
/// Every field has a default, so `{}` is a valid JSON configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SolverConfig {
    /// fractional digits of the rendered numbers when no precision is given
    pub render_precision: usize,
    /// relative slack when judging whether a rounding choice worsened the objective
    pub objective_tolerance: f64,
}

impl Default for SolverConfig {
    fn default() -> Self {
        SolverConfig {
            render_precision: DEFAULT_RENDER_PRECISION,
            objective_tolerance: DEFAULT_OBJECTIVE_TOLERANCE,
        }
    }
}

impl SolverConfig {
    /// Read a configuration from JSON
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Set the default render precision
    pub fn with_render_precision(mut self, precision: usize) -> Self {
        self.render_precision = precision;
        self
    }

    /// Set the objective tolerance
    pub fn with_objective_tolerance(mut self, tolerance: f64) -> Self {
        self.objective_tolerance = tolerance;
        self
    }
}
