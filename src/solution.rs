//! Turning raw solver output into caller-facing numbers
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::solvers::{ContinuousSolver, Status};

/// What a continuous solver reports after a solve, before any rendering
#[derive(Debug, Clone, PartialEq)]
pub struct RawSolution {
    /// outcome of the solve
    pub status: Status,
    /// objective value at `columns`
    pub objective_value: f64,
    /// one value per column
    pub columns: Vec<f64>,
    /// direction of unboundedness, if the solver produced one
    pub unbounded_ray: Option<Vec<f64>>,
    /// certificate of infeasibility, if the solver produced one
    pub infeasibility_ray: Option<Vec<f64>>,
}

impl RawSolution {
    /// Snapshot the accessors of a solver
    pub fn capture<S: ContinuousSolver + ?Sized>(solver: &S) -> Self {
        RawSolution {
            status: solver.status(),
            objective_value: solver.objective_value(),
            columns: solver.col_solution().to_vec(),
            unbounded_ray: solver.unbounded_ray().map(<[f64]>::to_vec),
            infeasibility_ray: solver.infeasibility_ray().map(<[f64]>::to_vec),
        }
    }
}

/// A solved problem, every number rendered as a decimal string.
///
/// `variables` and `solution` are aligned by index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Solution {
    /// objective value at `solution`
    pub objective_value: String,
    /// column names
    pub variables: Vec<String>,
    /// column values
    pub solution: Vec<String>,
    /// empty unless the relaxation was unbounded
    pub unbounded_ray: Vec<String>,
    /// empty unless the relaxation was infeasible
    pub infeasibility_ray: Vec<String>,
    /// whether the integer search fixed every integer column
    pub integer_solution: bool,
}

impl Solution {
    /// The rendered value of a variable
    pub fn value(&self, name: &str) -> Option<&str> {
        self.variables
            .iter()
            .position(|v| v == name)
            .and_then(|i| self.solution.get(i))
            .map(String::as_str)
    }

    /// The JSON form: `{ objectiveValue, variables, solution, unboundedRay, infeasibilityRay, integerSolution }`
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Render with exactly `precision` fractional digits, never as `-0`.
///
/// ```
/// use lp_clp::solution::render;
///
/// assert_eq!(render(311640000., 2), "311640000.00");
/// assert_eq!(render(-0.001, 2), "0.00");
/// assert_eq!(render(0.26, 1), "0.3");
/// ```
pub fn render(value: f64, precision: usize) -> String {
    let s = format!("{:.*}", precision, value);
    match s.strip_prefix('-') {
        Some(magnitude) if magnitude.bytes().all(|b| b == b'0' || b == b'.') => magnitude.to_string(),
        _ => s,
    }
}

/// [render] every value
pub fn render_all(values: &[f64], precision: usize) -> Vec<String> {
    values.iter().map(|&v| render(v, precision)).collect()
}

/// Build the caller-facing result. `names` gives the column order; absent rays
/// become empty lists. `integer_solution` starts out false.
pub fn extract(raw: &RawSolution, names: &[String], precision: usize) -> Solution {
    let rays = |ray: &Option<Vec<f64>>| {
        ray.as_deref()
            .map(|r| render_all(r, precision))
            .unwrap_or_default()
    };
    Solution {
        objective_value: render(raw.objective_value, precision),
        variables: names.to_vec(),
        solution: render_all(&raw.columns, precision),
        unbounded_ray: rays(&raw.unbounded_ray),
        infeasibility_ray: rays(&raw.infeasibility_ray),
        integer_solution: false,
    }
}
