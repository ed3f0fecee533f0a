//! One-pass rounding of a relaxation into an integer-feasible point.
//!
//! This is not branch and bound. Each integer column is visited once, in
//! column order, and fixed either to the floor or to the ceiling of its relaxed
//! value; the relaxation is re-solved after every fixing. The first variable for
//! which neither choice is feasible ends the search. For `n` integer columns the
//! solver runs at most `1 + 2n` times.
use log::{debug, trace};

use crate::config::DEFAULT_OBJECTIVE_TOLERANCE;
use crate::decimal;
use crate::error::{Error, Result};
use crate::problem::LpObjective;
use crate::solution::{render, RawSolution};
use crate::solvers::{no_problem, ContinuousSolver, Status};

/// How the search ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IntegerStatus {
    /// every integer column holds an integer value
    Integer,
    /// neither the floor nor the ceiling of `variable` could be fixed
    Infeasible {
        /// the column the search stopped at
        variable: String,
    },
}

/// The result of [IntegerSearch::run]
#[derive(Debug, Clone, PartialEq)]
pub struct SearchOutcome {
    /// the last feasible relaxation: the integer point when the search succeeded
    pub solution: RawSolution,
    /// how the search ended
    pub status: IntegerStatus,
    /// number of relaxation solves performed
    pub solves: usize,
}

/// Settings of the rounding search
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntegerSearch {
    precision: usize,
    tolerance: f64,
}

fn is_feasible(status: Status) -> bool {
    matches!(status, Status::Optimal | Status::SubOptimal)
}

fn parse_integer(s: &str) -> Result<f64> {
    s.parse().map_err(|_| Error::InvalidDecimalFormat(s.to_string()))
}

impl IntegerSearch {
    /// Judge integrality on values rendered with `precision` fractional digits
    pub fn new(precision: usize) -> Self {
        IntegerSearch {
            precision,
            tolerance: DEFAULT_OBJECTIVE_TOLERANCE,
        }
    }

    /// Relative slack used when comparing objective values
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// The precision integrality is judged at
    pub fn precision(&self) -> usize {
        self.precision
    }

    fn slack(&self, reference: f64) -> f64 {
        self.tolerance * reference.abs().max(1.)
    }

    /// How much worse `candidate` is than `baseline`, in the optimization sense
    fn loss(direction: LpObjective, baseline: f64, candidate: f64) -> f64 {
        match direction {
            LpObjective::Maximize => baseline - candidate,
            LpObjective::Minimize => candidate - baseline,
        }
    }

    fn strictly_better(&self, direction: LpObjective, a: &RawSolution, b: &RawSolution) -> bool {
        Self::loss(direction, b.objective_value, a.objective_value) < -self.slack(b.objective_value)
    }

    /// Fix `column` to `value` and re-solve
    fn try_fix<S: ContinuousSolver + ?Sized>(
        solver: &mut S,
        column: usize,
        value: f64,
        solves: &mut usize,
    ) -> Result<Option<RawSolution>> {
        solver.set_column_bounds(column, value, value)?;
        let status = solver.primal()?;
        *solves += 1;
        trace!("column {} fixed to {}: {:?}", column, value, status);
        Ok(if is_feasible(status) {
            Some(RawSolution::capture(solver))
        } else {
            None
        })
    }

    /// Solve the relaxation of the loaded problem, then round its integer columns.
    ///
    /// Fails when the initial relaxation is not optimal (with [Error::Infeasible],
    /// [Error::Unbounded] or [Error::SolverFailure]); a variable that cannot be
    /// rounded is reported through [IntegerStatus::Infeasible] instead.
    pub fn run<S: ContinuousSolver + ?Sized>(&self, solver: &mut S) -> Result<SearchOutcome> {
        let status = solver.primal()?;
        let mut solves = 1;
        debug!("{}: initial relaxation {:?}", solver.name(), status);
        status.into_result()?;

        let problem = solver.problem().ok_or_else(no_problem)?;
        let direction = problem.direction;
        let columns: Vec<(usize, String, f64)> = problem
            .integer_columns
            .iter()
            .map(|&c| (c, problem.column_names[c].clone(), problem.objective[c]))
            .collect();
        let mut best = RawSolution::capture(solver);

        for (column, name, coef) in columns {
            let (lower, upper) = {
                let problem = solver.problem().ok_or_else(no_problem)?;
                (problem.col_lower[column], problem.col_upper[column])
            };
            let relaxed = best.columns.get(column).copied().ok_or_else(|| {
                Error::SolverFailure(format!("no value reported for column {}", name))
            })?;
            let rendered = render(relaxed, self.precision);
            let floor = parse_integer(&decimal::floor(&rendered)?)?;
            let ceil = parse_integer(&decimal::ceil(&rendered)?)?;
            debug!("{} = {}: trying floor {} and ceiling {}", name, rendered, floor, ceil);

            let at_floor = Self::try_fix(solver, column, floor, &mut solves)?;
            if floor == ceil {
                match at_floor {
                    Some(raw) => {
                        debug!("{} already integral at {}", name, floor);
                        best = raw;
                        continue;
                    }
                    None => return self.give_up(solver, column, name, (lower, upper), best, solves),
                }
            }
            if let Some(raw) = &at_floor {
                let allowance = coef.abs() * (relaxed - floor) + self.slack(best.objective_value);
                if Self::loss(direction, best.objective_value, raw.objective_value) <= allowance {
                    debug!("{} fixed to floor {}", name, floor);
                    best = raw.clone();
                    continue;
                }
            }

            let at_ceil = Self::try_fix(solver, column, ceil, &mut solves)?;
            best = match (at_floor, at_ceil) {
                (Some(f), Some(c)) if !self.strictly_better(direction, &c, &f) => {
                    debug!("{} fixed to floor {}, ceiling is no better", name, floor);
                    solver.set_column_bounds(column, floor, floor)?;
                    f
                }
                (_, Some(c)) => {
                    debug!("{} fixed to ceiling {}", name, ceil);
                    c
                }
                (Some(f), None) => {
                    debug!("{} fixed to floor {}, ceiling infeasible", name, floor);
                    solver.set_column_bounds(column, floor, floor)?;
                    f
                }
                (None, None) => return self.give_up(solver, column, name, (lower, upper), best, solves),
            };
        }
        debug!("integer search finished after {} solves", solves);
        Ok(SearchOutcome {
            solution: best,
            status: IntegerStatus::Integer,
            solves,
        })
    }

    fn give_up<S: ContinuousSolver + ?Sized>(
        &self,
        solver: &mut S,
        column: usize,
        variable: String,
        (lower, upper): (f64, f64),
        best: RawSolution,
        solves: usize,
    ) -> Result<SearchOutcome> {
        debug!("{}: neither floor nor ceiling is feasible, stopping", variable);
        solver.set_column_bounds(column, lower, upper)?;
        Ok(SearchOutcome {
            solution: best,
            status: IntegerStatus::Infeasible { variable },
            solves,
        })
    }
}
