//! The entry points most callers need: serialize, solve, round.
use log::{info, warn};

use crate::config::SolverConfig;
use crate::decimal;
use crate::error::Result;
use crate::integer::{IntegerSearch, IntegerStatus};
use crate::lp_format;
use crate::lp_reader;
use crate::problem::Model;
use crate::solution::{extract, Solution};
use crate::solvers::{no_problem, ContinuousSolver, DenseProblem, SolverFactory, SolverHandle};

/// Version of the CLP build whose behaviour this crate reproduces
pub const CLP_VERSION: &str = "1.17.3";

/// Version of the underlying CLP build
pub fn version() -> &'static str {
    CLP_VERSION
}

/// What [Clp::solve] accepts
#[derive(Debug, Clone, Copy)]
pub enum SolveInput<'a> {
    /// a structured model
    Model(&'a Model),
    /// .lp text
    Text(&'a str),
}

impl<'a> From<&'a Model> for SolveInput<'a> {
    fn from(model: &'a Model) -> Self {
        SolveInput::Model(model)
    }
}

impl<'a> From<&'a str> for SolveInput<'a> {
    fn from(text: &'a str) -> Self {
        SolveInput::Text(text)
    }
}

impl<'a> From<&'a String> for SolveInput<'a> {
    fn from(text: &'a String) -> Self {
        SolveInput::Text(text)
    }
}

/// An initialized solver runtime. Obtained from [crate::Runtime::initialize].
#[derive(Debug, Clone)]
pub struct Clp<F> {
    pub(crate) factory: F,
    pub(crate) config: SolverConfig,
}

impl<F: SolverFactory> Clp<F> {
    /// Version of the underlying CLP build
    pub fn version(&self) -> &'static str {
        version()
    }

    /// The settings in use
    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Serialize a model to .lp text
    pub fn create_lp(&self, model: &Model) -> Result<String> {
        lp_format::create_lp(model)
    }

    /// A fresh solver for the handle-based API, where every failure is an error
    pub fn handle(&self) -> Result<SolverHandle<F::Solver>> {
        Ok(SolverHandle::new(self.factory.create()?))
    }

    /// Solve a model or .lp text.
    ///
    /// With a `precision` and integer or binary variables, the relaxation is
    /// rounded by the integer search; otherwise the relaxation is returned,
    /// rendered at `precision` digits or the configured default.
    ///
    /// Solver-level failures (an infeasible or unbounded relaxation, unreadable
    /// .lp text, a failing backend) give `Ok(None)`. Invalid models
    /// ([crate::Error::MissingBounds], [crate::Error::InvalidDecimalFormat],
    /// [crate::Error::InvalidModel]) are errors. An integer search that gets
    /// stuck gives the last continuous solution with `integer_solution == false`.
    pub fn solve<'a>(&self, input: impl Into<SolveInput<'a>>, precision: Option<usize>) -> Result<Option<Solution>> {
        let problem = match input.into() {
            SolveInput::Model(model) => DenseProblem::from_model(model)?,
            SolveInput::Text(text) => match lp_reader::parse(text).and_then(|m| DenseProblem::from_model(&m)) {
                Ok(problem) => problem,
                Err(e) => {
                    warn!("cannot read the lp text: {}", e);
                    return Ok(None);
                }
            },
        };
        match self.solve_problem(problem, precision) {
            Ok(solution) => Ok(Some(solution)),
            Err(e) => {
                warn!("solve failed: {}", e);
                Ok(None)
            }
        }
    }

    fn solve_problem(&self, problem: DenseProblem, precision: Option<usize>) -> Result<Solution> {
        let integer = !problem.integer_columns.is_empty();
        let mut handle = self.handle()?;
        handle.load_problem(problem)?;
        let solution = match precision {
            Some(precision) if integer => {
                let search = IntegerSearch::new(precision).with_tolerance(self.config.objective_tolerance);
                let outcome = search.run(handle.solver_mut())?;
                let problem = handle.solver().problem().ok_or_else(no_problem)?;
                let mut solution = extract(&outcome.solution, &problem.column_names, precision);
                match outcome.status {
                    IntegerStatus::Integer => solution.integer_solution = true,
                    IntegerStatus::Infeasible { variable } => {
                        info!("no integer value fits {}, returning the continuous solution", variable)
                    }
                }
                solution
            }
            _ => {
                handle.primal()?;
                handle.solution(precision.unwrap_or(self.config.render_precision))?
            }
        };
        handle.release();
        Ok(solution)
    }

    /// [decimal::round]
    pub fn bn_round(&self, s: &str) -> Result<String> {
        decimal::round(s)
    }

    /// [decimal::ceil]
    pub fn bn_ceil(&self, s: &str) -> Result<String> {
        decimal::ceil(s)
    }

    /// [decimal::floor]
    pub fn bn_floor(&self, s: &str) -> Result<String> {
        decimal::floor(s)
    }
}
