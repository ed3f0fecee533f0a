//! This module provides the interface to the continuous solver.
//!
//! The solver itself is a collaborator this crate never looks inside: it loads
//! a problem, solves the relaxation, exposes the solution vector, the rays and
//! the objective value, and must be released. [ContinuousSolver] is that
//! capability; [SolverHandle] wraps one instance so that it is released exactly
//! once on every path.
//!
//! Two backends ship with the crate:
//! - [MinilpSolver] (cargo feature `minilp`, on by default) solves in-process
//!   with the [`minilp`](https://docs.rs/minilp) crate.
//! - [ClpProgram] drives an external `clp` executable through .lp files, the
//!   way the other command line solvers are usually driven.
//!
//! Tests substitute their own in-memory implementation.

use std::borrow::Cow;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::error::{Error, Result};
use crate::integer::{IntegerSearch, IntegerStatus};
use crate::lp_format;
use crate::lp_reader;
use crate::problem::{BoundSpec, ColumnBound, Constraint, LpObjective, Model, Numeral, Objective, Term};
use crate::solution::{extract, render_all, RawSolution, Solution};

pub use self::clp::*;
#[cfg(feature = "minilp")]
pub use self::minilp::*;

pub mod clp;
#[cfg(feature = "minilp")]
pub mod minilp;

/// Magnitudes at or beyond this are infinite, as in CLP
pub const INFINITY_THRESHOLD: f64 = 1e30;

/// Outcome of a relaxation solve
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Status {
    /// an optimal point was found
    Optimal,
    /// a feasible point, but the solver stopped early (time or iteration limit)
    SubOptimal,
    /// no point satisfies the constraints
    Infeasible,
    /// the objective improves without limit
    Unbounded,
    /// no solve has completed
    NotSolved,
}

impl Status {
    /// Raise the non-optimal outcomes as errors
    pub fn into_result(self) -> Result<()> {
        match self {
            Status::Optimal | Status::SubOptimal => Ok(()),
            Status::Infeasible => Err(Error::Infeasible),
            Status::Unbounded => Err(Error::Unbounded),
            Status::NotSolved => Err(Error::SolverFailure("the solver did not finish".to_string())),
        }
    }
}

fn normalize_infinity(v: f64) -> f64 {
    if v >= INFINITY_THRESHOLD {
        f64::INFINITY
    } else if v <= -INFINITY_THRESHOLD {
        f64::NEG_INFINITY
    } else {
        v
    }
}

/// A problem in array form: what the continuous solver actually loads.
#[derive(Debug, Clone, PartialEq)]
pub struct DenseProblem {
    /// whether to maximize or minimize
    pub direction: LpObjective,
    /// one name per column
    pub column_names: Vec<String>,
    /// one coefficient per column
    pub objective: Vec<f64>,
    /// lower limit of each column
    pub col_lower: Vec<f64>,
    /// upper limit of each column
    pub col_upper: Vec<f64>,
    /// lower limit of each row
    pub row_lower: Vec<f64>,
    /// upper limit of each row
    pub row_upper: Vec<f64>,
    /// rows × columns coefficients, row-major
    pub matrix: Vec<f64>,
    /// columns restricted to integer values, ascending
    pub integer_columns: Vec<usize>,
}

impl DenseProblem {
    /// Build a problem from arrays. Columns are named `C0`, `C1`, ...
    ///
    /// ```
    /// use lp_clp::problem::LpObjective;
    /// use lp_clp::solvers::DenseProblem;
    ///
    /// let inf = f64::MAX;
    /// let problem = DenseProblem::new(
    ///     LpObjective::Minimize,
    ///     vec![-0.6, -0.5],
    ///     vec![-inf, -inf],
    ///     vec![inf, inf],
    ///     vec![-inf, -inf],
    ///     vec![1., 2.],
    ///     vec![1., 2., 3., 1.],
    /// ).unwrap();
    /// assert_eq!(problem.num_rows(), 2);
    /// assert_eq!(problem.col_upper[0], f64::INFINITY);
    /// ```
    pub fn new(
        direction: LpObjective,
        objective: Vec<f64>,
        col_lower: Vec<f64>,
        col_upper: Vec<f64>,
        row_lower: Vec<f64>,
        row_upper: Vec<f64>,
        matrix: Vec<f64>,
    ) -> Result<Self> {
        let cols = objective.len();
        let rows = row_lower.len();
        if col_lower.len() != cols || col_upper.len() != cols {
            return Err(Error::InvalidModel(format!(
                "{} objective coefficients but {} lower and {} upper column bounds",
                cols,
                col_lower.len(),
                col_upper.len()
            )));
        }
        if row_upper.len() != rows {
            return Err(Error::InvalidModel(format!(
                "{} lower but {} upper row bounds",
                rows,
                row_upper.len()
            )));
        }
        if matrix.len() != rows * cols {
            return Err(Error::InvalidModel(format!(
                "a {}x{} matrix needs {} coefficients, got {}",
                rows,
                cols,
                rows * cols,
                matrix.len()
            )));
        }
        let normalize = |v: Vec<f64>| v.into_iter().map(normalize_infinity).collect();
        Ok(DenseProblem {
            direction,
            column_names: (0..cols).map(|c| format!("C{}", c)).collect(),
            objective,
            col_lower: normalize(col_lower),
            col_upper: normalize(col_upper),
            row_lower: normalize(row_lower),
            row_upper: normalize(row_upper),
            matrix,
            integer_columns: vec![],
        })
    }

    /// Rename the columns
    pub fn with_column_names(mut self, names: Vec<String>) -> Result<Self> {
        if names.len() != self.num_cols() {
            return Err(Error::InvalidModel(format!(
                "{} names for {} columns",
                names.len(),
                self.num_cols()
            )));
        }
        self.column_names = names;
        Ok(self)
    }

    /// Mark columns as integer
    pub fn with_integer_columns(mut self, mut columns: Vec<usize>) -> Result<Self> {
        columns.sort_unstable();
        columns.dedup();
        if let Some(&c) = columns.iter().find(|&&c| c >= self.num_cols()) {
            return Err(Error::InvalidModel(format!("integer column {} out of range", c)));
        }
        self.integer_columns = columns;
        Ok(self)
    }

    /// Lay a model out in arrays.
    ///
    /// Columns follow [Model::column_names]. Columns default to `[0, +inf)`;
    /// a bound entry overrides the sides it names, binaries are clamped to
    /// `[0, 1]`. Repeated terms in one row add up.
    pub fn from_model(model: &Model) -> Result<Self> {
        lp_format::validate(model)?;
        let column_names = model.column_names();
        let index: HashMap<&str, usize> = column_names
            .iter()
            .enumerate()
            .map(|(i, name)| (name.as_str(), i))
            .collect();
        let col = |name: &str| {
            index
                .get(name)
                .copied()
                .ok_or_else(|| Error::InvalidModel(format!("unknown variable {:?}", name)))
        };
        let cols = column_names.len();

        let mut objective = vec![0.; cols];
        for term in &model.objective.vars {
            objective[col(term.name.as_str())?] += term.coef.to_f64()?;
        }

        let mut col_lower = vec![0.; cols];
        let mut col_upper = vec![f64::INFINITY; cols];
        for bound in &model.bounds {
            let c = col(bound.name.as_str())?;
            bound
                .bnds
                .resolve(&bound.name)?
                .apply_to(&mut col_lower[c], &mut col_upper[c])?;
        }
        for name in &model.binaries {
            let c = col(name.as_str())?;
            col_lower[c] = col_lower[c].max(0.);
            col_upper[c] = col_upper[c].min(1.);
        }
        let mut integer_columns = model
            .generals
            .iter()
            .chain(model.binaries.iter())
            .map(|name| col(name.as_str()))
            .collect::<Result<Vec<_>>>()?;
        integer_columns.sort_unstable();
        integer_columns.dedup();

        let mut row_lower = Vec::with_capacity(model.subject_to.len());
        let mut row_upper = Vec::with_capacity(model.subject_to.len());
        let mut matrix = vec![0.; model.subject_to.len() * cols];
        for (r, constraint) in model.subject_to.iter().enumerate() {
            for term in &constraint.vars {
                matrix[r * cols + col(term.name.as_str())?] += term.coef.to_f64()?;
            }
            let label = constraint.name.clone().unwrap_or_else(|| format!("c{}", r));
            let (lower, upper) = constraint.bnds.resolve(&label)?.limits()?;
            row_lower.push(lower);
            row_upper.push(upper);
        }

        DenseProblem::new(
            model.objective.direction,
            objective,
            col_lower,
            col_upper,
            row_lower,
            row_upper,
            matrix,
        )?
        .with_column_names(column_names)?
        .with_integer_columns(integer_columns)
    }

    /// The reverse of [DenseProblem::from_model]: every column gets an explicit
    /// bound line, integer columns become generals.
    pub fn to_model(&self) -> Result<Model> {
        let terms = |coefs: &[f64]| -> Result<Vec<Term>> {
            coefs
                .iter()
                .zip(&self.column_names)
                .filter(|(coef, _)| **coef != 0.)
                .map(|(coef, name)| Ok(Term::new(name.clone(), Numeral::try_from(*coef)?)))
                .collect()
        };
        let limits = |lower: f64, upper: f64| -> Result<BoundSpec> {
            Ok(match (lower.is_finite(), upper.is_finite()) {
                (true, true) if lower == upper => BoundSpec::fixed(Numeral::try_from(lower)?),
                (true, true) => BoundSpec::double(Numeral::try_from(lower)?, Numeral::try_from(upper)?),
                (true, false) => BoundSpec::lower(Numeral::try_from(lower)?),
                (false, true) => BoundSpec::upper(Numeral::try_from(upper)?),
                (false, false) => BoundSpec::free(),
            })
        };

        let mut model = Model::new(self.direction);
        model.objective = Objective {
            direction: self.direction,
            name: None,
            vars: terms(&self.objective)?,
        };
        for r in 0..self.num_rows() {
            model.subject_to.push(Constraint {
                name: None,
                vars: terms(self.row(r))?,
                bnds: limits(self.row_lower[r], self.row_upper[r])?,
            });
        }
        for (c, name) in self.column_names.iter().enumerate() {
            let (lower, upper) = (self.col_lower[c], self.col_upper[c]);
            // a lone upper bound would keep the implicit 0 below
            let bnds = if lower == f64::NEG_INFINITY && upper.is_finite() {
                BoundSpec::double(Numeral::neg_infinity(), Numeral::try_from(upper)?)
            } else {
                limits(lower, upper)?
            };
            model.bounds.push(ColumnBound {
                name: name.clone(),
                bnds,
            });
        }
        model.generals = self
            .integer_columns
            .iter()
            .map(|&c| self.column_names[c].clone())
            .collect();
        Ok(model)
    }

    /// Number of columns
    pub fn num_cols(&self) -> usize {
        self.objective.len()
    }

    /// Number of rows
    pub fn num_rows(&self) -> usize {
        self.row_lower.len()
    }

    /// Coefficients of row `r`
    pub fn row(&self, r: usize) -> &[f64] {
        let cols = self.num_cols();
        &self.matrix[r * cols..(r + 1) * cols]
    }

    /// Index of the column called `name`
    pub fn column(&self, name: &str) -> Option<usize> {
        self.column_names.iter().position(|n| n == name)
    }

    /// Objective value at `point`
    pub fn objective_value(&self, point: &[f64]) -> f64 {
        self.objective.iter().zip(point).map(|(c, x)| c * x).sum()
    }
}

pub(crate) fn no_problem() -> Error {
    Error::SolverFailure("no problem loaded".to_string())
}

/// The continuous LP solver this crate drives. Implementations own their
/// workspace; [ContinuousSolver::release] gives it back and must be the last call.
pub trait ContinuousSolver {
    /// Backend name, for logs
    fn name(&self) -> &str;

    /// Replace the loaded problem
    fn load_problem(&mut self, problem: DenseProblem) -> Result<()>;

    /// Load a problem given as .lp text
    fn read_lp(&mut self, text: &str) -> Result<()> {
        let model = lp_reader::parse(text)?;
        self.load_problem(DenseProblem::from_model(&model)?)
    }

    /// The loaded problem, with any bound changes applied
    fn problem(&self) -> Option<&DenseProblem>;

    /// Mutable access to the loaded problem
    fn problem_mut(&mut self) -> Option<&mut DenseProblem>;

    /// Change the limits of one column for the next solve
    fn set_column_bounds(&mut self, column: usize, lower: f64, upper: f64) -> Result<()> {
        let problem = self.problem_mut().ok_or_else(no_problem)?;
        if column >= problem.num_cols() {
            return Err(Error::SolverFailure(format!("column {} out of range", column)));
        }
        problem.col_lower[column] = lower;
        problem.col_upper[column] = upper;
        Ok(())
    }

    /// Solve the continuous relaxation with the primal simplex.
    /// `Err` only for failures of the solver itself; infeasible and unbounded
    /// problems are reported through the returned [Status].
    fn primal(&mut self) -> Result<Status>;

    /// Status of the last solve, [Status::NotSolved] before any
    fn status(&self) -> Status;

    /// Objective value of the last solve
    fn objective_value(&self) -> f64;

    /// Column values of the last solve
    fn col_solution(&self) -> &[f64];

    /// Direction of unboundedness, when the last solve found one
    fn unbounded_ray(&self) -> Option<&[f64]>;

    /// Certificate of infeasibility, when the last solve found one
    fn infeasibility_ray(&self) -> Option<&[f64]>;

    /// Give back the solver's resources. Called exactly once.
    fn release(&mut self);
}

/// Creates fresh solver instances, one per solve
pub trait SolverFactory {
    /// the solver type created
    type Solver: ContinuousSolver;
    /// create a new instance
    fn create(&self) -> Result<Self::Solver>;
}

impl<S: ContinuousSolver, F: Fn() -> S> SolverFactory for F {
    type Solver = S;

    fn create(&self) -> Result<S> {
        Ok(self())
    }
}

/// Scoped ownership of one solver instance.
///
/// The solver is released exactly once: by [SolverHandle::release], or when the
/// handle is dropped on an early return. Releasing twice or using a released
/// handle does not compile.
///
/// After [SolverHandle::solve_integer] the accessors report the point the search
/// settled on, not the last trial solve; the next load or solve clears it.
pub struct SolverHandle<S: ContinuousSolver> {
    solver: S,
    released: bool,
    settled: Option<RawSolution>,
}

impl<S: ContinuousSolver> SolverHandle<S> {
    /// Take ownership of a solver
    pub fn new(solver: S) -> Self {
        SolverHandle {
            solver,
            released: false,
            settled: None,
        }
    }

    /// Load a problem given as .lp text
    pub fn read_lp(&mut self, text: &str) -> Result<()> {
        self.settled = None;
        self.solver.read_lp(text)
    }

    /// Load a problem in array form
    pub fn load_problem(&mut self, problem: DenseProblem) -> Result<()> {
        self.settled = None;
        self.solver.load_problem(problem)
    }

    /// Solve the relaxation. Infeasible and unbounded outcomes are errors here;
    /// the rays stay readable afterwards.
    pub fn primal(&mut self) -> Result<()> {
        self.settled = None;
        let status = self.solver.primal()?;
        log::debug!("{}: primal finished with {:?}", self.solver.name(), status);
        status.into_result()
    }

    fn last_solution(&self) -> Cow<'_, RawSolution> {
        match &self.settled {
            Some(raw) => Cow::Borrowed(raw),
            None => Cow::Owned(RawSolution::capture(&self.solver)),
        }
    }

    /// The last solve as a [Solution] with `precision` fractional digits
    pub fn solution(&self, precision: usize) -> Result<Solution> {
        let problem = self.solver.problem().ok_or_else(no_problem)?;
        Ok(extract(&self.last_solution(), &problem.column_names, precision))
    }

    /// Column values of the last solve
    pub fn solution_array(&self, precision: usize) -> Vec<String> {
        match &self.settled {
            Some(raw) => render_all(&raw.columns, precision),
            None => render_all(self.solver.col_solution(), precision),
        }
    }

    /// Unbounded ray of the last solve, empty when there is none
    pub fn unbounded_ray(&self, precision: usize) -> Vec<String> {
        let ray = match &self.settled {
            Some(raw) => raw.unbounded_ray.as_deref(),
            None => self.solver.unbounded_ray(),
        };
        ray.map(|ray| render_all(ray, precision)).unwrap_or_default()
    }

    /// Infeasibility ray of the last solve, empty when there is none
    pub fn infeasibility_ray(&self, precision: usize) -> Vec<String> {
        let ray = match &self.settled {
            Some(raw) => raw.infeasibility_ray.as_deref(),
            None => self.solver.infeasibility_ray(),
        };
        ray.map(|ray| render_all(ray, precision)).unwrap_or_default()
    }

    /// Run the rounding search on the loaded problem, judging integrality at
    /// `precision` digits.
    ///
    /// Fails with [Error::InfeasibleIntegerSolution] when some variable can be
    /// fixed neither to its floor nor to its ceiling; the accessors then report
    /// the last feasible relaxation.
    pub fn solve_integer(&mut self, precision: usize) -> Result<Solution> {
        self.solve_integer_with(&IntegerSearch::new(precision))
    }

    /// [SolverHandle::solve_integer] with explicit search settings
    pub fn solve_integer_with(&mut self, search: &IntegerSearch) -> Result<Solution> {
        self.settled = None;
        let outcome = search.run(&mut self.solver)?;
        let problem = self.solver.problem().ok_or_else(no_problem)?;
        let mut solution = extract(&outcome.solution, &problem.column_names, search.precision());
        self.settled = Some(outcome.solution);
        match outcome.status {
            IntegerStatus::Integer => {
                solution.integer_solution = true;
                Ok(solution)
            }
            IntegerStatus::Infeasible { variable } => Err(Error::InfeasibleIntegerSolution { variable }),
        }
    }

    /// The wrapped solver
    pub fn solver(&self) -> &S {
        &self.solver
    }

    /// The wrapped solver, mutably. Forgets the point settled on by the last search.
    pub fn solver_mut(&mut self) -> &mut S {
        self.settled = None;
        &mut self.solver
    }

    /// Release the solver now
    pub fn release(mut self) {
        self.release_once();
    }

    fn release_once(&mut self) {
        if !self.released {
            self.released = true;
            self.solver.release();
        }
    }
}

impl<S: ContinuousSolver> Drop for SolverHandle<S> {
    fn drop(&mut self) {
        self.release_once();
    }
}

/// Solvers that leave their result in a solution file
pub trait SolverWithSolutionParsing {
    /// Parse the solution file at the given path
    fn read_solution(&self, temp_solution_file: &Path, problem: &DenseProblem) -> Result<RawSolution> {
        let f = File::open(temp_solution_file)?;
        self.read_specific_solution(BufReader::new(f), problem)
    }

    /// Parse a solution in the solver's own format
    fn read_specific_solution<R: BufRead>(&self, f: R, problem: &DenseProblem) -> Result<RawSolution>;
}

/// Solvers that accept a time limit
pub trait WithMaxSeconds<T> {
    /// the time limit, if any
    fn max_seconds(&self) -> Option<u32>;
    /// a copy with the given time limit
    fn with_max_seconds(&self, seconds: u32) -> T;
}
