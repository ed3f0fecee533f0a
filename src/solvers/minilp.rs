//! In-process backend on top of the [`minilp`](https://docs.rs/minilp) dense simplex.
use log::debug;
use minilp::{ComparisonOp, LinearExpr, OptimizationDirection, Variable};

use crate::error::Result;
use crate::problem::LpObjective;
use crate::solvers::{ContinuousSolver, DenseProblem, Status};

const EMPTY_ROW_TOLERANCE: f64 = 1e-9;

/// A [ContinuousSolver] that needs no external program.
///
/// minilp does not expose rays, so [ContinuousSolver::unbounded_ray] and
/// [ContinuousSolver::infeasibility_ray] are always `None`.
#[derive(Debug, Clone, Default)]
pub struct MinilpSolver {
    problem: Option<DenseProblem>,
    status: Option<Status>,
    objective_value: f64,
    columns: Vec<f64>,
    released: bool,
}

impl MinilpSolver {
    /// A solver with nothing loaded
    pub fn new() -> Self {
        Self::default()
    }

    fn solve_unconstrained(problem: &DenseProblem) -> std::result::Result<Vec<f64>, Status> {
        (0..problem.num_cols())
            .map(|c| {
                solve_unconstrained_column(
                    problem.direction,
                    problem.objective[c],
                    problem.col_lower[c],
                    problem.col_upper[c],
                )
            })
            .collect()
    }

    fn solve(problem: &DenseProblem) -> std::result::Result<Vec<f64>, Status> {
        if (0..problem.num_cols()).any(|c| problem.col_lower[c] > problem.col_upper[c]) {
            return Err(Status::Infeasible);
        }
        let mut lp = minilp::Problem::new(match problem.direction {
            LpObjective::Minimize => OptimizationDirection::Minimize,
            LpObjective::Maximize => OptimizationDirection::Maximize,
        });
        let vars: Vec<Variable> = (0..problem.num_cols())
            .map(|c| lp.add_var(problem.objective[c], (problem.col_lower[c], problem.col_upper[c])))
            .collect();
        let mut constraints = 0;
        for r in 0..problem.num_rows() {
            let (lower, upper) = (problem.row_lower[r], problem.row_upper[r]);
            if lower > upper {
                return Err(Status::Infeasible);
            }
            let row = problem.row(r);
            if row.iter().all(|&a| a == 0.) {
                if lower > EMPTY_ROW_TOLERANCE || upper < -EMPTY_ROW_TOLERANCE {
                    return Err(Status::Infeasible);
                }
                continue;
            }
            let expr = || {
                let mut expr = LinearExpr::empty();
                for (&var, &coef) in vars.iter().zip(row) {
                    if coef != 0. {
                        expr.add(var, coef);
                    }
                }
                expr
            };
            if lower == upper {
                lp.add_constraint(expr(), ComparisonOp::Eq, lower);
                constraints += 1;
                continue;
            }
            if lower.is_finite() {
                lp.add_constraint(expr(), ComparisonOp::Ge, lower);
                constraints += 1;
            }
            if upper.is_finite() {
                lp.add_constraint(expr(), ComparisonOp::Le, upper);
                constraints += 1;
            }
        }
        if constraints == 0 {
            return Self::solve_unconstrained(problem);
        }
        match lp.solve() {
            Ok(solution) => {
                let columns: Vec<f64> = vars.iter().map(|&v| solution[v]).collect();
                // minilp can report an unbounded direction as an infinite optimum
                if columns.iter().all(|v| v.is_finite()) && solution.objective().is_finite() {
                    Ok(columns)
                } else {
                    Err(Status::Unbounded)
                }
            }
            Err(minilp::Error::Infeasible) => Err(Status::Infeasible),
            Err(minilp::Error::Unbounded) => Err(Status::Unbounded),
        }
    }
}

/// Without rows every column sits at whichever of its limits the objective prefers
fn solve_unconstrained_column(direction: LpObjective, coef: f64, lower: f64, upper: f64) -> std::result::Result<f64, Status> {
    let towards_upper = match direction {
        LpObjective::Minimize => coef < 0.,
        LpObjective::Maximize => coef > 0.,
    };
    let value = if coef == 0. {
        if lower.is_finite() {
            lower
        } else if upper.is_finite() {
            upper
        } else {
            0.
        }
    } else if towards_upper {
        upper
    } else {
        lower
    };
    if value.is_finite() {
        Ok(value)
    } else {
        Err(Status::Unbounded)
    }
}

impl ContinuousSolver for MinilpSolver {
    fn name(&self) -> &str {
        "minilp"
    }

    fn load_problem(&mut self, problem: DenseProblem) -> Result<()> {
        assert!(!self.released, "solver used after release");
        self.problem = Some(problem);
        self.status = None;
        self.columns.clear();
        self.objective_value = 0.;
        Ok(())
    }

    fn problem(&self) -> Option<&DenseProblem> {
        self.problem.as_ref()
    }

    fn problem_mut(&mut self) -> Option<&mut DenseProblem> {
        self.problem.as_mut()
    }

    fn primal(&mut self) -> Result<Status> {
        assert!(!self.released, "solver used after release");
        let problem = self.problem.as_ref().ok_or_else(super::no_problem)?;
        let solved = Self::solve(problem).and_then(|columns| {
            let objective = problem.objective_value(&columns);
            if objective.is_finite() {
                Ok((columns, objective))
            } else {
                Err(Status::Unbounded)
            }
        });
        let status = match solved {
            Ok((columns, objective)) => {
                self.objective_value = objective;
                self.columns = columns;
                Status::Optimal
            }
            Err(status) => {
                self.objective_value = 0.;
                self.columns = vec![0.; problem.num_cols()];
                status
            }
        };
        debug!(
            "minilp: {}x{} problem solved with {:?}",
            problem.num_rows(),
            problem.num_cols(),
            status
        );
        self.status = Some(status);
        Ok(status)
    }

    fn status(&self) -> Status {
        self.status.unwrap_or(Status::NotSolved)
    }

    fn objective_value(&self) -> f64 {
        self.objective_value
    }

    fn col_solution(&self) -> &[f64] {
        &self.columns
    }

    fn unbounded_ray(&self) -> Option<&[f64]> {
        None
    }

    fn infeasibility_ray(&self) -> Option<&[f64]> {
        None
    }

    fn release(&mut self) {
        assert!(!self.released, "solver released twice");
        self.released = true;
        self.problem = None;
        self.columns = vec![];
    }
}
