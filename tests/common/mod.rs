#![allow(dead_code)]

use std::cell::Cell;
use std::collections::VecDeque;
use std::rc::Rc;

use lp_clp::problem::{BoundSpec, ColumnBound, Constraint, LpObjective, Model, Numeral, Term};
use lp_clp::solvers::{ContinuousSolver, DenseProblem, Status};
use lp_clp::Error;

pub fn n(s: &str) -> Numeral {
    s.parse().unwrap()
}

pub fn terms(coefs: &[&str], names: &[&str]) -> Vec<Term> {
    coefs.iter().zip(names).map(|(c, name)| Term::new(*name, n(c))).collect()
}

pub const TINLAKE: [&str; 4] = ["tinInvest", "dropInvest", "tinRedeem", "dropRedeem"];

pub fn tinlake() -> Model {
    let mut model = Model::new(LpObjective::Maximize);
    model.objective.vars = terms(&["10000", "1000", "100000", "1000000"], &TINLAKE);
    model.subject_to = vec![
        Constraint {
            name: Some("reserve".to_string()),
            vars: terms(&["1", "1", "-1", "-1"], &TINLAKE),
            bnds: BoundSpec::lower(-200),
        },
        Constraint {
            name: Some("maxReserve".to_string()),
            vars: terms(&["1", "1", "-1", "-1"], &TINLAKE),
            bnds: BoundSpec::upper(9800),
        },
        Constraint {
            name: Some("minTinRatio".to_string()),
            vars: terms(&["0.85", "-0.15", "-0.85", "0.15"], &TINLAKE),
            bnds: BoundSpec::lower(-50),
        },
        Constraint {
            name: Some("maxTinRatio".to_string()),
            vars: terms(&["-0.8", "0.2", "0.8", "-0.2"], &TINLAKE),
            bnds: BoundSpec::lower(0),
        },
    ];
    model.bounds = TINLAKE
        .iter()
        .zip([124, 400, 100, 300])
        .map(|(name, ub)| ColumnBound {
            name: name.to_string(),
            bnds: BoundSpec::double(0, ub),
        })
        .collect();
    model.generals = TINLAKE.iter().map(|s| s.to_string()).collect();
    model
}

/// An in-memory solver that replays a fixed list of outcomes, one per `primal`.
/// The objective value of each outcome is computed from the loaded problem.
pub struct ScriptedSolver {
    pub problem: Option<DenseProblem>,
    pub script: VecDeque<(Status, Vec<f64>)>,
    pub last: Option<(Status, Vec<f64>, f64)>,
    pub ray: Option<Vec<f64>>,
    pub fixings: Vec<(usize, f64, f64)>,
    pub primal_calls: usize,
    pub releases: Rc<Cell<usize>>,
}

impl ScriptedSolver {
    pub fn new(script: Vec<(Status, Vec<f64>)>) -> Self {
        ScriptedSolver {
            problem: None,
            script: script.into(),
            last: None,
            ray: None,
            fixings: vec![],
            primal_calls: 0,
            releases: Rc::new(Cell::new(0)),
        }
    }
}

impl ContinuousSolver for ScriptedSolver {
    fn name(&self) -> &str {
        "scripted"
    }

    fn load_problem(&mut self, problem: DenseProblem) -> lp_clp::Result<()> {
        self.problem = Some(problem);
        Ok(())
    }

    fn problem(&self) -> Option<&DenseProblem> {
        self.problem.as_ref()
    }

    fn problem_mut(&mut self) -> Option<&mut DenseProblem> {
        self.problem.as_mut()
    }

    fn set_column_bounds(&mut self, column: usize, lower: f64, upper: f64) -> lp_clp::Result<()> {
        self.fixings.push((column, lower, upper));
        let problem = self.problem.as_mut().unwrap();
        problem.col_lower[column] = lower;
        problem.col_upper[column] = upper;
        Ok(())
    }

    fn primal(&mut self) -> lp_clp::Result<Status> {
        self.primal_calls += 1;
        let (status, columns) = self
            .script
            .pop_front()
            .ok_or_else(|| Error::SolverFailure("script exhausted".to_string()))?;
        let objective = self.problem.as_ref().unwrap().objective_value(&columns);
        self.last = Some((status, columns, objective));
        Ok(status)
    }

    fn status(&self) -> Status {
        self.last.as_ref().map_or(Status::NotSolved, |l| l.0)
    }

    fn objective_value(&self) -> f64 {
        self.last.as_ref().map_or(0., |l| l.2)
    }

    fn col_solution(&self) -> &[f64] {
        self.last.as_ref().map(|l| l.1.as_slice()).unwrap_or(&[])
    }

    fn unbounded_ray(&self) -> Option<&[f64]> {
        match self.status() {
            Status::Unbounded => self.ray.as_deref(),
            _ => None,
        }
    }

    fn infeasibility_ray(&self) -> Option<&[f64]> {
        match self.status() {
            Status::Infeasible => self.ray.as_deref(),
            _ => None,
        }
    }

    fn release(&mut self) {
        self.releases.set(self.releases.get() + 1);
    }
}

/// `max x + y` (or min) over free columns, no rows; `x` and `y` as named, the
/// listed columns integer.
pub fn two_columns(direction: LpObjective, integer: Vec<usize>) -> DenseProblem {
    let inf = f64::INFINITY;
    DenseProblem::new(direction, vec![1., 1.], vec![-inf, -inf], vec![inf, inf], vec![], vec![], vec![])
        .unwrap()
        .with_column_names(vec!["x".to_string(), "y".to_string()])
        .unwrap()
        .with_integer_columns(integer)
        .unwrap()
}
