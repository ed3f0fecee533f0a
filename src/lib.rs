#![deny(missing_docs)]
//! Write linear and mixed-integer programs in the .lp file format, solve them
//! with a continuous LP solver, and round the result into an integer-feasible
//! point with exact decimal arithmetic.
//!
//! ```
//! use lp_clp::problem::{BoundSpec, Constraint, LpObjective, Model, Term};
//! use lp_clp::solvers::MinilpSolver;
//! use lp_clp::Runtime;
//!
//! let mut model = Model::new(LpObjective::Maximize);
//! model.objective.vars = vec![Term::new("x", 3), Term::new("y", 2)];
//! model.subject_to.push(Constraint {
//!     name: None,
//!     vars: vec![Term::new("x", 1), Term::new("y", 1)],
//!     bnds: BoundSpec::upper("4.5".parse::<lp_clp::problem::Numeral>().unwrap()),
//! });
//! model.generals = vec!["x".to_string(), "y".to_string()];
//!
//! let mut runtime = Runtime::new(MinilpSolver::new);
//! let clp = runtime.initialize().unwrap();
//! let solution = clp.solve(&model, Some(2)).unwrap().unwrap();
//! assert!(solution.integer_solution);
//! assert_eq!(solution.objective_value, "12.00");
//! ```

pub mod config;
pub mod decimal;
pub mod error;
pub mod facade;
pub mod integer;
pub mod lp_format;
pub mod lp_reader;
pub mod problem;
pub mod runtime;
pub mod solution;
pub mod solvers;

pub use config::SolverConfig;
pub use error::{Error, Result};
pub use facade::{version, Clp, SolveInput, CLP_VERSION};
pub use lp_format::create_lp;
pub use problem::Model;
pub use runtime::Runtime;
pub use solution::Solution;
