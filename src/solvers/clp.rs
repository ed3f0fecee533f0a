//! Backend driving an external `clp` executable through .lp files
use std::ffi::OsString;
use std::io::BufRead;
use std::path::{Path, PathBuf};
use std::process::Command;

use log::{debug, trace};

use crate::error::{Error, Result};
use crate::solution::RawSolution;
use crate::solvers::{no_problem, ContinuousSolver, DenseProblem, SolverWithSolutionParsing, Status, WithMaxSeconds};

/// Runs `clp <file.lp> -primalsimplex -solution <file>` for every solve.
///
/// The loaded problem is written out with [crate::lp_format] on each
/// [ContinuousSolver::primal], so bound changes made by the integer search are
/// picked up. The program prints no rays.
#[derive(Debug, Clone)]
pub struct ClpProgram {
    name: String,
    command_name: String,
    temp_solution_file: Option<PathBuf>,
    seconds: Option<u32>,
    problem: Option<DenseProblem>,
    last: Option<RawSolution>,
    released: bool,
}

impl Default for ClpProgram {
    fn default() -> Self {
        Self::new()
    }
}

impl ClpProgram {
    /// Use the `clp` found on the `PATH`
    pub fn new() -> ClpProgram {
        ClpProgram {
            name: "Clp".to_string(),
            command_name: "clp".to_string(),
            temp_solution_file: None,
            seconds: None,
            problem: None,
            last: None,
            released: false,
        }
    }

    /// Use another executable
    pub fn command_name(&self, command_name: String) -> ClpProgram {
        ClpProgram {
            command_name,
            ..self.clone()
        }
    }

    /// Have the program write its solution to this path instead of a temporary file
    pub fn with_temp_solution_file(&self, temp_solution_file: String) -> ClpProgram {
        ClpProgram {
            temp_solution_file: Some(temp_solution_file.into()),
            ..self.clone()
        }
    }

    fn arguments(&self, lp_file: &Path, solution_file: &Path) -> Vec<OsString> {
        let mut args = vec![lp_file.as_os_str().to_owned()];
        if let Some(s) = self.max_seconds() {
            args.push("-seconds".into());
            args.push(s.to_string().into());
        }
        args.extend_from_slice(&["-primalsimplex".into(), "-solution".into(), solution_file.into()]);
        args
    }

    fn run(&self, problem: &DenseProblem) -> Result<RawSolution> {
        let file_model = problem.to_model()?.to_tmp_file()?;
        // keeps a temporary solution file alive until it has been read
        let temp_solution;
        let solution_file = match &self.temp_solution_file {
            Some(path) => path.as_path(),
            None => {
                temp_solution = tempfile::Builder::new()
                    .prefix("lp_clp_solution")
                    .suffix(".sol")
                    .tempfile()?;
                temp_solution.path()
            }
        };
        let r = Command::new(&self.command_name)
            .args(self.arguments(file_model.path(), solution_file))
            .output()
            .map_err(|e| Error::SolverFailure(format!("error running {}: {}", self.command_name, e)))?;
        if !r.status.success() {
            return Err(Error::SolverFailure(format!("{} exited with {}", self.command_name, r.status)));
        }
        self.read_solution(solution_file, problem)
    }
}

impl SolverWithSolutionParsing for ClpProgram {
    fn read_specific_solution<R: BufRead>(&self, mut f: R, problem: &DenseProblem) -> Result<RawSolution> {
        let incorrect = |what: &str| Error::SolverFailure(format!("Incorrect solution format: {}", what));

        let mut header = String::new();
        f.read_line(&mut header)?;
        let status = match header.split_whitespace().next() {
            Some("Optimal") => Status::Optimal,
            // "Infeasible", "Primal infeasible" or "Integer infeasible"
            Some("Infeasible" | "Primal" | "Integer") => Status::Infeasible,
            // "Unbounded" or "Dual infeasible"
            Some("Unbounded" | "Dual") => Status::Unbounded,
            // "Stopped on time", "Stopped on iterations", ...
            Some("Stopped") => Status::SubOptimal,
            Some(_) => Status::NotSolved,
            None => return Err(incorrect("empty file")),
        };
        let reported_objective = header
            .split_once("objective value")
            .and_then(|(_, value)| value.trim().parse::<f64>().ok());

        // only non-zero columns are listed
        let mut columns = vec![0.; problem.num_cols()];
        for line in f.lines() {
            let line = line?;
            let mut fields: Vec<_> = line.split_whitespace().collect();
            if fields.is_empty() {
                continue;
            }
            if fields[0] == "**" {
                fields.remove(0);
            }
            if fields.len() != 4 {
                return Err(incorrect(&line));
            }
            let value: f64 = fields[2].parse().map_err(|_| incorrect(&line))?;
            match problem.column(fields[1]) {
                Some(c) => columns[c] = value,
                None => trace!("ignoring unknown column {} in the solution", fields[1]),
            }
        }
        Ok(RawSolution {
            status,
            objective_value: reported_objective.unwrap_or_else(|| problem.objective_value(&columns)),
            columns,
            unbounded_ray: None,
            infeasibility_ray: None,
        })
    }
}

impl WithMaxSeconds<ClpProgram> for ClpProgram {
    fn max_seconds(&self) -> Option<u32> {
        self.seconds
    }
    fn with_max_seconds(&self, seconds: u32) -> ClpProgram {
        ClpProgram {
            seconds: Some(seconds),
            ..(*self).clone()
        }
    }
}

impl ContinuousSolver for ClpProgram {
    fn name(&self) -> &str {
        &self.name
    }

    fn load_problem(&mut self, problem: DenseProblem) -> Result<()> {
        assert!(!self.released, "solver used after release");
        self.problem = Some(problem);
        self.last = None;
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
        let problem = self.problem.as_ref().ok_or_else(no_problem)?;
        let raw = self.run(problem)?;
        debug!("{}: {:?}, objective {}", self.command_name, raw.status, raw.objective_value);
        let status = raw.status;
        self.last = Some(raw);
        Ok(status)
    }

    fn status(&self) -> Status {
        self.last.as_ref().map_or(Status::NotSolved, |raw| raw.status)
    }

    fn objective_value(&self) -> f64 {
        self.last.as_ref().map_or(0., |raw| raw.objective_value)
    }

    fn col_solution(&self) -> &[f64] {
        self.last.as_ref().map(|raw| raw.columns.as_slice()).unwrap_or(&[])
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
        self.last = None;
    }
}
