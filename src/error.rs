//! Errors raised by the model serializer, the decimal engine and the solver layer
use std::fmt;

/// Everything that can go wrong in this crate
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A string handed to the decimal engine is not a plain decimal numeral
    #[error("invalid decimal numeral: {0:?}")]
    InvalidDecimalFormat(String),

    /// A bound spec with neither a lower nor an upper bound and no explicit type
    #[error("no bounds were specified for {0:?}")]
    MissingBounds(String),

    /// The rounding search could fix neither the floor nor the ceiling of a variable
    #[error("no integer solution: neither floor nor ceiling of {variable:?} is feasible")]
    InfeasibleIntegerSolution {
        /// name of the variable the search stopped at
        variable: String,
    },

    /// The continuous relaxation has no feasible point
    #[error("problem is infeasible")]
    Infeasible,

    /// The continuous relaxation is unbounded
    #[error("problem is unbounded")]
    Unbounded,

    /// Opaque failure of the continuous solver
    #[error("solver failure: {0}")]
    SolverFailure(String),

    /// The solver runtime was used before its initialization phase completed
    #[error("solver runtime is not initialized")]
    NotReady,

    /// Malformed .lp text
    #[error("invalid lp text at line {line}: {message}")]
    LpSyntax {
        /// 1-based line number
        line: usize,
        /// what went wrong
        message: String,
    },

    /// A structurally invalid model (mismatched array sizes, bad names, ...)
    #[error("invalid model: {0}")]
    InvalidModel(String),

    /// Reading or writing an .lp or solution file
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Malformed model or configuration JSON
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// Rendering .lp text
    #[error(transparent)]
    Fmt(#[from] fmt::Error),
}

/// Result alias used across the crate
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub(crate) fn syntax(line: usize, message: impl Into<String>) -> Self {
        Error::LpSyntax {
            line,
            message: message.into(),
        }
    }
}
