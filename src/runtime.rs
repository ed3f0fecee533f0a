//! The solver runtime has an explicit initialization phase: nothing can be
//! solved until [Runtime::initialize] has checked that the backend works.
use log::{info, warn};

use crate::config::SolverConfig;
use crate::error::{Error, Result};
use crate::facade::Clp;
use crate::problem::LpObjective;
use crate::solvers::{ContinuousSolver, DenseProblem, SolverFactory, SolverHandle};

/// A solver runtime. Starts out not ready; [Runtime::initialize] probes the
/// backend and, once that succeeds, hands out the [Clp] facade.
#[derive(Debug)]
pub struct Runtime<F> {
    clp: Clp<F>,
    ready: bool,
}

/// Minimize `x` over `[0, 1]`, with no rows.
fn dummy_problem() -> Result<DenseProblem> {
    DenseProblem::new(LpObjective::Minimize, vec![1.], vec![0.], vec![1.], vec![], vec![], vec![])?
        .with_column_names(vec!["x".to_string()])
}

impl<F: SolverFactory> Runtime<F> {
    /// A runtime with the default settings
    pub fn new(factory: F) -> Self {
        Self::with_config(factory, SolverConfig::default())
    }

    /// A runtime with the given settings
    pub fn with_config(factory: F, config: SolverConfig) -> Self {
        Runtime {
            clp: Clp { factory, config },
            ready: false,
        }
    }

    /// Probe the backend with a tiny problem, to fail here rather than on the
    /// first real solve. Initializing a ready runtime is a no-op; after a failed
    /// probe the runtime stays not ready and can be initialized again.
    pub fn initialize(&mut self) -> Result<&Clp<F>> {
        if !self.ready {
            let name = self.probe().map_err(|e| {
                warn!("solver runtime probe failed: {}", e);
                e
            })?;
            info!("solver runtime ready, backend {}", name);
            self.ready = true;
        }
        Ok(&self.clp)
    }

    fn probe(&self) -> Result<String> {
        let mut handle = SolverHandle::new(self.clp.factory.create()?);
        handle.load_problem(dummy_problem()?)?;
        handle.primal()?;
        let name = handle.solver().name().to_string();
        handle.release();
        Ok(name)
    }

    /// Whether [Runtime::initialize] has completed
    pub fn is_ready(&self) -> bool {
        self.ready
    }

    /// The facade, once initialized
    pub fn clp(&self) -> Result<&Clp<F>> {
        if self.ready {
            Ok(&self.clp)
        } else {
            Err(Error::NotReady)
        }
    }
}
