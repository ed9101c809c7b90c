//! A cooperative resource limit.
//!
//! The solver polls the limit at checkpoints --- before each propagation round and within long
//! analyzer loops --- and unwinds out of the present check with an `unknown` report once the
//! limit has fired.
//! Cancellation is idempotent, and is only observed at a checkpoint.
//!
//! A [SolverLimit] taken from [limit](crate::solver::GenericSolver::limit) shares the flag with
//! the solver, so a solve may be cancelled from another thread while the solver itself remains
//! single-threaded.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

/// A shared cancellation flag.
#[derive(Clone, Default)]
pub struct SolverLimit {
    canceled: Arc<AtomicBool>,
}

impl SolverLimit {
    /// Fires the limit; the solve unwinds at its next checkpoint.
    pub fn cancel(&self) {
        self.canceled.store(true, Ordering::Relaxed);
    }

    /// True once the limit has fired.
    pub fn is_canceled(&self) -> bool {
        self.canceled.load(Ordering::Relaxed)
    }

    /// Rearms the limit for a further solve.
    pub fn reset(&self) {
        self.canceled.store(false, Ordering::Relaxed);
    }

    /// Another handle on the same flag.
    pub fn handle(&self) -> SolverLimit {
        SolverLimit {
            canceled: Arc::clone(&self.canceled),
        }
    }
}
