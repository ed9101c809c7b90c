//! Counts for various things which count, roughly.
//!
//! Alongside the plain counts live the scheduling variables they drive: the restart and
//! reduction thresholds, the simplification schedule, the CHB/LRB step size, the phase cache
//! window, and the volatility floor of dyn-psm reduction.

use std::time::Instant;

use crate::config::Config;

/// Counters and the scheduling state derived from them.
pub struct Counters {
    /// Conflicts seen since the search was initialised.
    pub conflicts: u64,

    /// Conflicts seen across the life of the solver; never reset.
    ///
    /// Heuristic stamps (CHB, LRB, anti-exploration) are taken against this count, so they
    /// stay meaningful across checks.
    pub total_conflicts: u64,

    /// Conflicts seen since the last restart.
    pub conflicts_since_restart: u32,

    /// Conflicts seen since the last reduction of the learned clause database.
    pub conflicts_since_gc: u32,

    /// The conflict count at which a restart fires.
    pub restart_threshold: u32,

    /// The conflict count at which a reduction fires.
    pub gc_threshold: u32,

    /// Position in the luby sequence, one-indexed.
    pub luby_index: u32,

    /// Restarts made.
    pub restarts: u64,

    /// Simplification rounds made.
    pub simplifications: u64,

    /// The conflict count at which the next simplification is scheduled.
    pub next_simplify: u64,

    /// Decisions made.
    pub decisions: u64,

    /// Literals propagated.
    pub propagations: u64,

    /// Step size of the CHB and LRB heuristics, decayed towards its floor per conflict.
    pub step_size: f64,

    /// Conflicts since the phase cache window last toggled.
    pub phase_counter: u32,

    /// Whether the phase cache window is on.
    pub phase_cache_on: bool,

    /// The least phase-volatility estimate seen by dyn-psm reduction.
    pub min_d_tk: f64,

    /// When the present solve began.
    pub start: Option<Instant>,
}

impl Counters {
    pub fn from_config(config: &Config) -> Self {
        Counters {
            conflicts: 0,
            total_conflicts: 0,
            conflicts_since_restart: 0,
            conflicts_since_gc: 0,
            restart_threshold: config.restart_initial,
            gc_threshold: config.gc_initial,
            luby_index: 1,
            restarts: 0,
            simplifications: 0,
            next_simplify: 0,
            decisions: 0,
            propagations: 0,
            step_size: config.step_size_init,
            phase_counter: 0,
            phase_cache_on: false,
            min_d_tk: 1.0,
            start: None,
        }
    }
}
