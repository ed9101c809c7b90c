//! Configuration of a solver.
//!
//! All configuration of a solve is collected in [Config], read at the point of use.
//! Enumerated options each have their own type; everything else is a plain scalar.
//!
//! The defaults are tuned for quick, deterministic results on small formulas rather than for
//! competition performance.

pub(crate) mod defaults;

use std::time::Duration;

/// The branching heuristic used to score atoms for decisions.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Branching {
    /// Bump atoms seen during conflict analysis by a growing additive increment.
    Vsids,

    /// Conflict-history based branching: reward atoms by recency of conflict participation.
    Chb,

    /// Learning-rate based branching: reward atoms by participation per assigned interval.
    Lrb,
}

/// How to choose a value for an atom picked by a decision.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PhasePolicy {
    /// Always decide true.
    AlwaysTrue,

    /// Always decide false.
    AlwaysFalse,

    /// Reuse the cached phase while the phase cache window is on, and otherwise decide false.
    Caching,

    /// Decide at random.
    Random,
}

/// How the restart threshold evolves.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RestartPolicy {
    /// Multiply the threshold by [restart_factor](Config::restart_factor) after each restart.
    Geometric,

    /// Take [restart_initial](Config::restart_initial) times the luby sequence.
    Luby,
}

/// The strategy used when reducing the learned clause database.
///
/// The first four stable-sort learned clauses on the named lexicographic key, ascending, and
/// drop the worse half; `DynPsm` is the frozen-clause scheme.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GcPolicy {
    /// Lex on (glue, size).
    Glue,

    /// Lex on (psm, size).
    Psm,

    /// Lex on (glue, psm, size).
    GluePsm,

    /// Lex on (psm, glue, size).
    PsmGlue,

    /// Freeze clauses unlikely to be useful on the current phase, deleting the persistently
    /// inactive.
    DynPsm,
}

/// The primary configuration structure.
#[derive(Clone, Debug)]
pub struct Config {
    /// The branching heuristic.
    pub branching: Branching,

    /// The phase selection policy.
    pub phase: PhasePolicy,

    /// The restart policy.
    pub restart: RestartPolicy,

    /// The learned clause reduction strategy.
    pub gc: GcPolicy,

    /// The probability a decision atom is picked at random rather than by activity.
    pub random_freq: f64,

    /// Seed for the solver's source of randomness.
    pub random_seed: u64,

    /// Conflict budget of the burst search made before the main loop, zero to disable.
    pub burst_search: u32,

    /// The initial restart threshold, in conflicts.
    pub restart_initial: u32,

    /// Growth factor of the restart threshold under the geometric policy.
    pub restart_factor: f64,

    /// The initial reduction threshold, in conflicts.
    pub gc_initial: u32,

    /// Growth of the reduction threshold after each reduction, in conflicts.
    pub gc_increment: u32,

    /// Clauses with glue at most this are never deleted by dyn-psm reduction.
    pub gc_small_lbd: u32,

    /// Rounds of inactivity after which dyn-psm reduction deletes a clause.
    pub gc_k: u32,

    /// First simplification is scheduled at `restart_initial * simplify_mult1` conflicts.
    pub simplify_mult1: u32,

    /// Subsequent simplifications are scheduled at `conflicts * simplify_mult2`.
    pub simplify_mult2: f64,

    /// Cap on the gap between simplifications, in conflicts.
    pub simplify_max: u32,

    /// Conflict cap for a solve; `u64::MAX` for no cap.
    pub max_conflicts: u64,

    /// Restart cap for a solve; `u64::MAX` for no cap.
    pub max_restarts: u64,

    /// Simplification cap for a solve; `u64::MAX` for no cap.
    pub max_inprocess: u64,

    /// Initial step size for the CHB and LRB heuristics.
    pub step_size_init: f64,

    /// Per-conflict decrement of the step size.
    pub step_size_dec: f64,

    /// Floor of the step size.
    pub step_size_min: f64,

    /// Scale applied to CHB and LRB rewards before mixing into (fixed point) activities.
    pub reward_offset: f64,

    /// Multiplier applied to CHB rewards after a propagation round without conflict.
    pub reward_multiplier: f64,

    /// Conflicts after which the phase cache window switches off.
    pub phase_caching_on: u32,

    /// Conflicts after which the phase cache window switches on.
    pub phase_caching_off: u32,

    /// Decay the activity of atoms untouched since their last unassignment before deciding on
    /// them.
    pub anti_exploration: bool,

    /// Minimize learned clauses by removing literals implied by the remainder of the clause.
    pub minimize_lemmas: bool,

    /// Strengthen learned clauses by resolution against binary and ternary clauses.
    pub dyn_sub_res: bool,

    /// Shrink unsatisfiable cores by repeated solves with a candidate literal dropped.
    pub core_minimize: bool,

    /// A time limit for a solve, if any.
    pub time_limit: Option<Duration>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            branching: Branching::Vsids,
            phase: PhasePolicy::Caching,
            restart: RestartPolicy::Luby,
            gc: GcPolicy::GluePsm,

            random_freq: defaults::RANDOM_FREQ,
            random_seed: defaults::RANDOM_SEED,

            burst_search: defaults::BURST_SEARCH,

            restart_initial: defaults::RESTART_INITIAL,
            restart_factor: defaults::RESTART_FACTOR,

            gc_initial: defaults::GC_INITIAL,
            gc_increment: defaults::GC_INCREMENT,
            gc_small_lbd: defaults::GC_SMALL_LBD,
            gc_k: defaults::GC_K,

            simplify_mult1: defaults::SIMPLIFY_MULT1,
            simplify_mult2: defaults::SIMPLIFY_MULT2,
            simplify_max: defaults::SIMPLIFY_MAX,

            max_conflicts: u64::MAX,
            max_restarts: u64::MAX,
            max_inprocess: u64::MAX,

            step_size_init: defaults::STEP_SIZE_INIT,
            step_size_dec: defaults::STEP_SIZE_DEC,
            step_size_min: defaults::STEP_SIZE_MIN,
            reward_offset: defaults::REWARD_OFFSET,
            reward_multiplier: defaults::REWARD_MULTIPLIER,

            phase_caching_on: defaults::PHASE_CACHING_ON,
            phase_caching_off: defaults::PHASE_CACHING_OFF,

            anti_exploration: false,
            minimize_lemmas: true,
            dyn_sub_res: true,
            core_minimize: false,

            time_limit: None,
        }
    }
}
