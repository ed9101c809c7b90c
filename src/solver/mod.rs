//! The solver --- to which formulas are added and within which solves take place.
//!
//! Strictly, a [GenericSolver] and a [Solver].
//!
//! The generic solver is generic over its source of randomness; the [Solver] alias fixes the
//! bundled [PCG32](crate::generic::minimal_pcg::MinimalPcg32).
//! Beyond the databases the solver owns the transient state threaded through the
//! [procedures]: the pending conflict, the lemma under construction and its scratch
//! structures, the clause reinitialisation stack, the assumption and core sets, and the user
//! scope literals.
//!
//! [procedures]: crate::procedures
//!
//! # Example
//!
//! ```rust
//! # use marten_sat::config::Config;
//! # use marten_sat::reports::Report;
//! # use marten_sat::solver::Solver;
//! # use marten_sat::structures::literal::CLiteral;
//! let mut solver = Solver::from_config(Config::default());
//!
//! let p = CLiteral::new(solver.fresh_atom(false, true), true);
//! let q = CLiteral::new(solver.fresh_atom(false, true), true);
//!
//! assert!(solver.add_clause(vec![-p, q]).is_ok());
//! assert!(solver.add_clause(vec![p]).is_ok());
//!
//! assert_eq!(solver.check(&[]), Ok(Report::Satisfiable));
//! assert_eq!(solver.value_of(q.atom()), Some(true));
//! ```

mod counters;
mod limit;

pub use counters::Counters;
pub use limit::SolverLimit;

use std::collections::HashSet;

use crate::{
    config::Config,
    db::{
        atom_db::AtomDB,
        clause_db::{ClauseDB, ClauseHandle},
        trail::Trail,
        watch_db::WatchDB,
    },
    extension::Extension,
    generic::minimal_pcg::MinimalPcg32,
    structures::{
        atom::Atom,
        clause::CClause,
        justification::Justification,
        literal::CLiteral,
    },
    types::err::{ErrorKind, Interrupt},
};

/// A conflict observed during propagation: the justification of the conflicting constraint and,
/// when known, the literal it falsifies.
#[derive(Clone, Copy)]
pub(crate) struct Conflict {
    pub justification: Justification,
    pub falsified: Option<CLiteral>,
}

/// An entry of the clause reinitialisation stack: a clause which propagated a literal at a
/// scope above the one it was asserted in, to be re-examined when scopes unwind.
#[derive(Clone, Copy)]
pub(crate) enum ReinitEntry {
    Binary(CLiteral, CLiteral),
    Clause(ClauseHandle),
}

/// The solver.
pub struct GenericSolver<R: rand::Rng + rand::SeedableRng> {
    /// The configuration of the solver.
    pub config: Config,

    /// The atom database.
    pub atom_db: AtomDB,

    /// The clause database.
    pub clause_db: ClauseDB,

    /// The watch database.
    pub watch_db: WatchDB,

    /// The trail and scope stack.
    pub trail: Trail,

    /// Counts for various things which count.
    pub counters: Counters,

    /// The source of randomness.
    pub(crate) rng: R,

    /// The cooperative resource limit, polled at checkpoints.
    pub(crate) limit: SolverLimit,

    /// The extension, if one is attached.
    pub(crate) extension: Option<Box<dyn Extension>>,

    /// Sticky inconsistency flag; set by an empty clause or a base-level conflict.
    pub(crate) inconsistent: bool,

    /// The pending conflict, populated whenever `inconsistent` was set by propagation.
    pub(crate) conflict: Option<Conflict>,

    /// The lemma under construction during analysis.
    pub(crate) lemma: CClause,

    /// Atoms whose analyzer marks are to be unset, in mark order.
    pub(crate) unmark: Vec<Atom>,

    /// Worklist for the minimization search, kept to avoid recursion.
    pub(crate) min_stack: Vec<Atom>,

    /// Scratch for counting distinct decision levels.
    pub(crate) diff_levels: Vec<bool>,

    /// Scratch for antecedents supplied by the extension.
    pub(crate) ext_antecedents: Vec<CLiteral>,

    /// External atom assignments awaiting an `asserted` notification, in trail order.
    pub(crate) asserted_queue: Vec<CLiteral>,

    /// The clause reinitialisation stack.
    pub(crate) reinit_stack: Vec<ReinitEntry>,

    /// One literal per open user scope; clauses added under a scope include every literal here.
    pub(crate) user_scope_literals: Vec<CLiteral>,

    /// The assumptions of the present check, in the order given.
    pub(crate) assumptions: Vec<CLiteral>,

    /// The assumptions together with the negated user scope literals, for membership tests.
    pub(crate) assumption_set: HashSet<CLiteral>,

    /// The core of failed assumptions from the most recent unsatisfiable check.
    pub(crate) core: Vec<CLiteral>,

    /// The smallest core seen across the solve, if smaller than `core`.
    pub(crate) min_core: Option<Vec<CLiteral>>,

    /// The model of the most recent satisfiable check.
    pub(crate) model: Vec<Option<bool>>,

    /// Whether the model reflects the formula as it stands.
    pub(crate) model_current: bool,
}

/// The solver, with the bundled source of randomness.
pub type Solver = GenericSolver<MinimalPcg32>;

impl<R: rand::Rng + rand::SeedableRng> GenericSolver<R> {
    /// A fresh solver using the given configuration.
    pub fn from_config(config: Config) -> Self {
        let rng = R::seed_from_u64(config.random_seed);
        let counters = Counters::from_config(&config);
        GenericSolver {
            config,
            atom_db: AtomDB::default(),
            clause_db: ClauseDB::default(),
            watch_db: WatchDB::default(),
            trail: Trail::default(),
            counters,
            rng,
            limit: SolverLimit::default(),
            extension: None,
            inconsistent: false,
            conflict: None,
            lemma: CClause::default(),
            unmark: Vec::default(),
            min_stack: Vec::default(),
            diff_levels: Vec::default(),
            ext_antecedents: Vec::default(),
            asserted_queue: Vec::default(),
            reinit_stack: Vec::default(),
            user_scope_literals: Vec::default(),
            assumptions: Vec::default(),
            assumption_set: HashSet::default(),
            core: Vec::default(),
            min_core: None,
            model: Vec::default(),
            model_current: false,
        }
    }

    /// Attaches an extension.
    pub fn set_extension(&mut self, extension: Box<dyn Extension>) {
        self.extension = Some(extension);
    }

    /// Registers an external watcher: constraint `index` is asked to propagate when `literal`
    /// becomes true.
    pub fn add_external_watch(&mut self, literal: CLiteral, index: crate::extension::ExtIndex) {
        self.watch_db
            .watch(-literal, crate::db::watch_db::Watcher::External { index });
    }

    /// A handle on the resource limit, for cancellation from outside the solve.
    pub fn limit(&self) -> SolverLimit {
        self.limit.handle()
    }

    /// True if the formula has been identified as unsatisfiable without assumptions.
    pub fn is_inconsistent(&self) -> bool {
        self.inconsistent && self.trail.at_base_level()
    }

    /// The model of the most recent satisfiable check: a value for every atom, `None` for the
    /// eliminated.
    /// Empty once the formula has changed since the model was made.
    pub fn model(&self) -> &[Option<bool>] {
        match self.model_current {
            true => &self.model,
            false => &[],
        }
    }

    /// The value of `atom` in the model of the most recent satisfiable check.
    pub fn value_of(&self, atom: Atom) -> Option<bool> {
        match self.model_current {
            true => self.model.get(atom as usize).copied().flatten(),
            false => None,
        }
    }

    /// The failed assumptions of the most recent unsatisfiable check.
    pub fn core(&self) -> &[CLiteral] {
        &self.core
    }

    /// A fresh atom, flagged as visible to the extension and/or as a decision candidate.
    pub fn fresh_atom(&mut self, external: bool, decision: bool) -> Atom {
        self.model_current = false;
        let atom = self.atom_db.fresh_atom(external, decision);
        self.watch_db.fresh_atom();
        atom
    }

    /// A run of fresh decision-candidate atoms, as positive literals.
    pub fn fresh_literals(&mut self, count: usize) -> Vec<CLiteral> {
        (0..count)
            .map(|_| CLiteral::new(self.fresh_atom(false, true), true))
            .collect()
    }

    /// The value of `literal` on the current valuation, if its atom has one.
    pub(crate) fn value_of_literal(&self, literal: CLiteral) -> Option<bool> {
        self.atom_db.value_of_literal(literal)
    }

    /// Records a conflict, first come first kept.
    pub(crate) fn set_conflict(&mut self, justification: Justification, falsified: Option<CLiteral>) {
        if self.inconsistent {
            return;
        }
        self.inconsistent = true;
        self.conflict = Some(Conflict {
            justification,
            falsified,
        });
    }

    /// Assigns `literal` with `justification`, noting a conflict if the literal is already
    /// false.
    pub(crate) fn assign(&mut self, literal: CLiteral, justification: Justification) {
        match self.value_of_literal(literal) {
            Some(false) => self.set_conflict(justification, Some(-literal)),
            None => self.assign_core(literal, justification),
            Some(true) => {}
        }
    }

    /// Assigns `literal`, which must be unvalued, recording level, justification, phase, and
    /// the bookkeeping of the active branching heuristic.
    pub(crate) fn assign_core(&mut self, literal: CLiteral, justification: Justification) {
        debug_assert!(self.value_of_literal(literal).is_none());
        let atom = literal.atom() as usize;
        let level = self.trail.level();

        // Assignments at the base level are permanent, and their justification is erased.
        let justification = match level {
            0 => Justification::None,
            _ => justification,
        };

        self.atom_db.values[atom] = Some(literal.polarity());
        self.atom_db.levels[atom] = Some(level);
        self.atom_db.justifications[atom] = justification;
        self.atom_db.phase[atom] = Some(literal.polarity());
        self.atom_db.assigned_since_gc[atom] = true;
        self.trail.assignments.push(literal);

        if self.atom_db.external[atom] && self.extension.is_some() {
            self.asserted_queue.push(literal);
        }

        match self.config.branching {
            crate::config::Branching::Vsids => {}
            crate::config::Branching::Chb => {
                self.atom_db.last_propagation[atom] = self.counters.total_conflicts;
            }
            crate::config::Branching::Lrb => {
                self.atom_db.last_propagation[atom] = self.counters.total_conflicts;
                self.atom_db.participated[atom] = 0;
                self.atom_db.reasoned[atom] = 0;
            }
        }

        if self.config.anti_exploration {
            let age = self
                .counters
                .total_conflicts
                .saturating_sub(self.atom_db.canceled[atom]);
            if age > 0 {
                let decay = 0.95_f64.powi(age as i32);
                self.atom_db.scale_activity(literal.atom(), decay);
                self.atom_db.canceled[atom] = self.counters.total_conflicts;
            }
        }
    }

    /// Polls the resource and time limits.
    pub(crate) fn checkpoint(&self) -> Result<(), ErrorKind> {
        if self.limit.is_canceled() {
            return Err(ErrorKind::from(Interrupt::Canceled));
        }
        if let (Some(cap), Some(start)) = (self.config.time_limit, self.counters.start) {
            if start.elapsed() > cap {
                return Err(ErrorKind::from(Interrupt::Canceled));
            }
        }
        Ok(())
    }

    /// Flushes pending `asserted` notifications to the extension, in trail order.
    pub(crate) fn flush_asserted_queue(&mut self) {
        if self.asserted_queue.is_empty() {
            return;
        }
        if let Some(mut extension) = self.extension.take() {
            for literal in self.asserted_queue.drain(..) {
                extension.asserted(literal);
            }
            self.extension = Some(extension);
        } else {
            self.asserted_queue.clear();
        }
    }

    /// True while failed assumptions are being tracked: some assumption or user scope literal
    /// is in play.
    pub(crate) fn tracking_assumptions(&self) -> bool {
        !self.assumptions.is_empty() || !self.user_scope_literals.is_empty()
    }

    /// True if `literal` was given as an assumption (or is a negated user scope literal).
    pub(crate) fn is_assumption(&self, literal: CLiteral) -> bool {
        !self.assumption_set.is_empty() && self.assumption_set.contains(&literal)
    }
}
