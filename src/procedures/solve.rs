//! The search driver.
//!
//! # Shape of a check
//!
//! ```none
//! init_search
//! propagate                    → conflict at the base level: unsatisfiable
//! init_assumptions
//! propagate                    → conflict among the assumptions: core, unsatisfiable
//! burst search (optional)
//! simplify_problem
//! loop:
//!     bounded_search           → return satisfiable / unsatisfiable if determined
//!     conflict cap?            → unknown
//!     restart
//!     simplify_problem
//!     reduce learned clauses
//!     restart / inprocess cap? → unknown
//! ```
//!
//! [bounded_search](GenericSolver::bounded_search) repeats: propagate; on a conflict, analyze
//! and backjump, terminating if analysis identifies a fundamental conflict; hand control back
//! once the conflict or restart budget is spent; otherwise reduce if due and decide.
//! When no decision remains the final check --- the extension's, if attached --- settles
//! satisfiability.
//!
//! # Simplification
//!
//! `simplify_problem` runs on a conflict-count schedule: unwind to the base level, delete
//! satisfied clauses and strip false literals (re-typing clauses which shrink past the arena),
//! canonicalize the watch lists so short watchers lead, and re-install the assumptions.
//! The next round is scheduled by `simplify_mult1`/`simplify_mult2`, capped by `simplify_max`.

use crate::{
    config::RestartPolicy,
    extension::ExtFinalCheck,
    generic::luby::luby,
    misc::log::targets,
    reports::{ReasonUnknown, Report},
    solver::GenericSolver,
    structures::{clause::CClause, justification::Justification, literal::CLiteral},
    types::err::{ErrorKind, Interrupt},
};

impl<R: rand::Rng + rand::SeedableRng> GenericSolver<R> {
    /// Determines the satisfiability of the formula under `assumptions`.
    ///
    /// On `Satisfiable` the model may be read; on `Unsatisfiable` under assumptions, the core.
    /// Interrupts --- cancellation, the time limit, the extension giving up --- become
    /// `unknown` reports; any other error witnesses a broken invariant.
    pub fn check(&mut self, assumptions: &[CLiteral]) -> Result<Report, ErrorKind> {
        match self.check_detail(assumptions) {
            Err(ErrorKind::Interrupt(Interrupt::Canceled)) => {
                Ok(Report::Unknown(ReasonUnknown::Canceled))
            }
            Err(ErrorKind::Interrupt(Interrupt::GiveUp)) => {
                Ok(Report::Unknown(ReasonUnknown::GiveUp))
            }
            other => other,
        }
    }

    fn check_detail(&mut self, assumptions: &[CLiteral]) -> Result<Report, ErrorKind> {
        // Assumptions may name atoms the solver has not seen.
        for assumption in assumptions {
            while self.atom_db.atom_count() <= assumption.atom() as usize {
                self.fresh_atom(false, true);
            }
        }

        self.pop_to_base_level()?;
        self.init_search();

        if self.inconsistent {
            return Ok(Report::Unsatisfiable);
        }
        self.propagate(false)?;
        if self.inconsistent {
            return Ok(Report::Unsatisfiable);
        }

        self.init_assumptions(assumptions)?;
        self.propagate(false)?;
        if self.check_inconsistent()? {
            return Ok(Report::Unsatisfiable);
        }

        self.cleanup_base()?;
        if self.check_inconsistent()? {
            return Ok(Report::Unsatisfiable);
        }

        if self.config.max_conflicts > 0 && self.config.burst_search > 0 {
            log::info!(target: targets::SOLVE, "Burst search of {} conflicts", self.config.burst_search);
            self.counters.restart_threshold = self.config.burst_search;
            if let Some(report) = self.bounded_search()? {
                return Ok(report);
            }
            self.pop_reinit(self.trail.level())?;
            self.counters.conflicts_since_restart = 0;
            self.counters.restart_threshold = self.config.restart_initial;
        }

        self.simplify_problem()?;
        if self.check_inconsistent()? {
            return Ok(Report::Unsatisfiable);
        }

        if self.config.max_conflicts == 0 {
            return Ok(Report::Unknown(ReasonUnknown::MaxConflicts));
        }

        loop {
            if let Some(report) = self.bounded_search()? {
                return Ok(report);
            }

            if self.counters.conflicts > self.config.max_conflicts {
                return Ok(Report::Unknown(ReasonUnknown::MaxConflicts));
            }

            self.restart()?;
            self.simplify_problem()?;
            if self.check_inconsistent()? {
                return Ok(Report::Unsatisfiable);
            }
            self.reduce_learned()?;

            if self.config.max_restarts <= self.counters.restarts {
                return Ok(Report::Unknown(ReasonUnknown::MaxRestarts));
            }
            if self.config.max_inprocess <= self.counters.simplifications {
                return Ok(Report::Unknown(ReasonUnknown::MaxInprocess));
            }
        }
    }

    /// Resets the per-solve scheduling state.
    ///
    /// The source of randomness is reseeded, so an unchanged formula checks identically.
    fn init_search(&mut self) {
        self.rng = R::seed_from_u64(self.config.random_seed);
        self.model_current = false;
        self.counters.phase_counter = 0;
        self.counters.phase_cache_on = false;
        self.counters.conflicts = 0;
        self.counters.conflicts_since_restart = 0;
        self.counters.conflicts_since_gc = 0;
        self.counters.restart_threshold = self.config.restart_initial;
        self.counters.gc_threshold = self.config.gc_initial;
        self.counters.luby_index = 1;
        self.counters.restarts = 0;
        self.counters.min_d_tk = 1.0;
        self.counters.step_size = self.config.step_size_init;
        self.counters.start = Some(std::time::Instant::now());
        self.trail.search_level = 0;
        self.core.clear();
        self.min_core = None;
        // A cancelled analysis may have left marks behind.
        self.atom_db.mark.fill(false);
        self.atom_db.lit_mark.fill(false);
        self.limit.reset();
    }

    /// Search until satisfiability is determined or the conflict or restart budget is spent
    /// (`None`).
    fn bounded_search(&mut self) -> Result<Option<Report>, ErrorKind> {
        loop {
            self.checkpoint()?;

            'steps: loop {
                if self.propagate(true)? {
                    break 'steps;
                }

                if !self.resolve_conflict()? {
                    return Ok(Some(Report::Unsatisfiable));
                }

                if self.counters.conflicts > self.config.max_conflicts
                    || self.counters.conflicts_since_restart > self.counters.restart_threshold
                {
                    return Ok(None);
                }

                if self.trail.at_base_level() {
                    self.cleanup_base()?;
                    if self.inconsistent {
                        log::info!(target: targets::SOLVE, "Conflict at the base level");
                        return Ok(Some(Report::Unsatisfiable));
                    }
                    self.reduce_learned()?;
                }
            }

            self.reduce_learned()?;

            if !self.decide() {
                if let Some(report) = self.final_check()? {
                    return Ok(Some(report));
                }
            }
        }
    }

    /// The check made when no decision remains: the extension has the last word, and
    /// otherwise the valuation is a model.
    fn final_check(&mut self) -> Result<Option<Report>, ErrorKind> {
        match self.extension.take() {
            None => {
                self.make_model();
                Ok(Some(Report::Satisfiable))
            }
            Some(mut extension) => {
                let result = extension.final_check();
                self.extension = Some(extension);
                match result {
                    ExtFinalCheck::Done => {
                        self.make_model();
                        Ok(Some(Report::Satisfiable))
                    }
                    ExtFinalCheck::Continue(clauses) => {
                        for clause in clauses {
                            self.add_clause(clause)?;
                        }
                        Ok(None)
                    }
                    ExtFinalCheck::GiveUp => Err(Interrupt::GiveUp.into()),
                }
            }
        }
    }

    /// On inconsistency: resolves the conflict against the assumptions, yielding a core.
    fn check_inconsistent(&mut self) -> Result<bool, ErrorKind> {
        if self.inconsistent {
            if self.tracking_assumptions() {
                self.resolve_conflict()?;
            }
            Ok(true)
        } else {
            Ok(false)
        }
    }

    /// Unwinds to the search level and revises the restart threshold.
    fn restart(&mut self) -> Result<(), ErrorKind> {
        self.counters.restarts += 1;
        log::info!(
            target: targets::SOLVE,
            "Restart {} after {} conflicts",
            self.counters.restarts,
            self.counters.conflicts
        );
        self.pop_reinit(self.trail.level() - self.trail.search_level)?;
        self.counters.conflicts_since_restart = 0;
        match self.config.restart {
            RestartPolicy::Geometric => {
                self.counters.restart_threshold =
                    (self.counters.restart_threshold as f64 * self.config.restart_factor) as u32;
            }
            RestartPolicy::Luby => {
                self.counters.luby_index += 1;
                self.counters.restart_threshold = self
                    .config
                    .restart_initial
                    .saturating_mul(luby(self.counters.luby_index));
            }
        }
        Ok(())
    }

    /// Scheduled base-level simplification.
    pub(crate) fn simplify_problem(&mut self) -> Result<(), ErrorKind> {
        if self.counters.conflicts < self.counters.next_simplify {
            return Ok(());
        }
        self.counters.simplifications += 1;
        log::info!(target: targets::SOLVE, "Simplification {}", self.counters.simplifications);

        self.pop_levels(self.trail.level())?;
        self.cleanup_base()?;
        self.watch_db.sort_watches();
        self.reinit_assumptions();

        if self.counters.next_simplify == 0 {
            self.counters.next_simplify =
                self.config.restart_initial as u64 * self.config.simplify_mult1 as u64;
        } else {
            let mut next = (self.counters.conflicts as f64 * self.config.simplify_mult2) as u64;
            let cap = self.counters.conflicts + self.config.simplify_max as u64;
            if next > cap {
                next = cap;
            }
            self.counters.next_simplify = next;
        }
        Ok(())
    }

    /// Deletes clauses satisfied at the base level and strips false literals, re-typing
    /// clauses which shrink below the arena.
    pub(crate) fn cleanup_base(&mut self) -> Result<(), ErrorKind> {
        if !self.trail.at_base_level() || self.inconsistent {
            return Ok(());
        }

        // Binary watcher pairs of satisfied clauses, both sides.
        for index in 0..self.watch_db.lists.len() {
            let watched = CLiteral::from_index(index).negate();
            let watched_satisfied = self.atom_db.value_of_literal(watched) == Some(true);
            let atom_db = &self.atom_db;
            self.watch_db.lists[index].retain(|watcher| match watcher {
                crate::db::watch_db::Watcher::Binary { other, .. } => {
                    !(watched_satisfied || atom_db.value_of_literal(*other) == Some(true))
                }
                _ => true,
            });
        }

        self.cleanup_long_clauses(false)?;
        self.cleanup_long_clauses(true)
    }

    fn cleanup_long_clauses(&mut self, learned: bool) -> Result<(), ErrorKind> {
        let handles = match learned {
            true => self.clause_db.learned().to_vec(),
            false => self.clause_db.originals().to_vec(),
        };
        let mut kept = Vec::with_capacity(handles.len());

        for handle in handles {
            enum Fate {
                Keep,
                Satisfied,
                Strip(CClause),
            }

            let fate = {
                let Ok(clause) = self.clause_db.get(handle) else {
                    continue;
                };
                if clause.is_frozen() {
                    kept.push(handle);
                    continue;
                }
                let mut satisfied = false;
                let mut remaining = CClause::with_capacity(clause.size());
                for literal in clause.literals() {
                    match self.atom_db.value_of_literal(*literal) {
                        Some(true) => {
                            satisfied = true;
                            break;
                        }
                        Some(false) => {}
                        None => remaining.push(*literal),
                    }
                }
                if satisfied {
                    Fate::Satisfied
                } else if remaining.len() == clause.size() {
                    Fate::Keep
                } else {
                    Fate::Strip(remaining)
                }
            };

            match fate {
                Fate::Keep => kept.push(handle),
                Fate::Satisfied => {
                    self.detach_clause(handle);
                    self.clause_db.remove(handle);
                }
                Fate::Strip(remaining) => {
                    self.detach_clause(handle);
                    match remaining.len() {
                        0 => {
                            self.set_conflict(Justification::None, None);
                            self.clause_db.remove(handle);
                        }
                        1 => {
                            self.assign(remaining[0], Justification::None);
                            self.clause_db.remove(handle);
                        }
                        2 => {
                            self.store_binary_clause(remaining[0], remaining[1], learned);
                            self.clause_db.remove(handle);
                        }
                        size => {
                            {
                                let clause = self.clause_db.get_mut(handle)?;
                                for (index, literal) in remaining.iter().enumerate() {
                                    clause.set_literal(index, *literal);
                                }
                                clause.shrink(size);
                            }
                            self.attach_clause(handle)?;
                            kept.push(handle);
                        }
                    }
                }
            }
        }

        match learned {
            true => self.clause_db.set_learned(kept),
            false => self.clause_db.set_originals(kept),
        }
        Ok(())
    }

    /// Reads the valuation into the model.
    fn make_model(&mut self) {
        let count = self.atom_db.atom_count();
        self.model.clear();
        self.model.resize(count, None);
        for atom in 0..count {
            if !self.atom_db.eliminated[atom] {
                self.model[atom] = self.atom_db.values[atom];
            }
        }
        self.model_current = true;
    }
}
