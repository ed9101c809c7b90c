//! Recovery from a conflict: unwinding decision levels.
//!
//! # Overview
//!
//! A backjump is a 'jump' from some (higher) decision level to some previous (lower) decision
//! level: every assignment made at the unwound levels is undone, the scope stack is truncated,
//! and the propagation head is reset to the surviving trail.
//!
//! Unassignment is where the bookkeeping of several heuristics lives: an atom returning to the
//! unvalued pool rejoins the activity heap, collects its learning-rate reward (LRB), and is
//! stamped for anti-exploration aging.
//! The cached phase survives, which is the whole of phase saving.
//!
//! # Reinitialisation
//!
//! A clause which propagated a literal at a scope above the one it was asserted in sits on the
//! reinitialisation stack.
//! When levels unwind past the point of assertion the propagation may have been undone, so each
//! such clause is detached and attached afresh --- attachment repeats the propagation if it
//! still applies, and the clause stays on the stack while it keeps propagating above the base
//! level.

use crate::{
    db::LevelIndex,
    misc::log::targets,
    solver::{GenericSolver, ReinitEntry},
    structures::justification::Justification,
    types::err::ErrorKind,
};

impl<R: rand::Rng + rand::SeedableRng> GenericSolver<R> {
    /// Opens a fresh decision level.
    pub(crate) fn push_scope(&mut self) {
        debug_assert!(!self.inconsistent);
        self.trail
            .push_scope(self.reinit_stack.len(), self.inconsistent);
        if let Some(mut extension) = self.extension.take() {
            extension.push_scope();
            self.extension = Some(extension);
        }
    }

    /// Unwinds `count` decision levels.
    pub(crate) fn pop_levels(&mut self, count: LevelIndex) -> Result<(), ErrorKind> {
        if count == 0 {
            return Ok(());
        }
        log::trace!(target: targets::BACKJUMP, "Backjump from {} by {count}", self.trail.level());
        debug_assert!(count <= self.trail.level());

        if let Some(mut extension) = self.extension.take() {
            extension.pop_scopes(count);
            self.extension = Some(extension);
        }

        let new_level = self.trail.level() - count;
        let scope = self.trail.scopes[new_level as usize];
        self.inconsistent = false;
        self.conflict = None;
        self.unassign_to(scope.trail_length);
        self.trail.scopes.truncate(new_level as usize);
        self.reinit_clauses(scope.reinit_length)
    }

    /// Unwinds `count` levels and re-installs any assumptions unwound with them.
    pub(crate) fn pop_reinit(&mut self, count: LevelIndex) -> Result<(), ErrorKind> {
        self.pop_levels(count)?;
        self.reinit_assumptions();
        Ok(())
    }

    /// Unwinds every level, dropping assumptions.
    pub(crate) fn pop_to_base_level(&mut self) -> Result<(), ErrorKind> {
        self.reset_assumptions();
        self.pop_levels(self.trail.level())?;
        self.trail.search_level = 0;
        Ok(())
    }

    /// Clears every assignment made after the trail had length `length`.
    pub(crate) fn unassign_to(&mut self, length: usize) {
        let mut index = self.trail.assignments.len();
        while index > length {
            index -= 1;
            let literal = self.trail.assignments[index];
            let atom = literal.atom() as usize;

            self.atom_db.values[atom] = None;
            self.atom_db.levels[atom] = None;
            self.atom_db.justifications[atom] = Justification::None;

            if matches!(self.config.branching, crate::config::Branching::Lrb) {
                let interval = self
                    .counters
                    .total_conflicts
                    .saturating_sub(self.atom_db.last_propagation[atom]);
                if interval > 0 {
                    let participation =
                        (self.atom_db.participated[atom] + self.atom_db.reasoned[atom]) as f64;
                    let reward = self.config.reward_offset * participation / interval as f64;
                    let activity = self.atom_db.activity_of(literal.atom()) as f64;
                    let step = self.counters.step_size;
                    let updated = (step * reward + (1.0 - step) * activity) as u32;
                    self.atom_db.set_activity(literal.atom(), updated);
                }
            }

            if self.config.anti_exploration {
                self.atom_db.canceled[atom] = self.counters.total_conflicts;
            }

            if self.atom_db.decision[atom] {
                self.atom_db.activity_heap.activate(atom);
            }
        }
        self.trail.assignments.truncate(length);
        self.trail.q_head = length;
    }

    /// Replays the reinitialisation stack from `length`, re-attaching clauses whose
    /// propagation may have been undone.
    fn reinit_clauses(&mut self, length: usize) -> Result<(), ErrorKind> {
        let mut keep = length;
        for index in length..self.reinit_stack.len() {
            let entry = self.reinit_stack[index];
            match entry {
                ReinitEntry::Binary(l1, l2) => {
                    if self.propagate_binary_clause(l1, l2) && !self.trail.at_base_level() {
                        self.reinit_stack[keep] = entry;
                        keep += 1;
                    }
                }
                ReinitEntry::Clause(handle) => {
                    if self.clause_db.get(handle).is_err() {
                        continue;
                    }
                    self.detach_clause(handle);
                    let reinit = self.attach_clause(handle)?;
                    if reinit && !self.trail.at_base_level() {
                        self.reinit_stack[keep] = entry;
                        keep += 1;
                    } else if let Ok(clause) = self.clause_db.get_mut(handle) {
                        clause.set_reinit_stack(false);
                    }
                }
            }
        }
        self.reinit_stack.truncate(keep);
        Ok(())
    }
}
