//! Clause addition: normalization, size dispatch, and attachment.
//!
//! # Normalization
//!
//! A clause given to the solver is sorted, stripped of duplicate literals, and discarded if it
//! is a tautology (contains some literal and its negation) or is satisfied at the base level.
//! Literals false at the base level are dropped.
//!
//! # Size dispatch
//!
//! What remains determines the fate of the clause:
//!
//! - An empty clause makes the solver inconsistent, permanently.
//! - A unit clause becomes an assignment; at the base level, a permanent one.
//! - A binary clause becomes a pair of watchers; the clause itself is never stored.
//! - Anything longer is stored in the clause database and watched on two literals, with
//!   ternary clauses taking the specialized watcher carrying both companions inline.
//!
//! # Watch selection
//!
//! A clause attached away from the base level must watch the right literals for the watch
//! invariant to hold.
//! For an original clause each watch prefers, in order: a true literal of minimal level (the
//! clause stays inactive for as long as possible), an unvalued literal, and otherwise a false
//! literal of maximal level --- without which propagation would be incomplete.
//! For a learned clause the first literal is the one the clause asserts, and the second watch
//! is the false literal of highest level.
//!
//! If attachment finds the clause asserting, the consequence is assigned immediately, and the
//! clause joins the reinitialisation stack so the propagation is re-examined when scopes
//! unwind.

use crate::{
    db::{clause_db::ClauseHandle, watch_db::Watcher},
    misc::log::targets,
    solver::{GenericSolver, ReinitEntry},
    structures::{clause::CClause, justification::Justification, literal::CLiteral},
    types::err::{self, ErrorKind},
};

impl<R: rand::Rng + rand::SeedableRng> GenericSolver<R> {
    /// Adds a clause to the formula.
    ///
    /// Under an open user scope the clause is silently extended with the scope literals, so
    /// popping the scope disposes of the clause.
    pub fn add_clause(&mut self, literals: Vec<CLiteral>) -> Result<(), ErrorKind> {
        self.model_current = false;
        let mut literals = literals;
        if !self.user_scope_literals.is_empty() {
            literals.extend(self.user_scope_literals.iter().copied());
        }
        self.store_clause(literals, false)?;
        Ok(())
    }

    /// Normalizes, stores, and attaches a clause, returning a handle if the clause was given a
    /// slot in the clause database.
    pub(crate) fn store_clause(
        &mut self,
        mut literals: CClause,
        learned: bool,
    ) -> Result<Option<ClauseHandle>, ErrorKind> {
        if !learned && !self.normalize_clause(&mut literals) {
            log::trace!(target: targets::CLAUSE_DB, "Clause discarded by normalization");
            return Ok(None);
        }

        match literals.len() {
            0 => {
                self.set_conflict(Justification::None, None);
                Ok(None)
            }
            1 => {
                self.assign(literals[0], Justification::None);
                Ok(None)
            }
            2 => {
                self.store_binary_clause(literals[0], literals[1], learned);
                Ok(None)
            }
            _ => Ok(Some(self.store_long_clause(literals, learned)?)),
        }
    }

    /// Sorts and deduplicates `literals`, dropping literals false at the base level.
    ///
    /// Returns false if the clause is a tautology or already satisfied, and so may be
    /// discarded.
    fn normalize_clause(&self, literals: &mut CClause) -> bool {
        literals.sort_unstable();
        let at_base = self.trail.at_base_level();
        let mut previous: Option<CLiteral> = None;
        let mut keep = 0;

        for index in 0..literals.len() {
            let current = literals[index];
            let mut value = self.value_of_literal(current);
            // Away from the base level only permanent assignments count.
            if !at_base
                && self
                    .atom_db
                    .level_of(current.atom())
                    .is_some_and(|level| level > 0)
            {
                value = None;
            }

            match value {
                Some(true) => return false,
                Some(false) => {}
                None => {
                    if let Some(previous) = previous {
                        if current == -previous {
                            return false;
                        }
                        if current == previous {
                            continue;
                        }
                    }
                    previous = Some(current);
                    literals[keep] = current;
                    keep += 1;
                }
            }
        }

        literals.truncate(keep);
        true
    }

    /// Stores a binary clause as a pair of watchers, propagating it if it is asserting.
    pub(crate) fn store_binary_clause(&mut self, l1: CLiteral, l2: CLiteral, learned: bool) {
        if self.propagate_binary_clause(l1, l2) {
            if self.trail.at_base_level() {
                // The consequence is permanent, and the clause with it.
                return;
            }
            if !learned && !self.trail.at_search_level() {
                self.reinit_stack.push(ReinitEntry::Binary(l1, l2));
            }
        }
        self.watch_db.watch(l1, Watcher::Binary { other: l2, learned });
        self.watch_db.watch(l2, Watcher::Binary { other: l1, learned });
    }

    /// Assigns the consequence of a binary clause asserting on the current valuation.
    /// Returns true if an assignment was made (or a conflict noted).
    pub(crate) fn propagate_binary_clause(&mut self, l1: CLiteral, l2: CLiteral) -> bool {
        if self.value_of_literal(l2) == Some(false) {
            self.assign(l1, Justification::Binary(l2));
            true
        } else if self.value_of_literal(l1) == Some(false) {
            self.assign(l2, Justification::Binary(l1));
            true
        } else {
            false
        }
    }

    /// Stores a clause of three or more literals in the clause database and attaches it.
    fn store_long_clause(
        &mut self,
        literals: CClause,
        learned: bool,
    ) -> Result<ClauseHandle, ErrorKind> {
        let handle = self.clause_db.insert(literals, learned);
        let reinit = self.attach_clause(handle)?;
        if reinit && !learned {
            self.push_reinit_clause(handle);
        }
        Ok(handle)
    }

    /// Attaches the clause at `handle`, dispatching on size.
    /// Returns true if attachment propagated a literal.
    pub(crate) fn attach_clause(&mut self, handle: ClauseHandle) -> Result<bool, ErrorKind> {
        let size = self.clause_db.get(handle)?.size();
        match size {
            3 => self.attach_ternary(handle),
            _ => self.attach_long(handle),
        }
    }

    /// Detaches the clause at `handle` from the watch database.
    pub(crate) fn detach_clause(&mut self, handle: ClauseHandle) {
        let Ok(clause) = self.clause_db.get(handle) else {
            return;
        };
        match clause.size() {
            3 => {
                let (c0, c1, c2) = (clause[0], clause[1], clause[2]);
                self.watch_db.unwatch_ternary(c0, c1, c2);
                self.watch_db.unwatch_ternary(c1, c0, c2);
                self.watch_db.unwatch_ternary(c2, c0, c1);
            }
            _ => {
                let (c0, c1) = (clause[0], clause[1]);
                self.watch_db.unwatch_clause(c0, handle);
                self.watch_db.unwatch_clause(c1, handle);
            }
        }
    }

    fn attach_ternary(&mut self, handle: ClauseHandle) -> Result<bool, ErrorKind> {
        let (c0, c1, c2) = {
            let clause = self.clause_db.get(handle)?;
            (clause[0], clause[1], clause[2])
        };
        self.watch_db.watch(c0, Watcher::Ternary { a: c1, b: c2 });
        self.watch_db.watch(c1, Watcher::Ternary { a: c0, b: c2 });
        self.watch_db.watch(c2, Watcher::Ternary { a: c0, b: c1 });

        let mut reinit = false;
        if !self.trail.at_base_level() {
            let false_0 = self.value_of_literal(c0) == Some(false);
            let false_1 = self.value_of_literal(c1) == Some(false);
            let false_2 = self.value_of_literal(c2) == Some(false);
            if false_1 && false_2 {
                self.assign(c0, Justification::Ternary(c1, c2));
                reinit = true;
            } else if false_0 && false_2 {
                self.assign(c1, Justification::Ternary(c0, c2));
                reinit = true;
            } else if false_0 && false_1 {
                self.assign(c2, Justification::Ternary(c0, c1));
                reinit = true;
            }
        }
        Ok(reinit)
    }

    fn attach_long(&mut self, handle: ClauseHandle) -> Result<bool, ErrorKind> {
        let at_base = self.trail.at_base_level();
        let learned = self.clause_db.get(handle)?.is_learned();

        if !at_base {
            if learned {
                let watch = self.select_learned_watch(handle)?;
                self.clause_db.get_mut(handle)?.swap(1, watch);
            } else {
                let watch = self.select_watch(handle, 0)?;
                self.clause_db.get_mut(handle)?.swap(0, watch);
                let watch = self.select_watch(handle, 1)?;
                self.clause_db.get_mut(handle)?.swap(1, watch);
            }
        }

        let (c0, c1, blocked) = {
            let clause = self.clause_db.get(handle)?;
            (clause[0], clause[1], clause[clause.size() >> 1])
        };

        let mut reinit = false;
        if !at_base {
            if self.value_of_literal(c0) == Some(false) {
                self.assign(c1, Justification::Clause(handle));
                reinit = true;
            } else if self.value_of_literal(c1) == Some(false) {
                self.assign(c0, Justification::Clause(handle));
                reinit = true;
            }
        }

        self.watch_db.watch(c0, Watcher::Clause { blocked, handle });
        self.watch_db.watch(c1, Watcher::Clause { blocked, handle });
        Ok(reinit)
    }

    /// Selects a watch position for an original clause attached away from the base level,
    /// searching from `starting_at`.
    ///
    /// Prefers a true literal of minimal level, then an unvalued literal, and otherwise takes
    /// a false literal of maximal level --- anything less and propagation may be missed.
    fn select_watch(
        &self,
        handle: ClauseHandle,
        starting_at: usize,
    ) -> Result<usize, ErrorKind> {
        let clause = self.clause_db.get(handle)?;
        let mut min_true: Option<usize> = None;
        let mut max_false: Option<usize> = None;
        let mut unvalued: Option<usize> = None;

        for index in starting_at..clause.size() {
            let literal = clause[index];
            match self.value_of_literal(literal) {
                Some(true) => {
                    let level = self.atom_db.level_of(literal.atom()).unwrap_or(0);
                    match min_true {
                        Some(present)
                            if self.atom_db.level_of(clause[present].atom()).unwrap_or(0)
                                <= level => {}
                        _ => min_true = Some(index),
                    }
                }
                Some(false) => {
                    let level = self.atom_db.level_of(literal.atom()).unwrap_or(0);
                    match max_false {
                        Some(present)
                            if self.atom_db.level_of(clause[present].atom()).unwrap_or(0)
                                >= level => {}
                        _ => max_false = Some(index),
                    }
                }
                None => unvalued = Some(index),
            }
        }

        if let Some(index) = min_true {
            return Ok(index);
        }
        if let Some(index) = unvalued {
            return Ok(index);
        }
        match max_false {
            Some(index) => Ok(index),
            None => Err(err::ClauseDBError::MissingWatch.into()),
        }
    }

    /// Selects the second watch position for a learned clause: the false literal of highest
    /// level after the asserted literal.
    fn select_learned_watch(&self, handle: ClauseHandle) -> Result<usize, ErrorKind> {
        let clause = self.clause_db.get(handle)?;
        let mut max_false = 1;
        for index in 1..clause.size() {
            debug_assert_eq!(self.value_of_literal(clause[index]), Some(false));
            let level = self.atom_db.level_of(clause[index].atom()).unwrap_or(0);
            if level > self.atom_db.level_of(clause[max_false].atom()).unwrap_or(0) {
                max_false = index;
            }
        }
        Ok(max_false)
    }

    /// Places the clause at `handle` on the reinitialisation stack.
    pub(crate) fn push_reinit_clause(&mut self, handle: ClauseHandle) {
        log::trace!(target: targets::CLAUSE_DB, "Clause {handle} added to the reinit stack");
        self.reinit_stack.push(ReinitEntry::Clause(handle));
        if let Ok(clause) = self.clause_db.get_mut(handle) {
            clause.set_reinit_stack(true);
        }
    }
}
