//! Boolean constraint propagation.
//!
//! # Overview
//!
//! While the propagation head trails the assignments, take the next assigned literal ℓ and
//! examine the watchers registered against ℓ becoming true --- each the record of a clause
//! containing ¬ℓ, which may now assert, conflict, or need its watch moved.
//!
//! Each watcher kind has its own arm:
//!
//! - A binary watcher reads the companion literal directly: false is a conflict, unvalued is a
//!   propagation, true is a satisfied clause.
//!   The entry is kept in place in every case.
//! - A ternary watcher reads both companions: one false and one unvalued propagates, both
//!   false conflicts, and otherwise the clause needs no attention.
//!   Again the entry is kept.
//! - A clause watcher first checks its blocked literal --- a true blocked literal witnesses the
//!   clause satisfied without touching the clause database.
//!   Otherwise the clause is fetched and examined: a replacement watch is searched for among
//!   the unwatched literals, and failing that the clause either asserts its remaining watched
//!   literal or conflicts.
//!   Entries for deleted clauses, and entries whose recorded literal is no longer watched, are
//!   stale and dropped.
//! - An external watcher delegates to the extension, which reports whether to keep the entry
//!   and may imply literals or raise a conflict.
//!
//! On a conflict the remainder of the list is copied back verbatim before returning, so the
//! watch invariant survives the early exit, and the propagation head is advanced to the end of
//! the trail --- nothing further will be propagated before the conflict is resolved.
//!
//! # Borrowing
//!
//! The list under examination is taken out of the watch database for the duration of the scan.
//! A moved watch is pushed onto the list of some other literal: the replacement is never false,
//! while the scanned list belongs to a literal which is, so the two never coincide.

use crate::{
    config::Branching,
    db::{clause_db::ClauseHandle, watch_db::Watcher},
    misc::log::targets,
    solver::GenericSolver,
    structures::{justification::Justification, literal::CLiteral},
    types::err::ErrorKind,
};

/// What examination of a clause watcher concluded.
enum WatchOutcome {
    /// The clause is satisfied through its first watched literal; keep, refreshing the hint.
    KeepBlocked(CLiteral),

    /// The entry no longer reflects the clause; drop it.
    Stale,

    /// The watch moved to another literal; drop the entry here.
    Moved,

    /// The clause asserts the literal carried.
    Assert(CLiteral),

    /// Every literal of the clause is false.
    Conflict,
}

impl<R: rand::Rng + rand::SeedableRng> GenericSolver<R> {
    /// Propagates all queued assignments.
    ///
    /// Returns true if propagation completed without conflict; otherwise a conflict descriptor
    /// has been recorded.
    /// With `update` set, learned clause glue is tightened on propagation and the CHB
    /// heuristic collects its rewards.
    pub(crate) fn propagate(&mut self, update: bool) -> Result<bool, ErrorKind> {
        let head_before = self.trail.q_head;
        let consistent = self.propagate_core(update)?;
        if matches!(self.config.branching, Branching::Chb) {
            self.update_chb_activity(consistent, head_before);
        }
        self.flush_asserted_queue();
        Ok(consistent)
    }

    fn propagate_core(&mut self, update: bool) -> Result<bool, ErrorKind> {
        if self.inconsistent {
            return Ok(false);
        }

        while self.trail.q_head < self.trail.assignments.len() {
            self.checkpoint()?;

            let literal = self.trail.assignments[self.trail.q_head];
            self.trail.q_head += 1;
            self.counters.propagations += 1;
            let not_l = -literal;
            log::trace!(target: targets::PROPAGATION, "Propagating {literal}");

            let mut list = std::mem::take(&mut self.watch_db.lists[literal.index()]);
            let length = list.len();
            let mut keep = 0;
            let mut index = 0;
            let mut conflict = false;

            while index < length {
                let mut entry = list[index];
                let mut keep_entry = true;

                match entry {
                    Watcher::Binary { other, .. } => match self.value_of_literal(other) {
                        Some(false) => {
                            self.set_conflict(Justification::Binary(not_l), Some(-other));
                            conflict = true;
                        }
                        None => self.assign_core(other, Justification::Binary(not_l)),
                        Some(true) => {}
                    },

                    Watcher::Ternary { a, b } => {
                        let value_a = self.value_of_literal(a);
                        let value_b = self.value_of_literal(b);
                        if value_a == Some(false) && value_b.is_none() {
                            self.assign_core(b, Justification::Ternary(a, not_l));
                        } else if value_a.is_none() && value_b == Some(false) {
                            self.assign_core(a, Justification::Ternary(b, not_l));
                        } else if value_a == Some(false) && value_b == Some(false) {
                            self.set_conflict(Justification::Ternary(a, not_l), Some(-b));
                            conflict = true;
                        }
                    }

                    Watcher::Clause { blocked, handle } => {
                        if self.value_of_literal(blocked) != Some(true) {
                            match self.examine_clause_watch(handle, not_l) {
                                WatchOutcome::KeepBlocked(witness) => {
                                    entry = Watcher::Clause {
                                        blocked: witness,
                                        handle,
                                    };
                                }
                                WatchOutcome::Stale | WatchOutcome::Moved => keep_entry = false,
                                WatchOutcome::Assert(asserted) => {
                                    self.assign_core(asserted, Justification::Clause(handle));
                                    if update {
                                        self.tighten_glue(handle);
                                    }
                                }
                                WatchOutcome::Conflict => {
                                    self.set_conflict(Justification::Clause(handle), None);
                                    conflict = true;
                                }
                            }
                        }
                    }

                    Watcher::External { index: constraint } => match self.extension.take() {
                        None => {
                            log::warn!(target: targets::PROPAGATION, "External watcher without an extension");
                            keep_entry = false;
                        }
                        Some(mut extension) => {
                            let result = extension.propagate(literal, constraint);
                            self.extension = Some(extension);
                            keep_entry = result.keep;
                            for implied in result.implied {
                                self.assign(implied, Justification::External(constraint));
                                if self.inconsistent {
                                    break;
                                }
                            }
                            if let Some(falsified) = result.conflict {
                                self.set_conflict(
                                    Justification::External(constraint),
                                    Some(falsified),
                                );
                            }
                            if self.inconsistent {
                                conflict = true;
                            }
                        }
                    },
                }

                if keep_entry {
                    list[keep] = entry;
                    keep += 1;
                }
                index += 1;
                if conflict {
                    break;
                }
            }

            if conflict {
                // Copy the unexamined tail verbatim, preserving the watch invariant.
                for tail in index..length {
                    list[keep] = list[tail];
                    keep += 1;
                }
                list.truncate(keep);
                self.watch_db.lists[literal.index()] = list;
                self.trail.q_head = self.trail.assignments.len();
                return Ok(false);
            }

            list.truncate(keep);
            self.watch_db.lists[literal.index()] = list;
        }

        Ok(true)
    }

    /// Examines a clause whose watch on ¬`not_l` fired, moving the watch if possible.
    fn examine_clause_watch(&mut self, handle: ClauseHandle, not_l: CLiteral) -> WatchOutcome {
        let Ok(clause) = self.clause_db.get_mut(handle) else {
            // The clause has been deleted; the watcher is filtered here, lazily.
            return WatchOutcome::Stale;
        };

        if clause[0] == not_l {
            clause.swap(0, 1);
        }
        if clause[1] != not_l {
            return WatchOutcome::Stale;
        }

        let c0 = clause[0];
        if self.atom_db.value_of_literal(c0) == Some(true) {
            return WatchOutcome::KeepBlocked(c0);
        }

        // Search the unwatched literals for a replacement watch.
        for position in 2..clause.size() {
            let candidate = clause[position];
            if self.atom_db.value_of_literal(candidate) != Some(false) {
                clause.set_literal(1, candidate);
                clause.set_literal(position, not_l);
                self.watch_db.watch(
                    candidate,
                    Watcher::Clause {
                        blocked: c0,
                        handle,
                    },
                );
                return WatchOutcome::Moved;
            }
        }

        clause.mark_used();
        match self.atom_db.value_of_literal(c0) {
            Some(false) => WatchOutcome::Conflict,
            None => WatchOutcome::Assert(c0),
            // Witnessed satisfied above; kept for completeness.
            Some(true) => WatchOutcome::KeepBlocked(c0),
        }
    }

    /// Tightens the recorded glue of a learned clause which just propagated, should the levels
    /// present have contracted.
    fn tighten_glue(&mut self, handle: ClauseHandle) {
        let (literals, cap) = {
            let Ok(clause) = self.clause_db.get(handle) else {
                return;
            };
            if !clause.is_learned() || clause.glue() <= 2 {
                return;
            }
            (clause.literals().to_vec(), clause.glue() - 1)
        };
        if let Some(tightened) = self.levels_below(&literals, cap) {
            if let Ok(clause) = self.clause_db.get_mut(handle) {
                clause.set_glue(tightened);
            }
        }
    }

    /// CHB reward pass over the literals assigned by the propagation round.
    fn update_chb_activity(&mut self, consistent: bool, from: usize) {
        let multiplier = self.config.reward_offset
            * match consistent {
                true => self.config.reward_multiplier,
                false => 1.0,
            };
        for index in from..self.trail.assignments.len() {
            let atom = self.trail.assignments[index].atom();
            let gap = self
                .counters
                .total_conflicts
                .saturating_sub(self.atom_db.last_conflict[atom as usize])
                + 1;
            let reward = multiplier / gap as f64;
            let activity = self.atom_db.activity_of(atom) as f64;
            let step = self.counters.step_size;
            let updated = (step * reward + (1.0 - step) * activity) as u32;
            self.atom_db.set_activity(atom, updated);
        }
    }
}
