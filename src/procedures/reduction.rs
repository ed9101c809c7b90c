//! Reduction of the learned clause database.
//!
//! Fires once the conflicts since the last reduction exceed a threshold, which grows by a
//! fixed increment each time.
//!
//! # Sorted halving
//!
//! The four sorting strategies stable-sort the learned clauses on a lexicographic quality key
//! --- combinations of glue, psm, and size, all ascending --- and delete the worse half, except
//! for clauses whose removal is unsafe: those currently justifying an assignment, and those on
//! the reinitialisation stack.
//!
//! Psm --- the phase-saving measure --- counts the literals of a clause agreeing with the
//! cached phase of their atom.
//! A high psm suggests the clause is easy to satisfy under the current phases, and so unlikely
//! to propagate.
//!
//! # Dyn-psm
//!
//! The frozen-clause scheme; runs only at the base level.
//! Each round estimates phase volatility `d_tk`: the proportion of atoms assigned since the
//! last round whose cached phase flipped.
//! The running minimum sets a psm budget of `size · min_d_tk` per clause:
//!
//! - An active clause of glue above [gc_small_lbd](crate::config::Config::gc_small_lbd) which
//!   went unused for [gc_k](crate::config::Config::gc_k) rounds is deleted; one whose psm
//!   exceeds its budget is *frozen* --- detached from the watch lists but retained.
//! - A frozen clause whose psm returns within budget is reactivated: cleaned of literals false
//!   at the base level, re-typed if the cleaning leaves it binary, unit, or empty, and
//!   attached fresh.
//!   A frozen clause over budget for too many rounds is deleted.
//!
//! Clauses of small glue are never deleted by this scheme.

use crate::{
    config::GcPolicy,
    db::clause_db::ClauseHandle,
    misc::log::targets,
    solver::GenericSolver,
    structures::{clause::CClause, justification::Justification, literal::CLiteral},
    types::err::ErrorKind,
};

impl<R: rand::Rng + rand::SeedableRng> GenericSolver<R> {
    /// Reduces the learned clause database, if due.
    pub(crate) fn reduce_learned(&mut self) -> Result<(), ErrorKind> {
        if self.counters.conflicts_since_gc <= self.counters.gc_threshold {
            return Ok(());
        }

        match self.config.gc {
            GcPolicy::Glue => {
                self.gc_sorted(|glue, _psm, size| (glue, size, 0));
            }
            GcPolicy::Psm => {
                self.save_psm();
                self.gc_sorted(|_glue, psm, size| (psm, size, 0));
            }
            GcPolicy::GluePsm => {
                self.save_psm();
                self.gc_sorted(|glue, psm, size| (glue, psm, size));
            }
            GcPolicy::PsmGlue => {
                self.save_psm();
                self.gc_sorted(|glue, psm, size| (psm, glue, size));
            }
            GcPolicy::DynPsm => {
                if !self.trail.at_base_level() {
                    return Ok(());
                }
                self.gc_dyn_psm()?;
            }
        }

        if let Some(mut extension) = self.extension.take() {
            extension.gc();
            self.extension = Some(extension);
        }

        self.counters.conflicts_since_gc = 0;
        self.counters.gc_threshold += self.config.gc_increment;
        Ok(())
    }

    /// Stable-sorts the learned clauses by `key`, ascending, and deletes the deletable of the
    /// worse half.
    fn gc_sorted(&mut self, key: impl Fn(u32, u32, u32) -> (u32, u32, u32)) {
        let mut entries: Vec<((u32, u32, u32), ClauseHandle)> = self
            .clause_db
            .learned()
            .iter()
            .filter_map(|handle| {
                let clause = self.clause_db.get(*handle).ok()?;
                Some((
                    key(clause.glue(), clause.psm(), clause.size() as u32),
                    *handle,
                ))
            })
            .collect();
        entries.sort_by_key(|(key, _)| *key);

        let size = entries.len();
        let half = size / 2;
        let mut kept: Vec<ClauseHandle> =
            entries[..half].iter().map(|(_, handle)| *handle).collect();
        let mut deleted = 0;

        for (_, handle) in &entries[half..] {
            if self.can_delete(*handle) {
                self.detach_clause(*handle);
                self.clause_db.remove(*handle);
                deleted += 1;
            } else {
                kept.push(*handle);
            }
        }

        self.clause_db.set_learned(kept);
        log::info!(target: targets::REDUCTION, "Reduction deleted {deleted} of {size} learned clauses");
    }

    /// True if deleting the clause at `handle` is safe: it justifies no assignment and is not
    /// awaiting reinitialisation.
    fn can_delete(&self, handle: ClauseHandle) -> bool {
        let Ok(clause) = self.clause_db.get(handle) else {
            return false;
        };
        if clause.on_reinit_stack() {
            return false;
        }
        let head = clause[0];
        if self.atom_db.value_of_literal(head) == Some(true) {
            if let Justification::Clause(justifying) = self.atom_db.justification_of(head.atom()) {
                if justifying == handle {
                    return false;
                }
            }
        }
        true
    }

    /// Recomputes and stores the psm of every learned clause.
    fn save_psm(&mut self) {
        let handles = self.clause_db.learned().to_vec();
        for handle in handles {
            let psm = match self.clause_db.get(handle) {
                Ok(clause) => self.clause_psm(clause.literals()),
                Err(_) => continue,
            };
            if let Ok(clause) = self.clause_db.get_mut(handle) {
                clause.set_psm(psm);
            }
        }
    }

    /// The phase-saving measure of a clause: literals agreeing with the cached phase of their
    /// atom.
    fn clause_psm(&self, literals: &[CLiteral]) -> u32 {
        literals
            .iter()
            .filter(|literal| {
                self.atom_db.phase[literal.atom() as usize] == Some(literal.polarity())
            })
            .count() as u32
    }

    /// The frozen-clause reduction scheme.
    fn gc_dyn_psm(&mut self) -> Result<(), ErrorKind> {
        debug_assert!(self.trail.at_base_level());

        // The volatility estimate: phase flips per atom assigned since the last round.
        let mut flips: u32 = 0;
        let mut assigned: u32 = 0;
        for atom in 0..self.atom_db.atom_count() {
            if self.atom_db.assigned_since_gc[atom] {
                assigned += 1;
                self.atom_db.assigned_since_gc[atom] = false;
            }
            if self.atom_db.phase[atom] != self.atom_db.prev_phase[atom] {
                flips += 1;
                self.atom_db.prev_phase[atom] = self.atom_db.phase[atom];
            }
        }
        let d_tk = match assigned {
            0 => (self.atom_db.atom_count() + 1) as f64,
            _ => flips as f64 / assigned as f64,
        };
        if d_tk < self.counters.min_d_tk {
            self.counters.min_d_tk = d_tk;
        }

        let mut frozen_count = 0;
        let mut activated = 0;
        let mut deleted = 0;

        let handles = self.clause_db.learned().to_vec();
        let mut kept: Vec<ClauseHandle> = Vec::with_capacity(handles.len());

        for handle in handles {
            let (frozen, glue, size, used, inactive, psm) = {
                let Ok(clause) = self.clause_db.get(handle) else {
                    continue;
                };
                (
                    clause.is_frozen(),
                    clause.glue(),
                    clause.size(),
                    clause.was_used(),
                    clause.inactive_rounds(),
                    self.clause_psm(clause.literals()),
                )
            };
            let budget = (size as f64 * self.counters.min_d_tk) as u32;

            if !frozen {
                if glue > self.config.gc_small_lbd {
                    if used {
                        if let Ok(clause) = self.clause_db.get_mut(handle) {
                            clause.reset_inactive_rounds();
                        }
                    } else {
                        if inactive + 1 > self.config.gc_k {
                            self.detach_clause(handle);
                            self.clause_db.remove(handle);
                            deleted += 1;
                            continue;
                        }
                        if let Ok(clause) = self.clause_db.get_mut(handle) {
                            clause.increment_inactive_rounds();
                        }
                    }
                    if let Ok(clause) = self.clause_db.get_mut(handle) {
                        clause.unmark_used();
                    }
                    if psm > budget {
                        // Unlikely to propagate under the current phases; detach but retain.
                        self.detach_clause(handle);
                        if let Ok(clause) = self.clause_db.get_mut(handle) {
                            clause.reset_inactive_rounds();
                            clause.freeze();
                        }
                        frozen_count += 1;
                    }
                }
                kept.push(handle);
            } else {
                if psm <= budget {
                    if let Ok(clause) = self.clause_db.get_mut(handle) {
                        clause.unfreeze();
                    }
                    activated += 1;
                    if !self.activate_frozen_clause(handle)? {
                        // Satisfied, or reduced to a conflict, unit, or binary clause.
                        self.clause_db.remove(handle);
                        continue;
                    }
                    kept.push(handle);
                } else {
                    if inactive + 1 > self.config.gc_k {
                        self.clause_db.remove(handle);
                        deleted += 1;
                        continue;
                    }
                    if let Ok(clause) = self.clause_db.get_mut(handle) {
                        clause.increment_inactive_rounds();
                    }
                    kept.push(handle);
                }
            }
        }

        self.clause_db.set_learned(kept);
        log::info!(
            target: targets::REDUCTION,
            "Dyn-psm reduction: d_tk {d_tk:.3}, {frozen_count} frozen, {activated} activated, {deleted} deleted"
        );
        Ok(())
    }

    /// Reactivates a thawed clause: cleans literals false at the base level and attaches what
    /// remains.
    /// Returns false if the clause should instead be deleted --- it was satisfied, or it
    /// re-typed to something the arena does not store.
    fn activate_frozen_clause(&mut self, handle: ClauseHandle) -> Result<bool, ErrorKind> {
        debug_assert!(self.trail.at_base_level());
        let cleaned: Option<CClause> = {
            let clause = self.clause_db.get(handle)?;
            let mut remaining = CClause::with_capacity(clause.size());
            let mut satisfied = false;
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
            match satisfied {
                true => None,
                false => Some(remaining),
            }
        };

        let Some(remaining) = cleaned else {
            return Ok(false);
        };

        match remaining.len() {
            0 => {
                self.set_conflict(Justification::None, None);
                Ok(false)
            }
            1 => {
                self.assign(remaining[0], Justification::None);
                Ok(false)
            }
            2 => {
                self.store_binary_clause(remaining[0], remaining[1], true);
                Ok(false)
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
                Ok(true)
            }
        }
    }
}
