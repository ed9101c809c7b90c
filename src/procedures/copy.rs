//! Snapshotting a solver.
//!
//! The copy receives the atoms with their flags and phases, the permanent (base level)
//! assignments, every non-learned clause, and those learned clauses worth carrying: glue at
//! most two, or size at most forty with glue at most eight.
//! Open user scopes carry over, so incremental state survives.
//!
//! Heuristic activity is deliberately not copied: the copy starts its own search.

use crate::{
    db::watch_db::Watcher,
    solver::GenericSolver,
    structures::{clause::CClause, justification::Justification, literal::CLiteral},
    types::err::ErrorKind,
};

impl<R: rand::Rng + rand::SeedableRng> GenericSolver<R> {
    /// A fresh solver holding the formula and incremental state of this one.
    pub fn copy(&self) -> Result<Self, ErrorKind> {
        let mut copy = GenericSolver::from_config(self.config.clone());

        for atom in 0..self.atom_db.atom_count() {
            copy.fresh_atom(self.atom_db.external[atom], self.atom_db.decision[atom]);
            copy.atom_db.eliminated[atom] = self.atom_db.eliminated[atom];
            copy.atom_db.phase[atom] = self.atom_db.phase[atom];
            copy.atom_db.prev_phase[atom] = self.atom_db.prev_phase[atom];
        }

        // Permanent assignments.
        let base_length = match self.trail.scopes.first() {
            Some(scope) => scope.trail_length,
            None => self.trail.assignments.len(),
        };
        for index in 0..base_length {
            copy.assign(self.trail.assignments[index], Justification::None);
        }

        // Binary non-learned clauses, one side each.
        for index in 0..self.watch_db.lists.len() {
            let watched = CLiteral::from_index(index).negate();
            if self.atom_db.eliminated[watched.atom() as usize] {
                continue;
            }
            for watcher in &self.watch_db.lists[index] {
                let Watcher::Binary {
                    other,
                    learned: false,
                } = watcher
                else {
                    continue;
                };
                if watched.index() > other.index()
                    || self.atom_db.eliminated[other.atom() as usize]
                {
                    continue;
                }
                copy.store_clause(vec![watched, *other], false)?;
            }
        }

        for handle in self.clause_db.originals() {
            if let Ok(clause) = self.clause_db.get(*handle) {
                copy.store_clause(clause.literals().to_vec(), false)?;
            }
        }

        // High quality lemmas only.
        for handle in self.clause_db.learned() {
            let Ok(clause) = self.clause_db.get(*handle) else {
                continue;
            };
            if clause.glue() <= 2 || (clause.size() <= 40 && clause.glue() <= 8) {
                let literals: CClause = clause.literals().to_vec();
                if let Some(copied) = copy.store_clause(literals, true)? {
                    if let Ok(stored) = copy.clause_db.get_mut(copied) {
                        stored.set_glue(clause.glue());
                        stored.set_psm(clause.psm());
                    }
                }
            }
        }

        copy.user_scope_literals = self.user_scope_literals.clone();
        Ok(copy)
    }
}
