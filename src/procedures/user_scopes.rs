//! Incremental user scopes over scope literals.
//!
//! # The discipline
//!
//! [user_push](crate::solver::GenericSolver::user_push) creates a fresh scope atom --- external
//! and never a decision candidate --- and every clause added while the scope is open silently
//! includes the scope literals of all open scopes.
//! During a check the negation of each scope literal is asserted alongside the assumptions, so
//! the added clauses behave exactly as given.
//!
//! All new clauses are thus *relative to* the open scopes, and
//! [user_pop](crate::solver::GenericSolver::user_pop) disposes of a scope wholesale: the scope
//! literal's watch lists are cleared, every stored clause mentioning the literal is deleted,
//! binary watchers mentioning its atom are swept away, any trail suffix from the literal's
//! assignment on is unwound, and the per-atom structures shrink back down to the atoms still
//! referenced somewhere.

use crate::{
    db::watch_db::Watcher,
    misc::log::targets,
    solver::GenericSolver,
    structures::{atom::Atom, literal::CLiteral},
    types::err::ErrorKind,
};

impl<R: rand::Rng + rand::SeedableRng> GenericSolver<R> {
    /// Opens a user scope.
    pub fn user_push(&mut self) {
        let atom = self.fresh_atom(true, false);
        let literal = CLiteral::new(atom, true);
        log::info!(target: targets::SCOPES, "User scope opened with literal {literal}");
        self.user_scope_literals.push(literal);
    }

    /// Pops `count` user scopes, deleting every clause added under them.
    pub fn user_pop(&mut self, count: usize) -> Result<(), ErrorKind> {
        self.pop_to_base_level()?;
        self.model_current = false;

        for _ in 0..count {
            let Some(literal) = self.user_scope_literals.pop() else {
                break;
            };
            log::info!(target: targets::SCOPES, "User scope closed for literal {literal}");

            self.watch_db.clear_atom_lists(literal);
            self.delete_clauses_with(literal, true);
            self.delete_clauses_with(literal, false);
            self.sweep_binaries_with(literal);

            if let Some(position) = self
                .trail
                .assignments
                .iter()
                .position(|assigned| *assigned == literal)
            {
                self.unassign_to(position);
            }

            self.shrink_atoms(literal.atom());
        }
        Ok(())
    }

    /// Deletes every stored clause mentioning `literal`, in either polarity.
    fn delete_clauses_with(&mut self, literal: CLiteral, learned: bool) {
        let handles = match learned {
            true => self.clause_db.learned().to_vec(),
            false => self.clause_db.originals().to_vec(),
        };
        let mut kept = Vec::with_capacity(handles.len());

        for handle in handles {
            let mentions = match self.clause_db.get(handle) {
                Err(_) => continue,
                Ok(clause) => clause.contains(literal) || clause.contains(-literal),
            };
            if mentions {
                self.detach_clause(handle);
                self.clause_db.remove(handle);
            } else {
                kept.push(handle);
            }
        }

        match learned {
            true => self.clause_db.set_learned(kept),
            false => self.clause_db.set_originals(kept),
        }
    }

    /// Removes every binary watcher whose clause mentions the atom of `literal`.
    fn sweep_binaries_with(&mut self, literal: CLiteral) {
        let atom = literal.atom();
        for index in 0..self.watch_db.lists.len() {
            let watched = CLiteral::from_index(index).negate();
            self.watch_db.lists[index].retain(|watcher| match watcher {
                Watcher::Binary { other, .. } => {
                    watched.atom() != atom && other.atom() != atom
                }
                _ => true,
            });
        }
    }

    /// Shrinks the per-atom structures down to the atoms still referenced, starting the search
    /// from the popped scope atom.
    fn shrink_atoms(&mut self, scope_atom: Atom) {
        // Atoms below the scope atom predate the scope and stay regardless.
        let mut count = scope_atom;

        let reference = |count: &mut Atom, atom: Atom| {
            if atom + 1 > *count {
                *count = atom + 1;
            }
        };

        for handle in self
            .clause_db
            .originals()
            .iter()
            .chain(self.clause_db.learned())
        {
            if let Ok(clause) = self.clause_db.get(*handle) {
                for literal in clause.literals() {
                    reference(&mut count, literal.atom());
                }
            }
        }

        for index in 0..self.watch_db.lists.len() {
            let watched = CLiteral::from_index(index).negate();
            for watcher in &self.watch_db.lists[index] {
                if let Watcher::Binary { other, .. } = watcher {
                    reference(&mut count, watched.atom());
                    reference(&mut count, other.atom());
                }
            }
        }

        for literal in &self.trail.assignments {
            reference(&mut count, literal.atom());
        }

        let count = count as usize;
        if count < self.atom_db.atom_count() {
            log::info!(target: targets::SCOPES, "Shrinking to {count} atoms");
            self.atom_db.shrink_to(count);
            self.watch_db.shrink_to_atoms(count);
        }
    }
}
