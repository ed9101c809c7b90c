//! DIMACS CNF and WCNF emission.
//!
//! The ordering is deterministic: unit clauses in trail order, then binary clauses in
//! ascending order of watch list index (each emitted from the side with the smaller literal
//! index), then stored clauses in insertion order, originals before learned.

use std::io::{self, Write};

use crate::{
    db::watch_db::Watcher,
    solver::GenericSolver,
    structures::{clause::Clause, literal::CLiteral},
};

impl<R: rand::Rng + rand::SeedableRng> GenericSolver<R> {
    /// The count of clauses an emission will contain.
    fn emitted_clause_count(&self) -> usize {
        let mut count = self.trail.assignments.len();
        for index in 0..self.watch_db.lists.len() {
            let watched = CLiteral::from_index(index).negate();
            for watcher in &self.watch_db.lists[index] {
                if let Watcher::Binary { other, .. } = watcher {
                    if watched.index() < other.index() {
                        count += 1;
                    }
                }
            }
        }
        count + self.clause_db.original_count() + self.clause_db.learned_count()
    }

    /// Writes the formula as DIMACS CNF.
    pub fn write_dimacs(&self, out: &mut impl Write) -> io::Result<()> {
        writeln!(
            out,
            "p cnf {} {}",
            self.atom_db.atom_count(),
            self.emitted_clause_count()
        )?;

        for literal in &self.trail.assignments {
            writeln!(out, "{literal} 0")?;
        }

        for index in 0..self.watch_db.lists.len() {
            let watched = CLiteral::from_index(index).negate();
            for watcher in &self.watch_db.lists[index] {
                if let Watcher::Binary { other, .. } = watcher {
                    if watched.index() < other.index() {
                        writeln!(out, "{watched} {other} 0")?;
                    }
                }
            }
        }

        for handle in self
            .clause_db
            .originals()
            .iter()
            .chain(self.clause_db.learned())
        {
            if let Ok(clause) = self.clause_db.get(*handle) {
                writeln!(out, "{}", clause.literals().as_dimacs())?;
            }
        }

        Ok(())
    }

    /// Writes the formula as WCNF, with the stored clauses hard and the given literals soft at
    /// their weights.
    pub fn write_wcnf(&self, out: &mut impl Write, soft: &[(CLiteral, u32)]) -> io::Result<()> {
        let top = soft.iter().map(|(_, weight)| *weight).max().unwrap_or(0) + 1;

        writeln!(
            out,
            "p wcnf {} {} {top}",
            self.atom_db.atom_count(),
            self.emitted_clause_count() + soft.len(),
        )?;
        writeln!(out, "c soft {}", soft.len())?;

        for literal in &self.trail.assignments {
            writeln!(out, "{top} {literal} 0")?;
        }

        for index in 0..self.watch_db.lists.len() {
            let watched = CLiteral::from_index(index).negate();
            for watcher in &self.watch_db.lists[index] {
                if let Watcher::Binary { other, .. } = watcher {
                    if watched.index() < other.index() {
                        writeln!(out, "{top} {watched} {other} 0")?;
                    }
                }
            }
        }

        for handle in self
            .clause_db
            .originals()
            .iter()
            .chain(self.clause_db.learned())
        {
            if let Ok(clause) = self.clause_db.get(*handle) {
                writeln!(out, "{top} {}", clause.literals().as_dimacs())?;
            }
        }

        for (literal, weight) in soft {
            writeln!(out, "{weight} {literal} 0")?;
        }

        Ok(())
    }
}
