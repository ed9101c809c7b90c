//! Lemma minimization and dynamic subsumption.
//!
//! # Minimization
//!
//! A non-UIP literal ℓ of the lemma may be dropped if ¬ℓ is implied by the other (marked)
//! lemma literals together with the permanent assignments: resolving the lemma against the
//! implication chain of ℓ removes ℓ without introducing anything new.
//!
//! Implication is tested by a depth-first search over justifications, kept iterative on a
//! worklist.
//! The search fails fast through an approximation: the decision levels present in the lemma
//! are hashed into a 64-bit set, and any antecedent assigned at a level outside the set ends
//! the search --- such a literal cannot be absorbed by the lemma.
//!
//! # Dynamic subsumption
//!
//! The surviving lemma is strengthened by resolution against binary and ternary clauses found
//! on the watch lists of its literals: a clause ℓ ∨ m with ¬m in the lemma and ℓ in the lemma
//! allows ¬m to be dropped.
//! Watch lists are scanned only up to the first long watcher --- sorted lists put the short
//! entries first, so this finds most candidates cheaply, and a missed candidate costs nothing
//! but the strengthening.
//! The UIP itself is never dropped: propagations may have been missed, so the guard is kept
//! unconditionally.

use crate::{
    misc::log::targets,
    solver::GenericSolver,
    structures::{clause::CClause, justification::Justification, literal::CLiteral},
    types::err::ErrorKind,
};

/// An approximation of a set of decision levels, hashed into a machine word.
#[derive(Clone, Copy, Default)]
pub(crate) struct LevelSet(u64);

impl LevelSet {
    fn insert(&mut self, level: u32) {
        self.0 |= 1 << (level & 63);
    }

    fn may_contain(&self, level: u32) -> bool {
        self.0 & (1 << (level & 63)) != 0
    }
}

impl<R: rand::Rng + rand::SeedableRng> GenericSolver<R> {
    /// Drops every non-UIP lemma literal implied by the rest of the lemma and the permanent
    /// assignments.
    pub(crate) fn minimize_lemma(&mut self) -> Result<(), ErrorKind> {
        debug_assert!(self.unmark.is_empty());
        let mut lemma_levels = LevelSet::default();
        for literal in &self.lemma {
            lemma_levels.insert(self.atom_db.level_of(literal.atom()).unwrap_or(0));
        }

        let lemma = std::mem::take(&mut self.lemma);
        let mut keep = 1;
        let mut minimized = lemma;
        let size = minimized.len();

        for index in 1..size {
            let literal = minimized[index];
            if self.implied_by_marked(literal, lemma_levels)? {
                log::trace!(target: targets::ANALYSIS, "Minimization dropped {literal}");
                self.unmark.push(literal.atom());
            } else {
                minimized[keep] = literal;
                keep += 1;
            }
        }

        minimized.truncate(keep);
        self.lemma = minimized;
        self.reset_unmark(0);
        Ok(())
    }

    /// True if ¬`literal` is implied by the marked literals and permanent assignments, by
    /// depth-first search over justifications.
    fn implied_by_marked(
        &mut self,
        literal: CLiteral,
        lemma_levels: LevelSet,
    ) -> Result<bool, ErrorKind> {
        self.min_stack.clear();
        self.min_stack.push(literal.atom());
        let reached = self.unmark.len();

        while let Some(atom) = self.min_stack.pop() {
            let supported = match self.atom_db.justification_of(atom) {
                Justification::None => {
                    // A decision or assumption: absorbed only at the base level.
                    self.atom_db.level_of(atom).unwrap_or(0) == 0
                }

                Justification::Binary(other) => self.minimization_antecedent(-other, lemma_levels),

                Justification::Ternary(a, b) => {
                    self.minimization_antecedent(-a, lemma_levels)
                        && self.minimization_antecedent(-b, lemma_levels)
                }

                Justification::Clause(handle) => {
                    let literals: CClause = self.clause_db.get(handle)?.literals().to_vec();
                    let mut start = 0;
                    let mut supported = true;
                    if literals[0].atom() == atom {
                        start = 1;
                    } else {
                        debug_assert_eq!(literals[1].atom(), atom);
                        supported = self.minimization_antecedent(-literals[0], lemma_levels);
                        start = 2;
                    }
                    supported
                        && literals[start..]
                            .iter()
                            .all(|l| self.minimization_antecedent(-*l, lemma_levels))
                }

                Justification::External(constraint) => {
                    let consequent =
                        CLiteral::new(atom, self.atom_db.value_of(atom) == Some(true));
                    self.fill_ext_antecedents(consequent, constraint);
                    let antecedents = std::mem::take(&mut self.ext_antecedents);
                    let supported = antecedents
                        .iter()
                        .all(|l| self.minimization_antecedent(*l, lemma_levels));
                    self.ext_antecedents = antecedents;
                    supported
                }
            };

            if !supported {
                self.reset_unmark(reached);
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Processes one antecedent of the minimization search.
    ///
    /// Marked and permanent antecedents are absorbed; an unmarked antecedent at a level in the
    /// lemma's level set joins the search; anything else fails it.
    fn minimization_antecedent(&mut self, antecedent: CLiteral, lemma_levels: LevelSet) -> bool {
        let atom = antecedent.atom();
        let level = self.atom_db.level_of(atom).unwrap_or(0);
        if !self.atom_db.mark[atom as usize] && level > 0 {
            if !lemma_levels.may_contain(level) {
                return false;
            }
            self.atom_db.mark[atom as usize] = true;
            self.unmark.push(atom);
            self.min_stack.push(atom);
        }
        true
    }

    /// Unmarks every atom recorded past `reached`, restoring the unmark stack.
    pub(crate) fn reset_unmark(&mut self, reached: usize) {
        for atom in self.unmark.split_off(reached) {
            self.atom_db.mark[atom as usize] = false;
        }
    }

    /// Clears the analyzer marks of the lemma literals, first letting LRB collect reason
    /// counts from them.
    pub(crate) fn reset_lemma_marks(&mut self) -> Result<(), ErrorKind> {
        if matches!(self.config.branching, crate::config::Branching::Lrb) {
            self.update_lrb_reasoned()?;
        }
        for index in 1..self.lemma.len() {
            let atom = self.lemma[index].atom();
            self.atom_db.mark[atom as usize] = false;
        }
        Ok(())
    }

    /// Credits a reason count to every atom justifying a lemma literal.
    fn update_lrb_reasoned(&mut self) -> Result<(), ErrorKind> {
        let size = self.lemma.len();
        if size == 0 {
            return Ok(());
        }
        let uip_atom = self.lemma[0].atom();
        self.atom_db.mark[uip_atom as usize] = true;

        let mut index = size;
        while index > 0 {
            index -= 1;
            let atom = self.lemma[index].atom();
            match self.atom_db.justification_of(atom) {
                Justification::None => {}
                Justification::Binary(other) => self.lrb_reason(other),
                Justification::Ternary(a, b) => {
                    self.lrb_reason(a);
                    self.lrb_reason(b);
                }
                Justification::Clause(handle) => {
                    let literals: CClause = self.clause_db.get(handle)?.literals().to_vec();
                    for literal in literals {
                        self.lrb_reason(literal);
                    }
                }
                Justification::External(constraint) => {
                    let consequent = self.lemma[index];
                    self.fill_ext_antecedents(consequent, constraint);
                    let antecedents = std::mem::take(&mut self.ext_antecedents);
                    for literal in &antecedents {
                        self.lrb_reason(*literal);
                    }
                    self.ext_antecedents = antecedents;
                }
            }
        }

        self.atom_db.mark[uip_atom as usize] = false;
        for literal in self.lemma.split_off(size) {
            self.atom_db.mark[literal.atom() as usize] = false;
        }
        Ok(())
    }

    fn lrb_reason(&mut self, literal: CLiteral) {
        let atom = literal.atom();
        if !self.atom_db.mark[atom as usize] {
            self.atom_db.mark[atom as usize] = true;
            self.atom_db.reasoned[atom as usize] += 1;
            self.lemma.push(literal);
        }
    }

    /// Strengthens the lemma by resolution against binary and ternary clauses on the watch
    /// lists of its literals.
    pub(crate) fn dyn_sub_res(&mut self) {
        let size = self.lemma.len();
        for index in 0..size {
            self.atom_db.lit_mark[self.lemma[index].index()] = true;
        }
        let uip = self.lemma[0];

        for index in 0..size {
            let literal = self.lemma[index];
            if !self.atom_db.lit_mark[literal.index()] {
                continue;
            }
            // Clauses containing `literal` register against ¬literal becoming true.
            let list_index = literal.negate().index();
            for watcher in &self.watch_db.lists[list_index] {
                match watcher {
                    crate::db::watch_db::Watcher::Binary { other, .. } => {
                        // The clause literal ∨ other permits dropping ¬other.
                        let target = other.negate();
                        if self.atom_db.lit_mark[target.index()] && uip != target {
                            self.atom_db.lit_mark[target.index()] = false;
                        }
                    }
                    crate::db::watch_db::Watcher::Ternary { a, b } => {
                        let (l2, l3) = (*a, *b);
                        if self.atom_db.lit_mark[l2.index()]
                            && self.atom_db.lit_mark[l3.negate().index()]
                            && uip != l3.negate()
                        {
                            self.atom_db.lit_mark[l3.negate().index()] = false;
                        } else if self.atom_db.lit_mark[l2.negate().index()]
                            && self.atom_db.lit_mark[l3.index()]
                            && uip != l2.negate()
                        {
                            self.atom_db.lit_mark[l2.negate().index()] = false;
                        }
                    }
                    // Sorted lists put short watchers first; the strengthening is best effort.
                    _ => break,
                }
            }
        }

        debug_assert!(self.atom_db.lit_mark[uip.index()]);

        let mut keep = 0;
        for index in 0..size {
            let literal = self.lemma[index];
            if self.atom_db.lit_mark[literal.index()] {
                self.atom_db.lit_mark[literal.index()] = false;
                self.lemma[keep] = literal;
                keep += 1;
            }
        }
        if size != keep {
            log::trace!(target: targets::ANALYSIS, "Subsumption dropped {} literals", size - keep);
        }
        self.lemma.truncate(keep);
    }
}
