//! Assumptions and unsatisfiable cores.
//!
//! # Installation
//!
//! Assumptions are installed at a dedicated level --- the *search level* --- opened before any
//! decision: first the negated user scope literals (activating the clauses of open scopes),
//! then the caller's assumptions, each assigned with no justification and propagated before
//! the next is assigned.
//! A conflict during installation means the formula is unsatisfiable under the assumptions,
//! and analysis switches to core extraction.
//!
//! # Core extraction
//!
//! The conflict graph is walked as in standard analysis, but marks spread without regard to
//! level and nothing is resolved away: whenever a processed antecedent is itself an
//! assumption it joins the core, and the walk ends once the trail below the conflict level is
//! reached.
//! The result is the subset of assumptions (and scope literals) which forced the conflict.
//!
//! Each check also tracks the smallest core seen, reusing it when a later conflict produces a
//! larger one, and may optionally shrink the core by a deletion pass: solve again with one
//! core literal dropped, keep the drop whenever the result is still unsatisfiable.

use crate::{
    db::LevelIndex,
    misc::log::targets,
    reports::Report,
    solver::{Conflict, GenericSolver},
    structures::{clause::CClause, justification::Justification, literal::CLiteral},
    types::err::{self, ErrorKind},
};

impl<R: rand::Rng + rand::SeedableRng> GenericSolver<R> {
    /// Clears the assumptions of the previous check.
    pub(crate) fn reset_assumptions(&mut self) {
        self.assumptions.clear();
        self.assumption_set.clear();
    }

    /// Opens the search level and asserts the scope literals and assumptions, propagating
    /// between assignments.
    pub(crate) fn init_assumptions(&mut self, assumptions: &[CLiteral]) -> Result<(), ErrorKind> {
        if assumptions.is_empty() && self.user_scope_literals.is_empty() {
            return Ok(());
        }
        debug_assert!(self.trail.at_base_level());

        self.reset_assumptions();
        self.push_scope();
        self.trail.search_level = self.trail.level();
        self.propagate(false)?;

        let scope_literals = self.user_scope_literals.clone();
        for literal in scope_literals {
            if self.inconsistent {
                break;
            }
            self.assumption_set.insert(-literal);
            self.assign(-literal, Justification::None);
            self.propagate(false)?;
        }

        for assumption in assumptions {
            if self.inconsistent {
                break;
            }
            log::info!(target: targets::CORE, "Assuming {assumption}");
            self.assumption_set.insert(*assumption);
            self.assumptions.push(*assumption);
            self.assign(*assumption, Justification::None);
            self.propagate(false)?;
        }

        Ok(())
    }

    /// Re-asserts scope literals and assumptions after an unwind to the base level.
    pub(crate) fn reinit_assumptions(&mut self) {
        if !self.tracking_assumptions() || !self.trail.at_base_level() || self.inconsistent {
            return;
        }
        self.push_scope();
        self.trail.search_level = self.trail.level();

        let scope_literals = self.user_scope_literals.clone();
        for literal in scope_literals {
            if self.inconsistent {
                break;
            }
            self.assign(-literal, Justification::None);
        }

        let assumptions = self.assumptions.clone();
        for assumption in assumptions {
            if self.inconsistent {
                break;
            }
            self.assign(assumption, Justification::None);
        }
    }

    /// Walks the conflict graph in assumption-tracking mode, collecting the core.
    pub(crate) fn resolve_conflict_for_unsat_core(
        &mut self,
        conflict: Conflict,
        conflict_level: LevelIndex,
    ) -> Result<(), ErrorKind> {
        self.core.clear();
        if conflict_level == 0 {
            return Ok(());
        }
        debug_assert!(self.unmark.is_empty());

        let mut index = self.skip_above(conflict_level) as isize;
        let mut consequent: Option<CLiteral> = None;

        if let Some(falsified) = conflict.falsified {
            let justification = self.atom_db.justification_of(falsified.atom());
            self.core_antecedent(falsified);
            if self.is_assumption(-falsified) {
                self.core.push(-falsified);
            } else {
                self.core_consequent(Some(falsified), justification)?;
            }
            consequent = Some(-falsified);
        }

        let mut justification = conflict.justification;

        loop {
            self.core_consequent(consequent, justification)?;

            while index >= 0 {
                let literal = self.trail.assignments[index as usize];
                if self.atom_db.mark[literal.atom() as usize] {
                    break;
                }
                index -= 1;
            }
            if index < 0 {
                break;
            }

            let literal = self.trail.assignments[index as usize];
            if self.atom_db.level_of(literal.atom()).unwrap_or(0) < conflict_level {
                break;
            }
            consequent = Some(literal);
            justification = self.atom_db.justification_of(literal.atom());
            index -= 1;
        }

        self.reset_unmark(0);

        if self.config.core_minimize {
            if let Some(min) = &self.min_core {
                if min.len() < self.core.len() {
                    log::info!(target: targets::CORE, "Reusing a smaller core of {} literals", min.len());
                    self.core = min.clone();
                }
            }
            self.minimize_core()?;
        }
        self.update_min_core();

        log::info!(target: targets::CORE, "Core of {} assumptions", self.core.len());
        Ok(())
    }

    /// Marks an antecedent, collecting it into the core if it was assumed.
    fn core_antecedent(&mut self, antecedent: CLiteral) {
        let atom = antecedent.atom();
        if !self.atom_db.mark[atom as usize] {
            self.atom_db.mark[atom as usize] = true;
            self.unmark.push(atom);
            if self.is_assumption(antecedent) {
                self.core.push(antecedent);
            }
        }
    }

    /// Processes the antecedents of a justification for core extraction.
    fn core_consequent(
        &mut self,
        consequent: Option<CLiteral>,
        justification: Justification,
    ) -> Result<(), ErrorKind> {
        match justification {
            Justification::None => {}

            Justification::Binary(other) => self.core_antecedent(-other),

            Justification::Ternary(a, b) => {
                self.core_antecedent(-a);
                self.core_antecedent(-b);
            }

            Justification::Clause(handle) => {
                let literals: CClause = self.clause_db.get(handle)?.literals().to_vec();
                let mut start = 0;
                if let Some(consequent) = consequent {
                    if literals[0] == consequent {
                        start = 1;
                    } else {
                        self.core_antecedent(-literals[0]);
                        start = 2;
                    }
                }
                for literal in &literals[start..] {
                    self.core_antecedent(-*literal);
                }
            }

            Justification::External(constraint) => {
                let Some(consequent) = consequent else {
                    return Err(err::AnalysisError::MissingConsequent.into());
                };
                self.fill_ext_antecedents(consequent, constraint);
                let antecedents = std::mem::take(&mut self.ext_antecedents);
                for literal in &antecedents {
                    self.core_antecedent(*literal);
                }
                self.ext_antecedents = antecedents;
            }
        }
        Ok(())
    }

    /// Records the core as the smallest seen, if it is.
    fn update_min_core(&mut self) {
        match &self.min_core {
            Some(min) if min.len() <= self.core.len() => {}
            _ => self.min_core = Some(self.core.clone()),
        }
    }

    /// Deletion-based core shrinking: re-solve with one literal dropped, keeping the drop
    /// whenever unsatisfiability survives.
    ///
    /// Probes run on a copy of the solver with shrinking disabled and a modest conflict
    /// budget, so the pass terminates and never recurses.
    fn minimize_core(&mut self) -> Result<(), ErrorKind> {
        const PROBE_CONFLICTS: u64 = 1_000;

        let mut working = self.core.clone();
        let mut index = 0;
        while index < working.len() {
            let mut candidate = working.clone();
            candidate.remove(index);

            let mut probe = self.copy()?;
            probe.config.core_minimize = false;
            probe.config.max_conflicts = PROBE_CONFLICTS;
            probe.config.time_limit = None;

            match probe.check(&candidate) {
                Ok(Report::Unsatisfiable) => {
                    let refined = probe.core().to_vec();
                    working = match refined.len() < candidate.len() {
                        true => refined,
                        false => candidate,
                    };
                    log::trace!(target: targets::CORE, "Core shrank to {} literals", working.len());
                    index = 0;
                }
                _ => index += 1,
            }
        }
        self.core = working;
        Ok(())
    }
}
