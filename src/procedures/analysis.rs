//! Conflict analysis: from a falsified constraint to an asserting learned clause.
//!
//! # First-UIP resolution
//!
//! A conflict at level *d* is resolved into a lemma of the form ¬UIP ∨ ℓ₁ ∨ … ∨ ℓₖ where every
//! ℓᵢ is false at a level strictly below *d* and the UIP is the unique marked literal remaining
//! at *d*: the first unique implication point.
//!
//! The algorithm walks the trail backward from the conflict.
//! The antecedents of the conflict are marked, counting those at level *d* as *open* and
//! collecting the rest into the lemma.
//! The most recent marked trail literal becomes the pivot: while more than one mark at *d*
//! remains open, the pivot's justification is resolved in --- its antecedents processed the
//! same way --- and the walk continues.
//! When a single open mark remains the pivot is the UIP, and its negation heads the lemma.
//!
//! # After resolution
//!
//! The lemma is [minimized](crate::procedures::minimize), the backjump level is the maximal
//! level among the non-UIP literals, and the lemma is stored: attachment watches the UIP
//! negation and the surviving literal of highest level, so the lemma immediately asserts.
//!
//! Analysis is also where branching heuristics collect their signal: VSIDS bumps every marked
//! atom, CHB stamps them with the conflict index, LRB counts participation, and the conflict
//! level's cached phases are forgotten.
//!
//! # Cores
//!
//! A conflict at or below the level holding assumptions is not resolved into a lemma: it is
//! walked in assumption-tracking mode instead, producing an unsatisfiable core --- see
//! [assumptions](crate::procedures::assumptions).

use crate::{
    config::Branching,
    db::LevelIndex,
    extension::ExtResolution,
    misc::log::targets,
    solver::{Conflict, GenericSolver},
    structures::{clause::CClause, justification::Justification, literal::CLiteral},
    types::err::{self, ErrorKind},
};

impl<R: rand::Rng + rand::SeedableRng> GenericSolver<R> {
    /// Resolves the recorded conflict, learning a lemma and backjumping.
    ///
    /// Returns false if the conflict is fundamental --- below any decision, or within the
    /// assumptions, in which case a core has been extracted --- and the formula is
    /// unsatisfiable as it stands.
    ///
    /// Reinitialisation after the backjump may itself conflict, in which case resolution
    /// repeats.
    pub(crate) fn resolve_conflict(&mut self) -> Result<bool, ErrorKind> {
        loop {
            if !self.resolve_conflict_core()? {
                return Ok(false);
            }
            if !self.inconsistent {
                return Ok(true);
            }
        }
    }

    fn resolve_conflict_core(&mut self) -> Result<bool, ErrorKind> {
        self.counters.conflicts += 1;
        self.counters.total_conflicts += 1;
        self.counters.conflicts_since_restart += 1;
        self.counters.conflicts_since_gc += 1;
        if self.counters.step_size > self.config.step_size_min {
            self.counters.step_size -= self.config.step_size_dec;
        }

        let Some(conflict) = self.conflict else {
            return Err(err::AnalysisError::NoConflict.into());
        };
        let conflict_level = self.conflict_level(conflict)?;
        log::info!(target: targets::ANALYSIS, "Conflict at level {conflict_level}");

        if self.tracking_assumptions() && conflict_level <= self.trail.search_level {
            // The conflict rests on the assumptions; walk it at their level for a core.
            let walk_level = self.trail.search_level;
            self.resolve_conflict_for_unsat_core(conflict, walk_level)?;
            return Ok(false);
        }

        if conflict_level == 0 {
            return Ok(false);
        }

        self.forget_phases_above(conflict_level);

        if let Some(mut extension) = self.extension.take() {
            let resolution = extension.resolve_conflict();
            self.extension = Some(extension);
            match resolution {
                ExtResolution::Lemma(lemma) => {
                    self.lemma = lemma;
                    self.learn_lemma_and_backjump()?;
                    return Ok(true);
                }
                ExtResolution::Default => {}
                ExtResolution::Handled => {
                    // The plugin absorbed the conflict; unwind below the conflict level and
                    // carry on without a lemma.
                    self.pop_reinit(self.trail.level() - (conflict_level - 1))?;
                    return Ok(true);
                }
            }
        }

        self.lemma.clear();
        // Space for the UIP negation, set once resolution completes.
        self.lemma.push(CLiteral::new(0, false));

        let mut index = self.skip_above(conflict_level);
        let mut open: u32 = 0;
        let mut consequent: Option<CLiteral> = None;

        if let Some(falsified) = conflict.falsified {
            self.process_antecedent(falsified, conflict_level, &mut open);
            consequent = Some(-falsified);
        }

        let mut justification = conflict.justification;

        loop {
            self.checkpoint()?;
            self.resolve_justification(justification, consequent, conflict_level, &mut open)?;

            // The next pivot is the most recent marked trail literal.
            while !self.atom_db.mark[self.trail.assignments[index].atom() as usize] {
                debug_assert!(index > 0);
                index -= 1;
            }
            let pivot = self.trail.assignments[index];
            let atom = pivot.atom();
            debug_assert_eq!(self.atom_db.level_of(atom), Some(conflict_level));

            consequent = Some(pivot);
            justification = self.atom_db.justification_of(atom);
            index = index.saturating_sub(1);
            open -= 1;
            self.atom_db.mark[atom as usize] = false;

            if open == 0 {
                break;
            }
        }

        let Some(uip) = consequent else {
            return Err(err::AnalysisError::NoPivot.into());
        };
        self.lemma[0] = -uip;
        log::info!(target: targets::ANALYSIS, "Lemma of {} literals with UIP {uip}", self.lemma.len());

        self.learn_lemma_and_backjump()?;
        Ok(true)
    }

    /// Finalizes the lemma --- minimization, strengthening, heuristic upkeep --- then
    /// backjumps to its assertion level and stores it.
    pub(crate) fn learn_lemma_and_backjump(&mut self) -> Result<(), ErrorKind> {
        let mut backjump_level: LevelIndex = 0;

        if !self.lemma.is_empty() {
            if self.config.minimize_lemmas {
                self.minimize_lemma()?;
                self.reset_lemma_marks()?;
                if self.config.dyn_sub_res {
                    self.dyn_sub_res();
                }
            } else {
                self.reset_lemma_marks()?;
            }

            for index in 1..self.lemma.len() {
                let level = self
                    .atom_db
                    .level_of(self.lemma[index].atom())
                    .unwrap_or(0);
                backjump_level = std::cmp::max(backjump_level, level);
            }
        }

        let lemma = std::mem::take(&mut self.lemma);
        let glue = self.distinct_levels(&lemma);

        self.pop_reinit(self.trail.level() - backjump_level)?;

        if let Some(handle) = self.store_clause(lemma, true)? {
            if let Ok(clause) = self.clause_db.get_mut(handle) {
                clause.set_glue(glue);
            }
        }

        self.atom_db.decay_activity();
        self.update_phase_counters();
        Ok(())
    }

    /// Processes one antecedent: marks the atom, bumps the active heuristic, and either opens
    /// a mark at the conflict level or collects the literal into the lemma.
    fn process_antecedent(
        &mut self,
        antecedent: CLiteral,
        conflict_level: LevelIndex,
        open: &mut u32,
    ) {
        let atom = antecedent.atom();
        let level = self.atom_db.level_of(atom).unwrap_or(0);
        if !self.atom_db.mark[atom as usize] && level > 0 {
            self.atom_db.mark[atom as usize] = true;
            match self.config.branching {
                Branching::Vsids => self.atom_db.bump_activity(atom),
                Branching::Chb => {
                    self.atom_db.last_conflict[atom as usize] = self.counters.total_conflicts;
                }
                Branching::Lrb => self.atom_db.participated[atom as usize] += 1,
            }
            if level == conflict_level {
                *open += 1;
            } else {
                self.lemma.push(-antecedent);
            }
        }
    }

    /// Resolves the antecedents of `justification` into the analysis, skipping the consequent
    /// where the justification is a stored clause.
    fn resolve_justification(
        &mut self,
        justification: Justification,
        consequent: Option<CLiteral>,
        conflict_level: LevelIndex,
        open: &mut u32,
    ) -> Result<(), ErrorKind> {
        match justification {
            Justification::None => {}

            Justification::Binary(other) => {
                self.process_antecedent(-other, conflict_level, open);
            }

            Justification::Ternary(a, b) => {
                self.process_antecedent(-a, conflict_level, open);
                self.process_antecedent(-b, conflict_level, open);
            }

            Justification::Clause(handle) => {
                let literals: CClause = self.clause_db.get(handle)?.literals().to_vec();
                let mut start = 0;
                if let Some(consequent) = consequent {
                    if literals[0] == consequent {
                        start = 1;
                    } else {
                        debug_assert_eq!(literals[1], consequent);
                        self.process_antecedent(-literals[0], conflict_level, open);
                        start = 2;
                    }
                }
                for literal in &literals[start..] {
                    self.process_antecedent(-*literal, conflict_level, open);
                }
            }

            Justification::External(constraint) => {
                let Some(consequent) = consequent else {
                    return Err(err::AnalysisError::MissingConsequent.into());
                };
                self.fill_ext_antecedents(consequent, constraint);
                let antecedents = std::mem::take(&mut self.ext_antecedents);
                for literal in &antecedents {
                    self.process_antecedent(*literal, conflict_level, open);
                }
                self.ext_antecedents = antecedents;
            }
        }
        Ok(())
    }

    /// The level of a conflict: the maximal level among the falsified literal and the
    /// antecedents of the conflicting constraint.
    fn conflict_level(&mut self, conflict: Conflict) -> Result<LevelIndex, ErrorKind> {
        let mut level = 0;
        if let Some(falsified) = conflict.falsified {
            level = self.atom_db.level_of(falsified.atom()).unwrap_or(0);
        }
        match conflict.justification {
            Justification::None => {}
            Justification::Binary(other) => {
                level = std::cmp::max(level, self.atom_db.level_of(other.atom()).unwrap_or(0));
            }
            Justification::Ternary(a, b) => {
                level = std::cmp::max(level, self.atom_db.level_of(a.atom()).unwrap_or(0));
                level = std::cmp::max(level, self.atom_db.level_of(b.atom()).unwrap_or(0));
            }
            Justification::Clause(handle) => {
                let clause = self.clause_db.get(handle)?;
                for literal in clause.literals() {
                    level = std::cmp::max(
                        level,
                        self.atom_db.level_of(literal.atom()).unwrap_or(0),
                    );
                }
            }
            Justification::External(constraint) => {
                let Some(falsified) = conflict.falsified else {
                    return Err(err::AnalysisError::MissingConsequent.into());
                };
                self.fill_ext_antecedents(-falsified, constraint);
                let antecedents = std::mem::take(&mut self.ext_antecedents);
                for literal in &antecedents {
                    level = std::cmp::max(
                        level,
                        self.atom_db.level_of(literal.atom()).unwrap_or(0),
                    );
                }
                self.ext_antecedents = antecedents;
            }
        }
        Ok(level)
    }

    /// The trail index of the most recent literal at or below `level`.
    pub(crate) fn skip_above(&self, level: LevelIndex) -> usize {
        let mut index = self.trail.assignments.len();
        if index == 0 {
            return 0;
        }
        index -= 1;
        while index > 0
            && self
                .atom_db
                .level_of(self.trail.assignments[index].atom())
                .unwrap_or(0)
                > level
        {
            index -= 1;
        }
        index
    }

    /// Asks the extension for the antecedents of `consequent`, collecting them into the
    /// scratch buffer.
    pub(crate) fn fill_ext_antecedents(
        &mut self,
        consequent: CLiteral,
        constraint: crate::extension::ExtIndex,
    ) {
        self.ext_antecedents.clear();
        if let Some(mut extension) = self.extension.take() {
            extension.antecedents(consequent, constraint, &mut self.ext_antecedents);
            self.extension = Some(extension);
        }
    }

    /// Forgets the cached phase of every atom assigned at or above `level`.
    fn forget_phases_above(&mut self, level: LevelIndex) {
        let head = match level {
            0 => 0,
            _ => self.trail.scope(level).trail_length,
        };
        for index in head..self.trail.assignments.len() {
            let atom = self.trail.assignments[index].atom();
            self.atom_db.phase[atom as usize] = None;
        }
    }

    /// The count of distinct decision levels among `literals` --- the glue of a lemma.
    pub(crate) fn distinct_levels(&mut self, literals: &[CLiteral]) -> u32 {
        let top = self.trail.level() as usize;
        if self.diff_levels.len() <= top {
            self.diff_levels.resize(top + 1, false);
        }
        let mut count = 0;
        for literal in literals {
            let level = self.atom_db.level_of(literal.atom()).unwrap_or(0) as usize;
            if !self.diff_levels[level] {
                self.diff_levels[level] = true;
                count += 1;
            }
        }
        for literal in literals {
            let level = self.atom_db.level_of(literal.atom()).unwrap_or(0) as usize;
            self.diff_levels[level] = false;
        }
        count
    }

    /// Counts distinct levels among `literals`, stopping at `cap`.
    /// Returns the count only if it stayed below the cap.
    pub(crate) fn levels_below(&mut self, literals: &[CLiteral], cap: u32) -> Option<u32> {
        let top = self.trail.level() as usize;
        if self.diff_levels.len() <= top {
            self.diff_levels.resize(top + 1, false);
        }
        let mut count = 0;
        let mut scanned = 0;
        for literal in literals {
            if count >= cap {
                break;
            }
            scanned += 1;
            let level = self.atom_db.level_of(literal.atom()).unwrap_or(0) as usize;
            if !self.diff_levels[level] {
                self.diff_levels[level] = true;
                count += 1;
            }
        }
        for literal in &literals[..scanned] {
            let level = self.atom_db.level_of(literal.atom()).unwrap_or(0) as usize;
            self.diff_levels[level] = false;
        }
        match count < cap {
            true => Some(count),
            false => None,
        }
    }

    /// Conflicts toggle the phase cache window between its on and off spans.
    pub(crate) fn update_phase_counters(&mut self) {
        self.counters.phase_counter += 1;
        if self.counters.phase_cache_on {
            if self.counters.phase_counter >= self.config.phase_caching_on {
                self.counters.phase_counter = 0;
                self.counters.phase_cache_on = false;
            }
        } else {
            if self.counters.phase_counter >= self.config.phase_caching_off {
                self.counters.phase_counter = 0;
                self.counters.phase_cache_on = true;
            }
        }
    }
}
