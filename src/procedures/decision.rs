//! Choosing the next atom and value when propagation is exhausted.
//!
//! # The atom
//!
//! With probability [random_freq](crate::config::Config::random_freq) a uniformly random atom
//! is tried; otherwise atoms are popped from the activity heap until an unvalued,
//! non-eliminated decision candidate surfaces --- entries staled by assignment are discarded
//! lazily.
//!
//! With anti-exploration enabled, an atom reaching the top of the heap after a long absence
//! first pays for the conflicts it sat out: its activity is decayed by 0.95 per conflict since
//! it was last unassigned, and the heap repaired, until the top of the heap is current.
//!
//! # The value
//!
//! Decided by the [phase policy](crate::config::PhasePolicy).
//! Phase caching reuses the cached phase while the cache window is on --- the window toggles
//! on a conflict-count schedule --- and otherwise decides false.

use rand::Rng;

use crate::{
    config::PhasePolicy,
    misc::log::targets,
    solver::GenericSolver,
    structures::{atom::Atom, justification::Justification, literal::CLiteral},
};

impl<R: rand::Rng + rand::SeedableRng> GenericSolver<R> {
    /// Opens a level and decides a value for some unvalued atom.
    /// Returns false if no decision candidate remains unvalued.
    pub(crate) fn decide(&mut self) -> bool {
        let Some(atom) = self.next_var() else {
            return false;
        };
        self.push_scope();
        self.counters.decisions += 1;

        let polarity = match self.config.phase {
            PhasePolicy::AlwaysTrue => true,
            PhasePolicy::AlwaysFalse => false,
            PhasePolicy::Caching => match self.counters.phase_cache_on {
                true => self.atom_db.phase[atom as usize].unwrap_or(false),
                false => false,
            },
            PhasePolicy::Random => self.rng.random_bool(0.5),
        };

        let decision = CLiteral::new(atom, polarity);
        log::trace!(target: targets::DECISION, "Decision {decision} at level {}", self.trail.level());
        self.assign_core(decision, Justification::None);
        true
    }

    /// The next decision atom, if any.
    fn next_var(&mut self) -> Option<Atom> {
        if self.rng.random_bool(self.config.random_freq) {
            let count = self.atom_db.atom_count();
            if count == 0 {
                return None;
            }
            let candidate = self.rng.random_range(0..count) as Atom;
            if self.atom_db.value_of(candidate).is_none()
                && !self.atom_db.is_eliminated(candidate)
                && self.atom_db.decision[candidate as usize]
            {
                log::trace!(target: targets::DECISION, "Random decision atom {candidate}");
                return Some(candidate);
            }
        }

        loop {
            if self.config.anti_exploration {
                // Atoms surfacing after an absence pay for the conflicts they sat out.
                while let Some(top) = self.atom_db.activity_heap.peek_max() {
                    let age = self
                        .counters
                        .total_conflicts
                        .saturating_sub(self.atom_db.canceled[top]);
                    if age == 0 {
                        break;
                    }
                    let decay = 0.95_f64.powi(age as i32);
                    self.atom_db.scale_activity(top as Atom, decay);
                    self.atom_db.canceled[top] = self.counters.total_conflicts;
                }
            }

            let atom = self.atom_db.activity_heap.pop_max()? as Atom;
            if self.atom_db.value_of(atom).is_none()
                && !self.atom_db.is_eliminated(atom)
                && self.atom_db.decision[atom as usize]
            {
                return Some(atom);
            }
            // Otherwise the entry was stale; discard and continue.
        }
    }
}
