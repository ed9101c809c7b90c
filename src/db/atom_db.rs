//! A database of everything known about atoms.
//!
//! For each atom the database records:
//!
//! - The current value, if any, with the decision level and [justification](crate::structures::justification)
//!   of the assignment.
//! - The cached phase (the value last assigned) and the phase before that, consulted by phase
//!   saving and by the dyn-psm reduction scheme.
//!   A phase of `None` is *not available* --- either never assigned, or deliberately forgotten
//!   after a backjump.
//! - An activity, kept as an unsigned fixed-point score on a max [IndexHeap] so a decision can
//!   take the most active unvalued atom.
//!   When any activity exceeds a bound, all are rescaled by right-shift.
//! - Flags: whether the atom is a decision candidate, eliminated, or visible to the extension,
//!   together with the transient marks used by conflict analysis.
//! - The per-atom companions of the branching heuristics: conflict stamps for CHB,
//!   participation and reason counts for LRB, and cancellation stamps for anti-exploration.
//!
//! Atom state is dense: every vector is indexed by atom, and the literal marks by literal.

use crate::{
    config::defaults,
    db::LevelIndex,
    generic::index_heap::IndexHeap,
    structures::{atom::Atom, justification::Justification, literal::CLiteral},
};

/// The database of atom state.
pub struct AtomDB {
    /// The value of each atom, if any.
    pub(crate) values: Vec<Option<bool>>,

    /// The decision level at which each atom was assigned.
    pub(crate) levels: Vec<Option<LevelIndex>>,

    /// The justification of each assignment.
    pub(crate) justifications: Vec<Justification>,

    /// The cached phase of each atom.
    pub(crate) phase: Vec<Option<bool>>,

    /// The phase each atom held before its cached phase.
    pub(crate) prev_phase: Vec<Option<bool>>,

    /// Whether each atom is a decision candidate.
    pub(crate) decision: Vec<bool>,

    /// Whether each atom has been eliminated.
    pub(crate) eliminated: Vec<bool>,

    /// Whether each atom is visible to the extension.
    pub(crate) external: Vec<bool>,

    /// Transient per-atom marks, reset between conflict analyses.
    pub(crate) mark: Vec<bool>,

    /// Transient per-literal marks, used by dynamic subsumption.
    pub(crate) lit_mark: Vec<bool>,

    /// Whether each atom has been assigned since the last reduction, for dyn-psm.
    pub(crate) assigned_since_gc: Vec<bool>,

    /// CHB: the conflict count when each atom last appeared in analysis.
    pub(crate) last_conflict: Vec<u64>,

    /// CHB: the conflict count when each atom was last assigned.
    pub(crate) last_propagation: Vec<u64>,

    /// LRB: conflicts each atom participated in over its current assignment.
    pub(crate) participated: Vec<u64>,

    /// LRB: conflicts each atom supplied a reason for over its current assignment.
    pub(crate) reasoned: Vec<u64>,

    /// Anti-exploration: the conflict count when each atom was last unassigned.
    pub(crate) canceled: Vec<u64>,

    /// Activities, with unvalued atoms active on the heap.
    pub(crate) activity_heap: IndexHeap<u32>,

    /// The VSIDS increment, grown after each conflict.
    pub(crate) activity_increment: u32,
}

impl Default for AtomDB {
    fn default() -> Self {
        AtomDB {
            values: Vec::default(),
            levels: Vec::default(),
            justifications: Vec::default(),
            phase: Vec::default(),
            prev_phase: Vec::default(),
            decision: Vec::default(),
            eliminated: Vec::default(),
            external: Vec::default(),
            mark: Vec::default(),
            lit_mark: Vec::default(),
            assigned_since_gc: Vec::default(),
            last_conflict: Vec::default(),
            last_propagation: Vec::default(),
            participated: Vec::default(),
            reasoned: Vec::default(),
            canceled: Vec::default(),
            activity_heap: IndexHeap::default(),
            activity_increment: defaults::ACTIVITY_INCREMENT,
        }
    }
}

impl AtomDB {
    /// The count of atoms in the database.
    pub fn atom_count(&self) -> usize {
        self.values.len()
    }

    /// Creates a fresh atom with the given flags, returning it.
    pub fn fresh_atom(&mut self, external: bool, decision: bool) -> Atom {
        let atom = self.values.len() as Atom;
        self.values.push(None);
        self.levels.push(None);
        self.justifications.push(Justification::None);
        self.phase.push(None);
        self.prev_phase.push(None);
        self.decision.push(decision);
        self.eliminated.push(false);
        self.external.push(external);
        self.mark.push(false);
        self.lit_mark.push(false);
        self.lit_mark.push(false);
        self.assigned_since_gc.push(false);
        self.last_conflict.push(0);
        self.last_propagation.push(0);
        self.participated.push(0);
        self.reasoned.push(0);
        self.canceled.push(0);
        self.activity_heap.expand_to(atom as usize + 1);
        if decision {
            self.activity_heap.activate(atom as usize);
        }
        atom
    }

    /// Shrinks every per-atom structure to `count` atoms.
    pub fn shrink_to(&mut self, count: usize) {
        self.values.truncate(count);
        self.levels.truncate(count);
        self.justifications.truncate(count);
        self.phase.truncate(count);
        self.prev_phase.truncate(count);
        self.decision.truncate(count);
        self.eliminated.truncate(count);
        self.external.truncate(count);
        self.mark.truncate(count);
        self.lit_mark.truncate(2 * count);
        self.assigned_since_gc.truncate(count);
        self.last_conflict.truncate(count);
        self.last_propagation.truncate(count);
        self.participated.truncate(count);
        self.reasoned.truncate(count);
        self.canceled.truncate(count);
        self.activity_heap.shrink_to(count);
    }

    /// The value of `atom`, if any.
    pub fn value_of(&self, atom: Atom) -> Option<bool> {
        self.values[atom as usize]
    }

    /// The value of `literal`, if its atom has one: true when polarity and value agree.
    pub fn value_of_literal(&self, literal: CLiteral) -> Option<bool> {
        self.values[literal.atom() as usize].map(|value| value == literal.polarity())
    }

    /// The decision level of `atom`, if assigned.
    pub fn level_of(&self, atom: Atom) -> Option<LevelIndex> {
        self.levels[atom as usize]
    }

    /// The justification of the assignment of `atom`.
    pub fn justification_of(&self, atom: Atom) -> Justification {
        self.justifications[atom as usize]
    }

    /// Whether `atom` has been eliminated.
    pub fn is_eliminated(&self, atom: Atom) -> bool {
        self.eliminated[atom as usize]
    }

    /// Bumps the activity of `atom` by the current increment, rescaling all activities if the
    /// bound is hit.
    pub fn bump_activity(&mut self, atom: Atom) {
        let bumped = self
            .activity_heap
            .value_at(atom as usize)
            .saturating_add(self.activity_increment);
        self.activity_heap.revalue(atom as usize, bumped);
        self.activity_heap.heapify_if_active(atom as usize);
        if bumped > defaults::ACTIVITY_BOUND {
            self.rescale_activity();
        }
    }

    /// Grows the activity increment; the relative decay of existing activities.
    pub fn decay_activity(&mut self) {
        self.activity_increment = self
            .activity_increment
            .saturating_mul(11)
            .saturating_div(10);
    }

    /// Rescales every activity, and the increment, by right-shift.
    fn rescale_activity(&mut self) {
        self.activity_heap
            .apply_to_all(|activity| activity >> defaults::ACTIVITY_SHIFT);
        self.activity_increment = std::cmp::max(1, self.activity_increment >> defaults::ACTIVITY_SHIFT);
    }

    /// Multiplies the activity of `atom` by `factor`, repairing the heap.
    pub fn scale_activity(&mut self, atom: Atom, factor: f64) {
        let scaled = (*self.activity_heap.value_at(atom as usize) as f64 * factor) as u32;
        self.activity_heap.revalue(atom as usize, scaled);
        self.activity_heap.heapify_if_active(atom as usize);
    }

    /// Sets the activity of `atom`, repairing the heap.
    pub fn set_activity(&mut self, atom: Atom, activity: u32) {
        self.activity_heap.revalue(atom as usize, activity);
        self.activity_heap.heapify_if_active(atom as usize);
    }

    /// The activity of `atom`.
    pub fn activity_of(&self, atom: Atom) -> u32 {
        *self.activity_heap.value_at(atom as usize)
    }
}
