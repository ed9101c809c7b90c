//! A database of stored clauses.
//!
//! # Storage
//!
//! Clauses of three or more literals are stored in a slot arena and identified by a
//! [ClauseHandle] --- a 32-bit index which remains stable for the life of the clause.
//! Handles are what watchers and justifications carry, so they stay compact, and as slots are
//! reused but never moved a handle read from either is either current or detectably dead.
//!
//! Deleting a clause frees its slot without compaction; the slot joins a free list and will be
//! handed to some later clause.
//! Watchers which still name a freed slot are filtered lazily by propagation.
//!
//! Unit clauses are never stored --- they become trail entries at the base level --- and binary
//! clauses live entirely as pairs of watchers in the [watch database](crate::db::watch_db).
//!
//! # Metadata
//!
//! Alongside its literals a stored clause records the flags and measures consulted by the
//! [reduction](crate::procedures::reduction) of the learned clause database:
//! glue (the number of distinct decision levels among its literals when learned), psm (the
//! count of literals agreeing with the cached phase of their atom), use since the last
//! reduction, rounds of inactivity, whether the clause is frozen (detached but retained), and
//! whether it sits on the reinitialisation stack.

use crate::{
    misc::log::targets,
    structures::{clause::CClause, literal::CLiteral},
    types::err,
};

/// A handle to a clause stored in the arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ClauseHandle(u32);

impl std::fmt::Display for ClauseHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A clause in the arena, together with its metadata.
pub struct StoredClause {
    literals: CClause,
    learned: bool,
    used: bool,
    frozen: bool,
    on_reinit_stack: bool,
    glue: u32,
    psm: u32,
    inactive_rounds: u32,
}

impl StoredClause {
    fn new(literals: CClause, learned: bool) -> Self {
        StoredClause {
            literals,
            learned,
            used: false,
            frozen: false,
            on_reinit_stack: false,
            glue: 0,
            psm: 0,
            inactive_rounds: 0,
        }
    }

    pub fn size(&self) -> usize {
        self.literals.len()
    }

    pub fn literals(&self) -> &[CLiteral] {
        &self.literals
    }

    pub fn contains(&self, literal: CLiteral) -> bool {
        self.literals.contains(&literal)
    }

    /// Swaps the literals at `a` and `b`, preserving watch positions is the caller's concern.
    pub fn swap(&mut self, a: usize, b: usize) {
        self.literals.swap(a, b);
    }

    pub fn set_literal(&mut self, index: usize, literal: CLiteral) {
        self.literals[index] = literal;
    }

    /// Truncates the clause to `size` literals.
    pub fn shrink(&mut self, size: usize) {
        self.literals.truncate(size);
    }

    pub fn is_learned(&self) -> bool {
        self.learned
    }

    pub fn was_used(&self) -> bool {
        self.used
    }

    pub fn mark_used(&mut self) {
        self.used = true;
    }

    pub fn unmark_used(&mut self) {
        self.used = false;
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    pub fn freeze(&mut self) {
        self.frozen = true;
    }

    pub fn unfreeze(&mut self) {
        self.frozen = false;
    }

    pub fn on_reinit_stack(&self) -> bool {
        self.on_reinit_stack
    }

    pub fn set_reinit_stack(&mut self, on: bool) {
        self.on_reinit_stack = on;
    }

    pub fn glue(&self) -> u32 {
        self.glue
    }

    pub fn set_glue(&mut self, glue: u32) {
        self.glue = glue;
    }

    pub fn psm(&self) -> u32 {
        self.psm
    }

    pub fn set_psm(&mut self, psm: u32) {
        self.psm = psm;
    }

    pub fn inactive_rounds(&self) -> u32 {
        self.inactive_rounds
    }

    pub fn increment_inactive_rounds(&mut self) {
        self.inactive_rounds += 1;
    }

    pub fn reset_inactive_rounds(&mut self) {
        self.inactive_rounds = 0;
    }
}

impl std::ops::Index<usize> for StoredClause {
    type Output = CLiteral;

    fn index(&self, index: usize) -> &Self::Output {
        &self.literals[index]
    }
}

/// The database of stored clauses.
///
/// Fields are private to ensure handles are only created by insertion.
pub struct ClauseDB {
    /// The arena; a freed slot holds `None` until reused.
    slots: Vec<Option<StoredClause>>,

    /// Freed slots, reused before the arena grows.
    free: Vec<u32>,

    /// Handles of stored original clauses, in insertion order.
    originals: Vec<ClauseHandle>,

    /// Handles of stored learned clauses, in insertion order.
    learned: Vec<ClauseHandle>,
}

impl Default for ClauseDB {
    fn default() -> Self {
        ClauseDB {
            slots: Vec::default(),
            free: Vec::default(),
            originals: Vec::default(),
            learned: Vec::default(),
        }
    }
}

impl ClauseDB {
    /// Stores a clause, returning its handle.
    pub fn insert(&mut self, literals: CClause, learned: bool) -> ClauseHandle {
        let clause = StoredClause::new(literals, learned);
        let handle = match self.free.pop() {
            Some(index) => {
                self.slots[index as usize] = Some(clause);
                ClauseHandle(index)
            }
            None => {
                self.slots.push(Some(clause));
                ClauseHandle((self.slots.len() - 1) as u32)
            }
        };
        match learned {
            true => self.learned.push(handle),
            false => self.originals.push(handle),
        }
        handle
    }

    /// The clause at `handle`, or [Missing](err::ClauseDBError::Missing) if its slot has been
    /// freed.
    pub fn get(&self, handle: ClauseHandle) -> Result<&StoredClause, err::ClauseDBError> {
        match self.slots.get(handle.0 as usize) {
            Some(Some(clause)) => Ok(clause),
            _ => Err(err::ClauseDBError::Missing),
        }
    }

    /// The clause at `handle`, mutably, or [Missing](err::ClauseDBError::Missing) if its slot
    /// has been freed.
    pub fn get_mut(
        &mut self,
        handle: ClauseHandle,
    ) -> Result<&mut StoredClause, err::ClauseDBError> {
        match self.slots.get_mut(handle.0 as usize) {
            Some(Some(clause)) => Ok(clause),
            _ => Err(err::ClauseDBError::Missing),
        }
    }

    /// Frees the slot of `handle` without compaction, returning the clause.
    ///
    /// The handle lists are left untouched: a deleting sweep rebuilds the relevant list.
    pub fn remove(&mut self, handle: ClauseHandle) -> Option<StoredClause> {
        let clause = self.slots.get_mut(handle.0 as usize)?.take();
        if clause.is_some() {
            self.free.push(handle.0);
        } else {
            log::warn!(target: targets::CLAUSE_DB, "Remove called on freed slot {handle}");
        }
        clause
    }

    /// Handles of stored original clauses, in insertion order.
    pub fn originals(&self) -> &[ClauseHandle] {
        &self.originals
    }

    /// Handles of stored learned clauses, in insertion order.
    pub fn learned(&self) -> &[ClauseHandle] {
        &self.learned
    }

    /// Replaces the original handle list after a deleting sweep.
    pub fn set_originals(&mut self, handles: Vec<ClauseHandle>) {
        self.originals = handles;
    }

    /// Replaces the learned handle list after a deleting sweep.
    pub fn set_learned(&mut self, handles: Vec<ClauseHandle>) {
        self.learned = handles;
    }

    /// The count of stored original clauses.
    pub fn original_count(&self) -> usize {
        self.originals.len()
    }

    /// The count of stored learned clauses.
    pub fn learned_count(&self) -> usize {
        self.learned.len()
    }
}
