//! The trail --- the ordered history of assignments --- and its stack of scopes.
//!
//! Each assignment appends a literal to the trail.
//! A *scope* is opened for every decision (and for the level holding assumptions), and records
//! enough of the solver's state to unwind the level: the length of the trail when the level
//! began, the length of the clause reinitialisation stack, and whether the solver was already
//! inconsistent.
//!
//! The propagation head `q_head` partitions the trail: everything before it has been
//! propagated.
//! Unwinding a level truncates the trail and resets `q_head` to the new length.
//!
//! The *search level* is the level holding assumptions (and the negated user scope literals),
//! zero when there are none.
//! Restarts unwind to the search level rather than the base, so assumptions survive a restart.

use crate::{db::LevelIndex, structures::literal::CLiteral};

/// The snapshot taken when a level is opened.
#[derive(Clone, Copy)]
pub struct Scope {
    /// The length of the trail when the level began.
    pub trail_length: usize,

    /// The length of the clauses-to-reinitialise stack when the level began.
    pub reinit_length: usize,

    /// Whether the solver was inconsistent when the level began.
    pub inconsistent: bool,
}

/// The trail and scope stack.
#[derive(Default)]
pub struct Trail {
    /// Assigned literals, in assignment order.
    pub assignments: Vec<CLiteral>,

    /// Everything before `q_head` has been propagated.
    pub q_head: usize,

    /// One scope per decision level, the scope of level `d` at `scopes[d - 1]`.
    pub scopes: Vec<Scope>,

    /// The level holding assumptions, zero when there are none.
    pub search_level: LevelIndex,
}

impl Trail {
    /// The current decision level.
    pub fn level(&self) -> LevelIndex {
        self.scopes.len() as LevelIndex
    }

    /// True when no decision or assumption is active.
    pub fn at_base_level(&self) -> bool {
        self.scopes.is_empty()
    }

    /// True when at the level holding assumptions.
    pub fn at_search_level(&self) -> bool {
        self.level() == self.search_level
    }

    /// Opens a fresh scope.
    ///
    /// Queued but unpropagated assignments may remain from clause reinitialisation; they are
    /// propagated within the fresh scope.
    pub fn push_scope(&mut self, reinit_length: usize, inconsistent: bool) {
        self.scopes.push(Scope {
            trail_length: self.assignments.len(),
            reinit_length,
            inconsistent,
        });
    }

    /// The scope of `level`.
    ///
    /// # Panics
    /// If no scope is open at `level`.
    pub fn scope(&self, level: LevelIndex) -> Scope {
        self.scopes[level as usize - 1]
    }
}
