//! A database recording which clauses are watching which literals.
//!
//! # Theory
//!
//! Boolean constraint propagation rests on the observation that a clause forces its sole
//! unvalued literal to be true as soon as every other literal conflicts with the valuation.
//! To notice this without scanning clauses, two literals of each clause are *watched*: only
//! when a watched literal becomes false can the clause assert or conflict, so only then need
//! the clause be examined.
//!
//! # Implementation
//!
//! For each literal ℓ there is a list of [Watcher]s: entries to examine when ℓ becomes true
//! (equivalently, when ¬ℓ --- the literal actually under watch --- becomes false).
//! Watchers are a tagged union, distinguished by the length of the watching clause:
//!
//! - A binary watcher carries the *other* literal of the clause inline.
//!   Binary watchers are never updated; propagation reads the companion directly and the trip
//!   to the clause database is avoided entirely (indeed, binary clauses are not stored at all).
//! - A ternary watcher carries *both* companion literals inline, again avoiding the clause.
//!   Ternary watchers are likewise never updated.
//! - A clause watcher carries the handle of the stored clause together with a *blocked*
//!   literal: some literal of the clause whose truth witnesses the clause satisfied.
//!   Propagation checks the blocked literal first and skips the clause fetch when it holds.
//! - An external watcher names a constraint of the [extension](crate::extension), which is
//!   asked what to do.
//!
//! Lists are mutated in place during propagation and tolerate entries whose clause has been
//! deleted: such entries are dropped when encountered.
//!
//! [sort_watches](WatchDB::sort_watches) stably reorders every list so binary and ternary
//! entries precede longer ones.
//! Dynamic subsumption in the [analyzer](crate::procedures::minimize) scans list prefixes for
//! short clauses, and the ordering lets it bail out at the first long entry --- an efficiency,
//! never a correctness requirement.

use crate::{
    db::clause_db::ClauseHandle,
    extension::ExtIndex,
    structures::literal::CLiteral,
};

/// An entry in a watch list.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Watcher {
    /// A binary clause, carrying the other literal.
    Binary { other: CLiteral, learned: bool },

    /// A ternary clause, carrying both companion literals.
    Ternary { a: CLiteral, b: CLiteral },

    /// A stored clause, carrying a satisfaction hint.
    Clause {
        blocked: CLiteral,
        handle: ClauseHandle,
    },

    /// An external constraint.
    External { index: ExtIndex },
}

impl Watcher {
    /// Rank for [sort_watches](WatchDB::sort_watches): binary, then ternary, then the rest.
    fn rank(&self) -> u8 {
        match self {
            Self::Binary { .. } => 0,
            Self::Ternary { .. } => 1,
            Self::Clause { .. } => 2,
            Self::External { .. } => 3,
        }
    }
}

/// Watch lists, indexed by literal.
#[derive(Default)]
pub struct WatchDB {
    /// `lists[ℓ.index()]` holds the watchers to examine when ℓ becomes true.
    pub(crate) lists: Vec<Vec<Watcher>>,
}

impl WatchDB {
    /// Extends the lists to cover a fresh atom.
    pub fn fresh_atom(&mut self) {
        self.lists.push(Vec::default());
        self.lists.push(Vec::default());
    }

    /// The count of atoms covered.
    pub fn atom_count(&self) -> usize {
        self.lists.len() / 2
    }

    /// Drops the lists of all atoms at or above `count`.
    pub fn shrink_to_atoms(&mut self, count: usize) {
        self.lists.truncate(2 * count);
    }

    /// The watchers examined when `literal` becomes true.
    pub fn list(&self, literal: CLiteral) -> &[Watcher] {
        &self.lists[literal.index()]
    }

    /// Registers `watcher` against the falsification of `watched`.
    pub fn watch(&mut self, watched: CLiteral, watcher: Watcher) {
        self.lists[watched.negate().index()].push(watcher);
    }

    /// Removes the binary watcher pairing `watched` with `other`, by value.
    pub fn unwatch_binary(&mut self, watched: CLiteral, other: CLiteral, learned: bool) {
        let list = &mut self.lists[watched.negate().index()];
        if let Some(position) = list
            .iter()
            .position(|w| *w == Watcher::Binary { other, learned })
        {
            list.swap_remove(position);
        }
    }

    /// Removes the ternary watcher pairing `watched` with `a` and `b`, by value.
    pub fn unwatch_ternary(&mut self, watched: CLiteral, a: CLiteral, b: CLiteral) {
        let list = &mut self.lists[watched.negate().index()];
        if let Some(position) = list.iter().position(|w| *w == Watcher::Ternary { a, b }) {
            list.swap_remove(position);
        }
    }

    /// Removes the clause watcher for `handle` from the list of `watched`, scanning for the
    /// matching handle.
    pub fn unwatch_clause(&mut self, watched: CLiteral, handle: ClauseHandle) {
        let list = &mut self.lists[watched.negate().index()];
        if let Some(position) = list.iter().position(|w| match w {
            Watcher::Clause { handle: h, .. } => *h == handle,
            _ => false,
        }) {
            list.swap_remove(position);
        }
    }

    /// Clears the lists of both polarities of the atom of `literal`.
    pub fn clear_atom_lists(&mut self, literal: CLiteral) {
        self.lists[literal.index()].clear();
        self.lists[literal.negate().index()].clear();
    }

    /// Stably reorders every list so binary and ternary watchers precede longer ones.
    pub fn sort_watches(&mut self) {
        for list in self.lists.iter_mut() {
            list.sort_by_key(Watcher::rank);
        }
    }
}
