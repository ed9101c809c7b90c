//! Atoms.
//!
//! An atom is a propositional variable, identified by a dense non-negative integer.
//!
//! Atoms are created monotonically --- the next fresh atom is always the count of atoms created
//! so far --- and destroyed only when a user scope which created them is popped.

/// An atom.
pub type Atom = u32;
