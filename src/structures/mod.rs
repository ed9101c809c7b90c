//! The abstract elements of a solve, and their representations.

pub mod atom;
pub mod clause;
pub mod justification;
pub mod literal;
