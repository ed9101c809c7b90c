//! Justifications --- why an atom has the value it does.
//!
//! Every assigned atom carries a justification naming exactly its antecedents: the literals
//! whose falsity forced the assignment.
//!
//! The binary and ternary cases are fast paths which carry the antecedent literals inline, so
//! conflict analysis need not fetch the clause from the database.
//! An external justification is opaque to the core, and is resolved by asking the
//! [extension](crate::extension) for antecedents on demand.
//!
//! At decision level zero the justification of an assignment is erased to [None](Justification::None):
//! the assignment is permanent, and nothing is gained by remembering why.

use crate::{
    db::clause_db::ClauseHandle,
    extension::ExtIndex,
    structures::literal::CLiteral,
};

/// The justification of an assignment.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Justification {
    /// A decision, an assumption, or a permanent (level zero) assignment.
    None,

    /// Propagation of a binary clause, carrying the *other* literal of the clause.
    Binary(CLiteral),

    /// Propagation of a ternary clause, carrying the two companion literals.
    Ternary(CLiteral, CLiteral),

    /// Propagation of a stored clause, with the asserted literal at position zero.
    Clause(ClauseHandle),

    /// Propagation by an external constraint, resolved through the extension.
    External(ExtIndex),
}

impl std::fmt::Display for Justification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::None => write!(f, "none"),
            Self::Binary(literal) => write!(f, "binary({literal})"),
            Self::Ternary(a, b) => write!(f, "ternary({a}, {b})"),
            Self::Clause(handle) => write!(f, "clause({handle})"),
            Self::External(index) => write!(f, "external({index})"),
        }
    }
}
