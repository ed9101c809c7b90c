//! Error types used in the library.
//!
//! - Most of these are very unlikely to occur during use: they witness a broken invariant
//!   (a freed clause handle still referenced, resolution losing its pivot) rather than a
//!   property of the formula.
//! - Conflicts found during propagation are *data* --- they drive clause learning, and are
//!   passed around as status values, never as errors.
//! - [Interrupt] is internally expected: it unwinds a solve from a cooperative checkpoint, and
//!   [check](crate::solver::GenericSolver::check) turns it into an `unknown` report rather than
//!   surfacing it.
//!
//! Each subsystem has its own enum, collected into the [ErrorKind] union; `From` impls lift
//! the specific kinds so `?` composes across subsystem boundaries.

/// A union of varied error kinds.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorKind {
    /// An error during conflict analysis.
    Analysis(AnalysisError),

    /// An error in the clause database.
    ClauseDB(ClauseDBError),

    /// An interruption of a solve.
    Interrupt(Interrupt),
}

/// An error during conflict analysis.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum AnalysisError {
    /// Resolution was requested without a recorded conflict.
    NoConflict,

    /// The trail was exhausted without finding a unique implication point.
    NoPivot,

    /// An external justification was met without a consequent to resolve it against.
    MissingConsequent,
}

impl From<AnalysisError> for ErrorKind {
    fn from(e: AnalysisError) -> Self {
        ErrorKind::Analysis(e)
    }
}

/// Errors in the clause database.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ClauseDBError {
    /// A clause was requested through a handle whose slot has been freed.
    ///
    /// Watchers meet freed handles in the ordinary course of lazy filtering; anything else
    /// holding one is an invariant failure.
    Missing,

    /// No candidate literal was found when selecting a watch for a clause.
    MissingWatch,
}

impl From<ClauseDBError> for ErrorKind {
    fn from(e: ClauseDBError) -> Self {
        ErrorKind::ClauseDB(e)
    }
}

/// An interruption of a solve.
///
/// Interrupts are idempotent: once raised, a solve unwinds to `check` and no further work is
/// attempted until the next call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Interrupt {
    /// The resource limit fired, or the time limit was exceeded.
    Canceled,

    /// The extension's final check gave up.
    GiveUp,
}

impl From<Interrupt> for ErrorKind {
    fn from(e: Interrupt) -> Self {
        ErrorKind::Interrupt(e)
    }
}

impl std::fmt::Display for Interrupt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Canceled => write!(f, "canceled"),
            Self::GiveUp => write!(f, "giveup"),
        }
    }
}
