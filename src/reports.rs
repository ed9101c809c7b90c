//! The result of a solve.

/// A report on the satisfiability of the formula in a solver.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Report {
    /// A satisfying valuation was found, and may be read from the model.
    Satisfiable,

    /// The formula is unsatisfiable, perhaps relative to assumptions, in which case a core may
    /// be read.
    Unsatisfiable,

    /// Satisfiability was not determined, for the reason given.
    Unknown(ReasonUnknown),
}

/// Why a solve returned without determining satisfiability.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReasonUnknown {
    /// The conflict cap was hit.
    MaxConflicts,

    /// The restart cap was hit.
    MaxRestarts,

    /// The simplification cap was hit.
    MaxInprocess,

    /// The resource or time limit fired at a checkpoint.
    Canceled,

    /// The extension's final check gave up.
    GiveUp,
}

impl std::fmt::Display for Report {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Satisfiable => write!(f, "satisfiable"),
            Self::Unsatisfiable => write!(f, "unsatisfiable"),
            Self::Unknown(reason) => write!(f, "unknown ({reason})"),
        }
    }
}

impl std::fmt::Display for ReasonUnknown {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MaxConflicts => write!(f, "max-conflicts"),
            Self::MaxRestarts => write!(f, "max-restarts"),
            Self::MaxInprocess => write!(f, "max-inprocess"),
            Self::Canceled => write!(f, "canceled"),
            Self::GiveUp => write!(f, "giveup"),
        }
    }
}
