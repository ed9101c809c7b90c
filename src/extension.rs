//! The bridge to external constraint plugins.
//!
//! An extension contributes constraints the clause database cannot express.
//! It takes part in a solve at four points:
//!
//! - **Propagation.** The extension registers [external watchers](crate::db::watch_db::Watcher::External)
//!   against literals; when a watched literal becomes true the solver calls
//!   [propagate](Extension::propagate).
//!   The returned [ExtPropagation] says whether to keep the watcher, which literals the
//!   constraint now implies (assigned with an external justification), and whether the
//!   constraint conflicts with the valuation.
//! - **Analysis.** When conflict analysis meets an externally justified literal it calls
//!   [antecedents](Extension::antecedents) to learn which (false) literals forced it.
//!   When a conflict is raised at a level the analyzer handles, the extension is first offered
//!   the conflict through [resolve_conflict](Extension::resolve_conflict).
//! - **Final check.** When no decision remains the solver calls
//!   [final_check](Extension::final_check) before declaring satisfiability.
//!   The extension may accept, supply further clauses to continue with, or give up --- in which
//!   case the solve reports unknown.
//! - **Lifecycle.** [push_scope](Extension::push_scope) and [pop_scopes](Extension::pop_scopes)
//!   mirror the solver's decision levels, [gc](Extension::gc) fires with clause database
//!   reduction, and [asserted](Extension::asserted) notifies the assignment of external atoms,
//!   in trail order.
//!
//! Callbacks communicate through return values rather than by mutating the solver.

use crate::structures::{clause::CClause, literal::CLiteral};

/// An index identifying a constraint of the extension; opaque to the solver.
pub type ExtIndex = u32;

/// The outcome of asking the extension to propagate a watched literal.
pub struct ExtPropagation {
    /// Whether to keep the watcher in place.
    pub keep: bool,

    /// Literals now implied by the constraint, to be assigned with an external justification.
    pub implied: Vec<CLiteral>,

    /// A literal of the constraint falsified by the valuation, if the constraint conflicts.
    pub conflict: Option<CLiteral>,
}

impl ExtPropagation {
    /// Keep the watcher, with nothing implied.
    pub fn keep() -> Self {
        ExtPropagation {
            keep: true,
            implied: Vec::default(),
            conflict: None,
        }
    }
}

/// The outcome of offering a conflict to the extension.
pub enum ExtResolution {
    /// Learn the given asserting clause in place of first-UIP analysis.
    Lemma(CClause),

    /// The extension declines; standard analysis follows.
    Default,

    /// The extension absorbed the conflict; no lemma is learned for it.
    Handled,
}

/// The outcome of the extension's final check.
pub enum ExtFinalCheck {
    /// The valuation satisfies the external constraints.
    Done,

    /// Further clauses to add before continuing the search.
    Continue(Vec<CClause>),

    /// The extension cannot decide; the solve reports unknown.
    GiveUp,
}

/// An external constraint plugin.
pub trait Extension {
    /// A literal watched by constraint `index` has become true.
    fn propagate(&mut self, literal: CLiteral, index: ExtIndex) -> ExtPropagation;

    /// Collect into `out` the (false) literals which forced `literal` under constraint `index`.
    fn antecedents(&mut self, literal: CLiteral, index: ExtIndex, out: &mut Vec<CLiteral>);

    /// Offered a conflict before standard analysis.
    fn resolve_conflict(&mut self) -> ExtResolution {
        ExtResolution::Default
    }

    /// Called when no decision remains, before satisfiability is declared.
    fn final_check(&mut self) -> ExtFinalCheck {
        ExtFinalCheck::Done
    }

    /// A decision level was opened.
    fn push_scope(&mut self) {}

    /// `count` decision levels were unwound.
    fn pop_scopes(&mut self, _count: u32) {}

    /// The learned clause database was reduced.
    fn gc(&mut self) {}

    /// An external atom was assigned; notifications arrive in trail order.
    fn asserted(&mut self, _literal: CLiteral) {}
}
