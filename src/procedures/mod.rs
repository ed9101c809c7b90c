//! The procedures of a solve, as methods on a [solver](crate::solver::GenericSolver).
//!
//! Roughly in the order they matter to a solve:
//!
//! - [add_clause](crate::solver::GenericSolver::add_clause) normalizes and stores clauses,
//!   dispatching on size (`add_clause` module).
//! - [bcp] drives boolean constraint propagation over the watch lists.
//! - [analysis] turns a conflict into a learned clause by first-UIP resolution, with
//!   [minimize] shrinking the clause before it is stored.
//! - [decision] picks the next atom and value when propagation is exhausted.
//! - [backjump] unwinds decision levels and replays the clause reinitialisation stack.
//! - [restart_gc](crate::procedures::solve) schedules restarts, and [reduction] reduces the
//!   learned clause database.
//! - [assumptions] installs assumptions and extracts unsatisfiable cores.
//! - [user_scopes] implements the incremental push/pop discipline over scope literals.
//! - [solve] ties everything together as the search driver.
//! - [copy] snapshots a solver.

pub mod add_clause;
pub mod analysis;
pub mod assumptions;
pub mod backjump;
pub mod bcp;
pub mod copy;
pub mod decision;
pub mod minimize;
pub mod reduction;
pub mod solve;
pub mod user_scopes;
