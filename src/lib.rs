//! A library for determining the satisfiability of boolean formulas written in conjunctive normal form.
//!
//! marten_sat is a conflict-driven clause-learning (CDCL) solver with support for incremental
//! solves, assumptions, and the extraction of unsatisfiable cores.
//!
//! # Orientation
//!
//! The library is designed around the core structure of a [solver](crate::solver::GenericSolver).
//!
//! A solver is built from a [configuration](crate::config::Config), clauses are added through
//! [add_clause](crate::solver::GenericSolver::add_clause), and satisfiability is determined by
//! [check](crate::solver::GenericSolver::check), optionally under a collection of assumed
//! literals.
//!
//! Internally, and at a high level, a solve is viewed in terms of the manipulation of, and
//! relationships between, a handful of databases:
//! - A formula is stored in a [clause database](crate::db::clause_db), addressed by stable
//!   handles.
//! - A valuation, together with everything else known about an atom, is stored in an
//!   [atom database](crate::db::atom_db).
//! - The occasions on which a clause requires attention are stored in a
//!   [watch database](crate::db::watch_db).
//! - The history of the valuation is stored on a [trail](crate::db::trail) with a stack of
//!   scopes, one for each decision made.
//!
//! The algorithm which ties the databases together is factored into a collection of
//! [procedures].
//!
//! # Example
//!
//! ```rust
//! use marten_sat::config::Config;
//! use marten_sat::reports::Report;
//! use marten_sat::solver::Solver;
//! use marten_sat::structures::literal::CLiteral;
//!
//! let mut solver = Solver::from_config(Config::default());
//!
//! let p = solver.fresh_atom(false, true);
//! let q = solver.fresh_atom(false, true);
//!
//! assert!(solver.add_clause(vec![CLiteral::new(p, true), CLiteral::new(q, true)]).is_ok());
//! assert!(solver.add_clause(vec![CLiteral::new(p, false), CLiteral::new(q, true)]).is_ok());
//!
//! assert_eq!(solver.check(&[]), Ok(Report::Satisfiable));
//! assert_eq!(solver.value_of(q), Some(true));
//! ```
//!
//! # Logs
//!
//! To help diagnose issues calls to [log!](log) are made throughout, and a variety of targets
//! are defined in order to help narrow output to relevant parts of the library.
//! The targets are listed in [misc::log].

#![allow(clippy::single_match)]
#![allow(clippy::collapsible_else_if)]

pub mod config;
pub mod db;
pub mod extension;
pub mod generic;
pub mod io;
pub mod misc;
pub mod procedures;
pub mod reports;
pub mod solver;
pub mod structures;
pub mod types;
