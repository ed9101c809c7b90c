//! Log targets.
//!
//! Calls to [log!](log) are made with a target from [targets], so output may be narrowed to
//! relevant parts of the library.
//!
//! For example, when used with [env_logger](https://docs.rs/env_logger/latest/env_logger/):
//! - Logs related to propagation can be filtered with `RUST_LOG=propagation …`
//! - Logs of reduction counts without details of the clauses removed with
//!   `RUST_LOG=reduction=info …`

/// Targets for log messages.
pub mod targets {
    pub const ANALYSIS: &str = "analysis";
    pub const BACKJUMP: &str = "backjump";
    pub const CLAUSE_DB: &str = "clause_db";
    pub const CORE: &str = "core";
    pub const DECISION: &str = "decision";
    pub const PROPAGATION: &str = "propagation";
    pub const REDUCTION: &str = "reduction";
    pub const SCOPES: &str = "scopes";
    pub const SOLVE: &str = "solve";
}
