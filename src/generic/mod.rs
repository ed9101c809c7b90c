//! Self-contained structures to support a solve.

pub mod index_heap;
pub mod luby;
pub mod minimal_pcg;
