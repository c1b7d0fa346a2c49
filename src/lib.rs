//! Sweet: Suite Composition
//!
//! Composes several resolved package contexts into one suite with a single,
//! conflict-resolved tool surface. Contexts are ranked by priority; when two
//! contexts expose the same tool alias, the higher-priority one wins and the
//! other is kept as a shadowed entry.

pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod resolve;
pub mod session;
pub mod storage;
pub mod suite;
pub mod types;
