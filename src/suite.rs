//! Suites
//!
//! A suite composes several resolved contexts into one tool surface. The
//! [`SuiteOp`] operator owns the mutable model; ids are stable for the
//! lifetime of an operator while names stay editable.

pub mod context;
pub mod document;
pub mod identity;
pub mod operator;
pub mod sink;
pub mod tools;

pub use context::{ContextEntry, ContextOrder};
pub use document::{ContextDocument, SuiteDocument};
pub use identity::ContextIdentityMap;
pub use operator::{ContextUpdate, SuiteOp};
pub use sink::{CollectingSink, ErrorChannel, ErrorSink, ReportedError, TracingSink};
pub use tools::{SuiteTool, ToolTable, ToolVisibility};
