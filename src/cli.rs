//! CLI: parse, route, presentation.
//!
//! Clap definitions live in `parse`, dispatch in `route`, and text/json
//! rendering in `presentation`.

mod output;
mod parse;
mod presentation;
mod route;

pub use output::map_error;
pub use parse::{Cli, Commands, OutputFormat};
pub use presentation::{
    format_contexts_json, format_contexts_text, format_saved_suites_json,
    format_saved_suites_text, format_tools_json, format_tools_text,
};
pub use route::RunContext;
