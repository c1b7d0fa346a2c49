//! CLI presentation: text and json formatters per command family.

mod saved;
mod suite;

pub use saved::{format_saved_suites_json, format_saved_suites_text};
pub use suite::{format_contexts_json, format_contexts_text, format_tools_json, format_tools_text};

use owo_colors::OwoColorize;

/// Section heading, bold and underlined when `color` is set.
pub(crate) fn format_section_heading(title: &str, color: bool) -> String {
    if color {
        format!("{}", title.bold().underline())
    } else {
        title.to_string()
    }
}
