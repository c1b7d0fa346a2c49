//! Saved suite listing.

use super::format_section_heading;
use crate::storage::SavedSuite;
use comfy_table::presets::UTF8_BORDERS_ONLY;
use comfy_table::Table;
use serde_json::json;

pub fn format_saved_suites_text(saved: &[SavedSuite], color: bool) -> String {
    if saved.is_empty() {
        return "No saved suites found.".to_string();
    }
    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    table.set_header(vec!["Branch", "Suite", "Path"]);
    for s in saved {
        table.add_row(vec![
            s.branch.clone(),
            s.name.clone(),
            s.filepath.display().to_string(),
        ]);
    }
    format!(
        "{}\n\n{}\n\nTotal: {} suite(s)",
        format_section_heading("Saved Suites", color),
        table,
        saved.len()
    )
}

pub fn format_saved_suites_json(saved: &[SavedSuite]) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&json!({ "suites": saved }))
}
