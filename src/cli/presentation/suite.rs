//! Suite presentation: contexts and tools of one suite.

use super::format_section_heading;
use crate::resolve::ResolveStatus;
use crate::suite::{ContextEntry, SuiteTool, ToolVisibility};
use comfy_table::presets::UTF8_BORDERS_ONLY;
use comfy_table::{Cell, Color, Table};
use serde_json::json;

fn table(color: bool) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    if !color {
        table.force_no_tty();
    }
    table
}

fn status_cell(status: ResolveStatus) -> Cell {
    match status {
        ResolveStatus::Solved => Cell::new("solved").fg(Color::Green),
        ResolveStatus::Failed => Cell::new("failed").fg(Color::Red),
    }
}

fn visibility_cell(visibility: ToolVisibility) -> Cell {
    let cell = Cell::new(visibility.as_str());
    match visibility {
        ToolVisibility::Visible => cell.fg(Color::Green),
        ToolVisibility::Hidden => cell.fg(Color::DarkGrey),
        ToolVisibility::Shadowed => cell.fg(Color::Yellow),
        ToolVisibility::Missing => cell.fg(Color::Red),
    }
}

/// Contexts in the order given, usually highest priority first.
pub fn format_contexts_text(suite: &str, contexts: &[ContextEntry], color: bool) -> String {
    let heading = format_section_heading(&format!("Suite: {}", suite), color);
    if contexts.is_empty() {
        return format!("{}\n\nNo contexts.", heading);
    }

    let mut table = table(color);
    table.set_header(vec!["Priority", "Context", "Requests", "Status", "Tools"]);
    for ctx in contexts {
        table.add_row(vec![
            Cell::new(ctx.priority),
            Cell::new(&ctx.name),
            Cell::new(ctx.requests.join(" ")),
            status_cell(ctx.context.status),
            Cell::new(ctx.context.tools().len()),
        ]);
    }

    let mut out = format!("{}\n\n{}", heading, table);
    let failures: Vec<_> = contexts
        .iter()
        .filter_map(|c| c.context.failure.as_ref().map(|f| (c, f)))
        .collect();
    if !failures.is_empty() {
        out.push_str(&format!("\n\nFailed contexts ({}):", failures.len()));
        for (ctx, reason) in failures {
            out.push_str(&format!("\n  - {}: {}", ctx.name, reason));
        }
    }
    out
}

pub fn format_contexts_json(
    suite: &str,
    contexts: &[ContextEntry],
) -> Result<String, serde_json::Error> {
    let contexts: Vec<_> = contexts
        .iter()
        .map(|c| {
            json!({
                "id": c.ctx_id,
                "name": c.name,
                "priority": c.priority,
                "prefix": c.prefix,
                "suffix": c.suffix,
                "requests": c.requests,
                "status": c.context.status,
                "failure": c.context.failure,
                "packages": c.context.packages.iter().map(|p| p.qualified_name()).collect::<Vec<_>>(),
                "tool_aliases": c.tool_aliases,
                "hidden_tools": c.hidden_tools,
            })
        })
        .collect();
    serde_json::to_string_pretty(&json!({ "suite": suite, "contexts": contexts }))
}

pub fn format_tools_text(suite: &str, tools: &[SuiteTool], color: bool) -> String {
    let heading = format_section_heading(&format!("Suite: {}", suite), color);
    if tools.is_empty() {
        return format!("{}\n\nNo tools.", heading);
    }

    let mut table = table(color);
    table.set_header(vec!["Alias", "Tool", "Context", "Variant", "Status"]);
    for tool in tools {
        let status = visibility_cell(tool.visibility);
        table.add_row(vec![
            Cell::new(&tool.alias),
            Cell::new(&tool.name),
            Cell::new(&tool.ctx_name),
            Cell::new(tool.variant.as_deref().unwrap_or("-")),
            status,
        ]);
    }
    format!("{}\n\n{}", heading, table)
}

pub fn format_tools_json(suite: &str, tools: &[SuiteTool]) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&json!({ "suite": suite, "tools": tools }))
}
