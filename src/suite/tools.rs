//! Tool conflict resolution.
//!
//! Flattens every context's tools into one exposed surface. Contexts are
//! visited in priority order and the first context to claim an alias wins it;
//! later claims are kept as shadowed entries so callers can see why a tool is
//! unavailable. The output depends only on ordered inputs, so resolving twice
//! over unchanged contexts yields identical tables.

use crate::resolve::ResolvedTool;
use crate::types::ContextId;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Where a tool ended up after conflict resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolVisibility {
    Visible,
    Hidden,
    Shadowed,
    /// Known from the saved tool map but absent from the live resolution.
    Missing,
}

impl ToolVisibility {
    pub fn as_str(&self) -> &'static str {
        match self {
            ToolVisibility::Visible => "visible",
            ToolVisibility::Hidden => "hidden",
            ToolVisibility::Shadowed => "shadowed",
            ToolVisibility::Missing => "missing",
        }
    }
}

/// One tool as exposed (or not) by the suite.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SuiteTool {
    pub name: String,
    pub alias: String,
    pub visibility: ToolVisibility,
    pub ctx_id: ContextId,
    pub ctx_name: String,
    /// Providing variant; `None` for missing tools.
    pub variant: Option<String>,
    /// Context that owns the alias when this tool is shadowed.
    pub shadowed_by: Option<ContextId>,
}

/// Per-context input to the resolver.
#[derive(Debug, Clone, Copy)]
pub struct ToolSource<'a> {
    pub ctx_id: &'a ContextId,
    pub ctx_name: &'a str,
    pub prefix: &'a str,
    pub suffix: &'a str,
    pub tools: &'a [ResolvedTool],
    /// tool name -> explicit alias
    pub aliases: &'a BTreeMap<String, String>,
    /// hidden tool names
    pub hidden: &'a BTreeSet<String>,
    /// alias -> tool name, as last saved
    pub saved_tools: &'a BTreeMap<String, String>,
}

impl ToolSource<'_> {
    fn alias_for(&self, tool_name: &str) -> String {
        match self.aliases.get(tool_name) {
            Some(alias) => alias.clone(),
            None => format!("{}{}{}", self.prefix, tool_name, self.suffix),
        }
    }
}

/// Resolved tool surface of a suite.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolTable {
    visible: Vec<SuiteTool>,
    hidden: Vec<SuiteTool>,
    shadowed: Vec<SuiteTool>,
    missing: Vec<SuiteTool>,
    by_alias: BTreeMap<String, usize>,
}

impl ToolTable {
    /// Resolve tools over sources already sorted by descending priority.
    pub fn build(sources: &[ToolSource<'_>]) -> Self {
        let mut table = ToolTable::default();

        for source in sources {
            let mut tools: Vec<&ResolvedTool> = source.tools.iter().collect();
            tools.sort();

            let mut live_aliases = BTreeSet::new();
            for tool in tools {
                let alias = source.alias_for(&tool.name);
                live_aliases.insert(alias.clone());

                let mut entry = SuiteTool {
                    name: tool.name.clone(),
                    alias,
                    visibility: ToolVisibility::Visible,
                    ctx_id: source.ctx_id.clone(),
                    ctx_name: source.ctx_name.to_string(),
                    variant: Some(tool.variant.clone()),
                    shadowed_by: None,
                };

                if source.hidden.contains(&tool.name) {
                    entry.visibility = ToolVisibility::Hidden;
                    table.hidden.push(entry);
                } else if let Some(&winner) = table.by_alias.get(&entry.alias) {
                    entry.visibility = ToolVisibility::Shadowed;
                    entry.shadowed_by = Some(table.visible[winner].ctx_id.clone());
                    table.shadowed.push(entry);
                } else {
                    table.by_alias.insert(entry.alias.clone(), table.visible.len());
                    table.visible.push(entry);
                }
            }

            for (alias, tool_name) in source.saved_tools {
                if live_aliases.contains(alias) {
                    continue;
                }
                table.missing.push(SuiteTool {
                    name: tool_name.clone(),
                    alias: alias.clone(),
                    visibility: ToolVisibility::Missing,
                    ctx_id: source.ctx_id.clone(),
                    ctx_name: source.ctx_name.to_string(),
                    variant: None,
                    shadowed_by: None,
                });
            }
        }

        table
    }

    /// All tools: visible, hidden, shadowed, then missing.
    pub fn iter(&self) -> impl Iterator<Item = &SuiteTool> {
        self.visible
            .iter()
            .chain(&self.hidden)
            .chain(&self.shadowed)
            .chain(&self.missing)
    }

    pub fn into_vec(self) -> Vec<SuiteTool> {
        let mut all = self.visible;
        all.extend(self.hidden);
        all.extend(self.shadowed);
        all.extend(self.missing);
        all
    }

    pub fn visible(&self) -> &[SuiteTool] {
        &self.visible
    }

    pub fn hidden(&self) -> &[SuiteTool] {
        &self.hidden
    }

    pub fn shadowed(&self) -> &[SuiteTool] {
        &self.shadowed
    }

    pub fn missing(&self) -> &[SuiteTool] {
        &self.missing
    }

    /// The tool currently exposed under an alias.
    pub fn visible_tool(&self, alias: &str) -> Option<&SuiteTool> {
        self.by_alias.get(alias).map(|&i| &self.visible[i])
    }

    /// Shadowed entries that lost the given alias.
    pub fn conflicts(&self, alias: &str) -> Vec<&SuiteTool> {
        self.shadowed.iter().filter(|t| t.alias == alias).collect()
    }

    /// Tool name behind `alias` in a context: visible first, then hidden, then shadowed.
    pub fn lookup_tool(&self, ctx_id: &ContextId, alias: &str) -> Option<&str> {
        self.visible
            .iter()
            .chain(&self.hidden)
            .chain(&self.shadowed)
            .find(|t| t.ctx_id == *ctx_id && t.alias == alias)
            .map(|t| t.name.as_str())
    }
}
