//! Serializable suite representation.
//!
//! Contexts are keyed by their user-facing names here; ids only exist inside a
//! live operator and are regenerated every time a document is loaded.

use crate::error::SuiteError;
use crate::resolve::ResolvedContext;
use crate::types::Priority;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SuiteDocument {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Where the document was loaded from; never persisted.
    #[serde(skip)]
    pub load_path: Option<PathBuf>,
    #[serde(default)]
    pub contexts: Vec<ContextDocument>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextDocument {
    pub name: String,
    pub priority: Priority,
    #[serde(default)]
    pub prefix: String,
    #[serde(default)]
    pub suffix: String,
    /// tool name -> alias
    #[serde(default)]
    pub tool_aliases: BTreeMap<String, String>,
    #[serde(default)]
    pub hidden_tools: BTreeSet<String>,
    /// alias -> tool name of every tool this context exposed when saved
    #[serde(default)]
    pub tools: BTreeMap<String, String>,
    pub context: ResolvedContext,
}

impl SuiteDocument {
    pub fn context(&self, name: &str) -> Option<&ContextDocument> {
        self.contexts.iter().find(|c| c.name == name)
    }

    /// Visible alias -> (context name, tool name) as saved.
    pub fn saved_tools(&self) -> BTreeMap<&str, (&str, &str)> {
        let mut tools = BTreeMap::new();
        for ctx in &self.contexts {
            for (alias, tool) in &ctx.tools {
                tools.insert(alias.as_str(), (ctx.name.as_str(), tool.as_str()));
            }
        }
        tools
    }

    /// Self-consistency of the document: context names are valid and unique.
    pub fn check(&self) -> Result<(), SuiteError> {
        let mut seen = BTreeSet::new();
        for ctx in &self.contexts {
            if !is_valid_name(&ctx.name) {
                return Err(SuiteError::Consistency(format!(
                    "Invalid context name {:?} in serialized suite.",
                    ctx.name
                )));
            }
            if !seen.insert(ctx.name.as_str()) {
                return Err(SuiteError::Consistency(format!(
                    "Context name {:?} duplicated in serialized suite.",
                    ctx.name
                )));
            }
        }
        Ok(())
    }
}

/// Context names: non-empty, `[A-Za-z0-9_.-]` only.
pub(crate) fn is_valid_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
}
