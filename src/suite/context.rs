//! Per-context state held by the operator, and the snapshot handed to callers.

use crate::resolve::ResolvedContext;
use crate::suite::document::ContextDocument;
use crate::suite::tools::ToolSource;
use crate::types::{ContextId, Priority};
use std::collections::{BTreeMap, BTreeSet};

/// Ordering for [`SuiteOp::iter_contexts`](crate::suite::SuiteOp::iter_contexts).
///
/// Priority ties are broken by insertion order, earliest first when descending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ContextOrder {
    /// Highest priority first, the order in which contexts claim tools.
    #[default]
    PriorityDescending,
    PriorityAscending,
    Insertion,
}

#[derive(Debug, Clone)]
pub(crate) struct SuiteContext {
    pub ctx_id: ContextId,
    /// Insertion sequence, used to break priority ties.
    pub seq: u64,
    pub priority: Priority,
    pub prefix: String,
    pub suffix: String,
    pub tool_aliases: BTreeMap<String, String>,
    pub hidden_tools: BTreeSet<String>,
    pub saved_tools: BTreeMap<String, String>,
    pub context: ResolvedContext,
}

impl SuiteContext {
    pub fn new(ctx_id: ContextId, seq: u64, priority: Priority, context: ResolvedContext) -> Self {
        Self {
            ctx_id,
            seq,
            priority,
            prefix: String::new(),
            suffix: String::new(),
            tool_aliases: BTreeMap::new(),
            hidden_tools: BTreeSet::new(),
            saved_tools: BTreeMap::new(),
            context,
        }
    }

    pub fn from_document(ctx_id: ContextId, seq: u64, doc: &ContextDocument) -> Self {
        Self {
            ctx_id,
            seq,
            priority: doc.priority,
            prefix: doc.prefix.clone(),
            suffix: doc.suffix.clone(),
            tool_aliases: doc.tool_aliases.clone(),
            hidden_tools: doc.hidden_tools.clone(),
            saved_tools: doc.tools.clone(),
            context: doc.context.clone(),
        }
    }

    pub fn tool_source<'a>(&'a self, ctx_name: &'a str) -> ToolSource<'a> {
        ToolSource {
            ctx_id: &self.ctx_id,
            ctx_name,
            prefix: &self.prefix,
            suffix: &self.suffix,
            tools: self.context.tools(),
            aliases: &self.tool_aliases,
            hidden: &self.hidden_tools,
            saved_tools: &self.saved_tools,
        }
    }

    pub fn entry(&self, name: &str) -> ContextEntry {
        ContextEntry {
            ctx_id: self.ctx_id.clone(),
            name: name.to_string(),
            priority: self.priority,
            prefix: self.prefix.clone(),
            suffix: self.suffix.clone(),
            requests: self.context.requests.clone(),
            tool_aliases: self.tool_aliases.clone(),
            hidden_tools: self.hidden_tools.clone(),
            context: self.context.clone(),
        }
    }
}

/// Point-in-time copy of one context.
#[derive(Debug, Clone, PartialEq)]
pub struct ContextEntry {
    pub ctx_id: ContextId,
    pub name: String,
    pub priority: Priority,
    pub prefix: String,
    pub suffix: String,
    pub requests: Vec<String>,
    pub tool_aliases: BTreeMap<String, String>,
    pub hidden_tools: BTreeSet<String>,
    pub context: ResolvedContext,
}
