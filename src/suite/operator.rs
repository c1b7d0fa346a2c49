//! Suite Operator
//!
//! Aggregate root of a suite: owns the context collection, the identity map
//! and suite metadata, and answers every tool query through the conflict
//! resolver. All operations run to completion synchronously, in caller order.
//!
//! User-facing failures are published on the [`ErrorChannel`] and leave the
//! suite untouched; such operations return `Ok(None)` / `Ok(false)`. An `Err`
//! return means the error was escalated (nobody listening) or is fatal.

use crate::error::SuiteError;
use crate::resolve::{ContextResolver, ResolvedContext};
use crate::suite::context::{ContextEntry, ContextOrder, SuiteContext};
use crate::suite::document::{is_valid_name, ContextDocument, SuiteDocument};
use crate::suite::identity::ContextIdentityMap;
use crate::suite::sink::ErrorChannel;
use crate::suite::tools::{SuiteTool, ToolTable};
use crate::types::{ContextId, ContextRef, Priority};
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, warn};

const SENDER: &str = "SuiteOp";

/// Partial update of a context. Omitted fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContextUpdate {
    pub requests: Option<Vec<String>>,
    pub prefix: Option<String>,
    pub suffix: Option<String>,
}

impl ContextUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the requests; triggers a re-resolve.
    pub fn requests(mut self, requests: &[&str]) -> Self {
        self.requests = Some(requests.iter().map(|r| r.to_string()).collect());
        self
    }

    pub fn prefix(mut self, prefix: &str) -> Self {
        self.prefix = Some(prefix.to_string());
        self
    }

    pub fn suffix(mut self, suffix: &str) -> Self {
        self.suffix = Some(suffix.to_string());
        self
    }
}

/// Suite operator
pub struct SuiteOp {
    name: String,
    description: String,
    load_path: Option<PathBuf>,
    contexts: BTreeMap<ContextId, SuiteContext>,
    names: ContextIdentityMap,
    resolver: Arc<dyn ContextResolver>,
    errors: ErrorChannel,
    next_seq: u64,
}

impl SuiteOp {
    /// An empty suite.
    pub fn new(resolver: Arc<dyn ContextResolver>, errors: ErrorChannel) -> Self {
        Self {
            name: String::new(),
            description: String::new(),
            load_path: None,
            contexts: BTreeMap::new(),
            names: ContextIdentityMap::new(),
            resolver,
            errors,
            next_seq: 0,
        }
    }

    /// Rebuild a suite from its serialized form.
    ///
    /// Every context gets a freshly generated id; saved resolutions are reused
    /// as-is rather than re-resolved.
    pub fn from_serializable(
        document: &SuiteDocument,
        resolver: Arc<dyn ContextResolver>,
        errors: ErrorChannel,
    ) -> Result<Self, SuiteError> {
        if let Err(e) = document.check() {
            return Err(errors.fatal(SENDER, e));
        }
        let (names, contexts) = rekey(document);
        let op = Self {
            name: document.name.clone(),
            description: document.description.clone(),
            load_path: document.load_path.clone(),
            next_seq: contexts.len() as u64,
            contexts,
            names,
            resolver,
            errors,
        };
        op.sanity_check()?;
        debug!(suite = %op.name, contexts = op.contexts.len(), "Suite loaded");
        Ok(op)
    }

    /// Serialize the suite, keyed by context names.
    pub fn to_serializable(&self) -> Result<SuiteDocument, SuiteError> {
        self.sanity_check()?;

        let mut exposed: BTreeMap<ContextId, BTreeMap<String, String>> = BTreeMap::new();
        for tool in self.tool_table().visible() {
            exposed
                .entry(tool.ctx_id.clone())
                .or_default()
                .insert(tool.alias.clone(), tool.name.clone());
        }

        let contexts = self
            .ordered(ContextOrder::Insertion)
            .into_iter()
            .map(|ctx| ContextDocument {
                name: self.name_of(&ctx.ctx_id).to_string(),
                priority: ctx.priority,
                prefix: ctx.prefix.clone(),
                suffix: ctx.suffix.clone(),
                tool_aliases: ctx.tool_aliases.clone(),
                hidden_tools: ctx.hidden_tools.clone(),
                tools: exposed.remove(&ctx.ctx_id).unwrap_or_default(),
                context: ctx.context.clone(),
            })
            .collect();

        let document = SuiteDocument {
            name: self.name.clone(),
            description: self.description.clone(),
            load_path: self.load_path.clone(),
            contexts,
        };
        if let Err(e) = document.check() {
            return Err(self.errors.fatal(SENDER, e));
        }
        Ok(document)
    }

    /// Re-base the saved tool set of every context on a persisted document.
    ///
    /// Called once `document` has been written, so that missing tools are
    /// reported against what is actually on disk.
    pub fn mark_saved(&mut self, document: &SuiteDocument) {
        for doc in &document.contexts {
            let Some(ctx_id) = self.names.find(&doc.name).cloned() else {
                continue;
            };
            if let Some(ctx) = self.contexts.get_mut(&ctx_id) {
                ctx.saved_tools = doc.tools.clone();
            }
        }
        debug!(suite = %self.name, "Saved tools re-based");
    }

    /// Re-validate internal invariants. Any violation is fatal.
    pub fn sanity_check(&self) -> Result<(), SuiteError> {
        if let Err(e) = self.names.check(self.contexts.keys()) {
            return Err(self.errors.fatal(SENDER, e));
        }
        for ctx in self.contexts.values() {
            if let Err(source) = self.resolver.validate(&ctx.context) {
                let err = SuiteError::Validation {
                    context: self.name_of(&ctx.ctx_id).to_string(),
                    source,
                };
                return Err(self.errors.fatal(SENDER, err));
            }
        }
        Ok(())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: &str) {
        self.name = name.to_string();
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn set_description(&mut self, text: &str) {
        self.description = text.to_string();
    }

    /// Where this suite was loaded from, if anywhere.
    pub fn load_path(&self) -> Option<&Path> {
        self.load_path.as_deref()
    }

    pub fn set_load_path(&mut self, path: impl Into<PathBuf>) {
        self.load_path = Some(path.into());
    }

    pub fn len(&self) -> usize {
        self.contexts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contexts.is_empty()
    }

    /// Resolve `requests` and add the result as a new, highest-priority context.
    pub fn add_context(
        &mut self,
        name: &str,
        requests: &[&str],
    ) -> Result<Option<ContextId>, SuiteError> {
        if let Err(e) = validate_name(name) {
            self.report(e)?;
            return Ok(None);
        }
        if self.names.find(name).is_some() {
            self.report(SuiteError::DuplicateName(name.to_string()))?;
            return Ok(None);
        }

        let requests: Vec<String> = requests.iter().map(|r| r.to_string()).collect();
        let context = self.resolve(&requests)?;

        let ctx_id = self.names.generate_id();
        if let Err(e) = self.names.bind(ctx_id.clone(), name) {
            self.report(e)?;
            return Ok(None);
        }

        let priority = self.next_priority();
        let seq = self.next_seq;
        self.next_seq += 1;
        self.contexts.insert(
            ctx_id.clone(),
            SuiteContext::new(ctx_id.clone(), seq, priority, context),
        );

        debug!(context = name, %ctx_id, priority, "Context added");
        Ok(Some(ctx_id))
    }

    /// Remove a context. Returns whether anything was removed; unknown
    /// contexts are ignored.
    pub fn drop_context(&mut self, ctx: impl Into<ContextRef>) -> bool {
        let ctx_id = match self.names.resolve(&ctx.into()) {
            Ok(id) => id,
            Err(_) => return false,
        };
        self.names.unbind(&ctx_id);
        let removed = self.contexts.remove(&ctx_id).is_some();
        debug!(%ctx_id, "Context dropped");
        removed
    }

    pub fn rename_context(
        &mut self,
        ctx: impl Into<ContextRef>,
        new_name: &str,
    ) -> Result<bool, SuiteError> {
        let Some(ctx_id) = self.target(ctx.into())? else {
            return Ok(false);
        };
        if let Err(e) = validate_name(new_name) {
            self.report(e)?;
            return Ok(false);
        }
        match self.names.rename(&ctx_id, new_name) {
            Ok(()) => {
                debug!(%ctx_id, new_name, "Context renamed");
                Ok(true)
            }
            Err(e) => {
                self.report(e)?;
                Ok(false)
            }
        }
    }

    /// Apply a partial update; new requests are resolved before anything changes.
    pub fn update_context(
        &mut self,
        ctx: impl Into<ContextRef>,
        update: ContextUpdate,
    ) -> Result<bool, SuiteError> {
        let Some(ctx_id) = self.target(ctx.into())? else {
            return Ok(false);
        };
        let resolved = match &update.requests {
            Some(requests) => Some(self.resolve(requests)?),
            None => None,
        };

        let entry = self.context_mut(&ctx_id)?;
        if let Some(context) = resolved {
            entry.context = context;
        }
        if let Some(prefix) = update.prefix {
            entry.prefix = prefix;
        }
        if let Some(suffix) = update.suffix {
            entry.suffix = suffix;
        }
        debug!(%ctx_id, "Context updated");
        Ok(true)
    }

    /// Alias or hide the tool currently exposed as `alias` in a context.
    ///
    /// An empty `new_alias` removes the explicit alias.
    pub fn update_tool(
        &mut self,
        ctx: impl Into<ContextRef>,
        alias: &str,
        new_alias: Option<&str>,
        set_hidden: Option<bool>,
    ) -> Result<bool, SuiteError> {
        let Some(ctx_id) = self.target(ctx.into())? else {
            return Ok(false);
        };
        let tool_name = self
            .tool_table()
            .lookup_tool(&ctx_id, alias)
            .map(str::to_string);
        let Some(tool_name) = tool_name else {
            let err = SuiteError::UnmatchedTool {
                context: self.name_of(&ctx_id).to_string(),
                alias: alias.to_string(),
            };
            self.report(err)?;
            return Ok(false);
        };

        let entry = self.context_mut(&ctx_id)?;
        if let Some(new_alias) = new_alias {
            entry.tool_aliases.remove(&tool_name);
            if !new_alias.is_empty() {
                entry
                    .tool_aliases
                    .insert(tool_name.clone(), new_alias.to_string());
            }
        }
        match set_hidden {
            Some(true) => {
                entry.hidden_tools.insert(tool_name.clone());
            }
            Some(false) => {
                entry.hidden_tools.remove(&tool_name);
            }
            None => {}
        }
        debug!(%ctx_id, tool = %tool_name, ?new_alias, ?set_hidden, "Tool updated");
        Ok(true)
    }

    /// Reassign priorities from a complete ordering, highest priority first.
    pub fn reorder_contexts(&mut self, order: &[ContextId]) -> Result<bool, SuiteError> {
        let unique: BTreeSet<&ContextId> = order.iter().collect();
        let complete = unique.len() == order.len()
            && order.len() == self.contexts.len()
            && order.iter().all(|id| self.contexts.contains_key(id));
        if !complete {
            self.report(SuiteError::InvalidOrder(format!(
                "expected each of the {} contexts exactly once, got {} entries",
                self.contexts.len(),
                order.len()
            )))?;
            return Ok(false);
        }

        let top = order.len() as Priority;
        for (index, ctx_id) in order.iter().enumerate() {
            if let Some(ctx) = self.contexts.get_mut(ctx_id) {
                ctx.priority = top - index as Priority;
            }
        }
        debug!(contexts = order.len(), "Contexts reordered");
        Ok(true)
    }

    /// Snapshot of every context.
    pub fn iter_contexts(&self, order: ContextOrder) -> Vec<ContextEntry> {
        self.ordered(order)
            .into_iter()
            .map(|ctx| ctx.entry(self.name_of(&ctx.ctx_id)))
            .collect()
    }

    /// Snapshot of one context.
    pub fn context(&self, ctx: impl Into<ContextRef>) -> Option<ContextEntry> {
        let ctx_id = self.names.resolve(&ctx.into()).ok()?;
        self.contexts
            .get(&ctx_id)
            .map(|c| c.entry(self.name_of(&ctx_id)))
    }

    pub fn lookup_context(&self, ctx_id: &ContextId) -> Option<&str> {
        self.names.lookup(ctx_id)
    }

    pub fn find_context(&self, name: &str) -> Option<ContextId> {
        self.names.find(name).cloned()
    }

    /// Contexts whose requests mention `in_request` and whose resolve
    /// includes `in_resolve`, in priority order. `None` matches everything.
    pub fn find_contexts(
        &self,
        in_request: Option<&str>,
        in_resolve: Option<&str>,
    ) -> Vec<ContextId> {
        self.ordered(ContextOrder::PriorityDescending)
            .into_iter()
            .filter(|c| in_request.map_or(true, |f| c.context.requests_family(f)))
            .filter(|c| in_resolve.map_or(true, |f| c.context.has_package(f)))
            .map(|c| c.ctx_id.clone())
            .collect()
    }

    /// Current tool surface.
    pub fn tool_table(&self) -> ToolTable {
        let ordered = self.ordered(ContextOrder::PriorityDescending);
        let sources: Vec<_> = ordered
            .iter()
            .map(|c| c.tool_source(self.name_of(&c.ctx_id)))
            .collect();
        ToolTable::build(&sources)
    }

    /// Every tool: visible, hidden, shadowed, then missing.
    pub fn resolve_tools(&self) -> Vec<SuiteTool> {
        self.tool_table().into_vec()
    }

    /// Real tool name behind an alias in a context, even when shadowed.
    pub fn lookup_tool(&self, ctx: impl Into<ContextRef>, alias: &str) -> Option<String> {
        let ctx_id = self.names.resolve(&ctx.into()).ok()?;
        self.tool_table()
            .lookup_tool(&ctx_id, alias)
            .map(str::to_string)
    }

    /// One above the current highest priority. When that would overflow,
    /// priorities are first compacted to `1..=n`, keeping their order.
    fn next_priority(&mut self) -> Priority {
        let top = self.contexts.values().map(|c| c.priority).max().unwrap_or(0);
        if let Some(next) = top.checked_add(1) {
            return next;
        }

        let ascending: Vec<ContextId> = self
            .ordered(ContextOrder::PriorityAscending)
            .into_iter()
            .map(|c| c.ctx_id.clone())
            .collect();
        for (index, ctx_id) in ascending.iter().enumerate() {
            if let Some(ctx) = self.contexts.get_mut(ctx_id) {
                ctx.priority = index as Priority + 1;
            }
        }
        warn!(contexts = ascending.len(), "Priority ceiling reached, priorities compacted");
        ascending.len() as Priority + 1
    }

    fn report(&self, err: SuiteError) -> Result<(), SuiteError> {
        self.errors.emit(SENDER, err)
    }

    /// Resolve a caller reference, reporting unknown contexts.
    fn target(&self, ctx: ContextRef) -> Result<Option<ContextId>, SuiteError> {
        match self.names.resolve(&ctx) {
            Ok(id) => Ok(Some(id)),
            Err(e) => {
                self.report(e)?;
                Ok(None)
            }
        }
    }

    fn context_mut(&mut self, ctx_id: &ContextId) -> Result<&mut SuiteContext, SuiteError> {
        match self.contexts.get_mut(ctx_id) {
            Some(ctx) => Ok(ctx),
            None => Err(self.errors.fatal(
                SENDER,
                SuiteError::Consistency(format!("Context Id {} bound but not held.", ctx_id)),
            )),
        }
    }

    fn name_of(&self, ctx_id: &ContextId) -> &str {
        self.names.lookup(ctx_id).unwrap_or_default()
    }

    fn ordered(&self, order: ContextOrder) -> Vec<&SuiteContext> {
        let mut contexts: Vec<&SuiteContext> = self.contexts.values().collect();
        match order {
            ContextOrder::PriorityDescending => contexts
                .sort_by(|a, b| b.priority.cmp(&a.priority).then(a.seq.cmp(&b.seq))),
            ContextOrder::PriorityAscending => contexts
                .sort_by(|a, b| a.priority.cmp(&b.priority).then(b.seq.cmp(&a.seq))),
            ContextOrder::Insertion => contexts.sort_by_key(|c| c.seq),
        }
        contexts
    }

    /// Resolve requests, substituting a failed context when the engine errors.
    fn resolve(&self, requests: &[String]) -> Result<ResolvedContext, SuiteError> {
        match self.resolver.resolve(requests) {
            Ok(context) => {
                if !context.success() {
                    warn!(
                        ?requests,
                        reason = context.failure.as_deref().unwrap_or_default(),
                        "Context failed to resolve"
                    );
                }
                Ok(context)
            }
            Err(e) => {
                let substitute = ResolvedContext::failed(requests, e.to_string());
                self.report(SuiteError::Resolution(e))?;
                Ok(substitute)
            }
        }
    }
}

/// Assign fresh ids to every context of a document.
///
/// First pass generates the ids and the id -> name mapping, second pass builds
/// the context collection from them.
fn rekey(document: &SuiteDocument) -> (ContextIdentityMap, BTreeMap<ContextId, SuiteContext>) {
    let ids: Vec<ContextId> = document
        .contexts
        .iter()
        .map(|_| ContextId::generate())
        .collect();
    let names = ContextIdentityMap::from_pairs(
        ids.iter()
            .cloned()
            .zip(document.contexts.iter().map(|c| c.name.clone())),
    );

    let contexts = ids
        .into_iter()
        .zip(&document.contexts)
        .enumerate()
        .map(|(seq, (id, doc))| {
            let ctx = SuiteContext::from_document(id.clone(), seq as u64, doc);
            (id, ctx)
        })
        .collect();

    (names, contexts)
}

/// Context names: non-empty, `[A-Za-z0-9_.-]` only.
fn validate_name(name: &str) -> Result<(), SuiteError> {
    if is_valid_name(name) {
        Ok(())
    } else {
        Err(SuiteError::InvalidName(name.to_string()))
    }
}
