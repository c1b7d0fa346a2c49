//! Context identity map: stable ids on one side, renameable names on the other.

use crate::error::SuiteError;
use crate::types::{ContextId, ContextRef};
use std::collections::{BTreeMap, BTreeSet};

/// Bidirectional `ContextId` <-> name association.
///
/// Names are unique; an id maps to exactly one name.
#[derive(Debug, Clone, Default)]
pub struct ContextIdentityMap {
    names: BTreeMap<ContextId, String>,
    ids: BTreeMap<String, ContextId>,
}

impl ContextIdentityMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a map from loaded pairs without rejecting duplicate names.
    ///
    /// Duplicates survive as a size mismatch between the two directions so
    /// that [`check`](Self::check) reports them as a consistency failure.
    pub(crate) fn from_pairs(pairs: impl IntoIterator<Item = (ContextId, String)>) -> Self {
        let mut map = Self::new();
        for (id, name) in pairs {
            map.ids.insert(name.clone(), id.clone());
            map.names.insert(id, name);
        }
        map
    }

    /// A fresh id not bound in this map.
    pub fn generate_id(&self) -> ContextId {
        loop {
            let id = ContextId::generate();
            if !self.names.contains_key(&id) {
                return id;
            }
        }
    }

    pub fn bind(&mut self, ctx_id: ContextId, name: &str) -> Result<(), SuiteError> {
        match self.ids.get(name) {
            Some(owner) if *owner != ctx_id => {
                return Err(SuiteError::DuplicateName(name.to_string()));
            }
            Some(_) => return Ok(()),
            None => {}
        }
        if let Some(previous) = self.names.insert(ctx_id.clone(), name.to_string()) {
            self.ids.remove(&previous);
        }
        self.ids.insert(name.to_string(), ctx_id);
        Ok(())
    }

    pub fn rename(&mut self, ctx_id: &ContextId, new_name: &str) -> Result<(), SuiteError> {
        let current = self
            .names
            .get(ctx_id)
            .ok_or_else(|| SuiteError::UnknownContext(ctx_id.to_string()))?;
        if current == new_name {
            return Ok(());
        }
        if self.ids.contains_key(new_name) {
            return Err(SuiteError::DuplicateName(new_name.to_string()));
        }
        let previous = current.clone();
        self.ids.remove(&previous);
        self.ids.insert(new_name.to_string(), ctx_id.clone());
        self.names.insert(ctx_id.clone(), new_name.to_string());
        Ok(())
    }

    pub fn lookup(&self, ctx_id: &ContextId) -> Option<&str> {
        self.names.get(ctx_id).map(String::as_str)
    }

    pub fn find(&self, name: &str) -> Option<&ContextId> {
        self.ids.get(name)
    }

    pub fn contains(&self, ctx_id: &ContextId) -> bool {
        self.names.contains_key(ctx_id)
    }

    /// Remove an association. Unbinding an absent id is a no-op.
    pub fn unbind(&mut self, ctx_id: &ContextId) {
        if let Some(name) = self.names.remove(ctx_id) {
            self.ids.remove(&name);
        }
    }

    /// Resolve a caller reference to a bound id.
    pub fn resolve(&self, ctx: &ContextRef) -> Result<ContextId, SuiteError> {
        match ctx {
            ContextRef::Id(id) if self.contains(id) => Ok(id.clone()),
            ContextRef::Name(name) => self
                .find(name)
                .cloned()
                .ok_or_else(|| SuiteError::UnknownContext(name.clone())),
            ContextRef::Id(id) => Err(SuiteError::UnknownContext(id.to_string())),
        }
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Verify the bijection against the ids held by the owning collection.
    pub fn check<'a>(
        &self,
        collection: impl IntoIterator<Item = &'a ContextId>,
    ) -> Result<(), SuiteError> {
        if self.ids.len() != self.names.len() {
            return Err(SuiteError::Consistency(
                "Context name duplicated, invalid suite.".to_string(),
            ));
        }
        for (id, name) in &self.names {
            if self.ids.get(name) != Some(id) {
                return Err(SuiteError::Consistency(format!(
                    "Context name {:?} bound inconsistently, invalid suite.",
                    name
                )));
            }
        }
        let owned: BTreeSet<&ContextId> = collection.into_iter().collect();
        let bound: BTreeSet<&ContextId> = self.names.keys().collect();
        if owned != bound {
            return Err(SuiteError::Consistency(
                "Context Id mismatch, invalid suite.".to_string(),
            ));
        }
        Ok(())
    }
}
