//! Suite Session
//!
//! Binds configuration, a resolver and one storage per branch. Entry point for
//! creating, loading and saving suites.

use crate::config::SweetConfig;
use crate::error::{ApiError, StorageError};
use crate::resolve::{ContextResolver, PackageCatalog};
use crate::storage::{FsSuiteStorage, SavedSuite, SuiteStorage};
use crate::suite::{ErrorChannel, SuiteOp};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

pub struct Session {
    resolver: Arc<dyn ContextResolver>,
    errors: ErrorChannel,
    storages: BTreeMap<String, Box<dyn SuiteStorage>>,
    default_branch: String,
}

impl Session {
    /// Session over explicit collaborators, with no storage attached yet.
    pub fn new(resolver: Arc<dyn ContextResolver>, errors: ErrorChannel) -> Self {
        Self {
            resolver,
            errors,
            storages: BTreeMap::new(),
            default_branch: crate::config::DEFAULT_BRANCH.to_string(),
        }
    }

    /// Session from configuration: one filesystem storage per configured
    /// branch, and the configured package catalog as resolver.
    pub fn from_config(config: &SweetConfig, errors: ErrorChannel) -> Result<Self, ApiError> {
        let catalog = match &config.catalog {
            Some(path) => PackageCatalog::load_from_file(path)?,
            None => PackageCatalog::new(),
        };
        let mut session = Self::new(Arc::new(catalog), errors);
        session.default_branch = config.default_branch.clone();
        for (branch, root) in &config.suite_roots {
            session.add_storage(Box::new(FsSuiteStorage::new(root.clone(), Some(branch))));
        }
        debug!(branches = session.storages.len(), "Session ready");
        Ok(session)
    }

    /// Attach a storage under its own branch name, replacing any previous one.
    pub fn add_storage(&mut self, storage: Box<dyn SuiteStorage>) {
        self.storages.insert(storage.branch().to_string(), storage);
    }

    pub fn set_default_branch(&mut self, branch: &str) {
        self.default_branch = branch.to_string();
    }

    pub fn default_branch(&self) -> &str {
        &self.default_branch
    }

    pub fn branches(&self) -> impl Iterator<Item = &str> {
        self.storages.keys().map(String::as_str)
    }

    pub fn storage(&self, branch: &str) -> Result<&dyn SuiteStorage, StorageError> {
        self.storages
            .get(branch)
            .map(|s| s.as_ref())
            .ok_or_else(|| StorageError::BranchNotFound(branch.to_string()))
    }

    pub fn resolver(&self) -> Arc<dyn ContextResolver> {
        Arc::clone(&self.resolver)
    }

    /// A new, empty suite.
    pub fn new_suite(&self) -> SuiteOp {
        SuiteOp::new(self.resolver(), self.errors.clone())
    }

    /// Saved suites of one branch, or of every branch in branch order.
    pub fn iter_saved_suites(&self, branch: Option<&str>) -> Result<Vec<SavedSuite>, ApiError> {
        let mut saved = Vec::new();
        match branch {
            Some(branch) => saved.extend(self.storage(branch)?.list()?),
            None => {
                for storage in self.storages.values() {
                    saved.extend(storage.list()?);
                }
            }
        }
        Ok(saved)
    }

    /// Locate a saved suite by branch and name.
    pub fn find_saved(&self, branch: &str, name: &str) -> Result<SavedSuite, ApiError> {
        Ok(self.storage(branch)?.find(name)?)
    }

    /// Load a saved suite into a fresh operator.
    pub fn load(&self, saved: &SavedSuite) -> Result<SuiteOp, ApiError> {
        let document = self.storage(&saved.branch)?.load(&saved.filepath)?;
        let mut op = SuiteOp::from_serializable(&document, self.resolver(), self.errors.clone())?;
        if op.name().is_empty() {
            op.set_name(&saved.name);
        }
        Ok(op)
    }

    /// Load a suite file from any location.
    pub fn load_file(&self, filepath: &Path) -> Result<SuiteOp, ApiError> {
        let document = FsSuiteStorage::read_document(filepath)?;
        Ok(SuiteOp::from_serializable(
            &document,
            self.resolver(),
            self.errors.clone(),
        )?)
    }

    /// Serialize `op` and save it as `name`; `None` means the default branch.
    pub fn save(
        &self,
        op: &mut SuiteOp,
        branch: Option<&str>,
        name: &str,
    ) -> Result<SavedSuite, ApiError> {
        let branch = branch.unwrap_or(&self.default_branch);
        let storage = self.storage(branch)?;
        if op.name().is_empty() {
            op.set_name(name);
        }
        let document = op.to_serializable()?;
        let saved = storage.save(&document, name)?;
        op.mark_saved(&document);
        op.set_load_path(saved.filepath.clone());
        info!(branch, suite = name, "Saved suite");
        Ok(saved)
    }
}
