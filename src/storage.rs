//! Suite Storage
//!
//! Persists serialized suites under named root locations ("branches") and
//! enumerates what has been saved there.

use crate::error::StorageError;
use crate::suite::SuiteDocument;
use serde::Serialize;
use std::path::{Path, PathBuf};

pub mod fs;

pub use fs::FsSuiteStorage;

/// A suite found in storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SavedSuite {
    pub name: String,
    pub branch: String,
    pub root: PathBuf,
    /// Directory holding the tool wrappers.
    pub bin: PathBuf,
    pub filepath: PathBuf,
}

/// Storage port for serialized suites.
pub trait SuiteStorage: Send + Sync {
    fn branch(&self) -> &str;

    fn root(&self) -> &Path;

    /// Saved suites in this branch, sorted by name.
    fn list(&self) -> Result<Vec<SavedSuite>, StorageError>;

    fn load(&self, filepath: &Path) -> Result<SuiteDocument, StorageError>;

    fn save(&self, document: &SuiteDocument, name: &str) -> Result<SavedSuite, StorageError>;

    /// Locate a saved suite by name.
    fn find(&self, name: &str) -> Result<SavedSuite, StorageError> {
        self.list()?
            .into_iter()
            .find(|s| s.name == name)
            .ok_or_else(|| StorageError::SuiteNotFound(format!("{}/{}", self.branch(), name)))
    }
}
