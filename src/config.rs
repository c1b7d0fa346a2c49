//! Configuration System
//!
//! Layered configuration for suite roots, the package catalog and logging.
//! Sources, lowest to highest precedence: built-in defaults, the global file,
//! workspace files, then `SWEET__*` environment variables.

use crate::logging::LoggingConfig;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

mod facade;
mod merge;
mod paths;
mod sources;

pub use facade::ConfigLoader;

/// Backward-compatible re-export of XDG path helpers
pub mod xdg {
    pub use super::paths::*;
}

pub const DEFAULT_BRANCH: &str = "local";

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweetConfig {
    /// Branch name -> root directory holding saved suites
    #[serde(default)]
    pub suite_roots: BTreeMap<String, PathBuf>,

    /// Branch used when saving without an explicit branch
    #[serde(default = "default_branch")]
    pub default_branch: String,

    /// Package catalog file served by the built-in resolver
    #[serde(default)]
    pub catalog: Option<PathBuf>,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

fn default_branch() -> String {
    DEFAULT_BRANCH.to_string()
}

impl Default for SweetConfig {
    fn default() -> Self {
        Self {
            suite_roots: BTreeMap::new(),
            default_branch: default_branch(),
            catalog: None,
            logging: LoggingConfig::default(),
        }
    }
}

/// Configuration validation errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    Branch(String, String),
    Catalog(String),
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::Branch(name, msg) => write!(f, "Branch '{}': {}", name, msg),
            ValidationError::Catalog(msg) => write!(f, "Catalog: {}", msg),
        }
    }
}

impl std::error::Error for ValidationError {}

impl SweetConfig {
    /// Validate the entire configuration
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        for (branch, root) in &self.suite_roots {
            if branch.is_empty() || branch.contains(['/', '\\']) {
                errors.push(ValidationError::Branch(
                    branch.clone(),
                    "branch names cannot be empty or contain path separators".to_string(),
                ));
            }
            if root.as_os_str().is_empty() {
                errors.push(ValidationError::Branch(
                    branch.clone(),
                    "suite root cannot be empty".to_string(),
                ));
            }
        }

        if !self.suite_roots.contains_key(&self.default_branch) {
            errors.push(ValidationError::Branch(
                self.default_branch.clone(),
                "default branch has no suite root".to_string(),
            ));
        }

        if let Some(catalog) = &self.catalog {
            if catalog.as_os_str().is_empty() {
                errors.push(ValidationError::Catalog(
                    "catalog path cannot be empty".to_string(),
                ));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
