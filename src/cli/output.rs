//! CLI output: error mapping from domain errors to stable CLI surface.

use crate::error::{ApiError, StorageError};

/// Map domain/service errors to a string for CLI output.
pub fn map_error(e: &ApiError) -> String {
    match e {
        ApiError::StorageError(StorageError::BranchNotFound(branch)) => format!(
            "Unknown branch '{}'. Configure it under [suite_roots] in config.toml.",
            branch
        ),
        ApiError::StorageError(StorageError::SuiteNotFound(name)) => {
            format!("No saved suite '{}'. Use 'sweet suites' to list them.", name)
        }
        _ => e.to_string(),
    }
}
