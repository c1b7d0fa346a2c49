//! Error types for the suite operator and its collaborators.

use thiserror::Error;

/// Errors raised by a package-resolution engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    #[error("Invalid package request: {0}")]
    InvalidRequest(String),

    #[error("Package not found: {0}")]
    PackageNotFound(String),

    #[error("Resolution engine error: {0}")]
    Engine(String),
}

/// Suite operation errors.
///
/// User-input and resolution errors are reported through the error channel and
/// leave the suite untouched. `Consistency` and `Validation` mean the in-memory
/// model can no longer be trusted and are always fatal.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SuiteError {
    #[error("Duplicated name {0:?}, no context changed.")]
    DuplicateName(String),

    #[error("Context {0:?} not exists, no context changed.")]
    UnknownContext(String),

    #[error("Invalid context name {0:?}: only letters, digits, '_', '.' and '-' are allowed.")]
    InvalidName(String),

    #[error("No tool aliased {alias:?} in context {context:?}.")]
    UnmatchedTool { context: String, alias: String },

    #[error("Invalid context order: {0}")]
    InvalidOrder(String),

    #[error("Failed to resolve context: {0}")]
    Resolution(#[from] ResolveError),

    #[error("Invalid suite: {0}")]
    Consistency(String),

    #[error("Context {context:?} failed validation: {source}")]
    Validation {
        context: String,
        #[source]
        source: ResolveError,
    },
}

impl SuiteError {
    /// Whether this error reflects corrupted internal state.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            SuiteError::Consistency(_) | SuiteError::Validation { .. }
        )
    }
}

/// Storage-related errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Saved suite not found: {0}")]
    SuiteNotFound(String),

    #[error("Unknown branch: {0}")]
    BranchNotFound(String),

    #[error("Invalid suite name: {0:?}")]
    InvalidName(String),

    #[error("Failed to serialize suite: {0}")]
    Serialize(String),

    #[error("Failed to parse suite file {path}: {message}")]
    Deserialize { path: String, message: String },

    #[error("Storage I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Top-level errors surfaced by the session, configuration and CLI layers.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Suite(#[from] SuiteError),

    #[error("Storage error: {0}")]
    StorageError(#[from] StorageError),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Tool not found: {0}")]
    ToolNotFound(String),

    #[error("Failed to launch {tool}: {source}")]
    Launch {
        tool: String,
        #[source]
        source: std::io::Error,
    },
}

impl From<config::ConfigError> for ApiError {
    fn from(err: config::ConfigError) -> Self {
        ApiError::ConfigError(err.to_string())
    }
}
