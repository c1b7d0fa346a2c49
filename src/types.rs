//! Shared identifier types.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Context priority. Higher values win tool conflicts.
pub type Priority = i64;

/// Opaque context identifier.
///
/// Generated from a random 128-bit UUID, so ids are unique across every suite
/// in the process and never derived from the user-facing name.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContextId(String);

impl ContextId {
    /// Generate a fresh identifier.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().simple().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContextId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A caller-supplied reference to a context, resolved once at the API boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContextRef {
    Id(ContextId),
    Name(String),
}

impl From<ContextId> for ContextRef {
    fn from(id: ContextId) -> Self {
        ContextRef::Id(id)
    }
}

impl From<&ContextId> for ContextRef {
    fn from(id: &ContextId) -> Self {
        ContextRef::Id(id.clone())
    }
}

impl From<&str> for ContextRef {
    fn from(name: &str) -> Self {
        ContextRef::Name(name.to_string())
    }
}

impl From<String> for ContextRef {
    fn from(name: String) -> Self {
        ContextRef::Name(name)
    }
}

impl fmt::Display for ContextRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContextRef::Id(id) => write!(f, "{}", id),
            ContextRef::Name(name) => f.write_str(name),
        }
    }
}
