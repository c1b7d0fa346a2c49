//! Resolved Contexts
//!
//! The contract between the suite operator and a package-resolution engine. The
//! operator only ever sees a [`ResolvedContext`]: either a solved environment
//! exposing tools, or a failed one that exposes nothing.

use crate::error::ResolveError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub mod catalog;

pub use catalog::{PackageCatalog, PackageVariant};

/// Outcome of a resolve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolveStatus {
    Solved,
    Failed,
}

/// One package picked by a resolve.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedPackage {
    pub family: String,
    pub version: String,
}

impl ResolvedPackage {
    /// Qualified variant name, e.g. `maya-2024.1`.
    pub fn qualified_name(&self) -> String {
        format!("{}-{}", self.family, self.version)
    }
}

/// A tool exposed by a resolved package.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ResolvedTool {
    pub name: String,
    /// Qualified name of the providing package variant.
    pub variant: String,
}

/// A resolved (or failed) package environment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedContext {
    pub requests: Vec<String>,
    pub status: ResolveStatus,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub packages: Vec<ResolvedPackage>,
    #[serde(default)]
    pub tools: Vec<ResolvedTool>,
    #[serde(default)]
    pub environ: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure: Option<String>,
}

impl ResolvedContext {
    /// A failed resolution that exposes no packages and no tools.
    pub fn failed(requests: &[String], reason: impl Into<String>) -> Self {
        Self {
            requests: requests.to_vec(),
            status: ResolveStatus::Failed,
            created_at: Utc::now(),
            packages: Vec::new(),
            tools: Vec::new(),
            environ: BTreeMap::new(),
            failure: Some(reason.into()),
        }
    }

    pub fn success(&self) -> bool {
        self.status == ResolveStatus::Solved
    }

    /// Tools contributed by this context; empty unless solved.
    pub fn tools(&self) -> &[ResolvedTool] {
        if self.success() {
            &self.tools
        } else {
            &[]
        }
    }

    /// Environment a shell should export to enter this context.
    pub fn shell_environment(&self) -> BTreeMap<String, String> {
        if self.success() {
            self.environ.clone()
        } else {
            BTreeMap::new()
        }
    }

    /// Whether a package family was picked by this resolve.
    pub fn has_package(&self, family: &str) -> bool {
        self.packages.iter().any(|p| p.family == family)
    }

    /// Whether any request names the given package family.
    pub fn requests_family(&self, family: &str) -> bool {
        self.requests
            .iter()
            .any(|r| catalog::request_family(r) == Some(family))
    }
}

/// A package-resolution engine.
///
/// `resolve` returns `Ok` with a failed context for unsatisfiable requests and
/// reserves `Err` for engine-level problems such as malformed requests.
pub trait ContextResolver: Send + Sync {
    fn resolve(&self, requests: &[String]) -> Result<ResolvedContext, ResolveError>;

    /// Structural validation of a previously resolved context.
    fn validate(&self, _context: &ResolvedContext) -> Result<(), ResolveError> {
        Ok(())
    }
}
