//! In-memory package catalog resolver.
//!
//! Request syntax: `family`, `family-1.2` (exact version) or `family-1.2+`
//! (minimum version). Requirements of picked variants are resolved
//! transitively; one family can only be picked once per resolve.

use super::{ContextResolver, ResolveStatus, ResolvedContext, ResolvedPackage, ResolvedTool};
use crate::error::{ApiError, ResolveError};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{BTreeMap, VecDeque};
use std::path::Path;
use tracing::debug;

/// One installable version of a package family.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageVariant {
    pub version: String,
    #[serde(default)]
    pub tools: Vec<String>,
    #[serde(default)]
    pub requires: Vec<String>,
    #[serde(default)]
    pub environ: BTreeMap<String, String>,
}

impl PackageVariant {
    pub fn new(version: &str) -> Self {
        Self {
            version: version.to_string(),
            tools: Vec::new(),
            requires: Vec::new(),
            environ: BTreeMap::new(),
        }
    }

    pub fn with_tools(mut self, tools: &[&str]) -> Self {
        self.tools.extend(tools.iter().map(|t| t.to_string()));
        self
    }

    pub fn with_requires(mut self, requires: &[&str]) -> Self {
        self.requires.extend(requires.iter().map(|r| r.to_string()));
        self
    }

    pub fn with_env(mut self, key: &str, value: &str) -> Self {
        self.environ.insert(key.to_string(), value.to_string());
        self
    }
}

/// Package families and their variants.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PackageCatalog {
    #[serde(default)]
    pub packages: BTreeMap<String, Vec<PackageVariant>>,
}

impl PackageCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a variant to a family.
    pub fn with_variant(mut self, family: &str, variant: PackageVariant) -> Self {
        self.add_variant(family, variant);
        self
    }

    /// Shorthand for a variant that only exposes tools.
    pub fn with_package(self, family: &str, version: &str, tools: &[&str]) -> Self {
        self.with_variant(family, PackageVariant::new(version).with_tools(tools))
    }

    pub fn add_variant(&mut self, family: &str, variant: PackageVariant) {
        self.packages
            .entry(family.to_string())
            .or_default()
            .push(variant);
    }

    /// Load a catalog from a TOML file.
    pub fn load_from_file(path: &Path) -> Result<Self, ApiError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ApiError::ConfigError(format!(
                "Failed to read package catalog {}: {}",
                path.display(),
                e
            ))
        })?;
        toml::from_str(&content).map_err(|e| {
            ApiError::ConfigError(format!(
                "Failed to parse package catalog {}: {}",
                path.display(),
                e
            ))
        })
    }

    /// Highest version of the family that satisfies the constraint.
    fn pick(&self, request: &Request) -> Option<&PackageVariant> {
        self.packages
            .get(&request.family)?
            .iter()
            .filter(|v| request.constraint.matches(&v.version))
            .max_by(|a, b| compare_versions(&a.version, &b.version))
    }

    fn has_variant(&self, family: &str, version: &str) -> bool {
        self.packages
            .get(family)
            .map(|variants| variants.iter().any(|v| v.version == version))
            .unwrap_or(false)
    }
}

impl ContextResolver for PackageCatalog {
    fn resolve(&self, requests: &[String]) -> Result<ResolvedContext, ResolveError> {
        let mut queue = requests
            .iter()
            .map(|r| parse_request(r))
            .collect::<Result<VecDeque<_>, _>>()?;

        let mut picked: BTreeMap<String, &PackageVariant> = BTreeMap::new();
        let mut order: Vec<String> = Vec::new();

        while let Some(request) = queue.pop_front() {
            if let Some(existing) = picked.get(&request.family) {
                if !request.constraint.matches(&existing.version) {
                    return Ok(ResolvedContext::failed(
                        requests,
                        format!(
                            "conflicting requests: {} already resolved to {}",
                            request.raw, existing.version
                        ),
                    ));
                }
                continue;
            }

            let variant = match self.pick(&request) {
                Some(v) => v,
                None if self.packages.contains_key(&request.family) => {
                    return Ok(ResolvedContext::failed(
                        requests,
                        format!("no version satisfies {}", request.raw),
                    ));
                }
                None => {
                    return Ok(ResolvedContext::failed(
                        requests,
                        format!("package not found: {}", request.raw),
                    ));
                }
            };

            for requirement in &variant.requires {
                let parsed = parse_request(requirement).map_err(|e| {
                    ResolveError::Engine(format!(
                        "{}-{} has a malformed requirement: {}",
                        request.family, variant.version, e
                    ))
                })?;
                queue.push_back(parsed);
            }

            order.push(request.family.clone());
            picked.insert(request.family, variant);
        }

        let mut packages = Vec::with_capacity(order.len());
        let mut tools = Vec::new();
        let mut environ = BTreeMap::new();

        for family in &order {
            let variant = picked[family];
            let package = ResolvedPackage {
                family: family.clone(),
                version: variant.version.clone(),
            };
            let qualified = package.qualified_name();
            for tool in &variant.tools {
                tools.push(ResolvedTool {
                    name: tool.clone(),
                    variant: qualified.clone(),
                });
            }
            environ.insert(
                format!("{}_VERSION", family.to_uppercase()),
                variant.version.clone(),
            );
            environ.extend(variant.environ.clone());
            packages.push(package);
        }

        environ.insert(
            "SWEET_RESOLVED_PACKAGES".to_string(),
            packages
                .iter()
                .map(ResolvedPackage::qualified_name)
                .collect::<Vec<_>>()
                .join(" "),
        );
        environ.insert("SWEET_REQUEST".to_string(), requests.join(" "));

        debug!(packages = packages.len(), tools = tools.len(), "Resolved context");

        Ok(ResolvedContext {
            requests: requests.to_vec(),
            status: ResolveStatus::Solved,
            created_at: Utc::now(),
            packages,
            tools,
            environ,
            failure: None,
        })
    }

    fn validate(&self, context: &ResolvedContext) -> Result<(), ResolveError> {
        if !context.success() {
            return Ok(());
        }
        for package in &context.packages {
            if !self.has_variant(&package.family, &package.version) {
                return Err(ResolveError::PackageNotFound(package.qualified_name()));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum VersionConstraint {
    Any,
    Exact(String),
    AtLeast(String),
}

impl VersionConstraint {
    fn matches(&self, version: &str) -> bool {
        match self {
            VersionConstraint::Any => true,
            VersionConstraint::Exact(v) => compare_versions(version, v) == Ordering::Equal,
            VersionConstraint::AtLeast(v) => compare_versions(version, v) != Ordering::Less,
        }
    }
}

#[derive(Debug, Clone)]
struct Request {
    raw: String,
    family: String,
    constraint: VersionConstraint,
}

fn valid_family(family: &str) -> bool {
    !family.is_empty() && family.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn valid_version(version: &str) -> bool {
    !version.is_empty()
        && version
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '_')
}

fn parse_request(raw: &str) -> Result<Request, ResolveError> {
    let trimmed = raw.trim();
    let (family, constraint) = match trimmed.split_once('-') {
        None => (trimmed, VersionConstraint::Any),
        Some((family, spec)) => {
            let constraint = match spec.strip_suffix('+') {
                Some(min) => VersionConstraint::AtLeast(min.to_string()),
                None => VersionConstraint::Exact(spec.to_string()),
            };
            let version = match &constraint {
                VersionConstraint::AtLeast(v) | VersionConstraint::Exact(v) => v.as_str(),
                VersionConstraint::Any => "",
            };
            if !valid_version(version) {
                return Err(ResolveError::InvalidRequest(raw.to_string()));
            }
            (family, constraint)
        }
    };
    if !valid_family(family) {
        return Err(ResolveError::InvalidRequest(raw.to_string()));
    }
    Ok(Request {
        raw: trimmed.to_string(),
        family: family.to_string(),
        constraint,
    })
}

/// Family named by a request string, if it parses.
pub(crate) fn request_family(raw: &str) -> Option<&str> {
    let trimmed = raw.trim();
    let family = trimmed.split_once('-').map_or(trimmed, |(f, _)| f);
    valid_family(family).then_some(family)
}

/// Compare dotted versions token by token; numeric tokens compare numerically.
fn compare_versions(a: &str, b: &str) -> Ordering {
    let mut left = a.split('.');
    let mut right = b.split('.');
    loop {
        match (left.next(), right.next()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(x), Some(y)) => {
                let ord = match (x.parse::<u64>(), y.parse::<u64>()) {
                    (Ok(x), Ok(y)) => x.cmp(&y),
                    _ => x.cmp(y),
                };
                if ord != Ordering::Equal {
                    return ord;
                }
            }
        }
    }
}
