//! Configuration loading facade.

use super::merge::merge_policy;
use super::paths;
use super::sources::{global_file, workspace_file};
use super::SweetConfig;
use crate::error::ApiError;
use config::{Config, ConfigBuilder, Environment, File};
use std::path::Path;
use tracing::debug;

/// Loads [`SweetConfig`] from layered sources.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration for a workspace.
    ///
    /// Precedence, lowest first: defaults, global file, `config/config.toml`,
    /// `config/{SWEET_ENV}.toml`, `SWEET__*` environment variables.
    pub fn load(workspace_root: &Path) -> Result<SweetConfig, ApiError> {
        let builder = merge_policy::builder_with_defaults()?;
        let builder = global_file::add_to_builder(builder)?;
        let builder = workspace_file::add_to_builder(builder, workspace_root)?;
        Self::finish(builder, workspace_root)
    }

    /// Load configuration from an explicit file, still honoring environment overrides.
    pub fn load_from_file(path: &Path) -> Result<SweetConfig, ApiError> {
        if !path.is_file() {
            return Err(ApiError::ConfigError(format!(
                "Config file not found: {}",
                path.display()
            )));
        }
        let builder = merge_policy::builder_with_defaults()?
            .add_source(File::from(path.to_path_buf()).required(true));
        let base = path.parent().unwrap_or_else(|| Path::new("."));
        Self::finish(builder, base)
    }

    fn finish(
        builder: ConfigBuilder<config::builder::DefaultState>,
        base: &Path,
    ) -> Result<SweetConfig, ApiError> {
        let settings: Config = builder
            .add_source(
                Environment::with_prefix("SWEET")
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()?;
        let mut config: SweetConfig = settings.try_deserialize()?;

        for root in config.suite_roots.values_mut() {
            if root.is_relative() && !root.as_os_str().is_empty() {
                *root = base.join(&*root);
            }
        }
        if let Some(catalog) = config.catalog.as_mut() {
            if catalog.is_relative() && !catalog.as_os_str().is_empty() {
                *catalog = base.join(&*catalog);
            }
        }

        if !config.suite_roots.contains_key(&config.default_branch) {
            let root = paths::default_suite_root()?;
            debug!(
                branch = %config.default_branch,
                root = %root.display(),
                "Using default suite root"
            );
            config
                .suite_roots
                .insert(config.default_branch.clone(), root);
        }

        config.validate().map_err(|errors| {
            ApiError::ConfigError(
                errors
                    .iter()
                    .map(|e| e.to_string())
                    .collect::<Vec<_>>()
                    .join("; "),
            )
        })?;
        Ok(config)
    }
}
