//! XDG directory resolution for configuration and saved suites.
//!
//! Explicit XDG variables win, then `$HOME`, then the platform defaults
//! reported by `directories`.

use crate::error::ApiError;
use directories::BaseDirs;
use std::path::PathBuf;

const APP_DIR: &str = "sweet";

fn from_env(var: &str, home_suffix: &[&str]) -> Option<PathBuf> {
    if let Some(dir) = std::env::var_os(var).filter(|v| !v.is_empty()) {
        return Some(PathBuf::from(dir));
    }
    std::env::var_os("HOME")
        .filter(|v| !v.is_empty())
        .map(|home| home_suffix.iter().fold(PathBuf::from(home), |p, s| p.join(s)))
}

/// `$XDG_CONFIG_HOME`, falling back to `~/.config`.
pub fn config_home() -> Result<PathBuf, ApiError> {
    from_env("XDG_CONFIG_HOME", &[".config"])
        .or_else(|| BaseDirs::new().map(|d| d.config_dir().to_path_buf()))
        .ok_or_else(|| ApiError::ConfigError("Could not determine config directory".to_string()))
}

/// `$XDG_DATA_HOME`, falling back to `~/.local/share`.
pub fn data_home() -> Result<PathBuf, ApiError> {
    from_env("XDG_DATA_HOME", &[".local", "share"])
        .or_else(|| BaseDirs::new().map(|d| d.data_dir().to_path_buf()))
        .ok_or_else(|| ApiError::ConfigError("Could not determine data directory".to_string()))
}

pub fn global_config_path() -> Result<PathBuf, ApiError> {
    Ok(config_home()?.join(APP_DIR).join("config.toml"))
}

/// Suite root used for the default branch when none is configured.
pub fn default_suite_root() -> Result<PathBuf, ApiError> {
    Ok(data_home()?.join(APP_DIR).join("suites"))
}
