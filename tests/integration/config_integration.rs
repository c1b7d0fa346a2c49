//! Integration tests for Configuration System

use crate::integration::with_xdg_env;
use std::path::PathBuf;
use sweet::config::{xdg, ConfigLoader};
use sweet::error::ApiError;
use sweet::session::Session;
use sweet::suite::ErrorChannel;
use tempfile::TempDir;

#[test]
fn test_defaults_root_default_branch_in_data_home() {
    let test_dir = TempDir::new().unwrap();
    with_xdg_env(&test_dir, || {
        let workspace = test_dir.path().join("workspace");
        std::fs::create_dir_all(&workspace).unwrap();

        let config = ConfigLoader::load(&workspace).unwrap();
        assert_eq!(config.default_branch, "local");
        assert_eq!(
            config.suite_roots.get("local"),
            Some(&test_dir.path().join("data").join("sweet").join("suites"))
        );
        assert!(config.catalog.is_none());
        assert!(config.logging.enabled);
    });
}

#[test]
fn test_xdg_paths_follow_environment() {
    let test_dir = TempDir::new().unwrap();
    with_xdg_env(&test_dir, || {
        assert_eq!(xdg::config_home().unwrap(), test_dir.path().join("config"));
        assert_eq!(xdg::data_home().unwrap(), test_dir.path().join("data"));

        std::env::remove_var("XDG_CONFIG_HOME");
        assert_eq!(
            xdg::config_home().unwrap(),
            test_dir.path().join("home").join(".config")
        );
    });
}

#[test]
fn test_workspace_overrides_global() {
    let test_dir = TempDir::new().unwrap();
    with_xdg_env(&test_dir, || {
        let global = test_dir.path().join("config").join("sweet");
        std::fs::create_dir_all(&global).unwrap();
        std::fs::write(
            global.join("config.toml"),
            r#"
default_branch = "studio"

[suite_roots]
studio = "/studio/suites"
local = "/home/me/suites"

[logging]
level = "info"
"#,
        )
        .unwrap();

        let workspace = test_dir.path().join("workspace");
        std::fs::create_dir_all(workspace.join("config")).unwrap();
        std::fs::write(
            workspace.join("config").join("config.toml"),
            r#"
[suite_roots]
local = "/show/suites"
"#,
        )
        .unwrap();

        let config = ConfigLoader::load(&workspace).unwrap();
        assert_eq!(config.default_branch, "studio");
        assert_eq!(
            config.suite_roots.get("studio"),
            Some(&PathBuf::from("/studio/suites"))
        );
        assert_eq!(
            config.suite_roots.get("local"),
            Some(&PathBuf::from("/show/suites"))
        );
        assert_eq!(config.logging.level, "info");
    });
}

#[test]
fn test_environment_specific_workspace_file() {
    let test_dir = TempDir::new().unwrap();
    with_xdg_env(&test_dir, || {
        let workspace = test_dir.path().join("workspace");
        let config_dir = workspace.join("config");
        std::fs::create_dir_all(&config_dir).unwrap();
        std::fs::write(config_dir.join("config.toml"), "catalog = \"base.toml\"\n").unwrap();
        std::fs::write(config_dir.join("farm.toml"), "catalog = \"farm.toml\"\n").unwrap();

        std::env::set_var("SWEET_ENV", "farm");
        let config = ConfigLoader::load(&workspace).unwrap();
        assert_eq!(config.catalog, Some(workspace.join("farm.toml")));
    });
}

#[test]
fn test_load_from_file_with_catalog_builds_session() {
    let test_dir = TempDir::new().unwrap();
    with_xdg_env(&test_dir, || {
        let config_file = test_dir.path().join("sweet.toml");
        std::fs::write(
            &config_file,
            r#"
catalog = "packages.toml"

[suite_roots]
local = "suites/local"
release = "suites/release"
"#,
        )
        .unwrap();
        std::fs::write(
            test_dir.path().join("packages.toml"),
            r#"
[[packages.maya]]
version = "2024.1"
tools = ["maya"]
"#,
        )
        .unwrap();

        let config = ConfigLoader::load_from_file(&config_file).unwrap();
        assert!(config.validate().is_ok());

        let session = Session::from_config(&config, ErrorChannel::new()).unwrap();
        assert_eq!(session.branches().collect::<Vec<_>>(), vec!["local", "release"]);
        let mut op = session.new_suite();
        let id = op.add_context("dcc", &["maya"]).unwrap().unwrap();
        assert_eq!(op.lookup_tool(&id, "maya"), Some("maya".to_string()));
    });
}

#[test]
fn test_invalid_config_reports_every_problem() {
    let test_dir = TempDir::new().unwrap();
    with_xdg_env(&test_dir, || {
        let config_file = test_dir.path().join("sweet.toml");
        std::fs::write(
            &config_file,
            r#"
catalog = ""

[suite_roots]
"a/b" = "/tmp/x"
"#,
        )
        .unwrap();

        match ConfigLoader::load_from_file(&config_file) {
            Err(ApiError::ConfigError(message)) => {
                assert!(message.contains("a/b"));
                assert!(message.contains("Catalog"));
            }
            other => panic!("expected config error, got {:?}", other.map(|_| ())),
        }
    });
}

#[test]
fn test_missing_catalog_file_is_config_error() {
    let test_dir = TempDir::new().unwrap();
    with_xdg_env(&test_dir, || {
        let config_file = test_dir.path().join("sweet.toml");
        std::fs::write(&config_file, "catalog = \"nowhere.toml\"\n").unwrap();

        let config = ConfigLoader::load_from_file(&config_file).unwrap();
        assert!(matches!(
            Session::from_config(&config, ErrorChannel::new()),
            Err(ApiError::ConfigError(_))
        ));
    });
}
