//! Integration tests for CLI routing over saved suites

use sweet::cli::{Commands, OutputFormat, RunContext};
use sweet::config::SweetConfig;
use sweet::error::ApiError;
use tempfile::TempDir;

const CATALOG: &str = r#"
[[packages.maya]]
version = "2024.1"
tools = ["maya", "mayapy", "build"]

[[packages.nuke]]
version = "14.0"
tools = ["nuke", "build"]

[[packages.shellkit]]
version = "1.0"
tools = ["sh"]

[packages.shellkit.environ]
SHELLKIT_HOME = "/opt/shellkit"
"#;

fn run_context(temp: &TempDir) -> RunContext {
    let catalog = temp.path().join("packages.toml");
    std::fs::write(&catalog, CATALOG).unwrap();

    let mut config = SweetConfig::default();
    config
        .suite_roots
        .insert("local".to_string(), temp.path().join("local"));
    config
        .suite_roots
        .insert("release".to_string(), temp.path().join("release"));
    config.catalog = Some(catalog);
    RunContext::from_config(config).unwrap().with_color(false)
}

fn save_show(ctx: &RunContext) {
    let session = ctx.session();
    let mut op = session.new_suite();
    op.set_description("show suite");
    op.add_context("dcc", &["maya"]).unwrap();
    op.add_context("comp", &["nuke"]).unwrap();
    op.add_context("shell", &["shellkit"]).unwrap();
    session.save(&mut op, Some("release"), "show").unwrap();
}

#[test]
fn test_suites_json_lists_saved() {
    let temp = TempDir::new().unwrap();
    let ctx = run_context(&temp);
    save_show(&ctx);

    let out = ctx
        .execute(&Commands::Suites {
            branch: Some("release".to_string()),
            format: OutputFormat::Json,
        })
        .unwrap();
    let value: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(value["suites"].as_array().unwrap().len(), 1);
    assert_eq!(value["suites"][0]["name"], "show");

    let local = ctx
        .execute(&Commands::Suites {
            branch: Some("local".to_string()),
            format: OutputFormat::Text,
        })
        .unwrap();
    assert_eq!(local, "No saved suites found.");
}

#[test]
fn test_contexts_text_in_priority_order() {
    let temp = TempDir::new().unwrap();
    let ctx = run_context(&temp);
    save_show(&ctx);

    let out = ctx
        .execute(&Commands::Contexts {
            branch: "release".to_string(),
            suite: "show".to_string(),
            format: OutputFormat::Text,
        })
        .unwrap();
    let shell = out.find("shell").unwrap();
    let comp = out.find("comp").unwrap();
    let dcc = out.find("dcc").unwrap();
    assert!(shell < comp && comp < dcc);
}

#[test]
fn test_tools_all_includes_shadowed() {
    let temp = TempDir::new().unwrap();
    let ctx = run_context(&temp);
    save_show(&ctx);

    let out = ctx
        .execute(&Commands::Tools {
            branch: "release".to_string(),
            suite: "show".to_string(),
            all: true,
            format: OutputFormat::Json,
        })
        .unwrap();
    let value: serde_json::Value = serde_json::from_str(&out).unwrap();
    let build: Vec<_> = value["tools"]
        .as_array()
        .unwrap()
        .iter()
        .filter(|t| t["alias"] == "build")
        .map(|t| (t["ctx_name"].clone(), t["visibility"].clone()))
        .collect();
    assert_eq!(
        build,
        vec![
            (serde_json::json!("comp"), serde_json::json!("visible")),
            (serde_json::json!("dcc"), serde_json::json!("shadowed")),
        ]
    );
}

#[test]
fn test_unknown_branch_is_reported() {
    let temp = TempDir::new().unwrap();
    let ctx = run_context(&temp);
    let err = ctx
        .execute(&Commands::Suites {
            branch: Some("nightly".to_string()),
            format: OutputFormat::Text,
        })
        .unwrap_err();
    assert!(sweet::cli::map_error(&err).contains("nightly"));
}

#[cfg(unix)]
#[test]
fn test_run_tool_uses_context_environment() {
    let temp = TempDir::new().unwrap();
    let ctx = run_context(&temp);
    save_show(&ctx);
    let saved = ctx.session().find_saved("release", "show").unwrap();

    let code = ctx
        .run_tool(
            &saved.filepath,
            "sh",
            &[
                "-c".to_string(),
                "test \"$SHELLKIT_VERSION\" = 1.0 && test \"$SHELLKIT_HOME\" = /opt/shellkit"
                    .to_string(),
            ],
        )
        .unwrap();
    assert_eq!(code, 0);

    let code = ctx
        .run_tool(&saved.filepath, "sh", &["-c".to_string(), "exit 3".to_string()])
        .unwrap();
    assert_eq!(code, 3);

    assert!(matches!(
        ctx.run_tool(&saved.filepath, "houdini", &[]),
        Err(ApiError::ToolNotFound(_))
    ));
}

#[cfg(unix)]
#[test]
fn test_saved_wrappers_call_run() {
    let temp = TempDir::new().unwrap();
    let ctx = run_context(&temp);
    save_show(&ctx);
    let saved = ctx.session().find_saved("release", "show").unwrap();

    let wrapper = std::fs::read_to_string(saved.bin.join("nuke")).unwrap();
    assert!(wrapper.starts_with("#!/bin/sh\n"));
    assert!(wrapper.contains("sweet run"));
    assert!(wrapper.contains(&saved.filepath.display().to_string()));

    use std::os::unix::fs::PermissionsExt;
    let mode = std::fs::metadata(saved.bin.join("nuke"))
        .unwrap()
        .permissions()
        .mode();
    assert_eq!(mode & 0o111, 0o111);
}
