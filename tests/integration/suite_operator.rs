//! Integration tests for suite operator lifecycle and error reporting

use crate::integration::{catalog, collecting_suite};
use std::collections::BTreeSet;
use sweet::error::{ResolveError, SuiteError};
use sweet::suite::{ContextOrder, ContextUpdate, ErrorChannel, SuiteOp, ToolVisibility};
use sweet::types::ContextRef;

fn names(op: &SuiteOp) -> Vec<String> {
    op.iter_contexts(ContextOrder::PriorityDescending)
        .into_iter()
        .map(|c| c.name)
        .collect()
}

#[test]
fn test_duplicate_add_keeps_single_context() {
    let (mut op, sink) = collecting_suite();

    assert!(op.add_context("a", &[]).unwrap().is_some());
    assert!(op.add_context("a", &[]).unwrap().is_none());

    assert_eq!(names(&op), vec!["a"]);
    let reported = sink.take();
    assert_eq!(reported.len(), 1);
    assert_eq!(reported[0].error, SuiteError::DuplicateName("a".to_string()));
    assert!(!reported[0].fatal);
    assert_eq!(reported[0].sender, "SuiteOp");
    op.sanity_check().unwrap();
}

#[test]
fn test_new_contexts_take_precedence() {
    let (mut op, _sink) = collecting_suite();
    op.add_context("base", &["maya"]).unwrap();
    op.add_context("comp", &["nuke"]).unwrap();
    op.add_context("fx", &["houdini"]).unwrap();

    let priorities: Vec<_> = op
        .iter_contexts(ContextOrder::PriorityDescending)
        .into_iter()
        .map(|c| (c.name, c.priority))
        .collect();
    assert_eq!(
        priorities,
        vec![
            ("fx".to_string(), 3),
            ("comp".to_string(), 2),
            ("base".to_string(), 1)
        ]
    );
    assert_eq!(names(&op).len(), 3);
    let ascending: Vec<_> = op
        .iter_contexts(ContextOrder::PriorityAscending)
        .into_iter()
        .map(|c| c.name)
        .collect();
    assert_eq!(ascending, vec!["base", "comp", "fx"]);
}

#[test]
fn test_drop_unknown_context_is_silent() {
    let (mut op, sink) = collecting_suite();
    let id = op.add_context("a", &["maya"]).unwrap().unwrap();

    assert!(op.drop_context(&id));
    assert!(!op.drop_context(&id));
    assert!(!op.drop_context("never-existed"));

    assert!(op.is_empty());
    assert!(sink.is_empty());
    op.sanity_check().unwrap();
}

#[test]
fn test_drop_unknown_context_without_listener() {
    let mut op = SuiteOp::new(catalog(), ErrorChannel::new());
    assert!(!op.drop_context("ghost"));
    op.sanity_check().unwrap();
}

#[test]
fn test_rename_to_own_name_is_noop() {
    let (mut op, sink) = collecting_suite();
    let id = op.add_context("dcc", &["maya"]).unwrap().unwrap();
    op.add_context("comp", &["nuke"]).unwrap();
    let before = op.resolve_tools();

    assert!(op.rename_context(&id, "dcc").unwrap());

    assert_eq!(op.resolve_tools(), before);
    assert!(sink.is_empty());
}

#[test]
fn test_rename_keeps_identity() {
    let (mut op, sink) = collecting_suite();
    let id = op.add_context("dcc", &["maya"]).unwrap().unwrap();
    let other = op.add_context("comp", &["nuke"]).unwrap().unwrap();

    assert!(op.rename_context(&id, "layout").unwrap());
    assert_eq!(op.lookup_context(&id), Some("layout"));
    assert_eq!(op.find_context("layout"), Some(id.clone()));
    assert_eq!(op.find_context("dcc"), None);

    // tools follow the id, not the old name
    let tools = op.resolve_tools();
    assert!(tools
        .iter()
        .filter(|t| t.ctx_id == id)
        .all(|t| t.ctx_name == "layout"));

    assert!(!op.rename_context(&other, "layout").unwrap());
    assert_eq!(
        sink.take()[0].error,
        SuiteError::DuplicateName("layout".to_string())
    );
    assert_eq!(op.lookup_context(&other), Some("comp"));
}

#[test]
fn test_unknown_context_errors_are_reported() {
    let (mut op, sink) = collecting_suite();
    op.add_context("dcc", &["maya"]).unwrap();

    assert!(!op.rename_context("ghost", "x").unwrap());
    assert!(!op
        .update_context("ghost", ContextUpdate::new().prefix("g_"))
        .unwrap());
    assert!(!op.update_tool("ghost", "maya", None, Some(true)).unwrap());

    let reported = sink.take();
    assert_eq!(reported.len(), 3);
    assert!(reported
        .iter()
        .all(|r| matches!(r.error, SuiteError::UnknownContext(_)) && !r.fatal));
}

#[test]
fn test_unhandled_errors_escalate() {
    let mut op = SuiteOp::new(catalog(), ErrorChannel::new());
    op.add_context("a", &[]).unwrap();

    assert_eq!(
        op.add_context("a", &[]),
        Err(SuiteError::DuplicateName("a".to_string()))
    );
    assert!(matches!(
        op.rename_context("ghost", "b"),
        Err(SuiteError::UnknownContext(_))
    ));
    assert_eq!(op.len(), 1);
}

#[test]
fn test_failed_resolution_contributes_nothing() {
    let (mut op, sink) = collecting_suite();
    let id = op
        .add_context("broken", &["maya-2023.3", "mtoa"])
        .unwrap()
        .expect("failed resolutions still create the context");

    let entry = op.context(&id).unwrap();
    assert!(!entry.context.success());
    assert!(entry.context.failure.is_some());
    assert!(op.resolve_tools().is_empty());
    assert!(sink.is_empty());
}

#[test]
fn test_engine_error_substitutes_failed_context() {
    let (mut op, sink) = collecting_suite();
    let id = op.add_context("bad", &["maya", ""]).unwrap().unwrap();

    let entry = op.context(&id).unwrap();
    assert!(!entry.context.success());
    assert_eq!(entry.requests, vec!["maya".to_string(), String::new()]);

    let reported = sink.take();
    assert_eq!(reported.len(), 1);
    assert!(matches!(
        reported[0].error,
        SuiteError::Resolution(ResolveError::InvalidRequest(_))
    ));
    assert!(!reported[0].fatal);
}

#[test]
fn test_update_context_re_resolves() {
    let (mut op, sink) = collecting_suite();
    let id = op.add_context("dcc", &["maya-2023.3"]).unwrap().unwrap();

    op.update_context(&id, ContextUpdate::new().requests(&["mtoa"]))
        .unwrap();
    let entry = op.context(&id).unwrap();
    assert_eq!(entry.requests, vec!["mtoa".to_string()]);
    assert!(entry.context.has_package("maya"));
    assert_eq!(
        entry.context.shell_environment().get("MAYA_VERSION"),
        Some(&"2024.1".to_string())
    );
    assert_eq!(
        entry.context.shell_environment().get("ARNOLD_LICENSE"),
        Some(&"studio".to_string())
    );
    assert!(op
        .resolve_tools()
        .iter()
        .any(|t| t.name == "kick" && t.visibility == ToolVisibility::Visible));
    assert!(sink.is_empty());
}

#[test]
fn test_prefix_and_suffix_decorate_default_aliases() {
    let (mut op, _sink) = collecting_suite();
    let id = op.add_context("dcc", &["maya"]).unwrap().unwrap();
    op.update_context(&id, ContextUpdate::new().prefix("old_").suffix("_24"))
        .unwrap();

    let aliases: BTreeSet<_> = op
        .tool_table()
        .visible()
        .iter()
        .map(|t| t.alias.clone())
        .collect();
    assert!(aliases.contains("old_maya_24"));
    assert!(aliases.contains("old_build_24"));

    // an explicit alias is not decorated
    op.update_tool(&id, "old_maya_24", Some("maya2024"), None)
        .unwrap();
    assert_eq!(op.lookup_tool(&id, "maya2024"), Some("maya".to_string()));
    assert_eq!(op.lookup_tool(&id, "old_maya_24"), None);
}

#[test]
fn test_unmatched_tool_is_reported() {
    let (mut op, sink) = collecting_suite();
    let id = op.add_context("dcc", &["maya"]).unwrap().unwrap();

    assert!(!op.update_tool(&id, "nuke", None, Some(true)).unwrap());
    let reported = sink.take();
    assert!(matches!(
        &reported[0].error,
        SuiteError::UnmatchedTool { context, alias } if context == "dcc" && alias == "nuke"
    ));
}

#[test]
fn test_iter_contexts_returns_copies() {
    let (mut op, _sink) = collecting_suite();
    let id = op.add_context("dcc", &["maya"]).unwrap().unwrap();

    let mut snapshot = op.iter_contexts(ContextOrder::PriorityDescending);
    snapshot[0].context.tools.clear();
    snapshot[0].name = "tampered".to_string();

    let entry = op.context(ContextRef::Id(id)).unwrap();
    assert_eq!(entry.name, "dcc");
    assert!(!entry.context.tools().is_empty());
}

#[test]
fn test_find_contexts_by_request_and_resolve() {
    let (mut op, _sink) = collecting_suite();
    let dcc = op.add_context("dcc", &["maya"]).unwrap().unwrap();
    let render = op.add_context("render", &["mtoa"]).unwrap().unwrap();
    op.add_context("comp", &["nuke"]).unwrap();

    assert_eq!(op.find_contexts(Some("maya"), None), vec![dcc.clone()]);
    assert_eq!(
        op.find_contexts(None, Some("maya")),
        vec![render.clone(), dcc]
    );
    assert_eq!(op.find_contexts(Some("mtoa"), Some("maya")), vec![render]);
    assert_eq!(op.find_contexts(None, None).len(), 3);
}

#[test]
fn test_reorder_contexts() {
    let (mut op, sink) = collecting_suite();
    let a = op.add_context("a", &["maya"]).unwrap().unwrap();
    let b = op.add_context("b", &["nuke"]).unwrap().unwrap();
    let c = op.add_context("c", &["houdini"]).unwrap().unwrap();

    assert!(op.reorder_contexts(&[a.clone(), c, b.clone()]).unwrap());
    assert_eq!(names(&op), vec!["a", "c", "b"]);
    assert_eq!(
        op.tool_table().visible_tool("build").map(|t| t.ctx_id.clone()),
        Some(a.clone())
    );

    assert!(!op.reorder_contexts(&[a.clone(), b.clone()]).unwrap());
    assert!(!op.reorder_contexts(&[a.clone(), a, b]).unwrap());
    let reported = sink.take();
    assert_eq!(reported.len(), 2);
    assert!(reported
        .iter()
        .all(|r| matches!(r.error, SuiteError::InvalidOrder(_))));
    assert_eq!(names(&op), vec!["a", "c", "b"]);
}

#[test]
fn test_invalid_names_rejected() {
    let (mut op, sink) = collecting_suite();
    assert!(op.add_context("", &[]).unwrap().is_none());
    assert!(op.add_context("has space", &[]).unwrap().is_none());
    let id = op.add_context("ok-name_1.2", &[]).unwrap().unwrap();
    assert!(!op.rename_context(&id, "bad/name").unwrap());

    let reported = sink.take();
    assert_eq!(reported.len(), 3);
    assert!(reported
        .iter()
        .all(|r| matches!(r.error, SuiteError::InvalidName(_))));
}

#[test]
fn test_metadata_setters() {
    let (mut op, _sink) = collecting_suite();
    op.set_name("show");
    op.set_description("lighting suite");
    op.set_load_path("/suites/show/suite.toml");
    assert_eq!(op.name(), "show");
    assert_eq!(op.description(), "lighting suite");
    assert_eq!(
        op.load_path(),
        Some(std::path::Path::new("/suites/show/suite.toml"))
    );
}
