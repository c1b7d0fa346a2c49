//! Integration tests for tool conflict resolution across contexts

use crate::integration::collecting_suite;
use sweet::suite::{SuiteOp, ToolVisibility};
use sweet::types::ContextId;

/// Three contexts at priorities 1, 2, 3 (fx highest), each exposing `build`.
fn three_way() -> (SuiteOp, ContextId, ContextId, ContextId) {
    let (mut op, _sink) = collecting_suite();
    let base = op.add_context("base", &["maya"]).unwrap().unwrap();
    let comp = op.add_context("comp", &["nuke"]).unwrap().unwrap();
    let fx = op.add_context("fx", &["houdini"]).unwrap().unwrap();
    (op, base, comp, fx)
}

#[test]
fn test_three_way_shadowing() {
    let (op, base, comp, fx) = three_way();

    let table = op.tool_table();
    let winner = table.visible_tool("build").unwrap();
    assert_eq!(winner.ctx_id, fx);
    assert_eq!(winner.variant.as_deref(), Some("houdini-20.0"));

    let losers = table.conflicts("build");
    assert_eq!(losers.len(), 2);
    assert_eq!(losers[0].ctx_id, comp);
    assert_eq!(losers[1].ctx_id, base);
    assert!(losers
        .iter()
        .all(|t| t.visibility == ToolVisibility::Shadowed && t.shadowed_by == Some(fx.clone())));
}

#[test]
fn test_hide_promotes_next_priority() {
    let (mut op, base, comp, fx) = three_way();

    assert!(op.update_tool(&fx, "build", None, Some(true)).unwrap());

    let table = op.tool_table();
    assert_eq!(table.visible_tool("build").unwrap().ctx_id, comp);
    assert_eq!(table.hidden().len(), 1);
    assert_eq!(table.hidden()[0].ctx_id, fx);
    let losers = table.conflicts("build");
    assert_eq!(losers.len(), 1);
    assert_eq!(losers[0].ctx_id, base);
    assert_eq!(losers[0].shadowed_by, Some(comp.clone()));

    // unhiding restores the original winner
    assert!(op.update_tool(&fx, "build", None, Some(false)).unwrap());
    assert_eq!(op.tool_table().visible_tool("build").unwrap().ctx_id, fx);
}

#[test]
fn test_lookup_tool_sees_through_shadowing() {
    let (mut op, base, _comp, fx) = three_way();

    assert_eq!(op.lookup_tool(&base, "build"), Some("build".to_string()));
    assert_eq!(op.lookup_tool(&base, "hython"), None);

    // a shadowed alias can still be aliased away
    assert!(op
        .update_tool(&base, "build", Some("maya_build"), None)
        .unwrap());
    let table = op.tool_table();
    assert_eq!(table.visible_tool("maya_build").unwrap().ctx_id, base);
    assert_eq!(table.visible_tool("build").unwrap().ctx_id, fx);
    assert_eq!(table.conflicts("build").len(), 1);

    // an empty alias restores the default name
    assert!(op.update_tool(&base, "maya_build", Some(""), None).unwrap());
    assert_eq!(op.tool_table().conflicts("build").len(), 2);
}

#[test]
fn test_hidden_tools_stay_addressable() {
    let (mut op, base, _comp, _fx) = three_way();
    op.update_tool(&base, "mayapy", None, Some(true)).unwrap();

    assert_eq!(op.lookup_tool(&base, "mayapy"), Some("mayapy".to_string()));
    assert!(op.tool_table().visible_tool("mayapy").is_none());
    assert!(op.update_tool(&base, "mayapy", None, Some(false)).unwrap());
    assert!(op.tool_table().visible_tool("mayapy").is_some());
}

#[test]
fn test_resolve_tools_category_order() {
    let (mut op, base, _comp, _fx) = three_way();
    op.update_tool(&base, "maya", None, Some(true)).unwrap();

    let tools = op.resolve_tools();
    let categories: Vec<_> = tools.iter().map(|t| t.visibility).collect();
    let first_hidden = categories
        .iter()
        .position(|v| *v == ToolVisibility::Hidden)
        .unwrap();
    let first_shadowed = categories
        .iter()
        .position(|v| *v == ToolVisibility::Shadowed)
        .unwrap();
    assert!(categories[..first_hidden]
        .iter()
        .all(|v| *v == ToolVisibility::Visible));
    assert!(first_hidden < first_shadowed);

    // visible tools: contexts in priority order, tools sorted within each
    let visible: Vec<_> = tools
        .iter()
        .filter(|t| t.visibility == ToolVisibility::Visible)
        .map(|t| (t.ctx_name.as_str(), t.alias.as_str()))
        .collect();
    assert_eq!(
        visible,
        vec![
            ("fx", "build"),
            ("fx", "houdini"),
            ("fx", "hython"),
            ("comp", "nuke"),
            ("base", "mayapy"),
        ]
    );
}

#[test]
fn test_resolution_is_deterministic() {
    let (op, _base, _comp, _fx) = three_way();
    assert_eq!(op.resolve_tools(), op.resolve_tools());
    assert_eq!(op.tool_table(), op.tool_table());
}
