use super::*;

use convoy_core::test_support::TestNode;
use convoy_core::{plan_fn, PhaseMap, PlanFn, Target};

fn noop() -> PlanFn {
    plan_fn(|_s| async { Ok(serde_json::Value::Null) })
}

fn web() -> GroupSpec {
    GroupSpec::builder("web").count(2).phase("configure", noop()).build().unwrap()
}

fn node_target(id: &str) -> Target {
    Target::for_node("web".into(), TestNode::tagged(id, "web-0", "web").handle(), PhaseMap::new())
}

#[test]
fn empty_name_is_rejected() {
    let err = GroupSpec::builder("").build().unwrap_err();
    assert!(matches!(err, SpecError::EmptyGroupName));
}

#[test]
fn roles_coerce_to_a_set() {
    let group = GroupSpec::builder("web")
        .roles(["frontend", "frontend", "lb"])
        .build()
        .unwrap();
    assert_eq!(group.roles.len(), 2);
}

#[test]
fn default_filter_prefers_tag() {
    let group = web();

    assert!(group.accepts(&TestNode::tagged("n1", "whatever", "web")));
    assert!(!group.accepts(&TestNode::tagged("n2", "web-0", "db")));
}

#[test]
fn default_filter_falls_back_to_base_name() {
    let group = web();

    assert!(group.accepts(&TestNode::untaggable("n1", "web-3")));
    assert!(!group.accepts(&TestNode::untaggable("n2", "db-1")));
    // taggable node with no tag at all: base name decides
    assert!(group.accepts(&TestNode::new("n3", "web")));
}

#[test]
fn custom_filter_overrides_default() {
    let group = GroupSpec::builder("web")
        .node_filter(|node| node.id().starts_with("special-"))
        .build()
        .unwrap();

    assert!(group.accepts(&TestNode::new("special-1", "db-0")));
    assert!(!group.accepts(&TestNode::tagged("n1", "web-0", "web")));
}

#[test]
fn default_removal_selection_takes_first() {
    let group = web();
    let targets = vec![node_target("n1"), node_target("n2"), node_target("n3")];

    let selected = group.select_for_removal(2, targets);
    assert_eq!(selected.len(), 2);
    assert_eq!(selected[0].node_id(), Some("n1"));
    assert_eq!(selected[1].node_id(), Some("n2"));
}

#[test]
fn removal_selection_is_total_when_dissolving() {
    let group = web();
    let targets = vec![node_target("n1"), node_target("n2")];

    // dissolve case: n equals the full membership
    let selected = group.select_for_removal(2, targets);
    assert_eq!(selected.len(), 2);
}

#[test]
fn custom_removal_selection() {
    let group = GroupSpec::builder("web")
        .removal_selection(|n, mut targets| {
            targets.reverse();
            targets.truncate(n);
            targets
        })
        .build()
        .unwrap();
    let targets = vec![node_target("n1"), node_target("n2"), node_target("n3")];

    let selected = group.select_for_removal(1, targets);
    assert_eq!(selected[0].node_id(), Some("n3"));
}

#[test]
fn renamed_group_filter_follows_new_name() {
    let group = web().renamed("prod-web".into());

    assert!(group.accepts(&TestNode::tagged("n1", "x", "prod-web")));
    assert!(!group.accepts(&TestNode::tagged("n2", "x", "web")));
}

#[test]
fn build_fills_default_phases() {
    let group = web();
    assert_eq!(group.default_phases(), [convoy_core::PhaseName::configure()]);
}
