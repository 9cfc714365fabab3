use super::*;

use convoy_core::test_support::TestNode;
use convoy_core::{PhaseMap, Target};

use crate::phases::{lift_phase, PhaseOptions};
use crate::test_helpers::recording_session;
use tokio_util::sync::CancellationToken;

#[test]
fn parse_key_value_probe_output() {
    let out = "family=Linux\narch=x86_64\nid=debian\nversion=12\n";
    let facts = parse_os_probe(out);

    assert_eq!(facts[OS_FAMILY_KEY], "linux");
    assert_eq!(facts[OS_ARCH_KEY], "x86_64");
    assert_eq!(facts[OS_ID_KEY], "debian");
    assert_eq!(facts[OS_VERSION_KEY], "12");
}

#[test]
fn parse_ignores_noise_and_blank_values() {
    let out = "family=FreeBSD\nversion=\nsome junk line\nunknown=x\n";
    let facts = parse_os_probe(out);

    assert_eq!(facts.len(), 1);
    assert_eq!(facts[OS_FAMILY_KEY], "freebsd");
}

#[tokio::test]
async fn os_phase_publishes_host_scoped_facts() {
    let (session, executor) = recording_session();
    executor.set_output("os-detect", "family=Linux\narch=aarch64\nid=ubuntu\nversion=24.04");

    let target = Target::for_node(
        "web".into(),
        TestNode::tagged("n1", "web-0", "web").handle(),
        os_detect_phases(),
    );

    let (results, error) = lift_phase(
        &session,
        &PhaseName::os_detect(),
        std::slice::from_ref(&target),
        &PhaseOptions::default(),
        &CancellationToken::new(),
    )
    .await;

    assert!(error.is_none());
    assert!(results[0].outcome.ok());
    let state = session.plan_state();
    let scope = Scope::Host("n1".into());
    assert_eq!(state.get(&scope, OS_FAMILY_KEY), Some(json!("linux")));
    assert_eq!(state.get(&scope, OS_ARCH_KEY), Some(json!("aarch64")));
    assert_eq!(state.get(&scope, OS_VERSION_KEY), Some(json!("24.04")));
}

#[tokio::test]
async fn bootstrap_probe_stores_family_only() {
    let (session, executor) = recording_session();
    executor.set_output("os-detect-bs", "Linux\n");

    let target = Target::for_node(
        "web".into(),
        TestNode::tagged("n1", "web-0", "web").handle(),
        os_detect_phases(),
    );

    lift_phase(
        &session,
        &PhaseName::os_detect_bootstrap(),
        std::slice::from_ref(&target),
        &PhaseOptions::default(),
        &CancellationToken::new(),
    )
    .await;

    let scope = Scope::Host("n1".into());
    assert_eq!(session.plan_state().get(&scope, OS_FAMILY_KEY), Some(json!("linux")));
    assert_eq!(session.plan_state().get(&scope, OS_VERSION_KEY), None);
}

#[tokio::test]
async fn group_scope_target_stores_nothing() {
    let (session, executor) = recording_session();
    executor.set_output("os-detect-bs", "Linux\n");

    let target = Target::for_group("web".into(), os_detect_phases());
    lift_phase(
        &session,
        &PhaseName::os_detect_bootstrap(),
        std::slice::from_ref(&target),
        &PhaseOptions::default(),
        &CancellationToken::new(),
    )
    .await;

    assert!(session.plan_state().snapshot().is_empty());
}

#[test]
fn phase_map_carries_both_probes() {
    let map = os_detect_phases();
    assert!(map.contains(&PhaseName::os_detect()));
    assert!(map.contains(&PhaseName::os_detect_bootstrap()));
}
