// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Built-in OS detection phases.
//!
//! `pallet/os-bs` is a minimal probe usable before bootstrap completes;
//! `pallet/os` is the full probe. Both publish facts into host-scoped
//! plan-state so later phases can branch on them.

use std::collections::BTreeMap;

use serde_json::{json, Value};

use convoy_core::{plan_fn, Action, PhaseMap, PhaseName, PlanError, Scope, Session};

pub const OS_FAMILY_KEY: &str = "os-family";
pub const OS_VERSION_KEY: &str = "os-version";
pub const OS_ARCH_KEY: &str = "os-arch";
pub const OS_ID_KEY: &str = "os-id";

const OS_BOOTSTRAP_SCRIPT: &str = "uname -s";

const OS_PROBE_SCRIPT: &str = r#"echo "family=$(uname -s)"
echo "arch=$(uname -m)"
if [ -r /etc/os-release ]; then
  . /etc/os-release
  echo "id=$ID"
  echo "version=$VERSION_ID"
fi"#;

/// The phase map merged into every group when OS detection is enabled.
pub fn os_detect_phases() -> PhaseMap {
    PhaseMap::new()
        .with_phase(PhaseName::os_detect_bootstrap(), plan_fn(os_bootstrap_plan))
        .with_phase(PhaseName::os_detect(), plan_fn(os_plan))
}

/// Minimal probe: just the kernel name.
async fn os_bootstrap_plan(session: Session) -> Result<Value, PlanError> {
    let result = session.execute(Action::script("os-detect-bs", OS_BOOTSTRAP_SCRIPT)).await?;
    let family = result.out.trim().to_lowercase();
    if let (Some(node_id), false) = (session.node_id().map(str::to_string), family.is_empty()) {
        session.plan_state().put(Scope::Host(node_id), OS_FAMILY_KEY, json!(family));
    }
    let mut facts = BTreeMap::new();
    facts.insert(OS_FAMILY_KEY.to_string(), family);
    Ok(json!(facts))
}

/// Full probe: kernel, architecture, distribution id and version.
async fn os_plan(session: Session) -> Result<Value, PlanError> {
    let result = session.execute(Action::script("os-detect", OS_PROBE_SCRIPT)).await?;
    let facts = parse_os_probe(&result.out);

    if let Some(node_id) = session.node_id().map(str::to_string) {
        let scope = Scope::Host(node_id);
        for (key, value) in &facts {
            session.plan_state().put(scope.clone(), key.clone(), json!(value));
        }
    }
    Ok(json!(facts))
}

/// Parse `key=value` lines from the probe script into plan-state keys.
fn parse_os_probe(out: &str) -> BTreeMap<String, String> {
    let mut facts = BTreeMap::new();
    for line in out.lines() {
        let Some((key, value)) = line.split_once('=') else { continue };
        let value = value.trim();
        if value.is_empty() {
            continue;
        }
        match key.trim() {
            "family" => facts.insert(OS_FAMILY_KEY.to_string(), value.to_lowercase()),
            "arch" => facts.insert(OS_ARCH_KEY.to_string(), value.to_string()),
            "id" => facts.insert(OS_ID_KEY.to_string(), value.to_string()),
            "version" => facts.insert(OS_VERSION_KEY.to_string(), value.to_string()),
            _ => None,
        };
    }
    facts
}

#[cfg(test)]
#[path = "os_detect_tests.rs"]
mod tests;
