// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Target resolver.
//!
//! Classifies each live node under zero or more groups using each group's
//! node filter and yields target records. A node matching several groups
//! becomes one target with the group specs folded together; nodes matching
//! no group are dropped.

use std::collections::{BTreeMap, BTreeSet};

use convoy_core::{NodeHandle, PhaseMap, Target};
use convoy_spec::{merge_roles, GroupSpec};

/// Resolve live nodes against the candidate groups.
pub fn resolve_targets(nodes: &[NodeHandle], groups: &[GroupSpec]) -> Vec<Target> {
    nodes
        .iter()
        .filter_map(|node| {
            let matching: Vec<&GroupSpec> =
                groups.iter().filter(|g| g.accepts(node.as_ref())).collect();
            if matching.is_empty() {
                tracing::debug!(node = node.id(), "node matches no group, dropped");
                return None;
            }
            Some(fold_target(node.clone(), &matching))
        })
        .collect()
}

/// Fold the specs of every matching group into one target, starting from
/// the node. Phase maps merge in group order (later groups override), roles
/// union, and `group_names` collects all matches. The primary group name is
/// the first match.
fn fold_target(node: NodeHandle, groups: &[&GroupSpec]) -> Target {
    let mut phases = PhaseMap::new();
    let mut roles = BTreeSet::new();
    let mut group_names = BTreeSet::new();
    for group in groups {
        phases = phases.merged_with(group.phases());
        roles = merge_roles(&roles, &group.roles);
        group_names.insert(group.group_name.clone());
    }
    let mut target = Target::for_node(groups[0].group_name.clone(), node, phases).with_roles(roles);
    target.group_names = group_names;
    target
}

/// Materialize a raw `(group, nodes)` pair, bypassing filter matching.
pub fn node_targets(group: &GroupSpec, nodes: &[NodeHandle]) -> Vec<Target> {
    nodes
        .iter()
        .map(|node| {
            Target::for_node(group.group_name.clone(), node.clone(), group.phases().clone())
                .with_roles(group.roles.clone())
        })
        .collect()
}

/// Group-scope target used by the `create-group`/`destroy-group` phases.
pub fn group_target(group: &GroupSpec) -> Target {
    Target::for_group(group.group_name.clone(), group.phases().clone())
        .with_roles(group.roles.clone())
}

/// Invert a target set into a `role → nodes` index. Used by plan functions
/// to resolve cross-role references.
pub fn role_index(targets: &[Target]) -> BTreeMap<String, Vec<NodeHandle>> {
    let mut index: BTreeMap<String, Vec<NodeHandle>> = BTreeMap::new();
    for target in targets {
        let Some(node) = &target.node else { continue };
        for role in &target.roles {
            index.entry(role.clone()).or_default().push(node.clone());
        }
    }
    index
}

/// Nodes carrying one role.
pub fn nodes_with_role(targets: &[Target], role: &str) -> Vec<NodeHandle> {
    targets
        .iter()
        .filter(|t| t.roles.contains(role))
        .filter_map(|t| t.node.clone())
        .collect()
}

#[cfg(test)]
#[path = "resolver_tests.rs"]
mod tests;
