// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Targets bind a node (or a group) to its effective phase map for one
//! operation. Targets are created per operation and never persist.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::group::GroupName;
use crate::node::NodeHandle;
use crate::phase::{PhaseMap, PhaseName};
use crate::result::TargetRef;

/// Whether a target addresses one node or the group itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TargetType {
    Node,
    Group,
}

crate::simple_display! {
    TargetType {
        Node => "node",
        Group => "group",
    }
}

/// Runtime record fed to the phase executor.
#[derive(Clone)]
pub struct Target {
    /// Live node handle; `None` for group-scope phases.
    pub node: Option<NodeHandle>,
    /// Primary group. When a node satisfies several group filters this is
    /// the first match in the caller's group order.
    pub group_name: GroupName,
    /// Every group whose filter accepts the node.
    pub group_names: BTreeSet<GroupName>,
    /// Effective phase map after spec merging.
    pub phases: PhaseMap,
    pub roles: BTreeSet<String>,
    pub target_type: TargetType,
}

impl Target {
    /// Target addressing one node under one group.
    pub fn for_node(group_name: GroupName, node: NodeHandle, phases: PhaseMap) -> Self {
        let group_names = BTreeSet::from([group_name.clone()]);
        Self {
            node: Some(node),
            group_name,
            group_names,
            phases,
            roles: BTreeSet::new(),
            target_type: TargetType::Node,
        }
    }

    /// Group-scope target with no node bound (create-group/destroy-group).
    pub fn for_group(group_name: GroupName, phases: PhaseMap) -> Self {
        let group_names = BTreeSet::from([group_name.clone()]);
        Self {
            node: None,
            group_name,
            group_names,
            phases,
            roles: BTreeSet::new(),
            target_type: TargetType::Group,
        }
    }

    pub fn with_roles(mut self, roles: BTreeSet<String>) -> Self {
        self.roles = roles;
        self
    }

    pub fn node_id(&self) -> Option<&str> {
        self.node.as_deref().map(|n| n.id())
    }

    pub fn has_phase(&self, name: &PhaseName) -> bool {
        self.phases.contains(name)
    }

    /// Stable descriptor used in results and logs.
    pub fn reference(&self) -> TargetRef {
        TargetRef {
            group: self.group_name.clone(),
            node_id: self.node_id().map(str::to_string),
            target_type: self.target_type,
        }
    }
}

impl fmt::Debug for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Target")
            .field("group_name", &self.group_name)
            .field("node", &self.node_id())
            .field("group_names", &self.group_names)
            .field("phases", &self.phases)
            .field("roles", &self.roles)
            .field("target_type", &self.target_type)
            .finish()
    }
}

#[cfg(test)]
#[path = "target_tests.rs"]
mod tests;
