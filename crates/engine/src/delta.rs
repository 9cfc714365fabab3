// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Delta calculator.
//!
//! For each desired group: `delta = count - actual`, where `actual` counts
//! the resolved targets passing the group's node filter. Positive deltas
//! become add-specs, negative ones removal-specs.

use convoy_core::Target;
use convoy_spec::{GroupSpec, SpecError};

use crate::error::OpError;

/// Actual-versus-desired state of one group. Derived; read-only.
#[derive(Debug)]
pub struct GroupDelta {
    pub group: GroupSpec,
    pub actual: usize,
    pub target: u32,
    /// Signed count of nodes to add (+) or destroy (−).
    pub delta: i64,
    /// The resolved targets passing the group's filter.
    pub targets: Vec<Target>,
}

/// Nodes to create for one group.
#[derive(Debug)]
pub struct AddSpec {
    pub group: GroupSpec,
    pub count: u32,
    /// The group did not previously exist: `create-group` must run once
    /// before any node is created.
    pub create_group: bool,
}

/// Targets to destroy for one group.
#[derive(Debug)]
pub struct RemovalSpec {
    pub group: GroupSpec,
    /// The group is being dissolved: `destroy-group` must run after the
    /// last node is destroyed.
    pub remove_group: bool,
    /// Already narrowed by the group's removal selection.
    pub targets: Vec<Target>,
}

#[derive(Debug, Default)]
pub struct NodeCountAdjustments {
    pub adds: Vec<AddSpec>,
    pub removals: Vec<RemovalSpec>,
}

impl NodeCountAdjustments {
    pub fn is_empty(&self) -> bool {
        self.adds.is_empty() && self.removals.is_empty()
    }

    pub fn task_count(&self) -> usize {
        self.adds.len() + self.removals.len()
    }
}

/// Compute one group's delta against the resolved targets.
///
/// A group without a count is fatal here, the first point where the count
/// is actually needed.
pub fn group_delta(group: &GroupSpec, targets: &[Target]) -> Result<GroupDelta, OpError> {
    let desired = group
        .count
        .ok_or_else(|| OpError::Spec(SpecError::MissingCount(group.group_name.clone())))?;

    let matching: Vec<Target> = targets
        .iter()
        .filter(|t| t.node.as_deref().map(|n| group.accepts(n)).unwrap_or(false))
        .cloned()
        .collect();
    let actual = matching.len();

    Ok(GroupDelta {
        group: group.clone(),
        actual,
        target: desired,
        delta: desired as i64 - actual as i64,
        targets: matching,
    })
}

/// Partition every group's delta into add-specs and removal-specs.
pub fn compute_adjustments(
    groups: &[GroupSpec],
    targets: &[Target],
) -> Result<NodeCountAdjustments, OpError> {
    let mut adjustments = NodeCountAdjustments::default();
    for group in groups {
        let delta = group_delta(group, targets)?;
        tracing::info!(
            group = %group.group_name,
            actual = delta.actual,
            target = delta.target,
            delta = delta.delta,
            "computed group delta"
        );
        if delta.delta > 0 {
            adjustments.adds.push(AddSpec {
                group: group.clone(),
                count: delta.delta as u32,
                create_group: delta.actual == 0,
            });
        } else if delta.delta < 0 {
            let n = (-delta.delta) as usize;
            let selected = group.select_for_removal(n, delta.targets);
            adjustments.removals.push(RemovalSpec {
                group: group.clone(),
                remove_group: delta.target == 0,
                targets: selected,
            });
        }
    }
    Ok(adjustments)
}

#[cfg(test)]
#[path = "delta_tests.rs"]
mod tests;
