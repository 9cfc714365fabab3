// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Live node handles borrowed from a compute provider.
//!
//! Nodes are owned by the provider; the engine only holds `Arc<dyn Node>`
//! handles for the duration of one operation.

use std::fmt;
use std::sync::Arc;

use crate::group::GroupName;

/// Reserved tag key marking which group provisioned a node.
///
/// The value is the group name as a bare string. The default node filter
/// relies on this contract, so providers that support tagging must set it at
/// creation time.
pub const GROUP_NAME_TAG: &str = "/pallet/group-name";

/// Capabilities of a live node.
pub trait Node: Send + Sync + fmt::Debug {
    /// Provider-unique identifier.
    fn id(&self) -> &str;

    /// Name the node was provisioned under, without any provider suffix.
    fn base_name(&self) -> &str;

    /// Address remote actions are sent to, when the node is reachable.
    fn primary_ip(&self) -> Option<&str>;

    /// Whether the provider supports key/value tags on this node.
    fn taggable(&self) -> bool;

    /// Read a tag value. Always `None` when `taggable()` is false.
    fn tag(&self, key: &str) -> Option<String>;

    /// Name of the compute service that owns this node.
    fn provider_name(&self) -> &str;

    /// Whether this node's base name encodes membership of `name`.
    fn has_base_name(&self, name: &str) -> bool {
        matches_base_name(self.base_name(), name)
    }
}

/// Borrowed handle to a provider-owned node.
pub type NodeHandle = Arc<dyn Node>;

/// Group membership recorded in the provider's tag store, when available.
pub fn group_name_of(node: &dyn Node) -> Option<GroupName> {
    if node.taggable() {
        node.tag(GROUP_NAME_TAG).map(GroupName::new)
    } else {
        None
    }
}

/// Whether `base` encodes membership of `group`.
///
/// Providers without tagging name members `web`, `web-0`, `web17`, ... so a
/// match is the group name itself or the group name followed by an optional
/// dash and a numeric suffix. `web-app-1` does not match `web`.
pub fn matches_base_name(base: &str, group: &str) -> bool {
    match base.strip_prefix(group) {
        Some("") => true,
        Some(rest) => {
            let rest = rest.strip_prefix('-').unwrap_or(rest);
            !rest.is_empty() && rest.chars().all(|c| c.is_ascii_digit())
        }
        None => false,
    }
}

#[cfg(test)]
#[path = "node_tests.rs"]
mod tests;
