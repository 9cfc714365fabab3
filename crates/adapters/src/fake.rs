// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake compute provider for testing.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use convoy_core::{Node, NodeHandle, User, GROUP_NAME_TAG};
use convoy_spec::GroupSpec;

use crate::compute::{
    ComputeError, ComputeProvider, CreateOptions, DestroyReport, ServiceProperties,
};

/// In-memory node handed out by [`FakeComputeProvider`].
#[derive(Debug, Clone)]
pub struct FakeNode {
    pub id: String,
    pub base_name: String,
    pub ip: String,
    pub taggable: bool,
    pub tags: HashMap<String, String>,
}

impl Node for FakeNode {
    fn id(&self) -> &str {
        &self.id
    }

    fn base_name(&self) -> &str {
        &self.base_name
    }

    fn primary_ip(&self) -> Option<&str> {
        Some(&self.ip)
    }

    fn taggable(&self) -> bool {
        self.taggable
    }

    fn tag(&self, key: &str) -> Option<String> {
        if self.taggable {
            self.tags.get(key).cloned()
        } else {
            None
        }
    }

    fn provider_name(&self) -> &str {
        "fake"
    }
}

/// Recorded provider call
#[derive(Debug, Clone, PartialEq)]
pub enum ComputeCall {
    Nodes,
    Create { group: String, count: u32 },
    Destroy { node_ids: Vec<String> },
}

struct FakeState {
    fleet: Vec<Arc<FakeNode>>,
    calls: Vec<ComputeCall>,
    taggable: bool,
    /// Node ids whose destruction is scripted to fail.
    fail_destroy: HashSet<String>,
    /// Groups scripted to under-provision by this many nodes per request.
    shortfall: HashMap<String, u32>,
    next_seq: u32,
}

/// Fake compute provider: an in-memory fleet with scripted failures.
#[derive(Clone)]
pub struct FakeComputeProvider {
    inner: Arc<Mutex<FakeState>>,
}

impl Default for FakeComputeProvider {
    fn default() -> Self {
        Self {
            inner: Arc::new(Mutex::new(FakeState {
                fleet: Vec::new(),
                calls: Vec::new(),
                taggable: true,
                fail_destroy: HashSet::new(),
                shortfall: HashMap::new(),
                next_seq: 0,
            })),
        }
    }
}

impl FakeComputeProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// A provider whose nodes have no tag support; group membership is
    /// encoded in base names only.
    pub fn untaggable() -> Self {
        let provider = Self::new();
        provider.inner.lock().taggable = false;
        provider
    }

    /// Pre-populate the fleet with a member of `group`.
    pub fn seed_node(&self, id: impl Into<String>, group: &str) -> NodeHandle {
        let mut state = self.inner.lock();
        let seq = state.next_seq;
        state.next_seq += 1;
        let taggable = state.taggable;
        let mut tags = HashMap::new();
        if taggable {
            tags.insert(GROUP_NAME_TAG.to_string(), group.to_string());
        }
        let node = Arc::new(FakeNode {
            id: id.into(),
            base_name: format!("{}-{}", group, seq),
            ip: format!("10.0.0.{}", seq + 1),
            taggable,
            tags,
        });
        state.fleet.push(node.clone());
        node
    }

    /// Script destruction of `id` to fail.
    pub fn fail_destroy(&self, id: impl Into<String>) {
        self.inner.lock().fail_destroy.insert(id.into());
    }

    /// Script creation for `group` to return this many nodes fewer than
    /// asked, per request.
    pub fn shortfall(&self, group: &str, missing: u32) {
        self.inner.lock().shortfall.insert(group.to_string(), missing);
    }

    /// Get all recorded provider calls
    pub fn calls(&self) -> Vec<ComputeCall> {
        self.inner.lock().calls.clone()
    }

    pub fn fleet_ids(&self) -> Vec<String> {
        self.inner.lock().fleet.iter().map(|n| n.id.clone()).collect()
    }
}

#[async_trait]
impl ComputeProvider for FakeComputeProvider {
    async fn nodes(&self) -> Result<Vec<NodeHandle>, ComputeError> {
        let mut state = self.inner.lock();
        state.calls.push(ComputeCall::Nodes);
        Ok(state.fleet.iter().map(|n| n.clone() as NodeHandle).collect())
    }

    async fn create_nodes(
        &self,
        group: &GroupSpec,
        _user: &User,
        count: u32,
        options: &CreateOptions,
    ) -> Result<Vec<NodeHandle>, ComputeError> {
        let mut state = self.inner.lock();
        let group_name = group.group_name.as_str().to_string();
        state.calls.push(ComputeCall::Create { group: group_name.clone(), count });

        let missing = state.shortfall.get(&group_name).copied().unwrap_or(0);
        let provisioned = count.saturating_sub(missing);

        let mut created = Vec::new();
        for _ in 0..provisioned {
            let seq = state.next_seq;
            state.next_seq += 1;
            let base = options.node_name.clone().unwrap_or_else(|| group_name.clone());
            let taggable = state.taggable;
            let mut tags = HashMap::new();
            if taggable {
                tags.insert(GROUP_NAME_TAG.to_string(), group_name.clone());
            }
            let node = Arc::new(FakeNode {
                id: format!("fake-{}", uuid::Uuid::new_v4().simple()),
                base_name: format!("{}-{}", base, seq),
                ip: format!("10.0.0.{}", seq + 1),
                taggable,
                tags,
            });
            state.fleet.push(node.clone());
            created.push(node as NodeHandle);
        }
        Ok(created)
    }

    async fn destroy_nodes(&self, nodes: &[NodeHandle]) -> Result<DestroyReport, ComputeError> {
        let mut state = self.inner.lock();
        let ids: Vec<String> = nodes.iter().map(|n| n.id().to_string()).collect();
        state.calls.push(ComputeCall::Destroy { node_ids: ids.clone() });

        let mut report = DestroyReport::default();
        for id in ids {
            if state.fail_destroy.contains(&id) {
                report.errors.push((id, "scripted destroy failure".to_string()));
                continue;
            }
            let before = state.fleet.len();
            state.fleet.retain(|n| n.id != id);
            if state.fleet.len() < before {
                report.destroyed_node_ids.push(id);
            } else {
                report.errors.push((id, "node not found".to_string()));
            }
        }
        Ok(report)
    }

    fn service_properties(&self) -> ServiceProperties {
        ServiceProperties { provider: "fake".to_string(), endpoint: None }
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
