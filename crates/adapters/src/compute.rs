// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Compute provider effector: source of live nodes, sink for create and
//! destroy requests.

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

use convoy_core::{NodeHandle, User};
use convoy_spec::GroupSpec;

/// Errors from compute operations
#[derive(Debug, Error)]
pub enum ComputeError {
    #[error("provider error: {0}")]
    Provider(String),

    #[error("node {0} not found")]
    NodeNotFound(String),

    #[error("provider {provider} cannot {operation}")]
    Unsupported { provider: String, operation: String },
}

/// Per-request knobs for node creation.
#[derive(Debug, Clone, Default)]
pub struct CreateOptions {
    /// Base name override for the new nodes. Providers without tag support
    /// must fold the group name into the base name regardless, so the
    /// default node filter still recognizes membership.
    pub node_name: Option<String>,
}

/// What actually happened to a destroy request.
#[derive(Debug, Clone, Default)]
pub struct DestroyReport {
    pub destroyed_node_ids: Vec<String>,
    /// Per-node failures as `(node id, message)`.
    pub errors: Vec<(String, String)>,
}

impl DestroyReport {
    pub fn all_destroyed(&self, requested: usize) -> bool {
        self.errors.is_empty() && self.destroyed_node_ids.len() == requested
    }
}

/// Descriptive properties of a compute service.
#[derive(Debug, Clone, Serialize)]
pub struct ServiceProperties {
    pub provider: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
}

/// Adapter for a compute service.
///
/// Nodes are owned by the provider; everything handed out is a borrowed
/// handle. `create_nodes` must tag each new node with the reserved
/// group-name tag key ([`convoy_core::GROUP_NAME_TAG`]) when tagging is
/// supported.
#[async_trait]
pub trait ComputeProvider: Send + Sync + 'static {
    /// The live fleet.
    async fn nodes(&self) -> Result<Vec<NodeHandle>, ComputeError>;

    /// Provision exactly `count` nodes from the group's node spec.
    ///
    /// Whatever is returned is authoritative: a provider that cannot
    /// guarantee the full count should either return the shortfall as the
    /// smaller list or fail the whole request.
    async fn create_nodes(
        &self,
        group: &GroupSpec,
        user: &User,
        count: u32,
        options: &CreateOptions,
    ) -> Result<Vec<NodeHandle>, ComputeError>;

    /// Destroy the given nodes, reporting per-node outcomes.
    async fn destroy_nodes(&self, nodes: &[NodeHandle]) -> Result<DestroyReport, ComputeError>;

    fn service_properties(&self) -> ServiceProperties;
}
