// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! convoy-spec: the spec algebra.
//!
//! Composes group and server specs from inheritance chains, overlays
//! environments, and expands clusters into group specs. Everything here is
//! pure: validation errors are raised before any effectful work.

pub mod cluster;
pub mod environment;
pub mod error;
pub mod group;
pub mod merge;
pub mod node_spec;
pub mod server_spec;
pub mod sets;

pub use cluster::{ClusterSpec, ClusterSpecBuilder};
pub use environment::{Environment, SpecOverlay};
pub use error::SpecError;
pub use group::{default_node_filter, GroupSpec, GroupSpecBuilder, NodeFilter, RemovalSelection};
pub use merge::{merge_roles, merge_server_specs, rule_for, MergeRule};
pub use node_spec::{HardwareSpec, ImageSpec, LocationSpec, NetworkSpec, NodeSpec};
pub use server_spec::{ServerSpec, ServerSpecBuilder};
pub use sets::{split_node_sets, NodeSet};
