// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Validation errors, raised before any effectful work.

use convoy_core::GroupName;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SpecError {
    #[error("group name must not be empty")]
    EmptyGroupName,

    #[error("cluster name must not be empty")]
    EmptyClusterName,

    #[error("cluster {cluster} declares group {group} more than once")]
    DuplicateGroup { cluster: String, group: GroupName },

    /// A group reached delta computation without a desired count.
    #[error("group {0}: count must be specified for converge")]
    MissingCount(GroupName),

    #[error("invalid node spec for group {group}: {message}")]
    InvalidNodeSpec { group: GroupName, message: String },
}
