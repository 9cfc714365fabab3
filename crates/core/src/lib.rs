// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! convoy-core: data model for the convoy fleet orchestrator

pub mod macros;

pub mod action;
pub mod blobstore;
pub mod clock;
pub mod executor;
pub mod group;
pub mod node;
pub mod phase;
pub mod plan_state;
pub mod recorder;
pub mod result;
pub mod session;
pub mod target;
pub mod user;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use action::{Action, ActionError, ActionErrorKind, ActionResult};
pub use blobstore::{BlobError, Blobstore};
pub use clock::{Clock, FakeClock, SystemClock};
pub use executor::{ActionExecutor, ExecError};
pub use group::GroupName;
pub use node::{group_name_of, matches_base_name, Node, NodeHandle, GROUP_NAME_TAG};
pub use phase::{
    plan_fn, ExecutionSettings, ExecutionSettingsFn, PartitionFn, Phase, PhaseMap, PhaseMeta,
    PhaseName, PlanError, PlanFn, PlanFuture,
};
pub use plan_state::{PlanState, Scope};
pub use recorder::Recorder;
pub use result::{PhaseOutcome, PhaseResult, TargetRef};
pub use session::{DebugOptions, Session};
pub use target::{Target, TargetType};
pub use user::User;
