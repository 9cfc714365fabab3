// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! convoy-adapters: effector implementations.
//!
//! The engine treats compute providers, executors and blobstores as opaque
//! effectors behind traits; this crate carries the trait for the compute
//! side plus the stock implementations.

pub mod blobstore;
pub mod compute;
pub mod exec;
pub mod subprocess;

#[cfg(any(test, feature = "test-support"))]
pub mod fake;

pub use blobstore::InMemoryBlobstore;
pub use compute::{
    ComputeError, ComputeProvider, CreateOptions, DestroyReport, ServiceProperties,
};
pub use exec::local::LocalExecutor;
pub use exec::recording::{ExecutedAction, RecordingExecutor};
pub use exec::ssh::SshExecutor;

#[cfg(any(test, feature = "test-support"))]
pub use fake::{ComputeCall, FakeComputeProvider, FakeNode};
