// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Async operation handle.
//!
//! When a caller asks for async semantics, converge and lift return an
//! [`Operation`] instead of blocking: the caller can await the result, poll
//! the status, and cancel. A timed-out wait leaves the operation running.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;

use crate::error::OpError;

use super::OperationResult;

/// Where an operation currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationStatus {
    Running,
    /// Finished without an attached error.
    Completed,
    /// Finished with an attached error.
    Failed,
    Cancelled,
}

convoy_core::simple_display! {
    OperationStatus {
        Running => "running",
        Completed => "completed",
        Failed => "failed",
        Cancelled => "cancelled",
    }
}

/// Handle on an in-flight operation.
#[derive(Debug)]
pub struct Operation {
    status: Arc<Mutex<OperationStatus>>,
    cancel: CancellationToken,
    result_rx: oneshot::Receiver<OperationResult>,
}

impl Operation {
    pub(crate) fn new(
        status: Arc<Mutex<OperationStatus>>,
        cancel: CancellationToken,
        result_rx: oneshot::Receiver<OperationResult>,
    ) -> Self {
        Self { status, cancel, result_rx }
    }

    /// Current status; `Running` until the driver finishes.
    pub fn status(&self) -> OperationStatus {
        *self.status.lock()
    }

    /// Ask the operation to stop. Idempotent. Pending tasks observe the
    /// cancellation at their next channel operation and report a
    /// cancellation error.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Await the final result.
    pub async fn wait(self) -> Result<OperationResult, OpError> {
        self.result_rx
            .await
            .map_err(|_| OpError::Internal("operation task dropped its result".to_string()))
    }

    /// Await the final result for at most `timeout`.
    ///
    /// On expiry the operation keeps running detached; in-flight tasks are
    /// not aborted unless the caller also cancelled.
    pub async fn wait_timeout(self, timeout: Duration) -> Result<OperationResult, OpError> {
        match tokio::time::timeout(timeout, self.result_rx).await {
            Ok(Ok(result)) => Ok(result),
            Ok(Err(_)) => {
                Err(OpError::Internal("operation task dropped its result".to_string()))
            }
            Err(_) => Err(OpError::Timeout(timeout)),
        }
    }
}

#[cfg(test)]
#[path = "handle_tests.rs"]
mod tests;
