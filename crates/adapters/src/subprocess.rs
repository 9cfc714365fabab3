// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Subprocess helpers shared by the local and SSH executors.

use std::process::{Output, Stdio};
use std::time::Duration;

use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

/// Ceiling for script actions.
pub const SCRIPT_COMMAND_TIMEOUT: Duration = Duration::from_secs(600);

/// Ceiling for short probes (OS detection, liveness).
pub const PROBE_COMMAND_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Error)]
pub enum SubprocessError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("command timed out after {0:?}")]
    Timeout(Duration),
}

/// Run a command to completion with a timeout, optionally feeding stdin.
///
/// The child is killed when the timeout elapses (`kill_on_drop`).
pub async fn run_with_timeout(
    cmd: &mut Command,
    stdin: Option<&[u8]>,
    timeout: Duration,
) -> Result<Output, SubprocessError> {
    cmd.stdin(if stdin.is_some() { Stdio::piped() } else { Stdio::null() })
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let mut child = cmd.spawn()?;
    if let Some(bytes) = stdin {
        if let Some(mut handle) = child.stdin.take() {
            handle.write_all(bytes).await?;
            // dropping the handle closes the pipe
        }
    }

    match tokio::time::timeout(timeout, child.wait_with_output()).await {
        Ok(output) => Ok(output?),
        Err(_) => Err(SubprocessError::Timeout(timeout)),
    }
}

/// Stdout and stderr interleaved the way action results carry output.
pub fn merged_output(output: &Output) -> String {
    let mut out = String::from_utf8_lossy(&output.stdout).into_owned();
    if !output.stderr.is_empty() {
        if !out.is_empty() && !out.ends_with('\n') {
            out.push('\n');
        }
        out.push_str(&String::from_utf8_lossy(&output.stderr));
    }
    out
}

#[cfg(test)]
#[path = "subprocess_tests.rs"]
mod tests;
