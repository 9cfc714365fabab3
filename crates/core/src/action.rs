// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Actions are the single effects a plan function asks an executor to
//! perform: run a script, write a file, invoke a named remote call. The
//! engine records and dispatches them without interpreting their payloads.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::executor::ExecError;

/// A single effect against one target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Action {
    /// Run a shell script on the target.
    Script { name: String, script: String },

    /// Write a file on the target.
    WriteFile {
        path: PathBuf,
        contents: String,
        /// Unix permission bits, when they matter.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        mode: Option<u32>,
    },

    /// Invoke a named call with JSON arguments.
    ///
    /// Calls are dispatched by executors that know the name; the engine
    /// treats both name and arguments as opaque.
    Call { name: String, args: serde_json::Value },
}

impl Action {
    pub fn script(name: impl Into<String>, script: impl Into<String>) -> Self {
        Action::Script { name: name.into(), script: script.into() }
    }

    pub fn write_file(path: impl Into<PathBuf>, contents: impl Into<String>) -> Self {
        Action::WriteFile { path: path.into(), contents: contents.into(), mode: None }
    }

    pub fn call(name: impl Into<String>, args: serde_json::Value) -> Self {
        Action::Call { name: name.into(), args }
    }

    /// Action kind for log spans (e.g., "script", "write-file").
    pub fn name(&self) -> &'static str {
        match self {
            Action::Script { .. } => "script",
            Action::WriteFile { .. } => "write-file",
            Action::Call { .. } => "call",
        }
    }

    /// Human label: the script or call name, or the file path.
    pub fn label(&self) -> String {
        match self {
            Action::Script { name, .. } | Action::Call { name, .. } => name.clone(),
            Action::WriteFile { path, .. } => path.display().to_string(),
        }
    }

    /// Key-value pairs for structured logging.
    pub fn fields(&self) -> Vec<(&'static str, String)> {
        match self {
            Action::Script { name, script } => {
                vec![("name", name.clone()), ("bytes", script.len().to_string())]
            }
            Action::WriteFile { path, contents, mode } => {
                let mut fields = vec![
                    ("path", path.display().to_string()),
                    ("bytes", contents.len().to_string()),
                ];
                if let Some(mode) = mode {
                    fields.push(("mode", format!("{:o}", mode)));
                }
                fields
            }
            Action::Call { name, .. } => vec![("name", name.clone())],
        }
    }
}

/// Classification of an action failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ActionErrorKind {
    /// The action ran and reported a non-zero exit status.
    ExitStatus,
    /// The action did not finish within its time budget.
    Timeout,
    /// The transport failed before or while the action ran.
    Transport,
    /// The executor does not implement this action kind.
    Unsupported,
}

crate::simple_display! {
    ActionErrorKind {
        ExitStatus => "exit-status",
        Timeout => "timeout",
        Transport => "transport",
        Unsupported => "unsupported",
    }
}

/// Structured error record attached to a failed [`ActionResult`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, thiserror::Error)]
#[error("action {action} failed ({kind}): {message}")]
pub struct ActionError {
    /// Label of the failing action.
    pub action: String,
    pub kind: ActionErrorKind,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exit: Option<i32>,
}

impl ActionError {
    pub fn exit_status(action: impl Into<String>, exit: i32, message: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            kind: ActionErrorKind::ExitStatus,
            message: message.into(),
            exit: Some(exit),
        }
    }

    pub fn timeout(action: impl Into<String>, message: impl Into<String>) -> Self {
        Self { action: action.into(), kind: ActionErrorKind::Timeout, message: message.into(), exit: None }
    }

    pub fn transport(action: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            kind: ActionErrorKind::Transport,
            message: message.into(),
            exit: None,
        }
    }

    pub fn unsupported(action: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            kind: ActionErrorKind::Unsupported,
            message: message.into(),
            exit: None,
        }
    }
}

/// Result of one action against one target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionResult {
    /// Action kind ("script", "write-file", "call").
    pub action: String,
    /// Script or call name, or file path.
    pub label: String,
    /// Combined output of the action.
    pub out: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exit: Option<i32>,
    #[serde(default)]
    pub elapsed_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ActionError>,
}

impl ActionResult {
    pub fn success(action: &Action, out: impl Into<String>, exit: Option<i32>) -> Self {
        Self {
            action: action.name().to_string(),
            label: action.label(),
            out: out.into(),
            exit,
            elapsed_ms: 0,
            error: None,
        }
    }

    pub fn failure(
        action: &Action,
        out: impl Into<String>,
        exit: Option<i32>,
        error: ActionError,
    ) -> Self {
        Self {
            action: action.name().to_string(),
            label: action.label(),
            out: out.into(),
            exit,
            elapsed_ms: 0,
            error: Some(error),
        }
    }

    /// Synthesize a result for an action the transport could not run.
    pub fn from_exec_error(action: &Action, err: &ExecError) -> Self {
        let record = match err {
            ExecError::Timeout(after) => {
                ActionError::timeout(action.label(), format!("timed out after {:?}", after))
            }
            other => ActionError::transport(action.label(), other.to_string()),
        };
        Self::failure(action, String::new(), None, record)
    }

    pub fn ok(&self) -> bool {
        self.error.is_none()
    }
}

#[cfg(test)]
#[path = "action_tests.rs"]
mod tests;
