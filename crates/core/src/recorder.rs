// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Capture sink for action results, composable as a stack.
//!
//! Phases may nest plan functions that themselves call plan functions; each
//! nesting level needs an isolated capture scope that still forwards to its
//! parents. A child recorder pushes a fresh innermost frame juxtaposed with
//! every enclosing frame: records fan out to all frames, parents keep their
//! own capture untouched.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::action::ActionResult;

type Frame = Arc<Mutex<Vec<ActionResult>>>;

#[derive(Clone)]
pub struct Recorder {
    frames: Vec<Frame>,
}

impl Recorder {
    pub fn new() -> Self {
        Self { frames: vec![Frame::default()] }
    }

    /// A recorder with a fresh innermost frame stacked on this one.
    pub fn child(&self) -> Recorder {
        let mut frames = self.frames.clone();
        frames.push(Frame::default());
        Recorder { frames }
    }

    /// Record a result into every frame of the stack.
    pub fn record(&self, result: ActionResult) {
        for frame in &self.frames {
            frame.lock().push(result.clone());
        }
    }

    /// Results captured by the innermost scope.
    pub fn results(&self) -> Vec<ActionResult> {
        self.frames.last().map(|f| f.lock().clone()).unwrap_or_default()
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }
}

impl Default for Recorder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "recorder_tests.rs"]
mod tests;
