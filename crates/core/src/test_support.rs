// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Test fixtures shared across the workspace.

use std::collections::HashMap;
use std::sync::Arc;

use crate::node::{Node, NodeHandle, GROUP_NAME_TAG};

/// In-memory node for tests.
#[derive(Debug, Clone)]
pub struct TestNode {
    pub id: String,
    pub base_name: String,
    pub ip: Option<String>,
    pub taggable: bool,
    pub tags: HashMap<String, String>,
    pub provider: String,
}

impl TestNode {
    pub fn new(id: impl Into<String>, base_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            base_name: base_name.into(),
            ip: None,
            taggable: true,
            tags: HashMap::new(),
            provider: "test".to_string(),
        }
    }

    /// A taggable node carrying the reserved group-name tag.
    pub fn tagged(id: impl Into<String>, base_name: impl Into<String>, group: &str) -> Self {
        Self::new(id, base_name).with_tag(GROUP_NAME_TAG, group)
    }

    /// A node whose provider has no tag support; membership is encoded in
    /// the base name only.
    pub fn untaggable(id: impl Into<String>, base_name: impl Into<String>) -> Self {
        let mut node = Self::new(id, base_name);
        node.taggable = false;
        node
    }

    pub fn with_tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.insert(key.into(), value.into());
        self
    }

    pub fn with_ip(mut self, ip: impl Into<String>) -> Self {
        self.ip = Some(ip.into());
        self
    }

    pub fn handle(self) -> NodeHandle {
        Arc::new(self)
    }
}

impl Node for TestNode {
    fn id(&self) -> &str {
        &self.id
    }

    fn base_name(&self) -> &str {
        &self.base_name
    }

    fn primary_ip(&self) -> Option<&str> {
        self.ip.as_deref()
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
        &self.provider
    }
}
