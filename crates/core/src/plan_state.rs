// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Plan-state: a scoped key/value store used to publish facts across phases
//! (e.g. the OS family discovered on a host).
//!
//! Lifetime is one operation; the caller may seed it. Concurrent reads are
//! safe; writes are serialized by the guarded cell.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::group::GroupName;

/// Scope a fact is published under.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(tag = "scope", content = "id", rename_all = "kebab-case")]
pub enum Scope {
    Universe,
    Provider(String),
    Service(String),
    Host(String),
    Group(GroupName),
}

type Facts = BTreeMap<Scope, BTreeMap<String, Value>>;

/// Scoped key/value store shared by every session of one operation.
#[derive(Clone, Default)]
pub struct PlanState {
    inner: Arc<RwLock<Facts>>,
}

impl PlanState {
    pub fn new() -> Self {
        Self::default()
    }

    /// A plan-state pre-populated from caller-supplied facts.
    pub fn seeded(seed: Facts) -> Self {
        Self { inner: Arc::new(RwLock::new(seed)) }
    }

    pub fn get(&self, scope: &Scope, key: &str) -> Option<Value> {
        self.inner.read().get(scope).and_then(|m| m.get(key)).cloned()
    }

    pub fn put(&self, scope: Scope, key: impl Into<String>, value: Value) {
        self.inner.write().entry(scope).or_default().insert(key.into(), value);
    }

    /// First hit for `key`, searching `scopes` in order.
    pub fn lookup(&self, scopes: &[Scope], key: &str) -> Option<Value> {
        let facts = self.inner.read();
        scopes.iter().find_map(|s| facts.get(s).and_then(|m| m.get(key)).cloned())
    }

    /// All facts published under one scope.
    pub fn scope(&self, scope: &Scope) -> BTreeMap<String, Value> {
        self.inner.read().get(scope).cloned().unwrap_or_default()
    }

    pub fn snapshot(&self) -> Facts {
        self.inner.read().clone()
    }
}

impl fmt::Debug for PlanState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let facts = self.inner.read();
        let keys: usize = facts.values().map(|m| m.len()).sum();
        write!(f, "PlanState({} scopes, {} keys)", facts.len(), keys)
    }
}

#[cfg(test)]
#[path = "plan_state_tests.rs"]
mod tests;
