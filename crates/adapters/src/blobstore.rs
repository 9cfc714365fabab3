// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory blobstore.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use convoy_core::{BlobError, Blobstore};

/// Blobstore backed by a map, for tests and single-process runs.
#[derive(Clone, Default)]
pub struct InMemoryBlobstore {
    inner: Arc<Mutex<HashMap<(String, String), Vec<u8>>>>,
}

impl InMemoryBlobstore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }
}

#[async_trait]
impl Blobstore for InMemoryBlobstore {
    async fn put(&self, container: &str, path: &str, data: Vec<u8>) -> Result<(), BlobError> {
        self.inner.lock().insert((container.to_string(), path.to_string()), data);
        Ok(())
    }

    async fn get(&self, container: &str, path: &str) -> Result<Vec<u8>, BlobError> {
        self.inner
            .lock()
            .get(&(container.to_string(), path.to_string()))
            .cloned()
            .ok_or_else(|| BlobError::NotFound {
                container: container.to_string(),
                path: path.to_string(),
            })
    }
}

#[cfg(test)]
#[path = "blobstore_tests.rs"]
mod tests;
