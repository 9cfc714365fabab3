// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Blobstore effector, passed through to plan functions via the session.

use async_trait::async_trait;
use thiserror::Error;

/// Errors from blobstore operations
#[derive(Debug, Error)]
pub enum BlobError {
    #[error("container {0} not found")]
    ContainerNotFound(String),
    #[error("blob {container}/{path} not found")]
    NotFound { container: String, path: String },
    #[error("store error: {0}")]
    Store(String),
}

/// Adapter for blob storage reachable from plan functions.
#[async_trait]
pub trait Blobstore: Send + Sync {
    async fn put(&self, container: &str, path: &str, data: Vec<u8>) -> Result<(), BlobError>;
    async fn get(&self, container: &str, path: &str) -> Result<Vec<u8>, BlobError>;
}
