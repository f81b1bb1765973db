//! Object storage access.
//!
//! This module provides:
//! - The `ObjectStore` seam used by the aggregators
//! - The S3 backend and an in-memory store
//! - Retry policies and the retry loop for storage calls
//! - Object key helpers for the `<measurement id>/<domain>/<file>.csv` layout

pub mod keys;
mod memory;
mod retry;
mod s3_store;

use async_trait::async_trait;

use crate::error_handling::StorageError;

pub use memory::InMemoryStore;
pub use retry::{with_retry, ConnectionResetRetry, DefaultRetryPolicy, RetryPolicy};
pub use s3_store::S3Store;

/// Read access to stored measurement artifacts.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Every key under `prefix`, across all result pages.
    async fn list_objects(&self, prefix: &str) -> Result<Vec<String>, StorageError>;

    async fn get_object(&self, key: &str) -> Result<Vec<u8>, StorageError>;
}

#[cfg(test)]
mod tests {
    include!("tests.rs");
}
