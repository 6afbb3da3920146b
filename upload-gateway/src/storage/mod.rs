// Storage layer: authoritative local partitions plus a mirrored object store

pub mod local;
pub mod s3_client;

pub use local::LocalStore;
pub use s3_client::{S3Client, S3Config};

use async_trait::async_trait;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("S3 upload failed: {0}")]
    Remote(String),
}

/// Remote mirror for uploaded files. Objects are written once and never
/// read back by the gateway.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Upload the file at `local_path` under `key` in the configured bucket
    async fn upload(
        &self,
        local_path: &Path,
        key: &str,
        content_type: &str,
    ) -> Result<(), StorageError>;
}

/// Bucket key for a stored object: `<category>/<identifier>`
pub fn object_key(category: crate::models::Category, identifier: &str) -> String {
    format!("{}/{}", category.as_str(), identifier)
}
