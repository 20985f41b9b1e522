//! Storage abstraction trait
//!
//! This module defines the object store capability the adapter depends on:
//! write an object with attributes, probe for existence, read it back.

use crate::StorageBackend;
use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Download failed: {0}")]
    DownloadFailed(String),

    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Storage backend error: {0}")]
    BackendError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// HTTP attributes stored alongside an object.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ObjectAttributes {
    pub content_type: Option<String>,
    pub cache_control: Option<String>,
    /// User metadata (`x-amz-meta-*` on S3)
    pub metadata: Vec<(String, String)>,
}

/// Storage abstraction trait
///
/// **Key format:** keys never start with `/`. See the crate root documentation.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Write `data` under `key`, replacing any existing object.
    async fn put(&self, key: &str, data: Bytes, attributes: &ObjectAttributes)
        -> StorageResult<()>;

    /// HEAD-style probe. A missing object is `Ok(false)`; every other failure
    /// (network, credentials) is returned as an error.
    async fn exists(&self, key: &str) -> StorageResult<bool>;

    /// Read an object. A missing object is [`StorageError::NotFound`].
    async fn get(&self, key: &str) -> StorageResult<Bytes>;

    /// Get the storage backend type
    fn backend_type(&self) -> StorageBackend;
}
