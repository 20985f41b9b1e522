use crate::keys::validate_key;
use crate::traits::{ObjectAttributes, Storage, StorageError, StorageResult};
use crate::StorageBackend;
use async_trait::async_trait;
use bytes::Bytes;
use object_store::aws::AmazonS3Builder;
use object_store::memory::InMemory;
use object_store::path::Path;
use object_store::Error as ObjectStoreError;
use object_store::{
    Attribute, AttributeValue, Attributes, GetOptions, ObjectStore, PutOptions, PutPayload,
    Result as ObjectResult,
};
use std::borrow::Cow;
use std::sync::Arc;
use stowage_core::AdapterConfig;

/// S3 storage implementation
///
/// Wraps any `object_store` backend. Production instances talk to an
/// S3-compatible endpoint; [`S3Storage::in_memory`] runs the same code path
/// against a process-local store.
#[derive(Clone)]
pub struct S3Storage {
    store: Arc<dyn ObjectStore>,
    bucket: String,
    backend: StorageBackend,
}

impl S3Storage {
    /// Create a new S3Storage instance for the endpoint and credentials in `config`.
    ///
    /// Plain `http://` endpoints (e.g. a local MinIO) are allowed.
    pub fn new(config: &AdapterConfig) -> StorageResult<Self> {
        let endpoint = config.endpoint();
        let allow_http = endpoint.starts_with("http://");

        let store = AmazonS3Builder::new()
            .with_endpoint(endpoint)
            .with_allow_http(allow_http)
            .with_bucket_name(config.bucket())
            .with_region(config.region())
            .with_access_key_id(config.access_key_id())
            .with_secret_access_key(config.secret_access_key())
            .build()
            .map_err(|e| StorageError::ConfigError(e.to_string()))?;

        tracing::debug!(
            bucket = %config.bucket(),
            endpoint = %endpoint,
            region = %config.region(),
            "S3 client initialised"
        );

        Ok(S3Storage {
            store: Arc::new(store),
            bucket: config.bucket().to_string(),
            backend: StorageBackend::S3,
        })
    }

    /// Process-local store with the same semantics as a bucket.
    pub fn in_memory(bucket: impl Into<String>) -> Self {
        Self::from_store(Arc::new(InMemory::new()), bucket, StorageBackend::Memory)
    }

    /// Wrap an already configured `object_store` backend.
    pub fn from_store(
        store: Arc<dyn ObjectStore>,
        bucket: impl Into<String>,
        backend: StorageBackend,
    ) -> Self {
        S3Storage {
            store,
            bucket: bucket.into(),
            backend,
        }
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    fn location(key: &str) -> StorageResult<Path> {
        validate_key(key)?;
        Path::parse(key).map_err(|e| StorageError::InvalidKey(e.to_string()))
    }

    fn put_options(attributes: &ObjectAttributes) -> PutOptions {
        let mut attrs = Attributes::new();
        if let Some(content_type) = &attributes.content_type {
            attrs.insert(
                Attribute::ContentType,
                AttributeValue::from(content_type.clone()),
            );
        }
        if let Some(cache_control) = &attributes.cache_control {
            attrs.insert(
                Attribute::CacheControl,
                AttributeValue::from(cache_control.clone()),
            );
        }
        for (name, value) in &attributes.metadata {
            attrs.insert(
                Attribute::Metadata(Cow::Owned(name.clone())),
                AttributeValue::from(value.clone()),
            );
        }

        PutOptions {
            attributes: attrs,
            ..Default::default()
        }
    }
}

#[async_trait]
impl Storage for S3Storage {
    async fn put(
        &self,
        key: &str,
        data: Bytes,
        attributes: &ObjectAttributes,
    ) -> StorageResult<()> {
        let location = Self::location(key)?;
        let size = data.len() as u64;
        let start = std::time::Instant::now();

        let result: ObjectResult<_> = self
            .store
            .put_opts(&location, PutPayload::from(data), Self::put_options(attributes))
            .await;

        result.map_err(|e| {
            tracing::error!(
                error = %e,
                bucket = %self.bucket,
                key = %key,
                size_bytes = size,
                duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                "S3 upload failed"
            );
            StorageError::UploadFailed(e.to_string())
        })?;

        tracing::info!(
            bucket = %self.bucket,
            key = %key,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "S3 upload successful"
        );

        Ok(())
    }

    async fn exists(&self, key: &str) -> StorageResult<bool> {
        let location = Self::location(key)?;
        let options = GetOptions {
            head: true,
            ..Default::default()
        };

        match self.store.get_opts(&location, options).await {
            Ok(_) => Ok(true),
            Err(ObjectStoreError::NotFound { .. }) => Ok(false),
            Err(e) => {
                tracing::error!(
                    error = %e,
                    bucket = %self.bucket,
                    key = %key,
                    "S3 head failed"
                );
                Err(StorageError::BackendError(e.to_string()))
            }
        }
    }

    async fn get(&self, key: &str) -> StorageResult<Bytes> {
        let start = std::time::Instant::now();
        let location = Self::location(key)?;

        let result: ObjectResult<_> = self.store.get_opts(&location, GetOptions::default()).await;

        let result = result.map_err(|e| match e {
            ObjectStoreError::NotFound { .. } => StorageError::NotFound(key.to_string()),
            other => {
                tracing::error!(
                    error = %other,
                    bucket = %self.bucket,
                    key = %key,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "S3 download failed"
                );
                StorageError::DownloadFailed(other.to_string())
            }
        })?;

        let bytes = result
            .bytes()
            .await
            .map_err(|e| StorageError::DownloadFailed(e.to_string()))?;

        tracing::info!(
            bucket = %self.bucket,
            key = %key,
            size_bytes = bytes.len() as u64,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "S3 download successful"
        );

        Ok(bytes)
    }

    fn backend_type(&self) -> StorageBackend {
        self.backend
    }
}
