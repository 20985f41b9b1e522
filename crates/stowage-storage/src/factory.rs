use crate::{S3Storage, Storage, StorageBackend, StorageResult};
use std::sync::Arc;
use stowage_core::AdapterConfig;

/// Create a storage backend based on configuration
pub fn create_storage(
    config: &AdapterConfig,
    backend: StorageBackend,
) -> StorageResult<Arc<dyn Storage>> {
    match backend {
        StorageBackend::S3 => {
            let storage = S3Storage::new(config)?;
            Ok(Arc::new(storage))
        }
        StorageBackend::Memory => {
            tracing::warn!(
                bucket = %config.bucket(),
                "Using in-memory storage; nothing will be persisted"
            );
            Ok(Arc::new(S3Storage::in_memory(config.bucket())))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stowage_core::AdapterSettings;

    fn config(endpoint: &str) -> AdapterConfig {
        let settings = AdapterSettings {
            domain: Some("https://cdn.example.com".to_string()),
            bucket: Some("test-bucket".to_string()),
            endpoint: Some(endpoint.to_string()),
            access_key_id: Some("key".to_string()),
            secret_access_key: Some("secret".to_string()),
            ..Default::default()
        };
        AdapterConfig::resolve(&settings, Vec::new()).unwrap()
    }

    #[test]
    fn creates_requested_backend() {
        let config = config("http://127.0.0.1:9000");

        let storage = create_storage(&config, StorageBackend::S3).unwrap();
        assert_eq!(storage.backend_type(), StorageBackend::S3);

        let storage = create_storage(&config, StorageBackend::Memory).unwrap();
        assert_eq!(storage.backend_type(), StorageBackend::Memory);
    }
}
