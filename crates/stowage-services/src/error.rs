use std::path::PathBuf;

use stowage_core::ConfigError;
use stowage_processing::ProcessingError;
use stowage_storage::StorageError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AdapterError {
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigError),

    #[error("Cannot resolve storage key: {0}")]
    Resolution(String),

    #[error("Failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Object store request failed: {0}")]
    Store(#[from] StorageError),

    #[error("Metadata error: {0}")]
    Metadata(String),

    #[error("Image processing failed: {0}")]
    Processing(#[from] ProcessingError),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

pub type AdapterResult<T> = Result<T, AdapterError>;
