//! Stowage Core Library
//!
//! This crate provides the configuration model, upload request types and error
//! types shared by every Stowage component: the storage backends, the image
//! derivation engine, the save orchestrator and the bulk importer.

pub mod config;
pub mod constants;
pub mod error;
pub mod models;
pub mod storage_types;

// Re-export commonly used types
pub use config::{AdapterConfig, AdapterSettings};
pub use error::ConfigError;
pub use models::{ImportedUpload, LiveUpload, UploadRequest};
pub use storage_types::{StorageBackend, StorageType};
