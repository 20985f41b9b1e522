//! Stowage Services Library
//!
//! The upload pipeline: key resolution, the save orchestrator and the bulk
//! importer that replays a legacy content tree through it.

pub mod adapter;
pub mod error;
pub mod importer;
pub mod resolver;

pub use adapter::{AdapterCapabilities, ReadOptions, StorageAdapter};
pub use error::{AdapterError, AdapterResult};
pub use importer::{ContentImporter, ImportSummary};
pub use resolver::{KeyResolver, TargetDirectory};
