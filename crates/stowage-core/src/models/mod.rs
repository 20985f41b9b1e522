//! Domain models shared between the orchestrator and its callers.

pub mod upload;

pub use upload::{ImportedUpload, LiveUpload, UploadRequest};
