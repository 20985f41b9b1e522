//! Stowage Storage Library
//!
//! This crate provides the object store capability the adapter writes through:
//! the [`Storage`] trait and an implementation for S3-compatible endpoints
//! (Cloudflare R2, MinIO, AWS S3) built on `object_store`.
//!
//! # Storage key format
//!
//! Keys are the public URL path of an object without its leading `/`, e.g.
//! `content/images/2024/03/snake.jpg` or, with a content prefix,
//! `tenant/content/images/size/w600/2024/03/snake.jpg`.
//!
//! Keys must not be empty, contain `..` segments or start with `/`. Key
//! validation and URL helpers live in the `keys` module.

pub mod factory;
pub mod keys;
pub mod s3;
pub mod traits;

// Re-export commonly used types
pub use factory::create_storage;
pub use s3::S3Storage;
pub use stowage_core::StorageBackend;
pub use traits::{ObjectAttributes, Storage, StorageError, StorageResult};
