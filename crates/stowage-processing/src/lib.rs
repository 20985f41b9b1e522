//! Stowage Processing Library
//!
//! This crate provides the image derivation engine used to produce responsive
//! derivatives, and content-type detection for uploads that arrive without one.

pub mod content_type;
pub mod error;
pub mod image;

pub use content_type::detect_content_type;
pub use error::ProcessingError;
pub use crate::image::{is_resizable, ImageResizer, ImageTransformer};
