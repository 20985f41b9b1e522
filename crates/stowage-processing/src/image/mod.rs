//! Image processing module
//!
//! Width-only resizing for responsive derivatives.

pub mod transformer;

pub use transformer::{is_resizable, ImageResizer, ImageTransformer};
