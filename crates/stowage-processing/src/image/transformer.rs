//! Image transformer - width-only resizing for responsive derivatives

use crate::error::ProcessingError;
use ::image::codecs::jpeg::JpegEncoder;
use ::image::imageops::FilterType;
use ::image::{DynamicImage, GenericImageView, ImageFormat};
use bytes::Bytes;
use std::io::Cursor;

/// Image Derivation Engine capability.
///
/// Implementations are CPU-bound and synchronous; callers run them on a
/// blocking thread.
pub trait ImageResizer: Send + Sync {
    /// Resize `data` to `width` pixels wide, preserving the aspect ratio.
    /// Sources narrower than `width` keep their own width.
    ///
    /// JPEG sources are re-encoded at `jpeg_quality`; every other format is
    /// re-encoded in its own format at the encoder's default settings.
    fn resize_to_width(
        &self,
        data: &[u8],
        width: u32,
        content_type: &str,
        jpeg_quality: u8,
    ) -> Result<Bytes, ProcessingError>;
}

/// Whether the engine can decode and re-encode this content type.
pub fn is_resizable(content_type: &str) -> bool {
    detect_format(content_type).is_some()
}

fn detect_format(content_type: &str) -> Option<ImageFormat> {
    match content_type {
        "image/jpg" | "image/pjpeg" => Some(ImageFormat::Jpeg),
        other => ImageFormat::from_mime_type(other).filter(|format| {
            matches!(
                format,
                ImageFormat::Jpeg
                    | ImageFormat::Png
                    | ImageFormat::Gif
                    | ImageFormat::WebP
                    | ImageFormat::Bmp
                    | ImageFormat::Tiff
            )
        }),
    }
}

/// `image` crate backed resizer.
#[derive(Clone, Copy, Debug, Default)]
pub struct ImageTransformer;

impl ImageTransformer {
    pub fn new() -> Self {
        Self
    }

    /// Target height for a width-only resize; never below one pixel.
    fn scaled_height(width: u32, height: u32, target_width: u32) -> u32 {
        let scaled = (height as f64 * target_width as f64 / width as f64).round();
        (scaled as u32).max(1)
    }

    fn encode(
        img: &DynamicImage,
        format: ImageFormat,
        jpeg_quality: u8,
    ) -> Result<Bytes, ProcessingError> {
        let (width, height) = img.dimensions();
        let mut buffer = Vec::with_capacity(width as usize * height as usize * 3);

        if format == ImageFormat::Jpeg {
            let rgb = img.to_rgb8();
            let mut encoder = JpegEncoder::new_with_quality(&mut buffer, jpeg_quality);
            encoder
                .encode_image(&rgb)
                .map_err(|e| ProcessingError::Encode(e.to_string()))?;
        } else {
            let mut cursor = Cursor::new(&mut buffer);
            img.write_to(&mut cursor, format)
                .map_err(|e| ProcessingError::Encode(e.to_string()))?;
        }

        Ok(Bytes::from(buffer))
    }
}

impl ImageResizer for ImageTransformer {
    fn resize_to_width(
        &self,
        data: &[u8],
        width: u32,
        content_type: &str,
        jpeg_quality: u8,
    ) -> Result<Bytes, ProcessingError> {
        let format = detect_format(content_type)
            .ok_or_else(|| ProcessingError::UnsupportedFormat(content_type.to_string()))?;
        if width == 0 {
            return Err(ProcessingError::Encode("Target width must be positive".to_string()));
        }

        let img = ::image::load_from_memory_with_format(data, format)
            .map_err(|e| ProcessingError::Decode(e.to_string()))?;

        // Never enlarge: a narrower source is re-encoded at its own width.
        let (src_width, src_height) = img.dimensions();
        let width = width.min(src_width);
        let height = Self::scaled_height(src_width, src_height, width);
        let resized = img.resize_exact(width, height, FilterType::Lanczos3);

        tracing::debug!(
            content_type = %content_type,
            from_width = src_width,
            from_height = src_height,
            to_width = width,
            to_height = height,
            "Resized image"
        );

        Self::encode(&resized, format, jpeg_quality)
    }
}
