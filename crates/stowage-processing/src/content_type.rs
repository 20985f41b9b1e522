//! Content-type detection for uploads that arrive without one.

use std::path::Path;

/// Guess the MIME type of an upload, first from its display name, then from
/// the local source path. Returns `None` when neither carries a known extension.
pub fn detect_content_type(name: &str, path: &Path) -> Option<String> {
    mime_guess::from_path(name)
        .first()
        .or_else(|| mime_guess::from_path(path).first())
        .map(|mime| mime.essence_str().to_string())
}
