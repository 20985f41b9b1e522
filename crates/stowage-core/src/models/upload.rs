//! Upload requests.
//!
//! A request is either a live upload handed over by the host's upload handler,
//! or an imported file fed by the bulk importer. Each variant carries exactly the
//! fields its call site provides.

use std::path::{Path, PathBuf};

use crate::constants::PROCESSED_MARKER;

/// A file received through the host's upload handler.
#[derive(Clone, Debug)]
pub struct LiveUpload {
    /// Display name; may carry a relative subpath, only the basename is used.
    pub name: String,
    /// Local file holding the bytes to persist.
    pub path: PathBuf,
    /// Extension with its leading dot. Derived from `name` when empty.
    pub ext: String,
    /// MIME type as reported by the host; detected from the name when `None`.
    pub content_type: Option<String>,
    /// Filename as chosen by the end user.
    pub original_name: Option<String>,
}

impl LiveUpload {
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        let name = name.into();
        let ext = extension_of(&name);
        Self {
            name,
            path: path.into(),
            ext,
            content_type: None,
            original_name: None,
        }
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    pub fn with_original_name(mut self, original_name: impl Into<String>) -> Self {
        self.original_name = Some(original_name.into());
        self
    }
}

/// A file re-uploaded from a legacy content tree.
#[derive(Clone, Debug)]
pub struct ImportedUpload {
    /// Name relative to the legacy images directory, e.g. `2021/08/f.jpg`.
    pub name: String,
    pub path: PathBuf,
    pub content_type: Option<String>,
    /// Legacy path relative to the content root, e.g. `content/images/2021/08/f.jpg`.
    pub original_path: String,
    /// Directory the legacy host stored the file in.
    pub target_dir: String,
    /// Legacy URL path of the file, e.g. `/content/images/2021/08/f.jpg`.
    pub new_path: String,
}

#[derive(Clone, Debug)]
pub enum UploadRequest {
    Live(LiveUpload),
    Imported(ImportedUpload),
}

impl From<LiveUpload> for UploadRequest {
    fn from(upload: LiveUpload) -> Self {
        UploadRequest::Live(upload)
    }
}

impl From<ImportedUpload> for UploadRequest {
    fn from(upload: ImportedUpload) -> Self {
        UploadRequest::Imported(upload)
    }
}

impl UploadRequest {
    pub fn is_import(&self) -> bool {
        matches!(self, UploadRequest::Imported(_))
    }

    pub fn path(&self) -> &Path {
        match self {
            UploadRequest::Live(u) => &u.path,
            UploadRequest::Imported(u) => &u.path,
        }
    }

    /// Basename of the request's name; imports never keep a directory component.
    pub fn base_name(&self) -> &str {
        let name = match self {
            UploadRequest::Live(u) => u.name.as_str(),
            UploadRequest::Imported(u) => u.name.as_str(),
        };
        basename(name)
    }

    /// Extension with its leading dot, or an empty string.
    pub fn ext(&self) -> String {
        match self {
            UploadRequest::Live(u) if !u.ext.is_empty() => u.ext.clone(),
            _ => extension_of(self.base_name()),
        }
    }

    /// Basename without the extension.
    pub fn stem(&self) -> &str {
        let base = self.base_name();
        let ext = self.ext();
        let split = base.len().checked_sub(ext.len());
        match split.and_then(|i| base.get(i..).map(|tail| (i, tail))) {
            Some((i, tail)) if i > 0 && !ext.is_empty() && tail.eq_ignore_ascii_case(&ext) => {
                &base[..i]
            }
            _ => base,
        }
    }

    pub fn content_type(&self) -> Option<&str> {
        let content_type = match self {
            UploadRequest::Live(u) => u.content_type.as_deref(),
            UploadRequest::Imported(u) => u.content_type.as_deref(),
        };
        content_type.filter(|t| !t.is_empty())
    }

    /// Name to record as object metadata. Imports fall back to their own basename.
    pub fn original_name(&self) -> Option<&str> {
        match self {
            UploadRequest::Live(u) => u.original_name.as_deref().filter(|n| !n.is_empty()),
            UploadRequest::Imported(u) => Some(basename(&u.name)),
        }
    }

    /// False when the host already produced this file by resizing an upload.
    ///
    /// The decision is made on the physical source path, never on the name.
    pub fn is_original_image(&self) -> bool {
        !self.path().to_string_lossy().ends_with(PROCESSED_MARKER)
    }

    /// True when an explicit extension disagrees with the name's own suffix.
    pub fn has_conflicting_ext(&self) -> bool {
        match self {
            UploadRequest::Live(u) => {
                let from_name = extension_of(basename(&u.name));
                !u.ext.is_empty()
                    && !from_name.is_empty()
                    && !from_name.eq_ignore_ascii_case(&u.ext)
            }
            UploadRequest::Imported(_) => false,
        }
    }
}

fn basename(name: &str) -> &str {
    name.rsplit('/').next().unwrap_or(name)
}

fn extension_of(name: &str) -> String {
    let base = basename(name);
    match base.rfind('.') {
        Some(idx) if idx > 0 => base[idx..].to_string(),
        _ => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn imported(name: &str) -> UploadRequest {
        UploadRequest::Imported(ImportedUpload {
            name: name.to_string(),
            path: PathBuf::from(format!("/tmp/x/content/images/{}", name)),
            content_type: None,
            original_path: format!("content/images/{}", name),
            target_dir: "/var/lib/ghost/content/images/2021/08".to_string(),
            new_path: format!("/content/images/{}", name),
        })
    }

    #[test]
    fn live_upload_derives_extension_from_name() {
        let request: UploadRequest = LiveUpload::new("snake.jpg", "/tmp/abc").into();
        assert_eq!(request.ext(), ".jpg");
        assert_eq!(request.stem(), "snake");
        assert!(!request.is_import());
    }

    #[test]
    fn live_upload_keeps_explicit_extension() {
        let mut upload = LiveUpload::new("photos/snake", "/tmp/abc");
        upload.ext = ".png".to_string();
        let request = UploadRequest::Live(upload);

        assert_eq!(request.base_name(), "snake");
        assert_eq!(request.stem(), "snake");
        assert_eq!(request.ext(), ".png");
        assert!(!request.has_conflicting_ext());
    }

    #[test]
    fn conflicting_extension_is_detected() {
        let mut upload = LiveUpload::new("snake.jpg", "/tmp/abc");
        upload.ext = ".png".to_string();
        assert!(UploadRequest::Live(upload).has_conflicting_ext());

        let mut upload = LiveUpload::new("snake.JPG", "/tmp/abc");
        upload.ext = ".jpg".to_string();
        assert!(!UploadRequest::Live(upload).has_conflicting_ext());
    }

    #[test]
    fn import_name_is_reduced_to_basename() {
        let request = imported("2021/08/f.jpg");
        assert!(request.is_import());
        assert_eq!(request.base_name(), "f.jpg");
        assert_eq!(request.stem(), "f");
        assert_eq!(request.ext(), ".jpg");
        assert_eq!(request.original_name(), Some("f.jpg"));
    }

    #[test]
    fn original_image_is_decided_by_path_marker() {
        let resized: UploadRequest = LiveUpload::new("snake.jpg", "/tmp/abc_processed").into();
        assert!(!resized.is_original_image());

        // The name carries no weight in the decision.
        let original: UploadRequest = LiveUpload::new("snake_processed", "/tmp/abc").into();
        assert!(original.is_original_image());
    }

    #[test]
    fn empty_content_type_counts_as_unknown() {
        let request: UploadRequest =
            LiveUpload::new("a.jpg", "/tmp/a").with_content_type("").into();
        assert_eq!(request.content_type(), None);

        let request: UploadRequest =
            LiveUpload::new("a.jpg", "/tmp/a").with_content_type("image/jpeg").into();
        assert_eq!(request.content_type(), Some("image/jpeg"));
    }

    #[test]
    fn dotfiles_have_no_extension() {
        let request: UploadRequest = LiveUpload::new(".hidden", "/tmp/a").into();
        assert_eq!(request.ext(), "");
        assert_eq!(request.stem(), ".hidden");
    }
}
