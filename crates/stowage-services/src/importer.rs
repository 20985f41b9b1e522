//! Bulk importer for legacy content trees.
//!
//! Walks a directory laid out like a Ghost `content` parent
//! (`<root>/content/images/YYYY/MM/...`) and saves every image through the
//! adapter in import mode, one file at a time.

use std::io;
use std::path::Path;
use std::sync::Arc;

use stowage_core::constants::{IMPORT_CONTENT_SUBTREE, LEGACY_IMAGES_DIR};
use stowage_core::{ImportedUpload, UploadRequest};
use walkdir::WalkDir;

use crate::adapter::StorageAdapter;
use crate::error::{AdapterError, AdapterResult};

/// Length of the `YYYY/MM` part of an imported name.
const YEAR_MONTH_LEN: usize = "YYYY/MM".len();

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub imported: usize,
    pub skipped: usize,
}

pub struct ContentImporter {
    adapter: Arc<StorageAdapter>,
}

impl ContentImporter {
    pub fn new(adapter: Arc<StorageAdapter>) -> Self {
        Self { adapter }
    }

    /// Import every file under `root/content/images`.
    ///
    /// Files elsewhere in the tree are skipped. The first failed save stops the
    /// run.
    #[tracing::instrument(skip(self, root), fields(root = %root.as_ref().display()))]
    pub async fn run(&self, root: impl AsRef<Path>) -> AdapterResult<ImportSummary> {
        let root = root.as_ref();
        let mut summary = ImportSummary::default();

        for entry in WalkDir::new(root).follow_links(false).sort_by_file_name() {
            let entry = entry.map_err(|e| AdapterError::Io {
                path: e.path().unwrap_or(root).to_path_buf(),
                source: io::Error::from(e),
            })?;
            let file_path = entry.path();
            if entry.file_type().is_dir() {
                continue;
            }
            if !entry.file_type().is_file() {
                tracing::info!("Skipping non-regular entry {}", file_path.display());
                summary.skipped += 1;
                continue;
            }

            let upload = match Self::request_for(root, file_path)? {
                Some(upload) => upload,
                None => {
                    tracing::info!("Skipping {}", file_path.display());
                    summary.skipped += 1;
                    continue;
                }
            };

            tracing::info!(
                original_path = %upload.original_path,
                target_dir = %upload.target_dir,
                "Importing {}",
                file_path.display()
            );
            let request = UploadRequest::Imported(upload);
            let url = self.adapter.save(request, None).await?;
            tracing::debug!(url = %url, "Imported");
            summary.imported += 1;
        }

        tracing::info!(
            imported = summary.imported,
            skipped = summary.skipped,
            "Import finished"
        );

        Ok(summary)
    }

    /// Build the import request for `file_path`, or `None` when the file lies
    /// outside the images subtree.
    fn request_for(root: &Path, file_path: &Path) -> AdapterResult<Option<ImportedUpload>> {
        let relative = file_path.strip_prefix(root).map_err(|_| {
            AdapterError::Resolution(format!(
                "{} is not under {}",
                file_path.display(),
                root.display()
            ))
        })?;
        let content_path = format!("/{}", relative.to_string_lossy());

        let name = match content_path
            .strip_prefix(IMPORT_CONTENT_SUBTREE)
            .and_then(|rest| rest.strip_prefix('/'))
        {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => return Ok(None),
        };

        let subtree = IMPORT_CONTENT_SUBTREE.trim_start_matches('/');
        let year_month = name.get(..YEAR_MONTH_LEN).unwrap_or(&name);
        Ok(Some(ImportedUpload {
            path: file_path.to_path_buf(),
            content_type: None,
            original_path: format!("{}/{}", subtree, name),
            target_dir: format!("{}/{}", LEGACY_IMAGES_DIR, year_month),
            new_path: format!("{}/{}", IMPORT_CONTENT_SUBTREE, name),
            name,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, ImageFormat, RgbImage};
    use stowage_core::{AdapterConfig, AdapterSettings};
    use stowage_storage::{S3Storage, Storage};
    use tempfile::TempDir;

    fn write_jpeg(root: &Path, relative: &str) {
        let path = root.join(relative);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        DynamicImage::ImageRgb8(RgbImage::new(40, 20))
            .save_with_format(&path, ImageFormat::Jpeg)
            .unwrap();
    }

    fn importer(responsive: bool) -> (ContentImporter, Arc<S3Storage>) {
        let settings = AdapterSettings {
            domain: Some("https://cdn.example.com".to_string()),
            bucket: Some("test-bucket".to_string()),
            endpoint: Some("http://127.0.0.1:9000".to_string()),
            access_key_id: Some("key".to_string()),
            secret_access_key: Some("secret".to_string()),
            content_prefix: Some("/test_abc".to_string()),
            responsive_images: Some(responsive),
            resize_widths: Some(vec![10]),
            ..Default::default()
        };
        let config = AdapterConfig::resolve(&settings, Vec::new()).unwrap();
        let storage = Arc::new(S3Storage::in_memory("test-bucket"));
        let adapter = StorageAdapter::new(config, storage.clone());
        (ContentImporter::new(Arc::new(adapter)), storage)
    }

    #[test]
    fn test_request_decomposes_legacy_path() {
        let root = Path::new("/tmp/x");
        let file = Path::new("/tmp/x/content/images/2021/08/f.jpg");
        let upload = ContentImporter::request_for(root, file).unwrap().unwrap();

        assert_eq!(upload.name, "2021/08/f.jpg");
        assert_eq!(upload.original_path, "content/images/2021/08/f.jpg");
        assert_eq!(upload.target_dir, "/var/lib/ghost/content/images/2021/08");
        assert_eq!(upload.new_path, "/content/images/2021/08/f.jpg");
        assert_eq!(upload.path, file);
    }

    #[test]
    fn test_request_skips_other_subtrees() {
        let root = Path::new("/tmp/x");
        for path in [
            "/tmp/x/content/media/2021/08/clip.mp4",
            "/tmp/x/content/imagesfoo/a.jpg",
            "/tmp/x/README.md",
        ] {
            assert!(ContentImporter::request_for(root, Path::new(path))
                .unwrap()
                .is_none());
        }
    }

    #[tokio::test]
    async fn test_run_imports_images_only() {
        let dir = TempDir::new().unwrap();
        write_jpeg(dir.path(), "content/images/2021/08/f.jpg");
        std::fs::create_dir_all(dir.path().join("content/settings")).unwrap();
        std::fs::write(dir.path().join("content/settings/routes.yaml"), b"routes:").unwrap();

        let (importer, storage) = importer(true);
        let summary = importer.run(dir.path()).await.unwrap();

        assert_eq!(summary, ImportSummary { imported: 1, skipped: 1 });
        assert!(storage
            .exists("test_abc/content/images/2021/08/f.jpg")
            .await
            .unwrap());
        assert!(storage
            .exists("test_abc/content/images/size/w10/2021/08/f.jpg")
            .await
            .unwrap());
        assert!(!storage
            .exists("test_abc/content/settings/routes.yaml")
            .await
            .unwrap());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_symlinks_are_skipped() {
        let dir = TempDir::new().unwrap();
        write_jpeg(dir.path(), "content/images/2021/08/f.jpg");
        std::os::unix::fs::symlink(
            dir.path().join("content/images/2021/08/f.jpg"),
            dir.path().join("content/images/2021/08/link.jpg"),
        )
        .unwrap();

        let (importer, storage) = importer(false);
        let summary = importer.run(dir.path()).await.unwrap();

        assert_eq!(summary, ImportSummary { imported: 1, skipped: 1 });
        assert!(!storage
            .exists("test_abc/content/images/2021/08/link.jpg")
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_reimport_adds_suffix() {
        let dir = TempDir::new().unwrap();
        write_jpeg(dir.path(), "content/images/2021/08/f.jpg");

        let (importer, storage) = importer(false);
        importer.run(dir.path()).await.unwrap();
        importer.run(dir.path()).await.unwrap();

        assert!(storage
            .exists("test_abc/content/images/2021/08/f-1.jpg")
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_run_on_missing_root_fails() {
        let (importer, _storage) = importer(false);
        let err = importer.run("/nonexistent/content-root").await.unwrap_err();
        assert!(matches!(err, AdapterError::Io { .. }));
    }
}
