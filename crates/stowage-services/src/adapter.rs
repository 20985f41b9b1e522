//! Save orchestrator.
//!
//! [`StorageAdapter`] is the surface the host talks to: `save`, `exists`,
//! `read`, `delete` and a capability query. `save` decides whether a file is
//! kept, which key it lands under and which responsive derivatives are written
//! next to it.

use std::sync::Arc;

use bytes::Bytes;
use futures::future::try_join_all;
use stowage_core::constants::{CACHE_CONTROL, ORIGINAL_NAME_METADATA_KEY};
use stowage_core::{AdapterConfig, AdapterSettings, StorageBackend, StorageType, UploadRequest};
use stowage_processing::{
    detect_content_type, is_resizable, ImageResizer, ImageTransformer, ProcessingError,
};
use stowage_storage::keys::{join, public_url, strip_leading_slash};
use stowage_storage::{create_storage, ObjectAttributes, Storage};
use uuid::Uuid;

use crate::error::{AdapterError, AdapterResult};
use crate::resolver::{KeyResolver, TargetDirectory};

/// Host-visible feature flags.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AdapterCapabilities {
    /// The host may emit `srcset` attributes pointing at `size/w<N>` derivatives.
    pub responsive_srcset: bool,
}

/// Arguments of [`StorageAdapter::read`].
#[derive(Clone, Debug, Default)]
pub struct ReadOptions {
    /// Public URL or URL path of the object.
    pub path: Option<String>,
}

#[derive(Clone)]
pub struct StorageAdapter {
    config: Arc<AdapterConfig>,
    storage: Arc<dyn Storage>,
    resizer: Arc<dyn ImageResizer>,
    resolver: KeyResolver,
}

impl StorageAdapter {
    pub fn new(config: AdapterConfig, storage: Arc<dyn Storage>) -> Self {
        Self::with_resizer(config, storage, Arc::new(ImageTransformer::new()))
    }

    pub fn with_resizer(
        config: AdapterConfig,
        storage: Arc<dyn Storage>,
        resizer: Arc<dyn ImageResizer>,
    ) -> Self {
        let config = Arc::new(config);
        tracing::info!(
            storage_type = %config.storage_type(),
            path_prefix = %config.path_prefix(),
            backend = %storage.backend_type(),
            "Storage adapter handling {} at {}",
            config.storage_type(),
            config.path_prefix()
        );
        Self {
            resolver: KeyResolver::new(config.clone()),
            config,
            storage,
            resizer,
        }
    }

    /// Build an adapter from `settings` merged with the process environment.
    pub fn from_env(settings: &AdapterSettings, backend: StorageBackend) -> AdapterResult<Self> {
        let config = AdapterConfig::from_env(settings)?;
        let storage = create_storage(&config, backend)?;
        Ok(Self::new(config, storage))
    }

    pub fn config(&self) -> &AdapterConfig {
        &self.config
    }

    pub fn capabilities(&self) -> AdapterCapabilities {
        AdapterCapabilities {
            responsive_srcset: self.config.supports_responsive_srcset(),
        }
    }

    /// Persist one upload and return its public URL.
    ///
    /// Returns an empty string when the upload is an original the host asked
    /// to discard. `force_unique_token` replaces the generated name token when
    /// token naming is active.
    #[tracing::instrument(
        skip(self, request, force_unique_token),
        fields(name = %request.base_name(), import = request.is_import())
    )]
    pub async fn save(
        &self,
        request: UploadRequest,
        force_unique_token: Option<&str>,
    ) -> AdapterResult<String> {
        let is_import = request.is_import();
        let is_original = request.is_original_image();

        if self.discards(is_original, is_import) {
            tracing::info!(path = %request.path().display(), "Original image not saved");
            return Ok(String::new());
        }

        if request.has_conflicting_ext() {
            return Err(AdapterError::Resolution(format!(
                "Extension {} does not match {}",
                request.ext(),
                request.base_name()
            )));
        }

        let token = if self.config.uuid_name() && !is_import {
            Some(
                force_unique_token
                    .map(str::to_string)
                    .unwrap_or_else(|| Uuid::new_v4().to_string()),
            )
        } else {
            None
        };

        let content_type = request
            .content_type()
            .map(str::to_string)
            .or_else(|| detect_content_type(request.base_name(), request.path()));

        let attributes = ObjectAttributes {
            content_type: content_type.clone(),
            cache_control: Some(CACHE_CONTROL.to_string()),
            metadata: self.metadata(&request)?,
        };

        let data = tokio::fs::read(request.path())
            .await
            .map(Bytes::from)
            .map_err(|source| AdapterError::Io {
                path: request.path().to_path_buf(),
                source,
            })?;

        let directory = self
            .resolver
            .resolve_directory(&request, &chrono::Local::now())?;
        let file_name = self
            .resolver
            .resolve_file_name(
                &request,
                &directory.primary(),
                token.as_deref(),
                self.storage.as_ref(),
            )
            .await?;
        let key = KeyResolver::key(&directory.primary(), &file_name);

        self.storage.put(&key, data.clone(), &attributes).await?;
        tracing::info!(key = %key, "Saved primary");

        if self.derives(is_original, is_import) {
            match content_type.as_deref() {
                Some(content_type) if is_resizable(content_type) => {
                    self.write_derivatives(&directory, &file_name, data, content_type, &attributes)
                        .await?;
                }
                other => {
                    tracing::debug!(
                        content_type = ?other,
                        key = %key,
                        "Content type cannot be resized, skipping derivatives"
                    );
                }
            }
        }

        Ok(public_url(self.config.domain(), &key))
    }

    /// Discard guard: the host keeps its own resized copy, so the raw original
    /// is dropped when `save_original` is off. Imports are always kept.
    fn discards(&self, is_original: bool, is_import: bool) -> bool {
        !self.config.save_original() && is_original && self.config.ghost_resize() && !is_import
    }

    /// Derivative trigger.
    ///
    /// With host-side resizing, only the host's resized file is derived from;
    /// without it, the single original is. Imports always derive.
    fn derives(&self, is_original: bool, is_import: bool) -> bool {
        if self.config.storage_type() != StorageType::Images || !self.config.responsive_images() {
            return false;
        }
        let ghost_resize = self.config.ghost_resize();
        (ghost_resize && !is_original) || (!ghost_resize && is_original) || is_import
    }

    fn metadata(&self, request: &UploadRequest) -> AdapterResult<Vec<(String, String)>> {
        if !self.config.save_orig_name_metadata() {
            return Ok(Vec::new());
        }
        let original_name = request.original_name().ok_or_else(|| {
            AdapterError::Metadata(format!(
                "No original name for {} while original name metadata is enabled",
                request.base_name()
            ))
        })?;
        let base = original_name.rsplit('/').next().unwrap_or(original_name);
        Ok(vec![(ORIGINAL_NAME_METADATA_KEY.to_string(), base.to_string())])
    }

    /// Resize and write every configured width concurrently. The first failure
    /// fails the save; derivatives already written stay in the store.
    async fn write_derivatives(
        &self,
        directory: &TargetDirectory,
        file_name: &str,
        data: Bytes,
        content_type: &str,
        attributes: &ObjectAttributes,
    ) -> AdapterResult<()> {
        let jpeg_quality = self.config.jpeg_quality();
        let writes = self.config.resize_widths().iter().map(|&width| {
            let key = KeyResolver::key(&directory.derivative(width), file_name);
            let data = data.clone();
            let content_type = content_type.to_string();
            let resizer = self.resizer.clone();

            async move {
                let resized = tokio::task::spawn_blocking(move || {
                    resizer.resize_to_width(&data, width, &content_type, jpeg_quality)
                })
                .await
                .map_err(|e| ProcessingError::Task(e.to_string()))??;

                self.storage.put(&key, resized, attributes).await?;
                tracing::debug!(key = %key, width = width, "Saved derivative");
                Ok::<_, AdapterError>(())
            }
        });

        try_join_all(writes).await?;
        Ok(())
    }

    /// HEAD probe for `target_dir/file_name`, or `file_name` alone.
    #[tracing::instrument(skip(self))]
    pub async fn exists(&self, file_name: &str, target_dir: Option<&str>) -> AdapterResult<bool> {
        let path = match target_dir {
            Some(dir) => join(&[dir, file_name]),
            None => file_name.to_string(),
        };
        Ok(self.storage.exists(strip_leading_slash(&path)).await?)
    }

    /// Fetch an object by its public URL or URL path.
    #[tracing::instrument(skip(self))]
    pub async fn read(&self, options: ReadOptions) -> AdapterResult<Bytes> {
        let path = options.path.ok_or_else(|| {
            AdapterError::InvalidArgument("read() requires options.path".to_string())
        })?;
        let relative = path.strip_prefix(self.config.domain()).unwrap_or(&path);
        Ok(self.storage.get(strip_leading_slash(relative)).await?)
    }

    /// Deleting objects is not supported; always `false`.
    pub async fn delete(&self, file_name: &str, target_dir: Option<&str>) -> bool {
        tracing::error!(
            file_name = %file_name,
            target_dir = ?target_dir,
            "delete() is not implemented"
        );
        false
    }
}
