//! Path/key resolution for primaries and derivatives.
//!
//! Live uploads land under `<content prefix><type prefix><YYYY>/<MM>`; imports
//! keep the directory of their legacy URL path. Derivatives of either insert
//! `size/w<width>` right after the type prefix (`/content/images`).

use std::sync::Arc;

use chrono::Datelike;
use stowage_core::constants::DERIVATIVE_SEGMENT;
use stowage_core::{AdapterConfig, StorageType, UploadRequest};
use stowage_storage::keys::{join, strip_leading_slash};
use stowage_storage::Storage;

use crate::error::{AdapterError, AdapterResult};

/// Number of leading path segments that identify the content type in a
/// legacy path (`content/images`).
const TYPE_SEGMENTS: usize = 2;

/// Directory a request resolves to, before the filename is chosen.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TargetDirectory {
    Dated {
        content_prefix: String,
        type_prefix: String,
        year_month: String,
    },
    Legacy {
        content_prefix: String,
        segments: Vec<String>,
    },
}

impl TargetDirectory {
    /// Directory of the primary object.
    pub fn primary(&self) -> String {
        match self {
            TargetDirectory::Dated {
                content_prefix,
                type_prefix,
                year_month,
            } => join(&[
                content_prefix.as_str(),
                type_prefix.as_str(),
                year_month.as_str(),
            ]),
            TargetDirectory::Legacy {
                content_prefix,
                segments,
            } => join(&[content_prefix.as_str(), "/", segments.join("/").as_str()]),
        }
    }

    /// Directory of the derivative at `width`.
    pub fn derivative(&self, width: u32) -> String {
        let marker = format!("w{}", width);
        match self {
            TargetDirectory::Dated {
                content_prefix,
                type_prefix,
                year_month,
            } => join(&[
                content_prefix.as_str(),
                type_prefix.as_str(),
                DERIVATIVE_SEGMENT,
                marker.as_str(),
                year_month.as_str(),
            ]),
            TargetDirectory::Legacy {
                content_prefix,
                segments,
            } => {
                let mut segments: Vec<&str> = segments.iter().map(String::as_str).collect();
                if is_derivative_marker(&segments) {
                    segments.drain(TYPE_SEGMENTS..TYPE_SEGMENTS + 2);
                }
                let at = TYPE_SEGMENTS.min(segments.len());
                segments.insert(at, marker.as_str());
                segments.insert(at, DERIVATIVE_SEGMENT);
                join(&[content_prefix.as_str(), "/", segments.join("/").as_str()])
            }
        }
    }
}

/// True when a legacy path already points into a `size/w<N>` subtree.
fn is_derivative_marker(segments: &[&str]) -> bool {
    match (segments.get(TYPE_SEGMENTS), segments.get(TYPE_SEGMENTS + 1)) {
        (Some(size), Some(width)) => {
            *size == DERIVATIVE_SEGMENT
                && width
                    .strip_prefix('w')
                    .is_some_and(|n| !n.is_empty() && n.chars().all(|c| c.is_ascii_digit()))
        }
        _ => false,
    }
}

/// Replace every character outside `[A-Za-z0-9_@.-]` with `-`.
pub fn sanitize(stem: &str) -> String {
    stem.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '_' | '@' | '.' | '-') {
                c
            } else {
                '-'
            }
        })
        .collect()
}

#[derive(Clone)]
pub struct KeyResolver {
    config: Arc<AdapterConfig>,
}

impl KeyResolver {
    pub fn new(config: Arc<AdapterConfig>) -> Self {
        Self { config }
    }

    /// Resolve the target directory. Live uploads use `today` for the dated part.
    pub fn resolve_directory<D: Datelike>(
        &self,
        request: &UploadRequest,
        today: &D,
    ) -> AdapterResult<TargetDirectory> {
        match request {
            UploadRequest::Live(_) => Ok(TargetDirectory::Dated {
                content_prefix: self.config.content_prefix().to_string(),
                type_prefix: self.config.type_prefix().to_string(),
                year_month: format!("{:04}/{:02}", today.year(), today.month()),
            }),
            UploadRequest::Imported(upload) => {
                if upload.new_path.is_empty() {
                    return Err(AdapterError::Resolution(format!(
                        "Imported file {} has no legacy path",
                        upload.name
                    )));
                }
                let dir = match upload.new_path.rsplit_once('/') {
                    Some((dir, _)) => dir,
                    None => "",
                };
                let segments: Vec<String> = dir
                    .split('/')
                    .filter(|s| !s.is_empty() && *s != ".")
                    .map(String::from)
                    .collect();
                if segments.is_empty() {
                    return Err(AdapterError::Resolution(format!(
                        "Legacy path {} has no directory",
                        upload.new_path
                    )));
                }
                if segments.iter().any(|s| s == "..") {
                    return Err(AdapterError::Resolution(format!(
                        "Legacy path {} escapes the content root",
                        upload.new_path
                    )));
                }
                Ok(TargetDirectory::Legacy {
                    content_prefix: self.config.content_prefix().to_string(),
                    segments,
                })
            }
        }
    }

    /// Choose the filename inside `directory`.
    ///
    /// A naming token wins outright for Images and Media; everything else goes
    /// through the sequential-suffix policy, which probes `storage`.
    pub async fn resolve_file_name(
        &self,
        request: &UploadRequest,
        directory: &str,
        token: Option<&str>,
        storage: &dyn Storage,
    ) -> AdapterResult<String> {
        let ext = request.ext();
        match token {
            Some(token) if self.config.storage_type() != StorageType::Files => {
                Ok(format!("{}{}", token, ext))
            }
            _ => self.unique_file_name(request.stem(), &ext, directory, storage).await,
        }
    }

    /// First of `stem.ext`, `stem-1.ext`, `stem-2.ext`… absent from the store.
    ///
    /// Probe-then-write is not atomic: two concurrent saves may pick the same name.
    async fn unique_file_name(
        &self,
        stem: &str,
        ext: &str,
        directory: &str,
        storage: &dyn Storage,
    ) -> AdapterResult<String> {
        let stem = sanitize(stem);
        let mut attempt: u32 = 0;
        loop {
            let candidate = if attempt == 0 {
                format!("{}{}", stem, ext)
            } else {
                format!("{}-{}{}", stem, attempt, ext)
            };
            let key = Self::key(directory, &candidate);
            if !storage.exists(&key).await? {
                return Ok(candidate);
            }
            tracing::debug!(key = %key, "Storage key taken, trying next suffix");
            attempt += 1;
        }
    }

    /// Object store key for `file_name` inside `directory`.
    pub fn key(directory: &str, file_name: &str) -> String {
        strip_leading_slash(&join(&[directory, file_name])).to_string()
    }
}
