//! Constants shared across the workspace.

/// Prefix of every environment variable the adapter reads.
pub const ENV_PREFIX: &str = "GHOST_STORAGE_ADAPTER_R2_";

/// Cache-Control header attached to every object write (30 days).
pub const CACHE_CONTROL: &str = "max-age=2592000";

/// Suffix the host appends to a temp file path once it has produced its own
/// resized variant of the upload.
pub const PROCESSED_MARKER: &str = "_processed";

/// Object metadata key carrying the end user's original filename.
pub const ORIGINAL_NAME_METADATA_KEY: &str = "original_name";

pub const DEFAULT_IMAGES_URL_PREFIX: &str = "/content/images/";
pub const DEFAULT_MEDIA_URL_PREFIX: &str = "/content/media/";
pub const DEFAULT_FILES_URL_PREFIX: &str = "/content/files/";

pub const DEFAULT_RESIZE_WIDTHS: [u32; 9] = [300, 600, 1000, 1600, 400, 750, 960, 1140, 1200];
pub const DEFAULT_JPEG_QUALITY: u8 = 80;
pub const DEFAULT_REGION: &str = "auto";
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Segment inserted before the width marker of a derivative directory.
pub const DERIVATIVE_SEGMENT: &str = "size";

/// Content subtree the bulk importer understands, relative to the import root.
pub const IMPORT_CONTENT_SUBTREE: &str = "/content/images";

/// Directory the legacy host stored images under; used to rebuild `targetDir`.
pub const LEGACY_IMAGES_DIR: &str = "/var/lib/ghost/content/images";
