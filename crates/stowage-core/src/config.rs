//! Configuration module
//!
//! An adapter is configured from two sources: an explicit [`AdapterSettings`]
//! value handed over by the host, and the process environment
//! (`GHOST_STORAGE_ADAPTER_R2_*`). Environment values win. The merge is a pure
//! function of both inputs and produces an immutable [`AdapterConfig`].

use std::fmt;

use serde::de::{self, Deserializer};
use serde::Deserialize;

use crate::constants::{
    DEFAULT_FILES_URL_PREFIX, DEFAULT_IMAGES_URL_PREFIX, DEFAULT_JPEG_QUALITY, DEFAULT_LOG_LEVEL,
    DEFAULT_MEDIA_URL_PREFIX, DEFAULT_REGION, DEFAULT_RESIZE_WIDTHS, ENV_PREFIX,
};
use crate::error::ConfigError;
use crate::storage_types::StorageType;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Explicit configuration object supplied by the host.
///
/// Every field is optional; anything left unset falls back to the environment
/// and then to the built-in default. Keys may use the short names below or
/// the full environment variable names (`GHOST_STORAGE_ADAPTER_R2_DOMAIN`),
/// and flags, widths and quality also accept their environment string form.
/// Unknown keys are rejected.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AdapterSettings {
    #[serde(alias = "GHOST_STORAGE_ADAPTER_R2_DOMAIN")]
    pub domain: Option<String>,
    #[serde(alias = "GHOST_STORAGE_ADAPTER_R2_BUCKET")]
    pub bucket: Option<String>,
    #[serde(alias = "GHOST_STORAGE_ADAPTER_R2_ENDPOINT")]
    pub endpoint: Option<String>,
    #[serde(alias = "GHOST_STORAGE_ADAPTER_R2_ACCOUNT_ID")]
    pub account_id: Option<String>,
    #[serde(alias = "GHOST_STORAGE_ADAPTER_R2_ACCESS_KEY_ID")]
    pub access_key_id: Option<String>,
    #[serde(alias = "GHOST_STORAGE_ADAPTER_R2_SECRET_ACCESS_KEY")]
    pub secret_access_key: Option<String>,
    #[serde(alias = "GHOST_STORAGE_ADAPTER_R2_REGION")]
    pub region: Option<String>,
    #[serde(alias = "GHOST_STORAGE_ADAPTER_R2_IMAGES_URL_PREFIX")]
    pub images_url_prefix: Option<String>,
    #[serde(alias = "GHOST_STORAGE_ADAPTER_R2_MEDIA_URL_PREFIX")]
    pub media_url_prefix: Option<String>,
    #[serde(alias = "GHOST_STORAGE_ADAPTER_R2_FILES_URL_PREFIX")]
    pub files_url_prefix: Option<String>,
    #[serde(alias = "GHOST_STORAGE_ADAPTER_R2_CONTENT_PREFIX")]
    pub content_prefix: Option<String>,
    #[serde(
        alias = "GHOST_STORAGE_ADAPTER_R2_RESPONSIVE_IMAGES",
        deserialize_with = "lenient_bool"
    )]
    pub responsive_images: Option<bool>,
    #[serde(
        alias = "GHOST_STORAGE_ADAPTER_R2_RESIZE_WIDTHS",
        deserialize_with = "lenient_widths"
    )]
    pub resize_widths: Option<Vec<u32>>,
    #[serde(
        alias = "GHOST_STORAGE_ADAPTER_R2_RESIZE_JPEG_QUALITY",
        deserialize_with = "lenient_quality"
    )]
    pub jpeg_quality: Option<u8>,
    #[serde(alias = "GHOST_STORAGE_ADAPTER_R2_UUID_NAME", deserialize_with = "lenient_bool")]
    pub uuid_name: Option<bool>,
    #[serde(
        alias = "GHOST_STORAGE_ADAPTER_R2_SAVE_ORIGINAL",
        deserialize_with = "lenient_bool"
    )]
    pub save_original: Option<bool>,
    #[serde(
        alias = "GHOST_STORAGE_ADAPTER_R2_GHOST_RESIZE",
        deserialize_with = "lenient_bool"
    )]
    pub ghost_resize: Option<bool>,
    #[serde(
        alias = "GHOST_STORAGE_ADAPTER_R2_SAVE_ORIG_NAME_METADATA",
        deserialize_with = "lenient_bool"
    )]
    pub save_orig_name_metadata: Option<bool>,
    #[serde(
        alias = "GHOST_STORAGE_ADAPTER_R2_SUPPORTS_RESPONSIVE_SRCSET",
        deserialize_with = "lenient_bool"
    )]
    pub supports_responsive_srcset: Option<bool>,
    #[serde(alias = "GHOST_STORAGE_ADAPTER_R2_LOG_LEVEL")]
    pub log_level: Option<String>,
    #[serde(deserialize_with = "lenient_bool")]
    pub storage_type_images: Option<bool>,
    #[serde(deserialize_with = "lenient_bool")]
    pub storage_type_media: Option<bool>,
    #[serde(deserialize_with = "lenient_bool")]
    pub storage_type_files: Option<bool>,
}

/// A settings value given either typed or as its environment string.
#[derive(Deserialize)]
#[serde(untagged)]
enum Lenient<T> {
    Typed(T),
    Text(String),
}

fn lenient<'de, D, T>(
    deserializer: D,
    parse: fn(&str) -> Result<T, String>,
) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    match Option::<Lenient<T>>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Lenient::Typed(value)) => Ok(Some(value)),
        Some(Lenient::Text(raw)) if raw.is_empty() => Ok(None),
        Some(Lenient::Text(raw)) => parse(&raw).map(Some).map_err(de::Error::custom),
    }
}

fn lenient_bool<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<bool>, D::Error> {
    lenient(deserializer, |raw| {
        literal_bool(raw).ok_or_else(|| format!("expected \"true\" or \"false\", got {:?}", raw))
    })
}

fn lenient_widths<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<Vec<u32>>, D::Error> {
    lenient(deserializer, parse_widths)
}

fn lenient_quality<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u8>, D::Error> {
    lenient(deserializer, parse_quality)
}

impl AdapterSettings {
    fn storage_type(&self) -> StorageType {
        if self.storage_type_images == Some(true) {
            StorageType::Images
        } else if self.storage_type_media == Some(true) {
            StorageType::Media
        } else if self.storage_type_files == Some(true) {
            StorageType::Files
        } else {
            StorageType::Images
        }
    }
}

/// Raw environment values, keyed by the variable name without [`ENV_PREFIX`].
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct EnvSettings {
    domain: Option<String>,
    bucket: Option<String>,
    endpoint: Option<String>,
    account_id: Option<String>,
    access_key_id: Option<String>,
    secret_access_key: Option<String>,
    region: Option<String>,
    images_url_prefix: Option<String>,
    media_url_prefix: Option<String>,
    files_url_prefix: Option<String>,
    content_prefix: Option<String>,
    responsive_images: Option<String>,
    resize_widths: Option<String>,
    resize_jpeg_quality: Option<String>,
    uuid_name: Option<String>,
    save_original: Option<String>,
    ghost_resize: Option<String>,
    save_orig_name_metadata: Option<String>,
    supports_responsive_srcset: Option<String>,
    log_level: Option<String>,
}

/// Resolved, immutable configuration for one adapter instance.
#[derive(Clone)]
pub struct AdapterConfig {
    domain: String,
    bucket: String,
    endpoint: String,
    region: String,
    access_key_id: String,
    secret_access_key: String,
    storage_type: StorageType,
    images_url_prefix: String,
    media_url_prefix: String,
    files_url_prefix: String,
    content_prefix: String,
    responsive_images: bool,
    resize_widths: Vec<u32>,
    jpeg_quality: u8,
    uuid_name: bool,
    save_original: bool,
    ghost_resize: bool,
    save_orig_name_metadata: bool,
    supports_responsive_srcset: bool,
    log_level: String,
}

impl AdapterConfig {
    /// Merge `settings` with the process environment.
    ///
    /// A `.env` file in the working directory is loaded first when present.
    pub fn from_env(settings: &AdapterSettings) -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::resolve(settings, std::env::vars())
    }

    /// Merge `settings` with the given environment pairs. Environment wins.
    pub fn resolve<I>(settings: &AdapterSettings, env: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let env: EnvSettings = envy::prefixed(ENV_PREFIX).from_iter(env)?;

        let domain = required("domain", env.domain, &settings.domain)?;
        let bucket = required("bucket", env.bucket, &settings.bucket)?;
        let access_key_id = required("access_key_id", env.access_key_id, &settings.access_key_id)?;
        let secret_access_key = required(
            "secret_access_key",
            env.secret_access_key,
            &settings.secret_access_key,
        )?;

        let endpoint = match pick(env.endpoint, &settings.endpoint) {
            Some(endpoint) => endpoint,
            None => match pick(env.account_id, &settings.account_id) {
                Some(account_id) => format!("https://{}.r2.cloudflarestorage.com", account_id),
                None => return Err(ConfigError::Missing(env_name("endpoint"))),
            },
        };

        let storage_type = settings.storage_type();

        let config = AdapterConfig {
            domain: domain.trim_end_matches('/').to_string(),
            bucket,
            endpoint,
            region: pick(env.region, &settings.region)
                .unwrap_or_else(|| DEFAULT_REGION.to_string()),
            access_key_id,
            secret_access_key,
            storage_type,
            images_url_prefix: pick(env.images_url_prefix, &settings.images_url_prefix)
                .unwrap_or_else(|| DEFAULT_IMAGES_URL_PREFIX.to_string()),
            media_url_prefix: pick(env.media_url_prefix, &settings.media_url_prefix)
                .unwrap_or_else(|| DEFAULT_MEDIA_URL_PREFIX.to_string()),
            files_url_prefix: pick(env.files_url_prefix, &settings.files_url_prefix)
                .unwrap_or_else(|| DEFAULT_FILES_URL_PREFIX.to_string()),
            content_prefix: pick(env.content_prefix, &settings.content_prefix).unwrap_or_default(),
            responsive_images: flag(
                "responsive_images",
                env.responsive_images,
                settings.responsive_images,
                false,
            )?,
            resize_widths: widths(env.resize_widths, &settings.resize_widths)?,
            jpeg_quality: quality(env.resize_jpeg_quality, settings.jpeg_quality)?,
            uuid_name: flag("uuid_name", env.uuid_name, settings.uuid_name, false)?,
            save_original: flag("save_original", env.save_original, settings.save_original, true)?,
            ghost_resize: flag("ghost_resize", env.ghost_resize, settings.ghost_resize, true)?,
            save_orig_name_metadata: flag(
                "save_orig_name_metadata",
                env.save_orig_name_metadata,
                settings.save_orig_name_metadata,
                false,
            )?,
            supports_responsive_srcset: flag(
                "supports_responsive_srcset",
                env.supports_responsive_srcset,
                settings.supports_responsive_srcset,
                storage_type == StorageType::Images,
            )?,
            log_level: log_level(pick(env.log_level, &settings.log_level)),
        };

        tracing::debug!(
            storage_type = %config.storage_type,
            path_prefix = %config.path_prefix(),
            responsive_images = config.responsive_images,
            uuid_name = config.uuid_name,
            "Adapter configuration resolved"
        );

        Ok(config)
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    pub fn access_key_id(&self) -> &str {
        &self.access_key_id
    }

    pub fn secret_access_key(&self) -> &str {
        &self.secret_access_key
    }

    pub fn storage_type(&self) -> StorageType {
        self.storage_type
    }

    /// URL prefix of the active storage type, e.g. `/content/images/`.
    pub fn type_prefix(&self) -> &str {
        match self.storage_type {
            StorageType::Images => &self.images_url_prefix,
            StorageType::Media => &self.media_url_prefix,
            StorageType::Files => &self.files_url_prefix,
        }
    }

    /// Base of every key: content prefix followed by the active type prefix.
    pub fn path_prefix(&self) -> String {
        format!("{}{}", self.content_prefix, self.type_prefix())
    }

    pub fn content_prefix(&self) -> &str {
        &self.content_prefix
    }

    pub fn responsive_images(&self) -> bool {
        self.responsive_images
    }

    pub fn resize_widths(&self) -> &[u32] {
        &self.resize_widths
    }

    pub fn jpeg_quality(&self) -> u8 {
        self.jpeg_quality
    }

    pub fn uuid_name(&self) -> bool {
        self.uuid_name
    }

    pub fn save_original(&self) -> bool {
        self.save_original
    }

    pub fn ghost_resize(&self) -> bool {
        self.ghost_resize
    }

    pub fn save_orig_name_metadata(&self) -> bool {
        self.save_orig_name_metadata
    }

    pub fn supports_responsive_srcset(&self) -> bool {
        self.supports_responsive_srcset
    }

    pub fn log_level(&self) -> &str {
        &self.log_level
    }
}

impl fmt::Debug for AdapterConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdapterConfig")
            .field("domain", &self.domain)
            .field("bucket", &self.bucket)
            .field("endpoint", &self.endpoint)
            .field("region", &self.region)
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"<redacted>")
            .field("storage_type", &self.storage_type)
            .field("path_prefix", &self.path_prefix())
            .field("responsive_images", &self.responsive_images)
            .field("resize_widths", &self.resize_widths)
            .field("jpeg_quality", &self.jpeg_quality)
            .field("uuid_name", &self.uuid_name)
            .field("save_original", &self.save_original)
            .field("ghost_resize", &self.ghost_resize)
            .field("save_orig_name_metadata", &self.save_orig_name_metadata)
            .field("supports_responsive_srcset", &self.supports_responsive_srcset)
            .field("log_level", &self.log_level)
            .finish()
    }
}

fn env_name(key: &str) -> String {
    format!("{}{}", ENV_PREFIX, key.to_uppercase())
}

/// Environment value if non-empty, otherwise the explicit one if non-empty.
fn pick(env: Option<String>, explicit: &Option<String>) -> Option<String> {
    env.filter(|v| !v.is_empty())
        .or_else(|| explicit.clone().filter(|v| !v.is_empty()))
}

fn required(
    key: &str,
    env: Option<String>,
    explicit: &Option<String>,
) -> Result<String, ConfigError> {
    pick(env, explicit).ok_or_else(|| ConfigError::Missing(env_name(key)))
}

fn literal_bool(raw: &str) -> Option<bool> {
    match raw {
        "true" => Some(true),
        "false" => Some(false),
        _ => None,
    }
}

fn parse_bool(key: &str, raw: &str) -> Result<bool, ConfigError> {
    literal_bool(raw).ok_or_else(|| ConfigError::InvalidBool {
        name: env_name(key),
        value: raw.to_string(),
    })
}

fn flag(
    key: &str,
    env: Option<String>,
    explicit: Option<bool>,
    default: bool,
) -> Result<bool, ConfigError> {
    match env.filter(|v| !v.is_empty()) {
        Some(raw) => parse_bool(key, &raw),
        None => Ok(explicit.unwrap_or(default)),
    }
}

fn widths(env: Option<String>, explicit: &Option<Vec<u32>>) -> Result<Vec<u32>, ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidValue {
        name: env_name("resize_widths"),
        reason,
    };

    let widths = match env.filter(|v| !v.is_empty()) {
        Some(raw) => parse_widths(&raw).map_err(invalid)?,
        None => explicit
            .clone()
            .unwrap_or_else(|| DEFAULT_RESIZE_WIDTHS.to_vec()),
    };

    if widths.contains(&0) {
        return Err(invalid("widths must be positive".to_string()));
    }

    Ok(widths)
}

fn parse_widths(raw: &str) -> Result<Vec<u32>, String> {
    raw.split(',')
        .map(|w| {
            w.trim()
                .parse::<u32>()
                .map_err(|_| format!("{:?} is not an integer width", w.trim()))
        })
        .collect()
}

fn parse_quality(raw: &str) -> Result<u8, String> {
    raw.trim()
        .parse::<u8>()
        .map_err(|_| format!("{:?} is not an integer between 1 and 100", raw))
}

fn quality(env: Option<String>, explicit: Option<u8>) -> Result<u8, ConfigError> {
    let name = env_name("resize_jpeg_quality");
    let quality = match env.filter(|v| !v.is_empty()) {
        Some(raw) => parse_quality(&raw).map_err(|reason| ConfigError::InvalidValue {
            name: name.clone(),
            reason,
        })?,
        None => explicit.unwrap_or(DEFAULT_JPEG_QUALITY),
    };

    if !(1..=100).contains(&quality) {
        return Err(ConfigError::InvalidValue {
            name,
            reason: format!("{} is outside 1..=100", quality),
        });
    }

    Ok(quality)
}

fn log_level(raw: Option<String>) -> String {
    let level = raw.map(|l| l.to_lowercase()).unwrap_or_default();
    if LOG_LEVELS.contains(&level.as_str()) {
        level
    } else {
        DEFAULT_LOG_LEVEL.to_string()
    }
}
