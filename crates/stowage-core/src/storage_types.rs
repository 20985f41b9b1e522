use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

use crate::error::ConfigError;

/// Kind of content an adapter instance is responsible for.
///
/// Exactly one type is active per adapter; it selects the URL prefix every key
/// is built under and whether responsive derivatives can be produced at all.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageType {
    #[default]
    Images,
    Media,
    Files,
}

impl FromStr for StorageType {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "images" => Ok(StorageType::Images),
            "media" => Ok(StorageType::Media),
            "files" => Ok(StorageType::Files),
            _ => Err(ConfigError::InvalidValue {
                name: "storage type".to_string(),
                reason: format!("unknown storage type {}", s),
            }),
        }
    }
}

impl Display for StorageType {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            StorageType::Images => write!(f, "images"),
            StorageType::Media => write!(f, "media"),
            StorageType::Files => write!(f, "files"),
        }
    }
}

/// Object store backend types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// S3-compatible endpoint (Cloudflare R2, MinIO, AWS S3)
    S3,
    /// Process-local store; nothing survives the process
    Memory,
}

impl FromStr for StorageBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "s3" => Ok(StorageBackend::S3),
            "memory" => Ok(StorageBackend::Memory),
            _ => Err(ConfigError::InvalidValue {
                name: "storage backend".to_string(),
                reason: format!("unknown storage backend {}", s),
            }),
        }
    }
}

impl Display for StorageBackend {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            StorageBackend::S3 => write!(f, "s3"),
            StorageBackend::Memory => write!(f, "memory"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_case_insensitively() {
        assert_eq!("Images".parse::<StorageType>().unwrap(), StorageType::Images);
        assert_eq!("MEDIA".parse::<StorageType>().unwrap(), StorageType::Media);
        assert_eq!("files".parse::<StorageType>().unwrap(), StorageType::Files);
        assert!("videos".parse::<StorageType>().is_err());
    }

    #[test]
    fn parses_backend() {
        assert_eq!("S3".parse::<StorageBackend>().unwrap(), StorageBackend::S3);
        assert_eq!("memory".parse::<StorageBackend>().unwrap(), StorageBackend::Memory);
        assert!("nfs".parse::<StorageBackend>().is_err());
    }

    #[test]
    fn display_round_trips() {
        for ty in [StorageType::Images, StorageType::Media, StorageType::Files] {
            assert_eq!(ty.to_string().parse::<StorageType>().unwrap(), ty);
        }
    }
}
