//! Key validation and public URL helpers.

use crate::traits::{StorageError, StorageResult};

pub fn strip_leading_slash(s: &str) -> &str {
    s.strip_prefix('/').unwrap_or(s)
}

/// Public URL of a key: `<domain>/<key without leading slash>`.
pub fn public_url(domain: &str, key: &str) -> String {
    format!("{}/{}", domain.trim_end_matches('/'), strip_leading_slash(key))
}

/// Join key segments the way a POSIX path join does, collapsing repeated slashes.
///
/// A leading slash on the first non-empty segment is kept.
pub fn join(segments: &[&str]) -> String {
    let absolute = segments
        .iter()
        .find(|s| !s.is_empty())
        .is_some_and(|s| s.starts_with('/'));

    let parts: Vec<&str> = segments
        .iter()
        .flat_map(|s| s.split('/'))
        .filter(|p| !p.is_empty() && *p != ".")
        .collect();

    let joined = parts.join("/");
    if absolute {
        format!("/{}", joined)
    } else {
        joined
    }
}

/// Reject keys that cannot address an object.
pub fn validate_key(key: &str) -> StorageResult<()> {
    if key.is_empty() {
        return Err(StorageError::InvalidKey("Storage key is empty".to_string()));
    }
    if key.starts_with('/') {
        return Err(StorageError::InvalidKey(format!(
            "Storage key must not start with '/': {}",
            key
        )));
    }
    if key.split('/').any(|segment| segment == "..") {
        return Err(StorageError::InvalidKey(format!(
            "Storage key contains a parent segment: {}",
            key
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn public_url_strips_single_leading_slash() {
        assert_eq!(
            public_url("https://cdn.example.com", "/content/images/a.jpg"),
            "https://cdn.example.com/content/images/a.jpg"
        );
        assert_eq!(
            public_url("https://cdn.example.com/", "content/images/a.jpg"),
            "https://cdn.example.com/content/images/a.jpg"
        );
    }

    #[test]
    fn join_collapses_slashes() {
        assert_eq!(
            join(&["/test_x", "/content/images/", "2024/03"]),
            "/test_x/content/images/2024/03"
        );
        assert_eq!(join(&["", "/content/images/", "a.jpg"]), "/content/images/a.jpg");
        assert_eq!(join(&["content", "images"]), "content/images");
        assert_eq!(join(&["/a/./b", "c"]), "/a/b/c");
    }

    #[test]
    fn validate_key_rejects_bad_keys() {
        assert!(validate_key("content/images/a.jpg").is_ok());
        assert!(validate_key("").is_err());
        assert!(validate_key("/content/images/a.jpg").is_err());
        assert!(validate_key("content/../secrets").is_err());
        // Dots inside a segment are fine.
        assert!(validate_key("content/images/a..b.jpg").is_ok());
    }
}
