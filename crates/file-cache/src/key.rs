//! Cache key validation
//!
//! Keys are relative paths used verbatim as filenames under the cache root.
//! A key may name a nested file (`images/a.png`) but can never climb out of
//! the root. Keys are only accepted in their plain spelling, so one file is
//! never reachable under two keys (`a` vs `./a`, `a/b` vs `a//b`).

use crate::error::{CacheError, Result};
use std::fmt;
use std::path::{Component, Path, PathBuf};

/// A cache key that is safe to join onto the cache root
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn parse(raw: &str) -> Result<Self> {
        if raw.is_empty() {
            return Err(CacheError::InvalidKey("key is empty".to_string()));
        }
        if raw.contains('\0') {
            return Err(CacheError::InvalidKey(format!(
                "key contains a NUL byte: {:?}",
                raw
            )));
        }

        let path = Path::new(raw);
        for component in path.components() {
            match component {
                Component::Normal(_) => {}
                Component::CurDir => {
                    return Err(CacheError::InvalidKey(format!(
                        "key contains a '.' segment: {}",
                        raw
                    )));
                }
                Component::ParentDir => {
                    return Err(CacheError::InvalidKey(format!(
                        "key escapes the cache root: {}",
                        raw
                    )));
                }
                Component::RootDir | Component::Prefix(_) => {
                    return Err(CacheError::InvalidKey(format!(
                        "key must be a relative path: {}",
                        raw
                    )));
                }
            }
        }

        // `Path::components` folds these away, so check the raw segments
        if raw.split('/').any(|segment| segment.is_empty() || segment == ".") {
            return Err(CacheError::InvalidKey(format!(
                "key has an empty or '.' segment: {}",
                raw
            )));
        }

        Ok(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Path of this entry's file under `root`
    pub fn file_path(&self, root: &Path) -> PathBuf {
        root.join(&self.0)
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CacheKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_and_nested_keys_accepted() {
        assert_eq!(CacheKey::parse("avatar.png").unwrap().as_str(), "avatar.png");
        assert_eq!(
            CacheKey::parse("images/2024/a.png").unwrap().as_str(),
            "images/2024/a.png"
        );
    }

    #[test]
    fn test_alternate_spellings_rejected() {
        assert!(CacheKey::parse("./a").is_err());
        assert!(CacheKey::parse("a/./b").is_err());
        assert!(CacheKey::parse("a//b").is_err());
        assert!(CacheKey::parse("a/").is_err());
    }

    #[test]
    fn test_key_used_verbatim_as_filename() {
        let key = CacheKey::parse("users/42.json").unwrap();
        assert_eq!(
            key.file_path(Path::new("/var/db/cache")),
            PathBuf::from("/var/db/cache/users/42.json")
        );
    }

    #[test]
    fn test_traversal_rejected() {
        assert!(CacheKey::parse("../etc/passwd").is_err());
        assert!(CacheKey::parse("..").is_err());
        assert!(CacheKey::parse("a/../../b").is_err());
    }

    #[test]
    fn test_absolute_rejected() {
        let err = CacheKey::parse("/etc/passwd").unwrap_err();
        assert!(err.to_string().contains("relative"));
    }

    #[test]
    fn test_empty_and_degenerate_rejected() {
        assert!(CacheKey::parse("").is_err());
        assert!(CacheKey::parse(".").is_err());
        assert!(CacheKey::parse("bad\0key").is_err());
    }
}
