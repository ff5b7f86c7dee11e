//! Cache location configuration

use crate::error::{CacheError, Result};
use std::path::{Path, PathBuf};

/// Environment variable naming the base data directory
pub const DATABASE_ENV: &str = "DATABASE";

/// Subdirectory of the data directory that holds cache entry files
pub const CACHE_SUBDIR: &str = "cache";

/// Where the cache keeps its files
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    pub database_dir: PathBuf,
}

impl CacheConfig {
    pub fn new(database_dir: impl Into<PathBuf>) -> Self {
        Self {
            database_dir: database_dir.into(),
        }
    }

    /// Load configuration from the `DATABASE` environment variable
    pub fn from_env() -> Result<Self> {
        Self::from_value(std::env::var(DATABASE_ENV).ok())
    }

    fn from_value(value: Option<String>) -> Result<Self> {
        match value {
            Some(dir) if !dir.trim().is_empty() => Ok(Self::new(dir)),
            Some(_) => Err(CacheError::Config(format!("{} is empty", DATABASE_ENV))),
            None => Err(CacheError::Config(format!("{} is not set", DATABASE_ENV))),
        }
    }

    pub fn database_dir(&self) -> &Path {
        &self.database_dir
    }

    /// The cache root: `<database_dir>/cache`
    pub fn cache_dir(&self) -> PathBuf {
        self.database_dir.join(CACHE_SUBDIR)
    }
}
