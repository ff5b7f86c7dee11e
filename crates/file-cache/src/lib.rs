//! File-backed key/value cache
//!
//! Values are written to one file per key under a cache root
//! (`$DATABASE/cache` by default) and mirrored in an in-memory index, so
//! reads of recently written keys never touch the disk. Reads of keys that
//! are not in the index fall back to the file.

mod cache;
mod config;
mod error;
mod key;
pub mod telemetry;
mod types;

pub use cache::FileCache;
pub use config::{CacheConfig, CACHE_SUBDIR, DATABASE_ENV};
pub use error::{CacheError, Result};
pub use key::CacheKey;
pub use types::CacheStats;
