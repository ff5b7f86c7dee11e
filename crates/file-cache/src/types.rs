//! Cache types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A value held in the in-memory index
#[derive(Debug, Clone)]
pub(crate) struct IndexedValue {
    pub data: Vec<u8>,
    pub written_at: DateTime<Utc>,
}

impl IndexedValue {
    pub fn new(data: Vec<u8>) -> Self {
        Self {
            data,
            written_at: Utc::now(),
        }
    }

    pub fn size(&self) -> u64 {
        self.data.len() as u64
    }
}

/// Statistics about the cache
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStats {
    /// Keys currently held in the in-memory index
    pub entries: usize,
    /// Total payload bytes held in the in-memory index
    pub total_size: u64,
    pub memory_hits: u64,
    pub disk_hits: u64,
    pub misses: u64,
    /// Newest write time among indexed entries
    pub last_write_at: Option<DateTime<Utc>>,
}

impl CacheStats {
    pub fn hits(&self) -> u64 {
        self.memory_hits + self.disk_hits
    }
}
