//! Two-tier cache: in-memory index in front of one file per key

use crate::config::CacheConfig;
use crate::error::Result;
use crate::key::CacheKey;
use crate::types::{CacheStats, IndexedValue};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex as StdMutex, MutexGuard, PoisonError};
use tokio::fs;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, warn};

/// File-backed cache with an in-memory index of the latest writes.
///
/// The files under `root` are authoritative. The index mirrors every
/// successful `set` and is dropped for a key on a successful `delete`; it is
/// never filled from disk reads and starts empty for every new instance.
///
/// Cloning yields another handle onto the same index and root.
#[derive(Clone)]
pub struct FileCache {
    /// Directory holding one file per key (must already exist)
    root: PathBuf,
    /// Latest successfully written value per key
    index: Arc<RwLock<HashMap<String, IndexedValue>>>,
    /// Serializes set/delete on the same key
    writers: Arc<KeyLocks>,
    memory_hits: Arc<AtomicU64>,
    disk_hits: Arc<AtomicU64>,
    misses: Arc<AtomicU64>,
}

impl FileCache {
    /// Create a cache over `root`. The directory is neither created nor checked.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            index: Arc::new(RwLock::new(HashMap::new())),
            writers: Arc::new(KeyLocks::default()),
            memory_hits: Arc::new(AtomicU64::new(0)),
            disk_hits: Arc::new(AtomicU64::new(0)),
            misses: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn from_config(config: &CacheConfig) -> Self {
        Self::new(config.cache_dir())
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// On-disk location of the entry for `key`
    pub fn path_for(&self, key: &str) -> Result<PathBuf> {
        Ok(CacheKey::parse(key)?.file_path(&self.root))
    }

    /// Write `data` to the entry file for `key`, then record it in the index.
    ///
    /// Missing parent directories are not created; the write fails and the
    /// index is left as it was.
    pub async fn set(&self, key: &str, data: impl AsRef<[u8]>) -> Result<()> {
        let key = CacheKey::parse(key)?;
        let data = data.as_ref().to_vec();

        let slot = self.writers.slot(key.as_str());
        let _guard = slot.lock().await;
        self.write_entry(&key, data).await
    }

    // The key stays out of the index while its file is rewritten; reads in
    // that window, or after a cancelled write, are served from disk.
    async fn write_entry(&self, key: &CacheKey, data: Vec<u8>) -> Result<()> {
        let previous = self.index.write().await.remove(key.as_str());

        let path = key.file_path(&self.root);
        if let Err(e) = fs::write(&path, &data).await {
            warn!(key = %key, path = ?path, error = %e, "Failed to write cache file");
            self.restore(key, previous).await;
            return Err(e.into());
        }

        let size = data.len();
        {
            let mut index = self.index.write().await;
            index.insert(key.as_str().to_string(), IndexedValue::new(data));
        }

        debug!(key = %key, size, "Cached entry");
        Ok(())
    }

    async fn restore(&self, key: &CacheKey, previous: Option<IndexedValue>) {
        if let Some(value) = previous {
            let mut index = self.index.write().await;
            index.insert(key.as_str().to_string(), value);
        }
    }

    /// Look up `key`, memory first, then disk.
    ///
    /// Any failure to read the file (absent, unreadable, invalid key) is a
    /// plain miss.
    pub async fn get(&self, key: &str) -> Option<Vec<u8>> {
        let key = match CacheKey::parse(key) {
            Ok(key) => key,
            Err(e) => {
                debug!(key, error = %e, "Rejected cache lookup");
                self.misses.fetch_add(1, Ordering::Relaxed);
                return None;
            }
        };

        let indexed = {
            let index = self.index.read().await;
            index.get(key.as_str()).map(|value| value.data.clone())
        };
        if let Some(data) = indexed {
            self.memory_hits.fetch_add(1, Ordering::Relaxed);
            debug!(key = %key, "Cache hit (memory)");
            return Some(data);
        }

        match fs::read(key.file_path(&self.root)).await {
            Ok(data) => {
                self.disk_hits.fetch_add(1, Ordering::Relaxed);
                debug!(key = %key, size = data.len(), "Cache hit (disk)");
                Some(data)
            }
            Err(e) => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                debug!(key = %key, error = %e, "Cache miss");
                None
            }
        }
    }

    /// Like [`FileCache::get`], decoding the value as UTF-8. Invalid UTF-8 is a miss.
    pub async fn get_string(&self, key: &str) -> Option<String> {
        let data = self.get(key).await?;
        match String::from_utf8(data) {
            Ok(text) => Some(text),
            Err(e) => {
                debug!(key, error = %e, "Cached entry is not valid UTF-8");
                None
            }
        }
    }

    /// Remove the entry file for `key`, then drop it from the index.
    ///
    /// Fails if the file cannot be removed (including when it does not
    /// exist); the index keeps its entry in that case.
    pub async fn delete(&self, key: &str) -> Result<()> {
        let key = CacheKey::parse(key)?;

        let slot = self.writers.slot(key.as_str());
        let _guard = slot.lock().await;
        self.remove_entry(&key).await
    }

    async fn remove_entry(&self, key: &CacheKey) -> Result<()> {
        let previous = self.index.write().await.remove(key.as_str());

        let path = key.file_path(&self.root);
        if let Err(e) = fs::remove_file(&path).await {
            warn!(key = %key, path = ?path, error = %e, "Failed to remove cache file");
            self.restore(key, previous).await;
            return Err(e.into());
        }

        debug!(key = %key, "Deleted entry");
        Ok(())
    }

    /// Whether `key` currently has a value in the in-memory index
    pub async fn contains_in_memory(&self, key: &str) -> bool {
        let index = self.index.read().await;
        index.contains_key(key)
    }

    /// Get current cache statistics
    pub async fn stats(&self) -> CacheStats {
        let index = self.index.read().await;
        CacheStats {
            entries: index.len(),
            total_size: index.values().map(IndexedValue::size).sum(),
            memory_hits: self.memory_hits.load(Ordering::Relaxed),
            disk_hits: self.disk_hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            last_write_at: index.values().map(|value| value.written_at).max(),
        }
    }
}

/// Per-key async mutexes, created on demand and dropped once unused
#[derive(Default)]
struct KeyLocks {
    locks: StdMutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl KeyLocks {
    fn entries(&self) -> MutexGuard<'_, HashMap<String, Arc<Mutex<()>>>> {
        self.locks.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn slot(&self, key: &str) -> KeySlot<'_> {
        let lock = self.entries().entry(key.to_string()).or_default().clone();
        KeySlot {
            owner: self,
            key: key.to_string(),
            lock,
        }
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.entries().len()
    }
}

/// A claim on one key's mutex. The map entry is forgotten when the last
/// claim goes away, whether the operation finished or was cancelled.
struct KeySlot<'a> {
    owner: &'a KeyLocks,
    key: String,
    lock: Arc<Mutex<()>>,
}

impl KeySlot<'_> {
    async fn lock(&self) -> tokio::sync::MutexGuard<'_, ()> {
        self.lock.lock().await
    }
}

impl Drop for KeySlot<'_> {
    fn drop(&mut self) {
        let mut locks = self.owner.entries();
        // Only the map and this claim hold the mutex
        if locks
            .get(&self.key)
            .is_some_and(|lock| Arc::strong_count(lock) == 2)
        {
            locks.remove(&self.key);
        }
    }
}
