//! Compiled-code caches.
//!
//! - `MemoryCache`: keyed by the exact source text, unbounded, lives for the
//!   session. Consulted before anything is dispatched to the worker.
//! - `PersistentCache`: keyed by a logical cache key (or a content hash),
//!   entries expire after a TTL. Optionally written through to a directory.

use crate::error::{CompileError, CompileResult};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};
use tracing::{debug, warn};

pub const DEFAULT_TTL_HOURS: i64 = 24;

/// Thread-safe map from source text to compiled code
#[derive(Debug, Clone, Default)]
pub struct MemoryCache {
    inner: Arc<RwLock<HashMap<String, String>>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, source: &str) -> Option<String> {
        let map = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        map.get(source).cloned()
    }

    /// Insert or overwrite. Returns the old value if any.
    pub fn insert(&self, source: &str, code: String) -> Option<String> {
        let mut map = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        map.insert(source.to_string(), code)
    }

    pub fn contains(&self, source: &str) -> bool {
        let map = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        map.contains_key(source)
    }

    pub fn clear(&self) {
        let mut map = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        map.clear();
    }

    pub fn len(&self) -> usize {
        let map = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Persistent cache key for a source: a CRC32 content hash
pub fn content_key(source: &str) -> String {
    format!("src-{:08x}", crc32fast::hash(source.as_bytes()))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheEntry {
    pub key: String,
    pub compiled_code: String,
    pub stored_at: DateTime<Utc>,
}

impl CacheEntry {
    fn is_fresh(&self, ttl: Duration, now: DateTime<Utc>) -> bool {
        now - self.stored_at < ttl
    }
}

/// Time-boxed cache shared by every request for the same key
#[derive(Debug, Clone)]
pub struct PersistentCache {
    entries: Arc<RwLock<HashMap<String, CacheEntry>>>,
    ttl: Duration,
    dir: Option<PathBuf>,
}

impl PersistentCache {
    /// Memory-only cache with the default 24 hour TTL
    pub fn new() -> Self {
        Self::with_ttl(Duration::hours(DEFAULT_TTL_HOURS))
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
            ttl,
            dir: None,
        }
    }

    /// Write entries through to `dir`, loading whatever is already there
    pub fn with_dir(mut self, dir: impl Into<PathBuf>) -> CompileResult<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|e| cache_error(&dir, e))?;

        let loaded = load_entries(&dir)?;
        debug!(dir = %dir.display(), entries = loaded.len(), "loaded persistent cache");
        {
            let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
            for entry in loaded {
                entries.insert(entry.key.clone(), entry);
            }
        }

        self.dir = Some(dir);
        Ok(self)
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.get_at(key, Utc::now())
    }

    /// Lookup as of `now`. Expired entries are evicted.
    pub fn get_at(&self, key: &str, now: DateTime<Utc>) -> Option<String> {
        {
            let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
            match entries.get(key) {
                Some(entry) if entry.is_fresh(self.ttl, now) => {
                    return Some(entry.compiled_code.clone())
                }
                Some(_) => {}
                None => return None,
            }
        }

        debug!(key, "persistent cache entry expired");
        self.remove(key);
        None
    }

    pub fn insert(&self, key: &str, compiled_code: String) -> CompileResult<()> {
        self.insert_at(key, compiled_code, Utc::now())
    }

    pub fn insert_at(
        &self,
        key: &str,
        compiled_code: String,
        now: DateTime<Utc>,
    ) -> CompileResult<()> {
        let entry = CacheEntry {
            key: key.to_string(),
            compiled_code,
            stored_at: now,
        };

        if let Some(dir) = &self.dir {
            let path = entry_path(dir, key);
            let json = serde_json::to_string(&entry)?;
            fs::write(&path, json).map_err(|e| cache_error(&path, e))?;
        }

        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.insert(key.to_string(), entry);
        Ok(())
    }

    pub fn remove(&self, key: &str) {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.remove(key);
        if let Some(dir) = &self.dir {
            let path = entry_path(dir, key);
            if let Err(err) = fs::remove_file(&path) {
                if err.kind() != std::io::ErrorKind::NotFound {
                    warn!(path = %path.display(), error = %err, "failed to remove cache file");
                }
            }
        }
    }

    pub fn clear(&self) {
        let keys: Vec<String> = {
            let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
            entries.keys().cloned().collect()
        };
        for key in keys {
            self.remove(&key);
        }
    }

    pub fn len(&self) -> usize {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for PersistentCache {
    fn default() -> Self {
        Self::new()
    }
}

/// File names are hashed so arbitrary keys stay filesystem-safe
fn entry_path(dir: &Path, key: &str) -> PathBuf {
    dir.join(format!("{:08x}.json", crc32fast::hash(key.as_bytes())))
}

fn load_entries(dir: &Path) -> CompileResult<Vec<CacheEntry>> {
    let mut entries = Vec::new();
    for item in fs::read_dir(dir).map_err(|e| cache_error(dir, e))? {
        let path = item.map_err(|e| cache_error(dir, e))?.path();
        if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
            continue;
        }
        let text = fs::read_to_string(&path).map_err(|e| cache_error(&path, e))?;
        match serde_json::from_str::<CacheEntry>(&text) {
            Ok(entry) => entries.push(entry),
            Err(err) => warn!(path = %path.display(), error = %err, "skipping corrupt cache file"),
        }
    }
    Ok(entries)
}

fn cache_error(path: &Path, err: std::io::Error) -> CompileError {
    CompileError::Cache(format!("{}: {}", path.display(), err))
}
