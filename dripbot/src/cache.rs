//! Key-value cache backends.
//!
//! Skills read externally-populated cached data (such as the supported
//! testnet list) through the [`CacheStore`] trait. Two backends are
//! provided: [`MemoryCache`] for tests and ephemeral runs, and [`FileCache`]
//! persisting entries as files in a directory.

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::PathBuf;
use tokio::sync::RwLock;
use tracing::debug;

/// Cache key under which the supported-networks payload lives.
///
/// The value is a JSON object shaped
/// `{"supportedNetworks":[{"networkId": "..."}]}`.
pub const SUPPORTED_NETWORKS_KEY: &str = "supported-networks";

/// Error type for cache operations.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// IO error.
    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    /// Key not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// Backend-specific failure.
    #[error("backend: {0}")]
    Backend(String),
}

/// Result type for cache operations.
pub type CacheResult<T> = std::result::Result<T, CacheError>;

/// Trait for key-value cache backends.
///
/// Values are opaque strings; callers own their (de)serialization.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Get a value by key. `Ok(None)` means the key is absent.
    async fn get(&self, key: &str) -> CacheResult<Option<String>>;

    /// Set a value.
    async fn set(&self, key: &str, value: &str) -> CacheResult<()>;

    /// Delete a value. Deleting an absent key is not an error.
    async fn delete(&self, key: &str) -> CacheResult<()>;

    /// Check if a key exists.
    async fn exists(&self, key: &str) -> CacheResult<bool> {
        Ok(self.get(key).await?.is_some())
    }
}

/// In-memory cache.
///
/// Fast but not persistent across restarts.
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryCache {
    /// Create a new memory cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CacheStore for MemoryCache {
    async fn get(&self, key: &str) -> CacheResult<Option<String>> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> CacheResult<()> {
        self.entries
            .write()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn delete(&self, key: &str) -> CacheResult<()> {
        self.entries.write().await.remove(key);
        Ok(())
    }
}

/// File-based cache.
///
/// Persists each entry as a file in a directory.
#[derive(Debug)]
pub struct FileCache {
    base_path: PathBuf,
}

impl FileCache {
    /// Create a new file cache rooted at the given directory.
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    /// Get the file path for a cache key.
    fn entry_path(&self, key: &str) -> PathBuf {
        // Sanitize key for filename
        let safe_key = key.replace([':', '/', '\\'], "_");
        self.base_path.join(format!("{safe_key}.json"))
    }

    /// Ensure the cache directory exists.
    async fn ensure_dir(&self) -> CacheResult<()> {
        tokio::fs::create_dir_all(&self.base_path).await?;
        Ok(())
    }
}

#[async_trait]
impl CacheStore for FileCache {
    async fn get(&self, key: &str) -> CacheResult<Option<String>> {
        let path = self.entry_path(key);

        if !path.exists() {
            return Ok(None);
        }

        let value = tokio::fs::read_to_string(&path).await?;
        debug!(key = %key, "cache hit from file");
        Ok(Some(value))
    }

    async fn set(&self, key: &str, value: &str) -> CacheResult<()> {
        self.ensure_dir().await?;

        let path = self.entry_path(key);
        tokio::fs::write(&path, value).await?;
        debug!(key = %key, "cache entry written");
        Ok(())
    }

    async fn delete(&self, key: &str) -> CacheResult<()> {
        let path = self.entry_path(key);

        if path.exists() {
            tokio::fs::remove_file(&path).await?;
            debug!(key = %key, "cache entry deleted");
        }
        Ok(())
    }
}
