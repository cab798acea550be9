//! Memoized Artifact Cache
//!
//! File-backed get-or-compute memoization for expensive preprocessing
//! artifacts. Keys name a computation plus its storage identity; artifacts
//! round-trip through serde_json. The on-disk byte format is an
//! implementation detail of the backing store and opaque to callers.
//!
//! Contract: a cached artifact is returned unchanged if present; otherwise
//! the wrapped computation runs exactly once and is persisted before being
//! returned. The sled backing store keeps concurrent writes for the same
//! key from corrupting the cache.

use serde::de::DeserializeOwned;
use serde::Serialize;
use sled::Db;
use std::path::Path;
use thiserror::Error;
use tracing::debug;

/// Cache errors.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache store error: {0}")]
    Store(#[from] sled::Error),

    #[error("cache serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Persistent get-or-compute cache over a directory.
pub struct ArtifactCache {
    db: Db,
}

impl ArtifactCache {
    /// Open or create the cache at the given directory.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, CacheError> {
        Ok(Self {
            db: sled::open(path)?,
        })
    }

    /// Return the cached artifact for `key`, or run `compute`, persist its
    /// result, and return it. Ownership of the artifact passes to the
    /// caller on every call, hit or miss.
    pub fn compute_or_fetch<T, F>(&self, key: &str, compute: F) -> Result<T, CacheError>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> T,
    {
        if let Some(bytes) = self.db.get(key)? {
            debug!(key, "artifact cache hit");
            return Ok(serde_json::from_slice(&bytes)?);
        }

        debug!(key, "artifact cache miss, computing");
        let artifact = compute();
        let bytes = serde_json::to_vec(&artifact)?;
        self.db.insert(key, bytes)?;
        self.db.flush()?;
        Ok(artifact)
    }

    /// Whether an artifact is already persisted for `key`.
    pub fn contains(&self, key: &str) -> Result<bool, CacheError> {
        Ok(self.db.contains_key(key)?)
    }

    /// Drop a persisted artifact, forcing recomputation on the next fetch.
    pub fn invalidate(&self, key: &str) -> Result<(), CacheError> {
        self.db.remove(key)?;
        self.db.flush()?;
        Ok(())
    }
}
