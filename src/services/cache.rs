use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

use crate::core::SearchConfig;
use crate::models::Problem;

/// Errors that can occur with cache operations
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Cache miss: {0}")]
    CacheMiss(String),
}

/// In-memory cache of solved runs
///
/// Only seeded runs are cacheable: with a fixed seed a run is a pure function of its
/// problem and configuration, so a repeated request can be answered without re-running.
pub struct ResultCache {
    entries: moka::future::Cache<String, Vec<u8>>,
}

impl ResultCache {
    /// Create a new cache holding up to `capacity` entries for `ttl_secs` each
    pub fn new(capacity: u64, ttl_secs: u64) -> Self {
        let entries = moka::future::CacheBuilder::new(capacity)
            .time_to_live(Duration::from_secs(ttl_secs))
            .build();

        Self { entries }
    }

    /// Get a value from the cache
    pub async fn get<T>(&self, key: &str) -> Result<T, CacheError>
    where
        T: for<'de> Deserialize<'de>,
    {
        if let Some(bytes) = self.entries.get(key).await {
            tracing::trace!("Cache hit: {}", key);
            return Ok(serde_json::from_slice(&bytes)?);
        }

        tracing::trace!("Cache miss: {}", key);
        Err(CacheError::CacheMiss(key.to_string()))
    }

    /// Store a value in the cache
    pub async fn set<T>(&self, key: &str, value: &T) -> Result<(), CacheError>
    where
        T: Serialize,
    {
        let bytes = serde_json::to_vec(value)?;
        self.entries.insert(key.to_string(), bytes).await;

        tracing::trace!("Cache set: {}", key);
        Ok(())
    }

    /// Delete a single entry
    pub async fn delete(&self, key: &str) {
        self.entries.invalidate(key).await;
    }

    /// Drop every entry
    pub fn clear(&self) {
        self.entries.invalidate_all();
        tracing::debug!("Cleared result cache");
    }

    /// Get cache statistics
    pub async fn stats(&self) -> CacheStats {
        // entry_count lags behind until pending maintenance has run
        self.entries.run_pending_tasks().await;
        CacheStats {
            entries: self.entries.entry_count(),
            weighted_size: self.entries.weighted_size(),
        }
    }
}

/// Cache statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheStats {
    pub entries: u64,
    pub weighted_size: u64,
}

/// Cache key builder
pub struct CacheKey;

impl CacheKey {
    /// Build a cache key for a solved run, or `None` if the run is not reproducible.
    ///
    /// The key is the full canonical JSON of everything the run depends on, so two different
    /// requests never share an entry. Preferences are sorted maps, so equal inputs encode equally.
    pub fn solve(problem: &Problem, config: &SearchConfig) -> Option<String> {
        let seed = config.seed?;
        let blacklist: Vec<(&str, &str)> = problem.blacklist().iter().collect();

        let canonical = serde_json::to_string(&(
            problem.women(),
            problem.men(),
            blacklist,
            config.method,
            config.scorer,
            config.warper,
            config.weight,
            config.boost,
            config.trials,
            config.proposing_side,
        ))
        .ok()?;

        Some(format!("solve:{}:{}", seed, canonical))
    }
}
