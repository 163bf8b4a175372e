//! External asset cache
//!
//! Maps (application id, raw reference) pairs to resolved external asset
//! paths. Entries live for the process lifetime: a given external URL is
//! assumed to map to a stable asset, so nothing is invalidated or expired.

use std::collections::HashMap;
use tokio::sync::RwLock;

/// Cache key
///
/// Resolutions are scoped to an application: the same URL registered under
/// two application ids yields two independent asset paths.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AssetKey {
    pub application_id: String,
    pub reference: String,
}

impl AssetKey {
    pub fn new(application_id: &str, reference: &str) -> Self {
        Self {
            application_id: application_id.to_string(),
            reference: reference.to_string(),
        }
    }
}

/// Thread-safe map of resolved external asset paths
///
/// Entries are added only on successful resolution, so failures are retried
/// on the next publish cycle. Safe under concurrent read/insert; re-inserting
/// an equivalent entry is harmless.
#[derive(Debug, Default)]
pub struct AssetCache {
    entries: RwLock<HashMap<AssetKey, String>>,
}

impl AssetCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a resolved path
    pub async fn get(&self, key: &AssetKey) -> Option<String> {
        let result = {
            let entries = self.entries.read().await;
            entries.get(key).cloned()
        };

        // Record cache hit/miss
        use crate::metrics::{CACHE_HITS_TOTAL, CACHE_MISSES_TOTAL};
        if result.is_some() {
            CACHE_HITS_TOTAL.with_label_values(&["asset"]).inc();
        } else {
            CACHE_MISSES_TOTAL.with_label_values(&["asset"]).inc();
        }

        result
    }

    /// Insert a resolved path
    pub async fn insert(&self, key: AssetKey, external_asset_path: String) {
        let size = {
            let mut entries = self.entries.write().await;
            entries.insert(key, external_asset_path);
            entries.len()
        };

        // Update cache size metric
        use crate::metrics::CACHE_SIZE;
        CACHE_SIZE.with_label_values(&["asset"]).set(size as i64);
    }

    /// Number of cached resolutions
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}
