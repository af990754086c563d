//! Time-to-live cache of photo URLs per location, persisted as one blob.
//!
//! Expiry is checked lazily on read; stale entries stay in the blob until the
//! next successful fetch overwrites them.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::error::CoreError;
use crate::storage::{self, KeyValueStore, PLACE_PHOTOS_KEY};
use crate::types::{LocationId, Timestamp};

/// Cached photos are valid for this many days.
pub const PHOTO_CACHE_TTL_DAYS: i64 = 7;

/// Placeholder served when no real photos are available.
pub const FALLBACK_IMAGE: &str = "/images/fallback.png";

/// Number of placeholder entries in the fallback list.
pub const FALLBACK_PHOTO_COUNT: usize = 3;

/// The fixed list returned whenever a photo lookup cannot produce real photos.
pub fn fallback_photos() -> Vec<String> {
    vec![FALLBACK_IMAGE.to_string(); FALLBACK_PHOTO_COUNT]
}

/// One cache entry. `timestamp` is Unix milliseconds at capture.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedPhotos {
    pub photos: Vec<String>,
    pub timestamp: i64,
}

impl CachedPhotos {
    pub fn is_fresh_at(&self, now: Timestamp, ttl: Duration) -> bool {
        now.timestamp_millis() - self.timestamp < ttl.num_milliseconds()
    }
}

/// Persisted shape: location id (as a string) to entry.
type PhotoMap = HashMap<String, CachedPhotos>;

pub struct PhotoCache {
    store: Arc<dyn KeyValueStore>,
    entries: Mutex<PhotoMap>,
    ttl: Duration,
}

impl PhotoCache {
    /// Load the persisted cache. A missing or corrupt blob starts empty.
    pub async fn load(store: Arc<dyn KeyValueStore>) -> Result<Self, CoreError> {
        let entries: PhotoMap =
            storage::load_json_or_default(store.as_ref(), PLACE_PHOTOS_KEY).await?;
        tracing::debug!(entries = entries.len(), "Photo cache loaded");

        Ok(Self {
            store,
            entries: Mutex::new(entries),
            ttl: Duration::days(PHOTO_CACHE_TTL_DAYS),
        })
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub async fn get(&self, id: LocationId) -> Option<Vec<String>> {
        self.get_at(id, Utc::now()).await
    }

    /// Cached photos for `id` if captured within the TTL before `now`.
    pub async fn get_at(&self, id: LocationId, now: Timestamp) -> Option<Vec<String>> {
        let entries = self.entries.lock().await;
        entries
            .get(&id.to_string())
            .filter(|entry| entry.is_fresh_at(now, self.ttl))
            .map(|entry| entry.photos.clone())
    }

    pub async fn put(&self, id: LocationId, photos: Vec<String>) -> Result<(), CoreError> {
        self.put_at(id, photos, Utc::now()).await
    }

    /// Store `photos` captured at `now`, overwriting any previous entry, and
    /// persist the whole cache.
    pub async fn put_at(
        &self,
        id: LocationId,
        photos: Vec<String>,
        now: Timestamp,
    ) -> Result<(), CoreError> {
        let mut entries = self.entries.lock().await;
        entries.insert(
            id.to_string(),
            CachedPhotos {
                photos,
                timestamp: now.timestamp_millis(),
            },
        );
        storage::save_json(self.store.as_ref(), PLACE_PHOTOS_KEY, &*entries).await
    }

    /// Whether an entry exists (fresh or stale) for every id.
    pub async fn contains_all(&self, ids: impl IntoIterator<Item = LocationId>) -> bool {
        let entries = self.entries.lock().await;
        ids.into_iter()
            .all(|id| entries.contains_key(&id.to_string()))
    }

    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    fn photos() -> Vec<String> {
        vec!["/a.jpg".to_string(), "/b.jpg".to_string()]
    }

    async fn empty_cache() -> (Arc<MemoryStore>, PhotoCache) {
        let store = Arc::new(MemoryStore::new());
        let cache = PhotoCache::load(store.clone()).await.unwrap();
        (store, cache)
    }

    #[tokio::test]
    async fn put_then_get_returns_same_photos() {
        let (_, cache) = empty_cache().await;
        cache.put(5, photos()).await.unwrap();
        assert_eq!(cache.get(5).await, Some(photos()));
    }

    #[tokio::test]
    async fn entries_expire_after_ttl() {
        let (_, cache) = empty_cache().await;
        let captured = Utc::now();
        cache.put_at(5, photos(), captured).await.unwrap();

        assert_eq!(
            cache.get_at(5, captured + Duration::days(6)).await,
            Some(photos())
        );
        assert_eq!(cache.get_at(5, captured + Duration::days(8)).await, None);
    }

    #[tokio::test]
    async fn exactly_ttl_old_is_stale() {
        let (_, cache) = empty_cache().await;
        let captured = Utc::now();
        cache.put_at(5, photos(), captured).await.unwrap();
        assert_eq!(cache.get_at(5, captured + Duration::days(7)).await, None);
    }

    #[tokio::test]
    async fn put_overwrites_and_persists() {
        let (store, cache) = empty_cache().await;
        cache.put(5, photos()).await.unwrap();
        cache.put(5, vec!["/c.jpg".to_string()]).await.unwrap();

        let reloaded = PhotoCache::load(store).await.unwrap();
        assert_eq!(reloaded.get(5).await, Some(vec!["/c.jpg".to_string()]));
        assert_eq!(reloaded.len().await, 1);
    }

    #[tokio::test]
    async fn persisted_shape_is_keyed_by_string_id() {
        let (store, cache) = empty_cache().await;
        cache.put(42, photos()).await.unwrap();

        let raw = store.get(PLACE_PHOTOS_KEY).await.unwrap().unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert!(value["42"]["photos"].is_array());
        assert!(value["42"]["timestamp"].is_i64());
    }

    #[tokio::test]
    async fn contains_all_counts_stale_entries() {
        let (_, cache) = empty_cache().await;
        let long_ago = Utc::now() - Duration::days(30);
        cache.put_at(1, photos(), long_ago).await.unwrap();
        cache.put(2, photos()).await.unwrap();

        assert!(cache.contains_all([1, 2]).await);
        assert!(!cache.contains_all([1, 2, 3]).await);
    }

    #[tokio::test]
    async fn corrupt_blob_starts_empty() {
        let store = Arc::new(MemoryStore::new());
        store.set(PLACE_PHOTOS_KEY, "not json").await.unwrap();
        let cache = PhotoCache::load(store).await.unwrap();
        assert!(cache.is_empty().await);
    }

    #[test]
    fn fallback_has_three_placeholders() {
        let fallback = fallback_photos();
        assert_eq!(fallback.len(), 3);
        assert!(fallback.iter().all(|p| p == FALLBACK_IMAGE));
    }
}
