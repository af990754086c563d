//! Cache-through photo lookup for catalog locations.
//!
//! Photos are served from the [`PhotoCache`] while fresh; otherwise the
//! Places API is searched with `"<name> <address>"`. Every failure degrades
//! to the fallback list, which is never cached.

use std::time::Duration;

use familygems_core::catalog::Location;
use familygems_core::photo_cache::{fallback_photos, PhotoCache};
use serde::Serialize;
use tokio_util::sync::CancellationToken;

use crate::places::{is_photo_resource_name, PlaceMedia, PlacesApi, PlacesApiError};

/// Pause after each upstream request during prefetch.
pub const PREFETCH_REQUEST_DELAY: Duration = Duration::from_millis(200);

/// Path under which photo media is proxied; cached URLs start with this.
pub const PHOTO_PROXY_PREFIX: &str = "/api/v1/places/media/";

/// URL handed to clients for a photo resource name.
pub fn photo_proxy_url(name: &str) -> String {
    format!("{PHOTO_PROXY_PREFIX}{name}")
}

#[derive(Debug, thiserror::Error)]
pub enum PhotoFetchError {
    #[error("Places API key is not configured")]
    NotConfigured,

    #[error(transparent)]
    Places(#[from] PlacesApiError),

    #[error("No place with photos found for '{0}'")]
    NoPlace(String),

    #[error("Invalid photo resource name '{0}'")]
    InvalidName(String),
}

/// Outcome of one prefetch pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PrefetchReport {
    /// Nothing was attempted (cache already covered the catalog, or Places
    /// is not configured).
    pub skipped: bool,
    pub already_cached: usize,
    pub fetched: usize,
    pub failed: usize,
    pub cancelled: bool,
}

pub struct PhotoService {
    cache: PhotoCache,
    places: Option<PlacesApi>,
    request_delay: Duration,
}

impl PhotoService {
    /// `places` is `None` when no API key is configured.
    pub fn new(cache: PhotoCache, places: Option<PlacesApi>) -> Self {
        Self {
            cache,
            places,
            request_delay: PREFETCH_REQUEST_DELAY,
        }
    }

    pub fn with_request_delay(mut self, delay: Duration) -> Self {
        self.request_delay = delay;
        self
    }

    pub fn cache(&self) -> &PhotoCache {
        &self.cache
    }

    pub fn is_configured(&self) -> bool {
        self.places.is_some()
    }

    /// Fresh cached photos, else a live lookup, else the fallback list.
    pub async fn photos_for(&self, location: &Location) -> Vec<String> {
        if let Some(photos) = self.cache.get(location.id).await {
            tracing::debug!(location_id = location.id, "Using cached photos");
            return photos;
        }

        match self.fetch_fresh(location).await {
            Ok(photos) => photos,
            Err(e) => {
                tracing::warn!(
                    location_id = location.id,
                    name = %location.name,
                    error = %e,
                    "Photo lookup failed, serving fallback",
                );
                fallback_photos()
            }
        }
    }

    /// Query Places for `location` regardless of the cache and store the
    /// result. Nothing is cached when no place with photos matched.
    pub async fn fetch_fresh(&self, location: &Location) -> Result<Vec<String>, PhotoFetchError> {
        let places = self.places.as_ref().ok_or(PhotoFetchError::NotConfigured)?;
        let query = format!("{} {}", location.name, location.address);

        let names = places.search_photo_names(&query).await?;
        if names.is_empty() {
            return Err(PhotoFetchError::NoPlace(query));
        }

        let photos: Vec<String> = names.iter().map(|n| photo_proxy_url(n)).collect();
        if let Err(e) = self.cache.put(location.id, photos.clone()).await {
            tracing::error!(location_id = location.id, error = %e, "Failed to persist photo cache");
        }

        tracing::info!(
            location_id = location.id,
            count = photos.len(),
            "Fetched photos"
        );
        Ok(photos)
    }

    /// Proxy one photo's bytes.
    pub async fn media(&self, name: &str) -> Result<PlaceMedia, PhotoFetchError> {
        if !is_photo_resource_name(name) {
            return Err(PhotoFetchError::InvalidName(name.to_string()));
        }
        let places = self.places.as_ref().ok_or(PhotoFetchError::NotConfigured)?;
        Ok(places
            .fetch_media(name, crate::places::PHOTO_MAX_WIDTH_PX)
            .await?)
    }

    /// Warm the cache for every location, one request at a time.
    ///
    /// Skipped when every id already has an entry, fresh or stale. Otherwise
    /// only missing or stale entries are fetched.
    pub async fn prefetch_all(
        &self,
        locations: &[Location],
        cancel: &CancellationToken,
    ) -> PrefetchReport {
        let mut report = PrefetchReport::default();

        if !self.is_configured() {
            tracing::info!("Places API not configured, skipping photo prefetch");
            report.skipped = true;
            return report;
        }
        if self.cache.contains_all(locations.iter().map(|l| l.id)).await {
            let entries = self.cache.len().await;
            tracing::info!(entries, "Photo cache covers the catalog, skipping prefetch");
            report.skipped = true;
            return report;
        }

        for location in locations {
            if cancel.is_cancelled() {
                report.cancelled = true;
                break;
            }
            if self.cache.get(location.id).await.is_some() {
                report.already_cached += 1;
                continue;
            }

            match self.fetch_fresh(location).await {
                Ok(_) => report.fetched += 1,
                Err(e) => {
                    tracing::warn!(location_id = location.id, error = %e, "Prefetch failed");
                    report.failed += 1;
                }
            }

            tokio::select! {
                _ = cancel.cancelled() => {
                    report.cancelled = true;
                    break;
                }
                _ = tokio::time::sleep(self.request_delay) => {}
            }
        }

        tracing::info!(
            fetched = report.fetched,
            failed = report.failed,
            already_cached = report.already_cached,
            cancelled = report.cancelled,
            "Photo prefetch complete",
        );
        report
    }
}
