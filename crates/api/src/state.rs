use std::sync::Arc;

use familygems_core::catalog::Catalog;
use familygems_core::error::CoreError;
use familygems_core::photo_cache::PhotoCache;
use familygems_core::saved::SavedItineraryStore;
use familygems_core::storage::KeyValueStore;
use familygems_upstream::gemini::GeminiApi;
use familygems_upstream::photos::PhotoService;
use familygems_upstream::places::PlacesApi;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc`).
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    /// Immutable catalog loaded at startup.
    pub catalog: Arc<Catalog>,
    /// Durable blob storage shared by the photo cache and saved itineraries.
    pub store: Arc<dyn KeyValueStore>,
    pub photos: Arc<PhotoService>,
    pub saved: Arc<SavedItineraryStore>,
    /// `None` when `GEMINI_API_KEY` is not set.
    pub gemini: Option<Arc<GeminiApi>>,
}

impl AppState {
    /// Wire services from configuration over an already-opened store.
    pub async fn build(
        config: ServerConfig,
        catalog: Catalog,
        store: Arc<dyn KeyValueStore>,
    ) -> Result<Self, CoreError> {
        let cache = PhotoCache::load(Arc::clone(&store)).await?;

        let places = config
            .places
            .api_key
            .clone()
            .map(|key| PlacesApi::new(key, config.places.api_base.clone()));
        if places.is_none() {
            tracing::warn!("GOOGLE_PLACES_API_KEY not set, photos will use fallback images");
        }

        let gemini = config.gemini.api_key.clone().map(|key| {
            Arc::new(GeminiApi::new(
                key,
                config.gemini.model.clone(),
                config.gemini.api_base.clone(),
            ))
        });
        if gemini.is_none() {
            tracing::warn!("GEMINI_API_KEY not set, itinerary generation is disabled");
        }

        Ok(Self {
            catalog: Arc::new(catalog),
            photos: Arc::new(PhotoService::new(cache, places)),
            saved: Arc::new(SavedItineraryStore::new(Arc::clone(&store))),
            store,
            gemini,
            config: Arc::new(config),
        })
    }
}
