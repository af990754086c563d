pub mod health;
pub mod itinerary;
pub mod locations;
pub mod places;
pub mod saved_itineraries;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /locations                                   full catalog (GET)
/// /locations/search                            filter (POST)
/// /locations/facets                            filter options (GET)
/// /locations/{id}                              one location + drive estimate (GET)
/// /locations/{id}/photos                       cache-through photos (GET)
///
/// /places/media/{*name}                        photo media proxy (GET)
///
/// /itinerary                                   generative relay (POST)
///
/// /saved-itineraries                           list, create
/// /saved-itineraries/{id}                      get, delete
/// /saved-itineraries/{id}/checklist/{key}      toggle item (POST)
/// /saved-itineraries/{id}/export               Markdown export (GET)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/locations", locations::router())
        .nest("/places", places::router())
        .nest("/itinerary", itinerary::router())
        .nest("/saved-itineraries", saved_itineraries::router())
}
