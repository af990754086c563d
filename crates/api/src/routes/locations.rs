//! Route definitions for catalog browsing, filtering and photos.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{locations, photos};
use crate::state::AppState;

/// Routes mounted at `/locations`.
///
/// ```text
/// GET  /              -> list_locations
/// POST /search        -> search_locations
/// GET  /facets        -> get_facets
/// GET  /{id}          -> get_location
/// GET  /{id}/photos   -> get_location_photos
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(locations::list_locations))
        .route("/search", post(locations::search_locations))
        .route("/facets", get(locations::get_facets))
        .route("/{id}", get(locations::get_location))
        .route("/{id}/photos", get(photos::get_location_photos))
}
