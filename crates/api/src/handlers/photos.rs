//! Handlers for location photos and the photo media proxy.
//!
//! Photo URLs handed to clients point back at this server; the Places API key
//! never leaves it.

use axum::extract::{Path, State};
use axum::http::header::{CACHE_CONTROL, CONTENT_TYPE};
use axum::response::IntoResponse;
use axum::Json;
use familygems_core::error::CoreError;
use familygems_core::types::LocationId;

use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

/// Browsers may keep proxied photos for a day.
const MEDIA_CACHE_CONTROL: &str = "public, max-age=86400";

/// GET /api/v1/locations/{id}/photos
///
/// Cached photos when fresh, otherwise a live lookup. Lookup failures are not
/// errors: the fallback list is returned.
pub async fn get_location_photos(
    State(state): State<AppState>,
    Path(id): Path<LocationId>,
) -> AppResult<impl IntoResponse> {
    let location = state
        .catalog
        .get(id)
        .ok_or_else(|| CoreError::not_found("Location", id))?;

    let photos = state.photos.photos_for(location).await;

    Ok(Json(DataResponse { data: photos }))
}

/// GET /api/v1/places/media/{*name}
pub async fn get_photo_media(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> AppResult<impl IntoResponse> {
    let media = state.photos.media(name.trim_start_matches('/')).await?;

    Ok((
        [
            (CONTENT_TYPE, media.content_type),
            (CACHE_CONTROL, MEDIA_CACHE_CONTROL.to_string()),
        ],
        media.bytes,
    ))
}
