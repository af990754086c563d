use axum::routing::get;
use axum::Router;

use crate::handlers::photos;
use crate::state::AppState;

/// Routes mounted at `/places`.
///
/// ```text
/// GET /media/{*name}  -> get_photo_media
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/media/{*name}", get(photos::get_photo_media))
}
