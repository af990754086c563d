use axum::routing::post;
use axum::Router;

use crate::handlers::itinerary;
use crate::state::AppState;

/// Routes mounted at `/itinerary`.
///
/// ```text
/// POST /  -> generate_itinerary
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/", post(itinerary::generate_itinerary))
}
