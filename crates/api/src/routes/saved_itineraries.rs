//! Route definitions for saved itineraries.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::saved_itineraries;
use crate::state::AppState;

/// Routes mounted at `/saved-itineraries`.
///
/// ```text
/// GET    /                        -> list_saved
/// POST   /                        -> create_saved
/// GET    /{id}                    -> get_saved
/// DELETE /{id}                    -> delete_saved
/// POST   /{id}/checklist/{key}    -> toggle_checklist_item
/// GET    /{id}/export             -> export_saved
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(saved_itineraries::list_saved).post(saved_itineraries::create_saved),
        )
        .route(
            "/{id}",
            get(saved_itineraries::get_saved).delete(saved_itineraries::delete_saved),
        )
        .route(
            "/{id}/checklist/{key}",
            post(saved_itineraries::toggle_checklist_item),
        )
        .route("/{id}/export", get(saved_itineraries::export_saved))
}
