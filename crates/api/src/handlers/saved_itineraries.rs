//! Handlers for saved itineraries and their checklists.

use axum::extract::{Path, State};
use axum::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use familygems_core::saved::{ChecklistItem, SavedItinerary};
use serde::{Deserialize, Serialize};

use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateSavedItinerary {
    pub title: String,
    pub content: String,
}

/// A saved itinerary with its derived checklist.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedItineraryView {
    #[serde(flatten)]
    pub itinerary: SavedItinerary,
    pub checklist_items: Vec<ChecklistItem>,
}

impl From<SavedItinerary> for SavedItineraryView {
    fn from(itinerary: SavedItinerary) -> Self {
        Self {
            checklist_items: itinerary.checklist_items(),
            itinerary,
        }
    }
}

/// File name for an export: the title reduced to `[a-z0-9-]`.
fn export_file_name(title: &str) -> String {
    let slug = title
        .to_lowercase()
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("-");
    if slug.is_empty() {
        "itinerary.md".to_string()
    } else {
        format!("{slug}.md")
    }
}

/// GET /api/v1/saved-itineraries
pub async fn list_saved(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let saved = state.saved.list().await?;
    Ok(Json(DataResponse { data: saved }))
}

/// POST /api/v1/saved-itineraries
pub async fn create_saved(
    State(state): State<AppState>,
    Json(input): Json<CreateSavedItinerary>,
) -> AppResult<impl IntoResponse> {
    let created = state.saved.create(&input.title, &input.content).await?;

    tracing::info!(id = %created.id, title = %created.title, "Itinerary saved");

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: SavedItineraryView::from(created),
        }),
    ))
}

/// GET /api/v1/saved-itineraries/{id}
pub async fn get_saved(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let saved = state.saved.get(&id).await?;
    Ok(Json(DataResponse {
        data: SavedItineraryView::from(saved),
    }))
}

/// DELETE /api/v1/saved-itineraries/{id}
///
/// Returns the removed itinerary so the caller can clear a selection that
/// pointed at it.
pub async fn delete_saved(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let removed = state.saved.delete(&id).await?;

    tracing::info!(id = %removed.id, "Saved itinerary deleted");

    Ok(Json(DataResponse { data: removed }))
}

/// POST /api/v1/saved-itineraries/{id}/checklist/{key}
pub async fn toggle_checklist_item(
    State(state): State<AppState>,
    Path((id, key)): Path<(String, String)>,
) -> AppResult<impl IntoResponse> {
    let updated = state.saved.toggle_checklist_item(&id, &key).await?;

    tracing::debug!(
        id = %id,
        key = %key,
        checked = updated.checklist.get(&key).copied().unwrap_or(false),
        "Checklist item toggled",
    );

    Ok(Json(DataResponse {
        data: SavedItineraryView::from(updated),
    }))
}

/// GET /api/v1/saved-itineraries/{id}/export
///
/// Markdown document with the body and checklist state.
pub async fn export_saved(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let saved = state.saved.get(&id).await?;
    let disposition = format!(
        "attachment; filename=\"{}\"",
        export_file_name(&saved.title)
    );

    Ok((
        [
            (CONTENT_TYPE, "text/markdown; charset=utf-8".to_string()),
            (CONTENT_DISPOSITION, disposition),
        ],
        saved.to_markdown(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn export_file_names_are_slugged() {
        assert_eq!(export_file_name("Zoo & Museum Day!"), "zoo-museum-day.md");
        assert_eq!(export_file_name("  "), "itinerary.md");
        assert_eq!(export_file_name("Día en el parque"), "d-a-en-el-parque.md");
    }
}
