//! The itinerary relay: turns a request into a prompt, forwards it to the
//! text-generation API with the server-held key, and returns `{ "text" }`.
//!
//! Unlike the other endpoints the body is not wrapped in `{ "data" }`.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use familygems_core::itinerary::{build_prompt, plan_options, ItineraryRequest, PlannedOption};
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct ItineraryResponse {
    pub text: String,
    /// Parsed alternatives, multi-stop requests only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<PlannedOption>>,
}

/// POST /api/v1/itinerary
pub async fn generate_itinerary(
    State(state): State<AppState>,
    body: Result<Json<ItineraryRequest>, JsonRejection>,
) -> AppResult<impl IntoResponse> {
    let Json(request) = body.map_err(|e| AppError::BadRequest(e.body_text()))?;

    let prompt = build_prompt(&request)?;

    let gemini = state.gemini.as_ref().ok_or_else(|| {
        AppError::NotConfigured(
            "Itinerary generation is not configured: GEMINI_API_KEY is not set on the server"
                .into(),
        )
    })?;

    let text = gemini.generate(&prompt).await?;

    let options = match &request {
        ItineraryRequest::MultiStop {
            multi_stop_options, ..
        } => Some(plan_options(
            &text,
            request.prompt_locations(),
            multi_stop_options,
        )),
        _ => None,
    };

    tracing::info!(
        model = gemini.model(),
        chars = text.len(),
        options = options.as_ref().map_or(0, Vec::len),
        "Itinerary generated",
    );

    Ok(Json(ItineraryResponse { text, options }))
}
