//! HTTP-level tests for location photos and the media proxy.

mod common;

use axum::extract::Path;
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get as get_route, post};
use axum::{Json, Router};
use common::{body_json, body_text, get};

const PLACES_KEY: &str = "places-test-key";

async fn search_text(headers: HeaderMap) -> impl IntoResponse {
    if headers.get("x-goog-api-key").and_then(|v| v.to_str().ok()) != Some(PLACES_KEY) {
        return (StatusCode::FORBIDDEN, "bad key").into_response();
    }
    Json(serde_json::json!({
        "places": [{
            "id": "zoo",
            "photos": [
                { "name": "places/zoo/photos/a" },
                { "name": "places/zoo/photos/b" }
            ]
        }]
    }))
    .into_response()
}

async fn media(Path((place, photo)): Path<(String, String)>) -> impl IntoResponse {
    ([("content-type", "image/png")], format!("png:{place}/{photo}"))
}

async fn app_with_places() -> Router {
    let stub = common::serve(
        Router::new()
            .route("/v1/places:searchText", post(search_text))
            .route("/v1/places/{place}/photos/{photo}/media", get_route(media)),
    )
    .await;

    let mut config = common::test_config();
    config.places.api_key = Some(PLACES_KEY.to_string());
    config.places.api_base = stub;
    common::build_test_app_with(config).await
}

#[tokio::test]
async fn test_photos_without_places_key_use_fallback() {
    let app = common::build_test_app().await;
    let response = get(app, "/api/v1/locations/3/photos").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(
        json["data"],
        serde_json::json!(["/images/fallback.png", "/images/fallback.png", "/images/fallback.png"])
    );
}

#[tokio::test]
async fn test_photos_for_unknown_location_returns_404() {
    let app = common::build_test_app().await;
    let response = get(app, "/api/v1/locations/999/photos").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_photos_are_proxied_urls_and_media_is_served() {
    let app = app_with_places().await;

    let json = body_json(get(app.clone(), "/api/v1/locations/3/photos").await).await;
    let photos: Vec<&str> = json["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p.as_str().unwrap())
        .collect();
    assert_eq!(
        photos,
        vec![
            "/api/v1/places/media/places/zoo/photos/a",
            "/api/v1/places/media/places/zoo/photos/b",
        ]
    );
    assert!(photos.iter().all(|p| !p.contains(PLACES_KEY)));

    let response = get(app, photos[1]).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["content-type"], "image/png");
    assert_eq!(body_text(response).await, "png:zoo/b");
}

#[tokio::test]
async fn test_media_without_places_key_is_not_configured() {
    let app = common::build_test_app().await;
    let response = get(app, "/api/v1/places/media/places/zoo/photos/a").await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let json = body_json(response).await;
    assert_eq!(json["code"], "NOT_CONFIGURED");
    assert!(json["error"].as_str().unwrap().contains("GOOGLE_PLACES_API_KEY"));
}

#[tokio::test]
async fn test_media_rejects_arbitrary_paths() {
    let app = app_with_places().await;
    let response = get(app, "/api/v1/places/media/v1/secrets").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// ---------------------------------------------------------------------------
// Startup prefetch job
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_prefetch_job_skips_without_places_key() {
    let state = common::test_state(
        common::test_config(),
        std::sync::Arc::new(familygems_core::storage::MemoryStore::new()),
    )
    .await;

    // Spawned the same way as at startup, so the job must stay `Send`.
    let report = tokio::spawn(familygems_api::background::photo_prefetch::run(
        state.photos.clone(),
        state.catalog.clone(),
        tokio_util::sync::CancellationToken::new(),
    ))
    .await
    .unwrap();

    assert!(report.skipped);
    assert_eq!(report.fetched, 0);
}

#[tokio::test]
async fn test_prefetch_job_stops_when_already_cancelled() {
    let mut config = common::test_config();
    config.places.api_key = Some(PLACES_KEY.to_string());
    let state = common::test_state(
        config,
        std::sync::Arc::new(familygems_core::storage::MemoryStore::new()),
    )
    .await;

    let cancel = tokio_util::sync::CancellationToken::new();
    cancel.cancel();
    let report = tokio::spawn(familygems_api::background::photo_prefetch::run(
        state.photos.clone(),
        state.catalog.clone(),
        cancel,
    ))
    .await
    .unwrap();

    assert!(report.cancelled);
    assert!(!report.skipped);
    assert_eq!(report.fetched + report.failed, 0);
}
