#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use familygems_core::catalog::{Catalog, Location};

pub const TEST_KEY: &str = "test-key";

/// Serve `router` on an ephemeral local port and return its base URL.
pub async fn serve(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}

/// Request counter shared with a stub.
#[derive(Clone, Default)]
pub struct Hits(Arc<AtomicUsize>);

impl Hits {
    pub fn count(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }

    fn bump(&self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }
}

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get("x-goog-api-key")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == TEST_KEY)
}

// ---------------------------------------------------------------------------
// Places stub
// ---------------------------------------------------------------------------

/// Text search behaviour keyed on the query:
/// - contains "Nowhere": no places
/// - contains "Bare": a place without photos
/// - contains "Broken": HTTP 500
/// - otherwise: a place with five photos
async fn search_text(
    State(hits): State<Hits>,
    headers: HeaderMap,
    Json(body): Json<serde_json::Value>,
) -> impl IntoResponse {
    hits.bump();
    if !authorized(&headers) {
        return (StatusCode::FORBIDDEN, "API key invalid").into_response();
    }
    let query = body["textQuery"].as_str().unwrap_or_default();

    if query.contains("Broken") {
        return (StatusCode::INTERNAL_SERVER_ERROR, "upstream exploded").into_response();
    }
    if query.contains("Nowhere") {
        return Json(serde_json::json!({})).into_response();
    }
    if query.contains("Bare") {
        return Json(serde_json::json!({
            "places": [{ "id": "bare", "displayName": { "text": "Bare" } }]
        }))
        .into_response();
    }

    let photos: Vec<_> = (1..=5)
        .map(|i| serde_json::json!({ "name": format!("places/p1/photos/ref{i}"), "widthPx": 800, "heightPx": 600 }))
        .collect();
    Json(serde_json::json!({
        "places": [
            { "id": "p1", "displayName": { "text": query }, "photos": photos },
            { "id": "p2", "photos": [{ "name": "places/p2/photos/other" }] }
        ]
    }))
    .into_response()
}

async fn media(
    headers: HeaderMap,
    Path((place, photo)): Path<(String, String)>,
) -> impl IntoResponse {
    if !authorized(&headers) {
        return (StatusCode::FORBIDDEN, "API key invalid").into_response();
    }
    (
        [("content-type", "image/jpeg")],
        format!("jpeg:{place}:{photo}"),
    )
        .into_response()
}

/// Places stub plus its search counter.
pub async fn places_stub() -> (String, Hits) {
    let hits = Hits::default();
    let router = Router::new()
        .route("/v1/places:searchText", post(search_text))
        .route("/v1/places/{place}/photos/{photo}/media", get(media))
        .with_state(hits.clone());
    (serve(router).await, hits)
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// Bundled catalog locations, renamed so the stub picks a behaviour.
pub fn locations(names: &[&str]) -> Vec<Location> {
    let catalog = Catalog::bundled().unwrap();
    catalog
        .locations()
        .iter()
        .zip(names)
        .map(|(loc, name)| {
            let mut loc = loc.clone();
            loc.name = name.to_string();
            loc
        })
        .collect()
}
