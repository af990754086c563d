#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use familygems_api::config::{GeminiConfig, PlacesConfig, ServerConfig};
use familygems_api::router::build_app_router;
use familygems_api::state::AppState;
use familygems_core::catalog::Catalog;
use familygems_core::storage::{KeyValueStore, MemoryStore};
use http_body_util::BodyExt;
use tower::ServiceExt;

/// Build a test `ServerConfig` with safe defaults and no upstream keys.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 5,
        database_url: None,
        data_dir: PathBuf::from("./data"),
        catalog_path: None,
        gemini: GeminiConfig {
            api_key: None,
            model: "gemini-test".to_string(),
            api_base: "http://127.0.0.1:1".to_string(),
        },
        places: PlacesConfig {
            api_key: None,
            api_base: "http://127.0.0.1:1".to_string(),
        },
        prefetch_photos: false,
    }
}

/// State over the bundled catalog and the given store.
pub async fn test_state(config: ServerConfig, store: Arc<dyn KeyValueStore>) -> AppState {
    AppState::build(config, Catalog::bundled().unwrap(), store)
        .await
        .unwrap()
}

/// Full application router (same middleware stack as production) over an
/// in-memory store.
pub async fn build_test_app() -> Router {
    build_test_app_with(test_config()).await
}

pub async fn build_test_app_with(config: ServerConfig) -> Router {
    let state = test_state(config.clone(), Arc::new(MemoryStore::new())).await;
    build_app_router(state, &config)
}

/// Serve `router` on an ephemeral local port and return its base URL.
pub async fn serve(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn send(app: Router, method: Method, uri: &str, body: Option<serde_json::Value>) -> Response<Body> {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::GET, uri, None).await
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    send(app, Method::POST, uri, Some(body)).await
}

pub async fn post_empty(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::POST, uri, None).await
}

pub async fn delete(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::DELETE, uri, None).await
}

pub async fn body_text(response: Response<Body>) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
