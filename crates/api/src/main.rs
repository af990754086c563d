use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use familygems_core::catalog::Catalog;
use familygems_core::storage::{JsonFileStore, KeyValueStore};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use familygems_api::background;
use familygems_api::config::ServerConfig;
use familygems_api::router::build_app_router;
use familygems_api::state::AppState;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "familygems_api=debug,familygems_upstream=debug,familygems_core=info,tower_http=debug"
                    .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    // --- Catalog ---
    let catalog = match &config.catalog_path {
        Some(path) => Catalog::from_path(path)
            .unwrap_or_else(|e| panic!("Failed to load catalog from {}: {e}", path.display())),
        None => Catalog::bundled().expect("Bundled catalog must be valid"),
    };
    tracing::info!(locations = catalog.len(), "Catalog loaded");

    // --- Storage ---
    let store = open_store(&config).await;

    // --- App state ---
    let state = AppState::build(config.clone(), catalog, store)
        .await
        .expect("Failed to initialize application state");

    // --- Photo prefetch ---
    let prefetch_cancel = CancellationToken::new();
    let prefetch_handle = config.prefetch_photos.then(|| {
        tokio::spawn(background::photo_prefetch::run(
            Arc::clone(&state.photos),
            Arc::clone(&state.catalog),
            prefetch_cancel.clone(),
        ))
    });

    // --- Router ---
    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    // --- Post-shutdown cleanup ---
    tracing::info!("Server stopped accepting connections, cleaning up");

    prefetch_cancel.cancel();
    if let Some(handle) = prefetch_handle {
        let timeout = Duration::from_secs(config.shutdown_timeout_secs);
        if tokio::time::timeout(timeout, handle).await.is_err() {
            tracing::warn!("Photo prefetch did not stop in time");
        }
    }

    tracing::info!("Graceful shutdown complete");
}

/// Postgres when `DATABASE_URL` is set, JSON files under `DATA_DIR` otherwise.
async fn open_store(config: &ServerConfig) -> Arc<dyn KeyValueStore> {
    let Some(database_url) = &config.database_url else {
        let store = JsonFileStore::open(&config.data_dir)
            .await
            .expect("Failed to open data directory");
        tracing::info!(dir = %store.dir().display(), "Using JSON file storage");
        return Arc::new(store);
    };

    let pool = familygems_db::create_pool(database_url)
        .await
        .expect("Failed to connect to database");
    tracing::info!("Database connection pool created");

    familygems_db::health_check(&pool)
        .await
        .expect("Database health check failed");

    familygems_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database migrations applied");

    Arc::new(familygems_db::PgKeyValueStore::new(pool))
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
