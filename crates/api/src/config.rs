use std::path::PathBuf;

use familygems_upstream::gemini::{DEFAULT_GEMINI_API_BASE, DEFAULT_GEMINI_MODEL};
use familygems_upstream::places::DEFAULT_PLACES_API_BASE;

/// Text-generation upstream settings.
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    /// `None` disables the itinerary relay (requests fail with `NOT_CONFIGURED`).
    pub api_key: Option<String>,
    pub model: String,
    pub api_base: String,
}

/// Photo search upstream settings.
#[derive(Debug, Clone)]
pub struct PlacesConfig {
    /// `None` makes every photo lookup return the fallback list.
    pub api_key: Option<String>,
    pub api_base: String,
}

/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development.
/// In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// How long background jobs get to stop after shutdown begins.
    pub shutdown_timeout_secs: u64,
    /// Postgres URL. When unset, blobs are stored as JSON files in `data_dir`.
    pub database_url: Option<String>,
    pub data_dir: PathBuf,
    /// Catalog JSON on disk. When unset, the bundled catalog is used.
    pub catalog_path: Option<PathBuf>,
    pub gemini: GeminiConfig,
    pub places: PlacesConfig,
    /// Warm the photo cache at startup.
    pub prefetch_photos: bool,
}

/// Non-empty value of `name`, trimmed.
fn optional_env(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                 | Default                                     |
    /// |-------------------------|---------------------------------------------|
    /// | `HOST`                  | `0.0.0.0`                                   |
    /// | `PORT`                  | `3000`                                      |
    /// | `CORS_ORIGINS`          | `http://localhost:5173`                     |
    /// | `REQUEST_TIMEOUT_SECS`  | `30`                                        |
    /// | `SHUTDOWN_TIMEOUT_SECS` | `30`                                        |
    /// | `DATABASE_URL`          | unset (JSON files)                          |
    /// | `DATA_DIR`              | `./data`                                    |
    /// | `CATALOG_PATH`          | unset (bundled catalog)                     |
    /// | `GEMINI_API_KEY`        | unset                                       |
    /// | `GEMINI_MODEL`          | `gemini-2.5-flash`                          |
    /// | `GEMINI_API_BASE`       | `https://generativelanguage.googleapis.com` |
    /// | `GOOGLE_PLACES_API_KEY` | unset                                       |
    /// | `PLACES_API_BASE`       | `https://places.googleapis.com`             |
    /// | `PREFETCH_PHOTOS`       | `true`                                      |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let shutdown_timeout_secs: u64 = std::env::var("SHUTDOWN_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("SHUTDOWN_TIMEOUT_SECS must be a valid u64");

        let prefetch_photos: bool = std::env::var("PREFETCH_PHOTOS")
            .unwrap_or_else(|_| "true".into())
            .parse()
            .expect("PREFETCH_PHOTOS must be true or false");

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            shutdown_timeout_secs,
            database_url: optional_env("DATABASE_URL"),
            data_dir: optional_env("DATA_DIR")
                .unwrap_or_else(|| "./data".into())
                .into(),
            catalog_path: optional_env("CATALOG_PATH").map(PathBuf::from),
            gemini: GeminiConfig {
                api_key: optional_env("GEMINI_API_KEY"),
                model: optional_env("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_GEMINI_MODEL.into()),
                api_base: optional_env("GEMINI_API_BASE")
                    .unwrap_or_else(|| DEFAULT_GEMINI_API_BASE.into()),
            },
            places: PlacesConfig {
                api_key: optional_env("GOOGLE_PLACES_API_KEY"),
                api_base: optional_env("PLACES_API_BASE")
                    .unwrap_or_else(|| DEFAULT_PLACES_API_BASE.into()),
            },
            prefetch_photos,
        }
    }
}
