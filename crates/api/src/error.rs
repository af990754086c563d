use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use familygems_core::error::CoreError;
use familygems_upstream::gemini::GeminiApiError;
use familygems_upstream::photos::PhotoFetchError;
use serde_json::json;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for domain errors and adds HTTP-specific variants.
/// Implements [`IntoResponse`] to produce `{ "error", "code" }` JSON bodies.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `familygems_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// The text-generation upstream failed.
    #[error("Text generation failed: {0}")]
    Gemini(#[from] GeminiApiError),

    /// A third-party call other than text generation failed.
    #[error("Upstream error: {0}")]
    Upstream(String),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// A feature that needs server-side configuration that is missing.
    /// The message is shown to the caller verbatim.
    #[error("{0}")]
    NotConfigured(String),

    /// An internal error with a human-readable message.
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl From<PhotoFetchError> for AppError {
    fn from(err: PhotoFetchError) -> Self {
        match err {
            PhotoFetchError::InvalidName(_) => AppError::BadRequest(err.to_string()),
            PhotoFetchError::NotConfigured => {
                AppError::NotConfigured("GOOGLE_PLACES_API_KEY is not set on the server".into())
            }
            PhotoFetchError::NoPlace(_) | PhotoFetchError::Places(_) => {
                AppError::Upstream(err.to_string())
            }
        }
    }
}

fn internal() -> (StatusCode, &'static str, String) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "INTERNAL_ERROR",
        "An internal error occurred".to_string(),
    )
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            // --- CoreError variants ---
            AppError::Core(core) => match core {
                CoreError::NotFound { entity, id } => (
                    StatusCode::NOT_FOUND,
                    "NOT_FOUND",
                    format!("{entity} with id {id} not found"),
                ),
                CoreError::Validation(msg) => {
                    (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
                }
                CoreError::Storage(msg) => {
                    tracing::error!(error = %msg, "Storage error");
                    internal()
                }
                CoreError::Internal(msg) => {
                    tracing::error!(error = %msg, "Internal core error");
                    internal()
                }
            },

            // --- Upstream errors ---
            AppError::Gemini(err) => {
                tracing::error!(error = %err, "Text generation failed");
                (StatusCode::BAD_GATEWAY, "UPSTREAM_ERROR", self.to_string())
            }
            AppError::Upstream(msg) => {
                tracing::warn!(error = %msg, "Upstream error");
                (StatusCode::BAD_GATEWAY, "UPSTREAM_ERROR", msg.clone())
            }

            // --- HTTP-specific errors ---
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            AppError::NotConfigured(msg) => {
                tracing::error!(error = %msg, "Feature not configured");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "NOT_CONFIGURED",
                    msg.clone(),
                )
            }
            AppError::InternalError(msg) => {
                tracing::error!(error = %msg, "Internal error");
                internal()
            }
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}
