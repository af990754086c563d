//! REST client for the Places API (text search and photo media).
//!
//! The API key is sent as a header and never appears in URLs handed back to
//! callers.

use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;

/// Default API origin.
pub const DEFAULT_PLACES_API_BASE: &str = "https://places.googleapis.com";

/// Response fields requested from text search.
const SEARCH_FIELD_MASK: &str = "places.id,places.displayName,places.photos";

/// At most this many photos are taken from the best match.
pub const MAX_PHOTOS_PER_PLACE: usize = 4;

/// Width requested when fetching photo media.
pub const PHOTO_MAX_WIDTH_PX: u32 = 800;

/// `places/<place id>/photos/<photo reference>`
static PHOTO_NAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^places/[A-Za-z0-9_-]+/photos/[A-Za-z0-9_-]+$").expect("valid regex")
});

/// Whether `name` is a photo resource name as returned by text search.
pub fn is_photo_resource_name(name: &str) -> bool {
    PHOTO_NAME_RE.is_match(name)
}

/// Errors from the Places REST layer.
#[derive(Debug, thiserror::Error)]
pub enum PlacesApiError {
    /// The HTTP request itself failed (network, DNS, TLS, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Places returned a non-2xx status code.
    #[error("Places API error ({status}): {body}")]
    ApiError { status: u16, body: String },
}

#[derive(Debug, Clone, Deserialize)]
pub struct DisplayName {
    pub text: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlacePhoto {
    /// Resource name, `places/.../photos/...`.
    pub name: String,
    #[serde(default)]
    pub width_px: u32,
    #[serde(default)]
    pub height_px: u32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Place {
    #[serde(default)]
    pub id: String,
    pub display_name: Option<DisplayName>,
    #[serde(default)]
    pub photos: Vec<PlacePhoto>,
}

#[derive(Debug, Default, Deserialize)]
struct SearchTextResponse {
    #[serde(default)]
    places: Vec<Place>,
}

/// Raw photo bytes with the upstream content type.
#[derive(Debug, Clone)]
pub struct PlaceMedia {
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// HTTP client for the Places API.
#[derive(Clone)]
pub struct PlacesApi {
    client: reqwest::Client,
    api_base: String,
    api_key: String,
}

impl PlacesApi {
    pub fn new(api_key: String, api_base: String) -> Self {
        Self::with_client(reqwest::Client::new(), api_key, api_base)
    }

    /// Reuse an existing [`reqwest::Client`] for connection pooling.
    pub fn with_client(client: reqwest::Client, api_key: String, api_base: String) -> Self {
        Self {
            client,
            api_base: api_base.trim_end_matches('/').to_string(),
            api_key,
        }
    }

    /// Text search. Returns the best match, or `None` when nothing matched.
    ///
    /// Sends `POST /v1/places:searchText` with `{ "textQuery": query }`.
    pub async fn search_text(&self, query: &str) -> Result<Option<Place>, PlacesApiError> {
        let response = self
            .client
            .post(format!("{}/v1/places:searchText", self.api_base))
            .header("X-Goog-Api-Key", &self.api_key)
            .header("X-Goog-FieldMask", SEARCH_FIELD_MASK)
            .json(&serde_json::json!({ "textQuery": query }))
            .send()
            .await?;

        let parsed: SearchTextResponse = Self::parse_response(response).await?;
        Ok(parsed.places.into_iter().next())
    }

    /// Photo resource names of the best match for `query`, capped at
    /// [`MAX_PHOTOS_PER_PLACE`]. Empty when no place or no photos were found.
    pub async fn search_photo_names(&self, query: &str) -> Result<Vec<String>, PlacesApiError> {
        let Some(place) = self.search_text(query).await? else {
            return Ok(Vec::new());
        };
        tracing::debug!(
            place_id = %place.id,
            name = place.display_name.as_ref().map(|d| d.text.as_str()).unwrap_or("Unknown"),
            photos = place.photos.len(),
            "Places search matched",
        );
        Ok(place
            .photos
            .into_iter()
            .take(MAX_PHOTOS_PER_PLACE)
            .map(|p| p.name)
            .collect())
    }

    /// Download one photo. Sends `GET /v1/{name}/media?maxWidthPx=...`.
    pub async fn fetch_media(
        &self,
        name: &str,
        max_width_px: u32,
    ) -> Result<PlaceMedia, PlacesApiError> {
        let response = self
            .client
            .get(format!("{}/v1/{name}/media", self.api_base))
            .query(&[("maxWidthPx", max_width_px)])
            .header("X-Goog-Api-Key", &self.api_key)
            .send()
            .await?;

        let response = Self::ensure_success(response).await?;
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("application/octet-stream")
            .to_string();
        let bytes = response.bytes().await?.to_vec();

        Ok(PlaceMedia {
            content_type,
            bytes,
        })
    }

    // ---- private helpers ----

    async fn ensure_success(
        response: reqwest::Response,
    ) -> Result<reqwest::Response, PlacesApiError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(PlacesApiError::ApiError {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    async fn parse_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, PlacesApiError> {
        let response = Self::ensure_success(response).await?;
        Ok(response.json::<T>().await?)
    }
}
