//! Handlers for catalog browsing and filtering.

use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::Json;
use chrono::NaiveDateTime;
use familygems_core::catalog::Location;
use familygems_core::error::CoreError;
use familygems_core::filter::{filter_locations, FilterCriteria};
use familygems_core::geo::{Coordinate, DriveEstimate};
use familygems_core::hours::is_open_at;
use familygems_core::types::LocationId;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// Body of `POST /locations/search`: filter criteria plus an optional local
/// wall-clock time for the open-now check.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    #[serde(flatten)]
    pub criteria: FilterCriteria,
    pub now: Option<NaiveDateTime>,
}

/// A location annotated for display.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationView<'a> {
    #[serde(flatten)]
    pub location: &'a Location,
    pub open_now: bool,
    /// Present only when the caller supplied a coordinate.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub drive: Option<DriveEstimate>,
}

impl<'a> LocationView<'a> {
    fn new(location: &'a Location, now: NaiveDateTime, from: Option<Coordinate>) -> Self {
        Self {
            location,
            open_now: is_open_at(location, now),
            drive: from.map(|c| DriveEstimate::between(c, location.coordinate())),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse<'a> {
    /// Catalog size before filtering.
    pub total: usize,
    pub locations: Vec<LocationView<'a>>,
}

/// Optional user coordinate for distance display.
#[derive(Debug, Default, Deserialize)]
pub struct CoordinateQuery {
    pub lat: Option<f64>,
    pub lng: Option<f64>,
}

impl CoordinateQuery {
    fn coordinate(&self) -> AppResult<Option<Coordinate>> {
        match (self.lat, self.lng) {
            (Some(lat), Some(lng)) if lat.is_finite() && lng.is_finite() => {
                Ok(Some(Coordinate::new(lat, lng)))
            }
            (None, None) => Ok(None),
            _ => Err(AppError::BadRequest(
                "lat and lng must be given together as finite numbers".into(),
            )),
        }
    }
}

fn local_now() -> NaiveDateTime {
    chrono::Local::now().naive_local()
}

// ---------------------------------------------------------------------------
// Endpoints
// ---------------------------------------------------------------------------

/// GET /api/v1/locations
pub async fn list_locations(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    Ok(Json(DataResponse {
        data: state.catalog.locations(),
    })
    .into_response())
}

/// POST /api/v1/locations/search
///
/// Apply filter criteria; matches keep catalog order.
pub async fn search_locations(
    State(state): State<AppState>,
    Json(input): Json<SearchRequest>,
) -> AppResult<impl IntoResponse> {
    let now = input.now.unwrap_or_else(local_now);
    let criteria = &input.criteria;

    let matched = filter_locations(state.catalog.locations(), criteria, now);
    tracing::debug!(
        matched = matched.len(),
        total = state.catalog.len(),
        "Filtered locations"
    );

    let locations = matched
        .into_iter()
        .map(|l| LocationView::new(l, now, criteria.user_coords))
        .collect();

    Ok(Json(DataResponse {
        data: SearchResponse {
            total: state.catalog.len(),
            locations,
        },
    })
    .into_response())
}

/// GET /api/v1/locations/facets
pub async fn get_facets(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    Ok(Json(DataResponse {
        data: state.catalog.facets(),
    }))
}

/// GET /api/v1/locations/{id}?lat=&lng=
pub async fn get_location(
    State(state): State<AppState>,
    Path(id): Path<LocationId>,
    Query(query): Query<CoordinateQuery>,
) -> AppResult<impl IntoResponse> {
    let from = query.coordinate()?;
    let location = state
        .catalog
        .get(id)
        .ok_or_else(|| CoreError::not_found("Location", id))?;

    Ok(Json(DataResponse {
        data: LocationView::new(location, local_now(), from),
    })
    .into_response())
}
