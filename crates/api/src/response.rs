//! Shared response envelope types for API handlers.
//!
//! Every endpoint except the itinerary relay answers with `{ "data": ... }`.

use serde::Serialize;

/// Standard `{ "data": T }` response envelope.
#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub data: T,
}
