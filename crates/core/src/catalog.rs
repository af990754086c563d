//! Points of interest and the immutable catalog that owns them.
//!
//! The wire format is camelCase JSON so the browser client and the itinerary
//! relay exchange the same shape the data set is authored in.

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::geo::Coordinate;
pub use crate::hours::Hours;
use crate::types::LocationId;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Price tiers, cheapest first.
pub const PRICE_TIERS: &[&str] = &["Free", "$", "$$", "$$$"];

/// Drive-time ceilings offered to the user, in filter wire format.
pub const DRIVE_TIME_OPTIONS: &[&str] = &["any", "15", "30", "60"];

/// Data set compiled into the binary, used when no catalog path is configured.
const BUNDLED_CATALOG: &str = include_str!("../data/locations.json");

// ---------------------------------------------------------------------------
// Point of interest
// ---------------------------------------------------------------------------

/// A ticket price: either a dollar amount or free text ("Varies", "Free w/ adult").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TicketPrice {
    Amount(f64),
    Text(String),
}

impl TicketPrice {
    pub fn amount(&self) -> Option<f64> {
        match self {
            Self::Amount(v) => Some(*v),
            Self::Text(_) => None,
        }
    }
}

/// Ticket label (`Adult`, `Child`, `General`, ...) to price.
pub type TicketInfo = BTreeMap<String, TicketPrice>;

/// A dated happening at a location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub title: String,
    pub date: String,
    pub description: String,
    pub cost: String,
}

/// A single discoverable family-activity location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    pub id: LocationId,
    pub name: String,
    pub category: String,
    pub lat: f64,
    pub lng: f64,
    pub address: String,
    #[serde(default)]
    pub age_groups: Vec<String>,
    pub price: String,
    #[serde(default)]
    pub hours: Hours,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub gallery: Vec<String>,
    #[serde(default)]
    pub rating: f64,
    #[serde(default)]
    pub review_count: u32,
    #[serde(default)]
    pub review_highlights: Vec<String>,
    #[serde(default)]
    pub tips: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub events: Option<Vec<Event>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ticket_info: Option<TicketInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Location {
    pub fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.lat, self.lng)
    }
}

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

/// Distinct filter options derived from the catalog.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Facets {
    /// Sorted alphabetically.
    pub categories: Vec<String>,
    /// In order of first appearance.
    pub age_groups: Vec<String>,
    pub prices: Vec<String>,
    pub drive_times: Vec<String>,
}

/// The full, immutable list of points of interest, in authored order.
#[derive(Debug, Clone)]
pub struct Catalog {
    locations: Vec<Location>,
}

impl Catalog {
    /// Build a catalog, rejecting duplicate ids and non-finite coordinates.
    pub fn from_locations(locations: Vec<Location>) -> Result<Self, CoreError> {
        let mut seen = HashSet::with_capacity(locations.len());
        for location in &locations {
            if !seen.insert(location.id) {
                return Err(CoreError::Validation(format!(
                    "Duplicate location id {} ({})",
                    location.id, location.name
                )));
            }
            if !location.lat.is_finite() || !location.lng.is_finite() {
                return Err(CoreError::Validation(format!(
                    "Location {} has a non-finite coordinate",
                    location.id
                )));
            }
        }
        Ok(Self { locations })
    }

    /// Parse a JSON array of locations.
    pub fn from_json(json: &str) -> Result<Self, CoreError> {
        let locations: Vec<Location> = serde_json::from_str(json)
            .map_err(|e| CoreError::Validation(format!("Invalid catalog JSON: {e}")))?;
        Self::from_locations(locations)
    }

    /// Load a catalog JSON file from disk.
    pub fn from_path(path: &Path) -> Result<Self, CoreError> {
        let json = std::fs::read_to_string(path).map_err(|e| {
            CoreError::Internal(format!("Failed to read catalog {}: {e}", path.display()))
        })?;
        Self::from_json(&json)
    }

    /// The data set compiled into the binary.
    pub fn bundled() -> Result<Self, CoreError> {
        Self::from_json(BUNDLED_CATALOG)
    }

    pub fn locations(&self) -> &[Location] {
        &self.locations
    }

    pub fn get(&self, id: LocationId) -> Option<&Location> {
        self.locations.iter().find(|l| l.id == id)
    }

    pub fn ids(&self) -> impl Iterator<Item = LocationId> + '_ {
        self.locations.iter().map(|l| l.id)
    }

    pub fn len(&self) -> usize {
        self.locations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }

    pub fn facets(&self) -> Facets {
        let categories: BTreeSet<&str> =
            self.locations.iter().map(|l| l.category.as_str()).collect();

        let mut age_groups: Vec<String> = Vec::new();
        for age in self.locations.iter().flat_map(|l| &l.age_groups) {
            if !age_groups.contains(age) {
                age_groups.push(age.clone());
            }
        }

        Facets {
            categories: categories.into_iter().map(str::to_string).collect(),
            age_groups,
            prices: PRICE_TIERS.iter().map(|p| p.to_string()).collect(),
            drive_times: DRIVE_TIME_OPTIONS.iter().map(|d| d.to_string()).collect(),
        }
    }
}
