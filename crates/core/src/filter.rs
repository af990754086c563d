//! Filter engine: maps the catalog and the user's criteria to the visible
//! subset, preserving catalog order.

use std::collections::BTreeSet;
use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::catalog::Location;
use crate::geo::{distance_miles, estimate_drive_minutes, Bounds, Coordinate};
use crate::hours;

// ---------------------------------------------------------------------------
// Drive-time ceiling
// ---------------------------------------------------------------------------

/// Maximum estimated drive time. On the wire this is `"any"` or a number of
/// minutes (as a number or a numeric string).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DriveTimeLimit {
    #[default]
    Any,
    Minutes(u32),
}

impl fmt::Display for DriveTimeLimit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Any => f.write_str("any"),
            Self::Minutes(m) => write!(f, "{m}"),
        }
    }
}

impl Serialize for DriveTimeLimit {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for DriveTimeLimit {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Wire {
            Minutes(u32),
            Text(String),
        }

        match Wire::deserialize(deserializer)? {
            Wire::Minutes(m) => Ok(Self::Minutes(m)),
            Wire::Text(s) if s.trim().eq_ignore_ascii_case("any") => Ok(Self::Any),
            Wire::Text(s) => s.trim().parse().map(Self::Minutes).map_err(|_| {
                serde::de::Error::custom(format!(
                    "driveTime must be \"any\" or a number of minutes, got '{s}'"
                ))
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// Criteria
// ---------------------------------------------------------------------------

/// Everything the user can filter on. Every field defaults to "unset",
/// which matches every location.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FilterCriteria {
    pub search: String,
    pub categories: BTreeSet<String>,
    pub age_groups: BTreeSet<String>,
    pub prices: BTreeSet<String>,
    pub open_now: bool,
    pub drive_time: DriveTimeLimit,
    pub user_coords: Option<Coordinate>,
    pub bounds: Option<Bounds>,
}

impl FilterCriteria {
    /// Whether `location` passes every predicate at the local time `now`.
    pub fn matches(&self, location: &Location, now: NaiveDateTime) -> bool {
        Predicates::new(self, now).matches(location)
    }
}

/// Criteria with the search text lowered once per filter pass.
struct Predicates<'a> {
    criteria: &'a FilterCriteria,
    search: String,
    now: NaiveDateTime,
}

impl<'a> Predicates<'a> {
    fn new(criteria: &'a FilterCriteria, now: NaiveDateTime) -> Self {
        Self {
            criteria,
            search: criteria.search.to_lowercase(),
            now,
        }
    }

    fn matches(&self, location: &Location) -> bool {
        let c = self.criteria;

        location.name.to_lowercase().contains(&self.search)
            && (c.categories.is_empty() || c.categories.contains(&location.category))
            && (c.age_groups.is_empty()
                || location.age_groups.iter().any(|a| c.age_groups.contains(a)))
            && (c.prices.is_empty() || c.prices.contains(&location.price))
            && (!c.open_now || hours::is_open_at(location, self.now))
            && self.within_drive_time(location)
            && c.bounds.map_or(true, |b| b.contains(location.coordinate()))
    }

    fn within_drive_time(&self, location: &Location) -> bool {
        match (self.criteria.user_coords, self.criteria.drive_time) {
            (Some(user), DriveTimeLimit::Minutes(limit)) => {
                estimate_drive_minutes(distance_miles(user, location.coordinate())) <= limit
            }
            _ => true,
        }
    }
}

/// The ordered subsequence of `locations` matching `criteria` at `now`.
pub fn filter_locations<'a>(
    locations: &'a [Location],
    criteria: &FilterCriteria,
    now: NaiveDateTime,
) -> Vec<&'a Location> {
    let predicates = Predicates::new(criteria, now);
    locations.iter().filter(|l| predicates.matches(l)).collect()
}
