//! Great-circle distance and drive-time heuristics.
//!
//! Drive time is a flat average-speed estimate, not a routing call.

use serde::{Deserialize, Serialize};

/// Mean Earth radius in miles.
pub const EARTH_RADIUS_MILES: f64 = 3958.8;

/// Average city driving speed used for drive-time estimates.
pub const AVERAGE_SPEED_MPH: f64 = 25.0;

/// A WGS84 latitude/longitude pair in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinate {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

/// A rectangular map viewport. Containment is inclusive on every edge.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub south: f64,
    pub west: f64,
    pub north: f64,
    pub east: f64,
}

impl Bounds {
    pub fn contains(&self, point: Coordinate) -> bool {
        point.lat >= self.south
            && point.lat <= self.north
            && point.lng >= self.west
            && point.lng <= self.east
    }
}

/// Haversine distance between two coordinates, in miles.
pub fn distance_miles(a: Coordinate, b: Coordinate) -> f64 {
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let d_lat = lat2 - lat1;
    let d_lng = (b.lng - a.lng).to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lng / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_MILES * h.sqrt().asin()
}

/// Estimated drive time in whole minutes for a distance in miles.
pub fn estimate_drive_minutes(distance_miles: f64) -> u32 {
    (distance_miles / AVERAGE_SPEED_MPH * 60.0).round().max(0.0) as u32
}

/// Distance and drive-time estimate between a user and a destination.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DriveEstimate {
    pub distance_miles: f64,
    pub drive_minutes: u32,
}

impl DriveEstimate {
    pub fn between(from: Coordinate, to: Coordinate) -> Self {
        let distance_miles = distance_miles(from, to);
        Self {
            distance_miles,
            drive_minutes: estimate_drive_minutes(distance_miles),
        }
    }
}
