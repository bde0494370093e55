//! Great-circle distance between points.
//!
//! Straight-line distance only; there is no road network behind it.

use serde::{Deserialize, Serialize};

/// Earth radius in meters.
const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// A latitude/longitude pair in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinate {
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Returns this coordinate shifted by the given degree offsets.
    pub fn offset(self, d_lat: f64, d_lon: f64) -> Self {
        Self {
            lat: self.lat + d_lat,
            lon: self.lon + d_lon,
        }
    }

    pub fn distance_to(self, other: Coordinate) -> f64 {
        distance(self, other)
    }
}

/// Haversine distance between two points in meters.
///
/// Inputs are not validated; out-of-range degrees give meaningless results.
pub fn distance(from: Coordinate, to: Coordinate) -> f64 {
    let lat1_rad = from.lat.to_radians();
    let lat2_rad = to.lat.to_radians();
    let delta_lat = (to.lat - from.lat).to_radians();
    let delta_lon = (to.lon - from.lon).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().min(1.0).asin();

    EARTH_RADIUS_M * c
}

/// Short label for a distance, e.g. `"850m away"` or `"1.3km away"`.
pub fn describe_distance(meters: f64) -> String {
    let whole = meters as i64;
    if whole < 1000 {
        format!("{}m away", whole)
    } else {
        format!("{:.1}km away", whole as f64 / 1000.0)
    }
}
