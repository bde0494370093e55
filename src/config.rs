//! Tracking configuration.

use serde::{Deserialize, Serialize};

use crate::error::TripError;

/// Check-in radii offered to the user, in meters.
pub const RADIUS_OPTIONS: [f64; 4] = [50.0, 100.0, 150.0, 200.0];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackingConfig {
    /// Distance within which a visit auto-checks-in, in meters.
    pub checkin_radius_m: f64,
    pub auto_checkin_enabled: bool,
    /// Floor applied when compressing planned durations.
    pub min_visit_minutes: u32,
    /// Drift (either way) still reported as on time.
    pub schedule_tolerance_minutes: i32,
    /// Maximum offset of a simulated move from its target, in degrees.
    pub jitter_degrees: f64,
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            checkin_radius_m: 100.0,
            auto_checkin_enabled: true,
            min_visit_minutes: 15,
            schedule_tolerance_minutes: 15,
            jitter_degrees: 0.0005,
        }
    }
}

impl TrackingConfig {
    pub fn with_radius(mut self, radius_m: f64) -> Result<Self, TripError> {
        self.checkin_radius_m = validate_radius(radius_m)?;
        Ok(self)
    }
}

pub(crate) fn validate_radius(radius_m: f64) -> Result<f64, TripError> {
    if radius_m.is_finite() && radius_m > 0.0 {
        Ok(radius_m)
    } else {
        Err(TripError::InvalidRadius(radius_m))
    }
}
