//! Session workflow: the stages a user walks through, from entering trip
//! preferences to live tracking and mid-trip replanning.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::TrackingConfig;
use crate::error::TripError;
use crate::model::{VisitId, VisitStatus};
use crate::trip::{Advance, CompressionPlan, TripState};
use crate::traits::Clock;

pub const MAX_TRIP_DAYS: u32 = 14;

/// Interests the request form offers.
pub const INTERESTS: [&str; 10] = [
    "Culture & History",
    "Nature & Outdoors",
    "Entertainment & Science",
    "Food & Drink",
    "Shopping",
    "City Highlights",
    "Museums",
    "Relaxation & Wellness",
    "Adventure & Activities",
    "Events & Local Life",
];

/// Canned progress script shown while an itinerary "generates".
pub const GENERATION_STEPS: [(&str, u8); 5] = [
    ("Analyzing your preferences...", 20),
    ("Finding top-rated attractions...", 40),
    ("Calculating optimal routes...", 60),
    ("Scheduling activities...", 80),
    ("Finalizing your itinerary...", 100),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Input,
    Generating,
    ItineraryReview,
    Tracking,
    MidTripReplan,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Stage::Input => "input",
            Stage::Generating => "generating",
            Stage::ItineraryReview => "itinerary review",
            Stage::Tracking => "tracking",
            Stage::MidTripReplan => "mid-trip replan",
        };
        f.write_str(label)
    }
}

/// What the user asked for on the input form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripRequest {
    pub days: u32,
    pub destination: String,
    pub interests: Vec<String>,
}

impl Default for TripRequest {
    fn default() -> Self {
        Self {
            days: 2,
            destination: "Washington DC".to_string(),
            interests: vec!["City Highlights".to_string(), "Museums".to_string()],
        }
    }
}

impl TripRequest {
    pub fn validate(&self) -> Result<(), TripError> {
        if !(1..=MAX_TRIP_DAYS).contains(&self.days) {
            return Err(TripError::InvalidRequest(format!(
                "trip length must be 1-{} days, got {}",
                MAX_TRIP_DAYS, self.days
            )));
        }
        if self.destination.trim().is_empty() {
            return Err(TripError::InvalidRequest("destination is empty".to_string()));
        }
        Ok(())
    }
}

/// One browsing session: the current stage, the request and the trip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub stage: Stage,
    pub request: TripRequest,
    pub trip: TripState,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(TrackingConfig::default())
    }
}

impl Session {
    pub fn new(config: TrackingConfig) -> Self {
        Self {
            stage: Stage::Input,
            request: TripRequest::default(),
            trip: TripState::new(config),
        }
    }

    fn expect_stage(&self, expected: Stage) -> Result<(), TripError> {
        if self.stage == expected {
            Ok(())
        } else {
            Err(TripError::WrongStage {
                expected,
                actual: self.stage,
            })
        }
    }

    fn enter(&mut self, stage: Stage) {
        info!(from = %self.stage, to = %stage, "stage change");
        self.stage = stage;
    }

    pub fn submit(&mut self, request: TripRequest) -> Result<(), TripError> {
        self.expect_stage(Stage::Input)?;
        request.validate()?;
        info!(destination = %request.destination, days = request.days, "trip requested");
        self.request = request;
        self.enter(Stage::Generating);
        Ok(())
    }

    pub fn generation_steps(&self) -> &'static [(&'static str, u8)] {
        &GENERATION_STEPS
    }

    pub fn finish_generation(&mut self) -> Result<(), TripError> {
        self.expect_stage(Stage::Generating)?;
        self.enter(Stage::ItineraryReview);
        Ok(())
    }

    pub fn regenerate(&mut self) -> Result<(), TripError> {
        self.expect_stage(Stage::ItineraryReview)?;
        self.enter(Stage::Generating);
        Ok(())
    }

    /// Accepts the reviewed itinerary and starts the trip.
    pub fn accept_itinerary(&mut self) -> Result<VisitId, TripError> {
        self.expect_stage(Stage::ItineraryReview)?;
        let first = self.trip.start_trip()?;
        self.enter(Stage::Tracking);
        Ok(first)
    }

    /// Starts a checked-in visit from the tracking view.
    pub fn start_visit(&mut self, id: VisitId, clock: &impl Clock) -> Result<(), TripError> {
        self.expect_stage(Stage::Tracking)?;
        self.trip.start_visit(id, clock)
    }

    /// Completes a visit; an overstay sends the session to replanning.
    pub fn complete_visit(
        &mut self,
        id: VisitId,
        variance_min: i32,
        clock: &impl Clock,
    ) -> Result<Advance, TripError> {
        self.expect_stage(Stage::Tracking)?;
        let advance = self.trip.complete_visit(id, variance_min, clock)?;
        if variance_min > 0 {
            self.trip.trigger_replan();
            self.enter(Stage::MidTripReplan);
        }
        Ok(advance)
    }

    pub fn request_replan(&mut self) -> Result<(), TripError> {
        self.expect_stage(Stage::Tracking)?;
        self.trip.trigger_replan();
        self.enter(Stage::MidTripReplan);
        Ok(())
    }

    /// Keeps every stop and shortens the remaining ones.
    pub fn apply_compression(&mut self) -> Result<CompressionPlan, TripError> {
        self.expect_stage(Stage::MidTripReplan)?;
        let plan = self.trip.compress_remaining()?;
        self.enter(Stage::Tracking);
        Ok(plan)
    }

    /// Drops the chosen pending stops and carries on with the rest.
    ///
    /// Every id is checked before any visit is skipped.
    pub fn apply_replan(&mut self, skips: &[VisitId]) -> Result<(), TripError> {
        self.expect_stage(Stage::MidTripReplan)?;
        let pending: Vec<VisitId> = self.trip.remaining_pending().iter().map(|v| v.id).collect();
        for id in skips {
            if !pending.contains(id) {
                let visit = self.trip.visit(*id)?;
                if visit.day != self.trip.current_day {
                    return Err(TripError::VisitNotInCurrentDay {
                        visit: *id,
                        visit_day: visit.day,
                        current_day: self.trip.current_day,
                    });
                }
                return Err(TripError::InvalidTransition {
                    visit: *id,
                    from: visit.status,
                    to: VisitStatus::Skipped,
                });
            }
        }
        for id in skips {
            self.trip.skip_visit(*id)?;
        }
        self.trip.clear_replan();
        self.enter(Stage::Tracking);
        Ok(())
    }

    /// Canned: acknowledges the new interests and returns to tracking
    /// without touching the itinerary.
    pub fn generate_new_itinerary(&mut self, interests: Vec<String>) -> Result<(), TripError> {
        self.expect_stage(Stage::MidTripReplan)?;
        info!(?interests, "new itinerary requested for the rest of the day");
        self.trip.clear_replan();
        self.enter(Stage::Tracking);
        Ok(())
    }

    /// Drops everything and returns to the input form.
    pub fn start_over(&mut self) {
        *self = Self::default();
        info!("session restarted");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_validation() {
        assert!(TripRequest::default().validate().is_ok());
        let too_long = TripRequest {
            days: 15,
            ..TripRequest::default()
        };
        assert!(matches!(too_long.validate(), Err(TripError::InvalidRequest(_))));
        let nowhere = TripRequest {
            destination: "  ".to_string(),
            ..TripRequest::default()
        };
        assert!(nowhere.validate().is_err());
    }

    #[test]
    fn test_generation_steps_end_at_100() {
        let session = Session::default();
        let steps = session.generation_steps();
        assert_eq!(steps.len(), 5);
        assert_eq!(steps.last().map(|s| s.1), Some(100));
        assert!(steps.windows(2).all(|w| w[0].1 < w[1].1));
    }

    #[test]
    fn test_wrong_stage() {
        let mut session = Session::default();
        assert_eq!(
            session.finish_generation(),
            Err(TripError::WrongStage {
                expected: Stage::Generating,
                actual: Stage::Input,
            })
        );
    }
}
