//! Builders for hand-made itineraries.

use std::collections::BTreeMap;

use chrono::NaiveTime;

use trip_planner::config::TrackingConfig;
use trip_planner::haversine::Coordinate;
use trip_planner::model::{DayPlan, Visit};
use trip_planner::traits::FixedClock;
use trip_planner::trip::TripState;

pub const NATIONAL_MALL: Coordinate = Coordinate::new(38.8893, -77.0502);

pub fn hm(hour: u32, min: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, min, 0).expect("valid time")
}

pub fn clock_at(hour: u32, min: u32) -> FixedClock {
    FixedClock(hm(hour, min))
}

/// Roughly `meters` north of the National Mall.
pub fn north_of_mall(meters: f64) -> Coordinate {
    NATIONAL_MALL.offset(meters / 111_195.0, 0.0)
}

/// Builder for test visits with sensible defaults.
#[derive(Clone, Debug)]
pub struct TestVisit {
    id: u32,
    coordinate: Coordinate,
    duration_min: u32,
}

impl TestVisit {
    pub fn new(id: u32) -> Self {
        Self {
            id,
            coordinate: north_of_mall(id as f64 * 1_000.0),
            duration_min: 60,
        }
    }

    pub fn at(mut self, coordinate: Coordinate) -> Self {
        self.coordinate = coordinate;
        self
    }

    pub fn duration(mut self, minutes: u32) -> Self {
        self.duration_min = minutes;
        self
    }

    fn build(self, day: u32, order: u32) -> Visit {
        Visit::planned(
            self.id,
            &format!("Stop {}", self.id),
            self.coordinate,
            "Landmark",
            self.duration_min,
            hm(9, 0),
            hm(10, 0),
            3,
            "test stop",
            4.0,
            day,
            order,
        )
    }
}

/// Builds a trip from per-day visit lists; day numbers start at 1.
pub fn trip_of(days: Vec<Vec<TestVisit>>) -> TripState {
    let plans: BTreeMap<u32, DayPlan> = days
        .into_iter()
        .enumerate()
        .map(|(i, visits)| {
            let day = i as u32 + 1;
            let visits = visits
                .into_iter()
                .enumerate()
                .map(|(j, v)| v.build(day, j as u32 + 1))
                .collect();
            (day, DayPlan::new(day, visits))
        })
        .collect();
    TripState::from_days(plans, TrackingConfig::default())
}
