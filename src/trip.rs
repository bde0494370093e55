//! Trip state machine: day/visit pointers, completion, replanning and drift.

use std::collections::BTreeMap;
use std::fmt;

use chrono::TimeDelta;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::{TrackingConfig, validate_radius};
use crate::error::TripError;
use crate::haversine::Coordinate;
use crate::model::{CheckIn, DayPlan, DayProgress, DayStatus, Visit, VisitId, VisitStatus};
use crate::proximity;
use crate::sample;
use crate::traits::{Clock, Jitter};

/// What happened after a visit was completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    /// Another visit of the same day is now in progress.
    NextVisit(VisitId),
    /// The day is done; the first visit of `day` is now in progress.
    NextDay { day: u32, visit: VisitId },
    /// No visit is left anywhere.
    TripFinished,
}

/// How far the trip has drifted from its plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduleStatus {
    OnTime,
    Behind(i32),
    Ahead(i32),
}

impl fmt::Display for ScheduleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScheduleStatus::OnTime => f.write_str("On Time"),
            ScheduleStatus::Behind(min) => write!(f, "{} min Behind", min),
            ScheduleStatus::Ahead(min) => write!(f, "{} min Ahead", min),
        }
    }
}

/// Preview of a schedule compression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompressionPlan {
    pub per_visit_min: u32,
    /// `(visit, current duration, compressed duration)` for each pending visit.
    pub adjustments: Vec<(VisitId, u32, u32)>,
}

/// The whole itinerary plus the simulated user's progress through it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripState {
    pub days: BTreeMap<u32, DayPlan>,
    pub current_day: u32,
    pub current_visit_idx: usize,
    pub user_position: Coordinate,
    pub tracking_active: bool,
    /// Cumulative drift in minutes; positive means behind schedule.
    pub time_variance_min: i32,
    pub config: TrackingConfig,
    pub last_checkin: Option<CheckIn>,
    pub replan_requested: bool,
}

impl Default for TripState {
    fn default() -> Self {
        Self::new(TrackingConfig::default())
    }
}

impl TripState {
    /// A fresh trip over the sample itinerary.
    pub fn new(config: TrackingConfig) -> Self {
        Self::from_days(sample::washington_dc(), config)
    }

    pub fn from_days(days: BTreeMap<u32, DayPlan>, config: TrackingConfig) -> Self {
        let current_day = days.keys().next().copied().unwrap_or(1);
        Self {
            days,
            current_day,
            current_visit_idx: 0,
            user_position: sample::START_POSITION,
            tracking_active: false,
            time_variance_min: 0,
            config,
            last_checkin: None,
            replan_requested: false,
        }
    }

    /// Throws away all progress and starts over from the sample itinerary.
    pub fn reset(&mut self) {
        *self = Self::new(TrackingConfig::default());
        info!("trip reset");
    }

    pub fn day(&self, day: u32) -> Result<&DayPlan, TripError> {
        self.days.get(&day).ok_or(TripError::UnknownDay(day))
    }

    pub fn current_plan(&self) -> Result<&DayPlan, TripError> {
        self.day(self.current_day)
    }

    fn current_plan_mut(&mut self) -> Result<&mut DayPlan, TripError> {
        let day = self.current_day;
        self.days.get_mut(&day).ok_or(TripError::UnknownDay(day))
    }

    pub fn visit(&self, id: VisitId) -> Result<&Visit, TripError> {
        self.days
            .values()
            .find_map(|plan| plan.visit(id))
            .ok_or(TripError::UnknownVisit(id))
    }

    /// Index of `id` within the current day, failing if it lives elsewhere.
    fn current_index_of(&self, id: VisitId) -> Result<usize, TripError> {
        let plan = self.current_plan()?;
        match plan.index_of(id) {
            Some(idx) => Ok(idx),
            None => {
                let visit = self.visit(id)?;
                Err(TripError::VisitNotInCurrentDay {
                    visit: id,
                    visit_day: visit.day,
                    current_day: self.current_day,
                })
            }
        }
    }

    /// Marks the first day with an open visit in progress, along with that
    /// visit. A visit already started on that day stays the current one.
    pub fn start_trip(&mut self) -> Result<VisitId, TripError> {
        let first_day = self
            .days
            .iter()
            .find(|(_, plan)| plan.in_progress().is_some() || first_open(plan, 0).is_some())
            .map(|(day, _)| *day)
            .ok_or(TripError::NoOpenVisit(self.current_day))?;
        self.current_day = first_day;
        let visit = self.begin_day(first_day)?;
        info!(day = first_day, visit = %visit, "trip started");
        Ok(visit)
    }

    /// Marks `day` in progress and makes its in-progress visit, or else its
    /// first open visit, the current one.
    fn begin_day(&mut self, day: u32) -> Result<VisitId, TripError> {
        let plan = self.days.get_mut(&day).ok_or(TripError::UnknownDay(day))?;
        let idx = match plan.visits.iter().position(|v| v.status == VisitStatus::InProgress) {
            Some(idx) => idx,
            None => {
                let idx = first_open(plan, 0).ok_or(TripError::NoOpenVisit(day))?;
                plan.visits[idx].transition(VisitStatus::InProgress)?;
                idx
            }
        };
        plan.status = DayStatus::InProgress;
        self.current_visit_idx = idx;
        Ok(plan.visits[idx].id)
    }

    /// Starts a visit the user has checked in to. Every earlier visit of the
    /// day must already be completed or skipped.
    pub fn start_visit(&mut self, id: VisitId, clock: &impl Clock) -> Result<(), TripError> {
        let idx = self.current_index_of(id)?;
        let plan = self.current_plan_mut()?;
        if let Some(active) = plan.in_progress() {
            if active.id != id {
                return Err(TripError::VisitAlreadyInProgress(active.id));
            }
        }
        if let Some(open) = plan.visits[..idx].iter().find(|v| !v.status.is_terminal()) {
            return Err(TripError::EarlierVisitOpen {
                visit: id,
                earlier: open.id,
            });
        }

        let visit = &mut plan.visits[idx];
        if visit.status != VisitStatus::CheckedIn {
            return Err(TripError::InvalidTransition {
                visit: id,
                from: visit.status,
                to: VisitStatus::InProgress,
            });
        }
        visit.transition(VisitStatus::InProgress)?;
        visit.actual_start = Some(clock.now());
        self.current_visit_idx = idx;
        info!(visit = %id, "visit started");
        Ok(())
    }

    /// Finishes the in-progress visit `id`, `variance_min` minutes over (or
    /// under, when negative) its planned duration, and moves the pointers on.
    ///
    /// Nothing changes unless the whole step succeeds. Later days without an
    /// open visit are stepped over and marked completed.
    pub fn complete_visit(
        &mut self,
        id: VisitId,
        variance_min: i32,
        clock: &impl Clock,
    ) -> Result<Advance, TripError> {
        let idx = self.current_index_of(id)?;
        let finished_day = self.current_day;

        let plan = self.current_plan()?;
        let status = plan.visits[idx].status;
        if !status.can_transition_to(VisitStatus::Completed) {
            return Err(TripError::InvalidTransition {
                visit: id,
                from: status,
                to: VisitStatus::Completed,
            });
        }
        let next_in_day = first_open(plan, idx + 1);
        let next_day = match next_in_day {
            Some(_) => None,
            None => self
                .days
                .range(finished_day + 1..)
                .find(|(_, plan)| first_open(plan, 0).is_some())
                .map(|(day, _)| *day),
        };

        let now = clock.now();
        let plan = self.current_plan_mut()?;
        let visit = &mut plan.visits[idx];
        visit.transition(VisitStatus::Completed)?;
        let actual_min = i64::from(visit.planned_duration_min) + i64::from(variance_min);
        visit.actual_start = Some(now);
        visit.actual_end = Some(now + TimeDelta::minutes(actual_min));

        if let Some(next_idx) = next_in_day {
            let next = &mut plan.visits[next_idx];
            next.transition(VisitStatus::InProgress)?;
            let next_id = next.id;
            self.current_visit_idx = next_idx;
            self.record_variance(id, variance_min);
            debug!(visit = %next_id, "next visit in progress");
            return Ok(Advance::NextVisit(next_id));
        }

        plan.status = DayStatus::Completed;
        self.record_variance(id, variance_min);
        let passed_until = next_day.unwrap_or(u32::MAX);
        for (_, plan) in self.days.range_mut(finished_day + 1..passed_until) {
            plan.status = DayStatus::Completed;
        }

        match next_day {
            Some(day) => {
                self.current_day = day;
                let visit = self.begin_day(day)?;
                info!(finished_day, day, visit = %visit, "moved to next day");
                Ok(Advance::NextDay { day, visit })
            }
            None => {
                info!(finished_day, "trip finished");
                Ok(Advance::TripFinished)
            }
        }
    }

    fn record_variance(&mut self, id: VisitId, variance_min: i32) {
        self.time_variance_min += variance_min;
        info!(
            visit = %id,
            variance_min,
            time_variance_min = self.time_variance_min,
            "visit completed"
        );
    }

    /// Skips a visit the user has not reached yet.
    pub fn skip_visit(&mut self, id: VisitId) -> Result<(), TripError> {
        let idx = self.current_index_of(id)?;
        let plan = self.current_plan_mut()?;
        plan.visits[idx].transition(VisitStatus::Skipped)?;
        info!(visit = %id, "visit skipped");
        Ok(())
    }

    /// Asks the surrounding workflow to offer replanning. No visit changes.
    pub fn trigger_replan(&mut self) {
        self.replan_requested = true;
        info!(time_variance_min = self.time_variance_min, "replan requested");
    }

    pub fn clear_replan(&mut self) {
        self.replan_requested = false;
    }

    /// Pending visits of the current day, in order.
    pub fn remaining_pending(&self) -> Vec<&Visit> {
        self.current_plan()
            .map(|plan| {
                plan.visits
                    .iter()
                    .filter(|v| v.status == VisitStatus::Pending)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// What `compress_remaining` would do, without doing it.
    pub fn compression_plan(&self) -> Result<CompressionPlan, TripError> {
        if self.time_variance_min <= 0 {
            return Err(TripError::NotBehindSchedule(self.time_variance_min));
        }
        let remaining = self.remaining_pending();
        let per_visit_min = if remaining.is_empty() {
            0
        } else {
            self.time_variance_min.unsigned_abs() / remaining.len() as u32
        };
        let floor = self.config.min_visit_minutes;
        let adjustments = remaining
            .iter()
            .map(|v| {
                let compressed = v.planned_duration_min.saturating_sub(per_visit_min).max(floor);
                (v.id, v.planned_duration_min, compressed)
            })
            .collect();
        Ok(CompressionPlan {
            per_visit_min,
            adjustments,
        })
    }

    /// Spreads the accumulated delay over the day's pending visits and
    /// clears the drift. Applying it twice compresses twice.
    pub fn compress_remaining(&mut self) -> Result<CompressionPlan, TripError> {
        let plan = self.compression_plan()?;
        let day = self.current_plan_mut()?;
        for (id, _, compressed) in &plan.adjustments {
            if let Some(visit) = day.visit_mut(*id) {
                visit.planned_duration_min = *compressed;
            }
        }
        day.recompute_total();

        info!(
            per_visit_min = plan.per_visit_min,
            visits = plan.adjustments.len(),
            cleared_min = self.time_variance_min,
            "schedule compressed"
        );
        self.time_variance_min = 0;
        self.replan_requested = false;
        Ok(plan)
    }

    pub fn start_tracking(&mut self, clock: &impl Clock) -> Result<Option<CheckIn>, TripError> {
        self.tracking_active = true;
        info!("tracking started");
        if self.config.auto_checkin_enabled {
            self.check_proximity(clock)
        } else {
            Ok(None)
        }
    }

    pub fn pause_tracking(&mut self) {
        self.tracking_active = false;
        info!("tracking paused");
    }

    /// Periodic refresh; only checks proximity while tracking with
    /// auto-check-in on.
    pub fn refresh(&mut self, clock: &impl Clock) -> Result<Option<CheckIn>, TripError> {
        if self.tracking_active && self.config.auto_checkin_enabled {
            self.check_proximity(clock)
        } else {
            Ok(None)
        }
    }

    /// Simulates walking to `id`, landing within the configured jitter of it.
    ///
    /// With auto-check-in off this only moves the user: no distances are
    /// refreshed and nothing checks in, same as `refresh`.
    pub fn move_towards(
        &mut self,
        id: VisitId,
        jitter: &mut impl Jitter,
        clock: &impl Clock,
    ) -> Result<Option<CheckIn>, TripError> {
        let target = self.visit(id)?.coordinate;
        let (d_lat, d_lon) = jitter.offset(self.config.jitter_degrees);
        self.user_position = target.offset(d_lat, d_lon);
        debug!(
            visit = %id,
            lat = self.user_position.lat,
            lon = self.user_position.lon,
            "user moved"
        );

        if self.config.auto_checkin_enabled {
            self.check_proximity(clock)
        } else {
            Ok(None)
        }
    }

    fn check_proximity(&mut self, clock: &impl Clock) -> Result<Option<CheckIn>, TripError> {
        let position = self.user_position;
        let radius = self.config.checkin_radius_m;
        let now = clock.now();
        let plan = self.current_plan_mut()?;
        let check_in = proximity::evaluate(position, plan, radius, now);
        if let Some(check_in) = &check_in {
            self.last_checkin = Some(check_in.clone());
        }
        Ok(check_in)
    }

    pub fn set_checkin_radius(&mut self, radius_m: f64) -> Result<(), TripError> {
        self.config.checkin_radius_m = validate_radius(radius_m)?;
        debug!(radius_m, "check-in radius changed");
        Ok(())
    }

    pub fn set_auto_checkin(&mut self, enabled: bool) {
        self.config.auto_checkin_enabled = enabled;
    }

    pub fn dismiss_checkin(&mut self) {
        self.last_checkin = None;
    }

    /// The visit being done right now on the current day.
    pub fn current_visit(&self) -> Option<&Visit> {
        self.current_plan().ok().and_then(DayPlan::in_progress)
    }

    pub fn next_pending(&self) -> Option<&Visit> {
        self.current_plan().ok().and_then(DayPlan::next_pending)
    }

    pub fn day_progress(&self) -> DayProgress {
        self.current_plan()
            .map(DayPlan::progress)
            .unwrap_or(DayProgress { completed: 0, total: 0 })
    }

    pub fn schedule_status(&self) -> ScheduleStatus {
        let tolerance = self.config.schedule_tolerance_minutes;
        match self.time_variance_min {
            v if v > tolerance => ScheduleStatus::Behind(v),
            v if v < -tolerance => ScheduleStatus::Ahead(-v),
            _ => ScheduleStatus::OnTime,
        }
    }

    /// True once no visit anywhere is in progress after the trip started.
    pub fn is_finished(&self) -> bool {
        let started = self.days.values().any(|plan| plan.status != DayStatus::Pending);
        started
            && self
                .days
                .values()
                .flat_map(|plan| plan.visits.iter())
                .all(|v| v.status != VisitStatus::InProgress)
    }

    pub fn total_visits(&self) -> usize {
        self.days.values().map(|plan| plan.visits.len()).sum()
    }
}

/// Index of the first visit at or after `from` that can still be started.
fn first_open(plan: &DayPlan, from: usize) -> Option<usize> {
    plan.visits
        .iter()
        .enumerate()
        .skip(from)
        .find(|(_, v)| v.status.can_transition_to(VisitStatus::InProgress))
        .map(|(i, _)| i)
}
