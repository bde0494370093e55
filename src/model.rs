//! Itinerary data model: visits, day plans and their statuses.

use std::fmt;

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

use crate::error::TripError;
use crate::haversine::Coordinate;

/// Unique identifier of a visit across the whole trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VisitId(pub u32);

impl fmt::Display for VisitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum VisitStatus {
    Pending,
    Approaching,
    CheckedIn,
    InProgress,
    Completed,
    Skipped,
}

impl VisitStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            VisitStatus::Pending => "pending",
            VisitStatus::Approaching => "approaching",
            VisitStatus::CheckedIn => "checked-in",
            VisitStatus::InProgress => "in-progress",
            VisitStatus::Completed => "completed",
            VisitStatus::Skipped => "skipped",
        }
    }

    /// The single table of allowed status changes. Nothing moves backward.
    pub fn can_transition_to(self, next: VisitStatus) -> bool {
        use VisitStatus::*;

        matches!(
            (self, next),
            (Pending, Approaching | CheckedIn | InProgress | Skipped)
                | (Approaching, CheckedIn | InProgress)
                | (CheckedIn, InProgress)
                | (InProgress, Completed)
        )
    }

    /// Completed and skipped visits never change again.
    pub fn is_terminal(self) -> bool {
        matches!(self, VisitStatus::Completed | VisitStatus::Skipped)
    }
}

impl fmt::Display for VisitStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DayStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
}

/// A single point of interest on one day of the trip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Visit {
    pub id: VisitId,
    pub name: String,
    pub coordinate: Coordinate,
    pub category: String,
    pub planned_duration_min: u32,
    pub planned_start: NaiveTime,
    pub planned_end: NaiveTime,
    /// 1 (optional) to 5 (must see).
    pub priority: u8,
    pub description: String,
    pub rating: f32,
    pub day: u32,
    /// 1-based position within the day.
    pub visit_order: u32,

    pub status: VisitStatus,
    pub actual_start: Option<NaiveTime>,
    pub actual_end: Option<NaiveTime>,
    pub checked_in: bool,
    pub check_in_time: Option<NaiveTime>,
    /// Meters from the user at the last proximity check.
    pub distance_from_user: Option<f64>,
}

impl Visit {
    /// A fresh, pending visit with no runtime state.
    #[allow(clippy::too_many_arguments)]
    pub fn planned(
        id: u32,
        name: &str,
        coordinate: Coordinate,
        category: &str,
        planned_duration_min: u32,
        planned_start: NaiveTime,
        planned_end: NaiveTime,
        priority: u8,
        description: &str,
        rating: f32,
        day: u32,
        visit_order: u32,
    ) -> Self {
        Self {
            id: VisitId(id),
            name: name.to_string(),
            coordinate,
            category: category.to_string(),
            planned_duration_min,
            planned_start,
            planned_end,
            priority,
            description: description.to_string(),
            rating,
            day,
            visit_order,
            status: VisitStatus::Pending,
            actual_start: None,
            actual_end: None,
            checked_in: false,
            check_in_time: None,
            distance_from_user: None,
        }
    }

    /// Moves to `next` if the transition table allows it.
    pub fn transition(&mut self, next: VisitStatus) -> Result<(), TripError> {
        if !self.status.can_transition_to(next) {
            return Err(TripError::InvalidTransition {
                visit: self.id,
                from: self.status,
                to: next,
            });
        }
        self.status = next;
        Ok(())
    }

    /// Minutes between actual start and end, or 0 if either is missing.
    pub fn actual_duration_min(&self) -> i64 {
        match (self.actual_start, self.actual_end) {
            (Some(start), Some(end)) => (end - start).num_minutes(),
            _ => 0,
        }
    }
}

/// Ordered visits for one trip day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayPlan {
    pub day_number: u32,
    pub visits: Vec<Visit>,
    pub status: DayStatus,
    pub total_planned_min: u32,
}

impl DayPlan {
    /// Builds a pending day, ordering visits by their visit-order.
    pub fn new(day_number: u32, mut visits: Vec<Visit>) -> Self {
        visits.sort_by_key(|visit| visit.visit_order);
        let mut plan = Self {
            day_number,
            visits,
            status: DayStatus::Pending,
            total_planned_min: 0,
        };
        plan.recompute_total();
        plan
    }

    pub fn recompute_total(&mut self) {
        self.total_planned_min = self.visits.iter().map(|v| v.planned_duration_min).sum();
    }

    pub fn index_of(&self, id: VisitId) -> Option<usize> {
        self.visits.iter().position(|v| v.id == id)
    }

    pub fn visit(&self, id: VisitId) -> Option<&Visit> {
        self.visits.iter().find(|v| v.id == id)
    }

    pub fn visit_mut(&mut self, id: VisitId) -> Option<&mut Visit> {
        self.visits.iter_mut().find(|v| v.id == id)
    }

    /// The visit currently being done, if any.
    pub fn in_progress(&self) -> Option<&Visit> {
        self.visits.iter().find(|v| v.status == VisitStatus::InProgress)
    }

    /// First visit the user has yet to reach.
    pub fn next_pending(&self) -> Option<&Visit> {
        self.visits
            .iter()
            .find(|v| matches!(v.status, VisitStatus::Pending | VisitStatus::Approaching))
    }

    pub fn progress(&self) -> DayProgress {
        let completed = self
            .visits
            .iter()
            .filter(|v| v.status == VisitStatus::Completed)
            .count();
        DayProgress {
            completed,
            total: self.visits.len(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayProgress {
    pub completed: usize,
    pub total: usize,
}

impl DayProgress {
    pub fn percent(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.completed as f64 / self.total as f64 * 100.0
        }
    }
}

/// A surfaced auto-check-in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckIn {
    pub visit: VisitId,
    pub location: String,
    pub time: NaiveTime,
    pub distance_m: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hm(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn visit(id: u32, order: u32, duration: u32) -> Visit {
        Visit::planned(
            id,
            "Somewhere",
            Coordinate::new(38.0, -77.0),
            "Monument",
            duration,
            hm(9, 0),
            hm(10, 0),
            3,
            "",
            4.5,
            1,
            order,
        )
    }

    #[test]
    fn test_forward_chain_allowed() {
        use VisitStatus::*;
        assert!(Pending.can_transition_to(Approaching));
        assert!(Approaching.can_transition_to(CheckedIn));
        assert!(CheckedIn.can_transition_to(InProgress));
        assert!(InProgress.can_transition_to(Completed));
        assert!(Pending.can_transition_to(Skipped));
    }

    #[test]
    fn test_backward_and_terminal_rejected() {
        use VisitStatus::*;
        assert!(!Approaching.can_transition_to(Pending));
        assert!(!Completed.can_transition_to(InProgress));
        assert!(!Skipped.can_transition_to(Pending));
        assert!(!CheckedIn.can_transition_to(Skipped));
        assert!(!InProgress.can_transition_to(CheckedIn));
        assert!(Completed.is_terminal() && Skipped.is_terminal());
    }

    #[test]
    fn test_transition_reports_invalid() {
        let mut v = visit(1, 1, 30);
        let err = v.transition(VisitStatus::Completed).unwrap_err();
        assert_eq!(
            err,
            TripError::InvalidTransition {
                visit: VisitId(1),
                from: VisitStatus::Pending,
                to: VisitStatus::Completed,
            }
        );
        assert_eq!(v.status, VisitStatus::Pending);
    }

    #[test]
    fn test_actual_duration() {
        let mut v = visit(1, 1, 30);
        assert_eq!(v.actual_duration_min(), 0);
        v.actual_start = Some(hm(9, 0));
        v.actual_end = Some(hm(9, 45));
        assert_eq!(v.actual_duration_min(), 45);
    }

    #[test]
    fn test_day_plan_sorts_and_totals() {
        let plan = DayPlan::new(1, vec![visit(2, 2, 45), visit(1, 1, 30)]);
        assert_eq!(plan.visits[0].id, VisitId(1));
        assert_eq!(plan.total_planned_min, 75);
        assert_eq!(plan.status, DayStatus::Pending);
    }

    #[test]
    fn test_status_serializes_kebab_case() {
        let json = serde_json::to_string(&VisitStatus::CheckedIn).unwrap();
        assert_eq!(json, "\"checked-in\"");
    }

    #[test]
    fn test_progress_percent() {
        let mut plan = DayPlan::new(1, vec![visit(1, 1, 30), visit(2, 2, 30)]);
        assert_eq!(plan.progress().percent(), 0.0);
        plan.visits[0].status = VisitStatus::Completed;
        assert_eq!(plan.progress().percent(), 50.0);
    }
}
