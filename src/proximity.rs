//! Proximity checks and auto-check-in.

use chrono::NaiveTime;
use tracing::{debug, info};

use crate::haversine::{Coordinate, distance};
use crate::model::{CheckIn, DayPlan, Visit, VisitStatus};

/// Refreshes every visit's distance from `position` and applies check-in and
/// approaching transitions.
///
/// All visits within `radius_m` that can still check in are checked in; the
/// first of them in visit order is returned for notification.
pub fn evaluate(
    position: Coordinate,
    day: &mut DayPlan,
    radius_m: f64,
    now: NaiveTime,
) -> Option<CheckIn> {
    let mut surfaced = None;

    for visit in day.visits.iter_mut() {
        let d = distance(position, visit.coordinate);
        visit.distance_from_user = Some(d);

        if let Some(check_in) = observe(visit, d, radius_m, now) {
            surfaced.get_or_insert(check_in);
        }
    }

    surfaced
}

fn observe(visit: &mut Visit, d: f64, radius_m: f64, now: NaiveTime) -> Option<CheckIn> {
    let can_check_in = !visit.checked_in && visit.status.can_transition_to(VisitStatus::CheckedIn);
    if d <= radius_m && can_check_in {
        visit.status = VisitStatus::CheckedIn;
        visit.checked_in = true;
        visit.check_in_time = Some(now);
        info!(visit = %visit.id, name = %visit.name, distance_m = d, "auto check-in");
        return Some(CheckIn {
            visit: visit.id,
            location: visit.name.clone(),
            time: now,
            distance_m: d,
        });
    }

    // An approaching visit stays approaching when the user walks away again.
    if d <= radius_m * 2.0 && visit.status == VisitStatus::Pending {
        visit.status = VisitStatus::Approaching;
        debug!(visit = %visit.id, distance_m = d, "approaching");
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::VisitId;

    const ORIGIN: Coordinate = Coordinate::new(38.8893, -77.0502);

    fn noon() -> NaiveTime {
        NaiveTime::from_hms_opt(12, 0, 0).unwrap()
    }

    /// Roughly `meters` north of `ORIGIN`.
    fn north_of_origin(meters: f64) -> Coordinate {
        ORIGIN.offset(meters / 111_195.0, 0.0)
    }

    fn day_with(coords: &[Coordinate]) -> DayPlan {
        let visits = coords
            .iter()
            .enumerate()
            .map(|(i, c)| {
                Visit::planned(
                    i as u32 + 1,
                    &format!("Stop {}", i + 1),
                    *c,
                    "Monument",
                    30,
                    noon(),
                    noon(),
                    3,
                    "",
                    4.0,
                    1,
                    i as u32 + 1,
                )
            })
            .collect();
        DayPlan::new(1, visits)
    }

    #[test]
    fn test_checks_in_at_zero_distance() {
        let mut day = day_with(&[ORIGIN]);
        let check_in = evaluate(ORIGIN, &mut day, 100.0, noon()).expect("should check in");

        let visit = &day.visits[0];
        assert_eq!(check_in.visit, VisitId(1));
        assert_eq!(visit.status, VisitStatus::CheckedIn);
        assert!(visit.checked_in);
        assert_eq!(visit.check_in_time, Some(noon()));
        assert_eq!(visit.distance_from_user, Some(0.0));
    }

    #[test]
    fn test_second_evaluate_does_not_renotify() {
        let mut day = day_with(&[ORIGIN]);
        assert!(evaluate(ORIGIN, &mut day, 100.0, noon()).is_some());
        assert!(evaluate(ORIGIN, &mut day, 100.0, noon()).is_none());
        assert_eq!(day.visits[0].status, VisitStatus::CheckedIn);
    }

    #[test]
    fn test_between_radius_and_double_is_approaching() {
        let mut day = day_with(&[north_of_origin(150.0)]);
        assert!(evaluate(ORIGIN, &mut day, 100.0, noon()).is_none());
        assert_eq!(day.visits[0].status, VisitStatus::Approaching);
        assert!(!day.visits[0].checked_in);
    }

    #[test]
    fn test_far_visit_stays_pending() {
        let mut day = day_with(&[north_of_origin(250.0)]);
        evaluate(ORIGIN, &mut day, 100.0, noon());
        assert_eq!(day.visits[0].status, VisitStatus::Pending);
        assert!(day.visits[0].distance_from_user.unwrap() > 200.0);
    }

    #[test]
    fn test_approaching_does_not_revert() {
        let mut day = day_with(&[north_of_origin(150.0)]);
        evaluate(ORIGIN, &mut day, 100.0, noon());
        evaluate(north_of_origin(-5_000.0), &mut day, 100.0, noon());
        assert_eq!(day.visits[0].status, VisitStatus::Approaching);
    }

    #[test]
    fn test_approaching_checks_in_when_close() {
        let mut day = day_with(&[north_of_origin(150.0)]);
        evaluate(ORIGIN, &mut day, 100.0, noon());
        let check_in = evaluate(north_of_origin(140.0), &mut day, 100.0, noon());
        assert!(check_in.is_some());
        assert_eq!(day.visits[0].status, VisitStatus::CheckedIn);
    }

    #[test]
    fn test_distance_updated_on_finished_visits() {
        let mut day = day_with(&[ORIGIN, north_of_origin(500.0)]);
        day.visits[0].status = VisitStatus::Completed;
        day.visits[1].status = VisitStatus::Skipped;
        assert!(evaluate(ORIGIN, &mut day, 100.0, noon()).is_none());
        assert_eq!(day.visits[0].distance_from_user, Some(0.0));
        assert!(day.visits[1].distance_from_user.is_some());
        assert_eq!(day.visits[0].status, VisitStatus::Completed);
    }

    #[test]
    fn test_in_progress_visit_is_not_checked_in() {
        let mut day = day_with(&[ORIGIN]);
        day.visits[0].status = VisitStatus::InProgress;
        assert!(evaluate(ORIGIN, &mut day, 100.0, noon()).is_none());
        assert_eq!(day.visits[0].status, VisitStatus::InProgress);
        assert!(!day.visits[0].checked_in);
    }

    #[test]
    fn test_first_in_order_is_surfaced() {
        let mut day = day_with(&[ORIGIN, ORIGIN]);
        let check_in = evaluate(ORIGIN, &mut day, 100.0, noon()).unwrap();
        assert_eq!(check_in.visit, VisitId(1));
        assert!(day.visits.iter().all(|v| v.status == VisitStatus::CheckedIn));
    }
}
