//! The canned two-day Washington DC itinerary every session starts from.

use std::collections::BTreeMap;

use chrono::NaiveTime;

use crate::haversine::Coordinate;
use crate::model::{DayPlan, Visit};

/// Where the simulated user stands before tracking starts.
pub const START_POSITION: Coordinate = Coordinate::new(38.8893, -77.0502);

fn hm(hour: u32, min: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, min, 0).unwrap_or_default()
}

#[allow(clippy::too_many_arguments)]
fn stop(
    id: u32,
    name: &str,
    lat: f64,
    lon: f64,
    category: &str,
    minutes: u32,
    start: (u32, u32),
    end: (u32, u32),
    priority: u8,
    description: &str,
    rating: f32,
    day: u32,
    order: u32,
) -> Visit {
    Visit::planned(
        id,
        name,
        Coordinate::new(lat, lon),
        category,
        minutes,
        hm(start.0, start.1),
        hm(end.0, end.1),
        priority,
        description,
        rating,
        day,
        order,
    )
}

/// Day number to plan, all visits pending.
#[rustfmt::skip]
pub fn washington_dc() -> BTreeMap<u32, DayPlan> {
    let day_one = vec![
        stop(1, "National Mall", 38.8893, -77.0502, "Monument", 60, (9, 0), (10, 0), 5,
             "Start at the iconic National Mall", 4.8, 1, 1),
        stop(2, "Lincoln Memorial", 38.8893, -77.0502, "Monument", 45, (10, 15), (11, 0), 5,
             "Visit the majestic Lincoln Memorial", 4.9, 1, 2),
        stop(3, "World War II Memorial", 38.8894, -77.0405, "Monument", 30, (11, 15), (11, 45), 4,
             "Pay respects at WWII Memorial", 4.7, 1, 3),
        stop(4, "Washington Monument", 38.8895, -77.0353, "Monument", 45, (12, 0), (12, 45), 5,
             "Iconic obelisk on the National Mall", 4.8, 1, 4),
        stop(5, "White House (Outside)", 38.8977, -77.0365, "Landmark", 30, (13, 30), (14, 0), 4,
             "Midday walk toward the White House (outside views)", 4.6, 1, 5),
        stop(6, "Penn Quarter", 38.8991, -77.0229, "District", 60, (14, 30), (15, 30), 3,
             "Lunch near Penn Quarter or Capitol Hill", 4.5, 1, 6),
        stop(7, "U.S. Capitol", 38.8899, -77.0091, "Government", 90, (16, 0), (17, 30), 5,
             "Afternoon at the U.S. Capitol (guided tour if booked)", 4.9, 1, 7),
        stop(8, "Library of Congress", 38.8886, -77.0047, "Library", 60, (17, 45), (18, 45), 4,
             "Library of Congress", 4.8, 1, 8),
        stop(9, "Tidal Basin", 38.8814, -77.0365, "Nature", 45, (19, 0), (19, 45), 4,
             "Evening around the Tidal Basin, best at sunset", 4.7, 1, 9),
        stop(10, "The Wharf", 38.8804, -77.0177, "Waterfront", 90, (20, 0), (21, 30), 3,
             "Dinner at The Wharf or Georgetown", 4.6, 1, 10),
    ];

    let day_two = vec![
        stop(11, "National Air and Space Museum", 38.8882, -77.0199, "Museum", 120, (9, 0), (11, 0), 5,
             "Morning at the National Air and Space Museum", 4.9, 2, 1),
        stop(12, "National Museum of American History", 38.8913, -77.0300, "Museum", 120, (11, 30), (13, 30), 5,
             "National Museum of American History", 4.8, 2, 2),
        stop(13, "Lunch Break", 38.8913, -77.0300, "Food & Drink", 60, (13, 30), (14, 30), 3,
             "Lunch near the museums", 4.5, 2, 3),
        stop(14, "Afternoon Activities", 38.8913, -77.0300, "Activity", 120, (14, 30), (16, 30), 3,
             "Free afternoon around the Mall", 4.6, 2, 4),
        stop(15, "Evening Dining", 38.8913, -77.0300, "Food & Drink", 90, (18, 0), (19, 30), 3,
             "Evening dinner downtown", 4.5, 2, 5),
    ];

    BTreeMap::from([
        (1, DayPlan::new(1, day_one)),
        (2, DayPlan::new(2, day_two)),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{DayStatus, VisitStatus};

    #[test]
    fn test_two_days_of_ten_and_five() {
        let days = washington_dc();
        assert_eq!(days.len(), 2);
        assert_eq!(days[&1].visits.len(), 10);
        assert_eq!(days[&2].visits.len(), 5);
    }

    #[test]
    fn test_everything_starts_pending() {
        for plan in washington_dc().values() {
            assert_eq!(plan.status, DayStatus::Pending);
            for visit in &plan.visits {
                assert_eq!(visit.status, VisitStatus::Pending);
                assert!(!visit.checked_in);
                assert!(visit.distance_from_user.is_none());
                assert_eq!(visit.day, plan.day_number);
            }
        }
    }

    #[test]
    fn test_visit_orders_are_one_based_and_unique() {
        for plan in washington_dc().values() {
            let orders: Vec<u32> = plan.visits.iter().map(|v| v.visit_order).collect();
            let expected: Vec<u32> = (1..=plan.visits.len() as u32).collect();
            assert_eq!(orders, expected);
        }
    }

    #[test]
    fn test_planned_totals() {
        let days = washington_dc();
        assert_eq!(days[&1].total_planned_min, 555);
        assert_eq!(days[&2].total_planned_min, 510);
    }
}
