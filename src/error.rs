use thiserror::Error;

use crate::model::{VisitId, VisitStatus};
use crate::workflow::Stage;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum TripError {
    #[error("no visit with id {0}")]
    UnknownVisit(VisitId),
    #[error("no day {0} in the itinerary")]
    UnknownDay(u32),
    #[error("visit {visit} cannot go from {from} to {to}")]
    InvalidTransition {
        visit: VisitId,
        from: VisitStatus,
        to: VisitStatus,
    },
    #[error("visit {visit} belongs to day {visit_day}, current day is {current_day}")]
    VisitNotInCurrentDay {
        visit: VisitId,
        visit_day: u32,
        current_day: u32,
    },
    #[error("day {0} has no visit left to start")]
    NoOpenVisit(u32),
    #[error("visit {visit} cannot start before visit {earlier} is completed or skipped")]
    EarlierVisitOpen { visit: VisitId, earlier: VisitId },
    #[error("visit {0} is already in progress")]
    VisitAlreadyInProgress(VisitId),
    #[error("schedule is not behind (time variance {0} min)")]
    NotBehindSchedule(i32),
    #[error("check-in radius must be a positive number of meters, got {0}")]
    InvalidRadius(f64),
    #[error("invalid trip request: {0}")]
    InvalidRequest(String),
    #[error("expected stage {expected}, session is in {actual}")]
    WrongStage { expected: Stage, actual: Stage },
}
