//! trip-planner core
//!
//! Itinerary state, proximity-based auto check-in and the session workflow
//! behind the trip planning demo.

pub mod config;
pub mod error;
pub mod haversine;
pub mod model;
pub mod proximity;
pub mod sample;
pub mod traits;
pub mod trip;
pub mod workflow;

pub use error::TripError;
