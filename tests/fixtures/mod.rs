//! Shared fixtures for trip-planner integration tests.
//!
//! Provides a builder for small custom itineraries plus a fixed clock.

pub mod itinerary;

pub use itinerary::*;
