//! Reconciliation core for a live shuttle map.
//!
//! The backend is polled every few seconds. [`smoothing`] turns the vehicle
//! samples into continuously eased positions, and [`arrivals`] turns stop
//! snapshots into a board that rides out short gaps in the feed and keeps a
//! bus at "Arrived" for a while after it drops off. Everything else here
//! feeds those two engines or serves what they produce.

pub mod api;
pub mod arrivals;
pub mod config;
pub mod error;
pub mod realtime;
pub mod smoothing;
pub mod state;
pub mod visibility;

pub use arrivals::{merge, ArrivalBoard, ArrivalRecord, ReconciledArrival, RetentionPolicy};
pub use config::{Config, PollIntervals, SmoothingConfig};
pub use error::{Error, Result};
pub use smoothing::{LatLon, PositionSample, PositionSmoother};
pub use visibility::VisibilityFilter;
