pub mod engine;
pub mod geometry;

pub use engine::{PositionSample, PositionSmoother, RenderedVehicle, SmoothingState};
pub use geometry::{equirectangular_distance, smoothstep, LatLon};
