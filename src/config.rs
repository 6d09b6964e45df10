use std::time::Duration;

use crate::arrivals::RetentionPolicy;

pub const DEFAULT_JITTER_THRESHOLD_M: f64 = 8.0;
pub const DEFAULT_JITTER_DAMPING: f64 = 0.25;
pub const DEFAULT_ANIMATION_MS: u64 = 7_600;

pub const DEFAULT_VEHICLE_POLL_SECS: u64 = 6;
pub const DEFAULT_ARRIVAL_POLL_SECS: u64 = 10;
pub const DEFAULT_ACTIVE_ROUTES_POLL_SECS: u64 = 15;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SmoothingConfig {
    /// Displacements below this many metres are damped instead of followed.
    pub jitter_threshold_m: f64,
    /// Fraction of a damped displacement actually travelled.
    pub jitter_damping: f64,
    pub animation_duration: Duration,
}

impl Default for SmoothingConfig {
    fn default() -> Self {
        Self {
            jitter_threshold_m: DEFAULT_JITTER_THRESHOLD_M,
            jitter_damping: DEFAULT_JITTER_DAMPING,
            animation_duration: Duration::from_millis(DEFAULT_ANIMATION_MS),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollIntervals {
    pub vehicles: Duration,
    pub arrivals: Duration,
    pub active_routes: Duration,
}

impl Default for PollIntervals {
    fn default() -> Self {
        Self {
            vehicles: Duration::from_secs(DEFAULT_VEHICLE_POLL_SECS),
            arrivals: Duration::from_secs(DEFAULT_ARRIVAL_POLL_SECS),
            active_routes: Duration::from_secs(DEFAULT_ACTIVE_ROUTES_POLL_SECS),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub backend_url: String,
    pub smoothing: SmoothingConfig,
    pub retention: RetentionPolicy,
    pub poll: PollIntervals,
}

impl Config {
    pub fn new(backend_url: impl Into<String>) -> Self {
        Self {
            backend_url: backend_url.into(),
            smoothing: SmoothingConfig::default(),
            retention: RetentionPolicy::default(),
            poll: PollIntervals::default(),
        }
    }
}
