use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::time::Duration;

use super::geometry::{equirectangular_distance, smoothstep, LatLon};
use crate::config::SmoothingConfig;

/// Latest known truth for one tracked vehicle. Coordinates are expected to be
/// finite; screening happens before ingest.
#[derive(Debug, Clone, PartialEq)]
pub struct PositionSample {
    pub position: LatLon,
    pub bearing: f64,
    pub route_color: Option<String>,
    pub route_id: Option<String>,
    pub route_badge: Option<String>,
    pub route_name: Option<String>,
    pub bus_number: Option<String>,
}

impl PositionSample {
    pub fn new(lat: f64, lon: f64, bearing: f64) -> Self {
        Self {
            position: LatLon::new(lat, lon),
            bearing,
            route_color: None,
            route_id: None,
            route_badge: None,
            route_name: None,
            bus_number: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SmoothingState {
    pub from: LatLon,
    pub to: LatLon,
    pub start_ms: u64,
    pub duration: Duration,
    pub bearing: f64,
    pub sample: PositionSample,
}

impl SmoothingState {
    /// Eased progress in `[0, 1]` at `now_ms`.
    fn progress(&self, now_ms: u64) -> f64 {
        let duration_ms = self.duration.as_millis() as f64;
        if duration_ms <= 0.0 {
            return 1.0;
        }
        let elapsed = now_ms.saturating_sub(self.start_ms) as f64;
        smoothstep(elapsed / duration_ms)
    }

    /// The rendered position at `now_ms`. A restart at the same instant uses
    /// it as the new `from`, so nothing is stored separately.
    pub fn position_at(&self, now_ms: u64) -> LatLon {
        let eased = self.progress(now_ms);
        if eased >= 1.0 {
            return self.to;
        }
        self.from.lerp(self.to, eased)
    }

    pub fn is_settled(&self, now_ms: u64) -> bool {
        now_ms.saturating_sub(self.start_ms) as u128 >= self.duration.as_millis()
    }
}

/// What the renderer draws for one vehicle on a given frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderedVehicle {
    pub entity_id: String,
    pub lat: f64,
    pub lon: f64,
    pub bearing: f64,
    pub route_color: Option<String>,
    pub route_id: Option<String>,
    pub route_badge: Option<String>,
    pub route_name: Option<String>,
    pub bus_number: Option<String>,
}

/// Per-vehicle interpolation table. Every ingest replaces the vehicle's
/// animation wholesale, starting from wherever the old one had got to.
#[derive(Debug, Default)]
pub struct PositionSmoother {
    config: SmoothingConfig,
    states: HashMap<String, SmoothingState>,
}

impl PositionSmoother {
    pub fn new(config: SmoothingConfig) -> Self {
        Self {
            config,
            states: HashMap::new(),
        }
    }

    pub fn config(&self) -> &SmoothingConfig {
        &self.config
    }

    pub fn ingest(&mut self, entity_id: &str, sample: PositionSample, now_ms: u64) {
        let raw = sample.position;
        let bearing = sample.bearing;

        match self.states.get_mut(entity_id) {
            Some(state) => {
                let from = state.position_at(now_ms);
                let to = if equirectangular_distance(from, raw) < self.config.jitter_threshold_m {
                    from.lerp(raw, self.config.jitter_damping)
                } else {
                    raw
                };

                *state = SmoothingState {
                    from,
                    to,
                    start_ms: now_ms,
                    duration: self.config.animation_duration,
                    bearing,
                    sample,
                };
            }
            None => {
                // First sighting: place it, don't animate.
                self.states.insert(
                    entity_id.to_string(),
                    SmoothingState {
                        from: raw,
                        to: raw,
                        start_ms: now_ms,
                        duration: self.config.animation_duration,
                        bearing,
                        sample,
                    },
                );
            }
        }
    }

    pub fn current_position(&self, entity_id: &str, now_ms: u64) -> Option<LatLon> {
        self.states.get(entity_id).map(|s| s.position_at(now_ms))
    }

    pub fn bearing(&self, entity_id: &str) -> Option<f64> {
        self.states.get(entity_id).map(|s| s.bearing)
    }

    pub fn state(&self, entity_id: &str) -> Option<&SmoothingState> {
        self.states.get(entity_id)
    }

    pub fn is_animating(&self, entity_id: &str, now_ms: u64) -> bool {
        self.states
            .get(entity_id)
            .map(|s| s.from != s.to && !s.is_settled(now_ms))
            .unwrap_or(false)
    }

    /// Drops every vehicle not in `observed`. Returns how many were dropped.
    pub fn retain_observed(&mut self, observed: &HashSet<String>) -> usize {
        let before = self.states.len();
        self.states.retain(|id, _| observed.contains(id));
        before - self.states.len()
    }

    pub fn remove(&mut self, entity_id: &str) -> Option<SmoothingState> {
        self.states.remove(entity_id)
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn snapshot(&self, now_ms: u64) -> Vec<RenderedVehicle> {
        let mut vehicles: Vec<RenderedVehicle> = self
            .states
            .iter()
            .map(|(id, state)| {
                let position = state.position_at(now_ms);
                RenderedVehicle {
                    entity_id: id.clone(),
                    lat: position.lat,
                    lon: position.lon,
                    bearing: state.bearing,
                    route_color: state.sample.route_color.clone(),
                    route_id: state.sample.route_id.clone(),
                    route_badge: state.sample.route_badge.clone(),
                    route_name: state.sample.route_name.clone(),
                    bus_number: state.sample.bus_number.clone(),
                }
            })
            .collect();

        vehicles.sort_by(|a, b| a.entity_id.cmp(&b.entity_id));
        vehicles
    }
}
