use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::debug;

use crate::arrivals::{ArrivalBoard, ArrivalRecord, RetentionPolicy};
use crate::config::Config;
use crate::realtime::types::VehicleSampleWire;
use crate::smoothing::{PositionSmoother, RenderedVehicle};
use crate::visibility::VisibilityFilter;

pub type SharedState = Arc<RwLock<LiveState>>;

/// Wall clock in epoch milliseconds.
pub fn now_ms() -> u64 {
    chrono::Utc::now().timestamp_millis().max(0) as u64
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FeedSummary {
    pub accepted: usize,
    pub rejected: usize,
    pub dropped: usize,
}

/// Everything carried between polls: the smoother, the selected stop's
/// board, and route visibility.
#[derive(Debug)]
pub struct LiveState {
    pub smoother: PositionSmoother,
    pub visibility: VisibilityFilter,
    board: Option<ArrivalBoard>,
    known_routes: BTreeSet<String>,
    retention: RetentionPolicy,
}

impl LiveState {
    pub fn new(config: &Config) -> Self {
        Self {
            smoother: PositionSmoother::new(config.smoothing),
            visibility: VisibilityFilter::new(),
            board: None,
            known_routes: BTreeSet::new(),
            retention: config.retention,
        }
    }

    pub fn shared(config: &Config) -> SharedState {
        Arc::new(RwLock::new(Self::new(config)))
    }

    /// Feeds one vehicle snapshot through the smoother and tears down
    /// vehicles the snapshot no longer mentions. A vehicle whose sample is
    /// rejected keeps its last position.
    pub fn apply_vehicle_feed(&mut self, vehicles: Vec<VehicleSampleWire>, now_ms: u64) -> FeedSummary {
        let mut summary = FeedSummary::default();
        let mut observed = HashSet::with_capacity(vehicles.len());

        for wire in vehicles {
            if let Some(id) = wire.entity_id() {
                observed.insert(id.to_string());
            }

            match wire.into_sample() {
                Ok((entity_id, sample)) => {
                    if let Some(route) = sample.route_name.as_deref().filter(|r| !r.is_empty()) {
                        self.known_routes.insert(route.to_string());
                    }
                    self.smoother.ingest(&entity_id, sample, now_ms);
                    summary.accepted += 1;
                }
                Err(e) => {
                    debug!(error = %e, "vehicle sample rejected");
                    summary.rejected += 1;
                }
            }
        }

        summary.dropped = self.smoother.retain_observed(&observed);
        summary
    }

    pub fn visible_vehicles(&self, now_ms: u64) -> Vec<RenderedVehicle> {
        self.visibility
            .filter(self.smoother.snapshot(now_ms), |v| v.route_name.as_deref())
    }

    /// Starts a fresh board; whatever the previous stop had is discarded.
    pub fn select_stop(&mut self, stop_id: &str) {
        self.board = Some(ArrivalBoard::new(stop_id, self.retention));
    }

    pub fn deselect_stop(&mut self) -> Option<ArrivalBoard> {
        self.board.take()
    }

    pub fn board(&self) -> Option<&ArrivalBoard> {
        self.board.as_ref()
    }

    pub fn selected_stop(&self) -> Option<&str> {
        self.board.as_ref().map(ArrivalBoard::stop_id)
    }

    /// Merges a stop snapshot into the board, if that stop is still the
    /// selected one. Returns the board length after the merge.
    pub fn apply_arrivals(&mut self, stop_id: &str, incoming: &[ArrivalRecord], now_ms: u64) -> Option<usize> {
        let board = self.board.as_mut().filter(|b| b.stop_id() == stop_id)?;

        for route in incoming.iter().filter_map(|r| r.route_name.as_deref()) {
            if !route.is_empty() {
                self.known_routes.insert(route.to_string());
            }
        }

        Some(board.apply(incoming, now_ms).len())
    }

    pub fn known_routes(&self) -> &BTreeSet<String> {
        &self.known_routes
    }
}
