use std::sync::Arc;

use tracing::info;

use super::client::BackendClient;
use super::poller::{spawn_active_routes_poller, spawn_arrival_poller, spawn_vehicle_poller, PollTask};
use crate::config::PollIntervals;
use crate::state::SharedState;

/// Owns the three poll tasks and restarts or tears them down as the
/// selection and the active-only mode change.
#[derive(Debug)]
pub struct PollSupervisor {
    client: Arc<BackendClient>,
    state: SharedState,
    intervals: PollIntervals,
    vehicles: Option<PollTask>,
    arrivals: Option<PollTask>,
    active_routes: Option<PollTask>,
}

impl PollSupervisor {
    pub fn new(client: Arc<BackendClient>, state: SharedState, intervals: PollIntervals) -> Self {
        Self {
            client,
            state,
            intervals,
            vehicles: None,
            arrivals: None,
            active_routes: None,
        }
    }

    pub fn start_vehicles(&mut self) {
        // Replacing the slot drops, and so cancels, any previous task.
        self.vehicles = Some(spawn_vehicle_poller(
            self.client.clone(),
            self.state.clone(),
            self.intervals.vehicles,
        ));
        info!(every_secs = self.intervals.vehicles.as_secs(), "vehicle polling started");
    }

    pub async fn select_stop(&mut self, stop_id: &str) {
        self.arrivals.take();
        self.state.write().await.select_stop(stop_id);
        self.arrivals = Some(spawn_arrival_poller(
            self.client.clone(),
            self.state.clone(),
            stop_id.to_string(),
            self.intervals.arrivals,
        ));
        info!(stop_id, "stop selected");
    }

    pub async fn deselect_stop(&mut self) {
        self.arrivals.take();
        if let Some(board) = self.state.write().await.deselect_stop() {
            info!(stop_id = board.stop_id(), "stop deselected");
        }
    }

    pub async fn set_active_only(&mut self, enabled: bool) {
        self.active_routes.take();
        self.state.write().await.visibility.set_active_only(enabled);
        if enabled {
            self.active_routes = Some(spawn_active_routes_poller(
                self.client.clone(),
                self.state.clone(),
                self.intervals.active_routes,
            ));
        }
        info!(enabled, "active-only mode changed");
    }

    pub fn is_polling_arrivals(&self) -> bool {
        self.arrivals.is_some()
    }

    pub fn is_polling_active_routes(&self) -> bool {
        self.active_routes.is_some()
    }

    pub fn shutdown(&mut self) {
        self.vehicles.take();
        self.arrivals.take();
        self.active_routes.take();
    }
}
