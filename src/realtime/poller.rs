use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use super::client::BackendClient;
use crate::state::{now_ms, SharedState};

/// Cancellation flag shared between a poll task and its owner. Checked under
/// the state write lock, so a response that lands after cancellation never
/// touches shared state.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }
}

/// A periodic background task. Owns its handle; cancelling or dropping it
/// stops the loop.
#[derive(Debug)]
pub struct PollTask {
    name: &'static str,
    flag: CancelFlag,
    handle: JoinHandle<()>,
}

impl PollTask {
    /// Runs `tick` immediately and then every `every`, until cancelled.
    pub fn spawn<F, Fut>(name: &'static str, every: Duration, mut tick: F) -> Self
    where
        F: FnMut(CancelFlag) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let flag = CancelFlag::default();
        let task_flag = flag.clone();

        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(every);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                interval.tick().await;
                if task_flag.is_cancelled() {
                    break;
                }
                tick(task_flag.clone()).await;
            }
        });

        debug!(task = name, every_ms = every.as_millis() as u64, "poll task started");
        Self { name, flag, handle }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.is_cancelled()
    }

    pub fn cancel(&self) {
        if !self.flag.is_cancelled() {
            self.flag.cancel();
            self.handle.abort();
            debug!(task = self.name, "poll task cancelled");
        }
    }
}

impl Drop for PollTask {
    fn drop(&mut self) {
        self.cancel();
    }
}

pub fn spawn_vehicle_poller(client: Arc<BackendClient>, state: SharedState, every: Duration) -> PollTask {
    PollTask::spawn("vehicles", every, move |flag| {
        let client = client.clone();
        let state = state.clone();
        async move { poll_vehicles(&client, &state, &flag).await }
    })
}

pub fn spawn_arrival_poller(
    client: Arc<BackendClient>,
    state: SharedState,
    stop_id: String,
    every: Duration,
) -> PollTask {
    PollTask::spawn("arrivals", every, move |flag| {
        let client = client.clone();
        let state = state.clone();
        let stop_id = stop_id.clone();
        async move { poll_arrivals(&client, &state, &stop_id, &flag).await }
    })
}

pub fn spawn_active_routes_poller(client: Arc<BackendClient>, state: SharedState, every: Duration) -> PollTask {
    PollTask::spawn("active_routes", every, move |flag| {
        let client = client.clone();
        let state = state.clone();
        async move { poll_active_routes(&client, &state, &flag).await }
    })
}

async fn poll_vehicles(client: &BackendClient, state: &SharedState, flag: &CancelFlag) {
    match client.fetch_vehicles().await {
        Ok(vehicles) => {
            let mut live = state.write().await;
            if flag.is_cancelled() {
                debug!("discarding vehicle response from cancelled poller");
                return;
            }
            let summary = live.apply_vehicle_feed(vehicles, now_ms());
            info!(
                accepted = summary.accepted,
                rejected = summary.rejected,
                dropped = summary.dropped,
                "applied vehicle snapshot"
            );
        }
        Err(e) => warn!(error = %e, "vehicle poll failed, keeping last positions"),
    }
}

async fn poll_arrivals(client: &BackendClient, state: &SharedState, stop_id: &str, flag: &CancelFlag) {
    match client.fetch_stop_arrivals(stop_id).await {
        Ok(records) => {
            let mut live = state.write().await;
            if flag.is_cancelled() {
                debug!(stop_id, "discarding arrival response from cancelled poller");
                return;
            }
            match live.apply_arrivals(stop_id, &records, now_ms()) {
                Some(count) => info!(stop_id, incoming = records.len(), board = count, "merged arrivals"),
                None => debug!(stop_id, "stop no longer selected, arrivals ignored"),
            }
        }
        Err(e) => warn!(stop_id, error = %e, "arrival poll failed, keeping last board"),
    }
}

async fn poll_active_routes(client: &BackendClient, state: &SharedState, flag: &CancelFlag) {
    match client.fetch_active_routes().await {
        Ok(routes) => {
            let mut live = state.write().await;
            if flag.is_cancelled() || !live.visibility.active_only() {
                debug!("discarding active route response");
                return;
            }
            info!(count = routes.len(), "updated active routes");
            live.visibility.set_active_routes(routes);
        }
        Err(e) => warn!(error = %e, "active route poll failed, keeping last set"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    use axum::{http::StatusCode, routing::get, Json, Router};
    use serde_json::json;

    use crate::arrivals::ArrivalRecord;
    use crate::config::Config;
    use crate::realtime::VehicleSampleWire;
    use crate::state::LiveState;

    async fn backend(app: Router) -> BackendClient {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        BackendClient::new(format!("http://{addr}"))
    }

    fn healthy_backend() -> Router {
        Router::new()
            .route(
                "/api/vehicles",
                get(|| async { Json(json!({"vehicles": [{"vehicle_id": "b", "lat": 42.38, "lon": -71.12}]})) }),
            )
            .route(
                "/api/stop/{stop_id}",
                get(|| async { Json(json!({"buses": [{"route_id": "R2", "eta_min": 4}]})) }),
            )
            .route(
                "/api/active_routes",
                get(|| async { Json(json!({"routes": ["Crimson Cruiser"]})) }),
            )
    }

    fn failing_backend() -> Router {
        Router::new().fallback(|| async { StatusCode::INTERNAL_SERVER_ERROR })
    }

    /// Vehicle "a", a board for stop 2101 holding route R1, and active-only
    /// mode showing "Allston Loop".
    async fn seeded_state() -> SharedState {
        let state = LiveState::shared(&Config::new("http://127.0.0.1:9"));
        {
            let mut live = state.write().await;
            live.apply_vehicle_feed(
                vec![VehicleSampleWire {
                    vehicle_id: Some("a".to_string()),
                    lat: Some(42.37),
                    lon: Some(-71.11),
                    ..Default::default()
                }],
                0,
            );

            let mut record = ArrivalRecord::new("12");
            record.route_id = Some("R1".to_string());
            record.eta_min = Some(3);
            live.select_stop("2101");
            live.apply_arrivals("2101", &[record], 0);

            live.visibility.set_active_only(true);
            live.visibility.set_active_routes(["Allston Loop"]);
        }
        state
    }

    async fn vehicle_ids(state: &SharedState) -> Vec<String> {
        let live = state.read().await;
        live.smoother.snapshot(now_ms()).into_iter().map(|v| v.entity_id).collect()
    }

    async fn board_keys(state: &SharedState) -> Vec<String> {
        let live = state.read().await;
        live.board()
            .map(|b| b.records().iter().map(|r| r.route_key.clone()).collect())
            .unwrap_or_default()
    }

    async fn active_routes(state: &SharedState) -> Vec<String> {
        let live = state.read().await;
        live.visibility.active_routes().iter().cloned().collect()
    }

    #[tokio::test]
    async fn live_poll_replaces_state() {
        let client = backend(healthy_backend()).await;
        let state = seeded_state().await;
        let flag = CancelFlag::default();

        poll_vehicles(&client, &state, &flag).await;
        poll_arrivals(&client, &state, "2101", &flag).await;
        poll_active_routes(&client, &state, &flag).await;

        assert_eq!(vehicle_ids(&state).await, vec!["b"]);
        // R1 was only 3 minutes out, so it is not retained.
        assert_eq!(board_keys(&state).await, vec!["R2"]);
        assert_eq!(active_routes(&state).await, vec!["Crimson Cruiser"]);
    }

    #[tokio::test]
    async fn response_after_cancellation_is_discarded() {
        let client = backend(healthy_backend()).await;
        let state = seeded_state().await;
        let flag = CancelFlag::default();
        flag.cancel();

        poll_vehicles(&client, &state, &flag).await;
        poll_arrivals(&client, &state, "2101", &flag).await;
        poll_active_routes(&client, &state, &flag).await;

        assert_eq!(vehicle_ids(&state).await, vec!["a"]);
        assert_eq!(board_keys(&state).await, vec!["R1"]);
        assert_eq!(active_routes(&state).await, vec!["Allston Loop"]);
    }

    #[tokio::test]
    async fn failed_poll_keeps_last_state() {
        let client = backend(failing_backend()).await;
        let state = seeded_state().await;
        let flag = CancelFlag::default();

        poll_vehicles(&client, &state, &flag).await;
        poll_arrivals(&client, &state, "2101", &flag).await;
        poll_active_routes(&client, &state, &flag).await;

        assert_eq!(vehicle_ids(&state).await, vec!["a"]);
        assert_eq!(board_keys(&state).await, vec!["R1"]);
        assert_eq!(active_routes(&state).await, vec!["Allston Loop"]);
    }

    #[tokio::test]
    async fn failing_backend_reports_its_status() {
        let client = backend(failing_backend()).await;
        let result = client.fetch_stop_arrivals("2101").await;

        assert!(matches!(result, Err(crate::error::Error::Status { status: 500, .. })));
    }

    #[tokio::test]
    async fn task_ticks_until_cancelled() {
        let ticks = Arc::new(AtomicUsize::new(0));
        let counter = ticks.clone();

        let task = PollTask::spawn("test", Duration::from_millis(5), move |_flag| {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
            }
        });

        tokio::time::sleep(Duration::from_millis(40)).await;
        task.cancel();
        assert!(task.is_cancelled());

        let seen = ticks.load(Ordering::SeqCst);
        assert!(seen >= 1);

        tokio::time::sleep(Duration::from_millis(30)).await;
        assert_eq!(ticks.load(Ordering::SeqCst), seen);
    }

    #[tokio::test]
    async fn dropping_the_task_raises_its_flag() {
        let observed = Arc::new(std::sync::Mutex::new(None::<CancelFlag>));
        let slot = observed.clone();

        let task = PollTask::spawn("test", Duration::from_secs(60), move |flag| {
            let slot = slot.clone();
            async move {
                if let Ok(mut guard) = slot.lock() {
                    *guard = Some(flag);
                }
            }
        });

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(task.name(), "test");
        drop(task);

        let flag = observed.lock().unwrap().clone().expect("tick ran once");
        assert!(flag.is_cancelled());
    }
}
