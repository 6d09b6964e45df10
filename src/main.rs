use clap::Parser;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use shuttle_reconciler::api::{self, AppState};
use shuttle_reconciler::arrivals::{RetentionPolicy, DEFAULT_RETENTION_WINDOW};
use shuttle_reconciler::config::{self, Config, PollIntervals, SmoothingConfig};
use shuttle_reconciler::realtime::{BackendClient, PollSupervisor};
use shuttle_reconciler::state::LiveState;

#[derive(Parser)]
#[command(name = "shuttle-reconciler")]
#[command(about = "Smoothed vehicle positions and sticky arrival boards for the shuttle map")]
struct Args {
    /// Port to run the HTTP server on
    #[arg(short, long, env = "SERVER_PORT", default_value = "8080")]
    port: u16,

    /// Base URL of the schedule backend
    #[arg(long, env = "BACKEND_URL", default_value = "http://localhost:8000")]
    backend_url: String,

    /// Stop selected at startup, if any
    #[arg(long, env = "INITIAL_STOP")]
    stop: Option<String>,

    #[arg(long, env = "JITTER_THRESHOLD_M", default_value_t = config::DEFAULT_JITTER_THRESHOLD_M)]
    jitter_threshold_m: f64,

    #[arg(long, env = "JITTER_DAMPING", default_value_t = config::DEFAULT_JITTER_DAMPING)]
    jitter_damping: f64,

    #[arg(long, env = "ANIMATION_MS", default_value_t = config::DEFAULT_ANIMATION_MS)]
    animation_ms: u64,

    #[arg(long, env = "VEHICLE_POLL_SECS", default_value_t = config::DEFAULT_VEHICLE_POLL_SECS)]
    vehicle_poll_secs: u64,

    #[arg(long, env = "ARRIVAL_POLL_SECS", default_value_t = config::DEFAULT_ARRIVAL_POLL_SECS)]
    arrival_poll_secs: u64,

    #[arg(long, env = "ACTIVE_ROUTES_POLL_SECS", default_value_t = config::DEFAULT_ACTIVE_ROUTES_POLL_SECS)]
    active_routes_poll_secs: u64,

    /// How long an arrived bus stays on the board after leaving the feed
    #[arg(long, env = "RETENTION_SECS", default_value_t = DEFAULT_RETENTION_WINDOW.as_secs())]
    retention_secs: u64,
}

impl Args {
    fn to_config(&self) -> Config {
        Config {
            backend_url: self.backend_url.clone(),
            smoothing: SmoothingConfig {
                jitter_threshold_m: self.jitter_threshold_m,
                jitter_damping: self.jitter_damping.clamp(0.0, 1.0),
                animation_duration: Duration::from_millis(self.animation_ms),
            },
            retention: RetentionPolicy::new(Duration::from_secs(self.retention_secs)),
            poll: PollIntervals {
                vehicles: Duration::from_secs(self.vehicle_poll_secs.max(1)),
                arrivals: Duration::from_secs(self.arrival_poll_secs.max(1)),
                active_routes: Duration::from_secs(self.active_routes_poll_secs.max(1)),
            },
        }
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let config = args.to_config();

    info!(backend = %config.backend_url, "Starting shuttle reconciler");

    let live = LiveState::shared(&config);
    let client = Arc::new(BackendClient::new(config.backend_url.clone()));

    let mut supervisor = PollSupervisor::new(client, live.clone(), config.poll);
    supervisor.start_vehicles();
    if let Some(stop_id) = &args.stop {
        supervisor.select_stop(stop_id).await;
    }
    let supervisor = Arc::new(Mutex::new(supervisor));

    let app = AppState {
        live,
        supervisor: supervisor.clone(),
    };
    let port = args.port;
    let api_handle = tokio::spawn(async move { api::run_server(app, port).await });

    tokio::select! {
        result = api_handle => match result {
            Ok(Err(e)) => error!(error = %e, "API server exited"),
            Ok(Ok(())) => info!("API server exited"),
            Err(e) => error!(error = %e, "API server task failed"),
        },
        _ = tokio::signal::ctrl_c() => info!("Shutting down"),
    }

    supervisor.lock().await.shutdown();
}
