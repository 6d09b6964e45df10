use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
    Json, Router,
};
use serde::Serialize;
use tokio::sync::Mutex;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

use crate::arrivals::{ArrivalDisplay, ReconciledArrival, StatusColor};
use crate::error::{Error, Result};
use crate::realtime::PollSupervisor;
use crate::state::{now_ms, SharedState};

#[derive(Clone)]
pub struct AppState {
    pub live: SharedState,
    pub supervisor: Arc<Mutex<PollSupervisor>>,
}

#[derive(Debug, Serialize)]
struct ArrivalView {
    #[serde(flatten)]
    arrival: ReconciledArrival,
    display: ArrivalDisplay,
    status_color: StatusColor,
    status_label: &'static str,
}

impl From<&ReconciledArrival> for ArrivalView {
    fn from(arrival: &ReconciledArrival) -> Self {
        let color = arrival.record.effective_color();
        Self {
            display: arrival.display(),
            status_label: color.label(),
            status_color: color,
            arrival: arrival.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
struct ArrivalsResponse {
    stop_id: String,
    updated_at: Option<u64>,
    arrivals: Vec<ArrivalView>,
}

#[derive(Debug, Serialize)]
struct RoutesResponse {
    active_only: bool,
    known: Vec<String>,
    hidden: Vec<String>,
    active: Vec<String>,
}

#[derive(Debug, Serialize)]
struct ToggleResponse {
    route: String,
    hidden: bool,
}

pub fn router(app: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/vehicles", get(get_vehicles))
        .route("/arrivals", get(get_arrivals))
        .route("/stop/{stop_id}", put(select_stop))
        .route("/stop", delete(deselect_stop))
        .route("/routes", get(get_routes))
        .route("/routes/{name}/toggle", post(toggle_route))
        .route("/routes/active-only/{enabled}", put(set_active_only))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(app)
}

pub async fn run_server(app: AppState, port: u16) -> Result<()> {
    let addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|source| Error::Bind {
            addr: addr.clone(),
            source,
        })?;

    info!(%addr, "HTTP server listening");
    axum::serve(listener, router(app))
        .await
        .map_err(Error::Serve)
}

async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

async fn get_vehicles(State(app): State<AppState>) -> impl IntoResponse {
    let live = app.live.read().await;
    Json(live.visible_vehicles(now_ms()))
}

async fn get_arrivals(State(app): State<AppState>) -> Response {
    let live = app.live.read().await;

    match live.board() {
        Some(board) => Json(ArrivalsResponse {
            stop_id: board.stop_id().to_string(),
            updated_at: board.last_updated_ms(),
            arrivals: board.records().iter().map(ArrivalView::from).collect(),
        })
        .into_response(),
        None => (StatusCode::NOT_FOUND, "No stop selected").into_response(),
    }
}

async fn select_stop(State(app): State<AppState>, Path(stop_id): Path<String>) -> StatusCode {
    app.supervisor.lock().await.select_stop(&stop_id).await;
    StatusCode::NO_CONTENT
}

async fn deselect_stop(State(app): State<AppState>) -> StatusCode {
    app.supervisor.lock().await.deselect_stop().await;
    StatusCode::NO_CONTENT
}

async fn get_routes(State(app): State<AppState>) -> impl IntoResponse {
    let live = app.live.read().await;
    let known = live.known_routes();

    let mut active: Vec<String> = live.visibility.active_routes().iter().cloned().collect();
    active.sort();

    Json(RoutesResponse {
        active_only: live.visibility.active_only(),
        known: known.iter().cloned().collect(),
        hidden: live
            .visibility
            .effective_hidden(known.iter().map(String::as_str))
            .into_iter()
            .collect(),
        active,
    })
}

async fn toggle_route(State(app): State<AppState>, Path(name): Path<String>) -> Response {
    let toggled = app.live.write().await.visibility.toggle(&name);
    match toggled {
        Some(hidden) => Json(ToggleResponse { route: name, hidden }).into_response(),
        None => (StatusCode::CONFLICT, "Route toggles are locked in active-only mode").into_response(),
    }
}

async fn set_active_only(State(app): State<AppState>, Path(enabled): Path<bool>) -> StatusCode {
    app.supervisor.lock().await.set_active_only(enabled).await;
    StatusCode::NO_CONTENT
}
