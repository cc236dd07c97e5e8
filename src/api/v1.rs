use axum::{
    extract::{rejection::JsonRejection, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::ApiError;
use super::response::{success, ApiResponse};
use crate::{
    controller::{AlertThresholds, AppState, Command},
    domain::{AlertKind, ControlLimits, EventEntry, HistorySeries, RunState, SimulationState},
    render::{ChartBuffer, DisplaySnapshot},
    simulation::{Scenario, SCENARIOS},
};

/// Alerts included in the status view
const STATUS_RECENT_ALERTS: usize = 10;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/status", get(get_status))
        .route("/display", get(get_display))
        .route("/history", get(get_history))
        .route("/charts", get(get_charts))
        .route("/events", get(get_events))
        .route("/scenarios", get(list_scenarios))
        .route("/commands", post(post_command))
        .with_state(state)
}

pub async fn healthz() -> impl IntoResponse {
    StatusCode::OK
}

#[derive(Debug, Serialize)]
pub struct AlertView {
    pub at: DateTime<Utc>,
    pub kind: AlertKind,
    pub value: f64,
    pub limit: f64,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct SystemStatus {
    pub session_id: Uuid,
    pub state: SimulationState,
    pub limits: ControlLimits,
    pub thresholds: AlertThresholds,
    pub recent_alerts: Vec<AlertView>,
}

pub async fn get_status(State(st): State<AppState>) -> ApiResponse<SystemStatus> {
    let recent_alerts = st
        .controller
        .recent_alerts(STATUS_RECENT_ALERTS)
        .into_iter()
        .map(|(at, alert)| AlertView {
            at,
            kind: alert.kind,
            value: alert.value,
            limit: alert.limit,
            message: alert.message(),
        })
        .collect();

    success(SystemStatus {
        session_id: st.session_id,
        state: st.controller.state(),
        limits: st.controller.limits(),
        thresholds: st.controller.thresholds(),
        recent_alerts,
    })
}

pub async fn get_display(State(st): State<AppState>) -> ApiResponse<DisplaySnapshot> {
    success(st.display())
}

pub async fn get_history(State(st): State<AppState>) -> ApiResponse<HistorySeries> {
    let series = st.controller.history();
    let count = series.time.len();
    success(series).with_count(count)
}

pub async fn get_charts(State(st): State<AppState>) -> ApiResponse<ChartBuffer> {
    success(st.charts())
}

#[derive(Debug, Deserialize)]
pub struct EventsQuery {
    pub limit: Option<usize>,
}

pub async fn get_events(
    State(st): State<AppState>,
    Query(q): Query<EventsQuery>,
) -> ApiResponse<Vec<EventEntry>> {
    let mut events = st.controller.events();
    if let Some(limit) = q.limit {
        events.truncate(limit);
    }
    let count = events.len();
    success(events).with_count(count)
}

pub async fn list_scenarios() -> ApiResponse<&'static [Scenario]> {
    success(SCENARIOS).with_count(SCENARIOS.len())
}

#[derive(Debug, Serialize)]
pub struct CommandAck {
    pub command: Command,
    pub run_state: RunState,
    pub time: u64,
}

pub async fn post_command(
    State(st): State<AppState>,
    payload: Result<Json<Command>, JsonRejection>,
) -> Result<ApiResponse<CommandAck>, ApiError> {
    let Json(command) = payload?;
    st.controller.dispatch(command.clone())?;

    let state = st.controller.state();
    Ok(success(CommandAck {
        command,
        run_state: state.run_state,
        time: state.time,
    }))
}
