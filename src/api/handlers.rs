//! HTTP endpoint handlers

use std::{convert::Infallible, sync::Arc};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{
        sse::{Event, KeepAlive, Sse},
        Json,
    },
};
use futures::stream::{self, Stream};
use serde::Deserialize;
use tracing::{debug, error, warn};

use crate::{
    clock_face::{format_time, mode_label, ClockView},
    state::{AppState, Command, SettingsForm, TimerMode, TimerState},
};
use super::responses::{ApiResponse, HealthResponse, StatusResponse};

fn dispatch(state: &AppState, command: Command) -> Result<TimerState, StatusCode> {
    state.dispatch(command).map_err(|e| {
        error!("Failed to apply {:?}: {}", command, e);
        StatusCode::INTERNAL_SERVER_ERROR
    })
}

fn snapshot(state: &AppState) -> Result<TimerState, StatusCode> {
    state.snapshot().map_err(|e| {
        error!("Failed to read timer state: {}", e);
        StatusCode::INTERNAL_SERVER_ERROR
    })
}

/// Handle POST /toggle - Start or pause the countdown
pub async fn toggle_handler(State(state): State<Arc<AppState>>) -> Result<Json<ApiResponse>, StatusCode> {
    let timer = dispatch(&state, Command::Toggle)?;
    let message = if timer.is_running { "Timer started" } else { "Timer paused" };
    Ok(Json(ApiResponse::new(message.to_string(), timer)))
}

/// Handle POST /reset - Rewind the current interval
pub async fn reset_handler(State(state): State<Arc<AppState>>) -> Result<Json<ApiResponse>, StatusCode> {
    let timer = dispatch(&state, Command::Reset)?;
    Ok(Json(ApiResponse::new(
        format!("{} interval reset", mode_label(timer.mode)),
        timer,
    )))
}

/// Handle POST /mode/:mode - Jump to another interval kind
pub async fn mode_handler(
    State(state): State<Arc<AppState>>,
    Path(mode): Path<String>,
) -> Result<Json<ApiResponse>, StatusCode> {
    let Some(mode) = TimerMode::from_name(&mode) else {
        warn!("Rejected unknown mode: {}", mode);
        return Err(StatusCode::BAD_REQUEST);
    };

    let timer = dispatch(&state, Command::SwitchMode(mode))?;
    Ok(Json(ApiResponse::new(
        format!("Switched to {}", mode_label(mode)),
        timer,
    )))
}

/// Handle PUT /settings - Save interval durations
pub async fn settings_handler(
    State(state): State<Arc<AppState>>,
    Json(form): Json<SettingsForm>,
) -> Result<Json<ApiResponse>, StatusCode> {
    let settings = form.sanitize();
    debug!("Settings form {:?} resolved to {:?}", form, settings);

    let timer = dispatch(&state, Command::UpdateSettings(settings))?;
    Ok(Json(ApiResponse::new(
        format!(
            "Settings saved: work {}m, short break {}m, long break {}m",
            settings.work_time, settings.short_break, settings.long_break
        ),
        timer,
    )))
}

/// Handle GET /state - Return the raw timer state
pub async fn state_handler(State(state): State<Arc<AppState>>) -> Result<Json<TimerState>, StatusCode> {
    Ok(Json(snapshot(&state)?))
}

#[derive(Debug, Deserialize)]
pub struct ClockQuery {
    /// Remaining seconds the caller last displayed
    pub previous: Option<u32>,
}

/// Handle GET /clock - Return the rendered clock face
pub async fn clock_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ClockQuery>,
) -> Result<Json<ClockView>, StatusCode> {
    let timer = snapshot(&state)?;
    Ok(Json(ClockView::new(&timer, query.previous)))
}

/// Handle GET /status - Return timer state plus daemon metadata
pub async fn status_handler(State(state): State<Arc<AppState>>) -> Result<Json<StatusResponse>, StatusCode> {
    let timer = snapshot(&state)?;
    let (last_action, last_action_time) = state.get_last_action();

    Ok(Json(StatusResponse {
        display: format_time(timer.time_left),
        timer,
        uptime: state.get_uptime(),
        last_action,
        last_action_time,
    }))
}

/// Handle GET /events - Stream every state change as a server-sent event
pub async fn events_handler(
    State(state): State<Arc<AppState>>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = state.subscribe();

    // The current state goes out first, then one event per change
    let stream = stream::unfold((rx, true), |(mut rx, first)| async move {
        if !first && rx.changed().await.is_err() {
            return None;
        }
        let timer = rx.borrow_and_update().clone();
        let event = Event::default()
            .event("state")
            .json_data(&timer)
            .unwrap_or_else(|e| {
                warn!("Failed to encode state event: {}", e);
                Event::default().event("error")
            });
        Some((Ok(event), (rx, false)))
    });

    Sse::new(stream).keep_alive(KeepAlive::default())
}

/// Handle GET /health - Health check endpoint
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}
