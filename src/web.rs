use axum::extract::State;
use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::{Json, Router};
use serde_json::Value;
use tokio::time::{timeout, Duration};
use tracing::{debug, error};

use crate::app::AppState;
use crate::error::AppError;
use crate::model::{missing_field, sheet_row, StatusBody};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/attendance", axum::routing::post(submit_attendance))
        .route("/api/attendance/next", axum::routing::get(next_attendance))
        .route("/api/attendance/ack", axum::routing::post(ack_attendance))
        .route("/api/health/live", axum::routing::get(health_live))
        .route("/api/health/ready", axum::routing::get(health_ready))
        .route(
            "/api/metrics/prometheus",
            axum::routing::get(metrics_prometheus),
        )
        .with_state(state)
}

/// Records one attendance event: a row in the spreadsheet first, then a copy
/// on the pending queue for the peripheral. If the spreadsheet write fails
/// nothing is queued, so the caller can retry the whole submission.
async fn submit_attendance(
    State(state): State<AppState>,
    Json(event): Json<Value>,
) -> Result<(StatusCode, Json<StatusBody>), AppError> {
    if !event.is_object() {
        return Err(AppError::BadRequest("expected a JSON object".to_string()));
    }
    if let Some(field) = missing_field(&event) {
        return Err(AppError::MissingField(field));
    }

    let row = sheet_row(&event);
    let sink_timeout = Duration::from_secs(state.config.sink_timeout_seconds);
    match timeout(sink_timeout, state.sink.append_row(&row)).await {
        Ok(Ok(())) => {}
        Ok(Err(err)) => {
            error!("spreadsheet append failed: {}", err);
            state.metrics.record_sink_error();
            return Err(AppError::SinkUnavailable(err));
        }
        Err(_) => {
            error!(
                "spreadsheet append timed out after {}s",
                state.config.sink_timeout_seconds
            );
            state.metrics.record_sink_error();
            return Err(AppError::SinkUnavailable(anyhow::anyhow!(
                "append timed out after {}s",
                state.config.sink_timeout_seconds
            )));
        }
    }

    state.pending.push(event).await;
    state.metrics.record_submission();
    Ok((StatusCode::CREATED, Json(StatusBody::ok())))
}

/// Hands the oldest pending event to the polling peripheral. 204 means
/// nothing is waiting; poll again later. The event is gone from the queue
/// the moment it is returned.
async fn next_attendance(State(state): State<AppState>) -> Response {
    match state.pending.try_next().await {
        Some(event) => {
            state.metrics.record_fetch();
            Json(event).into_response()
        }
        None => {
            state.metrics.record_empty_fetch();
            StatusCode::NO_CONTENT.into_response()
        }
    }
}

/// Delivery confirmation from the peripheral. The queued copy was already
/// removed at fetch time, so this only validates the payload shape.
async fn ack_attendance(
    State(state): State<AppState>,
    Json(payload): Json<Value>,
) -> Result<Json<StatusBody>, AppError> {
    if !payload.is_object() {
        return Err(AppError::BadRequest("expected a JSON object".to_string()));
    }
    if payload.get("id").is_none() {
        return Err(AppError::MissingField("id"));
    }
    debug!(id = %payload["id"], "attendance event acknowledged");
    state.metrics.record_ack();
    Ok(Json(StatusBody::ok()))
}

async fn health_live() -> StatusCode {
    StatusCode::OK
}

async fn health_ready(State(state): State<AppState>) -> StatusCode {
    let timeout_secs = state.config.sink_timeout_seconds.max(1);
    match timeout(Duration::from_secs(timeout_secs), state.sink.ping()).await {
        Ok(Ok(())) => StatusCode::OK,
        Ok(Err(err)) => {
            error!("ready check failed: {}", err);
            StatusCode::SERVICE_UNAVAILABLE
        }
        Err(_) => {
            error!("ready check timeout after {}s", timeout_secs);
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}

async fn metrics_prometheus(State(state): State<AppState>) -> impl IntoResponse {
    let payload = state.metrics.render_prometheus();
    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("text/plain; version=0.0.4; charset=utf-8"),
    );
    (headers, payload)
}
