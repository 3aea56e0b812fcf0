use crate::model::HealthResponse;
use crate::state::AppState;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use tracing::warn;

pub async fn health_handler(State(state): State<AppState>) -> Response {
    let checked = state
        .deadline()
        .bound("cache_ping", state.resolver().health())
        .await;

    match checked {
        Ok(Ok(())) => Json(HealthResponse::healthy()).into_response(),
        Ok(Err(e)) | Err(e) => {
            warn!(error = %e, "health check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(HealthResponse::unhealthy("cache_unreachable")),
            )
                .into_response()
        }
    }
}
