use crate::error::Result;
use crate::model::{BackwardRequest, BackwardResponse, ForwardRequest, ForwardResponse};
use crate::state::AppState;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use tracing::debug;

pub async fn forward_handler(
    State(state): State<AppState>,
    payload: std::result::Result<Json<ForwardRequest>, JsonRejection>,
) -> Result<Json<ForwardResponse>> {
    let Json(request) = payload?;

    let code = state
        .resolver()
        .forward(&request.long_url, state.deadline())
        .await?;
    debug!(long_url = %request.long_url, code = %code, "resolved forward");

    Ok(Json(code.into()))
}

pub async fn backward_handler(
    State(state): State<AppState>,
    payload: std::result::Result<Json<BackwardRequest>, JsonRejection>,
) -> Result<Json<BackwardResponse>> {
    let Json(request) = payload?;

    let long_url = state
        .resolver()
        .backward(&request.short_url, state.deadline())
        .await?;

    Ok(Json(long_url.into()))
}
