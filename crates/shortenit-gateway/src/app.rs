use axum::routing::{get, post};
use axum::Router;
use shortenit_telemetry::http_trace_layer;

use crate::handlers::{backward_handler, forward_handler, health_handler, root_handler};
use crate::state::AppState;

pub struct App {}

impl App {
    pub fn router(state: AppState) -> Router {
        Router::new()
            .route("/", get(root_handler))
            .route("/healthz", get(health_handler))
            .route("/forward", post(forward_handler))
            .route("/backward", post(backward_handler))
            .layer(http_trace_layer())
            .with_state(state)
    }
}
