use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use shortenit_core::{DependencyError, ResolveError, ValidationError};
use tracing::{debug, error};

use crate::model::ErrorResponse;

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug)]
pub enum AppError {
    /// The request body was not the JSON object the route expects.
    MalformedBody(String),
    Validation(ValidationError),
    Dependency(DependencyError),
}

impl From<ResolveError> for AppError {
    fn from(value: ResolveError) -> Self {
        match value {
            ResolveError::Validation(e) => Self::Validation(e),
            ResolveError::Dependency(e) => Self::Dependency(e),
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(value: JsonRejection) -> Self {
        Self::MalformedBody(value.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::MalformedBody(message) => {
                debug!(error = %message, "rejected request body");
                (StatusCode::BAD_REQUEST, message)
            }
            AppError::Validation(e) => {
                debug!(error = %e, "rejected invalid input");
                (StatusCode::BAD_REQUEST, e.to_string())
            }
            AppError::Dependency(e) => {
                error!(error = %e, "dependency failure");
                (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
            }
        };

        (status, Json(ErrorResponse::new(message))).into_response()
    }
}
