use crate::model::ServiceResponse;
use axum::Json;

pub async fn root_handler() -> Json<ServiceResponse> {
    Json(ServiceResponse {
        service: "shorten.it",
        status: "ok",
    })
}
