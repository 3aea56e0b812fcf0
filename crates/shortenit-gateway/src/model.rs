mod status;
mod url;

pub use status::{ErrorResponse, HealthResponse, ServiceResponse};
pub use url::{BackwardRequest, BackwardResponse, ForwardRequest, ForwardResponse};
