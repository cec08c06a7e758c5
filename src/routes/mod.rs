// Route exports
pub mod pages;
pub mod render;

use actix_web::{error, http::StatusCode, web, HttpResponse};

use crate::models::ErrorResponse;

pub use pages::AppState;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.configure(pages::configure);
}

/// JSON error for request payloads actix could not decode
#[derive(Debug)]
pub struct PayloadError(ErrorResponse);

impl std::fmt::Display for PayloadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.0.error, self.0.message)
    }
}

impl std::error::Error for PayloadError {}

impl error::ResponseError for PayloadError {
    fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.0.status_code).unwrap_or(StatusCode::BAD_REQUEST)
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(&self.0)
    }
}

/// Handle form payload errors
pub fn handle_form_payload_error(err: error::UrlencodedError, req: &actix_web::HttpRequest) -> actix_web::Error {
    tracing::info!("Form payload error on {}: {}", req.path(), err);
    PayloadError(ErrorResponse {
        error: "invalid_form".to_string(),
        message: format!("Invalid form: {}", err),
        status_code: 400,
    })
    .into()
}

/// Handle query payload errors
pub fn handle_query_payload_error(err: error::QueryPayloadError, _req: &actix_web::HttpRequest) -> actix_web::Error {
    PayloadError(ErrorResponse {
        error: "invalid_query".to_string(),
        message: format!("Invalid query: {}", err),
        status_code: 400,
    })
    .into()
}
