use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use thiserror::Error;

/// Reasons a `/verify` request is rejected before any verification runs.
///
/// Verification outcomes themselves are never errors; they go back as a 200
/// with `valid: false`.
#[derive(Error, Debug)]
pub enum RequestError {
    #[error("Only POST method is allowed")]
    MethodNotAllowed,

    #[error("Invalid request body")]
    InvalidBody(#[from] serde_json::Error),

    #[error("Invalid request body")]
    EmptyBody,

    #[error("Email is required")]
    MissingEmail,
}

impl ResponseError for RequestError {
    fn status_code(&self) -> StatusCode {
        match self {
            RequestError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            RequestError::InvalidBody(_) | RequestError::EmptyBody | RequestError::MissingEmail => {
                StatusCode::BAD_REQUEST
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code())
            .content_type("text/plain; charset=utf-8")
            .body(self.to_string())
    }
}
