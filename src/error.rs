use actix_web::{error, http::header, http::StatusCode, HttpResponse};
use thiserror::Error;

use crate::models::ErrorResponse;
use crate::services::StorageError;

/// Errors surfaced by the search, favorites, match and auth flows
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Login failed: {0}")]
    Auth(String),

    /// The adoption service rejected the session; the user has been logged out
    #[error("Session is no longer valid")]
    Unauthorized,

    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("No more pages in that direction")]
    NoSuchPage,

    #[error("Please add at least one dog to your favorites first")]
    NoFavorites,

    #[error("Invalid filter: {0}")]
    InvalidFilter(String),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

impl AppError {
    fn code(&self) -> &'static str {
        match self {
            AppError::Auth(_) => "auth_error",
            AppError::Unauthorized => "unauthorized",
            AppError::RequestFailed(_) => "request_failed",
            AppError::NoSuchPage => "no_such_page",
            AppError::NoFavorites => "no_favorites",
            AppError::InvalidFilter(_) => "invalid_filter",
            AppError::Storage(_) => "storage_error",
        }
    }
}

impl error::ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Auth(_) => StatusCode::UNAUTHORIZED,
            AppError::Unauthorized => StatusCode::SEE_OTHER,
            AppError::RequestFailed(_) => StatusCode::BAD_GATEWAY,
            AppError::NoSuchPage | AppError::NoFavorites | AppError::InvalidFilter(_) => {
                StatusCode::BAD_REQUEST
            }
            AppError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        // a rejected session always lands back on the entry view
        if let AppError::Unauthorized = self {
            return HttpResponse::SeeOther()
                .insert_header((header::LOCATION, "/"))
                .finish();
        }

        let status = self.status_code();
        HttpResponse::build(status).json(ErrorResponse {
            error: self.code().to_string(),
            message: self.to_string(),
            status_code: status.as_u16(),
        })
    }
}
