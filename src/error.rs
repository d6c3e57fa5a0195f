use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::error;

use crate::view::error_response;

#[derive(Error, Debug)]
pub enum AppError {
    /// Malformed form or multipart submission.
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Path not found: {0}")]
    NotFound(String),

    /// Control page asked to switch to a directory that does not exist.
    #[error("Directory does not exist: {0}")]
    InvalidDirectory(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) | AppError::InvalidDirectory(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!("Request failed: {}", self);
        }
        error_response(status, &self.to_string())
    }
}
