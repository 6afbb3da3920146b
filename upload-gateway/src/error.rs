use axum::{
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::models::{Category, ErrorResponse};

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("Invalid file type category '{0}'. Expected one of: images, pdfs, html")]
    InvalidCategory(String),

    #[error("{}", .0.rejection_message())]
    InvalidFileType(Category),

    #[error("No file provided")]
    MissingFile,

    #[error("Invalid multipart body: {0}")]
    Multipart(#[from] MultipartError),

    #[error("File not found")]
    NotFound,

    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Failed to read file: {0}")]
    ReadFailed(String),
}

impl UploadError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            UploadError::InvalidCategory(_) => StatusCode::BAD_REQUEST,
            UploadError::InvalidFileType(_) => StatusCode::BAD_REQUEST,
            UploadError::MissingFile => StatusCode::BAD_REQUEST,
            UploadError::Multipart(e) => e.status(),
            UploadError::NotFound => StatusCode::NOT_FOUND,
            UploadError::UploadFailed(_) => StatusCode::INTERNAL_SERVER_ERROR,
            UploadError::ReadFailed(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for UploadError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let detail = self.to_string();

        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), "{}", detail);
        } else {
            tracing::debug!(status = status.as_u16(), "{}", detail);
        }

        (status, Json(ErrorResponse { detail })).into_response()
    }
}
