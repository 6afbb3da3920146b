use axum::{
    body::Body,
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
};
use tokio_util::io::ReaderStream;

use crate::error::UploadError;
use crate::handlers::validation;
use crate::models::{Category, Disposition};
use crate::AppState;

/// Handle `GET /view/{filetype}/{uuid_filename}`
pub async fn view_file(
    State(state): State<AppState>,
    Path((filetype, identifier)): Path<(String, String)>,
) -> Result<Response, UploadError> {
    serve_file(&state, &filetype, &identifier, Disposition::Inline).await
}

/// Handle `GET /download/{filetype}/{uuid_filename}`
pub async fn download_file(
    State(state): State<AppState>,
    Path((filetype, identifier)): Path<(String, String)>,
) -> Result<Response, UploadError> {
    serve_file(&state, &filetype, &identifier, Disposition::Attachment).await
}

/// Stream a file from local storage. The object store is never consulted.
async fn serve_file(
    state: &AppState,
    filetype: &str,
    identifier: &str,
    disposition: Disposition,
) -> Result<Response, UploadError> {
    let category: Category = filetype.parse()?;
    validation::validate_identifier(category, identifier)?;

    let file = state
        .local
        .open(category, identifier)
        .await
        .map_err(|e| UploadError::ReadFailed(e.to_string()))?
        .ok_or(UploadError::NotFound)?;

    let length = file
        .metadata()
        .await
        .map_err(|e| UploadError::ReadFailed(e.to_string()))?
        .len();

    let content_type = mime_guess::from_path(identifier).first_or_octet_stream();
    tracing::debug!(%category, identifier, bytes = length, ?disposition, "Serving file");

    let body = Body::from_stream(ReaderStream::new(file));

    Ok((
        [
            (header::CONTENT_TYPE, content_type.to_string()),
            (header::CONTENT_LENGTH, length.to_string()),
            (header::CONTENT_DISPOSITION, disposition.header_value(identifier)),
        ],
        body,
    )
        .into_response())
}
