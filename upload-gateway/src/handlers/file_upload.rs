use axum::{
    extract::{multipart::Field, Multipart, Path, State},
    Json,
};
use tokio::io::AsyncWriteExt;

use crate::error::UploadError;
use crate::handlers::validation;
use crate::models::{Category, UploadResponse};
use crate::storage::object_key;
use crate::AppState;

/// Handle `POST /upload/{filetype}/`
pub async fn upload_file(
    State(state): State<AppState>,
    Path(filetype): Path<String>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, UploadError> {
    let category: Category = filetype.parse()?;
    tracing::info!(%category, "Received upload request");

    while let Some(field) = multipart.next_field().await? {
        let field_name = field.name().unwrap_or("unknown");
        tracing::debug!("Processing field: {}", field_name);

        if field_name == "file" {
            let identifier = store_field(&state, category, field).await?;
            return Ok(Json(UploadResponse::new(identifier)));
        }
    }

    Err(UploadError::MissingFile)
}

/// Validate, persist locally, then mirror to the object store. Returns the
/// generated identifier.
async fn store_field(
    state: &AppState,
    category: Category,
    mut field: Field<'_>,
) -> Result<String, UploadError> {
    let filename = field.file_name().unwrap_or_default().to_string();
    let extension = validation::validate_upload(category, &filename)?;
    let identifier = validation::generate_identifier(&extension);

    let (path, mut file) = state
        .local
        .create(category, &identifier)
        .await
        .map_err(|e| UploadError::UploadFailed(e.to_string()))?;

    let mut written: usize = 0;
    let copied = async {
        while let Some(chunk) = field.chunk().await? {
            file.write_all(&chunk)
                .await
                .map_err(|e| UploadError::UploadFailed(e.to_string()))?;
            written += chunk.len();
        }
        file.flush()
            .await
            .map_err(|e| UploadError::UploadFailed(e.to_string()))?;
        Ok::<(), UploadError>(())
    }
    .await;
    drop(file);

    if let Err(e) = copied {
        state.local.remove(&path).await;
        return Err(e);
    }

    tracing::info!(
        %category,
        identifier = %identifier,
        bytes = written,
        original = %filename,
        "File stored locally"
    );

    let key = object_key(category, &identifier);
    let content_type = mime_guess::from_path(&identifier).first_or_octet_stream();

    if let Err(e) = state
        .object_store
        .upload(&path, &key, content_type.as_ref())
        .await
    {
        tracing::error!(key = %key, "Remote upload failed, rolling back local copy: {}", e);
        state.local.remove(&path).await;
        return Err(UploadError::UploadFailed(e.to_string()));
    }

    tracing::info!(key = %key, "File uploaded successfully");
    Ok(identifier)
}
