// Upload and identifier validation

use uuid::Uuid;

use crate::error::UploadError;
use crate::models::Category;

/// Extension after the last `.`, lower-cased. `None` when there is no dot or
/// nothing follows it.
pub fn file_extension(filename: &str) -> Option<String> {
    let (_, extension) = filename.rsplit_once('.')?;
    if extension.is_empty() {
        return None;
    }
    Some(extension.to_lowercase())
}

/// Check a client filename against the category table, returning the
/// normalised extension.
pub fn validate_upload(category: Category, filename: &str) -> Result<String, UploadError> {
    match file_extension(filename) {
        Some(extension) if category.allows(&extension) => Ok(extension),
        _ => Err(UploadError::InvalidFileType(category)),
    }
}

pub fn generate_identifier(extension: &str) -> String {
    format!("{}.{}", Uuid::new_v4(), extension)
}

/// Read endpoints only resolve names shaped like `generate_identifier` output
/// for the given category, so nothing outside the partition is reachable.
pub fn validate_identifier(category: Category, identifier: &str) -> Result<(), UploadError> {
    let (token, extension) = identifier.rsplit_once('.').ok_or(UploadError::NotFound)?;

    if Uuid::try_parse(token).is_err() || token.len() != 36 {
        return Err(UploadError::NotFound);
    }

    if !category.allows(extension) {
        return Err(UploadError::NotFound);
    }

    Ok(())
}
