use anyhow::Result;
use log::info;
use thiserror::Error;

use crate::clients::PropertyBackend;
use crate::models::image::ImageBlob;
use crate::models::property::StagedImage;

pub const MAX_FILES: usize = 30;
pub const MAX_FILE_BYTES: usize = 5 * 1024 * 1024;
pub const MAX_TOTAL_BYTES: usize = 30 * 1024 * 1024;

const ALLOWED_MIME_TYPES: [&str; 3] = ["image/jpeg", "image/jpg", "image/png"];

/// Local constraint violations, detected before any network call.
#[derive(Debug, Error, PartialEq)]
pub enum StagingError {
    #[error("too many files selected ({0}): the maximum is 30 images per property")]
    TooManyFiles(usize),
    #[error("invalid file format for {0}: only PNG and JPG are allowed")]
    InvalidType(String),
    #[error("file {0} is too large: the maximum is 5MB per image")]
    FileTooLarge(String),
    #[error("the combined size of the selected images cannot exceed 30MB")]
    TotalTooLarge,
}

/// Checks a file selection against the upload constraints. The count limit
/// is checked before any per-file check runs.
pub fn check_selection(blobs: &[ImageBlob]) -> Result<(), StagingError> {
    if blobs.len() > MAX_FILES {
        return Err(StagingError::TooManyFiles(blobs.len()));
    }

    let mut total_size: usize = 0;
    for blob in blobs {
        total_size += blob.size();
        if !ALLOWED_MIME_TYPES.contains(&blob.mime.as_str()) {
            return Err(StagingError::InvalidType(blob.name.clone()));
        }
        if blob.size() > MAX_FILE_BYTES {
            return Err(StagingError::FileTooLarge(blob.name.clone()));
        }
    }

    if total_size > MAX_TOTAL_BYTES {
        return Err(StagingError::TotalTooLarge);
    }

    Ok(())
}

/// Uploads a file selection to the temporary store and returns the staged
/// references. An empty selection resolves to an empty list without touching
/// the network; a constraint violation fails before any upload starts. On
/// upload failure no partial references are kept.
pub async fn stage_images(
    backend: &dyn PropertyBackend,
    blobs: &[ImageBlob],
) -> Result<Vec<StagedImage>> {
    if blobs.is_empty() {
        return Ok(Vec::new());
    }

    check_selection(blobs)?;

    info!("Uploading {} images to temporary storage", blobs.len());
    let staged = backend.upload_temp_images(blobs).await?;
    info!("Staged {} images", staged.len());

    Ok(staged)
}
