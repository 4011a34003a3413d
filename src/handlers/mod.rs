pub mod account_handlers;
pub mod admin;
pub mod auth_handlers;
pub mod contact_handlers;
pub mod public_handlers;
pub mod update_request_handlers;

use actix_multipart::form::tempfile::TempFile;

use crate::errors::AppError;
use crate::models::update_request::NewImageUpload;

/// Read uploaded multipart files into blob-store uploads, skipping the
/// empty file field browsers send when nothing was selected.
pub(crate) fn collect_uploads(files: &[TempFile]) -> Result<Vec<NewImageUpload>, AppError> {
    let mut uploads = Vec::new();
    for file in files {
        if file.size == 0 {
            continue;
        }
        let bytes = std::fs::read(file.file.path())
            .map_err(|e| AppError::Storage(crate::storage::StorageError::Io(e)))?;
        uploads.push(NewImageUpload {
            file_name: file.file_name.clone().unwrap_or_default(),
            content_type: file
                .content_type
                .as_ref()
                .map(|m| m.to_string())
                .unwrap_or_else(|| "application/octet-stream".to_string()),
            bytes,
        });
    }
    Ok(uploads)
}

/// Store a batch of uploads under `prefix`, returning the new keys.
/// If any write fails the batch is rolled back best-effort and the error
/// propagated, so callers never see a half-stored batch.
pub(crate) async fn store_uploads(
    blob: &dyn crate::storage::BlobStore,
    uploads: &[NewImageUpload],
    prefix: &str,
) -> Result<Vec<String>, AppError> {
    let mut keys = Vec::with_capacity(uploads.len());
    for upload in uploads {
        let key = crate::storage::new_key(prefix, &upload.file_name);
        if let Err(e) = blob.put(&key, &upload.bytes, &upload.content_type).await {
            if let Err(cleanup) = blob.delete(&keys).await {
                log::warn!("Cleanup after failed upload also failed: {cleanup}");
            }
            return Err(e.into());
        }
        keys.push(key);
    }
    Ok(keys)
}

/// Normalize an optional form text input: trims, empty becomes None.
pub(crate) fn optional_text<S: AsRef<str>>(value: Option<S>) -> Option<String> {
    value
        .map(|s| s.as_ref().trim().to_string())
        .filter(|s| !s.is_empty())
}
