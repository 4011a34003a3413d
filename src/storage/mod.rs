//! Blob storage for uploaded images.
//!
//! Uploaded files live outside the database; rows only hold opaque storage
//! keys. `FsBlobStore` writes under a local uploads directory that the
//! server exposes through `actix_files`, so `public_url` is a stable path
//! for templates. Tests use `MemoryBlobStore`.

use async_trait::async_trait;

mod fs;
mod keys;
mod memory;

pub use fs::FsBlobStore;
pub use keys::new_key;
pub use memory::MemoryBlobStore;

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Blob not found: {0}")]
    NotFound(String),
}

#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store binary content under `key`.
    async fn put(&self, key: &str, bytes: &[u8], content_type: &str) -> Result<(), StorageError>;

    /// Stable public URL for a stored key. Computed, never persisted.
    fn public_url(&self, key: &str) -> String;

    /// Delete the given keys. Missing keys are not an error.
    async fn delete(&self, keys: &[String]) -> Result<(), StorageError>;
}

/// Reject keys that could escape the storage root.
pub(crate) fn validate_key(key: &str) -> Result<(), StorageError> {
    if key.is_empty()
        || key.starts_with('/')
        || key.split('/').any(|part| part.is_empty() || part == "." || part == "..")
    {
        return Err(StorageError::InvalidKey(key.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_nested_keys() {
        assert!(validate_key("innovations/ab12cd_photo.png").is_ok());
    }

    #[test]
    fn rejects_traversal_and_absolute_keys() {
        assert!(validate_key("").is_err());
        assert!(validate_key("/etc/passwd").is_err());
        assert!(validate_key("a//b").is_err());
        assert!(validate_key("a/../b").is_err());
        assert!(validate_key("./a").is_err());
    }
}
