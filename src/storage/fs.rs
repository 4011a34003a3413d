use async_trait::async_trait;
use std::path::PathBuf;

use super::{validate_key, BlobStore, StorageError};

/// Filesystem-backed blob store. Files are written under `root` and served
/// by the web server under `public_base` (e.g. `/uploads`).
#[derive(Clone)]
pub struct FsBlobStore {
    root: PathBuf,
    public_base: String,
}

impl FsBlobStore {
    pub fn new(root: impl Into<PathBuf>, public_base: &str) -> Self {
        Self {
            root: root.into(),
            public_base: public_base.trim_end_matches('/').to_string(),
        }
    }

    pub fn root(&self) -> &std::path::Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StorageError> {
        validate_key(key)?;
        Ok(self.root.join(key))
    }
}

#[async_trait]
impl BlobStore for FsBlobStore {
    async fn put(&self, key: &str, bytes: &[u8], _content_type: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, bytes).await?;
        Ok(())
    }

    fn public_url(&self, key: &str) -> String {
        format!("{}/{key}", self.public_base)
    }

    async fn delete(&self, keys: &[String]) -> Result<(), StorageError> {
        for key in keys {
            let path = self.path_for(key)?;
            match tokio::fs::remove_file(&path).await {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn put_then_delete_roundtrip() {
        let dir = TempDir::new().unwrap();
        let store = FsBlobStore::new(dir.path(), "/uploads");

        let key = "innovations/abc123_photo.png".to_string();
        store.put(&key, b"pixels", "image/png").await.unwrap();
        assert!(dir.path().join(&key).exists());

        store.delete(std::slice::from_ref(&key)).await.unwrap();
        assert!(!dir.path().join(&key).exists());
    }

    #[tokio::test]
    async fn delete_of_missing_key_is_not_an_error() {
        let dir = TempDir::new().unwrap();
        let store = FsBlobStore::new(dir.path(), "/uploads");
        store
            .delete(&["innovations/nope.png".to_string()])
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn rejects_traversal_keys() {
        let dir = TempDir::new().unwrap();
        let store = FsBlobStore::new(dir.path(), "/uploads");
        let err = store.put("../outside.png", b"x", "image/png").await;
        assert!(matches!(err, Err(StorageError::InvalidKey(_))));
    }

    #[test]
    fn public_url_joins_base_and_key() {
        let store = FsBlobStore::new("data/uploads", "/uploads/");
        assert_eq!(
            store.public_url("news/k_cover.jpg"),
            "/uploads/news/k_cover.jpg"
        );
    }
}
