use std::path::PathBuf;

use anyhow::Context;
use axum::async_trait;
use bytes::Bytes;

/// Blob store seam: put/delete by object key plus deterministic public URL
/// resolution under a fixed base path.
#[async_trait]
pub trait StorageClient: Send + Sync {
    async fn put_object(&self, key: &str, body: Bytes) -> anyhow::Result<()>;
    /// Idempotent: returns `false` when the object was already absent.
    async fn delete_object(&self, key: &str) -> anyhow::Result<bool>;
    fn object_url(&self, key: &str) -> String;
}

/// Local-disk storage rooted at the uploads directory, which the app also
/// serves statically under `/uploads`.
#[derive(Clone)]
pub struct LocalStorage {
    root: PathBuf,
    public_base_url: String,
}

impl LocalStorage {
    pub async fn new(root: impl Into<PathBuf>, public_base_url: &str) -> anyhow::Result<Self> {
        let root = root.into();
        tokio::fs::create_dir_all(&root)
            .await
            .with_context(|| format!("create upload dir {}", root.display()))?;
        Ok(Self {
            root,
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl StorageClient for LocalStorage {
    async fn put_object(&self, key: &str, body: Bytes) -> anyhow::Result<()> {
        let path = self.root.join(key);
        tokio::fs::write(&path, &body)
            .await
            .with_context(|| format!("write {}", path.display()))?;
        Ok(())
    }

    async fn delete_object(&self, key: &str) -> anyhow::Result<bool> {
        let path = self.root.join(key);
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(anyhow::Error::new(e).context(format!("remove {}", path.display()))),
        }
    }

    fn object_url(&self, key: &str) -> String {
        format!("{}/uploads/{}", self.public_base_url, key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    async fn temp_storage() -> LocalStorage {
        let root = std::env::temp_dir().join(format!("wanderlog-test-{}", Uuid::new_v4()));
        LocalStorage::new(root, "http://localhost:8000")
            .await
            .expect("create storage")
    }

    #[tokio::test]
    async fn put_then_delete_roundtrip() {
        let storage = temp_storage().await;
        storage
            .put_object("photo.jpg", Bytes::from_static(b"jpegdata"))
            .await
            .expect("put");
        assert!(storage.delete_object("photo.jpg").await.expect("delete"));
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let storage = temp_storage().await;
        assert!(!storage.delete_object("never-existed.png").await.unwrap());
        storage
            .put_object("once.png", Bytes::from_static(b"png"))
            .await
            .unwrap();
        assert!(storage.delete_object("once.png").await.unwrap());
        assert!(!storage.delete_object("once.png").await.unwrap());
    }

    #[tokio::test]
    async fn object_url_is_deterministic() {
        let storage = temp_storage().await;
        assert_eq!(
            storage.object_url("abc.jpg"),
            "http://localhost:8000/uploads/abc.jpg"
        );
        let trimmed = LocalStorage::new(std::env::temp_dir(), "http://host/")
            .await
            .unwrap();
        assert_eq!(trimmed.object_url("x.png"), "http://host/uploads/x.png");
    }
}
