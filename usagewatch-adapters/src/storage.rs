//! Object storage abstraction and the local directory backend.

use std::fmt::Debug;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::debug;

use crate::AdapterError;

/// Destination for published objects.
#[async_trait]
pub trait ObjectStore: Send + Sync + Debug {
    /// Store `body` under `bucket/key`, replacing any existing object.
    async fn put_object(&self, bucket: &str, key: &str, body: Vec<u8>) -> Result<(), AdapterError>;

    /// Grant anonymous read access to an existing object.
    async fn set_public_read(&self, bucket: &str, key: &str) -> Result<(), AdapterError>;

    /// Returns a human-readable description of the store, for logs.
    fn description(&self) -> &str;
}

/// An object store backed by a local directory.
///
/// Objects live at `{root}/{bucket}/{key}`. Granting public read makes the
/// file world-readable (mode 0644) on Unix; elsewhere it is a no-op.
#[derive(Debug, Clone)]
pub struct FileObjectStore {
    root: PathBuf,
    description: String,
}

impl FileObjectStore {
    /// Create a store rooted at the given directory.
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        let root = root.as_ref().to_path_buf();
        let description = format!("file: {}", root.display());
        Self { root, description }
    }

    /// Returns the root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path an object is stored at.
    pub fn object_path(&self, bucket: &str, key: &str) -> PathBuf {
        self.root.join(bucket).join(key)
    }
}

#[async_trait]
impl ObjectStore for FileObjectStore {
    async fn put_object(&self, bucket: &str, key: &str, body: Vec<u8>) -> Result<(), AdapterError> {
        let path = self.object_path(bucket, key);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, body).await?;
        debug!(path = %path.display(), "wrote object");
        Ok(())
    }

    async fn set_public_read(&self, bucket: &str, key: &str) -> Result<(), AdapterError> {
        let path = self.object_path(bucket, key);

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            tokio::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o644)).await?;
        }

        #[cfg(not(unix))]
        tokio::fs::metadata(&path).await?;

        Ok(())
    }

    fn description(&self) -> &str {
        &self.description
    }
}
