//! Object storage, addressed by bucket and key.
use std::{
    io::ErrorKind,
    path::{Component, Path, PathBuf},
    pin::Pin,
};

use log::*;
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncWriteExt};

pub type ObjectReader = Pin<Box<dyn AsyncRead + Send>>;

#[derive(Debug, Clone, Error)]
pub enum ObjectStoreError {
    #[error("Object {bucket}/{key} does not exist")]
    ObjectNotFound { bucket: String, key: String },
    #[error("Invalid object key: {0}")]
    InvalidKey(String),
    #[error("Object store I/O error. {0}")]
    IoError(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectMetadata {
    pub size: u64,
}

#[allow(async_fn_in_trait)]
pub trait ObjectStore: Clone {
    /// A metadata-only existence check.
    async fn head_object(&self, bucket: &str, key: &str) -> Result<ObjectMetadata, ObjectStoreError>;

    /// Opens the object for streaming.
    async fn get_object(&self, bucket: &str, key: &str) -> Result<ObjectReader, ObjectStoreError>;

    async fn put_object(&self, bucket: &str, key: &str, body: Vec<u8>) -> Result<(), ObjectStoreError>;
}

/// An object store that keeps `bucket/key` at `<root>/<bucket>/<key>` on the local file system.
#[derive(Debug, Clone)]
pub struct LocalObjectStore {
    root: PathBuf,
}

impl LocalObjectStore {
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        self.root.as_path()
    }

    fn object_path(&self, bucket: &str, key: &str) -> Result<PathBuf, ObjectStoreError> {
        let relative = Path::new(bucket).join(key);
        let escapes = relative.components().any(|c| !matches!(c, Component::Normal(_)));
        if bucket.is_empty() || key.is_empty() || escapes {
            return Err(ObjectStoreError::InvalidKey(format!("{bucket}/{key}")));
        }
        Ok(self.root.join(relative))
    }

    fn map_io_error(e: std::io::Error, bucket: &str, key: &str) -> ObjectStoreError {
        match e.kind() {
            ErrorKind::NotFound => ObjectStoreError::ObjectNotFound { bucket: bucket.to_string(), key: key.to_string() },
            _ => ObjectStoreError::IoError(e.to_string()),
        }
    }
}

impl ObjectStore for LocalObjectStore {
    async fn head_object(&self, bucket: &str, key: &str) -> Result<ObjectMetadata, ObjectStoreError> {
        let path = self.object_path(bucket, key)?;
        let meta = tokio::fs::metadata(&path).await.map_err(|e| Self::map_io_error(e, bucket, key))?;
        if !meta.is_file() {
            return Err(ObjectStoreError::ObjectNotFound { bucket: bucket.to_string(), key: key.to_string() });
        }
        Ok(ObjectMetadata { size: meta.len() })
    }

    async fn get_object(&self, bucket: &str, key: &str) -> Result<ObjectReader, ObjectStoreError> {
        let path = self.object_path(bucket, key)?;
        let file = tokio::fs::File::open(&path).await.map_err(|e| Self::map_io_error(e, bucket, key))?;
        trace!("🪣️ Opened {}", path.display());
        Ok(Box::pin(file))
    }

    async fn put_object(&self, bucket: &str, key: &str, body: Vec<u8>) -> Result<(), ObjectStoreError> {
        let path = self.object_path(bucket, key)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|e| ObjectStoreError::IoError(e.to_string()))?;
        }
        let mut file = tokio::fs::File::create(&path).await.map_err(|e| ObjectStoreError::IoError(e.to_string()))?;
        file.write_all(&body).await.map_err(|e| ObjectStoreError::IoError(e.to_string()))?;
        file.flush().await.map_err(|e| ObjectStoreError::IoError(e.to_string()))?;
        debug!("🪣️ Stored {} bytes at {bucket}/{key}", body.len());
        Ok(())
    }
}
