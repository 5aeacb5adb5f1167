use std::path::{Path, PathBuf};

use log::*;
use thiserror::Error;
use tokio::io::AsyncWriteExt;

use super::{ObjectPath, ObjectStore, ObjectStoreError};

#[derive(Debug, Clone, Error)]
pub enum StageError {
    #[error("Could not download the object. {0}")]
    DownloadFailed(#[from] ObjectStoreError),
    #[error("Could not write the staged file {path}. {reason}")]
    WriteFailed { path: String, reason: String },
}

/// Downloads objects into a local staging directory.
#[derive(Debug, Clone)]
pub struct FileStager<S> {
    store: S,
    staging_dir: PathBuf,
}

impl<S: ObjectStore> FileStager<S> {
    pub fn new<P: Into<PathBuf>>(store: S, staging_dir: P) -> Self {
        Self { store, staging_dir: staging_dir.into() }
    }

    pub fn staging_dir(&self) -> &Path {
        self.staging_dir.as_path()
    }

    /// The staged file name is derived from the bucket and the full key, so a redelivered message overwrites its
    /// earlier copy and two different keys never collide.
    pub fn staging_path(&self, object: &ObjectPath) -> PathBuf {
        let name = format!("{}__{}", object.bucket, object.key.replace('/', "__"));
        self.staging_dir.join(name)
    }

    /// Streams the object to its staging path and returns that path.
    pub async fn stage(&self, object: &ObjectPath) -> Result<PathBuf, StageError> {
        let dest = self.staging_path(object);
        let write_failed = |e: std::io::Error| StageError::WriteFailed { path: dest.display().to_string(), reason: e.to_string() };
        tokio::fs::create_dir_all(&self.staging_dir).await.map_err(write_failed)?;
        let mut reader = self.store.get_object(&object.bucket, &object.key).await?;
        let mut file = tokio::fs::File::create(&dest).await.map_err(write_failed)?;
        let bytes = tokio::io::copy(&mut reader, &mut file).await.map_err(write_failed)?;
        file.flush().await.map_err(write_failed)?;
        debug!("📥️ Staged {object} to {} ({bytes} bytes)", dest.display());
        Ok(dest)
    }
}
