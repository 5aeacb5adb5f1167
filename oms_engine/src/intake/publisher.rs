use log::*;
use thiserror::Error;

use super::{
    resolve_object_path,
    BulkIntakeMessage,
    IntakeQueue,
    ObjectPath,
    ObjectStore,
    ObjectStoreError,
    PathError,
    QueueError,
};

#[derive(Debug, Clone, Error)]
pub enum IntakeError {
    #[error(transparent)]
    MalformedPath(#[from] PathError),
    #[error("Object {0} does not exist")]
    ObjectNotFound(ObjectPath),
    #[error("Could not check for the object. {0}")]
    ObjectStoreError(ObjectStoreError),
    #[error("Could not read {path}. {reason}")]
    LocalFileError { path: String, reason: String },
    #[error("Could not enqueue the file for processing. {0}")]
    EnqueueFailed(#[from] QueueError),
}

/// Accepts uploaded files for asynchronous processing.
///
/// The object must already exist in the object store. Enqueue failures are returned to the caller and never retried
/// here.
#[derive(Clone)]
pub struct BulkIntakePublisher<S, Q> {
    store: S,
    queue: Q,
}

impl<S, Q> BulkIntakePublisher<S, Q>
where
    S: ObjectStore,
    Q: IntakeQueue,
{
    pub fn new(store: S, queue: Q) -> Self {
        Self { store, queue }
    }

    /// Resolves `path` and publishes it. See [`Self::publish`].
    pub async fn submit(&self, path: &str) -> Result<BulkIntakeMessage, IntakeError> {
        let path = resolve_object_path(path)?;
        self.publish(path).await
    }

    pub async fn publish(&self, path: ObjectPath) -> Result<BulkIntakeMessage, IntakeError> {
        match self.store.head_object(&path.bucket, &path.key).await {
            Ok(meta) => trace!("📥️ {path} exists ({} bytes)", meta.size),
            Err(ObjectStoreError::ObjectNotFound { .. }) => {
                info!("📥️ Bulk upload rejected. {path} does not exist");
                return Err(IntakeError::ObjectNotFound(path));
            },
            Err(e) => return Err(IntakeError::ObjectStoreError(e)),
        }
        let message = BulkIntakeMessage::from(path);
        self.queue.send(message.to_bytes()?).await?;
        info!("📥️ Queued s3://{}/{} for processing", message.bucket, message.key);
        Ok(message)
    }

    /// Copies a local file into the object store at `bucket/key`.
    pub async fn upload_local_file(
        &self,
        local_path: &std::path::Path,
        target: &ObjectPath,
    ) -> Result<u64, IntakeError> {
        let body = tokio::fs::read(local_path)
            .await
            .map_err(|e| IntakeError::LocalFileError { path: local_path.display().to_string(), reason: e.to_string() })?;
        let size = body.len() as u64;
        self.store.put_object(&target.bucket, &target.key, body).await.map_err(IntakeError::ObjectStoreError)?;
        info!("📥️ Uploaded {} to {target}", local_path.display());
        Ok(size)
    }
}
