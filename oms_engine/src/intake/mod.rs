//! Bulk intake: accepting uploaded files, queueing them, and staging them locally for the CSV parser.
mod object_store;
mod path;
mod publisher;
mod queue;
mod stage;

pub use object_store::{LocalObjectStore, ObjectMetadata, ObjectReader, ObjectStore, ObjectStoreError};
pub use path::{resolve_object_path, ObjectPath, PathError, OBJECT_PATH_SCHEME};
pub use publisher::{BulkIntakePublisher, IntakeError};
pub use queue::{BulkIntakeMessage, IntakeQueue, MemoryQueue, QueueDelivery, QueueError};
pub use stage::{FileStager, StageError};
