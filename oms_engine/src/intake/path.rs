use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const OBJECT_PATH_SCHEME: &str = "s3://";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathError {
    #[error("Malformed object path '{path}'. {reason}")]
    MalformedPath { path: String, reason: &'static str },
}

/// A location in the object store, written as `s3://bucket/key`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObjectPath {
    pub bucket: String,
    pub key: String,
}

impl ObjectPath {
    pub fn new<B: Into<String>, K: Into<String>>(bucket: B, key: K) -> Self {
        Self { bucket: bucket.into(), key: key.into() }
    }

    /// The last segment of the key, which is what the object is called on disk.
    pub fn file_name(&self) -> &str {
        self.key.rsplit('/').next().unwrap_or(self.key.as_str())
    }
}

impl Display for ObjectPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{OBJECT_PATH_SCHEME}{}/{}", self.bucket, self.key)
    }
}

impl FromStr for ObjectPath {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        resolve_object_path(s)
    }
}

/// Splits `s3://bucket/some/key` into `("bucket", "some/key")`.
///
/// The split happens on the first `/` after the scheme, so keys may contain further separators. Both segments must be
/// non-empty.
pub fn resolve_object_path(path: &str) -> Result<ObjectPath, PathError> {
    let malformed = |reason| PathError::MalformedPath { path: path.to_string(), reason };
    let rest = path.strip_prefix(OBJECT_PATH_SCHEME).ok_or_else(|| malformed("The path must start with s3://"))?;
    let (bucket, key) = rest.split_once('/').ok_or_else(|| malformed("The path has no key segment"))?;
    if bucket.is_empty() {
        return Err(malformed("The bucket name is empty"));
    }
    if key.is_empty() {
        return Err(malformed("The object key is empty"));
    }
    Ok(ObjectPath::new(bucket, key))
}
