use async_trait::async_trait;

use crate::error::StorageResult;
use crate::types::{ByteRange, ByteStream, ResolvedRange};

/// Core object storage operations - must be implemented by all storage backends
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Check whether an object exists at `key`
    async fn exists(&self, key: &str) -> StorageResult<bool>;

    /// Create the backing container if it is not there yet. Concurrent
    /// callers may race; "already exists" counts as success.
    async fn ensure_container(&self) -> StorageResult<()>;

    /// Store an object from a stream
    async fn put(
        &self,
        key: &str,
        content_type: Option<&str>,
        stream: ByteStream,
    ) -> StorageResult<PutResult>;

    /// Open an object for reading, optionally restricted to a byte range.
    /// Metadata is resolved up front; the body is consumed lazily from the
    /// returned stream. Absent keys fail with `StorageError::NotFound`.
    async fn open(
        &self,
        key: &str,
        range: Option<ByteRange>,
    ) -> StorageResult<OpenedObject>;
}

/// Result of a successful put operation
#[derive(Debug, Clone)]
pub struct PutResult {
    /// Fully-qualified URL the store itself serves the object under
    pub native_url: String,
    pub size_bytes: u64,
    pub etag: Option<String>,
}

/// Result of an open operation
pub struct OpenedObject {
    pub content_type: Option<String>,
    /// Length of the returned body, not of the whole object when ranged
    pub content_length: u64,
    pub stream: ByteStream,
    /// Present only when the store honored a requested range
    pub range: Option<ResolvedRange>,
}
