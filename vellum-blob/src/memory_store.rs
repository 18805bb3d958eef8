use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use futures_util::StreamExt;
use parking_lot::RwLock;

use crate::error::{StorageError, StorageResult};
use crate::store::{ObjectStore, OpenedObject, PutResult};
use crate::types::{ByteRange, ByteStream, ResolvedRange};

const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:9000";

#[derive(Clone)]
struct StoredObject {
    content_type: Option<String>,
    data: Bytes,
}

/// In-memory store for testing and development
#[derive(Clone)]
pub struct MemoryStore {
    objects: Arc<RwLock<HashMap<String, StoredObject>>>,
    container_ready: Arc<RwLock<bool>>,
    container: String,
    endpoint_url: String,
}

impl MemoryStore {
    pub fn new<S: Into<String>>(container: S) -> Self {
        Self {
            objects: Arc::new(RwLock::new(HashMap::new())),
            container_ready: Arc::new(RwLock::new(false)),
            container: container.into(),
            endpoint_url: DEFAULT_ENDPOINT.to_string(),
        }
    }

    /// Override the endpoint native URLs are minted under
    pub fn with_endpoint<S: Into<String>>(mut self, endpoint: S) -> Self {
        self.endpoint_url = endpoint.into().trim_end_matches('/').to_string();
        self
    }

    /// Insert an object directly, bypassing the trait. Handy for seeding
    /// fixtures.
    pub fn insert<S: Into<String>, B: Into<Bytes>>(
        &self,
        key: S,
        content_type: Option<&str>,
        data: B,
    ) {
        self.objects.write().insert(
            key.into(),
            StoredObject {
                content_type: content_type.map(str::to_string),
                data: data.into(),
            },
        );
    }

    /// Whether `ensure_container` has run
    pub fn container_ready(&self) -> bool {
        *self.container_ready.read()
    }

    /// Number of stored objects
    pub fn object_count(&self) -> usize {
        self.objects.read().len()
    }

    fn native_url(&self, key: &str) -> String {
        format!("{}/{}/{}", self.endpoint_url, self.container, key)
    }

    async fn collect_stream(mut stream: ByteStream) -> StorageResult<Vec<u8>> {
        let mut data = Vec::new();
        while let Some(chunk) = stream.next().await {
            data.extend_from_slice(&chunk?);
        }
        Ok(data)
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    async fn exists(&self, key: &str) -> StorageResult<bool> {
        Ok(self.objects.read().contains_key(key))
    }

    async fn ensure_container(&self) -> StorageResult<()> {
        *self.container_ready.write() = true;
        Ok(())
    }

    async fn put(
        &self,
        key: &str,
        content_type: Option<&str>,
        stream: ByteStream,
    ) -> StorageResult<PutResult> {
        let data = Self::collect_stream(stream).await?;
        let size_bytes = data.len() as u64;

        self.objects.write().insert(
            key.to_string(),
            StoredObject {
                content_type: content_type.map(str::to_string),
                data: Bytes::from(data),
            },
        );

        Ok(PutResult {
            native_url: self.native_url(key),
            size_bytes,
            etag: None,
        })
    }

    async fn open(
        &self,
        key: &str,
        range: Option<ByteRange>,
    ) -> StorageResult<OpenedObject> {
        let object = {
            let objects = self.objects.read();
            objects.get(key).cloned()
        };
        let object = match object {
            Some(object) => object,
            None => return Err(StorageError::not_found(key)),
        };

        let total_size = object.data.len() as u64;
        let (body, resolved) = match range {
            // Ranges the object cannot satisfy are ignored; the caller
            // falls back to full content.
            Some(ref range) if range.is_valid(total_size) => {
                let resolved = ResolvedRange::from_request(range, total_size);
                let body = object
                    .data
                    .slice(resolved.start as usize..=resolved.end as usize);
                (body, Some(resolved))
            }
            _ => (object.data.clone(), None),
        };

        let content_length = body.len() as u64;
        let stream: ByteStream = Box::pin(futures_util::stream::once(async move { Ok(body) }));

        Ok(OpenedObject {
            content_type: object.content_type.clone(),
            content_length,
            stream,
            range: resolved,
        })
    }
}
