use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::Utc;
use tokio_util::io::ReaderStream;
use tracing::{debug, error};

use crate::config::StoreConfig;
use crate::error::{StorageError, StorageResult};
use crate::planner::plan_object_key;
use crate::serve::{content_type_for, ContentServer, ServeOutcome};
use crate::store::ObjectStore;
use crate::types::{ByteRange, ByteStream, UploadRequest};
use crate::urls::public_url;

/// The storage surface a content host programs against
#[async_trait]
pub trait StorageAdapter: Send + Sync {
    /// Whether `filename` resolves to a stored object. Never fails: store
    /// errors are swallowed to `false`, so callers cannot tell "absent"
    /// from "store unreachable". Part of the host contract.
    async fn exists(&self, filename: &str) -> bool;

    /// Store an uploaded file and return the public URL it is reachable
    /// under. Not atomic: the container may be created even when the
    /// object write fails.
    async fn save(&self, upload: UploadRequest) -> StorageResult<String>;

    /// Resolve a request path to stored content
    async fn serve(&self, request_path: &str, range: Option<ByteRange>) -> ServeOutcome;

    /// Fetch the raw bytes behind a fully-qualified URL
    async fn read(&self, url: &str) -> StorageResult<Bytes>;

    /// The host never deletes through its storage adapters; this is a
    /// deliberate no-op, not an oversight
    async fn delete(&self, filename: &str) -> StorageResult<()>;
}

/// The main storage adapter - wires a store, the key planner, and the
/// content server together behind the host-facing trait
pub struct ObjectStoreAdapter {
    store: Arc<dyn ObjectStore>,
    server: ContentServer,
    config: StoreConfig,
    http: reqwest::Client,
}

impl ObjectStoreAdapter {
    /// Create a new storage adapter
    pub fn new<S: ObjectStore + 'static>(store: S, config: StoreConfig) -> Self {
        let store: Arc<dyn ObjectStore> = Arc::new(store);

        Self {
            server: ContentServer::new(Arc::clone(&store)),
            store,
            config,
            http: reqwest::Client::new(),
        }
    }

    /// Get configuration
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    async fn save_at(&self, key: &str, upload: &UploadRequest) -> StorageResult<String> {
        self.store.ensure_container().await?;

        let file = tokio::fs::File::open(&upload.local_path).await?;
        let body: ByteStream = Box::pin(ReaderStream::new(file));
        let content_type = content_type_for(&upload.name);

        let result = self.store.put(key, Some(&content_type), body).await?;
        debug!("Uploaded {} ({} bytes)", key, result.size_bytes);

        public_url(&result.native_url, &self.config)
    }

    async fn fetch_bytes(&self, url: &str) -> StorageResult<Bytes> {
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| StorageError::fetch(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(StorageError::FetchStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        response.bytes().await.map_err(|e| StorageError::fetch(url, e))
    }
}

#[async_trait]
impl StorageAdapter for ObjectStoreAdapter {
    async fn exists(&self, filename: &str) -> bool {
        match self.store.exists(filename).await {
            Ok(exists) => exists,
            Err(e) => {
                error!("Existence check failed for {}: {}", filename, e);
                false
            }
        }
    }

    async fn save(&self, upload: UploadRequest) -> StorageResult<String> {
        if let Some(size) = upload.size_bytes {
            if size > self.config.max_blob_bytes {
                return Err(StorageError::invalid(format!(
                    "Upload size {} exceeds maximum {}",
                    size, self.config.max_blob_bytes
                )));
            }
        }

        let key = plan_object_key(&upload.name, upload.folder.as_deref(), Utc::now());

        match self.save_at(&key, &upload).await {
            Ok(url) => Ok(url),
            Err(cause) => {
                error!("Upload of {} failed: {}", key, cause);
                Err(StorageError::upload(key, cause))
            }
        }
    }

    async fn serve(&self, request_path: &str, range: Option<ByteRange>) -> ServeOutcome {
        self.server.serve(request_path, range).await
    }

    async fn read(&self, url: &str) -> StorageResult<Bytes> {
        match self.fetch_bytes(url).await {
            Ok(bytes) => Ok(bytes),
            Err(e) => {
                error!("Read of {} failed: {}", url, e);
                Err(e)
            }
        }
    }

    async fn delete(&self, filename: &str) -> StorageResult<()> {
        debug!("Ignoring delete of {}", filename);
        Ok(())
    }
}
