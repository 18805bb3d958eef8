//! # vellum-blob: Pluggable blob storage for content hosts
//!
//! `vellum-blob` is the storage backend a content-management host plugs in
//! when its media should live in an object store instead of on local disk.
//! It plans deterministic storage keys, mints CDN-aware public URLs, and
//! streams content back out without buffering whole files in memory.
//!
//! ## Key Features
//!
//! - **Deterministic key planning**: Uploads are routed into
//!   `images/`, `media/`, or `files/` buckets under a `YYYY/MM` date path,
//!   and re-saving into an already-dated folder never double-dates the key
//! - **CDN-aware URLs**: Public URLs come straight from the store, or are
//!   rewritten onto a configured CDN host
//! - **Streaming-first serving**: Request paths resolve to byte streams
//!   with content types and optional range support
//! - **Storage agnostic**: Any backend that can implement four operations
//!   works (S3-compatible and in-memory stores ship in the box)
//! - **Server agnostic**: No HTTP coupling - the serve boundary speaks in
//!   outcomes, not responses
//!
//! ## Quick Start
//!
//! ```rust
//! use vellum_blob::prelude::*;
//! use vellum_blob::MemoryStore;
//!
//! # #[tokio::main]
//! # async fn main() -> StorageResult<()> {
//! // 1. Configure the adapter the way the host would
//! let config = StoreConfig::new().with_cdn_host("cdn.example.com").with_https();
//! let store = MemoryStore::new(config.container.clone());
//! let adapter = ObjectStoreAdapter::new(store, config);
//!
//! // 2. Save an uploaded file the host staged on disk
//! let staged = std::env::temp_dir().join("vellum-quickstart.png");
//! std::fs::write(&staged, b"png bytes")?;
//!
//! let url = adapter.save(UploadRequest::new("photo.png", &staged)).await?;
//! assert!(url.starts_with("https://cdn.example.com/"));
//!
//! // 3. Serve it back by request path
//! match adapter.serve("/content/images/2024/03/missing.png", None).await {
//!     ServeOutcome::NotFound { key } => assert_eq!(key, "images/2024/03/missing.png"),
//!     _ => unreachable!(),
//! }
//! # let _ = std::fs::remove_file(&staged);
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────────────┐
//! │    Content Host    │  ← uploads, URLs, request paths
//! ├────────────────────┤
//! │   StorageAdapter   │  ← key planning, URL codec, serve outcomes
//! ├────────────────────┤
//! │    ObjectStore     │  ← storage primitives
//! └────────────────────┘
//! ```
//!
//! The host only ever sees `StorageAdapter`; everything below it is
//! swappable. `ObjectStore` is deliberately tiny - exists, ensure the
//! container, put, open - so writing a new backend is an afternoon, not a
//! project.

pub mod adapter;
mod config;
mod error;
mod memory_store;
pub mod planner;
mod s3_store;
pub mod serve;
pub mod store;
mod types;
mod urls;

// Re-export main types for clean API
pub use adapter::{ObjectStoreAdapter, StorageAdapter};
pub use config::{StoreConfig, StoreSettings, DEFAULT_CONTAINER};
pub use error::{StorageError, StorageResult};
pub use memory_store::MemoryStore;
pub use planner::{plan_object_key, sanitize_file_name, FileKind};
pub use s3_store::{S3Config, S3Store};
pub use serve::{ContentServer, FoundObject, ServeOutcome, SERVE_PREFIX};
pub use store::{ObjectStore, OpenedObject, PutResult};
pub use types::{ByteRange, ByteStream, ResolvedRange, UploadRequest};
pub use urls::{key_from_url, public_url, CONTAINER_SEGMENTS};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{
        ByteRange, ByteStream, ObjectStore, ObjectStoreAdapter, ServeOutcome,
        StorageAdapter, StorageError, StorageResult, StoreConfig, UploadRequest,
    };
}
