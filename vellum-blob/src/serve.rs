use std::sync::Arc;

use tracing::{debug, error, warn};

use crate::error::StorageError;
use crate::store::ObjectStore;
use crate::types::{ByteRange, ByteStream, ResolvedRange};

/// Path prefix the host mounts served content under
pub const SERVE_PREFIX: &str = "/content/";

/// Terminal result of a serve request. Serving never propagates an error;
/// every failure path is folded into one of these and logged exactly once
/// at the point it is classified.
pub enum ServeOutcome {
    Found(FoundObject),
    NotFound { key: String },
    BadRequest { path: String },
    InternalError { cause: StorageError },
}

/// A resolved object ready to stream out
pub struct FoundObject {
    pub key: String,
    pub content_type: String,
    /// Length of the body that follows, range-adjusted when partial
    pub content_length: u64,
    pub stream: ByteStream,
    /// Present only when the store honored a requested range
    pub range: Option<ResolvedRange>,
}

/// Resolves request paths against an object store
pub struct ContentServer {
    store: Arc<dyn ObjectStore>,
}

impl ContentServer {
    pub fn new(store: Arc<dyn ObjectStore>) -> Self {
        Self { store }
    }

    /// Serve the object a request path points at.
    ///
    /// The serve prefix is optional: both `/content/images/a.png` and
    /// `images/a.png` resolve to the key `images/a.png`. The path is
    /// percent-decoded and screened for traversal before the store is
    /// consulted at all.
    pub async fn serve(&self, request_path: &str, range: Option<ByteRange>) -> ServeOutcome {
        let candidate = request_path
            .strip_prefix(SERVE_PREFIX)
            .unwrap_or(request_path);

        let key = match urlencoding::decode(candidate) {
            Ok(decoded) => decoded.into_owned(),
            Err(e) => {
                warn!("Rejected undecodable content path {:?}: {}", request_path, e);
                return ServeOutcome::BadRequest {
                    path: request_path.to_string(),
                };
            }
        };

        if key.split('/').any(|segment| segment == "..") {
            warn!("Rejected traversal in content path {:?}", request_path);
            return ServeOutcome::BadRequest {
                path: request_path.to_string(),
            };
        }

        match self.store.exists(&key).await {
            Ok(true) => {}
            Ok(false) => {
                debug!("Content miss for {}", key);
                return ServeOutcome::NotFound { key };
            }
            Err(cause) => {
                error!("Existence check failed for {}: {}", key, cause);
                return ServeOutcome::InternalError { cause };
            }
        }

        let opened = match self.store.open(&key, range).await {
            Ok(opened) => opened,
            // The object can vanish between the existence check and the
            // open; report that as a plain miss.
            Err(StorageError::NotFound { key }) => {
                debug!("Content vanished before open: {}", key);
                return ServeOutcome::NotFound { key };
            }
            Err(cause) => {
                error!("Open failed for {}: {}", key, cause);
                return ServeOutcome::InternalError { cause };
            }
        };

        let content_type = opened
            .content_type
            .filter(|ct| !ct.is_empty())
            .unwrap_or_else(|| content_type_for(&key));

        debug!("Serving {} ({} bytes, {})", key, opened.content_length, content_type);

        ServeOutcome::Found(FoundObject {
            key,
            content_type,
            content_length: opened.content_length,
            stream: opened.stream,
            range: opened.range,
        })
    }
}

/// Content type guessed from a key's file extension,
/// `application/octet-stream` when nothing matches
pub(crate) fn content_type_for(key: &str) -> String {
    mime_guess::from_path(key).first_or_octet_stream().to_string()
}
