use std::env;

use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region};
use aws_credential_types::Credentials;
use aws_sdk_s3::{primitives::ByteStream as AwsByteStream, Client};
use futures_util::StreamExt;
use tokio_util::io::ReaderStream;
use tracing::debug;

use crate::error::{StorageError, StorageResult};
use crate::store::{ObjectStore, OpenedObject, PutResult};
use crate::types::{ByteRange, ByteStream, ResolvedRange};

/// S3 connection settings from environment variables
#[derive(Debug)]
pub struct S3Config {
    pub region: String,
    pub access_key_id: String,
    pub secret_access_key: String,
    pub endpoint_url: String,
}

impl S3Config {
    pub fn from_env() -> StorageResult<Self> {
        fn get_env(key: &str) -> StorageResult<String> {
            env::var(key)
                .map_err(|_| StorageError::invalid(format!("{} environment variable required", key)))
        }

        Ok(Self {
            region: get_env("VELLUM_S3_REGION")?,
            access_key_id: get_env("VELLUM_S3_ACCESS_KEY_ID")?,
            secret_access_key: get_env("VELLUM_S3_SECRET_ACCESS_KEY")?,
            endpoint_url: get_env("VELLUM_S3_ENDPOINT_URL")?,
        })
    }
}

/// Object store backed by any S3-compatible service
#[derive(Clone)]
pub struct S3Store {
    client: Client,
    container: String,
    endpoint_url: String,
}

impl S3Store {
    /// Build a store for `container` from `VELLUM_S3_*` environment variables
    pub async fn from_env<S: Into<String>>(container: S) -> StorageResult<Self> {
        let config = S3Config::from_env()?;
        Ok(Self::new(config, container).await)
    }

    pub async fn new<S: Into<String>>(config: S3Config, container: S) -> Self {
        let endpoint_url = config.endpoint_url.trim_end_matches('/').to_string();
        let client = Self::create_client(config).await;

        Self {
            client,
            container: container.into(),
            endpoint_url,
        }
    }

    async fn create_client(config: S3Config) -> Client {
        let credentials = Credentials::new(
            config.access_key_id,
            config.secret_access_key,
            None,
            None,
            "vellum",
        );

        let aws_config = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(config.region))
            .credentials_provider(credentials)
            .endpoint_url(config.endpoint_url)
            .load()
            .await;

        Client::from_conf(
            aws_sdk_s3::config::Builder::from(&aws_config)
                // Keeps the container as the first URL path segment
                .force_path_style(true)
                .build(),
        )
    }

    /// URL the store itself serves `key` under (path-style)
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

    fn format_range(range: &ByteRange) -> String {
        match range.end {
            Some(end) => format!("bytes={}-{}", range.start, end),
            None => format!("bytes={}-", range.start),
        }
    }

    fn map_aws_error(err: impl std::error::Error + Send + Sync + 'static) -> StorageError {
        StorageError::backend(err)
    }
}

/// Parse a `Content-Range` response header (`bytes start-end/total`)
fn parse_content_range(value: &str) -> Option<ResolvedRange> {
    let spec = value.trim().strip_prefix("bytes ")?;
    let (range, total) = spec.split_once('/')?;
    let (start, end) = range.split_once('-')?;

    Some(ResolvedRange {
        start: start.trim().parse().ok()?,
        end: end.trim().parse().ok()?,
        total_size: total.trim().parse().ok()?,
    })
}

#[async_trait]
impl ObjectStore for S3Store {
    async fn exists(&self, key: &str) -> StorageResult<bool> {
        let result = self
            .client
            .head_object()
            .bucket(&self.container)
            .key(key)
            .send()
            .await;

        match result {
            Ok(_) => Ok(true),
            Err(err) => {
                if err.as_service_error().map(|e| e.is_not_found()).unwrap_or(false) {
                    Ok(false)
                } else {
                    Err(Self::map_aws_error(err))
                }
            }
        }
    }

    async fn ensure_container(&self) -> StorageResult<()> {
        let result = self
            .client
            .create_bucket()
            .bucket(&self.container)
            .send()
            .await;

        match result {
            Ok(_) => {
                debug!("Created container {}", self.container);
                Ok(())
            }
            Err(err) => {
                let already_there = err
                    .as_service_error()
                    .map(|e| e.is_bucket_already_owned_by_you() || e.is_bucket_already_exists())
                    .unwrap_or(false);

                if already_there {
                    Ok(())
                } else {
                    Err(Self::map_aws_error(err))
                }
            }
        }
    }

    async fn put(
        &self,
        key: &str,
        content_type: Option<&str>,
        stream: ByteStream,
    ) -> StorageResult<PutResult> {
        let data = Self::collect_stream(stream).await?;
        let size_bytes = data.len() as u64;
        let aws_stream = AwsByteStream::from(data);

        let mut request = self
            .client
            .put_object()
            .bucket(&self.container)
            .key(key)
            .body(aws_stream);

        if let Some(ct) = content_type {
            request = request.content_type(ct);
        }

        let result = request.send().await.map_err(Self::map_aws_error)?;
        debug!("Stored {} ({} bytes)", key, size_bytes);

        Ok(PutResult {
            native_url: self.native_url(key),
            size_bytes,
            etag: result.e_tag,
        })
    }

    async fn open(
        &self,
        key: &str,
        range: Option<ByteRange>,
    ) -> StorageResult<OpenedObject> {
        let mut request = self.client.get_object().bucket(&self.container).key(key);

        if let Some(ref range) = range {
            request = request.range(Self::format_range(range));
        }

        let result = request.send().await.map_err(|err| {
            if err.as_service_error().map(|e| e.is_no_such_key()).unwrap_or(false) {
                StorageError::not_found(key)
            } else {
                Self::map_aws_error(err)
            }
        })?;

        let content_length = result.content_length.unwrap_or(0) as u64;
        // Only a Content-Range response proves the store honored the range;
        // without one the caller treats the body as full content.
        let resolved = match (&range, result.content_range()) {
            (Some(_), Some(spec)) => parse_content_range(spec),
            _ => None,
        };

        let content_type = result.content_type.clone();
        let reader = result.body.into_async_read();
        let stream: ByteStream = Box::pin(ReaderStream::new(reader));

        Ok(OpenedObject {
            content_type,
            content_length,
            stream,
            range: resolved,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_range_headers() {
        assert_eq!(S3Store::format_range(&ByteRange::new(2, Some(5))), "bytes=2-5");
        assert_eq!(S3Store::format_range(&ByteRange::from_start(100)), "bytes=100-");
    }

    #[test]
    fn parses_content_range_headers() {
        assert_eq!(
            parse_content_range("bytes 2-5/10"),
            Some(ResolvedRange { start: 2, end: 5, total_size: 10 })
        );
        assert_eq!(parse_content_range("bytes */10"), None);
        assert_eq!(parse_content_range("items 2-5/10"), None);
        assert_eq!(parse_content_range("bytes 2-5"), None);
    }
}
