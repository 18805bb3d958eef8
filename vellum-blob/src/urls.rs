use url::Url;

use crate::config::StoreConfig;
use crate::error::{StorageError, StorageResult};

/// Leading path segments of a public URL that belong to the store, not to
/// the object key. The first segment is always the container name; keys
/// planned by this crate never contain the container as a segment, which is
/// what makes stripping by count safe.
pub const CONTAINER_SEGMENTS: usize = 1;

/// Public URL for an object the store reported at `native_url`.
///
/// Without a CDN the native URL is returned untouched. With one, the native
/// scheme and host are discarded and the path is recomposed onto the CDN
/// host, which fronts the same path hierarchy as the store itself.
pub fn public_url(native_url: &str, config: &StoreConfig) -> StorageResult<String> {
    let cdn_host = match config.cdn_host.as_deref() {
        Some(host) => host,
        None => return Ok(native_url.to_string()),
    };

    let parsed = Url::parse(native_url)
        .map_err(|e| StorageError::invalid_url(native_url, e))?;
    let scheme = if config.use_https { "https" } else { "http" };

    Ok(format!("{}://{}{}", scheme, cdn_host, parsed.path()))
}

/// Extract the storage key from a public URL.
///
/// The path is percent-decoded, then the leading container segment is
/// dropped. Malformed URLs fail with the offending input preserved in the
/// error.
pub fn key_from_url(url: &str) -> StorageResult<String> {
    let parsed = Url::parse(url).map_err(|e| StorageError::invalid_url(url, e))?;
    let path = urlencoding::decode(parsed.path())
        .map_err(|e| StorageError::invalid_url(url, e))?;

    Ok(strip_store_segments(&path))
}

fn strip_store_segments(path: &str) -> String {
    let mut rest = path.trim_start_matches('/');
    for _ in 0..CONTAINER_SEGMENTS {
        rest = match rest.split_once('/') {
            Some((_, tail)) => tail,
            None => "",
        };
    }
    rest.to_string()
}
