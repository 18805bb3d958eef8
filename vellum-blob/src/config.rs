use serde::Deserialize;
use serde_json::Value;

/// Container used when the host configuration names none
pub const DEFAULT_CONTAINER: &str = "ghost";

const DEFAULT_MAX_BLOB_BYTES: u64 = 5 * 1024 * 1024 * 1024; // 5GB

/// Configuration for a storage adapter
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Container (bucket) all objects live under
    pub container: String,

    /// CDN host that fronts the store; public URLs are rewritten onto it
    /// when set, and returned as native store URLs when absent
    pub cdn_host: Option<String>,

    /// Scheme used for CDN URLs
    pub use_https: bool,

    /// Absolute max size allowed for a single object (safety guard)
    pub max_blob_bytes: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            container: DEFAULT_CONTAINER.to_string(),
            cdn_host: None,
            use_https: false,
            max_blob_bytes: DEFAULT_MAX_BLOB_BYTES,
        }
    }
}

impl StoreConfig {
    /// Create a new config with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the container objects are stored in
    pub fn with_container<S: Into<String>>(mut self, container: S) -> Self {
        self.container = container.into();
        self
    }

    /// Front public URLs with a CDN host
    pub fn with_cdn_host<S: Into<String>>(mut self, host: S) -> Self {
        self.cdn_host = Some(host.into());
        self
    }

    /// Serve CDN URLs over https
    pub fn with_https(mut self) -> Self {
        self.use_https = true;
        self
    }

    /// Set max object size
    pub fn with_max_blob_bytes(mut self, bytes: u64) -> Self {
        self.max_blob_bytes = bytes;
        self
    }
}

/// Raw adapter settings as the host hands them over, usually parsed from a
/// JSON configuration block
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StoreSettings {
    pub container: Option<String>,
    pub cdn_url: Option<String>,
    /// Hosts persist this one as a string. Only the literal string "true"
    /// enables https; a JSON boolean does not.
    pub use_https: Option<Value>,
}

impl StoreSettings {
    /// Resolve raw host settings into an adapter configuration
    pub fn into_config(self) -> StoreConfig {
        let use_https = matches!(&self.use_https, Some(Value::String(flag)) if flag == "true");

        StoreConfig {
            container: self
                .container
                .filter(|c| !c.is_empty())
                .unwrap_or_else(|| DEFAULT_CONTAINER.to_string()),
            cdn_host: self.cdn_url.filter(|host| !host.is_empty()),
            use_https,
            max_blob_bytes: DEFAULT_MAX_BLOB_BYTES,
        }
    }
}
