use thiserror::Error;

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors that can occur during storage operations
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Error parsing URL \"{input}\": {reason}")]
    InvalidUrl { input: String, reason: String },

    #[error("Bad Request: Invalid file path: {path}")]
    BadRequest { path: String },

    #[error("File \"{key}\" not found")]
    NotFound { key: String },

    #[error("Invalid request: {message}")]
    Invalid { message: String },

    #[error("Upload of \"{key}\" failed: {source}")]
    Upload {
        key: String,
        #[source]
        source: Box<StorageError>,
    },

    #[error("Could not read \"{url}\": server responded with status {status}")]
    FetchStatus { url: String, status: u16 },

    #[error("Could not read \"{url}\": {source}")]
    Fetch {
        url: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Storage backend error: {source}")]
    Backend {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

impl StorageError {
    /// Create a backend error from any error type
    pub fn backend<E>(error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Backend {
            source: Box::new(error),
        }
    }

    /// Create an invalid request error
    pub fn invalid<S: Into<String>>(message: S) -> Self {
        Self::Invalid {
            message: message.into(),
        }
    }

    /// Create a not found error
    pub fn not_found<S: Into<String>>(key: S) -> Self {
        Self::NotFound { key: key.into() }
    }

    /// Create a bad request error for a rejected request path
    pub fn bad_request<S: Into<String>>(path: S) -> Self {
        Self::BadRequest { path: path.into() }
    }

    /// Create an invalid URL error, preserving the offending input
    pub fn invalid_url<S, E>(input: S, reason: E) -> Self
    where
        S: Into<String>,
        E: std::fmt::Display,
    {
        Self::InvalidUrl {
            input: input.into(),
            reason: reason.to_string(),
        }
    }

    /// Wrap a failure that happened while storing `key`
    pub fn upload<S: Into<String>>(key: S, source: StorageError) -> Self {
        Self::Upload {
            key: key.into(),
            source: Box::new(source),
        }
    }

    /// Create a fetch error for a URL that could not be read
    pub fn fetch<S, E>(url: S, error: E) -> Self
    where
        S: Into<String>,
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Fetch {
            url: url.into(),
            source: Box::new(error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_url_names_the_offending_input() {
        let err = StorageError::invalid_url("http://[broken", "relative URL without a base");
        assert!(err.to_string().contains("http://[broken"));
    }

    #[test]
    fn upload_preserves_the_underlying_cause() {
        let cause = StorageError::invalid("size exceeds maximum");
        let err = StorageError::upload("images/2024/03/a.png", cause);
        let rendered = err.to_string();
        assert!(rendered.contains("images/2024/03/a.png"));
        assert!(rendered.contains("size exceeds maximum"));
    }
}
