use bytes::Bytes;
use futures_core::Stream;
use std::path::PathBuf;
use std::pin::Pin;

/// Stream of bytes for object content
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, std::io::Error>> + Send>>;

/// An incoming file to store, staged on local disk by the host
#[derive(Debug, Clone)]
pub struct UploadRequest {
    /// Original file name as uploaded, extension included
    pub name: String,
    /// Where the host staged the file contents
    pub local_path: PathBuf,
    /// Size reported by the host, if it knows one
    pub size_bytes: Option<u64>,
    /// Target folder override; routed by file type when absent
    pub folder: Option<String>,
}

impl UploadRequest {
    pub fn new<S: Into<String>, P: Into<PathBuf>>(name: S, local_path: P) -> Self {
        Self {
            name: name.into(),
            local_path: local_path.into(),
            size_bytes: None,
            folder: None,
        }
    }

    pub fn with_size_bytes(mut self, size: u64) -> Self {
        self.size_bytes = Some(size);
        self
    }

    pub fn with_folder<S: Into<String>>(mut self, folder: S) -> Self {
        self.folder = Some(folder.into());
        self
    }
}

/// Byte range for partial content requests
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ByteRange {
    pub start: u64,
    pub end: Option<u64>, // None means "to end of file"
}

impl ByteRange {
    pub fn new(start: u64, end: Option<u64>) -> Self {
        Self { start, end }
    }

    pub fn from_start(start: u64) -> Self {
        Self { start, end: None }
    }

    pub fn is_valid(&self, total_size: u64) -> bool {
        if self.start >= total_size {
            return false;
        }
        if let Some(end) = self.end {
            end >= self.start && end < total_size
        } else {
            true
        }
    }
}

/// Range information for partial content
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedRange {
    pub start: u64,
    pub end: u64,
    pub total_size: u64,
}

impl ResolvedRange {
    /// Resolve a requested range against the object size. The range must
    /// already have passed `ByteRange::is_valid` for this size.
    pub fn from_request(range: &ByteRange, total_size: u64) -> Self {
        let end = range.end.unwrap_or(total_size - 1).min(total_size - 1);
        Self {
            start: range.start,
            end,
            total_size,
        }
    }

    pub fn content_length(&self) -> u64 {
        self.end - self.start + 1
    }

    pub fn is_full_content(&self) -> bool {
        self.start == 0 && self.end == self.total_size - 1
    }
}
