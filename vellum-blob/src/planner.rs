use chrono::{DateTime, Datelike, Utc};

/// Media bucket an upload is routed into when the caller names no folder
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Images,
    Media,
    Files,
}

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp"];
const MEDIA_EXTENSIONS: &[&str] = &["mp4", "webm", "ogv", "m4a", "mp3", "wav", "ogg"];

impl FileKind {
    /// Classify a file name by the suffix after its final dot,
    /// case-insensitively. Anything unrecognized lands in `Files`.
    pub fn classify(name: &str) -> Self {
        let extension = name.rsplit_once('.').map(|(_, ext)| ext.to_ascii_lowercase());
        match extension.as_deref() {
            Some(ext) if IMAGE_EXTENSIONS.contains(&ext) => Self::Images,
            Some(ext) if MEDIA_EXTENSIONS.contains(&ext) => Self::Media,
            _ => Self::Files,
        }
    }

    /// Folder name for this kind
    pub fn folder(&self) -> &'static str {
        match self {
            Self::Images => "images",
            Self::Media => "media",
            Self::Files => "files",
        }
    }
}

/// Replace every run of whitespace or `%` characters with a single `_`,
/// keeping file names URL-safe without percent-encoding surprises.
pub fn sanitize_file_name(name: &str) -> String {
    let mut sanitized = String::with_capacity(name.len());
    let mut in_run = false;
    for c in name.chars() {
        if c.is_whitespace() || c == '%' {
            if !in_run {
                sanitized.push('_');
                in_run = true;
            }
        } else {
            sanitized.push(c);
            in_run = false;
        }
    }
    sanitized
}

/// Plan the storage key for an upload: `folder/YYYY/MM/name`.
///
/// The folder comes from the caller when supplied, otherwise from the file
/// type. When the folder already contains the current date path the date is
/// not inserted again, so re-saving a file into the folder it already lives
/// in yields the same key.
pub fn plan_object_key(name: &str, folder: Option<&str>, now: DateTime<Utc>) -> String {
    let folder = folder
        .map(|f| f.trim_matches('/'))
        .filter(|f| !f.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| FileKind::classify(name).folder().to_string());

    let date_path = format!("{:04}/{:02}", now.year(), now.month());
    let file_name = sanitize_file_name(name);

    if folder.contains(&date_path) {
        format!("{}/{}", folder, file_name)
    } else {
        format!("{}/{}/{}", folder, date_path, file_name)
    }
}
