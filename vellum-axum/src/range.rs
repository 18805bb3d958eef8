use vellum_blob::ByteRange;

/// Parse a single-range `Range` header value (`bytes=start-end`).
///
/// Multi-range and suffix (`bytes=-n`) forms are not parsed; returning
/// `None` makes the caller fall back to full content, which is always a
/// valid answer to a range request.
pub(crate) fn parse_range_header(value: &str) -> Option<ByteRange> {
    let spec = value.trim().strip_prefix("bytes=")?;
    if spec.contains(',') {
        return None;
    }

    let (start, end) = spec.split_once('-')?;
    let start: u64 = start.trim().parse().ok()?;

    let end = end.trim();
    if end.is_empty() {
        return Some(ByteRange::from_start(start));
    }

    let end: u64 = end.parse().ok()?;
    if end < start {
        return None;
    }
    Some(ByteRange::new(start, Some(end)))
}
