use std::sync::Arc;

use axum::{
    body::Body,
    extract::{OriginalUri, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use futures::TryStreamExt;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use tracing::error;
use vellum_blob::{FoundObject, ServeOutcome, StorageAdapter};

use crate::range::parse_range_header;

/// Stored content never changes under its key, so it is cacheable for a year
const CACHE_CONTROL: &str = "public, max-age=31536000";

/// State for content routes
#[derive(Clone)]
pub struct ContentState {
    pub adapter: Arc<dyn StorageAdapter>,
}

/// Router serving stored content under `/content/`
pub fn content_router(adapter: Arc<dyn StorageAdapter>) -> Router<()> {
    let state = ContentState { adapter };

    Router::new()
        .route("/content/{*path}", get(serve_content))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .with_state(state)
}

async fn serve_content(
    State(state): State<ContentState>,
    OriginalUri(uri): OriginalUri,
    headers: HeaderMap,
) -> Response {
    let range = headers
        .get(header::RANGE)
        .and_then(|value| value.to_str().ok())
        .and_then(parse_range_header);

    match state.adapter.serve(uri.path(), range).await {
        ServeOutcome::Found(found) => found_response(found),
        ServeOutcome::NotFound { key } => {
            (StatusCode::NOT_FOUND, format!("File \"{}\" not found", key)).into_response()
        }
        ServeOutcome::BadRequest { .. } => {
            (StatusCode::BAD_REQUEST, "Bad Request: Invalid file path").into_response()
        }
        ServeOutcome::InternalError { .. } => {
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
        }
    }
}

fn found_response(found: FoundObject) -> Response {
    let FoundObject {
        key,
        content_type,
        content_length,
        stream,
        range,
    } = found;

    // Headers are already gone when a body stream fails mid-flight; all
    // that is left to do is log it and let the connection drop.
    let stream = stream.inspect_err(move |err| {
        error!("Streaming {} failed: {}", key, err);
    });

    let status = match range {
        Some(ref range) if !range.is_full_content() => StatusCode::PARTIAL_CONTENT,
        _ => StatusCode::OK,
    };

    let mut response = Response::new(Body::from_stream(stream));
    *response.status_mut() = status;

    let headers = response.headers_mut();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_str(&content_type)
            .unwrap_or_else(|_| HeaderValue::from_static("application/octet-stream")),
    );
    headers.insert(header::CONTENT_LENGTH, HeaderValue::from(content_length));
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static(CACHE_CONTROL));
    headers.insert(header::ACCEPT_RANGES, HeaderValue::from_static("bytes"));

    if status == StatusCode::PARTIAL_CONTENT {
        if let Some(range) = range {
            let content_range = format!("bytes {}-{}/{}", range.start, range.end, range.total_size);
            if let Ok(value) = HeaderValue::from_str(&content_range) {
                headers.insert(header::CONTENT_RANGE, value);
            }
        }
    }

    response
}
