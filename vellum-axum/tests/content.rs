use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, HeaderValue, Request};
use http_body_util::BodyExt;
use tower::ServiceExt;
use vellum_axum::content_router;
use vellum_blob::{
    ByteRange, ByteStream, MemoryStore, ObjectStore, ObjectStoreAdapter, OpenedObject, PutResult,
    StorageAdapter, StorageError, StorageResult, StoreConfig,
};

struct FailingStore;

#[async_trait::async_trait]
impl ObjectStore for FailingStore {
    async fn exists(&self, _key: &str) -> StorageResult<bool> {
        Err(StorageError::backend(std::io::Error::new(
            std::io::ErrorKind::Other,
            "connection refused",
        )))
    }

    async fn ensure_container(&self) -> StorageResult<()> {
        Ok(())
    }

    async fn put(
        &self,
        _key: &str,
        _content_type: Option<&str>,
        _stream: ByteStream,
    ) -> StorageResult<PutResult> {
        unreachable!("serving never writes")
    }

    async fn open(
        &self,
        _key: &str,
        _range: Option<ByteRange>,
    ) -> StorageResult<OpenedObject> {
        unreachable!("existence check fails first")
    }
}

fn seeded_router() -> axum::Router {
    let store = MemoryStore::new("ghost");
    store.insert("images/2024/03/a.png", Some("image/png"), &b"pngdata"[..]);
    store.insert("media/2024/03/clip.mp4", Some("video/mp4"), &b"0123456789"[..]);
    store.insert("files/2024/03/annual report.pdf", None, &b"pdf"[..]);

    let adapter: Arc<dyn StorageAdapter> =
        Arc::new(ObjectStoreAdapter::new(store, StoreConfig::new()));
    content_router(adapter)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn body_of(res: axum::response::Response) -> Vec<u8> {
    res.into_body().collect().await.unwrap().to_bytes().to_vec()
}

#[tokio::test]
async fn serves_stored_content_with_cache_headers() {
    let res = seeded_router()
        .oneshot(get("/content/images/2024/03/a.png"))
        .await
        .unwrap();

    assert_eq!(res.status().as_u16(), 200);
    assert_eq!(res.headers().get(header::CONTENT_TYPE).unwrap(), "image/png");
    assert_eq!(res.headers().get(header::CONTENT_LENGTH).unwrap(), "7");
    assert_eq!(
        res.headers().get(header::CACHE_CONTROL).unwrap(),
        "public, max-age=31536000"
    );
    assert_eq!(res.headers().get(header::ACCEPT_RANGES).unwrap(), "bytes");
    assert!(res.headers().get("x-request-id").is_some());
    assert_eq!(body_of(res).await, b"pngdata");
}

#[tokio::test]
async fn request_id_is_preserved_when_provided() {
    let provided = HeaderValue::from_static("req-test-123");

    let res = seeded_router()
        .oneshot(
            Request::builder()
                .uri("/content/images/2024/03/a.png")
                .header("x-request-id", provided.clone())
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(res.headers().get("x-request-id").unwrap(), &provided);
}

#[tokio::test]
async fn missing_files_are_404_with_the_key_named() {
    let res = seeded_router()
        .oneshot(get("/content/images/2024/03/missing.png"))
        .await
        .unwrap();

    assert_eq!(res.status().as_u16(), 404);
    assert_eq!(
        body_of(res).await,
        b"File \"images/2024/03/missing.png\" not found"
    );
}

#[tokio::test]
async fn traversal_is_rejected_with_400() {
    let router = seeded_router();

    let res = router
        .clone()
        .oneshot(get("/content/../../etc/passwd"))
        .await
        .unwrap();
    assert_eq!(res.status().as_u16(), 400);
    assert_eq!(body_of(res).await, b"Bad Request: Invalid file path");

    let res = router
        .oneshot(get("/content/%2e%2e/secret.txt"))
        .await
        .unwrap();
    assert_eq!(res.status().as_u16(), 400);
}

#[tokio::test]
async fn range_requests_get_partial_content() {
    let res = seeded_router()
        .oneshot(
            Request::builder()
                .uri("/content/media/2024/03/clip.mp4")
                .header(header::RANGE, "bytes=2-5")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(res.status().as_u16(), 206);
    assert_eq!(res.headers().get(header::CONTENT_RANGE).unwrap(), "bytes 2-5/10");
    assert_eq!(res.headers().get(header::CONTENT_LENGTH).unwrap(), "4");
    assert_eq!(body_of(res).await, b"2345");
}

#[tokio::test]
async fn full_coverage_ranges_collapse_to_plain_ok() {
    let res = seeded_router()
        .oneshot(
            Request::builder()
                .uri("/content/media/2024/03/clip.mp4")
                .header(header::RANGE, "bytes=0-")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(res.status().as_u16(), 200);
    assert!(res.headers().get(header::CONTENT_RANGE).is_none());
    assert_eq!(body_of(res).await, b"0123456789");
}

#[tokio::test]
async fn unsatisfiable_ranges_fall_back_to_full_content() {
    let res = seeded_router()
        .oneshot(
            Request::builder()
                .uri("/content/media/2024/03/clip.mp4")
                .header(header::RANGE, "bytes=999-")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(res.status().as_u16(), 200);
    assert_eq!(res.headers().get(header::CONTENT_LENGTH).unwrap(), "10");
}

#[tokio::test]
async fn percent_encoded_paths_resolve() {
    let res = seeded_router()
        .oneshot(get("/content/files/2024/03/annual%20report.pdf"))
        .await
        .unwrap();

    assert_eq!(res.status().as_u16(), 200);
    assert_eq!(
        res.headers().get(header::CONTENT_TYPE).unwrap(),
        "application/pdf"
    );
}

#[tokio::test]
async fn store_failures_are_500() {
    let adapter: Arc<dyn StorageAdapter> =
        Arc::new(ObjectStoreAdapter::new(FailingStore, StoreConfig::new()));

    let res = content_router(adapter)
        .oneshot(get("/content/images/2024/03/a.png"))
        .await
        .unwrap();

    assert_eq!(res.status().as_u16(), 500);
    assert_eq!(body_of(res).await, b"Internal Server Error");
}

#[tokio::test]
async fn read_fetches_bytes_over_http() {
    let store = MemoryStore::new("ghost");
    store.insert("files/2024/03/notes.txt", Some("text/plain"), &b"remote bytes"[..]);

    let adapter: Arc<dyn StorageAdapter> =
        Arc::new(ObjectStoreAdapter::new(store, StoreConfig::new()));
    let router = content_router(Arc::clone(&adapter));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    let url = format!("http://{}/content/files/2024/03/notes.txt", addr);
    let bytes = adapter.read(&url).await.unwrap();
    assert_eq!(&bytes[..], b"remote bytes");

    let missing = format!("http://{}/content/files/2024/03/other.txt", addr);
    let err = adapter.read(&missing).await.unwrap_err();
    assert!(matches!(err, StorageError::FetchStatus { status: 404, .. }));
}
