//! Upload Gateway: accepts category-partitioned uploads, keeps an
//! authoritative local copy, mirrors it to S3 and serves it back by a
//! generated identifier.

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod storage;

use config::ServerConfig;
use storage::{LocalStore, ObjectStore};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub local: Arc<LocalStore>,
    pub object_store: Arc<dyn ObjectStore>,
}

impl AppState {
    pub fn new(local: LocalStore, object_store: Arc<dyn ObjectStore>) -> Self {
        Self {
            local: Arc::new(local),
            object_store,
        }
    }
}

/// Build the HTTP router with all routes and middleware
pub fn create_router(state: AppState, server: &ServerConfig) -> Router {
    let mut router = Router::new()
        .route("/health", get(handlers::health_check))
        .route("/upload/:filetype/", post(handlers::file_upload::upload_file))
        .route("/upload/:filetype", post(handlers::file_upload::upload_file))
        .route(
            "/view/:filetype/:uuid_filename",
            get(handlers::file_retrieval::view_file),
        )
        .route(
            "/download/:filetype/:uuid_filename",
            get(handlers::file_retrieval::download_file),
        )
        .layer(DefaultBodyLimit::max(server.max_upload_bytes))
        .layer(TraceLayer::new_for_http());

    if server.enable_cors {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
        router = router.layer(cors);
    }

    router.with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ErrorResponse, UploadResponse};
    use crate::storage::{MockObjectStore, StorageError};
    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, Response, StatusCode},
    };
    use pretty_assertions::assert_eq;
    use std::path::Path;
    use tempfile::TempDir;
    use tower::ServiceExt;

    const BOUNDARY: &str = "upload-gateway-test-boundary";

    fn server_config(max_upload_bytes: usize) -> ServerConfig {
        ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 8000,
            max_upload_bytes,
            enable_cors: true,
        }
    }

    async fn test_app(store: MockObjectStore) -> (Router, TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let local = LocalStore::new(dir.path());
        local.ensure_partitions().await.unwrap();
        let state = AppState::new(local, Arc::new(store));
        (create_router(state, &server_config(1024 * 1024)), dir)
    }

    fn multipart_body(field: &str, filename: &str, data: &[u8]) -> Vec<u8> {
        let mut body = format!(
            "--{BOUNDARY}\r\n\
             Content-Disposition: form-data; name=\"{field}\"; filename=\"{filename}\"\r\n\
             Content-Type: application/octet-stream\r\n\r\n"
        )
        .into_bytes();
        body.extend_from_slice(data);
        body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
        body
    }

    fn upload_request(uri: &str, field: &str, filename: &str, data: &[u8]) -> Request<Body> {
        let body = multipart_body(field, filename, data);
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .header(header::CONTENT_LENGTH, body.len())
            .body(Body::from(body))
            .unwrap()
    }

    fn get_request(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    async fn body_bytes(response: Response<Body>) -> Vec<u8> {
        to_bytes(response.into_body(), usize::MAX).await.unwrap().to_vec()
    }

    async fn error_detail(response: Response<Body>) -> String {
        let error: ErrorResponse = serde_json::from_slice(&body_bytes(response).await).unwrap();
        error.detail
    }

    fn partition_is_empty(root: &Path, category: &str) -> bool {
        std::fs::read_dir(root.join(category)).unwrap().next().is_none()
    }

    #[tokio::test]
    async fn test_health_check() {
        let (app, _dir) = test_app(MockObjectStore::new()).await;

        let response = app.oneshot(get_request("/health")).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_bytes(response).await, b"Upload Gateway is healthy");
    }

    #[tokio::test]
    async fn test_upload_then_view_and_download() {
        let mut store = MockObjectStore::new();
        store
            .expect_upload()
            .withf(|path, key, content_type| {
                path.exists()
                    && key.starts_with("images/")
                    && key.ends_with(".png")
                    && content_type.to_string() == "image/png"
            })
            .times(1)
            .returning(|_, _, _| Ok(()));
        let (app, dir) = test_app(store).await;
        let data = b"0123456789";

        let response = app
            .clone()
            .oneshot(upload_request("/upload/images/", "file", "photo.PNG", data))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let uploaded: UploadResponse = serde_json::from_slice(&body_bytes(response).await).unwrap();
        assert!(uploaded.uuid.ends_with(".png"));
        assert_eq!(uploaded.message, "Upload successful");
        assert_eq!(
            std::fs::read(dir.path().join("images").join(&uploaded.uuid)).unwrap(),
            data
        );

        for _ in 0..2 {
            let response = app
                .clone()
                .oneshot(get_request(&format!("/view/images/{}", uploaded.uuid)))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK);
            assert_eq!(response.headers()[header::CONTENT_TYPE], "image/png");
            assert_eq!(response.headers()[header::CONTENT_DISPOSITION], "inline");
            assert_eq!(response.headers()[header::CONTENT_LENGTH], "10");
            assert_eq!(body_bytes(response).await, data);
        }

        let response = app
            .oneshot(get_request(&format!("/download/images/{}", uploaded.uuid)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "image/png");
        assert_eq!(
            response.headers()[header::CONTENT_DISPOSITION],
            format!("attachment; filename=\"{}\"", uploaded.uuid).as_str()
        );
        assert_eq!(body_bytes(response).await, data);
    }

    #[tokio::test]
    async fn test_every_allowed_extension_is_accepted() {
        let mut store = MockObjectStore::new();
        store.expect_upload().times(6).returning(|_, _, _| Ok(()));
        let (app, _dir) = test_app(store).await;

        let cases = [
            ("images", "a.jpg"),
            ("images", "a.jpeg"),
            ("images", "a.png"),
            ("images", "a.gif"),
            ("pdfs", "a.pdf"),
            ("html", "a.html"),
        ];
        for (category, filename) in cases {
            let response = app
                .clone()
                .oneshot(upload_request(
                    &format!("/upload/{category}/"),
                    "file",
                    filename,
                    b"content",
                ))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK, "{category}/{filename}");
            let uploaded: UploadResponse =
                serde_json::from_slice(&body_bytes(response).await).unwrap();
            let extension = filename.rsplit_once('.').unwrap().1;
            assert!(uploaded.uuid.ends_with(&format!(".{extension}")));
        }
    }

    #[tokio::test]
    async fn test_html_is_served_as_html() {
        let mut store = MockObjectStore::new();
        store
            .expect_upload()
            .withf(|_, key, content_type| {
                key.starts_with("html/") && content_type.to_string() == "text/html"
            })
            .times(1)
            .returning(|_, _, _| Ok(()));
        let (app, _dir) = test_app(store).await;

        let response = app
            .clone()
            .oneshot(upload_request("/upload/html", "file", "index.html", b"<p>hi</p>"))
            .await
            .unwrap();
        let uploaded: UploadResponse = serde_json::from_slice(&body_bytes(response).await).unwrap();

        let response = app
            .oneshot(get_request(&format!("/view/html/{}", uploaded.uuid)))
            .await
            .unwrap();
        assert_eq!(response.headers()[header::CONTENT_TYPE], "text/html");
        assert_eq!(body_bytes(response).await, b"<p>hi</p>");
    }

    #[tokio::test]
    async fn test_wrong_extension_rejected_before_write() {
        let mut store = MockObjectStore::new();
        store.expect_upload().times(0);
        let (app, dir) = test_app(store).await;

        let response = app
            .oneshot(upload_request("/upload/pdfs/", "file", "doc.txt", b"not a pdf"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(error_detail(response).await, "Only PDF files allowed.");
        assert!(partition_is_empty(dir.path(), "pdfs"));
    }

    #[tokio::test]
    async fn test_unknown_category_rejected() {
        let mut store = MockObjectStore::new();
        store.expect_upload().times(0);
        let (app, _dir) = test_app(store).await;

        let response = app
            .oneshot(upload_request("/upload/videos/", "file", "clip.png", b"data"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(error_detail(response).await.contains("videos"));
    }

    #[tokio::test]
    async fn test_missing_file_field() {
        let mut store = MockObjectStore::new();
        store.expect_upload().times(0);
        let (app, _dir) = test_app(store).await;

        let response = app
            .oneshot(upload_request("/upload/images/", "attachment", "a.png", b"data"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(error_detail(response).await, "No file provided");
    }

    #[tokio::test]
    async fn test_remote_failure_rolls_back_local_copy() {
        let mut store = MockObjectStore::new();
        store
            .expect_upload()
            .times(1)
            .returning(|_, _, _| Err(StorageError::Remote("bucket unreachable".to_string())));
        let (app, dir) = test_app(store).await;

        let response = app
            .oneshot(upload_request("/upload/pdfs/", "file", "report.pdf", b"%PDF-1.7"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            error_detail(response).await,
            "Upload failed: S3 upload failed: bucket unreachable"
        );
        assert!(partition_is_empty(dir.path(), "pdfs"));
    }

    #[tokio::test]
    async fn test_oversized_upload_rejected() {
        let mut store = MockObjectStore::new();
        store.expect_upload().times(0);
        let dir = tempfile::tempdir().unwrap();
        let local = LocalStore::new(dir.path());
        local.ensure_partitions().await.unwrap();
        let app = create_router(AppState::new(local, Arc::new(store)), &server_config(64));

        let response = app
            .oneshot(upload_request("/upload/images/", "file", "big.png", &[0u8; 1024]))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "application/json"
        );
        assert!(error_detail(response)
            .await
            .starts_with("Invalid multipart body:"));
        assert!(partition_is_empty(dir.path(), "images"));
    }

    #[tokio::test]
    async fn test_local_write_failure_skips_remote_upload() {
        let mut store = MockObjectStore::new();
        store.expect_upload().times(0);
        let dir = tempfile::tempdir().unwrap();
        // partitions never created, so the local write cannot open its file
        let root = dir.path().join("missing");
        let local = LocalStore::new(&root);
        let app = create_router(
            AppState::new(local, Arc::new(store)),
            &server_config(1024 * 1024),
        );

        let response = app
            .oneshot(upload_request("/upload/images/", "file", "photo.png", b"data"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(error_detail(response).await.starts_with("Upload failed:"));
        assert!(!root.exists());
    }

    #[tokio::test]
    async fn test_unknown_identifier_not_found() {
        let (app, _dir) = test_app(MockObjectStore::new()).await;

        let response = app
            .clone()
            .oneshot(get_request("/view/images/does-not-exist.png"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(error_detail(response).await, "File not found");

        let missing = handlers::validation::generate_identifier("png");
        let response = app
            .oneshot(get_request(&format!("/download/images/{missing}")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_identifier_cannot_escape_partition() {
        let (app, dir) = test_app(MockObjectStore::new()).await;
        std::fs::write(dir.path().join("secret.png"), b"secret").unwrap();

        let response = app
            .clone()
            .oneshot(get_request("/view/images/..%2Fsecret.png"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = app
            .oneshot(get_request("/view/other/secret.png"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_identifier_is_scoped_to_its_category() {
        let mut store = MockObjectStore::new();
        store.expect_upload().times(1).returning(|_, _, _| Ok(()));
        let (app, _dir) = test_app(store).await;

        let response = app
            .clone()
            .oneshot(upload_request("/upload/pdfs/", "file", "a.pdf", b"%PDF"))
            .await
            .unwrap();
        let uploaded: UploadResponse = serde_json::from_slice(&body_bytes(response).await).unwrap();

        let response = app
            .oneshot(get_request(&format!("/view/images/{}", uploaded.uuid)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
