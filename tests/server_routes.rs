//! HTTP-level tests for the viewer router.
//!
//! Content is served from a temporary directory; Etherpad is configured but
//! never reached by these tests.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use http_body_util::BodyExt;
use tower::ServiceExt;

use pad_viewer::config::EtherpadConfig;
use pad_viewer::server::{build_router, AppState};
use pad_viewer::source::{BackendContentSource, EtherpadClient, LocalFileStore};
use pad_viewer::ViewerConfig;

// ── Test app builder ───────────────────────────────────────────

fn build_test_app(root: &std::path::Path) -> axum::Router {
    let files = LocalFileStore::new(root);
    let etherpad = EtherpadClient::new(&EtherpadConfig::default()).expect("etherpad client");
    let source = Arc::new(BackendContentSource::new(files, etherpad));

    let mut config = ViewerConfig::default();
    config.content.root = root.to_path_buf();
    build_router(AppState::new(config, source).expect("app state"))
}

async fn get(app: &axum::Router, uri: &str) -> (StatusCode, String) {
    let response = app
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, String::from_utf8(bytes.to_vec()).unwrap())
}

// ── Tests ──────────────────────────────────────────────────────

#[tokio::test]
async fn test_health() {
    let dir = tempfile::tempdir().unwrap();
    let app = build_test_app(dir.path());

    let (status, body) = get(&app, "/health").await;
    assert_eq!(status, StatusCode::OK);
    let json: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["status"], "ok");
}

#[tokio::test]
async fn test_file_endpoint() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir_all(dir.path().join("docs")).unwrap();
    std::fs::write(dir.path().join("docs/intro.md"), "# Intro\n").unwrap();
    let app = build_test_app(dir.path());

    let (status, body) = get(&app, "/api/files/file?filePath=docs%2Fintro.md").await;
    assert_eq!(status, StatusCode::OK);
    let json: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["content"], "# Intro\n");

    // Missing files have no content field
    let (status, body) = get(&app, "/api/files/file?filePath=missing.md").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "{}");

    let (status, _) = get(&app, "/api/files/file?filePath=..%2Fsecret").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_unknown_source_shows_error_page() {
    let dir = tempfile::tempdir().unwrap();
    let app = build_test_app(dir.path());

    let (status, body) = get(&app, "/output/ftp/notes").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("Something went wrong:"));
    assert!(body.contains("Unknown source &#x27;ftp&#x27;"));
    assert!(body.contains("Try again"));
}

#[tokio::test]
async fn test_output_page_mounts_view() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("slides.md"), "# Slides\n").unwrap();
    let app = build_test_app(dir.path());

    let (status, body) = get(&app, "/output/file/slides.md?format=ppt").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.starts_with("<!DOCTYPE html>"));
    assert!(body.contains("data-format=\"ppt\""));
    assert!(body.contains("data-generation-url=\"/api/view/generation?view&#x3D;file%2Fslides.md%3Fformat%3Dppt\""));

    // The page polls this endpoint for its view
    let (status, body) = get(
        &app,
        "/api/view/generation?view=file%2Fslides.md%3Fformat%3Dppt",
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let json: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert!(json["generation"].is_u64());
    assert_eq!(json["revision"], 0);
}

#[tokio::test]
async fn test_generation_for_unknown_view() {
    let dir = tempfile::tempdir().unwrap();
    let app = build_test_app(dir.path());

    let (status, _) = get(&app, "/api/view/generation?view=pad%2Fnobody").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_retry_unknown_view() {
    let dir = tempfile::tempdir().unwrap();
    let app = build_test_app(dir.path());

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/view/retry?view=pad%2Fnobody")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_print_stylesheet() {
    let dir = tempfile::tempdir().unwrap();
    let app = build_test_app(dir.path());

    let response = app
        .oneshot(Request::builder().uri("/pdf.css").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "text/css");
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    assert!(String::from_utf8_lossy(&bytes).contains("@page"));
}
