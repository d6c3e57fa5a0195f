//! Router-level tests: control page, uploads and file serving.

use axum::{body::Body, Router};
use dirshare::{build_router, list_dir, AppState, ServerConfig, SharedState};
use http::{header, Method, Request, StatusCode};
use std::{fs, path::Path};
use tempfile::tempdir;
use tower::ServiceExt;

const BOUNDARY: &str = "----dirshare-test-boundary";

fn test_state(root: &Path) -> SharedState {
    AppState::new(
        ServerConfig::new("8080", root, vec!["192.168.1.20".to_string()]),
        10 * 1024 * 1024,
    )
}

fn app(state: &SharedState) -> Router {
    build_router(state.clone())
}

async fn body_string(response: axum::response::Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .method(Method::GET)
        .body(Body::empty())
        .unwrap()
}

fn control_form(body: &str) -> Request<Body> {
    Request::builder()
        .uri("/")
        .method(Method::POST)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn upload_request(field: &str, filename: &str, content: &[u8]) -> Request<Body> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"{field}\"; filename=\"{filename}\"\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
    body.extend_from_slice(content);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

    Request::builder()
        .uri("/upload")
        .method(Method::POST)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

#[tokio::test]
async fn root_page_lists_visible_entries_dirs_first() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("b.txt"), "b").unwrap();
    fs::write(dir.path().join("a.txt"), "a").unwrap();
    fs::create_dir(dir.path().join("z")).unwrap();
    fs::create_dir(dir.path().join("m")).unwrap();
    fs::create_dir(dir.path().join(".git")).unwrap();
    let state = test_state(dir.path());

    let response = app(&state).oneshot(get("/")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let html = body_string(response).await;
    let positions: Vec<usize> = ["href=\"/m\"", "href=\"/z\"", "href=\"/a.txt\"", "href=\"/b.txt\""]
        .iter()
        .map(|needle| html.find(needle).expect(needle))
        .collect();
    assert!(positions.windows(2).all(|w| w[0] < w[1]), "{positions:?}");
    assert!(!html.contains(".git"));
    assert!(html.contains("http://192.168.1.20:8080"));
}

#[tokio::test]
async fn file_paths_are_served_with_content_type() {
    let dir = tempdir().unwrap();
    fs::create_dir(dir.path().join("docs")).unwrap();
    fs::write(dir.path().join("docs/notes.txt"), "Hello, world!").unwrap();
    let state = test_state(dir.path());

    let response = app(&state).oneshot(get("/docs/notes.txt")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response.headers().get(header::CONTENT_TYPE).unwrap();
    assert!(content_type.to_str().unwrap().starts_with("text/plain"));
    assert!(response.headers().contains_key(header::LAST_MODIFIED));
    assert_eq!(body_string(response).await, "Hello, world!");
}

#[tokio::test]
async fn subdirectory_is_listed_with_nested_links() {
    let dir = tempdir().unwrap();
    fs::create_dir_all(dir.path().join("docs/inner")).unwrap();
    fs::write(dir.path().join("docs/readme.md"), "# hi").unwrap();
    let state = test_state(dir.path());

    let response = app(&state).oneshot(get("/docs")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let html = body_string(response).await;
    assert!(html.contains("href=\"/docs/inner\""));
    assert!(html.contains("href=\"/docs/readme.md\""));
}

#[tokio::test]
async fn missing_path_is_not_found() {
    let dir = tempdir().unwrap();
    let state = test_state(dir.path());

    let response = app(&state).oneshot(get("/nothing/here")).await.unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn traversal_in_request_path_stays_under_root() {
    let parent = tempdir().unwrap();
    let root = parent.path().join("root");
    fs::create_dir(&root).unwrap();
    fs::write(parent.path().join("secret.txt"), "nope").unwrap();
    let state = test_state(&root);

    let response = app(&state)
        .oneshot(get("/%2E%2E/secret.txt"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(!body_string(response).await.contains("nope"));
}

#[tokio::test]
async fn control_submission_changes_port_and_directory() {
    let dir = tempdir().unwrap();
    let other = tempdir().unwrap();
    fs::write(other.path().join("elsewhere.txt"), "x").unwrap();
    let state = test_state(dir.path());
    let body = format!(
        "port=9090&directory={}",
        urlencoding::encode(&other.path().display().to_string())
    );

    let response = app(&state).oneshot(control_form(&body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let html = body_string(response).await;
    assert!(html.contains("elsewhere.txt"));
    assert!(html.contains("http://192.168.1.20:9090"));

    let config = state.config.snapshot().await;
    assert_eq!(config.port, "9090");
    assert_eq!(config.source_dir, other.path());
}

#[tokio::test]
async fn invalid_directory_is_rejected_without_changes() {
    let dir = tempdir().unwrap();
    let state = test_state(dir.path());
    let missing = dir.path().join("missing").display().to_string();
    let body = format!("port=9999&directory={}", urlencoding::encode(&missing));

    let response = app(&state).oneshot(control_form(&body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let config = state.config.snapshot().await;
    assert_eq!(config.port, "8080");
    assert_eq!(config.source_dir, dir.path());
}

#[tokio::test]
async fn empty_control_submission_just_renders() {
    let dir = tempdir().unwrap();
    let state = test_state(dir.path());

    let response = app(&state)
        .oneshot(control_form("port=&directory="))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(state.config.snapshot().await.port, "8080");
}

#[tokio::test]
async fn upload_round_trip_shows_in_listing() {
    let dir = tempdir().unwrap();
    let state = test_state(dir.path());
    let content = b"uploaded bytes";

    let response = app(&state)
        .oneshot(upload_request("file", "report.txt", content))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers().get(header::LOCATION).unwrap(), "/");

    let entries = list_dir(dir.path(), ".").await.unwrap();
    let entry = entries.iter().find(|e| e.rel_path == "report.txt").unwrap();
    assert_eq!(entry.size, content.len() as u64);
}

#[tokio::test]
async fn traversal_upload_name_is_sanitized() {
    let parent = tempdir().unwrap();
    let root = parent.path().join("root");
    fs::create_dir(&root).unwrap();
    let state = test_state(&root);

    let response = app(&state)
        .oneshot(upload_request("file", "evil/../../name.txt", b"payload"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(fs::read(root.join("evil_____name.txt")).unwrap(), b"payload");
    assert!(!parent.path().join("name.txt").exists());
}

#[tokio::test]
async fn upload_goes_to_current_root_after_directory_change() {
    let dir = tempdir().unwrap();
    let other = tempdir().unwrap();
    let state = test_state(dir.path());
    let body = format!(
        "directory={}",
        urlencoding::encode(&other.path().display().to_string())
    );
    app(&state).oneshot(control_form(&body)).await.unwrap();

    let response = app(&state)
        .oneshot(upload_request("file", "moved.txt", b"1"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert!(other.path().join("moved.txt").is_file());
    assert!(!dir.path().join("moved.txt").exists());
}

#[tokio::test]
async fn upload_without_file_field_is_bad_request() {
    let dir = tempdir().unwrap();
    let state = test_state(dir.path());

    let response = app(&state)
        .oneshot(upload_request("attachment", "a.txt", b"x"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(!dir.path().join("a.txt").exists());
}

#[tokio::test]
async fn upload_requires_post() {
    let dir = tempdir().unwrap();
    let state = test_state(dir.path());

    let response = app(&state).oneshot(get("/upload")).await.unwrap();

    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}
