#![allow(dead_code)]

use axum::body::{to_bytes, Body};
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use memory_share::config::Config;
use memory_share::routes::{create_routes, AppState};
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub temp: TempDir,
}

impl TestApp {
    pub fn upload_dir(&self) -> std::path::PathBuf {
        self.temp.path().join("uploads")
    }

    pub fn stored_files(&self) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(self.upload_dir())
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }
}

/// Fresh SQLite database and upload directory, migrated and wired into the router.
pub async fn setup_test_app() -> TestApp {
    setup_test_app_with(|_| {}).await
}

pub async fn setup_test_app_with(configure: impl FnOnce(&mut Config)) -> TestApp {
    let temp = tempfile::tempdir().unwrap();
    let db_url = format!("sqlite://{}?mode=rwc", temp.path().join("test.db").display());
    let mut config = Config::local(db_url, temp.path().join("uploads"));
    configure(&mut config);

    let state = memory_share::build_state(config).await.unwrap();
    let router = create_routes(state.clone());

    TestApp {
        router,
        state,
        temp,
    }
}

pub async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Vec<u8>) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, body.to_vec())
}

pub async fn send_json(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let (status, body) = send(router, request).await;
    let json = serde_json::from_slice(&body).unwrap_or(Value::Null);
    (status, json)
}

pub async fn get_json(router: &Router, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    send_json(router, request).await
}

pub async fn post_json(router: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send_json(router, request).await
}

pub async fn delete(router: &Router, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(Method::DELETE)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    send_json(router, request).await
}

pub async fn send_multipart(
    router: &Router,
    method: Method,
    uri: &str,
    form: MultipartForm,
) -> (StatusCode, Value) {
    let (content_type, body) = form.finish();
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", content_type)
        .body(Body::from(body))
        .unwrap();
    send_json(router, request).await
}

/// Minimal multipart/form-data encoder for building requests by hand.
pub struct MultipartForm {
    boundary: String,
    body: Vec<u8>,
}

impl MultipartForm {
    pub fn new() -> Self {
        Self {
            boundary: "memory-share-test-boundary".to_string(),
            body: Vec::new(),
        }
    }

    pub fn text(mut self, name: &str, value: &str) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
                self.boundary, name, value
            )
            .as_bytes(),
        );
        self
    }

    pub fn file(mut self, name: &str, file_name: &str, content_type: &str, data: &[u8]) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: {}\r\n\r\n",
                self.boundary, name, file_name, content_type
            )
            .as_bytes(),
        );
        self.body.extend_from_slice(data);
        self.body.extend_from_slice(b"\r\n");
        self
    }

    pub fn finish(mut self) -> (String, Vec<u8>) {
        self.body
            .extend_from_slice(format!("--{}--\r\n", self.boundary).as_bytes());
        (
            format!("multipart/form-data; boundary={}", self.boundary),
            self.body,
        )
    }
}

/// Registers a user and returns its id.
pub async fn register_user(router: &Router, name: &str, email: &str) -> i64 {
    let (status, _) = post_json(
        router,
        "/api/register",
        serde_json::json!({ "name": name, "email": email, "password": "secret" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = post_json(
        router,
        "/api/login",
        serde_json::json!({ "email": email, "password": "secret" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    body["user"]["id"].as_i64().unwrap()
}

pub async fn upload(
    router: &Router,
    user_id: i64,
    label: &str,
    file_name: &str,
    content_type: &str,
    kind: &str,
    data: &[u8],
) -> (StatusCode, Value) {
    let form = MultipartForm::new()
        .file("file", file_name, content_type, data)
        .text("userId", &user_id.to_string())
        .text("fileType", kind)
        .text("fileName", label);
    send_multipart(router, Method::POST, "/api/upload", form).await
}

pub async fn list(router: &Router) -> Vec<Value> {
    let (status, body) = get_json(router, "/api/files").await;
    assert_eq!(status, StatusCode::OK);
    body.as_array().cloned().unwrap()
}

pub fn find_by_label<'a>(records: &'a [Value], label: &str) -> &'a Value {
    records
        .iter()
        .find(|r| r["fileLabel"] == label)
        .unwrap_or_else(|| panic!("no record labelled {}", label))
}
