mod common;

use axum::body::{Body, Bytes};
use axum::http::{Method, Request, StatusCode};
use common::*;
use memory_share::services::catalog::{IncomingBinary, MediaUpdate};

const PNG: &[u8] = b"\x89PNG\r\n\x1a\nfake image bytes";
const MP4: &[u8] = b"\x00\x00\x00\x18ftypmp42 a somewhat longer fake video";

#[tokio::test]
async fn upload_then_list_round_trip() {
    let app = setup_test_app().await;
    let user_id = register_user(&app.router, "Ayu", "ayu@example.org").await;

    let (status, body) = upload(&app.router, user_id, "Sunset", "sunset.png", "image/png", "image", PNG).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["message"].is_string());

    let records = list(&app.router).await;
    assert_eq!(records.len(), 1);
    let sunset = find_by_label(&records, "Sunset");
    assert_eq!(sunset["fileType"], "image");
    assert_eq!(sunset["fileSize"], PNG.len() as u64);
    assert_eq!(sunset["userId"], user_id);

    let stored = sunset["fileName"].as_str().unwrap();
    assert!(stored.ends_with(".png"));
    assert_eq!(
        sunset["filePath"],
        format!("http://localhost:5000/uploads/{}", stored)
    );
    assert_eq!(app.stored_files(), vec![stored.to_string()]);

    // The binary is served back as uploaded.
    let request = Request::builder()
        .uri(format!("/uploads/{}", stored))
        .body(Body::empty())
        .unwrap();
    let (status, bytes) = send(&app.router, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(bytes, PNG);
}

#[tokio::test]
async fn list_is_newest_first() {
    let app = setup_test_app().await;

    for label in ["first", "second", "third"] {
        let (status, _) = upload(&app.router, 1, label, "a.jpg", "image/jpeg", "image", PNG).await;
        assert_eq!(status, StatusCode::OK);
    }

    let labels: Vec<String> = list(&app.router)
        .await
        .iter()
        .map(|r| r["fileLabel"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(labels, vec!["third", "second", "first"]);
}

#[tokio::test]
async fn kind_is_derived_from_content_type_when_not_declared() {
    let app = setup_test_app().await;
    let form = MultipartForm::new()
        .text("userId", "1")
        .text("fileName", "Clip")
        .file("file", "clip.mp4", "video/mp4", MP4);

    let (status, _) = send_multipart(&app.router, Method::POST, "/api/upload", form).await;
    assert_eq!(status, StatusCode::OK);

    let records = list(&app.router).await;
    assert_eq!(find_by_label(&records, "Clip")["fileType"], "video");
}

#[tokio::test]
async fn upload_without_file_is_rejected() {
    let app = setup_test_app().await;
    let form = MultipartForm::new()
        .text("userId", "1")
        .text("fileType", "image")
        .text("fileName", "Nothing");

    let (status, body) = send_multipart(&app.router, Method::POST, "/api/upload", form).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].is_string());
    assert!(list(&app.router).await.is_empty());
}

#[tokio::test]
async fn upload_with_invalid_fields_is_rejected() {
    let app = setup_test_app().await;

    let form = MultipartForm::new()
        .file("file", "a.png", "image/png", PNG)
        .text("fileType", "image");
    let (status, _) = send_multipart(&app.router, Method::POST, "/api/upload", form).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = upload(&app.router, 1, "Audio", "a.mp3", "audio/mpeg", "audio", PNG).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    assert!(app.stored_files().is_empty());
}

#[tokio::test]
async fn rename_only_update_keeps_binary() {
    let app = setup_test_app().await;
    upload(&app.router, 1, "Old Title", "photo.png", "image/png", "image", PNG).await;
    let before = list(&app.router).await[0].clone();
    let id = before["id"].as_i64().unwrap();

    let form = MultipartForm::new().text("fileName", "New Title");
    let (status, body) =
        send_multipart(&app.router, Method::PUT, &format!("/api/files/{}", id), form).await;
    assert_eq!(status, StatusCode::OK, "{}", body);

    let after = list(&app.router).await[0].clone();
    assert_eq!(after["fileLabel"], "New Title");
    assert_eq!(after["id"], before["id"]);
    assert_eq!(after["fileName"], before["fileName"]);
    assert_eq!(after["fileType"], before["fileType"]);
    assert_eq!(after["fileSize"], before["fileSize"]);
    assert_eq!(after["uploadDate"], before["uploadDate"]);
    assert_eq!(app.stored_files().len(), 1);
}

#[tokio::test]
async fn replace_update_swaps_binary_kind_and_size() {
    let app = setup_test_app().await;
    upload(&app.router, 1, "Old Title", "photo.png", "image/png", "image", PNG).await;
    let before = list(&app.router).await[0].clone();
    let id = before["id"].as_i64().unwrap();

    let form = MultipartForm::new()
        .text("fileName", "New Title")
        .file("file", "clip.mp4", "video/mp4", MP4);
    let (status, _) =
        send_multipart(&app.router, Method::PUT, &format!("/api/files/{}", id), form).await;
    assert_eq!(status, StatusCode::OK);

    let after = list(&app.router).await[0].clone();
    assert_eq!(after["id"], before["id"]);
    assert_eq!(after["fileLabel"], "New Title");
    assert_eq!(after["fileType"], "video");
    assert_eq!(after["fileSize"], MP4.len() as u64);
    assert_ne!(after["fileName"], before["fileName"]);
    assert_eq!(after["uploadDate"], before["uploadDate"]);

    // Only the replacement binary is left behind.
    let stored = after["fileName"].as_str().unwrap().to_string();
    assert!(stored.ends_with(".mp4"));
    assert_eq!(app.stored_files(), vec![stored]);
}

#[tokio::test]
async fn update_of_unknown_id_is_not_found() {
    let app = setup_test_app().await;

    let form = MultipartForm::new()
        .text("fileName", "Ghost")
        .file("file", "ghost.png", "image/png", PNG);
    let (status, body) = send_multipart(&app.router, Method::PUT, "/api/files/404", form).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["message"].is_string());
    // The replacement that was already stored is cleaned up.
    assert!(app.stored_files().is_empty());
}

#[tokio::test]
async fn delete_then_list_and_repeat_delete() {
    let app = setup_test_app().await;
    upload(&app.router, 1, "Keep", "keep.png", "image/png", "image", PNG).await;
    upload(&app.router, 1, "Drop", "drop.png", "image/png", "image", PNG).await;

    let records = list(&app.router).await;
    let drop_id = find_by_label(&records, "Drop")["id"].as_i64().unwrap();
    let keep_name = find_by_label(&records, "Keep")["fileName"].as_str().unwrap().to_string();

    let (status, body) = delete(&app.router, &format!("/api/files/{}", drop_id)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Deleted");

    let records = list(&app.router).await;
    assert!(records.iter().all(|r| r["id"] != drop_id));
    assert_eq!(records.len(), 1);
    assert_eq!(app.stored_files(), vec![keep_name]);

    // Deleting again reports success too.
    let (status, _) = delete(&app.router, &format!("/api/files/{}", drop_id)).await;
    assert_eq!(status, StatusCode::OK);

    // A deleted record can no longer be edited.
    let form = MultipartForm::new().text("fileName", "Back");
    let (status, _) =
        send_multipart(&app.router, Method::PUT, &format!("/api/files/{}", drop_id), form).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn list_failure_answers_with_empty_array() {
    let app = setup_test_app().await;
    upload(&app.router, 1, "Sunset", "sunset.png", "image/png", "image", PNG).await;

    app.state.db.clone().close().await.unwrap();

    let (status, body) = get_json(&app.router, "/api/files").await;
    assert!(status.is_server_error());
    assert_eq!(body, serde_json::json!([]));
}

#[tokio::test]
async fn upload_is_discarded_when_the_record_cannot_be_saved() {
    let app = setup_test_app().await;
    app.state.db.clone().close().await.unwrap();

    let (status, body) = upload(&app.router, 1, "Sunset", "sunset.png", "image/png", "image", PNG).await;
    assert!(status.is_server_error());
    assert!(body["message"].is_string());
    assert!(app.stored_files().is_empty());
}

#[tokio::test]
async fn replacement_is_discarded_when_the_record_cannot_be_saved() {
    let app = setup_test_app().await;
    upload(&app.router, 1, "Old Title", "photo.png", "image/png", "image", PNG).await;
    let before = list(&app.router).await[0].clone();
    let id = before["id"].as_i64().unwrap();
    let original = before["fileName"].as_str().unwrap().to_string();

    app.state.db.clone().close().await.unwrap();

    let form = MultipartForm::new()
        .text("fileName", "New Title")
        .file("file", "clip.mp4", "video/mp4", MP4);
    let (status, body) =
        send_multipart(&app.router, Method::PUT, &format!("/api/files/{}", id), form).await;

    assert!(status.is_server_error());
    assert!(body["message"].is_string());
    assert_eq!(app.stored_files(), vec![original]);
}

#[tokio::test]
async fn concurrent_replaces_leave_only_the_current_binary() {
    let app = setup_test_app().await;
    upload(&app.router, 1, "Clip", "clip.png", "image/png", "image", PNG).await;
    let id = list(&app.router).await[0]["id"].as_i64().unwrap() as i32;

    let replace = |name: &str| MediaUpdate {
        label: Some("Clip".to_string()),
        binary: Some(IncomingBinary {
            original_name: name.to_string(),
            content_type: "video/mp4".to_string(),
            data: Bytes::from_static(MP4),
        }),
    };

    let (a, b) = tokio::join!(
        app.state.catalog.update(id, replace("a.mp4")),
        app.state.catalog.update(id, replace("b.mp4")),
    );
    a.unwrap();
    b.unwrap();

    let records = list(&app.router).await;
    assert_eq!(records.len(), 1);
    let current = records[0]["fileName"].as_str().unwrap().to_string();
    assert!(current.ends_with(".mp4"));
    assert_eq!(app.stored_files(), vec![current]);
}

#[tokio::test]
async fn upload_over_the_limit_is_payload_too_large() {
    let app = setup_test_app_with(|config| config.max_upload_bytes = 1024).await;
    let big = vec![7u8; 256 * 1024];

    let (status, body) = upload(&app.router, 1, "Huge", "huge.png", "image/png", "image", &big).await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert!(body["message"].is_string());
    assert!(app.stored_files().is_empty());
}
