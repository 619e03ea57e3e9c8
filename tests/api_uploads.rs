//! Image upload integration tests
//!
//! The media host is replaced by `RecordingMediaStore`; these tests cover
//! what the server checks before handing a file over.

#![cfg(feature = "ssr")]

mod common;

use axum::http::StatusCode;
use axum_test::multipart::{MultipartForm, Part};
use pretty_assertions::assert_eq;

use common::*;
use quill::shared::envelope::Envelope;
use quill::shared::models::UploadedImage;

const PNG_HEADER: &[u8] = &[0x89, b'P', b'N', b'G', b'\r', b'\n', 0x1a, b'\n'];

fn image_form(file_name: &str, mime: &str, bytes: Vec<u8>) -> MultipartForm {
    MultipartForm::new().add_part("file", Part::bytes(bytes).file_name(file_name).mime_type(mime))
}

#[tokio::test]
async fn test_upload_returns_hosted_url() {
    let app = spawn_app().await;
    let user = create_unique_test_user(&app.pool, &app.config).await;

    let (header, value) = user.auth();
    let response = app
        .server
        .post("/api/uploads")
        .add_header(header, value)
        .multipart(image_form("cover.png", "image/png", PNG_HEADER.to_vec()))
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let image = response.json::<Envelope<UploadedImage>>().into_data().unwrap();
    assert_eq!(image.url, format!("{}/cover.png", MEDIA_BASE_URL));

    let uploads = app.media.uploads();
    assert_eq!(uploads.len(), 1);
    assert_eq!(uploads[0].content_type, "image/png");
    assert_eq!(uploads[0].bytes.as_ref(), PNG_HEADER);
}

#[tokio::test]
async fn test_upload_requires_sign_in() {
    let app = spawn_app().await;

    let response = app
        .server
        .post("/api/uploads")
        .multipart(image_form("cover.png", "image/png", PNG_HEADER.to_vec()))
        .await;

    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
    assert!(app.media.uploads().is_empty());
}

#[tokio::test]
async fn test_form_without_file_is_rejected() {
    let app = spawn_app().await;
    let user = create_unique_test_user(&app.pool, &app.config).await;

    let (header, value) = user.auth();
    let response = app
        .server
        .post("/api/uploads")
        .add_header(header, value)
        .multipart(MultipartForm::new().add_text("caption", "no file here"))
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert_failure(&response.json(), "No file uploaded");
}

#[tokio::test]
async fn test_non_image_is_rejected() {
    let app = spawn_app().await;
    let user = create_unique_test_user(&app.pool, &app.config).await;

    let (header, value) = user.auth();
    let response = app
        .server
        .post("/api/uploads")
        .add_header(header, value)
        .multipart(image_form("notes.txt", "text/plain", b"plain text".to_vec()))
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert_failure(&response.json(), "Only image files are allowed");
    assert!(app.media.uploads().is_empty());
}

#[tokio::test]
async fn test_oversized_image_is_rejected() {
    let app = spawn_app().await;
    let user = create_unique_test_user(&app.pool, &app.config).await;

    let (header, value) = user.auth();
    let response = app
        .server
        .post("/api/uploads")
        .add_header(header, value)
        .multipart(image_form("huge.png", "image/png", vec![0u8; 5 * 1024 * 1024 + 1]))
        .await;

    assert_eq!(response.status_code(), StatusCode::PAYLOAD_TOO_LARGE);
    assert_failure(&response.json(), "File too large (max 5 MB)");
}

#[tokio::test]
async fn test_unconfigured_media_host_is_unavailable() {
    let app = spawn_app_with_media(false).await;
    let user = create_unique_test_user(&app.pool, &app.config).await;

    let (header, value) = user.auth();
    let response = app
        .server
        .post("/api/uploads")
        .add_header(header, value)
        .multipart(image_form("cover.png", "image/png", PNG_HEADER.to_vec()))
        .await;

    assert_eq!(response.status_code(), StatusCode::SERVICE_UNAVAILABLE);
    assert_failure(&response.json(), "Image uploads are not configured");
}
