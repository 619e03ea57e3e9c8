//! Category API integration tests

#![cfg(feature = "ssr")]

mod common;

use axum::http::StatusCode;
use pretty_assertions::assert_eq;
use serde_json::json;

use common::*;
use quill::shared::envelope::Envelope;
use quill::shared::models::Category;

#[tokio::test]
async fn test_admin_creates_category_with_slug() {
    let app = spawn_app().await;
    let admin = create_test_admin(&app.pool, &app.config).await;

    let category = create_category(&app.server, &admin, "Web Development").await;

    assert_eq!(category.name, "Web Development");
    assert_eq!(category.slug, "web-development");
    assert_eq!(category.description, "All about Web Development");
}

#[tokio::test]
async fn test_regular_users_cannot_manage_categories() {
    let app = spawn_app().await;
    let user = create_unique_test_user(&app.pool, &app.config).await;

    let (header, value) = user.auth();
    let response = app
        .server
        .post("/api/categories")
        .add_header(header, value)
        .json(&json!({ "name": "Mine" }))
        .await;

    assert_eq!(response.status_code(), StatusCode::FORBIDDEN);
    assert_failure(&response.json(), "Not authorized as an admin");
}

#[tokio::test]
async fn test_duplicate_category_conflicts() {
    let app = spawn_app().await;
    let admin = create_test_admin(&app.pool, &app.config).await;
    create_category(&app.server, &admin, "Travel").await;

    let (header, value) = admin.auth();
    let response = app
        .server
        .post("/api/categories")
        .add_header(header, value)
        .json(&json!({ "name": "Travel" }))
        .await;

    assert_eq!(response.status_code(), StatusCode::CONFLICT);
    assert_failure(&response.json(), "Category already exists");
}

#[tokio::test]
async fn test_category_name_is_validated() {
    let app = spawn_app().await;
    let admin = create_test_admin(&app.pool, &app.config).await;

    let (header, value) = admin.auth();
    let response = app
        .server
        .post("/api/categories")
        .add_header(header, value)
        .json(&json!({ "name": "X" }))
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert_validation_failure(&response.json(), &["name"]);
}

#[tokio::test]
async fn test_list_is_public_and_sorted_by_name() {
    let app = spawn_app().await;
    let admin = create_test_admin(&app.pool, &app.config).await;
    create_category(&app.server, &admin, "Science").await;
    create_category(&app.server, &admin, "art").await;
    create_category(&app.server, &admin, "Music").await;

    let categories = app
        .server
        .get("/api/categories")
        .await
        .json::<Envelope<Vec<Category>>>()
        .into_data()
        .unwrap();

    let names: Vec<&str> = categories.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["art", "Music", "Science"]);
}

#[tokio::test]
async fn test_update_and_get_category() {
    let app = spawn_app().await;
    let admin = create_test_admin(&app.pool, &app.config).await;
    let category = create_category(&app.server, &admin, "Cooking").await;

    let (header, value) = admin.auth();
    let response = app
        .server
        .put(&format!("/api/categories/{}", category.id))
        .add_header(header, value)
        .json(&json!({ "name": "Home Cooking", "description": "Recipes" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let fetched = app
        .server
        .get(&format!("/api/categories/{}", category.id))
        .await
        .json::<Envelope<Category>>()
        .into_data()
        .unwrap();
    assert_eq!(fetched.name, "Home Cooking");
    assert_eq!(fetched.slug, "home-cooking");
    assert_eq!(fetched.description, "Recipes");

    let missing = app
        .server
        .get(&format!("/api/categories/{}", uuid::Uuid::new_v4()))
        .await;
    assert_eq!(missing.status_code(), StatusCode::NOT_FOUND);
    assert_failure(&missing.json(), "Category not found");
}

#[tokio::test]
async fn test_category_in_use_cannot_be_deleted() {
    let app = spawn_app().await;
    let blog = seed_blog(&app).await;
    let post = create_post(&app.server, &blog.author, &blog.category.id, "Pinned here").await;

    let (header, value) = blog.admin.auth();
    let refused = app
        .server
        .delete(&format!("/api/categories/{}", blog.category.id))
        .add_header(header.clone(), value.clone())
        .await;
    assert_eq!(refused.status_code(), StatusCode::CONFLICT);
    assert_failure(&refused.json(), "Category is used by 1 post(s)");

    app.server
        .delete(&format!("/api/posts/{}", post.id))
        .add_header(header.clone(), value.clone())
        .await
        .assert_status_ok();

    let deleted = app
        .server
        .delete(&format!("/api/categories/{}", blog.category.id))
        .add_header(header, value)
        .await;
    assert_eq!(deleted.status_code(), StatusCode::OK);
}
