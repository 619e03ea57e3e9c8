//! Comment API integration tests
//!
//! Comments are linked from their post and from their parent comment;
//! these tests follow those links through create and delete.

#![cfg(feature = "ssr")]

mod common;

use axum::http::StatusCode;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

use common::*;
use quill::shared::envelope::Envelope;
use quill::shared::models::Comment;

#[tokio::test]
async fn test_create_comment_links_it_from_the_post() {
    let app = spawn_app().await;
    let blog = seed_blog(&app).await;
    let post = create_post(&app.server, &blog.author, &blog.category.id, "Discuss").await;

    let (header, value) = blog.admin.auth();
    let response = app
        .server
        .post("/api/comments")
        .add_header(header, value)
        .json(&json!({ "content": "Great read", "post": post.id }))
        .await;
    assert_eq!(response.status_code(), StatusCode::CREATED);
    let body: Value = response.json();
    assert_eq!(body["message"], "Comment created");

    let comment: Comment = serde_json::from_value(body["data"].clone()).unwrap();
    assert_eq!(comment.author.id, blog.admin.id);
    assert_eq!(comment.post, post.id);
    assert_eq!(comment.parent_comment, None);

    assert_eq!(fetch_post(&app.server, &post.id).await.comments, vec![comment.id]);
}

#[tokio::test]
async fn test_replies_are_linked_from_their_parent() {
    let app = spawn_app().await;
    let blog = seed_blog(&app).await;
    let post = create_post(&app.server, &blog.author, &blog.category.id, "Threads").await;

    let parent = create_comment(&app.server, &blog.admin, &post.id, "Question?", None).await;
    let first = create_comment(&app.server, &blog.author, &post.id, "Answer", Some(&parent.id)).await;
    let second = create_comment(&app.server, &blog.admin, &post.id, "Thanks", Some(&parent.id)).await;

    let comments = fetch_comments(&app.server, &post.id).await;
    let ids: Vec<&str> = comments.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids, vec![parent.id.as_str(), first.id.as_str(), second.id.as_str()]);
    assert_eq!(comments[0].replies, vec![first.id.clone(), second.id.clone()]);
    assert_eq!(comments[1].parent_comment.as_deref(), Some(parent.id.as_str()));
}

#[tokio::test]
async fn test_comment_on_missing_post_is_not_found() {
    let app = spawn_app().await;
    let user = create_unique_test_user(&app.pool, &app.config).await;

    let (header, value) = user.auth();
    let response = app
        .server
        .post("/api/comments")
        .add_header(header, value)
        .json(&json!({ "content": "Hello?", "post": uuid::Uuid::new_v4().to_string() }))
        .await;

    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
    assert_failure(&response.json(), "Post not found");
}

#[tokio::test]
async fn test_comment_content_is_validated() {
    let app = spawn_app().await;
    let blog = seed_blog(&app).await;
    let post = create_post(&app.server, &blog.author, &blog.category.id, "Strict").await;

    let (header, value) = blog.author.auth();
    let response = app
        .server
        .post("/api/comments")
        .add_header(header, value)
        .json(&json!({ "content": "x".repeat(501), "post": post.id }))
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert_validation_failure(&response.json(), &["content"]);
    assert!(fetch_comments(&app.server, &post.id).await.is_empty());
}

#[tokio::test]
async fn test_invalid_edit_is_rejected_before_lookup() {
    let app = spawn_app().await;
    let blog = seed_blog(&app).await;
    let missing = uuid::Uuid::new_v4().to_string();

    let (header, value) = blog.author.auth();
    let response = app
        .server
        .put(&format!("/api/comments/{}", missing))
        .add_header(header, value)
        .json(&json!({ "content": "" }))
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert_validation_failure(&response.json(), &["content"]);
}

#[tokio::test]
async fn test_only_author_or_admin_may_edit() {
    let app = spawn_app().await;
    let blog = seed_blog(&app).await;
    let stranger = create_unique_test_user(&app.pool, &app.config).await;
    let post = create_post(&app.server, &blog.author, &blog.category.id, "Edits").await;
    let comment = create_comment(&app.server, &blog.author, &post.id, "Frist", None).await;

    let (header, value) = stranger.auth();
    let forbidden = app
        .server
        .put(&format!("/api/comments/{}", comment.id))
        .add_header(header, value)
        .json(&json!({ "content": "Mine now" }))
        .await;
    assert_eq!(forbidden.status_code(), StatusCode::FORBIDDEN);
    assert_failure(&forbidden.json(), "Not authorized to update this comment");

    let (header, value) = blog.author.auth();
    let updated = app
        .server
        .put(&format!("/api/comments/{}", comment.id))
        .add_header(header, value)
        .json(&json!({ "content": "First" }))
        .await;
    assert_eq!(updated.status_code(), StatusCode::OK);
    let updated = updated.json::<Envelope<Comment>>().into_data().unwrap();
    assert_eq!(updated.content, "First");
}

#[tokio::test]
async fn test_delete_dereferences_from_post_and_parent() {
    let app = spawn_app().await;
    let blog = seed_blog(&app).await;
    let post = create_post(&app.server, &blog.author, &blog.category.id, "Cleanup").await;
    let parent = create_comment(&app.server, &blog.author, &post.id, "Parent", None).await;
    let reply = create_comment(&app.server, &blog.admin, &post.id, "Reply", Some(&parent.id)).await;

    let (header, value) = blog.admin.auth();
    let response = app
        .server
        .delete(&format!("/api/comments/{}", reply.id))
        .add_header(header, value)
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(response.json::<Value>()["message"], "Comment deleted");

    assert_eq!(fetch_post(&app.server, &post.id).await.comments, vec![parent.id.clone()]);
    let comments = fetch_comments(&app.server, &post.id).await;
    assert_eq!(comments.len(), 1);
    assert!(comments[0].replies.is_empty());

    let (header, value) = blog.admin.auth();
    let again = app
        .server
        .delete(&format!("/api/comments/{}", reply.id))
        .add_header(header, value)
        .await;
    assert_eq!(again.status_code(), StatusCode::NOT_FOUND);
    assert_failure(&again.json(), "Comment not found");
}

#[tokio::test]
async fn test_stranger_cannot_delete() {
    let app = spawn_app().await;
    let blog = seed_blog(&app).await;
    let stranger = create_unique_test_user(&app.pool, &app.config).await;
    let post = create_post(&app.server, &blog.author, &blog.category.id, "Guarded").await;
    let comment = create_comment(&app.server, &blog.author, &post.id, "Keep me", None).await;

    let (header, value) = stranger.auth();
    let response = app
        .server
        .delete(&format!("/api/comments/{}", comment.id))
        .add_header(header, value)
        .await;

    assert_eq!(response.status_code(), StatusCode::FORBIDDEN);
    assert_failure(&response.json(), "Not authorized to delete this comment");
    assert_eq!(fetch_comments(&app.server, &post.id).await.len(), 1);
}
