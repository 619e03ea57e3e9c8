//! Fixtures created through the API
//!
//! Going through the routes keeps link tables and derived fields (slug,
//! excerpt, comment lists) exactly as the handlers build them.

use axum::http::StatusCode;
use axum_test::TestServer;
use serde_json::json;

use quill::shared::envelope::Envelope;
use quill::shared::models::{Category, Comment, Post};

use super::auth_helpers::TestUser;

pub async fn create_category(server: &TestServer, admin: &TestUser, name: &str) -> Category {
    let (header, value) = admin.auth();
    let response = server
        .post("/api/categories")
        .add_header(header, value)
        .json(&json!({ "name": name, "description": format!("All about {}", name) }))
        .await;
    assert_eq!(response.status_code(), StatusCode::CREATED);
    response
        .json::<Envelope<Category>>()
        .into_data()
        .expect("Category envelope has no data")
}

pub async fn create_post(
    server: &TestServer,
    author: &TestUser,
    category_id: &str,
    title: &str,
) -> Post {
    let (header, value) = author.auth();
    let response = server
        .post("/api/posts")
        .add_header(header, value)
        .json(&json!({
            "title": title,
            "content": format!("{} - a body long enough to pass validation.", title),
            "category": category_id,
            "tags": ["rust", "testing"],
            "status": "published"
        }))
        .await;
    assert_eq!(response.status_code(), StatusCode::CREATED);
    response
        .json::<Envelope<Post>>()
        .into_data()
        .expect("Post envelope has no data")
}

pub async fn create_comment(
    server: &TestServer,
    author: &TestUser,
    post_id: &str,
    content: &str,
    parent: Option<&str>,
) -> Comment {
    let (header, value) = author.auth();
    let mut body = json!({ "content": content, "post": post_id });
    if let Some(parent) = parent {
        body["parentComment"] = json!(parent);
    }
    let response = server
        .post("/api/comments")
        .add_header(header, value)
        .json(&body)
        .await;
    assert_eq!(response.status_code(), StatusCode::CREATED);
    response
        .json::<Envelope<Comment>>()
        .into_data()
        .expect("Comment envelope has no data")
}

pub async fn fetch_post(server: &TestServer, post_id: &str) -> Post {
    server
        .get(&format!("/api/posts/{}", post_id))
        .await
        .json::<Envelope<Post>>()
        .into_data()
        .expect("Post envelope has no data")
}

pub async fn fetch_comments(server: &TestServer, post_id: &str) -> Vec<Comment> {
    server
        .get(&format!("/api/comments/post/{}", post_id))
        .await
        .json::<Envelope<Vec<Comment>>>()
        .into_data()
        .expect("Comment list envelope has no data")
}

/// A category and a regular author to hang posts on
pub struct Blog {
    pub admin: TestUser,
    pub author: TestUser,
    pub category: Category,
}

pub async fn seed_blog(app: &super::database::TestApp) -> Blog {
    let admin = super::auth_helpers::create_test_admin(&app.pool, &app.config).await;
    let author = super::auth_helpers::create_unique_test_user(&app.pool, &app.config).await;
    let category = create_category(&app.server, &admin, "Engineering").await;
    Blog {
        admin,
        author,
        category,
    }
}
