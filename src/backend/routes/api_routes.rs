/**
 * API Routes
 *
 * Everything under `/api`, grouped by resource.
 *
 * ## Authentication
 * - `POST /api/auth/register` - Create an account
 * - `POST /api/auth/login` - Sign in
 * - `GET /api/auth/me` - Current user
 * - `PUT /api/auth/profile` - Update own profile
 *
 * ## Posts
 * - `GET /api/posts`, `POST /api/posts`
 * - `GET|PUT|DELETE /api/posts/{id}`
 *
 * ## Categories
 * - `GET /api/categories`, `POST /api/categories`
 * - `GET|PUT|DELETE /api/categories/{id}`
 *
 * ## Comments
 * - `GET /api/comments/post/{post_id}`
 * - `POST /api/comments`
 * - `PUT|DELETE /api/comments/{id}`
 *
 * ## Uploads
 * - `POST /api/uploads`
 */

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post, put},
    Router,
};

use crate::backend::auth::{get_me, login, register, update_profile};
use crate::backend::categories::{
    create_category, delete_category, get_category, list_categories, update_category,
};
use crate::backend::comments::{create_comment, delete_comment, list_post_comments, update_comment};
use crate::backend::posts::{create_post, delete_post, get_post, list_posts, update_post};
use crate::backend::server::state::AppState;
use crate::backend::uploads::handlers::{upload_image, UPLOAD_BODY_LIMIT};

/// Routes for `/api/auth`
fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/api/auth/register", post(register))
        .route("/api/auth/login", post(login))
        .route("/api/auth/me", get(get_me))
        .route("/api/auth/profile", put(update_profile))
}

/// Routes for `/api/posts`
fn post_routes() -> Router<AppState> {
    Router::new()
        .route("/api/posts", get(list_posts).post(create_post))
        .route("/api/posts/{id}", get(get_post).put(update_post).delete(delete_post))
}

/// Routes for `/api/categories`
fn category_routes() -> Router<AppState> {
    Router::new()
        .route("/api/categories", get(list_categories).post(create_category))
        .route(
            "/api/categories/{id}",
            get(get_category).put(update_category).delete(delete_category),
        )
}

/// Routes for `/api/comments`
fn comment_routes() -> Router<AppState> {
    Router::new()
        .route("/api/comments", post(create_comment))
        .route("/api/comments/post/{post_id}", get(list_post_comments))
        .route("/api/comments/{id}", put(update_comment).delete(delete_comment))
}

/// Routes for `/api/uploads`
///
/// Carries its own body limit sized for one image.
fn upload_routes() -> Router<AppState> {
    Router::new()
        .route("/api/uploads", post(upload_image))
        .layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT))
}

/// All API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(auth_routes())
        .merge(post_routes())
        .merge(category_routes())
        .merge(comment_routes())
        .merge(upload_routes())
}
