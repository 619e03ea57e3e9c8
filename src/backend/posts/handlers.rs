/**
 * Post Handlers
 *
 * - `GET /api/posts` - paginated listing with status/category/search filters
 * - `GET /api/posts/{id}` - single post, counts a view
 * - `POST /api/posts` - create (signed in)
 * - `PUT /api/posts/{id}` - update (author or admin)
 * - `DELETE /api/posts/{id}` - delete with its comments (author or admin)
 */

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::backend::categories::db::category_exists;
use crate::backend::error::{ApiError, ApiJson, ApiQuery};
use crate::backend::middleware::{ensure_can_modify, AuthUser};
use crate::backend::posts::db::{self, NewPost, PostChanges, PostFilter};
use crate::backend::server::state::AppState;
use crate::shared::envelope::{Envelope, Pagination};
use crate::shared::error::FieldError;
use crate::shared::models::{Post, PostInput, PostQuery, PostStatus};
use crate::shared::text::{excerpt_of, slugify};
use crate::shared::validation::validate_post;

const POST_NOT_FOUND: &str = "Post not found";

fn normalize_tags(tags: &[String]) -> Vec<String> {
    tags.iter()
        .map(|tag| tag.trim().to_string())
        .filter(|tag| !tag.is_empty())
        .collect()
}

fn slug_for(title: &str) -> String {
    let slug = slugify(title);
    if slug.is_empty() {
        "post".to_string()
    } else {
        slug
    }
}

fn parse_status(status: Option<&str>) -> Option<PostStatus> {
    status.and_then(|s| s.parse().ok())
}

async fn ensure_category(state: &AppState, category_id: &str) -> Result<(), ApiError> {
    if category_exists(&state.pool, category_id.trim()).await? {
        Ok(())
    } else {
        tracing::warn!("Unknown category id: {}", category_id);
        Err(ApiError::bad_request("Category not found"))
    }
}

/// List posts
///
/// # Query Parameters
///
/// * `status` - `draft` or `published`
/// * `category` - Category id
/// * `search` - Case-insensitive substring of title, content or tags
/// * `page` - 1-based page (default 1)
/// * `limit` - Page size, 1..=100 (default 10)
pub async fn list_posts(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<PostQuery>,
) -> Result<Json<Envelope<Vec<Post>>>, ApiError> {
    let status = match query.status.as_deref().filter(|s| !s.is_empty()) {
        Some(raw) => Some(raw.parse::<PostStatus>().map_err(|_| {
            ApiError::ValidationFailed(vec![FieldError::query(
                "status",
                "Status must be draft or published",
            )])
        })?),
        None => None,
    };

    let filter = PostFilter {
        status,
        category_id: query.category.filter(|c| !c.trim().is_empty()),
        search: query.search.filter(|s| !s.trim().is_empty()),
    };

    let page = query.page.unwrap_or(1).max(1);
    let limit = query
        .limit
        .unwrap_or(Pagination::DEFAULT_LIMIT)
        .clamp(1, Pagination::MAX_LIMIT);

    let probe = Pagination::new(page, limit, 0);
    let (posts, total) = db::list_posts(&state.pool, &filter, probe.limit, probe.offset()).await?;
    let pagination = Pagination::new(page, limit, total);

    tracing::debug!(
        "Listed {} of {} posts (page {}/{})",
        posts.len(),
        total,
        pagination.current,
        pagination.pages
    );
    Ok(Json(Envelope::ok(posts).with_pagination(pagination)))
}

/// Get a single post
///
/// Reading a post counts as a view.
pub async fn get_post(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Envelope<Post>>, ApiError> {
    if !db::post_exists(&state.pool, &id).await? {
        return Err(ApiError::not_found(POST_NOT_FOUND));
    }
    db::increment_views(&state.pool, &id).await?;

    let post = db::find_post(&state.pool, &id)
        .await?
        .ok_or_else(|| ApiError::not_found(POST_NOT_FOUND))?;
    Ok(Json(Envelope::ok(post)))
}

/// Create a post authored by the caller
///
/// # Errors
///
/// * `400` - Validation failed, or the category does not exist
/// * `401` - Not signed in
pub async fn create_post(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    ApiJson(input): ApiJson<PostInput>,
) -> Result<(StatusCode, Json<Envelope<Post>>), ApiError> {
    validate_post(&input)?;
    ensure_category(&state, &input.category).await?;

    let title = input.title.trim().to_string();
    let excerpt = input
        .excerpt
        .as_deref()
        .map(str::trim)
        .filter(|e| !e.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| excerpt_of(&input.content));

    let new_post = NewPost {
        slug: slug_for(&title),
        title,
        excerpt,
        content: input.content,
        featured_image: input.featured_image.unwrap_or_default(),
        category_id: input.category.trim().to_string(),
        author_id: user.user_id.clone(),
        tags: normalize_tags(input.tags.as_deref().unwrap_or_default()),
        status: parse_status(input.status.as_deref()).unwrap_or_default(),
    };

    let post = db::insert_post(&state.pool, new_post)
        .await
        .map_err(|e| ApiError::fault("Error creating post", e))?;

    tracing::info!("Post created: {} by {}", post.id, user.user_id);
    Ok((
        StatusCode::CREATED,
        Json(Envelope::ok_with_message("Post created successfully", post)),
    ))
}

/// Update a post
///
/// Only fields present in the body change; `title`, `content` and
/// `category` are always present because validation requires them.
///
/// # Errors
///
/// * `400` - Validation failed, or the category does not exist
/// * `403` - Caller is neither the author nor an admin
/// * `404` - No such post
pub async fn update_post(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
    ApiJson(input): ApiJson<PostInput>,
) -> Result<Json<Envelope<Post>>, ApiError> {
    validate_post(&input)?;

    let owner = db::find_post_owner(&state.pool, &id)
        .await?
        .ok_or_else(|| ApiError::not_found(POST_NOT_FOUND))?;
    ensure_can_modify(&user, &owner, "update this post")?;

    ensure_category(&state, &input.category).await?;

    let title = input.title.trim().to_string();
    let changes = PostChanges {
        slug: Some(slug_for(&title)),
        title: Some(title),
        content: Some(input.content),
        excerpt: input
            .excerpt
            .map(|e| e.trim().to_string())
            .filter(|e| !e.is_empty()),
        featured_image: input.featured_image,
        category_id: Some(input.category.trim().to_string()),
        tags: input.tags.as_deref().map(normalize_tags),
        status: parse_status(input.status.as_deref()),
    };

    let post = db::update_post(&state.pool, &id, changes)
        .await
        .map_err(|e| ApiError::fault("Error updating post", e))?
        .ok_or_else(|| ApiError::not_found(POST_NOT_FOUND))?;

    tracing::info!("Post updated: {} by {}", post.id, user.user_id);
    Ok(Json(Envelope::ok_with_message("Post updated successfully", post)))
}

/// Delete a post and its comments
///
/// # Errors
///
/// * `403` - Caller is neither the author nor an admin
/// * `404` - No such post
pub async fn delete_post(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
) -> Result<Json<Envelope<()>>, ApiError> {
    let owner = db::find_post_owner(&state.pool, &id)
        .await?
        .ok_or_else(|| ApiError::not_found(POST_NOT_FOUND))?;
    ensure_can_modify(&user, &owner, "delete this post")?;

    db::delete_post_cascade(&state.pool, &id)
        .await
        .map_err(|e| ApiError::fault("Error deleting post", e))?;

    tracing::info!("Post deleted: {} by {}", id, user.user_id);
    Ok(Json(Envelope::message("Post deleted successfully")))
}
