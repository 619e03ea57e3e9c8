/**
 * Comment Handlers
 *
 * - `GET /api/comments/post/{post_id}` - comments of a post, oldest first
 * - `POST /api/comments` - add a comment or reply (signed in)
 * - `PUT /api/comments/{id}` - edit (author or admin)
 * - `DELETE /api/comments/{id}` - dereference then delete (author or admin)
 */

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::backend::comments::db::{self, NewComment};
use crate::backend::error::{ApiError, ApiJson};
use crate::backend::middleware::{ensure_can_modify, AuthUser};
use crate::backend::posts::db::post_exists;
use crate::backend::server::state::AppState;
use crate::shared::envelope::Envelope;
use crate::shared::models::{Comment, CommentInput, CommentUpdate};
use crate::shared::validation::{validate_comment, validate_comment_update};

const COMMENT_NOT_FOUND: &str = "Comment not found";

/// List the comments of a post
///
/// An unknown post simply has no comments.
pub async fn list_post_comments(
    State(state): State<AppState>,
    Path(post_id): Path<String>,
) -> Result<Json<Envelope<Vec<Comment>>>, ApiError> {
    let comments = db::list_for_post(&state.pool, &post_id)
        .await
        .map_err(|e| ApiError::fault("Error fetching comments", e))?;
    Ok(Json(Envelope::ok(comments)))
}

/// Add a comment to a post
///
/// The new id is appended to the post's comment list, and to the parent's
/// reply list when `parentComment` names an existing comment.
///
/// # Errors
///
/// * `400` - Validation failed
/// * `401` - Not signed in
/// * `404` - Post not found
pub async fn create_comment(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    ApiJson(input): ApiJson<CommentInput>,
) -> Result<(StatusCode, Json<Envelope<Comment>>), ApiError> {
    validate_comment(&input)?;

    if !post_exists(&state.pool, &input.post).await? {
        return Err(ApiError::not_found("Post not found"));
    }

    let parent = input.parent_comment.filter(|p| !p.is_empty());
    let id = db::insert_comment(
        &state.pool,
        NewComment {
            content: input.content,
            author_id: user.user_id.clone(),
            post_id: input.post.clone(),
            parent_comment_id: parent.clone(),
        },
    )
    .await
    .map_err(|e| ApiError::fault("Error creating comment", e))?;

    db::attach_to_post(&state.pool, &input.post, &id).await?;

    if let Some(parent_id) = parent {
        if db::comment_exists(&state.pool, &parent_id).await? {
            db::attach_reply(&state.pool, &parent_id, &id).await?;
        } else {
            tracing::warn!("Reply {} names unknown parent {}", id, parent_id);
        }
    }

    let comment = db::find_comment(&state.pool, &id)
        .await?
        .ok_or_else(|| ApiError::not_found(COMMENT_NOT_FOUND))?;

    tracing::info!("Comment {} added to post {} by {}", id, input.post, user.user_id);
    Ok((
        StatusCode::CREATED,
        Json(Envelope::ok_with_message("Comment created", comment)),
    ))
}

/// Edit a comment's content
pub async fn update_comment(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
    ApiJson(update): ApiJson<CommentUpdate>,
) -> Result<Json<Envelope<Comment>>, ApiError> {
    validate_comment_update(&update)?;

    let refs = db::find_comment_refs(&state.pool, &id)
        .await?
        .ok_or_else(|| ApiError::not_found(COMMENT_NOT_FOUND))?;
    ensure_can_modify(&user, &refs.author_id, "update this comment")?;

    let comment = db::update_content(&state.pool, &id, &update.content)
        .await
        .map_err(|e| ApiError::fault("Error updating comment", e))?
        .ok_or_else(|| ApiError::not_found(COMMENT_NOT_FOUND))?;

    tracing::info!("Comment {} updated by {}", id, user.user_id);
    Ok(Json(Envelope::ok_with_message("Comment updated", comment)))
}

/// Delete a comment
///
/// Steps, each committed on its own:
/// 1. Remove the id from the post's comment list
/// 2. Remove the id from the parent's reply list, if any
/// 3. Delete the record
pub async fn delete_comment(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
) -> Result<Json<Envelope<()>>, ApiError> {
    let refs = db::find_comment_refs(&state.pool, &id)
        .await?
        .ok_or_else(|| ApiError::not_found(COMMENT_NOT_FOUND))?;
    ensure_can_modify(&user, &refs.author_id, "delete this comment")?;

    db::detach_from_post(&state.pool, &refs.post_id, &id).await?;
    if let Some(parent_id) = &refs.parent_comment_id {
        db::detach_reply(&state.pool, parent_id, &id).await?;
    }

    db::delete_comment(&state.pool, &id).await.map_err(|e| {
        tracing::error!("Comment {} dereferenced but not deleted: {}", id, e);
        ApiError::fault("Error deleting comment", e)
    })?;

    tracing::info!("Comment {} deleted by {}", id, user.user_id);
    Ok(Json(Envelope::message("Comment deleted")))
}
