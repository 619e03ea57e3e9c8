/**
 * Comment Database Operations
 *
 * A comment row knows its post and (optionally) its parent. The post's
 * comment list and the parent's reply list live in the `post_comments` and
 * `comment_replies` link tables, so attaching and detaching a comment are
 * explicit steps separate from inserting or deleting the row.
 */

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use crate::shared::models::{AuthorSummary, Comment};

#[derive(Debug, Clone, sqlx::FromRow)]
struct CommentRow {
    id: String,
    content: String,
    author_id: String,
    author_name: String,
    author_avatar: String,
    post_id: String,
    parent_comment_id: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl CommentRow {
    fn into_comment(self, replies: Vec<String>) -> Comment {
        Comment {
            id: self.id,
            content: self.content,
            author: AuthorSummary {
                id: self.author_id,
                name: self.author_name,
                avatar: self.author_avatar,
            },
            post: self.post_id,
            parent_comment: self.parent_comment_id,
            replies,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

const COMMENT_SELECT: &str = r#"
    SELECT cm.id, cm.content, cm.author_id, u.name AS author_name, u.avatar AS author_avatar,
           cm.post_id, cm.parent_comment_id, cm.created_at, cm.updated_at
    FROM comments cm
    JOIN users u ON u.id = cm.author_id
"#;

/// Ownership and placement of a comment
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct CommentRefs {
    pub author_id: String,
    pub post_id: String,
    pub parent_comment_id: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewComment {
    pub content: String,
    pub author_id: String,
    pub post_id: String,
    pub parent_comment_id: Option<String>,
}

/// Reply ids of a comment, in insertion order
pub async fn reply_ids(pool: &SqlitePool, comment_id: &str) -> Result<Vec<String>, sqlx::Error> {
    sqlx::query_scalar(
        "SELECT reply_id FROM comment_replies WHERE parent_id = ? ORDER BY position ASC",
    )
    .bind(comment_id)
    .fetch_all(pool)
    .await
}

pub async fn find_comment(pool: &SqlitePool, id: &str) -> Result<Option<Comment>, sqlx::Error> {
    let query = format!("{} WHERE cm.id = ?", COMMENT_SELECT);
    let row = sqlx::query_as::<_, CommentRow>(&query)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    match row {
        Some(row) => {
            let replies = reply_ids(pool, &row.id).await?;
            Ok(Some(row.into_comment(replies)))
        }
        None => Ok(None),
    }
}

pub async fn find_comment_refs(
    pool: &SqlitePool,
    id: &str,
) -> Result<Option<CommentRefs>, sqlx::Error> {
    sqlx::query_as::<_, CommentRefs>(
        "SELECT author_id, post_id, parent_comment_id FROM comments WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await
}

pub async fn comment_exists(pool: &SqlitePool, id: &str) -> Result<bool, sqlx::Error> {
    Ok(find_comment_refs(pool, id).await?.is_some())
}

/// Comments of a post, oldest first
pub async fn list_for_post(pool: &SqlitePool, post_id: &str) -> Result<Vec<Comment>, sqlx::Error> {
    let query = format!(
        "{} WHERE cm.post_id = ? ORDER BY cm.created_at ASC, cm.rowid ASC",
        COMMENT_SELECT
    );
    let rows = sqlx::query_as::<_, CommentRow>(&query)
        .bind(post_id)
        .fetch_all(pool)
        .await?;

    let mut comments = Vec::with_capacity(rows.len());
    for row in rows {
        let replies = reply_ids(pool, &row.id).await?;
        comments.push(row.into_comment(replies));
    }
    Ok(comments)
}

/// Insert the comment row (not yet attached to any list)
pub async fn insert_comment(pool: &SqlitePool, new_comment: NewComment) -> Result<String, sqlx::Error> {
    let id = uuid::Uuid::new_v4().to_string();
    let now = Utc::now();

    sqlx::query(
        r#"
        INSERT INTO comments (id, content, author_id, post_id, parent_comment_id, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&id)
    .bind(new_comment.content.trim())
    .bind(&new_comment.author_id)
    .bind(&new_comment.post_id)
    .bind(&new_comment.parent_comment_id)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await?;

    Ok(id)
}

/// Append a comment to its post's comment list
pub async fn attach_to_post(
    pool: &SqlitePool,
    post_id: &str,
    comment_id: &str,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO post_comments (post_id, comment_id, position)
        VALUES (?, ?, (SELECT COALESCE(MAX(position), 0) + 1 FROM post_comments WHERE post_id = ?))
        "#,
    )
    .bind(post_id)
    .bind(comment_id)
    .bind(post_id)
    .execute(pool)
    .await?;
    Ok(())
}

/// Append a reply to its parent's reply list
pub async fn attach_reply(
    pool: &SqlitePool,
    parent_id: &str,
    reply_id: &str,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO comment_replies (parent_id, reply_id, position)
        VALUES (?, ?, (SELECT COALESCE(MAX(position), 0) + 1 FROM comment_replies WHERE parent_id = ?))
        "#,
    )
    .bind(parent_id)
    .bind(reply_id)
    .bind(parent_id)
    .execute(pool)
    .await?;
    Ok(())
}

/// Remove a comment id from its post's comment list
pub async fn detach_from_post(
    pool: &SqlitePool,
    post_id: &str,
    comment_id: &str,
) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM post_comments WHERE post_id = ? AND comment_id = ?")
        .bind(post_id)
        .bind(comment_id)
        .execute(pool)
        .await?;
    Ok(())
}

/// Remove a reply id from its parent's reply list
pub async fn detach_reply(
    pool: &SqlitePool,
    parent_id: &str,
    reply_id: &str,
) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM comment_replies WHERE parent_id = ? AND reply_id = ?")
        .bind(parent_id)
        .bind(reply_id)
        .execute(pool)
        .await?;
    Ok(())
}

/// Delete the comment row
///
/// The comment must already be detached from its post and parent. Its own
/// reply list goes with it; the replies themselves stay.
pub async fn delete_comment(pool: &SqlitePool, id: &str) -> Result<bool, sqlx::Error> {
    sqlx::query("DELETE FROM comment_replies WHERE parent_id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    let result = sqlx::query("DELETE FROM comments WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn update_content(
    pool: &SqlitePool,
    id: &str,
    content: &str,
) -> Result<Option<Comment>, sqlx::Error> {
    let result = sqlx::query("UPDATE comments SET content = ?, updated_at = ? WHERE id = ?")
        .bind(content.trim())
        .bind(Utc::now())
        .bind(id)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Ok(None);
    }
    find_comment(pool, id).await
}
