/**
 * Post Database Operations
 *
 * Posts are read joined with their author and category so handlers get the
 * full API shape in one query. Tags are stored as a JSON array in a text
 * column; comment ids come from the `post_comments` link table.
 */

use chrono::{DateTime, Utc};
use sqlx::{QueryBuilder, Sqlite, SqlitePool};

use crate::shared::models::{AuthorSummary, CategorySummary, Post, PostStatus};

#[derive(Debug, Clone, sqlx::FromRow)]
struct PostRow {
    id: String,
    title: String,
    content: String,
    excerpt: String,
    slug: String,
    featured_image: String,
    category_id: String,
    category_name: Option<String>,
    category_slug: Option<String>,
    author_id: String,
    author_name: String,
    author_avatar: String,
    tags: String,
    status: String,
    views: i64,
    published_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl PostRow {
    fn into_post(self, comments: Vec<String>) -> Post {
        let category = match (self.category_name, self.category_slug) {
            (Some(name), Some(slug)) => Some(CategorySummary {
                id: self.category_id,
                name,
                slug,
            }),
            _ => None,
        };
        Post {
            id: self.id,
            title: self.title,
            content: self.content,
            excerpt: self.excerpt,
            slug: self.slug,
            featured_image: self.featured_image,
            category,
            author: AuthorSummary {
                id: self.author_id,
                name: self.author_name,
                avatar: self.author_avatar,
            },
            tags: serde_json::from_str(&self.tags).unwrap_or_default(),
            status: self.status.parse().unwrap_or_default(),
            views: self.views,
            published_at: self.published_at,
            comments,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

const POST_SELECT: &str = r#"
    SELECT p.id, p.title, p.content, p.excerpt, p.slug, p.featured_image,
           p.category_id, c.name AS category_name, c.slug AS category_slug,
           p.author_id, u.name AS author_name, u.avatar AS author_avatar,
           p.tags, p.status, p.views, p.published_at, p.created_at, p.updated_at
    FROM posts p
    JOIN users u ON u.id = p.author_id
    LEFT JOIN categories c ON c.id = p.category_id
"#;

/// Fields of a new post, already validated and normalized
#[derive(Debug, Clone)]
pub struct NewPost {
    pub title: String,
    pub content: String,
    pub excerpt: String,
    pub slug: String,
    pub featured_image: String,
    pub category_id: String,
    pub author_id: String,
    pub tags: Vec<String>,
    pub status: PostStatus,
}

/// Fields to change on an existing post; `None` leaves a field alone
#[derive(Debug, Clone, Default)]
pub struct PostChanges {
    pub title: Option<String>,
    pub content: Option<String>,
    pub excerpt: Option<String>,
    pub slug: Option<String>,
    pub featured_image: Option<String>,
    pub category_id: Option<String>,
    pub tags: Option<Vec<String>>,
    pub status: Option<PostStatus>,
}

/// Filters for the post listing
#[derive(Debug, Clone, Default)]
pub struct PostFilter {
    pub status: Option<PostStatus>,
    pub category_id: Option<String>,
    pub search: Option<String>,
}

fn tags_json(tags: &[String]) -> String {
    serde_json::to_string(tags).unwrap_or_else(|_| "[]".to_string())
}

/// Comment ids of a post, in insertion order
pub async fn post_comment_ids(pool: &SqlitePool, post_id: &str) -> Result<Vec<String>, sqlx::Error> {
    sqlx::query_scalar(
        "SELECT comment_id FROM post_comments WHERE post_id = ? ORDER BY position ASC",
    )
    .bind(post_id)
    .fetch_all(pool)
    .await
}

pub async fn find_post(pool: &SqlitePool, id: &str) -> Result<Option<Post>, sqlx::Error> {
    let query = format!("{} WHERE p.id = ?", POST_SELECT);
    let row = sqlx::query_as::<_, PostRow>(&query)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    match row {
        Some(row) => {
            let comments = post_comment_ids(pool, &row.id).await?;
            Ok(Some(row.into_post(comments)))
        }
        None => Ok(None),
    }
}

/// Author id of a post, if the post exists
pub async fn find_post_owner(pool: &SqlitePool, id: &str) -> Result<Option<String>, sqlx::Error> {
    sqlx::query_scalar("SELECT author_id FROM posts WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn post_exists(pool: &SqlitePool, id: &str) -> Result<bool, sqlx::Error> {
    Ok(find_post_owner(pool, id).await?.is_some())
}

fn push_filters<'a>(builder: &mut QueryBuilder<'a, Sqlite>, filter: &'a PostFilter) {
    builder.push(" WHERE 1 = 1");
    if let Some(status) = filter.status {
        builder.push(" AND p.status = ").push_bind(status.as_str());
    }
    if let Some(category_id) = &filter.category_id {
        builder.push(" AND p.category_id = ").push_bind(category_id.as_str());
    }
    if let Some(search) = &filter.search {
        let pattern = like_pattern(search.trim());
        builder
            .push(" AND (p.title LIKE ")
            .push_bind(pattern.clone())
            .push(" ESCAPE '\\' OR p.content LIKE ")
            .push_bind(pattern.clone())
            .push(" ESCAPE '\\' OR EXISTS (SELECT 1 FROM json_each(p.tags) WHERE json_each.value LIKE ")
            .push_bind(pattern)
            .push(" ESCAPE '\\'))");
    }
}

/// `%text%` with `\`, `%` and `_` escaped so they match literally
fn like_pattern(text: &str) -> String {
    let mut pattern = String::with_capacity(text.len() + 2);
    pattern.push('%');
    for c in text.chars() {
        if matches!(c, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

/// One page of posts, newest first, plus the total number of matches
///
/// # Arguments
///
/// * `filter` - Status, category and search filters
/// * `limit` - Page size
/// * `offset` - Records to skip
pub async fn list_posts(
    pool: &SqlitePool,
    filter: &PostFilter,
    limit: u32,
    offset: u64,
) -> Result<(Vec<Post>, u64), sqlx::Error> {
    let mut count_query: QueryBuilder<Sqlite> = QueryBuilder::new("SELECT COUNT(*) FROM posts p");
    push_filters(&mut count_query, filter);
    let total: i64 = count_query.build_query_scalar().fetch_one(pool).await?;

    let mut page_query: QueryBuilder<Sqlite> = QueryBuilder::new(POST_SELECT);
    push_filters(&mut page_query, filter);
    page_query
        .push(" ORDER BY p.created_at DESC, p.rowid DESC LIMIT ")
        .push_bind(i64::from(limit))
        .push(" OFFSET ")
        .push_bind(i64::try_from(offset).unwrap_or(i64::MAX));
    let rows: Vec<PostRow> = page_query.build_query_as().fetch_all(pool).await?;

    let mut posts = Vec::with_capacity(rows.len());
    for row in rows {
        let comments = post_comment_ids(pool, &row.id).await?;
        posts.push(row.into_post(comments));
    }

    Ok((posts, u64::try_from(total).unwrap_or_default()))
}

pub async fn insert_post(pool: &SqlitePool, new_post: NewPost) -> Result<Post, sqlx::Error> {
    let id = uuid::Uuid::new_v4().to_string();
    let now = Utc::now();
    let published_at = (new_post.status == PostStatus::Published).then_some(now);

    sqlx::query(
        r#"
        INSERT INTO posts (
            id, title, content, excerpt, slug, featured_image, category_id,
            author_id, tags, status, views, published_at, created_at, updated_at
        )
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, 0, ?, ?, ?)
        "#,
    )
    .bind(&id)
    .bind(&new_post.title)
    .bind(&new_post.content)
    .bind(&new_post.excerpt)
    .bind(&new_post.slug)
    .bind(&new_post.featured_image)
    .bind(&new_post.category_id)
    .bind(&new_post.author_id)
    .bind(tags_json(&new_post.tags))
    .bind(new_post.status.as_str())
    .bind(published_at)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await?;

    find_post(pool, &id).await?.ok_or(sqlx::Error::RowNotFound)
}

/// Apply `changes` to a post
///
/// `published_at` is stamped the first time the status becomes
/// `published` and never cleared afterwards.
pub async fn update_post(
    pool: &SqlitePool,
    id: &str,
    changes: PostChanges,
) -> Result<Option<Post>, sqlx::Error> {
    let now = Utc::now();
    let publish_now = (changes.status == Some(PostStatus::Published)).then_some(now);

    let result = sqlx::query(
        r#"
        UPDATE posts
        SET title = COALESCE(?, title),
            content = COALESCE(?, content),
            excerpt = COALESCE(?, excerpt),
            slug = COALESCE(?, slug),
            featured_image = COALESCE(?, featured_image),
            category_id = COALESCE(?, category_id),
            tags = COALESCE(?, tags),
            status = COALESCE(?, status),
            published_at = COALESCE(published_at, ?),
            updated_at = ?
        WHERE id = ?
        "#,
    )
    .bind(changes.title)
    .bind(changes.content)
    .bind(changes.excerpt)
    .bind(changes.slug)
    .bind(changes.featured_image)
    .bind(changes.category_id)
    .bind(changes.tags.as_deref().map(tags_json))
    .bind(changes.status.map(|s| s.as_str()))
    .bind(publish_now)
    .bind(now)
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Ok(None);
    }
    find_post(pool, id).await
}

/// Count a read of the post
pub async fn increment_views(pool: &SqlitePool, id: &str) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE posts SET views = views + 1 WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

/// Delete a post together with its comments and reference rows
///
/// Runs in one transaction; returns whether the post existed.
pub async fn delete_post_cascade(pool: &SqlitePool, id: &str) -> Result<bool, sqlx::Error> {
    let mut tx = pool.begin().await?;

    sqlx::query(
        r#"
        DELETE FROM comment_replies
        WHERE parent_id IN (SELECT id FROM comments WHERE post_id = ?)
           OR reply_id IN (SELECT id FROM comments WHERE post_id = ?)
        "#,
    )
    .bind(id)
    .bind(id)
    .execute(&mut *tx)
    .await?;

    sqlx::query("DELETE FROM post_comments WHERE post_id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?;

    let removed_comments = sqlx::query("DELETE FROM comments WHERE post_id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

    let removed = sqlx::query("DELETE FROM posts WHERE id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

    tx.commit().await?;

    if removed > 0 {
        tracing::debug!("Deleted post {} and {} comment(s)", id, removed_comments);
    }
    Ok(removed > 0)
}
