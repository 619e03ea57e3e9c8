/**
 * Category Database Operations
 */

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use crate::shared::models::Category;
use crate::shared::text::slugify;

#[derive(Debug, Clone, sqlx::FromRow)]
struct CategoryRow {
    id: String,
    name: String,
    slug: String,
    description: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<CategoryRow> for Category {
    fn from(row: CategoryRow) -> Self {
        Category {
            id: row.id,
            name: row.name,
            slug: row.slug,
            description: row.description,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

const CATEGORY_COLUMNS: &str = "id, name, slug, description, created_at, updated_at";

/// All categories, alphabetical
pub async fn list_categories(pool: &SqlitePool) -> Result<Vec<Category>, sqlx::Error> {
    let query = format!(
        "SELECT {} FROM categories ORDER BY name COLLATE NOCASE ASC",
        CATEGORY_COLUMNS
    );
    let rows = sqlx::query_as::<_, CategoryRow>(&query)
        .fetch_all(pool)
        .await?;
    Ok(rows.into_iter().map(Category::from).collect())
}

pub async fn find_category(pool: &SqlitePool, id: &str) -> Result<Option<Category>, sqlx::Error> {
    let query = format!("SELECT {} FROM categories WHERE id = ?", CATEGORY_COLUMNS);
    let row = sqlx::query_as::<_, CategoryRow>(&query)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row.map(Category::from))
}

pub async fn category_exists(pool: &SqlitePool, id: &str) -> Result<bool, sqlx::Error> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM categories WHERE id = ?")
        .bind(id)
        .fetch_one(pool)
        .await?;
    Ok(count > 0)
}

/// Insert a category; the slug is derived from the name
pub async fn insert_category(
    pool: &SqlitePool,
    name: &str,
    description: &str,
) -> Result<Category, sqlx::Error> {
    let id = uuid::Uuid::new_v4().to_string();
    let now = Utc::now();
    let name = name.trim();

    sqlx::query(
        r#"
        INSERT INTO categories (id, name, slug, description, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&id)
    .bind(name)
    .bind(slugify(name))
    .bind(description.trim())
    .bind(now)
    .bind(now)
    .execute(pool)
    .await?;

    find_category(pool, &id).await?.ok_or(sqlx::Error::RowNotFound)
}

/// Rename or re-describe a category
///
/// `description` of `None` keeps the current one.
pub async fn update_category(
    pool: &SqlitePool,
    id: &str,
    name: &str,
    description: Option<&str>,
) -> Result<Option<Category>, sqlx::Error> {
    let name = name.trim();
    let result = sqlx::query(
        r#"
        UPDATE categories
        SET name = ?, slug = ?, description = COALESCE(?, description), updated_at = ?
        WHERE id = ?
        "#,
    )
    .bind(name)
    .bind(slugify(name))
    .bind(description.map(str::trim))
    .bind(Utc::now())
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Ok(None);
    }
    find_category(pool, id).await
}

/// Number of posts filed under a category
pub async fn count_posts_in_category(pool: &SqlitePool, id: &str) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar("SELECT COUNT(*) FROM posts WHERE category_id = ?")
        .bind(id)
        .fetch_one(pool)
        .await
}

/// Delete a category; returns whether a row was removed
pub async fn delete_category(pool: &SqlitePool, id: &str) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM categories WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
