/**
 * Demo Data
 *
 * Fills an empty database with a demo admin, a regular user, a handful of
 * categories and a few posts so a fresh checkout has something to show.
 * Runs at startup when `SEED_DEMO=1`; a database that already has users is
 * left untouched.
 */

use sqlx::SqlitePool;
use thiserror::Error;

use crate::backend::auth::users::{count_users, create_user, update_profile, NewUser};
use crate::backend::categories::db::insert_category;
use crate::backend::posts::db::{insert_post, NewPost};
use crate::shared::models::{PostStatus, ProfileUpdate, Role};
use crate::shared::text::{excerpt_of, slugify};

/// Password shared by the demo accounts
pub const DEMO_PASSWORD: &str = "password123";

pub const DEMO_ADMIN_EMAIL: &str = "admin@quill.dev";
pub const DEMO_USER_EMAIL: &str = "jane@quill.dev";

#[derive(Debug, Error)]
pub enum SeedError {
    #[error("database error while seeding: {0}")]
    Database(#[from] sqlx::Error),

    #[error("could not hash demo password: {0}")]
    Hash(#[from] bcrypt::BcryptError),
}

/// What a seeding run created
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedSummary {
    pub users: usize,
    pub categories: usize,
    pub posts: usize,
}

impl SeedSummary {
    pub fn is_empty(&self) -> bool {
        self.users == 0 && self.categories == 0 && self.posts == 0
    }
}

const CATEGORIES: &[(&str, &str)] = &[
    ("Technology", "Posts about technology, programming, and software development"),
    ("Web Development", "Articles about web development, frameworks, and best practices"),
    ("Rust", "Rust tutorials, tips, and tricks"),
    ("Tutorials", "Step-by-step guides and tutorials"),
];

/// (title, content, category index, tags, author is admin)
const POSTS: &[(&str, &str, usize, &[&str], bool)] = &[
    (
        "Getting Started with Axum",
        "Axum is a web framework built on tokio, tower and hyper. Handlers are plain async \
         functions, extractors pull typed data out of requests, and middleware is ordinary \
         tower layers. This post walks through routing, state and error handling.",
        2,
        &["rust", "axum", "web"],
        true,
    ),
    (
        "SQLite in Production",
        "SQLite is more capable than its reputation suggests. With write-ahead logging, \
         foreign keys switched on and migrations checked into the repository it comfortably \
         backs a small blog or internal tool.",
        0,
        &["sqlite", "databases"],
        true,
    ),
    (
        "Designing a Friendly REST API",
        "Consistent envelopes, predictable status codes and field-level validation messages \
         make an API pleasant to consume. Here is a checklist we use when adding endpoints.",
        1,
        &["api", "design"],
        false,
    ),
];

/// Populate an empty database with demo content
///
/// # Arguments
///
/// * `pool` - Database pool
/// * `bcrypt_cost` - Cost factor for hashing the demo password
///
/// # Returns
///
/// What was created; an empty summary when the database already had users.
pub async fn seed_demo_data(pool: &SqlitePool, bcrypt_cost: u32) -> Result<SeedSummary, SeedError> {
    if count_users(pool).await? > 0 {
        tracing::info!("Database already has users, skipping demo seed");
        return Ok(SeedSummary::default());
    }

    tracing::info!("Seeding demo data...");
    let password_hash = bcrypt::hash(DEMO_PASSWORD, bcrypt_cost)?;

    let admin = create_user(
        pool,
        NewUser {
            name: "Quill Admin".to_string(),
            email: DEMO_ADMIN_EMAIL.to_string(),
            password_hash: password_hash.clone(),
            role: Role::Admin,
        },
    )
    .await?;
    let writer = create_user(
        pool,
        NewUser {
            name: "Jane Smith".to_string(),
            email: DEMO_USER_EMAIL.to_string(),
            password_hash,
            role: Role::User,
        },
    )
    .await?;
    update_profile(
        pool,
        &writer.id,
        &ProfileUpdate {
            bio: Some("Frontend developer who writes about APIs.".to_string()),
            ..ProfileUpdate::default()
        },
    )
    .await?;

    let mut category_ids = Vec::with_capacity(CATEGORIES.len());
    for (name, description) in CATEGORIES {
        category_ids.push(insert_category(pool, name, description).await?.id);
    }

    let mut summary = SeedSummary {
        users: 2,
        categories: category_ids.len(),
        posts: 0,
    };

    for (title, content, category, tags, by_admin) in POSTS {
        let author_id = if *by_admin { &admin.id } else { &writer.id };
        insert_post(
            pool,
            NewPost {
                title: title.to_string(),
                content: content.to_string(),
                excerpt: excerpt_of(content),
                slug: slugify(title),
                featured_image: String::new(),
                category_id: category_ids[*category].clone(),
                author_id: author_id.clone(),
                tags: tags.iter().map(|t| t.to_string()).collect(),
                status: PostStatus::Published,
            },
        )
        .await?;
        summary.posts += 1;
    }

    tracing::info!(
        "Seeded {} users, {} categories, {} posts",
        summary.users,
        summary.categories,
        summary.posts
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::auth::users::get_user_by_email;
    use crate::backend::server::config::load_database;

    #[tokio::test]
    async fn test_seed_populates_then_skips() {
        let pool = load_database("sqlite::memory:").await.unwrap();

        let first = seed_demo_data(&pool, 4).await.unwrap();
        assert_eq!(
            first,
            SeedSummary {
                users: 2,
                categories: CATEGORIES.len(),
                posts: POSTS.len(),
            }
        );

        let admin = get_user_by_email(&pool, DEMO_ADMIN_EMAIL).await.unwrap().unwrap();
        assert_eq!(admin.role(), Role::Admin);
        assert!(bcrypt::verify(DEMO_PASSWORD, &admin.password_hash).unwrap());

        let second = seed_demo_data(&pool, 4).await.unwrap();
        assert!(second.is_empty());
    }
}
