/**
 * User Model and Database Operations
 *
 * This module handles user rows and their database operations.
 */

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use crate::shared::models::{AuthorSummary, ProfileUpdate, Role, UserProfile};

/// User struct representing a row of the `users` table
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    /// Unique user ID (UUID text)
    pub id: String,
    /// Display name
    pub name: String,
    /// User email address, stored lowercase
    pub email: String,
    /// Hashed password (bcrypt)
    pub password_hash: String,
    /// `user` or `admin`
    pub role: String,
    /// Avatar URL, empty if unset
    pub avatar: String,
    pub bio: String,
    /// Created at timestamp
    pub created_at: DateTime<Utc>,
    /// Updated at timestamp
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Parsed role; unknown text falls back to the least privileged role
    pub fn role(&self) -> Role {
        self.role.parse().unwrap_or(Role::User)
    }

    /// Public view without the password hash
    pub fn to_profile(&self) -> UserProfile {
        UserProfile {
            id: self.id.clone(),
            name: self.name.clone(),
            email: self.email.clone(),
            role: self.role(),
            avatar: self.avatar.clone(),
            bio: self.bio.clone(),
            created_at: self.created_at,
        }
    }

    pub fn to_author(&self) -> AuthorSummary {
        AuthorSummary {
            id: self.id.clone(),
            name: self.name.clone(),
            avatar: self.avatar.clone(),
        }
    }
}

/// Fields needed to create a user
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
}

const USER_COLUMNS: &str =
    "id, name, email, password_hash, role, avatar, bio, created_at, updated_at";

/// Normalize an email for storage and lookup
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Create a new user
///
/// # Arguments
/// * `pool` - Database connection pool
/// * `new_user` - Name, email, password hash and role
///
/// # Returns
/// Created user or error (a duplicate email is a unique violation)
pub async fn create_user(pool: &SqlitePool, new_user: NewUser) -> Result<User, sqlx::Error> {
    let id = uuid::Uuid::new_v4().to_string();
    let now = Utc::now();

    sqlx::query(
        r#"
        INSERT INTO users (id, name, email, password_hash, role, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&id)
    .bind(new_user.name.trim())
    .bind(normalize_email(&new_user.email))
    .bind(&new_user.password_hash)
    .bind(new_user.role.as_str())
    .bind(now)
    .bind(now)
    .execute(pool)
    .await?;

    get_user_by_id(pool, &id)
        .await?
        .ok_or(sqlx::Error::RowNotFound)
}

/// Get user by email
///
/// # Arguments
/// * `pool` - Database connection pool
/// * `email` - User email (normalized before lookup)
///
/// # Returns
/// User or None if not found
pub async fn get_user_by_email(pool: &SqlitePool, email: &str) -> Result<Option<User>, sqlx::Error> {
    let query = format!("SELECT {} FROM users WHERE email = ?", USER_COLUMNS);
    sqlx::query_as::<_, User>(&query)
        .bind(normalize_email(email))
        .fetch_optional(pool)
        .await
}

/// Get user by ID
///
/// # Arguments
/// * `pool` - Database connection pool
/// * `user_id` - User ID
///
/// # Returns
/// User or None if not found
pub async fn get_user_by_id(pool: &SqlitePool, user_id: &str) -> Result<Option<User>, sqlx::Error> {
    let query = format!("SELECT {} FROM users WHERE id = ?", USER_COLUMNS);
    sqlx::query_as::<_, User>(&query)
        .bind(user_id)
        .fetch_optional(pool)
        .await
}

/// Apply a profile update
///
/// Only fields present in `update` change.
pub async fn update_profile(
    pool: &SqlitePool,
    user_id: &str,
    update: &ProfileUpdate,
) -> Result<Option<User>, sqlx::Error> {
    let result = sqlx::query(
        r#"
        UPDATE users
        SET name = COALESCE(?, name),
            bio = COALESCE(?, bio),
            avatar = COALESCE(?, avatar),
            updated_at = ?
        WHERE id = ?
        "#,
    )
    .bind(update.name.as_deref().map(str::trim))
    .bind(update.bio.as_deref().map(str::trim))
    .bind(update.avatar.as_deref().map(str::trim))
    .bind(Utc::now())
    .bind(user_id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Ok(None);
    }
    get_user_by_id(pool, user_id).await
}

/// Number of registered users
pub async fn count_users(pool: &SqlitePool) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar("SELECT COUNT(*) FROM users")
        .fetch_one(pool)
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::server::config::load_database;

    fn new_user(email: &str) -> NewUser {
        NewUser {
            name: "Ada Lovelace".to_string(),
            email: email.to_string(),
            password_hash: "hash".to_string(),
            role: Role::User,
        }
    }

    #[tokio::test]
    async fn test_create_and_lookup_user() {
        let pool = load_database("sqlite::memory:").await.unwrap();
        let user = create_user(&pool, new_user("Ada@Example.com ")).await.unwrap();
        assert_eq!(user.email, "ada@example.com");
        assert_eq!(user.role(), Role::User);

        let by_email = get_user_by_email(&pool, "ADA@example.com").await.unwrap().unwrap();
        assert_eq!(by_email.id, user.id);

        let by_id = get_user_by_id(&pool, &user.id).await.unwrap().unwrap();
        assert_eq!(by_id.name, "Ada Lovelace");
        assert_eq!(count_users(&pool).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_email_is_unique_violation() {
        let pool = load_database("sqlite::memory:").await.unwrap();
        create_user(&pool, new_user("ada@example.com")).await.unwrap();
        let err = create_user(&pool, new_user("ada@example.com")).await.unwrap_err();
        assert!(err
            .as_database_error()
            .map(|e| e.is_unique_violation())
            .unwrap_or(false));
    }

    #[tokio::test]
    async fn test_update_profile_only_touches_given_fields() {
        let pool = load_database("sqlite::memory:").await.unwrap();
        let user = create_user(&pool, new_user("ada@example.com")).await.unwrap();

        let update = ProfileUpdate {
            bio: Some("Analyst".to_string()),
            ..Default::default()
        };
        let updated = update_profile(&pool, &user.id, &update).await.unwrap().unwrap();
        assert_eq!(updated.bio, "Analyst");
        assert_eq!(updated.name, "Ada Lovelace");

        let missing = update_profile(&pool, "no-such-user", &update).await.unwrap();
        assert!(missing.is_none());
    }
}
