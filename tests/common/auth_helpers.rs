//! Authentication test helpers
//!
//! Users are inserted straight into the database (admins cannot be created
//! through the API) and given a token signed with the test secret.

use axum::http::{HeaderName, HeaderValue};
use sqlx::SqlitePool;
use uuid::Uuid;

use quill::backend::auth::sessions::create_token;
use quill::backend::auth::users::{create_user, NewUser};
use quill::backend::server::config::ServerConfig;
use quill::shared::models::Role;

pub const TEST_PASSWORD: &str = "password123";

/// Test user credentials
#[derive(Debug, Clone)]
pub struct TestUser {
    pub id: String,
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: Role,
    pub token: String,
}

impl TestUser {
    /// `Authorization` header carrying this user's token
    pub fn auth(&self) -> (HeaderName, HeaderValue) {
        auth_header(&self.token)
    }
}

/// Create a user in the database and sign a token for it
pub async fn create_test_user(
    pool: &SqlitePool,
    config: &ServerConfig,
    name: &str,
    email: &str,
    role: Role,
) -> TestUser {
    let password_hash = bcrypt::hash(TEST_PASSWORD, 4).expect("Failed to hash password");
    let user = create_user(
        pool,
        NewUser {
            name: name.to_string(),
            email: email.to_string(),
            password_hash,
            role,
        },
    )
    .await
    .expect("Failed to create test user");

    let token = create_token(&user.id, role, &config.jwt_secret, config.token_ttl_days)
        .expect("Failed to create test token");

    TestUser {
        id: user.id,
        name: user.name,
        email: user.email,
        password: TEST_PASSWORD.to_string(),
        role,
        token,
    }
}

/// Regular user with a unique email
pub async fn create_unique_test_user(pool: &SqlitePool, config: &ServerConfig) -> TestUser {
    let email = format!("user_{}@example.com", Uuid::new_v4().simple());
    create_test_user(pool, config, "Test User", &email, Role::User).await
}

/// Admin with a unique email
pub async fn create_test_admin(pool: &SqlitePool, config: &ServerConfig) -> TestUser {
    let email = format!("admin_{}@example.com", Uuid::new_v4().simple());
    create_test_user(pool, config, "Test Admin", &email, Role::Admin).await
}

/// Create authorization header
pub fn auth_header(token: &str) -> (HeaderName, HeaderValue) {
    (
        axum::http::header::AUTHORIZATION,
        HeaderValue::from_str(&format!("Bearer {}", token)).expect("Token is not a valid header"),
    )
}
