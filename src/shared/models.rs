//! API Data Types
//!
//! Resource shapes exchanged between the server and the client library.
//! Field names are camelCase on the wire.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Account role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    User,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Role::User),
            "admin" => Ok(Role::Admin),
            other => Err(format!("unknown role: {}", other)),
        }
    }
}

/// Publication status of a post
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PostStatus {
    #[default]
    Draft,
    Published,
}

impl PostStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PostStatus::Draft => "draft",
            PostStatus::Published => "published",
        }
    }
}

impl fmt::Display for PostStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PostStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(PostStatus::Draft),
            "published" => Ok(PostStatus::Published),
            other => Err(format!("unknown post status: {}", other)),
        }
    }
}

/// Public view of a user account (never carries the password hash)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub avatar: String,
    pub bio: String,
    pub created_at: DateTime<Utc>,
}

/// Author reference embedded in posts and comments
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorSummary {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub avatar: String,
}

/// Category reference embedded in posts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategorySummary {
    pub id: String,
    pub name: String,
    pub slug: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: String,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A blog post as returned by the API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: String,
    pub title: String,
    pub content: String,
    pub excerpt: String,
    pub slug: String,
    pub featured_image: String,
    /// `None` only if the category row has gone away underneath the post
    pub category: Option<CategorySummary>,
    pub author: AuthorSummary,
    pub tags: Vec<String>,
    pub status: PostStatus,
    pub views: i64,
    pub published_at: Option<DateTime<Utc>>,
    /// Ids of the post's comments, in the order they were added
    pub comments: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A comment as returned by the API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    /// Server id, or `temp-<uuid>` while an optimistic add is pending
    pub id: String,
    pub content: String,
    pub author: AuthorSummary,
    /// Id of the post the comment belongs to
    pub post: String,
    #[serde(default)]
    pub parent_comment: Option<String>,
    /// Ids of direct replies
    #[serde(default)]
    pub replies: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Prefix of locally generated comment ids
pub const PLACEHOLDER_PREFIX: &str = "temp-";

impl Comment {
    /// Whether this is an optimistic placeholder the server has not seen yet
    pub fn is_placeholder(&self) -> bool {
        self.id.starts_with(PLACEHOLDER_PREFIX)
    }
}

/// Token plus user, returned by register and login
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthPayload {
    pub token: String,
    pub user: UserProfile,
}

/// Result of an image upload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadedImage {
    pub url: String,
}

// Request bodies. Fields default to empty so a missing field shows up as a
// validation message instead of a decode failure.

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

/// Body of `POST /posts` and `PUT /posts/:id`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PostInput {
    pub title: String,
    pub content: String,
    /// Category id
    pub category: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub excerpt: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub featured_image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    /// `draft` or `published`; kept as text so a bad value is a field error
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CategoryInput {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Body of `POST /comments`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CommentInput {
    pub content: String,
    /// Post id
    pub post: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_comment: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CommentUpdate {
    pub content: String,
}

/// Query string of `GET /posts`
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct PostQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_round_trips_through_text() {
        assert_eq!("admin".parse::<Role>().unwrap(), Role::Admin);
        assert_eq!(Role::User.to_string(), "user");
        assert!("root".parse::<Role>().is_err());
    }

    #[test]
    fn test_post_status_parsing() {
        assert_eq!("published".parse::<PostStatus>().unwrap(), PostStatus::Published);
        assert!("archived".parse::<PostStatus>().is_err());
    }

    #[test]
    fn test_post_input_missing_fields_default_to_empty() {
        let input: PostInput = serde_json::from_str(r#"{"content":"Hello there world"}"#).unwrap();
        assert_eq!(input.title, "");
        assert_eq!(input.category, "");
        assert_eq!(input.status, None);
    }

    #[test]
    fn test_comment_uses_camel_case_on_the_wire() {
        let json = serde_json::json!({
            "id": "c1",
            "content": "Nice post",
            "author": {"id": "u1", "name": "Ada"},
            "post": "p1",
            "parentComment": "c0",
            "createdAt": "2024-06-01T10:00:00Z",
            "updatedAt": "2024-06-01T10:00:00Z"
        });
        let comment: Comment = serde_json::from_value(json).unwrap();
        assert_eq!(comment.parent_comment.as_deref(), Some("c0"));
        assert!(comment.replies.is_empty());
        assert!(!comment.is_placeholder());
    }

    #[test]
    fn test_post_query_skips_unset_parameters() {
        let query = PostQuery {
            search: Some("rust".to_string()),
            page: Some(2),
            ..Default::default()
        };
        let json = serde_json::to_value(&query).unwrap();
        assert_eq!(json, serde_json::json!({"search": "rust", "page": 2}));
    }
}
