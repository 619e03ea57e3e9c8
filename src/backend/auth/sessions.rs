/**
 * Session Tokens
 *
 * JWT generation and validation. Tokens are HS256-signed with the
 * configured secret and carry the user id and role.
 */

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::shared::models::Role;

/// JWT claims structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User ID
    pub sub: String,
    /// Role at the time the token was issued
    pub role: Role,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issued at time (Unix timestamp)
    pub iat: i64,
}

/// Create a JWT token for a user
///
/// # Arguments
/// * `user_id` - User ID
/// * `role` - User role
/// * `secret` - Signing secret
/// * `ttl_days` - Token lifetime in days
///
/// # Returns
/// JWT token string
pub fn create_token(
    user_id: &str,
    role: Role,
    secret: &str,
    ttl_days: i64,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = Utc::now();
    let claims = Claims {
        sub: user_id.to_string(),
        role,
        exp: (now + Duration::days(ttl_days)).timestamp(),
        iat: now.timestamp(),
    };

    let key = EncodingKey::from_secret(secret.as_bytes());
    encode(&Header::default(), &claims, &key)
}

/// Verify and decode a JWT token
///
/// # Arguments
/// * `token` - JWT token string
/// * `secret` - Signing secret
///
/// # Returns
/// Decoded claims or error (bad signature, malformed, expired)
pub fn verify_token(token: &str, secret: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
    let key = DecodingKey::from_secret(secret.as_bytes());
    let validation = Validation::default();

    let token_data = decode::<Claims>(token, &key, &validation)?;
    Ok(token_data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret";

    #[test]
    fn test_create_and_verify_token() {
        let user_id = uuid::Uuid::new_v4().to_string();
        let token = create_token(&user_id, Role::Admin, SECRET, 30).unwrap();
        assert!(!token.is_empty());

        let claims = verify_token(&token, SECRET).unwrap();
        assert_eq!(claims.sub, user_id);
        assert_eq!(claims.role, Role::Admin);
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_verify_invalid_token() {
        assert!(verify_token("invalid.token.here", SECRET).is_err());
    }

    #[test]
    fn test_wrong_secret_is_rejected() {
        let token = create_token("u1", Role::User, SECRET, 30).unwrap();
        assert!(verify_token(&token, "another-secret").is_err());
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let token = create_token("u1", Role::User, SECRET, -2).unwrap();
        assert!(verify_token(&token, SECRET).is_err());
    }
}
