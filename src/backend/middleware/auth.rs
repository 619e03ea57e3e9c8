/**
 * Authentication Extractor
 *
 * Handlers that need a signed-in user take an `AuthUser` argument. The
 * extractor reads the bearer token from the `Authorization` header,
 * verifies it, and loads the user so the role is the current one rather
 * than whatever the token was issued with.
 */

use axum::{extract::FromRequestParts, http::header::AUTHORIZATION, http::request::Parts};

use crate::backend::auth::sessions::verify_token;
use crate::backend::auth::users::get_user_by_id;
use crate::backend::error::ApiError;
use crate::backend::server::state::AppState;
use crate::shared::authz::{may_administer, may_modify, Actor};
use crate::shared::models::Role;

/// Authenticated user data
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub user_id: String,
    pub name: String,
    pub role: Role,
}

impl AuthenticatedUser {
    pub fn actor(&self) -> Actor {
        Actor::new(self.user_id.clone(), self.role)
    }
}

/// Axum extractor for the authenticated user
///
/// Rejects with `401` when the header is missing, malformed, the token
/// does not verify, or the user no longer exists.
#[derive(Clone, Debug)]
pub struct AuthUser(pub AuthenticatedUser);

/// Pull the token out of an `Authorization: Bearer <token>` header
pub fn bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts).ok_or_else(|| {
            tracing::warn!("Missing or malformed Authorization header");
            ApiError::unauthorized("Not authorized, no token")
        })?;

        let claims = verify_token(token, &state.config.jwt_secret).map_err(|e| {
            tracing::warn!("Invalid token: {:?}", e);
            ApiError::unauthorized("Not authorized, token failed")
        })?;

        let user = get_user_by_id(&state.pool, &claims.sub)
            .await?
            .ok_or_else(|| {
                tracing::warn!("Token subject {} no longer exists", claims.sub);
                ApiError::unauthorized("Not authorized, user not found")
            })?;

        Ok(AuthUser(AuthenticatedUser {
            user_id: user.id.clone(),
            name: user.name.clone(),
            role: user.role(),
        }))
    }
}

/// Server-side ownership check for owned resources
///
/// # Arguments
///
/// * `user` - The requester
/// * `owner_id` - Author id of the resource
/// * `action` - Verb for the error message, e.g. "update this post"
///
/// # Errors
///
/// `403 Forbidden` unless the requester owns the resource or is an admin.
pub fn ensure_can_modify(
    user: &AuthenticatedUser,
    owner_id: &str,
    action: &str,
) -> Result<(), ApiError> {
    if may_modify(Some(&user.actor()), owner_id) {
        Ok(())
    } else {
        tracing::warn!("User {} may not {}", user.user_id, action);
        Err(ApiError::forbidden(format!("Not authorized to {}", action)))
    }
}

/// Server-side check for admin-only operations
pub fn ensure_admin(user: &AuthenticatedUser) -> Result<(), ApiError> {
    if may_administer(Some(&user.actor())) {
        Ok(())
    } else {
        tracing::warn!("User {} attempted an admin-only operation", user.user_id);
        Err(ApiError::forbidden("Not authorized as an admin"))
    }
}
