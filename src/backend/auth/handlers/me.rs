/**
 * Get Current User Handler
 *
 * Implements GET /api/auth/me. Requires a valid bearer token; returns the
 * caller's public profile.
 */

use axum::{extract::State, Json};

use crate::backend::auth::users::get_user_by_id;
use crate::backend::error::ApiError;
use crate::backend::middleware::AuthUser;
use crate::backend::server::state::AppState;
use crate::shared::envelope::Envelope;
use crate::shared::models::UserProfile;

/// Get current user handler
///
/// # Errors
///
/// * `401 Unauthorized` - Missing or invalid token
/// * `404 Not Found` - User deleted since the token was checked
pub async fn get_me(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<Json<Envelope<UserProfile>>, ApiError> {
    let record = get_user_by_id(&state.pool, &user.user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    Ok(Json(Envelope::ok(record.to_profile())))
}
