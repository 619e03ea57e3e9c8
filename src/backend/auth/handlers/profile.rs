/**
 * Update Profile Handler
 *
 * Implements PUT /api/auth/profile. Only `name`, `bio` and `avatar` can be
 * changed, and only the fields present in the body are touched.
 */

use axum::{extract::State, Json};

use crate::backend::auth::users::update_profile as store_profile;
use crate::backend::error::{ApiError, ApiJson};
use crate::backend::middleware::AuthUser;
use crate::backend::server::state::AppState;
use crate::shared::envelope::Envelope;
use crate::shared::models::{ProfileUpdate, UserProfile};
use crate::shared::validation::validate_profile;

/// Update profile handler
///
/// # Errors
///
/// * `400 Bad Request` - Validation failed
/// * `401 Unauthorized` - Missing or invalid token
pub async fn update_profile(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    ApiJson(update): ApiJson<ProfileUpdate>,
) -> Result<Json<Envelope<UserProfile>>, ApiError> {
    validate_profile(&update)?;

    let record = store_profile(&state.pool, &user.user_id, &update)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    tracing::info!("Profile updated for user {}", record.id);
    Ok(Json(Envelope::ok_with_message(
        "Profile updated successfully",
        record.to_profile(),
    )))
}
