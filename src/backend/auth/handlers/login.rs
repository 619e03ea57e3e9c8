/**
 * Login Handler
 *
 * Implements POST /api/auth/login.
 *
 * # Authentication Process
 *
 * 1. Look up the user by email
 * 2. Verify the password against the stored bcrypt hash
 * 3. Issue a JWT
 *
 * Unknown email and wrong password produce the same 401 so the response
 * does not reveal which accounts exist.
 */

use axum::{extract::State, Json};
use bcrypt::verify;

use crate::backend::auth::sessions::create_token;
use crate::backend::auth::users::get_user_by_email;
use crate::backend::error::{ApiError, ApiJson};
use crate::backend::server::state::AppState;
use crate::shared::envelope::Envelope;
use crate::shared::models::{AuthPayload, LoginRequest};
use crate::shared::validation::validate_login;

const INVALID_CREDENTIALS: &str = "Invalid credentials";

/// Login handler
///
/// # Arguments
///
/// * `State(state)` - Application state
/// * `ApiJson(request)` - Email and password
///
/// # Returns
///
/// `{success, message, data: {token, user}}`
///
/// # Errors
///
/// * `400 Bad Request` - Validation failed
/// * `401 Unauthorized` - Unknown email or wrong password
/// * `500 Internal Server Error` - Database or token failure
pub async fn login(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<LoginRequest>,
) -> Result<Json<Envelope<AuthPayload>>, ApiError> {
    tracing::info!("Login request for: {}", request.email);

    validate_login(&request)?;

    let user = get_user_by_email(&state.pool, &request.email)
        .await?
        .ok_or_else(|| {
            tracing::warn!("User not found: {}", request.email);
            ApiError::unauthorized(INVALID_CREDENTIALS)
        })?;

    let valid = verify(&request.password, &user.password_hash).map_err(|e| {
        tracing::error!("Password verification error: {:?}", e);
        ApiError::fault("Error logging in", e)
    })?;

    if !valid {
        tracing::warn!("Invalid password for user: {}", request.email);
        return Err(ApiError::unauthorized(INVALID_CREDENTIALS));
    }

    let token = create_token(
        &user.id,
        user.role(),
        &state.config.jwt_secret,
        state.config.token_ttl_days,
    )?;

    tracing::info!("User logged in successfully: {} ({})", user.name, user.email);

    Ok(Json(Envelope::ok_with_message(
        "Login successful",
        AuthPayload {
            token,
            user: user.to_profile(),
        },
    )))
}
