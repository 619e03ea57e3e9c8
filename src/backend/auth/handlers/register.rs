/**
 * Register Handler
 *
 * Implements POST /api/auth/register.
 *
 * # Registration Process
 *
 * 1. Validate name, email and password
 * 2. Check that the email is not taken
 * 3. Hash the password with bcrypt
 * 4. Create the user (role `user`)
 * 5. Issue a JWT and return it with the public profile
 */

use axum::{extract::State, http::StatusCode, Json};
use bcrypt::hash;

use crate::backend::auth::sessions::create_token;
use crate::backend::auth::users::{create_user, get_user_by_email, NewUser};
use crate::backend::error::{ApiError, ApiJson};
use crate::backend::server::state::AppState;
use crate::shared::envelope::Envelope;
use crate::shared::models::{AuthPayload, RegisterRequest, Role};
use crate::shared::validation::validate_registration;

/// Register handler
///
/// # Arguments
///
/// * `State(state)` - Application state
/// * `ApiJson(request)` - Name, email and password
///
/// # Returns
///
/// `201 Created` with `{success, message, data: {token, user}}`
///
/// # Errors
///
/// * `400 Bad Request` - Validation failed
/// * `409 Conflict` - Email already registered
/// * `500 Internal Server Error` - Hashing, insert or token generation failed
///
/// # Example Request
///
/// ```http
/// POST /api/auth/register HTTP/1.1
/// Content-Type: application/json
///
/// {"name": "Ada", "email": "ada@example.com", "password": "secret123"}
/// ```
pub async fn register(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<RegisterRequest>,
) -> Result<(StatusCode, Json<Envelope<AuthPayload>>), ApiError> {
    tracing::info!("Register request for email: {}", request.email);

    validate_registration(&request)?;

    if get_user_by_email(&state.pool, &request.email).await?.is_some() {
        tracing::warn!("Email already exists: {}", request.email);
        return Err(ApiError::conflict("User already exists with this email"));
    }

    let password_hash = hash(&request.password, state.config.bcrypt_cost).map_err(|e| {
        tracing::error!("Failed to hash password: {:?}", e);
        ApiError::fault("Error registering user", e)
    })?;

    let user = create_user(
        &state.pool,
        NewUser {
            name: request.name,
            email: request.email,
            password_hash,
            role: Role::User,
        },
    )
    .await?;

    let token = create_token(
        &user.id,
        user.role(),
        &state.config.jwt_secret,
        state.config.token_ttl_days,
    )?;

    tracing::info!("User created successfully: {} ({})", user.name, user.email);

    Ok((
        StatusCode::CREATED,
        Json(Envelope::ok_with_message(
            "User registered successfully",
            AuthPayload {
                token,
                user: user.to_profile(),
            },
        )),
    ))
}
