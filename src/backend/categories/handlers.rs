/**
 * Category Handlers
 *
 * - `GET /api/categories` - list (public)
 * - `GET /api/categories/{id}` - single category (public)
 * - `POST /api/categories` - create (admin)
 * - `PUT /api/categories/{id}` - update (admin)
 * - `DELETE /api/categories/{id}` - delete (admin, only when unused)
 */

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::backend::categories::db;
use crate::backend::error::{ApiError, ApiJson};
use crate::backend::middleware::{ensure_admin, AuthUser};
use crate::backend::server::state::AppState;
use crate::shared::envelope::Envelope;
use crate::shared::models::{Category, CategoryInput};
use crate::shared::validation::validate_category;

const CATEGORY_NOT_FOUND: &str = "Category not found";

pub async fn list_categories(
    State(state): State<AppState>,
) -> Result<Json<Envelope<Vec<Category>>>, ApiError> {
    let categories = db::list_categories(&state.pool).await?;
    Ok(Json(Envelope::ok(categories)))
}

pub async fn get_category(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Envelope<Category>>, ApiError> {
    let category = db::find_category(&state.pool, &id)
        .await?
        .ok_or_else(|| ApiError::not_found(CATEGORY_NOT_FOUND))?;
    Ok(Json(Envelope::ok(category)))
}

/// Create a category
///
/// # Errors
///
/// * `400` - Validation failed
/// * `403` - Caller is not an admin
/// * `409` - Name already used
pub async fn create_category(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    ApiJson(input): ApiJson<CategoryInput>,
) -> Result<(StatusCode, Json<Envelope<Category>>), ApiError> {
    ensure_admin(&user)?;
    validate_category(&input)?;

    let category = db::insert_category(
        &state.pool,
        &input.name,
        input.description.as_deref().unwrap_or_default(),
    )
    .await
    .map_err(|e| match ApiError::from(e) {
        ApiError::Conflict(_) => ApiError::conflict("Category already exists"),
        other => other,
    })?;

    tracing::info!("Category created: {} ({})", category.name, category.id);
    Ok((
        StatusCode::CREATED,
        Json(Envelope::ok_with_message("Category created successfully", category)),
    ))
}

pub async fn update_category(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
    ApiJson(input): ApiJson<CategoryInput>,
) -> Result<Json<Envelope<Category>>, ApiError> {
    ensure_admin(&user)?;
    validate_category(&input)?;

    let category = db::update_category(&state.pool, &id, &input.name, input.description.as_deref())
        .await
        .map_err(|e| match ApiError::from(e) {
            ApiError::Conflict(_) => ApiError::conflict("Category already exists"),
            other => other,
        })?
        .ok_or_else(|| ApiError::not_found(CATEGORY_NOT_FOUND))?;

    tracing::info!("Category updated: {}", category.id);
    Ok(Json(Envelope::ok_with_message(
        "Category updated successfully",
        category,
    )))
}

/// Delete a category
///
/// # Errors
///
/// * `404` - No such category
/// * `409` - Posts are still filed under it
pub async fn delete_category(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
) -> Result<Json<Envelope<()>>, ApiError> {
    ensure_admin(&user)?;

    if !db::category_exists(&state.pool, &id).await? {
        return Err(ApiError::not_found(CATEGORY_NOT_FOUND));
    }

    let in_use = db::count_posts_in_category(&state.pool, &id).await?;
    if in_use > 0 {
        tracing::warn!("Refusing to delete category {} used by {} posts", id, in_use);
        return Err(ApiError::conflict(format!(
            "Category is used by {} post(s)",
            in_use
        )));
    }

    db::delete_category(&state.pool, &id).await?;
    tracing::info!("Category deleted: {}", id);
    Ok(Json(Envelope::message("Category deleted successfully")))
}
