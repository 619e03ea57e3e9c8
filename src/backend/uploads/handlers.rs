/**
 * Upload Handler
 *
 * `POST /api/uploads` takes a multipart form with one image in the `file`
 * field, forwards it to the media host and answers with the public URL.
 */

use axum::{
    extract::{multipart::MultipartRejection, Multipart, State},
    http::StatusCode,
    Json,
};

use crate::backend::error::ApiError;
use crate::backend::middleware::AuthUser;
use crate::backend::server::state::AppState;
use crate::backend::uploads::media::UploadedFile;
use crate::shared::envelope::Envelope;
use crate::shared::models::UploadedImage;

/// Largest accepted image
pub const MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

/// Body limit for the upload route; leaves room for the multipart framing
pub const UPLOAD_BODY_LIMIT: usize = MAX_UPLOAD_BYTES + 1024 * 1024;

const FILE_FIELD: &str = "file";

fn too_large() -> ApiError {
    ApiError::PayloadTooLarge("File too large (max 5 MB)".to_string())
}

fn multipart_error(error: axum::extract::multipart::MultipartError) -> ApiError {
    if error.status() == StatusCode::PAYLOAD_TOO_LARGE {
        too_large()
    } else {
        ApiError::bad_request(error.body_text())
    }
}

/// Pull the `file` field out of the form
///
/// Other fields are skipped.
async fn read_file_field(multipart: &mut Multipart) -> Result<Option<UploadedFile>, ApiError> {
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let file_name = field.file_name().unwrap_or("upload").to_string();
        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let bytes = field.bytes().await.map_err(multipart_error)?;

        return Ok(Some(UploadedFile {
            file_name,
            content_type,
            bytes,
        }));
    }
    Ok(None)
}

/// Upload an image
///
/// # Errors
///
/// * `400` - No `file` field, empty file, or not an image
/// * `401` - Not signed in
/// * `413` - File larger than 5 MiB
/// * `503` - No media host configured
/// * `500` - The media host failed
pub async fn upload_image(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<Envelope<UploadedImage>>, ApiError> {
    let mut multipart = multipart.map_err(|rejection| ApiError::bad_request(rejection.body_text()))?;

    let file = read_file_field(&mut multipart)
        .await?
        .filter(|file| !file.bytes.is_empty())
        .ok_or_else(|| ApiError::bad_request("No file uploaded"))?;

    if !file.content_type.starts_with("image/") {
        tracing::warn!("Rejected upload of {} ({})", file.file_name, file.content_type);
        return Err(ApiError::bad_request("Only image files are allowed"));
    }
    if file.bytes.len() > MAX_UPLOAD_BYTES {
        return Err(too_large());
    }

    let media = state.media.as_ref().ok_or_else(|| {
        tracing::warn!("Upload attempted but no media host is configured");
        ApiError::ServiceUnavailable("Image uploads are not configured".to_string())
    })?;

    let size = file.bytes.len();
    let url = media.store(file).await?;

    tracing::info!("User {} uploaded {} bytes to {}", user.user_id, size, url);
    Ok(Json(Envelope::ok(UploadedImage { url })))
}
