use axum::{
    extract::{DefaultBodyLimit, Multipart, Query, State},
    http::StatusCode,
    routing::{delete, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::{error::ApiError, images::services, state::AppState};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/image-upload", post(upload_image))
        .route("/delete-image", delete(delete_image))
        .layer(DefaultBodyLimit::max(10 * 1024 * 1024)) // 10MB
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub image_url: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteImageParams {
    pub image_url: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct DeleteImageResponse {
    pub error: bool,
    pub message: String,
}

/// Multipart upload with a single `image` field.
#[instrument(skip(state, multipart))]
pub async fn upload_image(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<UploadResponse>), ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::Validation(e.to_string()))?
    {
        if field.name() != Some("image") {
            continue;
        }

        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        if !services::is_image(&content_type) {
            return Err(ApiError::UnsupportedMediaType(
                "Please upload only images.".into(),
            ));
        }

        let file_name = field.file_name().map(|s| s.to_string());
        let data = field
            .bytes()
            .await
            .map_err(|e| ApiError::Validation(e.to_string()))?;

        let key = services::make_object_key(file_name.as_deref(), &content_type);
        state.storage.put_object(&key, data).await?;
        let image_url = state.storage.object_url(&key);

        info!(key = %key, "image uploaded");
        return Ok((StatusCode::CREATED, Json(UploadResponse { image_url })));
    }

    Err(ApiError::Validation("Please upload an image.".into()))
}

#[instrument(skip(state))]
pub async fn delete_image(
    State(state): State<AppState>,
    Query(params): Query<DeleteImageParams>,
) -> Result<Json<DeleteImageResponse>, ApiError> {
    let image_url = params
        .image_url
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| ApiError::Validation("imageUrl parameter is required.".into()))?;

    let key = services::object_key_from_url(&image_url)
        .ok_or_else(|| ApiError::Validation("imageUrl is not valid.".into()))?;

    let removed = state.storage.delete_object(&key).await?;
    if removed {
        info!(key = %key, "image deleted");
        Ok(Json(DeleteImageResponse {
            error: false,
            message: "Image deleted successfully.".into(),
        }))
    } else {
        // A missing blob is reported in-band, not as an HTTP failure.
        Ok(Json(DeleteImageResponse {
            error: true,
            message: "Image not found.".into(),
        }))
    }
}
