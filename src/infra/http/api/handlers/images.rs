//! Image upload handlers

use axum::Json;
use axum::extract::State;
use axum::response::IntoResponse;
use serde_json::json;

use super::image_to_api;
use crate::infra::http::api::error::ApiError;
use crate::infra::http::api::middleware::AdminSession;
use crate::infra::http::api::models::{DeleteImageRequest, UploadImageRequest};
use crate::infra::http::api::state::ApiState;

pub async fn upload_image(
    State(state): State<ApiState>,
    AdminSession(_principal): AdminSession,
    Json(payload): Json<UploadImageRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let (Some(image), Some(filename)) = (
        payload.image.filter(|image| !image.is_empty()),
        payload.filename.filter(|name| !name.is_empty()),
    ) else {
        return Err(ApiError::bad_request("Image data and filename required", None));
    };

    let url = state
        .images
        .store_base64(&filename, &image)
        .await
        .map_err(image_to_api)?;
    Ok(Json(json!({ "url": url })))
}

pub async fn delete_image(
    State(state): State<ApiState>,
    AdminSession(_principal): AdminSession,
    Json(payload): Json<DeleteImageRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if payload.url.trim().is_empty() {
        return Err(ApiError::bad_request("Invalid URL", None));
    }
    state
        .images
        .delete_by_url(&payload.url)
        .await
        .map_err(image_to_api)?;
    Ok(Json(json!({ "success": true })))
}
