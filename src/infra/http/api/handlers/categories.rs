//! Categories handlers

use axum::Json;
use axum::extract::{Path, State};
use axum::response::IntoResponse;
use serde_json::json;

use super::content_to_api;
use crate::infra::http::api::error::ApiError;
use crate::infra::http::api::middleware::AdminSession;
use crate::infra::http::api::models::{CategoryCreateRequest, CategoryUpdateRequest};
use crate::infra::http::api::state::ApiState;

pub async fn list_categories(
    State(state): State<ApiState>,
) -> Result<impl IntoResponse, ApiError> {
    let categories = state.categories.list().await.map_err(content_to_api)?;
    Ok(Json(json!({ "categories": categories })))
}

pub async fn get_category(
    State(state): State<ApiState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let category = state.categories.get(&id).await.map_err(content_to_api)?;
    Ok(Json(json!({ "category": category })))
}

pub async fn create_category(
    State(state): State<ApiState>,
    AdminSession(principal): AdminSession,
    Json(payload): Json<CategoryCreateRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let category = state
        .categories
        .create(principal.actor_label(), payload.into())
        .await
        .map_err(content_to_api)?;
    Ok(Json(json!({ "category": category })))
}

pub async fn update_category(
    State(state): State<ApiState>,
    AdminSession(_principal): AdminSession,
    Path(id): Path<String>,
    Json(payload): Json<CategoryUpdateRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let category = state
        .categories
        .update(&id, payload.into())
        .await
        .map_err(content_to_api)?;
    Ok(Json(json!({ "category": category })))
}

pub async fn delete_category(
    State(state): State<ApiState>,
    AdminSession(_principal): AdminSession,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    state.categories.delete(&id).await.map_err(content_to_api)?;
    Ok(Json(json!({ "success": true })))
}
