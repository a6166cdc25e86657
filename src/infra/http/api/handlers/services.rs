//! Service catalog handlers

use axum::Json;
use axum::extract::{Path, State};
use axum::response::IntoResponse;
use serde_json::json;

use super::content_to_api;
use crate::infra::http::api::error::ApiError;
use crate::infra::http::api::middleware::AdminSession;
use crate::infra::http::api::models::{ServiceCreateRequest, ServiceUpdateRequest};
use crate::infra::http::api::state::ApiState;

pub async fn list_services(State(state): State<ApiState>) -> Result<impl IntoResponse, ApiError> {
    let services = state.services.list().await.map_err(content_to_api)?;
    Ok(Json(json!({ "services": services })))
}

pub async fn get_service(
    State(state): State<ApiState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let service = state.services.get(&id).await.map_err(content_to_api)?;
    Ok(Json(json!({ "service": service })))
}

pub async fn create_service(
    State(state): State<ApiState>,
    AdminSession(principal): AdminSession,
    Json(payload): Json<ServiceCreateRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let service = state
        .services
        .create(principal.actor_label(), payload.into())
        .await
        .map_err(content_to_api)?;
    Ok(Json(json!({ "service": service })))
}

pub async fn update_service(
    State(state): State<ApiState>,
    AdminSession(_principal): AdminSession,
    Path(id): Path<String>,
    Json(payload): Json<ServiceUpdateRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let service = state
        .services
        .update(&id, payload.into())
        .await
        .map_err(content_to_api)?;
    Ok(Json(json!({ "service": service })))
}

pub async fn delete_service(
    State(state): State<ApiState>,
    AdminSession(_principal): AdminSession,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    state.services.delete(&id).await.map_err(content_to_api)?;
    Ok(Json(json!({ "success": true })))
}

pub async fn initialize_services(
    State(state): State<ApiState>,
    AdminSession(principal): AdminSession,
) -> Result<impl IntoResponse, ApiError> {
    let outcome = state
        .services
        .initialize(principal.actor_label())
        .await
        .map_err(content_to_api)?;
    Ok(Json(outcome))
}
