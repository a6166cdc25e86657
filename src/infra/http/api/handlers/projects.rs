//! Projects handlers

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use serde_json::json;

use super::content_to_api;
use crate::infra::http::api::error::ApiError;
use crate::infra::http::api::middleware::AdminSession;
use crate::infra::http::api::models::{
    ProjectCreateRequest, ProjectListQuery, ProjectUpdateRequest,
};
use crate::infra::http::api::state::ApiState;

pub async fn list_projects(
    State(state): State<ApiState>,
    Query(query): Query<ProjectListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let category_id = query.category_id.as_deref().filter(|id| !id.is_empty());
    let projects = state
        .projects
        .list(category_id)
        .await
        .map_err(content_to_api)?;
    Ok(Json(json!({ "projects": projects })))
}

pub async fn get_project(
    State(state): State<ApiState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let project = state.projects.get(&id).await.map_err(content_to_api)?;
    Ok(Json(json!({ "project": project })))
}

pub async fn create_project(
    State(state): State<ApiState>,
    AdminSession(principal): AdminSession,
    Json(payload): Json<ProjectCreateRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let project = state
        .projects
        .create(principal.actor_label(), payload.into())
        .await
        .map_err(content_to_api)?;
    Ok(Json(json!({ "project": project })))
}

pub async fn update_project(
    State(state): State<ApiState>,
    AdminSession(_principal): AdminSession,
    Path(id): Path<String>,
    Json(payload): Json<ProjectUpdateRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let project = state
        .projects
        .update(&id, payload.into())
        .await
        .map_err(content_to_api)?;
    Ok(Json(json!({ "project": project })))
}

pub async fn delete_project(
    State(state): State<ApiState>,
    AdminSession(_principal): AdminSession,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    state.projects.delete(&id).await.map_err(content_to_api)?;
    Ok(Json(json!({ "success": true })))
}
