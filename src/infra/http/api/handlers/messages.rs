//! Contact message handlers

use axum::Json;
use axum::extract::{Path, State};
use axum::response::IntoResponse;
use serde_json::json;

use super::content_to_api;
use crate::infra::http::api::error::ApiError;
use crate::infra::http::api::middleware::AdminSession;
use crate::infra::http::api::models::MessageCreateRequest;
use crate::infra::http::api::state::ApiState;

pub async fn list_messages(
    State(state): State<ApiState>,
    AdminSession(_principal): AdminSession,
) -> Result<impl IntoResponse, ApiError> {
    let messages = state.messages.list().await.map_err(content_to_api)?;
    Ok(Json(json!({ "messages": messages })))
}

pub async fn submit_message(
    State(state): State<ApiState>,
    Json(payload): Json<MessageCreateRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let message = state
        .messages
        .submit(payload.into())
        .await
        .map_err(content_to_api)?;
    Ok(Json(json!({ "message": message })))
}

pub async fn mark_message_read(
    State(state): State<ApiState>,
    AdminSession(principal): AdminSession,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let message = state
        .messages
        .mark_read(principal.actor_label(), &id)
        .await
        .map_err(content_to_api)?;
    Ok(Json(json!({ "message": message })))
}

pub async fn delete_message(
    State(state): State<ApiState>,
    AdminSession(_principal): AdminSession,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    state.messages.delete(&id).await.map_err(content_to_api)?;
    Ok(Json(json!({ "success": true })))
}
