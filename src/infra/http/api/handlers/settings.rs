//! Site settings handlers
//!
//! Writes answer with the save report shape
//! `{success, settings?, storeUnavailable?, error?}` for both outcomes.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::Value;

use crate::application::error::ErrorReport;
use crate::application::settings::{SettingsError, SettingsSaveReport, StoredSettings};
use crate::domain::site_config::{SiteConfig, document_from_value};

use crate::infra::http::api::error::ApiError;
use crate::infra::http::api::middleware::AdminSession;
use crate::infra::http::api::models::{SettingsPatchRequest, SettingsResponse};
use crate::infra::http::api::state::ApiState;

pub async fn get_settings(State(state): State<ApiState>) -> impl IntoResponse {
    let resolved = state.settings.resolved().await;
    let whatsapp_url = SiteConfig::from_document(&*resolved.document).whatsapp_url(None);
    Json(SettingsResponse {
        settings: &resolved.document,
        source: resolved.source,
        whatsapp_url,
    })
    .into_response()
}

pub async fn put_settings(
    State(state): State<ApiState>,
    session: Result<AdminSession, ApiError>,
    Json(payload): Json<Value>,
) -> Response {
    let principal = match session {
        Ok(AdminSession(principal)) => Some(principal),
        Err(err) if err.status() == StatusCode::UNAUTHORIZED => None,
        Err(err) => return err.into_response(),
    };
    if principal.is_none() {
        return settings_failure(SettingsError::Unauthorized);
    }
    let Some(document) = document_from_value(payload) else {
        return settings_failure(SettingsError::Validation(
            crate::domain::error::DomainError::validation("settings must be a JSON object"),
        ));
    };

    saved_or_failure(state.settings.save(principal.as_ref(), document).await)
}

pub async fn patch_settings(
    State(state): State<ApiState>,
    AdminSession(principal): AdminSession,
    Json(payload): Json<SettingsPatchRequest>,
) -> Response {
    let path = payload.path.into_segments();
    saved_or_failure(
        state
            .settings
            .update_path(Some(&principal), &path, payload.value)
            .await,
    )
}

pub async fn initialize_settings(
    State(state): State<ApiState>,
    AdminSession(principal): AdminSession,
) -> Response {
    saved_or_failure(state.settings.initialize(Some(&principal)).await)
}

pub async fn reload_settings(
    State(state): State<ApiState>,
    AdminSession(_principal): AdminSession,
) -> impl IntoResponse {
    state.settings.reload().await;
    get_settings(State(state)).await
}

pub async fn settings_status(
    State(state): State<ApiState>,
    AdminSession(_principal): AdminSession,
) -> impl IntoResponse {
    Json(state.settings.status().await)
}

fn saved_or_failure(result: Result<StoredSettings, SettingsError>) -> Response {
    match result {
        Ok(stored) => Json(SettingsSaveReport::saved(&stored)).into_response(),
        Err(err) => settings_failure(err),
    }
}

fn settings_failure(err: SettingsError) -> Response {
    let status = match &err {
        SettingsError::Unauthorized => StatusCode::UNAUTHORIZED,
        SettingsError::Validation(_) => StatusCode::BAD_REQUEST,
        SettingsError::AlreadyInitialized => StatusCode::CONFLICT,
        SettingsError::StoreUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        SettingsError::Transient(_) => StatusCode::BAD_GATEWAY,
    };
    let report = SettingsSaveReport {
        success: false,
        settings: None,
        store_unavailable: matches!(err, SettingsError::StoreUnavailable),
        error: Some(err.to_string()),
    };
    let mut response = (status, Json(report)).into_response();
    ErrorReport::from_error("infra::http::api::settings", status, &err).attach(&mut response);
    response
}
