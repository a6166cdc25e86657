//! Admin signup handler

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use crate::application::auth::AuthError;

use crate::infra::http::api::error::{ApiError, codes};
use crate::infra::http::api::models::SignupRequest;
use crate::infra::http::api::state::ApiState;

pub async fn signup(
    State(state): State<ApiState>,
    Json(payload): Json<SignupRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if !state.allow_signup {
        return Err(ApiError::forbidden("Signup is disabled"));
    }
    let email = payload.email.trim();
    if email.is_empty() || payload.password.is_empty() {
        return Err(ApiError::bad_request("Email and password required", None));
    }

    let name = payload.name.as_deref().filter(|name| !name.trim().is_empty());
    let account = state
        .identity
        .create_admin(email, &payload.password, name)
        .await
        .map_err(|err| match err {
            AuthError::Rejected(message) => ApiError::new(
                StatusCode::BAD_REQUEST,
                codes::SIGNUP_REJECTED,
                "Signup rejected",
                Some(message),
            ),
            other => ApiError::new(
                StatusCode::BAD_GATEWAY,
                codes::IDENTITY,
                "Identity provider unavailable",
                Some(other.to_string()),
            ),
        })?;

    Ok(Json(json!({ "data": account })))
}
