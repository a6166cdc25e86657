//! Administrator authentication for API handlers.

use axum::extract::FromRequestParts;
use axum::http::{HeaderValue, StatusCode, header::AUTHORIZATION, request::Parts};
use tracing::warn;

use crate::application::auth::{AdminPrincipal, AuthError};

use super::error::{ApiError, codes};
use super::state::ApiState;

/// An administrator verified from the `Authorization: Bearer` header.
///
/// Handlers that take this extractor reject the request before touching any
/// store.
#[derive(Debug, Clone)]
pub struct AdminSession(pub AdminPrincipal);

impl FromRequestParts<ApiState> for AdminSession {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &ApiState,
    ) -> Result<Self, Self::Rejection> {
        let token =
            extract_token(parts.headers.get(AUTHORIZATION)).ok_or_else(ApiError::unauthorized)?;

        match state.identity.verify(&token).await {
            Ok(principal) => Ok(AdminSession(principal)),
            Err(AuthError::Missing | AuthError::Invalid | AuthError::Rejected(_)) => {
                Err(ApiError::unauthorized())
            }
            Err(AuthError::Provider(message)) => {
                warn!(
                    target = "vitrine::http::auth",
                    error = %message,
                    "Identity provider unavailable during verification"
                );
                Err(ApiError::new(
                    StatusCode::BAD_GATEWAY,
                    codes::IDENTITY,
                    "Identity provider unavailable",
                    Some(message),
                ))
            }
        }
    }
}

fn extract_token(header: Option<&HeaderValue>) -> Option<String> {
    let raw = header?.to_str().ok()?;
    let bearer = raw.strip_prefix("Bearer ")?.trim();
    if bearer.is_empty() {
        return None;
    }
    Some(bearer.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_bearer_tokens_only() {
        let bearer = HeaderValue::from_static("Bearer abc");
        let basic = HeaderValue::from_static("Basic abc");
        let empty = HeaderValue::from_static("Bearer  ");

        assert_eq!(extract_token(Some(&bearer)).as_deref(), Some("abc"));
        assert_eq!(extract_token(Some(&basic)), None);
        assert_eq!(extract_token(Some(&empty)), None);
        assert_eq!(extract_token(None), None);
    }
}
