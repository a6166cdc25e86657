pub mod api;
mod middleware;

pub use api::{ApiState, build_api_router};

use std::path::Component;

use axum::{
    Router,
    body::Body,
    extract::{DefaultBodyLimit, Path, State},
    http::{StatusCode, header},
    middleware as axum_middleware,
    response::{IntoResponse, Response},
    routing::get,
};
use tokio::fs;

use crate::application::error::AppError;
use crate::infra::error::InfraError;

/// Full application router: API, uploaded images and the health probe, wrapped
/// in request-id and response logging middleware.
pub fn build_router(state: ApiState, max_request_bytes: usize) -> Router {
    let uploads = Router::new()
        .route("/uploads/{name}", get(serve_upload))
        .with_state(state.clone());

    build_api_router(state)
        .merge(uploads)
        .route("/health", get(health))
        .layer(DefaultBodyLimit::max(max_request_bytes))
        .layer(axum_middleware::from_fn(middleware::log_responses))
        .layer(axum_middleware::from_fn(middleware::set_request_context))
}

async fn health() -> &'static str {
    "ok"
}

async fn serve_upload(State(state): State<ApiState>, Path(name): Path<String>) -> Response {
    let mut components = std::path::Path::new(&name).components();
    if !matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    ) {
        return StatusCode::NOT_FOUND.into_response();
    }

    match fs::read(state.images.root().join(&name)).await {
        Ok(bytes) => {
            let mime = mime_guess::from_path(&name).first_or_octet_stream();
            (
                [(header::CONTENT_TYPE, mime.essence_str().to_string())],
                Body::from(bytes),
            )
                .into_response()
        }
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            StatusCode::NOT_FOUND.into_response()
        }
        Err(err) => AppError::from(InfraError::Io(err)).into_response(),
    }
}
