//! API handlers organized by resource type.
//!
//! Each submodule contains handlers for one resource. Error conversions shared
//! across modules are defined here.

mod auth;
mod categories;
mod images;
mod messages;
mod projects;
mod services;
mod settings;

pub use auth::*;
pub use categories::*;
pub use images::*;
pub use messages::*;
pub use projects::*;
pub use services::*;
pub use settings::*;

use axum::http::StatusCode;

use crate::application::content::ContentError;
use crate::application::repos::RepoError;
use crate::infra::uploads::ImageStorageError;

use super::error::{ApiError, codes};

pub(crate) fn repo_to_api(err: RepoError) -> ApiError {
    match err {
        RepoError::NotFound => ApiError::not_found("resource not found"),
        RepoError::InvalidInput { message } => ApiError::new(
            StatusCode::BAD_REQUEST,
            codes::INVALID_INPUT,
            "Invalid input",
            Some(message),
        ),
        RepoError::StoreUnavailable { table } => ApiError::new(
            StatusCode::SERVICE_UNAVAILABLE,
            codes::STORE_UNAVAILABLE,
            "Database table not found. Please run database setup first.",
            Some(table),
        ),
        RepoError::Timeout => ApiError::new(
            StatusCode::SERVICE_UNAVAILABLE,
            codes::DB_TIMEOUT,
            "Database timeout",
            None,
        ),
        RepoError::Persistence(msg) => ApiError::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            codes::REPO,
            "Persistence error",
            Some(msg),
        ),
    }
}

pub(crate) fn content_to_api(err: ContentError) -> ApiError {
    match err {
        ContentError::ConstraintViolation(message) => ApiError::new(
            StatusCode::BAD_REQUEST,
            codes::INVALID_INPUT,
            message,
            None,
        ),
        ContentError::NotFound { entity } => ApiError::not_found(format!("{entity} not found")),
        ContentError::Repo(repo) => repo_to_api(repo),
    }
}

pub(crate) fn image_to_api(err: ImageStorageError) -> ApiError {
    match err {
        ImageStorageError::Io(io) => ApiError::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            codes::UPLOAD,
            "Failed to store image",
            Some(io.to_string()),
        ),
        other => ApiError::new(
            StatusCode::BAD_REQUEST,
            codes::UPLOAD,
            "Invalid image request",
            Some(other.to_string()),
        ),
    }
}
