pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod state;

pub use state::ApiState;

use axum::{
    Router,
    routing::{delete, get, post, put},
};

pub fn build_api_router(state: ApiState) -> Router {
    Router::new()
        .route("/api/auth/signup", post(handlers::signup))
        .route(
            "/api/categories",
            get(handlers::list_categories).post(handlers::create_category),
        )
        .route(
            "/api/categories/{id}",
            get(handlers::get_category)
                .put(handlers::update_category)
                .delete(handlers::delete_category),
        )
        .route(
            "/api/projects",
            get(handlers::list_projects).post(handlers::create_project),
        )
        .route(
            "/api/projects/{id}",
            get(handlers::get_project)
                .put(handlers::update_project)
                .delete(handlers::delete_project),
        )
        .route(
            "/api/services",
            get(handlers::list_services).post(handlers::create_service),
        )
        .route(
            "/api/services/initialize",
            post(handlers::initialize_services),
        )
        .route(
            "/api/services/{id}",
            get(handlers::get_service)
                .put(handlers::update_service)
                .delete(handlers::delete_service),
        )
        .route(
            "/api/messages",
            get(handlers::list_messages).post(handlers::submit_message),
        )
        .route("/api/messages/{id}", delete(handlers::delete_message))
        .route("/api/messages/{id}/read", put(handlers::mark_message_read))
        .route("/api/upload-image", post(handlers::upload_image))
        .route("/api/delete-image", delete(handlers::delete_image))
        .route(
            "/api/settings",
            get(handlers::get_settings)
                .put(handlers::put_settings)
                .patch(handlers::patch_settings),
        )
        .route(
            "/api/settings/initialize",
            post(handlers::initialize_settings),
        )
        .route("/api/settings/reload", post(handlers::reload_settings))
        .route("/api/settings/status", get(handlers::settings_status))
        .with_state(state)
}
