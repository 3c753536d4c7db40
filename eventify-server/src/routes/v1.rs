use axum::{
    Router,
    routing::{get, post, put},
};

use crate::handlers::superusers;
use crate::infra::app_state::AppState;

/// Create all v1 API routes
pub fn create_v1_router(state: AppState) -> Router<AppState> {
    Router::new()
        // Collection and lookup endpoints
        .route(
            "/superusers",
            post(superusers::create_superuser).get(superusers::list_superusers),
        )
        .route("/superusers/search", get(superusers::search_superusers))
        .route("/superusers/2fa", get(superusers::list_2fa_enabled))
        .route(
            "/superusers/email/{email}",
            get(superusers::get_superuser_by_email),
        )
        .route(
            "/superusers/username/{username}",
            get(superusers::get_superuser_by_username),
        )
        .route(
            "/superusers/reset-token/{token}",
            get(superusers::get_superuser_by_reset_token),
        )
        // Per-record endpoints
        .route(
            "/superusers/{id}",
            get(superusers::get_superuser)
                .put(superusers::update_superuser_details)
                .delete(superusers::delete_superuser),
        )
        .route(
            "/superusers/{id}/role",
            get(superusers::get_role).put(superusers::update_role),
        )
        .route(
            "/superusers/{id}/permissions",
            put(superusers::update_permissions),
        )
        .route(
            "/superusers/{id}/field/{field}",
            put(superusers::update_field),
        )
        .route("/superusers/{id}/enable2fa", post(superusers::enable_2fa))
        .route("/superusers/{id}/disable2fa", post(superusers::disable_2fa))
        .route(
            "/superusers/{id}/generate-reset-token",
            post(superusers::generate_reset_token),
        )
        .route(
            "/superusers/{id}/clear-reset-token",
            post(superusers::clear_reset_token),
        )
        .with_state(state)
}
