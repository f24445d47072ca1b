use std::sync::Arc;
use axum::Router;
use axum::routing::{delete, get, patch, post};
use crate::core::AppState;
use crate::users::handler::{handle_create_user, handle_delete_user, handle_get_user, handle_get_users, handle_update_user};

pub fn create_user_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/user", post(handle_create_user))
        .route("/user", get(handle_get_users))
        .route("/user/{id}", get(handle_get_user))
        .route("/user/{id}", patch(handle_update_user))
        .route("/user/{id}", delete(handle_delete_user))
}
