use std::sync::Arc;
use axum::Router;
use axum::routing::{get, post};
use crate::auth::handler::{handle_forgot_password, handle_login, handle_refresh, handle_register, handle_reset_password, handle_verify_email};
use crate::core::AppState;

pub fn create_auth_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/auth/register", post(handle_register))
        .route("/auth/login", post(handle_login))
        .route("/auth/refresh", post(handle_refresh))
        .route("/auth/verify-email", get(handle_verify_email))
        .route("/auth/forgot-password", post(handle_forgot_password))
        .route("/auth/reset-password", post(handle_reset_password))
}
