use std::sync::Arc;
use axum::Router;
use axum::routing::{get, post};
use crate::core::AppState;
use crate::friends::handler::{handle_get_friend_requests, handle_get_friends, handle_respond_friend_request, handle_send_friend_request};

pub fn create_friend_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/friend-requests/send", post(handle_send_friend_request))
        .route("/friend-requests/respond", post(handle_respond_friend_request))
        .route("/friend-requests", get(handle_get_friend_requests))
        .route("/friend-requests/friends", get(handle_get_friends))
}
