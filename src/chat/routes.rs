use std::sync::Arc;
use axum::Router;
use axum::routing::get;
use crate::chat::gateway::handle_chat_socket;
use crate::chat::handler::{handle_get_chat_list, handle_get_messages};
use crate::core::AppState;

pub fn create_chat_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/chat/messages/{other_user_id}", get(handle_get_messages))
        .route("/chat/list", get(handle_get_chat_list))
        .route("/chat/ws", get(handle_chat_socket))
}
