use std::sync::Arc;
use axum::{Extension, Json};
use axum::extract::{Path, Query, State};
use crate::auth::model::AuthUser;
use crate::chat::model::{ChatListItem, ChatMessageDto};
use crate::chat::service::ChatService;
use crate::core::AppState;
use crate::core::pagination::{Page, PageParams};
use crate::errors::AppResponse;

pub async fn handle_get_messages(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(other_user_id): Path<i64>,
    Query(params): Query<PageParams>,
) -> AppResponse<Json<Page<ChatMessageDto>>> {
    let page = ChatService::get_messages(state, user.id, other_user_id, params).await?;
    Ok(Json(page))
}

pub async fn handle_get_chat_list(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> AppResponse<Json<Vec<ChatListItem>>> {
    let chats = ChatService::get_user_chats(state, user.id).await?;
    Ok(Json(chats))
}
