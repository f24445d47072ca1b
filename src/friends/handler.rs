use std::sync::Arc;
use axum::{Extension, Json};
use axum::extract::{Query, State};
use crate::auth::model::AuthUser;
use crate::core::AppState;
use crate::core::pagination::Page;
use crate::errors::AppResponse;
use crate::friends::model::{FriendRequestDto, FriendRequestQueryParams, FriendRequestListItem, RespondFriendRequestPayload, SendFriendRequestPayload};
use crate::friends::service::FriendService;
use crate::users::model::UserSummary;

pub async fn handle_send_friend_request(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<SendFriendRequestPayload>,
) -> AppResponse<Json<FriendRequestDto>> {
    let request = FriendService::send_friend_request(state, user.id, payload.receiver_id).await?;
    Ok(Json(request))
}

pub async fn handle_respond_friend_request(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<RespondFriendRequestPayload>,
) -> AppResponse<Json<FriendRequestDto>> {
    let request = FriendService::respond_to_friend_request(state, payload.request_id, user.id, payload.status).await?;
    Ok(Json(request))
}

pub async fn handle_get_friend_requests(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Query(params): Query<FriendRequestQueryParams>,
) -> AppResponse<Json<Page<FriendRequestListItem>>> {
    let page = FriendService::get_friend_requests(state, user.id, params).await?;
    Ok(Json(page))
}

pub async fn handle_get_friends(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> AppResponse<Json<Vec<UserSummary>>> {
    let friends = FriendService::get_friends(state, user.id).await?;
    Ok(Json(friends))
}
