use std::sync::Arc;
use axum::{Extension, Json};
use axum::extract::{Path, Query, State};
use crate::auth::middleware::require_admin;
use crate::auth::model::AuthUser;
use crate::core::AppState;
use crate::core::pagination::{Page, PageParams};
use crate::errors::{AppError, AppResponse};
use crate::users::model::{CreateUserRequest, UpdateUserRequest, UserDto};
use crate::users::service::UserService;

pub async fn handle_create_user(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<CreateUserRequest>,
) -> AppResponse<Json<UserDto>> {
    require_admin(&user)?;
    if payload.name.trim().is_empty() || !payload.email.contains('@') {
        return Err(AppError::ValidationError("Name and a valid email are required.".to_string()));
    }
    let created = UserService::create_user(state, payload).await?;
    Ok(Json(created))
}

pub async fn handle_get_users(
    State(state): State<Arc<AppState>>,
    Query(params): Query<PageParams>,
) -> AppResponse<Json<Page<UserDto>>> {
    let page = UserService::find_all(state, params).await?;
    Ok(Json(page))
}

pub async fn handle_get_user(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> AppResponse<Json<UserDto>> {
    let user = UserService::find_one(state, id).await?;
    Ok(Json(user))
}

pub async fn handle_update_user(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateUserRequest>,
) -> AppResponse<Json<UserDto>> {
    // Users edit their own profile, admins edit anyone.
    if user.id != id {
        require_admin(&user)?;
    }
    let updated = UserService::update(state, id, payload).await?;
    Ok(Json(updated))
}

pub async fn handle_delete_user(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<i64>,
) -> AppResponse<()> {
    require_admin(&user)?;
    UserService::remove(state, id).await?;
    Ok(())
}
