use std::sync::Arc;
use axum::Json;
use axum::extract::{Query, State};
use crate::auth::model::{ForgotPasswordPayload, LoginPayload, LoginResponse, RefreshPayload, RegisterPayload, ResetPasswordPayload, StatusMessage, TokenPair, VerifyEmailParams};
use crate::auth::service::AuthService;
use crate::core::AppState;
use crate::errors::{AppError, AppResponse};

const MIN_PASSWORD_LEN: usize = 8;

// Payload validation happens here at the boundary, the service never
// re-checks what arrives.

fn validate_email(email: &str) -> Result<(), AppError> {
    let trimmed = email.trim();
    if trimmed.is_empty() || !trimmed.contains('@') || trimmed.contains(' ') {
        return Err(AppError::ValidationError("Email must be a valid email address.".to_string()));
    }
    Ok(())
}

fn validate_password(password: &str) -> Result<(), AppError> {
    if password.len() < MIN_PASSWORD_LEN {
        return Err(AppError::ValidationError(format!("Password must be at least {} characters.", MIN_PASSWORD_LEN)));
    }
    Ok(())
}

pub async fn handle_register(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<RegisterPayload>,
) -> AppResponse<Json<StatusMessage>> {
    if payload.name.trim().is_empty() {
        return Err(AppError::ValidationError("Name is required.".to_string()));
    }
    validate_email(&payload.email)?;
    validate_password(&payload.password)?;

    let message = AuthService::register(state, payload).await?;
    Ok(Json(message))
}

pub async fn handle_login(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<LoginPayload>,
) -> AppResponse<Json<LoginResponse>> {
    validate_email(&payload.email)?;
    let response = AuthService::login(state, &payload.email, &payload.password).await?;
    Ok(Json(response))
}

pub async fn handle_refresh(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<RefreshPayload>,
) -> AppResponse<Json<TokenPair>> {
    if payload.refresh_token.is_empty() {
        return Err(AppError::ValidationError("Refresh token is required.".to_string()));
    }
    let pair = AuthService::refresh_token(state, &payload.refresh_token).await?;
    Ok(Json(pair))
}

pub async fn handle_verify_email(
    State(state): State<Arc<AppState>>,
    Query(params): Query<VerifyEmailParams>,
) -> AppResponse<Json<StatusMessage>> {
    let message = AuthService::verify_email(state, &params.token).await?;
    Ok(Json(message))
}

pub async fn handle_forgot_password(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<ForgotPasswordPayload>,
) -> AppResponse<Json<StatusMessage>> {
    validate_email(&payload.email)?;
    let message = AuthService::forgot_password(state, &payload.email).await?;
    Ok(Json(message))
}

pub async fn handle_reset_password(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<ResetPasswordPayload>,
) -> AppResponse<Json<StatusMessage>> {
    validate_password(&payload.new_password)?;
    let message = AuthService::reset_password(state, &payload.token, &payload.new_password).await?;
    Ok(Json(message))
}
