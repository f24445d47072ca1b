use std::sync::Arc;
use axum::extract::{Request, State};
use axum::http::header::AUTHORIZATION;
use axum::middleware::Next;
use axum::response::Response;
use crate::auth::model::AuthUser;
use crate::core::AppState;
use crate::errors::AppError;
use crate::users::model::UserRole;

/// Verifies the bearer token and stores the caller's identity in the request
/// extensions. The WebSocket upgrade request passes through here too, so the
/// gateway never re-verifies anything per event.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let auth_header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|header| header.to_str().ok())
        .ok_or_else(|| AppError::Unauthorized("Missing Authorization header.".to_string()))?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| AppError::Unauthorized("Invalid Authorization format.".to_string()))?;

    let claims = state.tokens.verify(token)?;
    request.extensions_mut().insert(AuthUser {
        id: claims.sub,
        email: claims.email,
        role: claims.role,
    });

    Ok(next.run(request).await)
}

pub fn require_admin(user: &AuthUser) -> Result<(), AppError> {
    if user.role != UserRole::Admin {
        return Err(AppError::Forbidden("You are not allowed to perform this action.".to_string()));
    }
    Ok(())
}
