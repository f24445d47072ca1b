use std::error::Error;
use std::fmt;
use std::fmt::{Display, Formatter};
use axum::http::StatusCode;
use axum::Json;
use axum::response::{IntoResponse, Response};
use chrono::Utc;
use serde::Serialize;

pub type AppResponse<T> = Result<T, AppError>;

#[derive(Serialize)]
pub struct ErrorResponse {
    timestamp: String,
    status: u16,
    error: String,
    message: String,
    #[serde(rename = "errorCode")]
    error_code: ErrorCode,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Authentication & Authorization
    InvalidCredentials,
    InsufficientPermissions,

    // Registration & Account Errors
    AlreadyRegistered,

    // Content Errors
    ContentNotFound,

    // General API & Validation Errors
    ValidationError,
    ServiceUnavailable,
    UnexpectedError,
}

#[derive(Debug)]
pub struct HttpError {
    pub status_code: StatusCode,
    pub error_code: ErrorCode,
    pub message: String,
}

impl HttpError {
    pub fn new(status_code: StatusCode, error_code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            status_code,
            error_code,
            message: message.into(),
        }
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        tracing::error!("An error occurred: status={}, code={:?}, msg='{}'", self.status_code, self.error_code, self.message);

        let status = self.status_code;

        let error_response = ErrorResponse {
            timestamp: Utc::now().to_rfc3339(),
            status: status.as_u16(),
            error: status.canonical_reason().unwrap_or("Unknown Status").to_string(),
            message: self.message.clone(),
            error_code: self.error_code,
        };

        (status, Json(error_response)).into_response()
    }
}

pub enum AppError {
    /// The client sent a request the domain logic rejects.
    ValidationError(String),

    /// Missing or bad credential, unverified account or an invalid token.
    Unauthorized(String),

    /// The caller is authenticated but not allowed to do this.
    Forbidden(String),

    /// A requested record was not found.
    NotFound(String),

    /// The request collides with existing state, e.g. re-registering a verified account.
    Conflict(String),

    /// An error coming out of the database. We wrap the original error.
    DatabaseError(Box<dyn Error + Send + Sync>),

    /// An internal processing failure, e.g. while encoding/decoding.
    ProcessingError(String),
}

impl AppError {
    /// Message safe to hand across the boundary. Internal detail stays in the server log.
    pub fn client_message(&self) -> String {
        match self {
            AppError::ValidationError(msg)
            | AppError::Unauthorized(msg)
            | AppError::Forbidden(msg)
            | AppError::NotFound(msg)
            | AppError::Conflict(msg) => msg.clone(),
            AppError::DatabaseError(err) => {
                tracing::error!("Database error: {:?}", err);
                "Internal service outage.".to_string()
            }
            AppError::ProcessingError(msg) => {
                tracing::error!("Intern processing error: {}", msg);
                "Unexpected server error.".to_string()
            }
        }
    }
}

impl fmt::Debug for AppError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::ValidationError(msg) => write!(f, "ValidationError: {}", msg),
            Self::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            Self::Forbidden(msg) => write!(f, "Forbidden: {}", msg),
            Self::NotFound(msg) => write!(f, "NotFound: {}", msg),
            Self::Conflict(msg) => write!(f, "Conflict: {}", msg),
            Self::DatabaseError(err) => write!(f, "DatabaseError: {}", err),
            Self::ProcessingError(msg) => write!(f, "ProcessingError: {}", msg),
        }
    }
}

impl Display for AppError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            AppError::ValidationError(msg) => write!(f, "Invalid input: {}", msg),
            AppError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            AppError::Forbidden(msg) => write!(f, "Forbidden: {}", msg),
            AppError::NotFound(msg) => write!(f, "Entity not found: {}", msg),
            AppError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            AppError::DatabaseError(err) => write!(f, "A database error occurred: {}", err),
            AppError::ProcessingError(msg) => write!(f, "A processing error occurred: {}", msg),
        }
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> AppError {
        AppError::DatabaseError(Box::new(err))
    }
}

impl Error for AppError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            AppError::DatabaseError(err) => Some(err.as_ref()),
            _ => None,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let http_error = match self {
            AppError::ValidationError(msg) => {
                HttpError::new(StatusCode::BAD_REQUEST, ErrorCode::ValidationError, msg)
            }
            AppError::Unauthorized(msg) => {
                HttpError::new(StatusCode::UNAUTHORIZED, ErrorCode::InvalidCredentials, msg)
            }
            AppError::Forbidden(msg) => {
                HttpError::new(StatusCode::FORBIDDEN, ErrorCode::InsufficientPermissions, msg)
            }
            AppError::NotFound(msg) => {
                HttpError::new(StatusCode::NOT_FOUND, ErrorCode::ContentNotFound, msg)
            }
            AppError::Conflict(msg) => {
                HttpError::new(StatusCode::CONFLICT, ErrorCode::AlreadyRegistered, msg)
            }
            AppError::DatabaseError(internal_err) => {
                tracing::error!("Database error: {:?}", internal_err);
                HttpError::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorCode::ServiceUnavailable,
                    "Internal service outage."
                )
            }
            AppError::ProcessingError(msg) => {
                tracing::error!("Intern processing error: {}", msg);
                HttpError::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorCode::UnexpectedError,
                    "Unexpected server error processing."
                )
            }
        };

        http_error.into_response()
    }
}
