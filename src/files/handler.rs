use std::sync::Arc;
use axum::Json;
use axum::extract::{Multipart, Path, Query, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use crate::auth::model::StatusMessage;
use crate::core::AppState;
use crate::errors::{AppError, AppResponse};
use crate::files::model::{DeleteFileParams, UploadedFileDto};
use crate::files::service::FileService;

pub async fn handle_upload_image(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> AppResponse<Json<UploadedFileDto>> {
    while let Some(field) = multipart.next_field().await.map_err(|err| {
        AppError::ValidationError(format!("Malformed multipart body: {}", err))
    })? {
        if field.name() != Some("file") {
            continue;
        }
        let original_name = field.file_name().unwrap_or_default().to_string();
        let bytes = field.bytes().await.map_err(|err| {
            AppError::ValidationError(format!("Can't read upload: {}", err))
        })?;
        let stored = FileService::store_image(state, &original_name, &bytes).await?;
        return Ok(Json(stored));
    }
    Err(AppError::ValidationError("Multipart field 'file' is required.".to_string()))
}

pub async fn handle_get_image(
    State(state): State<Arc<AppState>>,
    Path(filename): Path<String>,
) -> AppResponse<Response> {
    let (bytes, content_type) = FileService::open_image(state, &filename).await?;
    Ok(([(header::CONTENT_TYPE, content_type)], bytes).into_response())
}

pub async fn handle_delete_image(
    State(state): State<Arc<AppState>>,
    Query(params): Query<DeleteFileParams>,
) -> AppResponse<Json<StatusMessage>> {
    FileService::remove_image(state, &params.filename).await?;
    Ok(Json(StatusMessage::new("File deleted.")))
}
