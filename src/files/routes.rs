use std::sync::Arc;
use axum::Router;
use axum::routing::{delete, get, post};
use crate::core::AppState;
use crate::files::handler::{handle_delete_image, handle_get_image, handle_upload_image};

pub fn create_file_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/files/image", post(handle_upload_image))
        .route("/files/image/{filename}", get(handle_get_image))
        .route("/files/image", delete(handle_delete_image))
}
