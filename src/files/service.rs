use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::Arc;
use log::info;
use uuid::Uuid;
use crate::core::AppState;
use crate::errors::AppError;
use crate::files::model::UploadedFileDto;

const ALLOWED_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "webp"];

pub struct FileService;

impl FileService {

    /// Stores an uploaded image under a fresh random name, keeping only the
    /// extension from the client's filename.
    pub async fn store_image(state: Arc<AppState>, original_name: &str, bytes: &[u8]) -> Result<UploadedFileDto, AppError> {
        if bytes.is_empty() {
            return Err(AppError::ValidationError("Uploaded file is empty.".to_string()));
        }
        let extension = extension_of(original_name).ok_or_else(|| {
            AppError::ValidationError("Unsupported image type.".to_string())
        })?;

        let filename = format!("{}.{}", Uuid::new_v4(), extension);
        let dir = PathBuf::from(&state.env.uploads.dir);
        tokio::fs::create_dir_all(&dir).await.map_err(|err| {
            AppError::ProcessingError(format!("Can't create upload directory: {}", err))
        })?;
        tokio::fs::write(dir.join(&filename), bytes).await.map_err(|err| {
            AppError::ProcessingError(format!("Can't store upload: {}", err))
        })?;

        info!("Stored upload {} ({} bytes).", filename, bytes.len());
        Ok(UploadedFileDto {
            url: format!("{}/uploads/{}", state.env.http.app_url, filename),
            filename,
        })
    }

    pub async fn open_image(state: Arc<AppState>, filename: &str) -> Result<(Vec<u8>, &'static str), AppError> {
        check_filename(filename)?;
        let path = PathBuf::from(&state.env.uploads.dir).join(filename);
        let bytes = tokio::fs::read(&path).await.map_err(|err| match err.kind() {
            ErrorKind::NotFound => AppError::NotFound(format!("File {} not found.", filename)),
            _ => AppError::ProcessingError(format!("Can't read upload: {}", err)),
        })?;
        Ok((bytes, content_type_for(filename)))
    }

    pub async fn remove_image(state: Arc<AppState>, filename: &str) -> Result<(), AppError> {
        check_filename(filename)?;
        let path = PathBuf::from(&state.env.uploads.dir).join(filename);
        tokio::fs::remove_file(&path).await.map_err(|err| match err.kind() {
            ErrorKind::NotFound => AppError::NotFound(format!("File {} not found.", filename)),
            _ => AppError::ProcessingError(format!("Can't delete upload: {}", err)),
        })?;
        info!("Deleted upload {}.", filename);
        Ok(())
    }

}

/// Uploads are addressed by bare filename only; anything that could walk out
/// of the upload directory is rejected.
fn check_filename(filename: &str) -> Result<(), AppError> {
    if filename.is_empty()
        || filename.contains('/')
        || filename.contains('\\')
        || filename.contains("..")
    {
        return Err(AppError::ValidationError("Invalid filename.".to_string()));
    }
    Ok(())
}

fn extension_of(name: &str) -> Option<String> {
    let extension = name.rsplit('.').next()?.to_ascii_lowercase();
    if name.contains('.') && ALLOWED_EXTENSIONS.contains(&extension.as_str()) {
        Some(extension)
    } else {
        None
    }
}

fn content_type_for(filename: &str) -> &'static str {
    match filename.rsplit('.').next() {
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use crate::core::test_support::test_state;

    #[test]
    fn traversal_filenames_are_rejected() {
        assert!(check_filename("../../etc/passwd").is_err());
        assert!(check_filename("a/b.png").is_err());
        assert!(check_filename("a\\b.png").is_err());
        assert!(check_filename("").is_err());
        assert!(check_filename("photo.png").is_ok());
    }

    #[test]
    fn only_image_extensions_are_accepted() {
        assert_eq!(extension_of("cat.PNG").as_deref(), Some("png"));
        assert_eq!(extension_of("archive.tar.gz"), None);
        assert_eq!(extension_of("script.sh"), None);
        assert_eq!(extension_of("noextension"), None);
    }

    #[tokio::test]
    async fn store_read_delete_roundtrip() {
        let mut state = test_state().await;
        let dir = std::env::temp_dir().join(format!("courier-test-{}", uuid::Uuid::new_v4()));
        Arc::get_mut(&mut state).unwrap().env.uploads.dir = dir.to_string_lossy().to_string();

        let stored = FileService::store_image(state.clone(), "cat.png", b"not-really-a-png").await.unwrap();
        assert!(stored.filename.ends_with(".png"));
        assert!(stored.url.ends_with(&stored.filename));

        let (bytes, content_type) = FileService::open_image(state.clone(), &stored.filename).await.unwrap();
        assert_eq!(bytes, b"not-really-a-png");
        assert_eq!(content_type, "image/png");

        FileService::remove_image(state.clone(), &stored.filename).await.unwrap();
        let gone = FileService::open_image(state, &stored.filename).await;
        assert!(matches!(gone, Err(crate::errors::AppError::NotFound(_))));

        tokio::fs::remove_dir_all(&dir).await.unwrap();
    }
}
