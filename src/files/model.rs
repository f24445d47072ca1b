use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct UploadedFileDto {
    pub filename: String,
    pub url: String,
}

#[derive(Debug, Deserialize)]
pub struct DeleteFileParams {
    pub filename: String,
}
