use axum::extract::multipart::{Field, Multipart, MultipartError};
use axum::http::StatusCode;
use std::path::{Path, PathBuf};
use thiserror::Error;
use uuid::Uuid;

/// Multipart field carrying the photo
pub const FILE_FIELD: &str = "file";

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("no file uploaded")]
    NoFile,

    #[error("uploaded file is not an image")]
    NotImage,

    #[error("uploaded file exceeds {max} bytes")]
    TooLarge { max: usize },

    #[error("malformed multipart body: {0}")]
    Multipart(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl UploadError {
    fn from_multipart(err: MultipartError, max: usize) -> Self {
        if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
            UploadError::TooLarge { max }
        } else {
            UploadError::Multipart(err.body_text())
        }
    }
}

/// A validated photo held in memory; nothing has touched the disk yet.
#[derive(Debug)]
pub struct PhotoUpload {
    pub original_name: Option<String>,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Pull the `file` field out of the body, rejecting non-images and oversize files.
pub async fn read_photo(multipart: &mut Multipart, max_size: usize) -> Result<PhotoUpload, UploadError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| UploadError::from_multipart(e, max_size))?
    {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        let content_type = field.content_type().map(str::to_string);
        check_content_type(content_type.as_deref())?;
        let original_name = field.file_name().map(str::to_string);
        let bytes = read_limited(field, max_size).await?;
        if bytes.is_empty() {
            return Err(UploadError::NoFile);
        }
        return Ok(PhotoUpload {
            original_name,
            content_type: content_type.unwrap_or_default(),
            bytes,
        });
    }
    Err(UploadError::NoFile)
}

async fn read_limited(mut field: Field<'_>, max_size: usize) -> Result<Vec<u8>, UploadError> {
    let mut bytes = Vec::new();
    while let Some(chunk) = field
        .chunk()
        .await
        .map_err(|e| UploadError::from_multipart(e, max_size))?
    {
        check_size(bytes.len() + chunk.len(), max_size)?;
        bytes.extend_from_slice(&chunk);
    }
    Ok(bytes)
}

pub fn check_content_type(content_type: Option<&str>) -> Result<(), UploadError> {
    match content_type {
        Some(mime) if mime.trim().to_ascii_lowercase().starts_with("image/") => Ok(()),
        _ => Err(UploadError::NotImage),
    }
}

pub fn check_size(size: usize, max_size: usize) -> Result<(), UploadError> {
    if size > max_size {
        return Err(UploadError::TooLarge { max: max_size });
    }
    Ok(())
}

/// `photo_<bootcampId><ext>`, keeping the uploaded file's extension
pub fn photo_file_name(bootcamp: Uuid, original_name: Option<&str>) -> String {
    let ext = original_name
        .and_then(|name| Path::new(name).extension())
        .and_then(|ext| ext.to_str())
        .filter(|ext| ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(|ext| format!(".{}", ext.to_ascii_lowercase()))
        .unwrap_or_default();
    format!("photo_{}{}", bootcamp, ext)
}

pub async fn store(dir: &Path, file_name: &str, bytes: &[u8]) -> Result<PathBuf, UploadError> {
    tokio::fs::create_dir_all(dir).await?;
    let path = dir.join(file_name);
    tokio::fs::write(&path, bytes).await?;
    tracing::info!("Stored upload {} ({} bytes)", path.display(), bytes.len());
    Ok(path)
}
