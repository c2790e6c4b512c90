//! Stores uploaded profile images on disk under unique names.

use std::path::PathBuf;
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("Only image uploads are allowed")]
    NotAnImage,

    #[error("Failed to store upload: {0}")]
    Io(#[from] std::io::Error),
}

pub struct UploadService {
    uploads_dir: PathBuf,
}

impl UploadService {
    #[must_use]
    pub fn new(uploads_dir: impl Into<PathBuf>) -> Self {
        Self {
            uploads_dir: uploads_dir.into(),
        }
    }

    /// Write image bytes to the uploads directory under a random name,
    /// returning the public URL path for the stored file. The original
    /// filename only contributes its extension, so path traversal in
    /// client-supplied names is a non-issue.
    pub async fn save_image(
        &self,
        original_name: &str,
        bytes: &[u8],
    ) -> Result<String, UploadError> {
        let ext = std::path::Path::new(original_name)
            .extension()
            .and_then(|e| e.to_str())
            .map_or_else(|| "jpg".to_string(), str::to_lowercase);

        let mime = mime_guess::from_ext(&ext).first_or_octet_stream();
        if mime.type_() != mime_guess::mime::IMAGE {
            return Err(UploadError::NotAnImage);
        }

        let filename = format!("{}.{ext}", Uuid::new_v4());

        tokio::fs::create_dir_all(&self.uploads_dir).await?;
        tokio::fs::write(self.uploads_dir.join(&filename), bytes).await?;

        debug!("Stored upload {} ({} bytes)", filename, bytes.len());
        Ok(format!("/uploads/{filename}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_save_image_generates_unique_urls() {
        let dir = std::env::temp_dir().join(format!("uploads-test-{}", Uuid::new_v4()));
        let svc = UploadService::new(&dir);

        let a = svc.save_image("avatar.png", b"fake-png").await.unwrap();
        let b = svc.save_image("avatar.png", b"fake-png").await.unwrap();

        assert_ne!(a, b);
        assert!(a.starts_with("/uploads/"));
        assert!(a.ends_with(".png"));

        tokio::fs::remove_dir_all(&dir).await.unwrap();
    }

    #[tokio::test]
    async fn test_save_image_rejects_non_image_extension() {
        let dir = std::env::temp_dir().join(format!("uploads-test-{}", Uuid::new_v4()));
        let svc = UploadService::new(&dir);

        let err = svc.save_image("payload.exe", b"MZ").await.unwrap_err();
        assert!(matches!(err, UploadError::NotAnImage));
    }
}
