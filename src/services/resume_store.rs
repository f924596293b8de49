use std::path::{Path, PathBuf};
use uuid::Uuid;

use crate::utils::AppError;

pub const PDF_CONTENT_TYPE: &str = "application/pdf";

/// File part of a profile update, already buffered and size-checked.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

/// Stores uploaded resumes as flat files under a single directory.
#[derive(Debug, Clone)]
pub struct ResumeStore {
    dir: PathBuf,
    max_bytes: usize,
}

impl ResumeStore {
    /// Creates the directory if it does not exist.
    pub fn new(dir: impl Into<PathBuf>, max_bytes: usize) -> std::io::Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir, max_bytes })
    }

    pub fn max_bytes(&self) -> usize {
        self.max_bytes
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn check_content_type(content_type: Option<&str>) -> Result<(), AppError> {
        match content_type {
            Some(ct) if ct.eq_ignore_ascii_case(PDF_CONTENT_TYPE) => Ok(()),
            _ => Err(AppError::invalid("Only PDF files are allowed")),
        }
    }

    pub fn check_size(&self, len: usize) -> Result<(), AppError> {
        if len > self.max_bytes {
            return Err(AppError::invalid(format!(
                "File too large. Maximum size is {} MB",
                self.max_bytes / (1024 * 1024)
            )));
        }
        Ok(())
    }

    /// Validates and writes the file, returning the stored name.
    /// Nothing is left on disk when validation or the write fails.
    pub async fn save(&self, content_type: Option<&str>, bytes: &[u8]) -> Result<String, AppError> {
        Self::check_content_type(content_type)?;
        self.check_size(bytes.len())?;

        let filename = format!(
            "{}-{}.pdf",
            chrono::Utc::now().timestamp_millis(),
            Uuid::new_v4().simple()
        );
        let path = self.dir.join(&filename);

        if let Err(e) = tokio::fs::write(&path, bytes).await {
            let _ = tokio::fs::remove_file(&path).await;
            return Err(AppError::unexpected(format!("Failed to store resume: {}", e)));
        }

        log::info!("📄 Resume stored: {} ({} bytes)", filename, bytes.len());
        Ok(filename)
    }

    /// Reads a stored resume by exact name.
    pub async fn open(&self, filename: &str) -> Result<Vec<u8>, AppError> {
        validate_filename(filename)?;

        match tokio::fs::read(self.dir.join(filename)).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(AppError::not_found("Resume not found"))
            }
            Err(e) => Err(AppError::unexpected(format!("Failed to read resume: {}", e))),
        }
    }

    pub async fn remove(&self, filename: &str) {
        if validate_filename(filename).is_ok() {
            if let Err(e) = tokio::fs::remove_file(self.dir.join(filename)).await {
                log::warn!("⚠️  Could not remove old resume {}: {}", filename, e);
            }
        }
    }
}

/// Rejects anything that could leave the upload directory.
pub fn validate_filename(filename: &str) -> Result<(), AppError> {
    if filename.is_empty()
        || filename.contains("..")
        || filename.contains('/')
        || filename.contains('\\')
        || filename.contains('\0')
    {
        return Err(AppError::invalid("Invalid filename"));
    }
    Ok(())
}
