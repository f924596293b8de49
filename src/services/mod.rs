pub mod application_service;
pub mod auth_service;
pub mod job_service;
pub mod resume_store;
pub mod token_service;

pub use resume_store::UploadedFile;

use mongodb::bson::oid::ObjectId;

use crate::models::{Identity, Role};
use crate::utils::AppError;

/// Parses a path id, mapping a malformed value to `InvalidInput`.
pub fn parse_id(raw: &str, message: &str) -> Result<ObjectId, AppError> {
    ObjectId::parse_str(raw.trim()).map_err(|_| AppError::invalid(message))
}

pub(crate) fn require_role(identity: &Identity, role: Role, message: &str) -> Result<(), AppError> {
    if identity.role != role {
        log::warn!("⛔ {} ({}) denied: {}", identity.id, identity.role, message);
        return Err(AppError::forbidden(message));
    }
    Ok(())
}
