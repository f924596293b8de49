use std::sync::Arc;

use crate::config::Config;
use crate::database::Store;
use crate::services::resume_store::ResumeStore;
use crate::services::token_service::TokenService;

/// Process-wide collaborators, built once at startup and shared with every handler.
#[derive(Clone)]
pub struct AppContext {
    pub store: Arc<dyn Store>,
    pub tokens: TokenService,
    pub resumes: ResumeStore,
    pub bcrypt_cost: u32,
}

impl AppContext {
    pub fn new(store: Arc<dyn Store>, config: &Config) -> std::io::Result<Self> {
        Ok(Self {
            store,
            tokens: TokenService::new(
                &config.jwt_secret,
                chrono::Duration::days(config.token_ttl_days),
            ),
            resumes: ResumeStore::new(&config.upload_dir, config.max_resume_bytes)?,
            bcrypt_cost: config.bcrypt_cost,
        })
    }
}
