pub mod mongo;

#[cfg(test)]
pub mod memory;

pub use mongo::MongoStore;

use async_trait::async_trait;
use mongodb::bson::oid::ObjectId;
use thiserror::Error;

use crate::models::{
    Account, Applicant, AppliedJobRef, Application, ApplicationStatus, Identity, Job, JobFilter,
    PostedJobRef, Recruiter,
};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] mongodb::error::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] mongodb::bson::ser::Error),

    #[error("Duplicate key: {0}")]
    Duplicate(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Result of the conditional push behind `apply`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    Applied,
    AlreadyApplied,
    JobNotFound,
}

/// Persistence boundary for accounts and jobs.
///
/// Every mutation targets a single document; callers rely on per-document
/// atomicity only.
#[async_trait]
pub trait Store: Send + Sync {
    async fn ping(&self) -> StoreResult<()>;

    /// Looks in the applicant partition first, then the recruiter one.
    async fn find_account_by_email(&self, email: &str) -> StoreResult<Option<Account>>;

    async fn find_account(&self, identity: &Identity) -> StoreResult<Option<Account>>;

    async fn insert_account(&self, account: &Account) -> StoreResult<()>;

    /// Writes name, email and (for applicants) profile. Job references are left alone.
    async fn save_account_fields(&self, account: &Account) -> StoreResult<bool>;

    async fn find_applicants(&self, ids: &[ObjectId]) -> StoreResult<Vec<Applicant>>;

    async fn find_recruiters(&self, ids: &[ObjectId]) -> StoreResult<Vec<Recruiter>>;

    async fn push_posted_job(&self, recruiter_id: &ObjectId, posted: &PostedJobRef) -> StoreResult<()>;

    async fn push_applied_job(&self, applicant_id: &ObjectId, applied: &AppliedJobRef) -> StoreResult<()>;

    async fn set_applied_job_status(
        &self,
        applicant_id: &ObjectId,
        job_id: &ObjectId,
        status: ApplicationStatus,
    ) -> StoreResult<()>;

    /// Removes every posted/applied reference to a job.
    async fn pull_job_refs(&self, job_id: &ObjectId) -> StoreResult<()>;

    async fn insert_job(&self, job: &Job) -> StoreResult<()>;

    async fn find_job(&self, id: &ObjectId) -> StoreResult<Option<Job>>;

    async fn find_jobs_by_ids(&self, ids: &[ObjectId]) -> StoreResult<Vec<Job>>;

    /// Writes the editable job fields. Applications are left alone.
    async fn save_job_fields(&self, job: &Job) -> StoreResult<bool>;

    async fn delete_job(&self, id: &ObjectId) -> StoreResult<bool>;

    /// Newest first. Returns the page and the total number of matches.
    async fn list_jobs(&self, filter: &JobFilter, skip: u64, limit: u64) -> StoreResult<(Vec<Job>, u64)>;

    async fn all_jobs(&self) -> StoreResult<Vec<Job>>;

    async fn jobs_by_recruiter(&self, recruiter_id: &ObjectId) -> StoreResult<Vec<Job>>;

    async fn jobs_with_applicant(&self, applicant_id: &ObjectId) -> StoreResult<Vec<Job>>;

    /// Appends the application unless the applicant already has one on the job.
    async fn add_application(&self, job_id: &ObjectId, application: &Application) -> StoreResult<ApplyOutcome>;

    /// Overwrites the status in place. `false` when the job or application is missing.
    async fn set_application_status(
        &self,
        job_id: &ObjectId,
        applicant_id: &ObjectId,
        status: ApplicationStatus,
    ) -> StoreResult<bool>;
}
