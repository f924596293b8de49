use async_trait::async_trait;
use futures::stream::TryStreamExt;
use mongodb::bson::{doc, oid::ObjectId, to_bson, Document};
use mongodb::error::{ErrorKind, WriteFailure};
use mongodb::options::IndexOptions;
use mongodb::{Client, Collection, Database, IndexModel};
use std::error::Error;

use super::{ApplyOutcome, Store, StoreError, StoreResult};
use crate::models::{
    Account, Applicant, AppliedJobRef, Application, ApplicationStatus, Identity, Job, JobFilter,
    PostedJobRef, Recruiter, Role,
};

const APPLICANTS: &str = "applicants";
const RECRUITERS: &str = "recruiters";
const JOBS: &str = "jobs";
const DEFAULT_DB_NAME: &str = "job_board";

#[derive(Clone)]
pub struct MongoStore {
    db: Database,
}

impl MongoStore {
    pub async fn connect(uri: &str) -> Result<Self, Box<dyn Error>> {
        let mut client_options = mongodb::options::ClientOptions::parse(uri).await?;

        // Connection pool
        client_options.max_pool_size = Some(20);
        client_options.min_pool_size = Some(5);
        client_options.max_idle_time = Some(std::time::Duration::from_secs(300));

        client_options.connect_timeout = Some(std::time::Duration::from_secs(5));
        client_options.server_selection_timeout = Some(std::time::Duration::from_secs(5));

        let db_name = client_options
            .default_database
            .clone()
            .unwrap_or_else(|| DEFAULT_DB_NAME.to_string());

        let client = Client::with_options(client_options)?;
        let db = client.database(&db_name);

        // Test connection
        db.list_collection_names().await?;

        let store = Self { db };
        store.ensure_indexes().await?;

        Ok(store)
    }

    /// Creates necessary indexes for optimal query performance
    async fn ensure_indexes(&self) -> Result<(), Box<dyn Error>> {
        log::info!("🔧 Creating database indexes...");

        for name in [APPLICANTS, RECRUITERS] {
            let unique_email = IndexModel::builder()
                .keys(doc! { "email": 1 })
                .options(IndexOptions::builder().unique(true).build())
                .build();

            match self.db.collection::<Document>(name).create_index(unique_email).await {
                Ok(_) => log::info!("   ✅ Index created: {}(email) unique", name),
                Err(e) => log::debug!("   ℹ️  Index already exists: {}", e),
            }
        }

        let jobs = self.db.collection::<Document>(JOBS);
        for keys in [
            doc! { "recruiter": 1 },
            doc! { "applicants.applicantId": 1 },
            doc! { "postedAt": -1 },
        ] {
            let label = keys.keys().cloned().collect::<Vec<_>>().join(", ");
            match jobs.create_index(IndexModel::builder().keys(keys).build()).await {
                Ok(_) => log::info!("   ✅ Index created: jobs({})", label),
                Err(e) => log::debug!("   ℹ️  Index already exists: {}", e),
            }
        }

        log::info!("✅ Database indexes ready");

        Ok(())
    }

    fn applicants(&self) -> Collection<Applicant> {
        self.db.collection(APPLICANTS)
    }

    fn recruiters(&self) -> Collection<Recruiter> {
        self.db.collection(RECRUITERS)
    }

    fn jobs(&self) -> Collection<Job> {
        self.db.collection(JOBS)
    }
}

fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    matches!(
        err.kind.as_ref(),
        ErrorKind::Write(WriteFailure::WriteError(write_error)) if write_error.code == 11000
    )
}

fn map_insert_error(err: mongodb::error::Error, what: &str) -> StoreError {
    if is_duplicate_key(&err) {
        StoreError::Duplicate(what.to_string())
    } else {
        StoreError::Database(err)
    }
}

/// Escapes regex metacharacters so user input is matched literally.
pub(crate) fn escape_regex(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        if "\\^$.|?*+()[]{}/-".contains(c) {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

fn contains_ci(value: &str) -> Document {
    doc! { "$regex": escape_regex(value), "$options": "i" }
}

pub(crate) fn job_filter_doc(filter: &JobFilter) -> Document {
    let mut query = Document::new();

    if let Some(search) = filter.search.as_deref().filter(|s| !s.is_empty()) {
        query.insert(
            "$or",
            vec![
                doc! { "title": contains_ci(search) },
                doc! { "desc": contains_ci(search) },
                doc! { "company": contains_ci(search) },
            ],
        );
    }
    if let Some(location) = filter.location.as_deref().filter(|s| !s.is_empty()) {
        query.insert("location", contains_ci(location));
    }
    if let Some(job_type) = filter.job_type.as_deref().filter(|s| !s.is_empty()) {
        query.insert("jobType", contains_ci(job_type));
    }

    query
}

#[async_trait]
impl Store for MongoStore {
    async fn ping(&self) -> StoreResult<()> {
        self.db.run_command(doc! { "ping": 1 }).await?;
        Ok(())
    }

    async fn find_account_by_email(&self, email: &str) -> StoreResult<Option<Account>> {
        if let Some(applicant) = self.applicants().find_one(doc! { "email": email }).await? {
            return Ok(Some(Account::Applicant(applicant)));
        }
        Ok(self
            .recruiters()
            .find_one(doc! { "email": email })
            .await?
            .map(Account::Recruiter))
    }

    async fn find_account(&self, identity: &Identity) -> StoreResult<Option<Account>> {
        let filter = doc! { "_id": identity.id };
        let account = match identity.role {
            Role::Applicant => self.applicants().find_one(filter).await?.map(Account::Applicant),
            Role::Recruiter => self.recruiters().find_one(filter).await?.map(Account::Recruiter),
        };
        Ok(account)
    }

    async fn insert_account(&self, account: &Account) -> StoreResult<()> {
        match account {
            Account::Applicant(applicant) => self
                .applicants()
                .insert_one(applicant)
                .await
                .map_err(|e| map_insert_error(e, &applicant.email))?,
            Account::Recruiter(recruiter) => self
                .recruiters()
                .insert_one(recruiter)
                .await
                .map_err(|e| map_insert_error(e, &recruiter.email))?,
        };
        Ok(())
    }

    async fn save_account_fields(&self, account: &Account) -> StoreResult<bool> {
        let filter = doc! { "_id": account.id() };
        let result = match account {
            Account::Applicant(applicant) => {
                let update = doc! {
                    "$set": {
                        "name": applicant.name.clone(),
                        "email": applicant.email.clone(),
                        "profile": to_bson(&applicant.profile)?,
                    }
                };
                self.applicants()
                    .update_one(filter, update)
                    .await
                    .map_err(|e| map_insert_error(e, &applicant.email))?
            }
            Account::Recruiter(recruiter) => {
                let update = doc! {
                    "$set": {
                        "name": recruiter.name.clone(),
                        "email": recruiter.email.clone(),
                    }
                };
                self.recruiters()
                    .update_one(filter, update)
                    .await
                    .map_err(|e| map_insert_error(e, &recruiter.email))?
            }
        };
        Ok(result.matched_count > 0)
    }

    async fn find_applicants(&self, ids: &[ObjectId]) -> StoreResult<Vec<Applicant>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let cursor = self
            .applicants()
            .find(doc! { "_id": { "$in": ids.to_vec() } })
            .await?;
        Ok(cursor.try_collect().await?)
    }

    async fn find_recruiters(&self, ids: &[ObjectId]) -> StoreResult<Vec<Recruiter>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let cursor = self
            .recruiters()
            .find(doc! { "_id": { "$in": ids.to_vec() } })
            .await?;
        Ok(cursor.try_collect().await?)
    }

    async fn push_posted_job(&self, recruiter_id: &ObjectId, posted: &PostedJobRef) -> StoreResult<()> {
        self.recruiters()
            .update_one(
                doc! { "_id": *recruiter_id },
                doc! { "$push": { "postedJobs": to_bson(posted)? } },
            )
            .await?;
        Ok(())
    }

    async fn push_applied_job(&self, applicant_id: &ObjectId, applied: &AppliedJobRef) -> StoreResult<()> {
        self.applicants()
            .update_one(
                doc! { "_id": *applicant_id, "appliedJobs.jobId": { "$ne": applied.job_id } },
                doc! { "$push": { "appliedJobs": to_bson(applied)? } },
            )
            .await?;
        Ok(())
    }

    async fn set_applied_job_status(
        &self,
        applicant_id: &ObjectId,
        job_id: &ObjectId,
        status: ApplicationStatus,
    ) -> StoreResult<()> {
        self.applicants()
            .update_one(
                doc! { "_id": *applicant_id, "appliedJobs.jobId": *job_id },
                doc! { "$set": { "appliedJobs.$.status": status.as_str() } },
            )
            .await?;
        Ok(())
    }

    async fn pull_job_refs(&self, job_id: &ObjectId) -> StoreResult<()> {
        self.recruiters()
            .update_many(
                doc! { "postedJobs.jobId": *job_id },
                doc! { "$pull": { "postedJobs": { "jobId": *job_id } } },
            )
            .await?;
        self.applicants()
            .update_many(
                doc! { "appliedJobs.jobId": *job_id },
                doc! { "$pull": { "appliedJobs": { "jobId": *job_id } } },
            )
            .await?;
        Ok(())
    }

    async fn insert_job(&self, job: &Job) -> StoreResult<()> {
        self.jobs().insert_one(job).await?;
        Ok(())
    }

    async fn find_job(&self, id: &ObjectId) -> StoreResult<Option<Job>> {
        Ok(self.jobs().find_one(doc! { "_id": *id }).await?)
    }

    async fn find_jobs_by_ids(&self, ids: &[ObjectId]) -> StoreResult<Vec<Job>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let cursor = self
            .jobs()
            .find(doc! { "_id": { "$in": ids.to_vec() } })
            .await?;
        Ok(cursor.try_collect().await?)
    }

    async fn save_job_fields(&self, job: &Job) -> StoreResult<bool> {
        let update = doc! {
            "$set": {
                "title": job.title.clone(),
                "desc": job.desc.clone(),
                "company": job.company.clone(),
                "location": job.location.clone(),
                "salary": to_bson(&job.salary)?,
                "jobType": job.job_type.as_str(),
                "skillsRequired": job.skills_required.clone(),
            }
        };
        let result = self.jobs().update_one(doc! { "_id": job.id }, update).await?;
        Ok(result.matched_count > 0)
    }

    async fn delete_job(&self, id: &ObjectId) -> StoreResult<bool> {
        let result = self.jobs().delete_one(doc! { "_id": *id }).await?;
        Ok(result.deleted_count > 0)
    }

    async fn list_jobs(&self, filter: &JobFilter, skip: u64, limit: u64) -> StoreResult<(Vec<Job>, u64)> {
        let query = job_filter_doc(filter);
        let total = self.jobs().count_documents(query.clone()).await?;

        let cursor = self
            .jobs()
            .find(query)
            .sort(doc! { "postedAt": -1, "_id": -1 })
            .skip(skip)
            .limit(limit as i64)
            .await?;

        Ok((cursor.try_collect().await?, total))
    }

    async fn all_jobs(&self) -> StoreResult<Vec<Job>> {
        let cursor = self
            .jobs()
            .find(doc! {})
            .sort(doc! { "postedAt": -1, "_id": -1 })
            .await?;
        Ok(cursor.try_collect().await?)
    }

    async fn jobs_by_recruiter(&self, recruiter_id: &ObjectId) -> StoreResult<Vec<Job>> {
        let cursor = self
            .jobs()
            .find(doc! { "recruiter": *recruiter_id })
            .sort(doc! { "postedAt": -1, "_id": -1 })
            .await?;
        Ok(cursor.try_collect().await?)
    }

    async fn jobs_with_applicant(&self, applicant_id: &ObjectId) -> StoreResult<Vec<Job>> {
        let cursor = self
            .jobs()
            .find(doc! { "applicants.applicantId": *applicant_id })
            .sort(doc! { "postedAt": -1, "_id": -1 })
            .await?;
        Ok(cursor.try_collect().await?)
    }

    async fn add_application(&self, job_id: &ObjectId, application: &Application) -> StoreResult<ApplyOutcome> {
        // Duplicate check and append happen in one document update
        let result = self
            .jobs()
            .update_one(
                doc! { "_id": *job_id, "applicants.applicantId": { "$ne": application.applicant_id } },
                doc! { "$push": { "applicants": to_bson(application)? } },
            )
            .await?;

        if result.matched_count > 0 {
            return Ok(ApplyOutcome::Applied);
        }

        let exists = self.jobs().count_documents(doc! { "_id": *job_id }).await? > 0;
        Ok(if exists {
            ApplyOutcome::AlreadyApplied
        } else {
            ApplyOutcome::JobNotFound
        })
    }

    async fn set_application_status(
        &self,
        job_id: &ObjectId,
        applicant_id: &ObjectId,
        status: ApplicationStatus,
    ) -> StoreResult<bool> {
        let result = self
            .jobs()
            .update_one(
                doc! { "_id": *job_id, "applicants.applicantId": *applicant_id },
                doc! { "$set": { "applicants.$.status": status.as_str() } },
            )
            .await?;
        Ok(result.matched_count > 0)
    }
}
