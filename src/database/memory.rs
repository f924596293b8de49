//! In-process `Store` used by the unit tests. Mirrors the Mongo semantics
//! (partition lookup order, unique emails, conditional push, newest-first listing).

use async_trait::async_trait;
use mongodb::bson::oid::ObjectId;
use std::sync::Mutex;

use super::{ApplyOutcome, Store, StoreError, StoreResult};
use crate::models::{
    Account, Applicant, AppliedJobRef, Application, ApplicationStatus, Identity, Job, JobFilter,
    PostedJobRef, Recruiter, Role,
};

#[derive(Default)]
struct State {
    applicants: Vec<Applicant>,
    recruiters: Vec<Recruiter>,
    jobs: Vec<Job>,
}

#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<State>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn account_count(&self) -> usize {
        let state = self.state.lock().unwrap();
        state.applicants.len() + state.recruiters.len()
    }

    pub fn job_count(&self) -> usize {
        self.state.lock().unwrap().jobs.len()
    }
}

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

fn matches(job: &Job, filter: &JobFilter) -> bool {
    let search_ok = match filter.search.as_deref().filter(|s| !s.is_empty()) {
        Some(s) => contains_ci(&job.title, s) || contains_ci(&job.desc, s) || contains_ci(&job.company, s),
        None => true,
    };
    let location_ok = match filter.location.as_deref().filter(|s| !s.is_empty()) {
        Some(l) => contains_ci(&job.location, l),
        None => true,
    };
    let type_ok = match filter.job_type.as_deref().filter(|s| !s.is_empty()) {
        Some(t) => contains_ci(job.job_type.as_str(), t),
        None => true,
    };
    search_ok && location_ok && type_ok
}

fn newest_first(jobs: &mut [Job]) {
    jobs.sort_by(|a, b| b.posted_at.cmp(&a.posted_at).then(b.id.cmp(&a.id)));
}

#[async_trait]
impl Store for MemoryStore {
    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }

    async fn find_account_by_email(&self, email: &str) -> StoreResult<Option<Account>> {
        let state = self.state.lock().unwrap();
        if let Some(a) = state.applicants.iter().find(|a| a.email == email) {
            return Ok(Some(Account::Applicant(a.clone())));
        }
        Ok(state
            .recruiters
            .iter()
            .find(|r| r.email == email)
            .cloned()
            .map(Account::Recruiter))
    }

    async fn find_account(&self, identity: &Identity) -> StoreResult<Option<Account>> {
        let state = self.state.lock().unwrap();
        let account = match identity.role {
            Role::Applicant => state
                .applicants
                .iter()
                .find(|a| a.id == identity.id)
                .cloned()
                .map(Account::Applicant),
            Role::Recruiter => state
                .recruiters
                .iter()
                .find(|r| r.id == identity.id)
                .cloned()
                .map(Account::Recruiter),
        };
        Ok(account)
    }

    async fn insert_account(&self, account: &Account) -> StoreResult<()> {
        let mut state = self.state.lock().unwrap();
        match account {
            Account::Applicant(a) => {
                if state.applicants.iter().any(|x| x.email == a.email) {
                    return Err(StoreError::Duplicate(a.email.clone()));
                }
                state.applicants.push(a.clone());
            }
            Account::Recruiter(r) => {
                if state.recruiters.iter().any(|x| x.email == r.email) {
                    return Err(StoreError::Duplicate(r.email.clone()));
                }
                state.recruiters.push(r.clone());
            }
        }
        Ok(())
    }

    async fn save_account_fields(&self, account: &Account) -> StoreResult<bool> {
        let mut state = self.state.lock().unwrap();
        match account {
            Account::Applicant(a) => match state.applicants.iter_mut().find(|x| x.id == a.id) {
                Some(stored) => {
                    stored.name = a.name.clone();
                    stored.email = a.email.clone();
                    stored.profile = a.profile.clone();
                    Ok(true)
                }
                None => Ok(false),
            },
            Account::Recruiter(r) => match state.recruiters.iter_mut().find(|x| x.id == r.id) {
                Some(stored) => {
                    stored.name = r.name.clone();
                    stored.email = r.email.clone();
                    Ok(true)
                }
                None => Ok(false),
            },
        }
    }

    async fn find_applicants(&self, ids: &[ObjectId]) -> StoreResult<Vec<Applicant>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .applicants
            .iter()
            .filter(|a| ids.contains(&a.id))
            .cloned()
            .collect())
    }

    async fn find_recruiters(&self, ids: &[ObjectId]) -> StoreResult<Vec<Recruiter>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .recruiters
            .iter()
            .filter(|r| ids.contains(&r.id))
            .cloned()
            .collect())
    }

    async fn push_posted_job(&self, recruiter_id: &ObjectId, posted: &PostedJobRef) -> StoreResult<()> {
        let mut state = self.state.lock().unwrap();
        if let Some(r) = state.recruiters.iter_mut().find(|r| &r.id == recruiter_id) {
            r.posted_jobs.push(posted.clone());
        }
        Ok(())
    }

    async fn push_applied_job(&self, applicant_id: &ObjectId, applied: &AppliedJobRef) -> StoreResult<()> {
        let mut state = self.state.lock().unwrap();
        if let Some(a) = state.applicants.iter_mut().find(|a| &a.id == applicant_id) {
            if !a.applied_jobs.iter().any(|j| j.job_id == applied.job_id) {
                a.applied_jobs.push(applied.clone());
            }
        }
        Ok(())
    }

    async fn set_applied_job_status(
        &self,
        applicant_id: &ObjectId,
        job_id: &ObjectId,
        status: ApplicationStatus,
    ) -> StoreResult<()> {
        let mut state = self.state.lock().unwrap();
        if let Some(a) = state.applicants.iter_mut().find(|a| &a.id == applicant_id) {
            if let Some(entry) = a.applied_jobs.iter_mut().find(|j| &j.job_id == job_id) {
                entry.status = status;
            }
        }
        Ok(())
    }

    async fn pull_job_refs(&self, job_id: &ObjectId) -> StoreResult<()> {
        let mut state = self.state.lock().unwrap();
        for r in state.recruiters.iter_mut() {
            r.posted_jobs.retain(|p| &p.job_id != job_id);
        }
        for a in state.applicants.iter_mut() {
            a.applied_jobs.retain(|j| &j.job_id != job_id);
        }
        Ok(())
    }

    async fn insert_job(&self, job: &Job) -> StoreResult<()> {
        self.state.lock().unwrap().jobs.push(job.clone());
        Ok(())
    }

    async fn find_job(&self, id: &ObjectId) -> StoreResult<Option<Job>> {
        let state = self.state.lock().unwrap();
        Ok(state.jobs.iter().find(|j| &j.id == id).cloned())
    }

    async fn find_jobs_by_ids(&self, ids: &[ObjectId]) -> StoreResult<Vec<Job>> {
        let state = self.state.lock().unwrap();
        Ok(state.jobs.iter().filter(|j| ids.contains(&j.id)).cloned().collect())
    }

    async fn save_job_fields(&self, job: &Job) -> StoreResult<bool> {
        let mut state = self.state.lock().unwrap();
        match state.jobs.iter_mut().find(|j| j.id == job.id) {
            Some(stored) => {
                stored.title = job.title.clone();
                stored.desc = job.desc.clone();
                stored.company = job.company.clone();
                stored.location = job.location.clone();
                stored.salary = job.salary.clone();
                stored.job_type = job.job_type;
                stored.skills_required = job.skills_required.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_job(&self, id: &ObjectId) -> StoreResult<bool> {
        let mut state = self.state.lock().unwrap();
        let before = state.jobs.len();
        state.jobs.retain(|j| &j.id != id);
        Ok(state.jobs.len() < before)
    }

    async fn list_jobs(&self, filter: &JobFilter, skip: u64, limit: u64) -> StoreResult<(Vec<Job>, u64)> {
        let state = self.state.lock().unwrap();
        let mut matched: Vec<Job> = state.jobs.iter().filter(|j| matches(j, filter)).cloned().collect();
        newest_first(&mut matched);
        let total = matched.len() as u64;
        let page = matched
            .into_iter()
            .skip(skip as usize)
            .take(limit as usize)
            .collect();
        Ok((page, total))
    }

    async fn all_jobs(&self) -> StoreResult<Vec<Job>> {
        let mut jobs = self.state.lock().unwrap().jobs.clone();
        newest_first(&mut jobs);
        Ok(jobs)
    }

    async fn jobs_by_recruiter(&self, recruiter_id: &ObjectId) -> StoreResult<Vec<Job>> {
        let state = self.state.lock().unwrap();
        let mut jobs: Vec<Job> = state
            .jobs
            .iter()
            .filter(|j| &j.recruiter == recruiter_id)
            .cloned()
            .collect();
        newest_first(&mut jobs);
        Ok(jobs)
    }

    async fn jobs_with_applicant(&self, applicant_id: &ObjectId) -> StoreResult<Vec<Job>> {
        let state = self.state.lock().unwrap();
        let mut jobs: Vec<Job> = state
            .jobs
            .iter()
            .filter(|j| j.application_of(applicant_id).is_some())
            .cloned()
            .collect();
        newest_first(&mut jobs);
        Ok(jobs)
    }

    async fn add_application(&self, job_id: &ObjectId, application: &Application) -> StoreResult<ApplyOutcome> {
        let mut state = self.state.lock().unwrap();
        let Some(job) = state.jobs.iter_mut().find(|j| &j.id == job_id) else {
            return Ok(ApplyOutcome::JobNotFound);
        };
        if job.application_of(&application.applicant_id).is_some() {
            return Ok(ApplyOutcome::AlreadyApplied);
        }
        job.applicants.push(application.clone());
        Ok(ApplyOutcome::Applied)
    }

    async fn set_application_status(
        &self,
        job_id: &ObjectId,
        applicant_id: &ObjectId,
        status: ApplicationStatus,
    ) -> StoreResult<bool> {
        let mut state = self.state.lock().unwrap();
        let Some(job) = state.jobs.iter_mut().find(|j| &j.id == job_id) else {
            return Ok(false);
        };
        match job.applicants.iter_mut().find(|a| &a.applicant_id == applicant_id) {
            Some(app) => {
                app.status = status;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
