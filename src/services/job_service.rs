use mongodb::bson::oid::ObjectId;
use std::collections::HashMap;

use crate::context::AppContext;
use crate::models::{
    CreateJobRequest, Identity, Job, JobFilter, JobListQuery, JobPage, JobType, JobView,
    PostedJobRef, Recruiter, Role, UpdateJobRequest,
};
use crate::services::{parse_id, require_role};
use crate::utils::AppError;

pub const DEFAULT_PAGE_SIZE: u64 = 6;

fn non_blank(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn parse_job_type(raw: &str) -> Result<JobType, AppError> {
    raw.trim().parse().map_err(AppError::InvalidInput)
}

/// Recruiter records for the owners of `jobs`, keyed by id.
pub(crate) async fn recruiters_of(
    ctx: &AppContext,
    jobs: &[Job],
) -> Result<HashMap<ObjectId, Recruiter>, AppError> {
    let mut ids: Vec<ObjectId> = jobs.iter().map(|j| j.recruiter).collect();
    ids.sort();
    ids.dedup();

    Ok(ctx
        .store
        .find_recruiters(&ids)
        .await?
        .into_iter()
        .map(|r| (r.id, r))
        .collect())
}

async fn recruiter_name(ctx: &AppContext, job: &Job) -> Result<Option<String>, AppError> {
    Ok(ctx
        .store
        .find_recruiters(std::slice::from_ref(&job.recruiter))
        .await?
        .into_iter()
        .next()
        .map(|r| r.name))
}

async fn public_views(ctx: &AppContext, jobs: &[Job]) -> Result<Vec<JobView>, AppError> {
    let recruiters = recruiters_of(ctx, jobs).await?;
    Ok(jobs
        .iter()
        .map(|job| JobView::public(job, recruiters.get(&job.recruiter).map(|r| r.name.clone())))
        .collect())
}

/// Loads a job for mutation by its owner.
///
/// Role is checked before the lookup, ownership after it, so a
/// non-recruiter never learns whether the id exists.
pub(crate) async fn load_owned(
    ctx: &AppContext,
    identity: &Identity,
    job_id: &str,
    action: &str,
) -> Result<Job, AppError> {
    require_role(
        identity,
        Role::Recruiter,
        &format!("Access denied. Only recruiters can {}.", action),
    )?;
    let id = parse_id(job_id, "Invalid job id")?;

    let job = ctx
        .store
        .find_job(&id)
        .await?
        .ok_or_else(|| AppError::not_found("Job not found"))?;

    if job.recruiter != identity.id {
        log::warn!("⛔ {} tried to {} on job {} owned by {}", identity.id, action, job.id, job.recruiter);
        return Err(AppError::forbidden(format!(
            "Unauthorized: You can only {} you have posted.",
            action
        )));
    }

    Ok(job)
}

pub async fn create(
    ctx: &AppContext,
    identity: &Identity,
    request: CreateJobRequest,
) -> Result<JobView, AppError> {
    require_role(identity, Role::Recruiter, "Access denied. Only recruiters can post jobs.")?;

    let (Some(title), Some(desc), Some(company), Some(location), Some(job_type)) = (
        non_blank(request.title),
        non_blank(request.desc),
        non_blank(request.company),
        non_blank(request.location),
        non_blank(request.job_type),
    ) else {
        return Err(AppError::invalid("Missing required fields."));
    };
    let job_type = parse_job_type(&job_type)?;

    let job = Job {
        id: ObjectId::new(),
        title,
        desc,
        company,
        location,
        salary: non_blank(request.salary),
        job_type,
        skills_required: request.skills_required.unwrap_or_default(),
        recruiter: identity.id,
        applicants: Vec::new(),
        posted_at: chrono::Utc::now().timestamp_millis(),
    };

    ctx.store.insert_job(&job).await?;
    ctx.store
        .push_posted_job(
            &identity.id,
            &PostedJobRef {
                job_id: job.id,
                posted_at: job.posted_at,
            },
        )
        .await?;

    log::info!("✅ Job posted: {} '{}' by {}", job.id, job.title, identity.id);

    Ok(JobView::owned(&job, recruiter_name(ctx, &job).await?))
}

pub async fn update(
    ctx: &AppContext,
    identity: &Identity,
    job_id: &str,
    patch: UpdateJobRequest,
) -> Result<JobView, AppError> {
    let mut job = load_owned(ctx, identity, job_id, "update jobs").await?;

    let required = |value: Option<String>, field: &str| -> Result<Option<String>, AppError> {
        match value {
            Some(v) if v.trim().is_empty() => Err(AppError::invalid(format!("{} cannot be empty", field))),
            Some(v) => Ok(Some(v.trim().to_string())),
            None => Ok(None),
        }
    };

    if let Some(title) = required(patch.title, "title")? {
        job.title = title;
    }
    if let Some(desc) = required(patch.desc, "desc")? {
        job.desc = desc;
    }
    if let Some(company) = required(patch.company, "company")? {
        job.company = company;
    }
    if let Some(location) = required(patch.location, "location")? {
        job.location = location;
    }
    if let Some(job_type) = patch.job_type {
        job.job_type = parse_job_type(&job_type)?;
    }
    if let Some(salary) = patch.salary {
        job.salary = non_blank(Some(salary));
    }
    if let Some(skills) = patch.skills_required {
        job.skills_required = skills;
    }

    if !ctx.store.save_job_fields(&job).await? {
        return Err(AppError::not_found("Job not found"));
    }

    // Re-read so concurrent applications show up in the owner's view
    let id = job.id;
    let job = ctx.store.find_job(&id).await?.unwrap_or(job);

    log::info!("✏️  Job updated: {} by {}", job.id, identity.id);

    Ok(JobView::owned(&job, recruiter_name(ctx, &job).await?))
}

/// Removes the job with its applications and every reference to it.
pub async fn delete(ctx: &AppContext, identity: &Identity, job_id: &str) -> Result<(), AppError> {
    let job = load_owned(ctx, identity, job_id, "delete jobs").await?;

    if !ctx.store.delete_job(&job.id).await? {
        return Err(AppError::not_found("Job not found"));
    }
    ctx.store.pull_job_refs(&job.id).await?;

    log::info!("🗑️  Job deleted: {} ({} applications) by {}", job.id, job.applicants.len(), identity.id);
    Ok(())
}

/// Filtered, paginated listing. Pages are 1-based; a page past the end is empty.
pub async fn list(ctx: &AppContext, query: JobListQuery) -> Result<JobPage, AppError> {
    let page = query.page.unwrap_or(1);
    let limit = query.limit.unwrap_or(DEFAULT_PAGE_SIZE);
    if page == 0 || limit == 0 {
        return Err(AppError::invalid("page and limit must be positive integers"));
    }

    let filter = JobFilter {
        search: non_blank(query.search),
        location: non_blank(query.location),
        job_type: non_blank(query.job_type),
    };
    let skip = (page - 1).saturating_mul(limit);

    let (jobs, total_count) = ctx.store.list_jobs(&filter, skip, limit).await?;

    Ok(JobPage {
        jobs: public_views(ctx, &jobs).await?,
        total_count,
        current_page: page,
        total_pages: total_count.div_ceil(limit),
    })
}

pub async fn list_all(ctx: &AppContext) -> Result<Vec<JobView>, AppError> {
    let jobs = ctx.store.all_jobs().await?;
    public_views(ctx, &jobs).await
}

pub async fn get_by_id(ctx: &AppContext, job_id: &str) -> Result<JobView, AppError> {
    let id = parse_id(job_id, "Invalid job id")?;
    let job = ctx
        .store
        .find_job(&id)
        .await?
        .ok_or_else(|| AppError::not_found("Job not found"))?;

    Ok(JobView::public(&job, recruiter_name(ctx, &job).await?))
}

/// All jobs owned by the caller, newest first, with their applications.
pub async fn list_mine(ctx: &AppContext, identity: &Identity) -> Result<Vec<JobView>, AppError> {
    require_role(identity, Role::Recruiter, "Access denied. Only recruiters can view their jobs.")?;

    let jobs = ctx.store.jobs_by_recruiter(&identity.id).await?;
    let recruiters = recruiters_of(ctx, &jobs).await?;

    Ok(jobs
        .iter()
        .map(|job| JobView::owned(job, recruiters.get(&job.recruiter).map(|r| r.name.clone())))
        .collect())
}
