use chrono::DateTime;
use mongodb::bson::oid::ObjectId;
use std::collections::HashMap;

use crate::context::AppContext;
use crate::database::ApplyOutcome;
use crate::models::{
    Applicant, ApplicantEntry, AppliedJobRef, AppliedJobSummary, Application, ApplicationStatus,
    ApplicationStatusView, ApplicationView, Identity, Job, RecruiterSummary, Role,
    SetStatusRequest,
};
use crate::services::job_service::{load_owned, recruiters_of};
use crate::services::{parse_id, require_role};
use crate::utils::AppError;

/// Adds an `applied` application for the caller. At most one per job.
pub async fn apply(ctx: &AppContext, identity: &Identity, job_id: &str) -> Result<(), AppError> {
    require_role(identity, Role::Applicant, "Access denied. Only applicants can apply for jobs.")?;
    let job_id = parse_id(job_id, "Invalid job id")?;

    let application = Application::new(identity.id);
    match ctx.store.add_application(&job_id, &application).await? {
        ApplyOutcome::Applied => {}
        ApplyOutcome::AlreadyApplied => {
            log::warn!("⚠️  Duplicate application: {} on job {}", identity.id, job_id);
            return Err(AppError::conflict("You have already applied for this job."));
        }
        ApplyOutcome::JobNotFound => return Err(AppError::not_found("Job not found")),
    }

    ctx.store
        .push_applied_job(
            &identity.id,
            &AppliedJobRef {
                job_id,
                status: ApplicationStatus::Applied,
            },
        )
        .await?;

    log::info!("📨 Application submitted: {} on job {}", identity.id, job_id);
    Ok(())
}

/// Overwrites the status of one application on a job the caller owns.
pub async fn set_status(
    ctx: &AppContext,
    identity: &Identity,
    job_id: &str,
    applicant_id: &str,
    request: SetStatusRequest,
) -> Result<ApplicationView, AppError> {
    let status: ApplicationStatus = request
        .status
        .as_deref()
        .unwrap_or_default()
        .trim()
        .parse()
        .map_err(AppError::InvalidInput)?;

    let job = load_owned(ctx, identity, job_id, "update applications for jobs").await?;
    let applicant_id = parse_id(applicant_id, "Invalid applicant id")?;

    let mut application = job
        .application_of(&applicant_id)
        .cloned()
        .ok_or_else(|| AppError::not_found("Applicant not found for this job"))?;

    if !ctx
        .store
        .set_application_status(&job.id, &applicant_id, status)
        .await?
    {
        return Err(AppError::not_found("Applicant not found for this job"));
    }
    ctx.store
        .set_applied_job_status(&applicant_id, &job.id, status)
        .await?;

    log::info!(
        "🔄 Application status: job {} applicant {} {} -> {}",
        job.id,
        applicant_id,
        application.status,
        status
    );

    application.status = status;
    Ok(ApplicationView::from(&application))
}

/// Jobs the caller has applied to, newest first, with their current status.
pub async fn list_applied(
    ctx: &AppContext,
    identity: &Identity,
) -> Result<Vec<AppliedJobSummary>, AppError> {
    require_role(identity, Role::Applicant, "Access denied. Applicants only.")?;

    let jobs = ctx.store.jobs_with_applicant(&identity.id).await?;
    let recruiters = recruiters_of(ctx, &jobs).await?;

    Ok(jobs
        .iter()
        .filter_map(|job| {
            let application = job.application_of(&identity.id)?;
            let recruiter = recruiters.get(&job.recruiter);
            Some(AppliedJobSummary {
                job_id: job.id.to_hex(),
                title: job.title.clone(),
                company: job.company.clone(),
                location: job.location.clone(),
                job_type: job.job_type,
                recruiter: RecruiterSummary {
                    id: job.recruiter.to_hex(),
                    name: recruiter.map(|r| r.name.clone()),
                    email: recruiter.map(|r| r.email.clone()),
                },
                application_status: application.status,
                applied_at: DateTime::from_timestamp_millis(application.applied_at),
            })
        })
        .collect())
}

async fn applicant_entries(ctx: &AppContext, jobs: &[Job]) -> Result<Vec<ApplicantEntry>, AppError> {
    let mut ids: Vec<ObjectId> = jobs
        .iter()
        .flat_map(|job| job.applicants.iter().map(|a| a.applicant_id))
        .collect();
    ids.sort();
    ids.dedup();

    let applicants: HashMap<ObjectId, Applicant> = ctx
        .store
        .find_applicants(&ids)
        .await?
        .into_iter()
        .map(|a| (a.id, a))
        .collect();

    Ok(jobs
        .iter()
        .flat_map(|job| {
            let applicants = &applicants;
            job.applicants.iter().map(move |application| {
                let applicant = applicants.get(&application.applicant_id);
                ApplicantEntry {
                    job_title: job.title.clone(),
                    job_id: job.id.to_hex(),
                    applicant_id: application.applicant_id.to_hex(),
                    name: applicant.map(|a| a.name.clone()),
                    email: applicant.map(|a| a.email.clone()),
                    profile: applicant.map(|a| a.profile.clone()),
                    status: application.status,
                    applied_at: DateTime::from_timestamp_millis(application.applied_at),
                }
            })
        })
        .collect())
}

/// Every application across the caller's jobs, flattened.
pub async fn list_applicants_for_recruiter(
    ctx: &AppContext,
    identity: &Identity,
) -> Result<Vec<ApplicantEntry>, AppError> {
    require_role(identity, Role::Recruiter, "Access denied. Only recruiters can view applicants.")?;

    let jobs = ctx.store.jobs_by_recruiter(&identity.id).await?;
    applicant_entries(ctx, &jobs).await
}

pub async fn list_applicants_for_job(
    ctx: &AppContext,
    identity: &Identity,
    job_id: &str,
) -> Result<Vec<ApplicantEntry>, AppError> {
    let job = load_owned(ctx, identity, job_id, "view applicants for jobs").await?;
    applicant_entries(ctx, std::slice::from_ref(&job)).await
}

/// Status of the caller's application on the job named by `job_id`.
pub async fn get_status(
    ctx: &AppContext,
    identity: &Identity,
    job_id: &str,
) -> Result<ApplicationStatusView, AppError> {
    require_role(
        identity,
        Role::Applicant,
        "Access denied. Only applicants can check application status.",
    )?;
    let job_id = parse_id(job_id, "Invalid job id")?;

    let job = ctx
        .store
        .find_job(&job_id)
        .await?
        .ok_or_else(|| AppError::not_found("Application not found"))?;
    let application = job
        .application_of(&identity.id)
        .ok_or_else(|| AppError::not_found("Application not found in this job"))?;

    Ok(ApplicationStatusView {
        job_title: job.title.clone(),
        company: job.company.clone(),
        status: application.status,
        applied_at: DateTime::from_timestamp_millis(application.applied_at),
    })
}
