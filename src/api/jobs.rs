use actix_web::{web, HttpResponse};

use crate::context::AppContext;
use crate::models::{
    AppliedJobSummary, ApplicationStatusView, Identity, JobListQuery, JobListResponse, JobPage,
    JobResponse, MessageResponse,
};
use crate::services::{application_service, job_service};
use crate::utils::{AppError, ErrorBody};

#[utoipa::path(
    get,
    path = "/job/",
    tag = "Jobs",
    params(JobListQuery),
    responses(
        (status = 200, description = "Filtered, paginated job listing", body = JobPage),
        (status = 400, description = "Invalid page or limit", body = ErrorBody)
    )
)]
pub async fn list_jobs(
    ctx: web::Data<AppContext>,
    query: web::Query<JobListQuery>,
) -> Result<HttpResponse, AppError> {
    log::info!(
        "🔎 GET /job/ - search: {:?}, location: {:?}, jobType: {:?}, page: {:?}",
        query.search,
        query.location,
        query.job_type,
        query.page
    );

    let page = job_service::list(&ctx, query.into_inner()).await?;
    Ok(HttpResponse::Ok().json(page))
}

#[utoipa::path(
    get,
    path = "/job/list",
    tag = "Jobs",
    responses(
        (status = 200, description = "Every job, newest first", body = JobListResponse)
    )
)]
pub async fn list_all_jobs(ctx: web::Data<AppContext>) -> Result<HttpResponse, AppError> {
    log::info!("📋 GET /job/list");

    let jobs = job_service::list_all(&ctx).await?;
    Ok(HttpResponse::Ok().json(JobListResponse { jobs }))
}

#[utoipa::path(
    get,
    path = "/job/{id}",
    tag = "Jobs",
    params(("id" = String, Path, description = "Job id")),
    responses(
        (status = 200, description = "Job detail", body = JobResponse),
        (status = 400, description = "Invalid job id", body = ErrorBody),
        (status = 404, description = "Job not found", body = ErrorBody)
    )
)]
pub async fn get_job(
    ctx: web::Data<AppContext>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let job_id = path.into_inner();
    log::info!("📄 GET /job/{}", job_id);

    let job = job_service::get_by_id(&ctx, &job_id).await?;
    Ok(HttpResponse::Ok().json(JobResponse { job }))
}

#[utoipa::path(
    get,
    path = "/job/recruiter/list",
    tag = "Jobs",
    responses(
        (status = 200, description = "Jobs owned by the caller", body = JobListResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorBody),
        (status = 403, description = "Recruiters only", body = ErrorBody)
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_my_jobs(
    ctx: web::Data<AppContext>,
    identity: web::ReqData<Identity>,
) -> Result<HttpResponse, AppError> {
    log::info!("📋 GET /job/recruiter/list - {}", identity.id);

    let jobs = job_service::list_mine(&ctx, &identity).await?;
    Ok(HttpResponse::Ok().json(JobListResponse { jobs }))
}

#[utoipa::path(
    get,
    path = "/job/applied",
    tag = "Applications",
    responses(
        (status = 200, description = "Caller's applications with status", body = [AppliedJobSummary]),
        (status = 401, description = "Missing or invalid token", body = ErrorBody),
        (status = 403, description = "Applicants only", body = ErrorBody)
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_applied_jobs(
    ctx: web::Data<AppContext>,
    identity: web::ReqData<Identity>,
) -> Result<HttpResponse, AppError> {
    log::info!("📋 GET /job/applied - {}", identity.id);

    let applied = application_service::list_applied(&ctx, &identity).await?;
    Ok(HttpResponse::Ok().json(applied))
}

#[utoipa::path(
    post,
    path = "/job/apply/{id}",
    tag = "Applications",
    params(("id" = String, Path, description = "Job id")),
    responses(
        (status = 200, description = "Application submitted", body = MessageResponse),
        (status = 400, description = "Already applied or invalid id", body = ErrorBody),
        (status = 401, description = "Missing or invalid token", body = ErrorBody),
        (status = 403, description = "Applicants only", body = ErrorBody),
        (status = 404, description = "Job not found", body = ErrorBody)
    ),
    security(("bearer_auth" = []))
)]
pub async fn apply_to_job(
    ctx: web::Data<AppContext>,
    identity: web::ReqData<Identity>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let job_id = path.into_inner();
    log::info!("📨 POST /job/apply/{} - {}", job_id, identity.id);

    application_service::apply(&ctx, &identity, &job_id).await?;
    Ok(HttpResponse::Ok().json(MessageResponse {
        message: "Application submitted successfully".to_string(),
    }))
}

#[utoipa::path(
    get,
    path = "/job/status/{id}",
    tag = "Applications",
    params(("id" = String, Path, description = "Job id")),
    responses(
        (status = 200, description = "Status of the caller's application", body = ApplicationStatusView),
        (status = 401, description = "Missing or invalid token", body = ErrorBody),
        (status = 403, description = "Applicants only", body = ErrorBody),
        (status = 404, description = "No application on this job", body = ErrorBody)
    ),
    security(("bearer_auth" = []))
)]
pub async fn application_status(
    ctx: web::Data<AppContext>,
    identity: web::ReqData<Identity>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let job_id = path.into_inner();
    log::info!("🔍 GET /job/status/{} - {}", job_id, identity.id);

    let status = application_service::get_status(&ctx, &identity, &job_id).await?;
    Ok(HttpResponse::Ok().json(status))
}
