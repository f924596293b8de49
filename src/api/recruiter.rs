use actix_web::{web, HttpResponse};

use crate::context::AppContext;
use crate::models::{
    ApplicantsResponse, CreateJobRequest, Identity, JobMessageResponse, MessageResponse,
    SetStatusRequest, StatusUpdateResponse, UpdateJobRequest,
};
use crate::services::{application_service, job_service};
use crate::utils::{AppError, ErrorBody};

#[utoipa::path(
    post,
    path = "/recruiter/newJob",
    tag = "Recruiter",
    request_body = CreateJobRequest,
    responses(
        (status = 201, description = "Job posted", body = JobMessageResponse),
        (status = 400, description = "Missing fields or invalid job type", body = ErrorBody),
        (status = 401, description = "Missing or invalid token", body = ErrorBody),
        (status = 403, description = "Recruiters only", body = ErrorBody)
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_job(
    ctx: web::Data<AppContext>,
    identity: web::ReqData<Identity>,
    request: web::Json<CreateJobRequest>,
) -> Result<HttpResponse, AppError> {
    log::info!("📝 POST /recruiter/newJob - {}", identity.id);

    let job = job_service::create(&ctx, &identity, request.into_inner()).await?;
    Ok(HttpResponse::Created().json(JobMessageResponse {
        message: "Job posted successfully".to_string(),
        job,
    }))
}

#[utoipa::path(
    put,
    path = "/recruiter/{id}",
    tag = "Recruiter",
    params(("id" = String, Path, description = "Job id")),
    request_body = UpdateJobRequest,
    responses(
        (status = 200, description = "Job updated", body = JobMessageResponse),
        (status = 400, description = "Invalid input", body = ErrorBody),
        (status = 403, description = "Not the owning recruiter", body = ErrorBody),
        (status = 404, description = "Job not found", body = ErrorBody)
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_job(
    ctx: web::Data<AppContext>,
    identity: web::ReqData<Identity>,
    path: web::Path<String>,
    request: web::Json<UpdateJobRequest>,
) -> Result<HttpResponse, AppError> {
    let job_id = path.into_inner();
    log::info!("✏️  PUT /recruiter/{} - {}", job_id, identity.id);

    let job = job_service::update(&ctx, &identity, &job_id, request.into_inner()).await?;
    Ok(HttpResponse::Ok().json(JobMessageResponse {
        message: "Job updated successfully".to_string(),
        job,
    }))
}

#[utoipa::path(
    delete,
    path = "/recruiter/{id}",
    tag = "Recruiter",
    params(("id" = String, Path, description = "Job id")),
    responses(
        (status = 200, description = "Job deleted", body = MessageResponse),
        (status = 403, description = "Not the owning recruiter", body = ErrorBody),
        (status = 404, description = "Job not found", body = ErrorBody)
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_job(
    ctx: web::Data<AppContext>,
    identity: web::ReqData<Identity>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let job_id = path.into_inner();
    log::info!("🗑️  DELETE /recruiter/{} - {}", job_id, identity.id);

    job_service::delete(&ctx, &identity, &job_id).await?;
    Ok(HttpResponse::Ok().json(MessageResponse {
        message: "Job deleted successfully".to_string(),
    }))
}

#[utoipa::path(
    get,
    path = "/recruiter/applicants",
    tag = "Recruiter",
    responses(
        (status = 200, description = "Applicants across the caller's jobs", body = ApplicantsResponse),
        (status = 403, description = "Recruiters only", body = ErrorBody)
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_applicants(
    ctx: web::Data<AppContext>,
    identity: web::ReqData<Identity>,
) -> Result<HttpResponse, AppError> {
    log::info!("👥 GET /recruiter/applicants - {}", identity.id);

    let applicants = application_service::list_applicants_for_recruiter(&ctx, &identity).await?;
    Ok(HttpResponse::Ok().json(ApplicantsResponse { applicants }))
}

#[utoipa::path(
    get,
    path = "/recruiter/{id}/applicants",
    tag = "Recruiter",
    params(("id" = String, Path, description = "Job id")),
    responses(
        (status = 200, description = "Applicants for one job", body = ApplicantsResponse),
        (status = 403, description = "Not the owning recruiter", body = ErrorBody),
        (status = 404, description = "Job not found", body = ErrorBody)
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_job_applicants(
    ctx: web::Data<AppContext>,
    identity: web::ReqData<Identity>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let job_id = path.into_inner();
    log::info!("👥 GET /recruiter/{}/applicants - {}", job_id, identity.id);

    let applicants =
        application_service::list_applicants_for_job(&ctx, &identity, &job_id).await?;
    Ok(HttpResponse::Ok().json(ApplicantsResponse { applicants }))
}

#[utoipa::path(
    put,
    path = "/recruiter/{id}/applicants/{applicantId}",
    tag = "Recruiter",
    params(
        ("id" = String, Path, description = "Job id"),
        ("applicantId" = String, Path, description = "Applicant id")
    ),
    request_body = SetStatusRequest,
    responses(
        (status = 200, description = "Status updated", body = StatusUpdateResponse),
        (status = 400, description = "Invalid status value", body = ErrorBody),
        (status = 403, description = "Not the owning recruiter", body = ErrorBody),
        (status = 404, description = "Job or application not found", body = ErrorBody)
    ),
    security(("bearer_auth" = []))
)]
pub async fn set_application_status(
    ctx: web::Data<AppContext>,
    identity: web::ReqData<Identity>,
    path: web::Path<(String, String)>,
    request: web::Json<SetStatusRequest>,
) -> Result<HttpResponse, AppError> {
    let (job_id, applicant_id) = path.into_inner();
    log::info!(
        "🔄 PUT /recruiter/{}/applicants/{} - status: {:?}",
        job_id,
        applicant_id,
        request.status
    );

    let updated = application_service::set_status(
        &ctx,
        &identity,
        &job_id,
        &applicant_id,
        request.into_inner(),
    )
    .await?;

    Ok(HttpResponse::Ok().json(StatusUpdateResponse {
        message: "Application status updated successfully".to_string(),
        updated_applicant: updated,
    }))
}
