use utoipa::OpenApi;
use utoipa::openapi::security::{SecurityScheme, HttpAuthScheme, HttpBuilder};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Job Board API",
        version = "1.0.0",
        description = "REST API for a job board. Recruiters post jobs and manage applications; applicants browse, apply and track their status.\n\n**Authentication:** Protected endpoints require a JWT Bearer token obtained from `/auth/register` or `/auth/login`.\n\n**Roles:** `applicant` and `recruiter`, fixed at registration.",
    ),
    paths(
        // Health
        crate::api::health::welcome,
        crate::api::health::health_check,

        // Auth
        crate::api::auth::register,
        crate::api::auth::login,
        crate::api::auth::get_profile,
        crate::api::auth::update_profile,
        crate::api::auth::serve_resume,

        // Jobs
        crate::api::jobs::list_jobs,
        crate::api::jobs::list_all_jobs,
        crate::api::jobs::get_job,
        crate::api::jobs::list_my_jobs,

        // Applications
        crate::api::jobs::list_applied_jobs,
        crate::api::jobs::apply_to_job,
        crate::api::jobs::application_status,

        // Recruiter
        crate::api::recruiter::create_job,
        crate::api::recruiter::update_job,
        crate::api::recruiter::delete_job,
        crate::api::recruiter::list_applicants,
        crate::api::recruiter::list_job_applicants,
        crate::api::recruiter::set_application_status,
    ),
    components(
        schemas(
            // Common
            crate::utils::ErrorBody,
            crate::api::health::HealthResponse,

            // Accounts
            crate::models::Role,
            crate::models::RegisterRequest,
            crate::models::LoginRequest,
            crate::models::ProfilePatch,
            crate::models::ProfileFieldsPatch,
            crate::models::ApplicantProfile,
            crate::models::AppliedJobView,
            crate::models::PostedJobView,
            crate::models::UserView,
            crate::models::AuthResponse,
            crate::models::ProfileUpdateResponse,

            // Jobs & applications
            crate::models::JobType,
            crate::models::ApplicationStatus,
            crate::models::CreateJobRequest,
            crate::models::UpdateJobRequest,
            crate::models::SetStatusRequest,
            crate::models::RecruiterSummary,
            crate::models::ApplicationView,
            crate::models::JobView,
            crate::models::JobPage,
            crate::models::JobListResponse,
            crate::models::JobResponse,
            crate::models::JobMessageResponse,
            crate::models::MessageResponse,
            crate::models::AppliedJobSummary,
            crate::models::ApplicationStatusView,
            crate::models::ApplicantEntry,
            crate::models::ApplicantsResponse,
            crate::models::StatusUpdateResponse,
        )
    ),
    tags(
        (name = "Health", description = "Liveness and database connectivity."),
        (name = "Auth", description = "Registration, login, profile management and resume download."),
        (name = "Jobs", description = "Public job catalog: search, filter, paginate and view jobs."),
        (name = "Applications", description = "Applicant side of the application workflow."),
        (name = "Recruiter", description = "Job ownership and applicant status management. Recruiters only."),
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("Token from /auth/login or /auth/register"))
                        .build()
                ),
            );
        }
    }
}
