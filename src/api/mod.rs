pub mod auth;
pub mod health;
pub mod jobs;
pub mod recruiter;
pub mod swagger;

use actix_web::{error, web, HttpRequest};

use crate::middleware::AuthMiddleware;
use crate::utils::AppError;

fn json_error(err: error::JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    AppError::invalid(format!("Invalid JSON body: {}", err)).into()
}

fn query_error(err: error::QueryPayloadError, _req: &HttpRequest) -> actix_web::Error {
    AppError::invalid(format!("Invalid query string: {}", err)).into()
}

fn path_error(err: error::PathError, _req: &HttpRequest) -> actix_web::Error {
    AppError::invalid(format!("Invalid path: {}", err)).into()
}

/// Mounts every route. Shared by the server and the HTTP tests.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(json_error))
        .app_data(web::QueryConfig::default().error_handler(query_error))
        .app_data(web::PathConfig::default().error_handler(path_error))
        .route("/", web::get().to(health::welcome))
        .route("/health", web::get().to(health::health_check))
        // Auth: register/login are public, profile requires a token
        .service(
            web::scope("/auth")
                .route("/register", web::post().to(auth::register))
                .route("/login", web::post().to(auth::login))
                .service(
                    web::resource("/profile")
                        .wrap(AuthMiddleware)
                        .route(web::get().to(auth::get_profile))
                        .route(web::put().to(auth::update_profile)),
                )
                // Tail match so traversal attempts reach the handler and get a 400
                .route("/resume/{filename:.*}", web::get().to(auth::serve_resume)),
        )
        // Jobs: fixed segments must be registered before "/{id}"
        .service(
            web::scope("/job")
                .route("", web::get().to(jobs::list_jobs))
                .route("/", web::get().to(jobs::list_jobs))
                .route("/list", web::get().to(jobs::list_all_jobs))
                .service(
                    web::resource("/recruiter/list")
                        .wrap(AuthMiddleware)
                        .route(web::get().to(jobs::list_my_jobs)),
                )
                .service(
                    web::resource("/applied")
                        .wrap(AuthMiddleware)
                        .route(web::get().to(jobs::list_applied_jobs)),
                )
                .service(
                    web::resource("/apply/{id}")
                        .wrap(AuthMiddleware)
                        .route(web::post().to(jobs::apply_to_job)),
                )
                .service(
                    web::resource("/status/{id}")
                        .wrap(AuthMiddleware)
                        .route(web::get().to(jobs::application_status)),
                )
                .route("/{id}", web::get().to(jobs::get_job)),
        )
        // Recruiter: every route requires a token
        .service(
            web::scope("/recruiter")
                .wrap(AuthMiddleware)
                .route("/newJob", web::post().to(recruiter::create_job))
                .route("/applicants", web::get().to(recruiter::list_applicants))
                .route("/{id}/applicants", web::get().to(recruiter::list_job_applicants))
                .route(
                    "/{id}/applicants/{applicant_id}",
                    web::put().to(recruiter::set_application_status),
                )
                .service(
                    web::resource("/{id}")
                        .route(web::put().to(recruiter::update_job))
                        .route(web::delete().to(recruiter::delete_job)),
                ),
        );
}
