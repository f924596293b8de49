use actix_web::{web, HttpResponse, Responder};
use serde::{Deserialize, Serialize};

use crate::context::AppContext;

#[derive(Serialize, Deserialize, utoipa::ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
    pub timestamp: i64,
}

#[utoipa::path(
    get,
    path = "/",
    tag = "Health",
    responses(
        (status = 200, description = "Welcome message", body = String)
    )
)]
pub async fn welcome() -> impl Responder {
    HttpResponse::Ok()
        .content_type("text/plain; charset=utf-8")
        .body("Welcome to the Job Board API")
}

#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse),
        (status = 503, description = "Database unreachable", body = HealthResponse)
    )
)]
pub async fn health_check(ctx: web::Data<AppContext>) -> impl Responder {
    let healthy = match ctx.store.ping().await {
        Ok(()) => true,
        Err(e) => {
            log::error!("❌ Health check failed: {}", e);
            false
        }
    };

    let body = HealthResponse {
        status: if healthy { "healthy" } else { "unhealthy" }.to_string(),
        service: "job-board-api".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now().timestamp(),
    };

    if healthy {
        HttpResponse::Ok().json(body)
    } else {
        HttpResponse::ServiceUnavailable().json(body)
    }
}
