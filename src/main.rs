mod api;
mod config;
mod context;
mod database;
mod middleware;
mod models;
mod services;
mod utils;

use actix_cors::Cors;
use actix_web::{http::header, middleware::Logger, web, App, HttpServer};
use dotenv::dotenv;
use std::sync::Arc;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::config::Config;
use crate::context::AppContext;
use crate::database::MongoStore;

fn cors(allowed_origins: &[String]) -> Cors {
    let cors = if allowed_origins.is_empty() {
        Cors::default().allow_any_origin()
    } else {
        allowed_origins
            .iter()
            .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin))
    };

    cors.allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
        .allowed_headers(vec![header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
        .expose_headers(vec![header::CONTENT_TYPE])
        .max_age(3600)
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load environment variables
    dotenv().ok();

    // Initialize logger
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = Config::from_env().map_err(|e| {
        log::error!("❌ Invalid configuration: {}", e);
        std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string())
    })?;

    log::info!("🚀 Starting Job Board API...");

    // Initialize MongoDB connection
    let store = MongoStore::connect(&config.database_url).await.map_err(|e| {
        log::error!("❌ Failed to connect to MongoDB: {}", e);
        std::io::Error::new(std::io::ErrorKind::Other, e.to_string())
    })?;
    log::info!("✅ MongoDB connected successfully");

    let ctx = AppContext::new(Arc::new(store), &config)?;
    log::info!("📁 Resumes stored in {}", ctx.resumes.dir().display());
    let ctx_data = web::Data::new(ctx);

    let host = config.host.clone();
    let port = config.port;
    let allowed_origins = config.allowed_origins.clone();

    log::info!("🌐 Server starting on {}:{}", host, port);
    log::info!("📚 Swagger UI available at: http://{}:{}/swagger-ui/", host, port);
    log::info!("📄 OpenAPI spec at: http://{}:{}/api-docs/openapi.json", host, port);

    // Generate OpenAPI specification
    let openapi = api::swagger::ApiDoc::openapi();

    HttpServer::new(move || {
        App::new()
            .app_data(ctx_data.clone())
            .wrap(cors(&allowed_origins))
            .wrap(middleware::SecurityHeaders)
            .wrap(Logger::default())
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-docs/openapi.json", openapi.clone()),
            )
            .configure(api::configure)
    })
    .bind((host.as_str(), port))?
    .run()
    .await
}
