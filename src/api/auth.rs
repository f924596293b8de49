use actix_multipart::{Field, Multipart};
use actix_web::{http::header, web, HttpRequest, HttpResponse};
use futures::StreamExt;

use crate::context::AppContext;
use crate::models::{
    AuthResponse, Identity, LoginRequest, ProfileFieldsPatch, ProfilePatch, ProfileUpdateResponse,
    RegisterRequest, UserView,
};
use crate::services::resume_store::PDF_CONTENT_TYPE;
use crate::services::{auth_service, UploadedFile};
use crate::utils::{AppError, ErrorBody};

/// Ceiling for non-file form values and JSON bodies.
const MAX_FIELD_BYTES: usize = 64 * 1024;

#[utoipa::path(
    post,
    path = "/auth/register",
    tag = "Auth",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Registration successful", body = AuthResponse),
        (status = 400, description = "Invalid request or user already exists", body = ErrorBody)
    )
)]
pub async fn register(
    ctx: web::Data<AppContext>,
    request: web::Json<RegisterRequest>,
) -> Result<HttpResponse, AppError> {
    let email_str = request.email.clone().unwrap_or_else(|| "N/A".to_string());
    log::info!("📝 POST /auth/register - email: {}", email_str);

    let response = auth_service::register(&ctx, request.into_inner())
        .await
        .inspect_err(|e| log::warn!("❌ Registration failed: {} - {}", email_str, e))?;

    Ok(HttpResponse::Created().json(response))
}

#[utoipa::path(
    post,
    path = "/auth/login",
    tag = "Auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = AuthResponse),
        (status = 401, description = "Invalid credentials", body = ErrorBody)
    )
)]
pub async fn login(
    ctx: web::Data<AppContext>,
    request: web::Json<LoginRequest>,
) -> Result<HttpResponse, AppError> {
    log::info!("🔐 POST /auth/login - email: {}", request.email);

    let response = auth_service::login(&ctx, &request)
        .await
        .inspect_err(|e| log::warn!("❌ Login failed: {} - {}", request.email, e))?;

    log::info!("✅ Login successful: {}", request.email);
    Ok(HttpResponse::Ok().json(response))
}

#[utoipa::path(
    get,
    path = "/auth/profile",
    tag = "Auth",
    responses(
        (status = 200, description = "Caller's profile", body = UserView),
        (status = 401, description = "Missing or invalid token", body = ErrorBody),
        (status = 404, description = "User not found", body = ErrorBody)
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_profile(
    ctx: web::Data<AppContext>,
    identity: web::ReqData<Identity>,
) -> Result<HttpResponse, AppError> {
    log::info!("👤 GET /auth/profile - {}", identity.id);

    let user = auth_service::get_profile(&ctx, &identity).await?;
    Ok(HttpResponse::Ok().json(user))
}

/// Accepts either a JSON `ProfilePatch` or a multipart form carrying the
/// same fields plus an optional `resume` PDF.
#[utoipa::path(
    put,
    path = "/auth/profile",
    tag = "Auth",
    request_body(content = ProfilePatch, description = "JSON patch, or multipart/form-data with the same fields and an optional `resume` file"),
    responses(
        (status = 200, description = "Profile updated", body = ProfileUpdateResponse),
        (status = 400, description = "Invalid input or email in use", body = ErrorBody),
        (status = 401, description = "Missing or invalid token", body = ErrorBody),
        (status = 404, description = "User not found", body = ErrorBody)
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_profile(
    ctx: web::Data<AppContext>,
    identity: web::ReqData<Identity>,
    req: HttpRequest,
    payload: web::Payload,
) -> Result<HttpResponse, AppError> {
    log::info!("✏️  PUT /auth/profile - {}", identity.id);

    let is_multipart = req
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.to_ascii_lowercase().starts_with("multipart/form-data"))
        .unwrap_or(false);

    let (patch, resume) = if is_multipart {
        let multipart = Multipart::new(req.headers(), payload);
        read_profile_form(multipart, ctx.resumes.max_bytes()).await?
    } else {
        let body = read_body(payload, MAX_FIELD_BYTES).await?;
        let patch: ProfilePatch = if body.iter().all(u8::is_ascii_whitespace) {
            ProfilePatch::default()
        } else {
            serde_json::from_slice(&body).map_err(|e| AppError::invalid(format!("Invalid JSON body: {}", e)))?
        };
        (patch, None)
    };

    let user = auth_service::update_profile(&ctx, &identity, patch, resume)
        .await
        .inspect_err(|e| log::warn!("❌ Profile update failed: {} - {}", identity.id, e))?;

    Ok(HttpResponse::Ok().json(ProfileUpdateResponse {
        message: "Profile updated successfully".to_string(),
        user,
    }))
}

#[utoipa::path(
    get,
    path = "/auth/resume/{filename}",
    tag = "Auth",
    params(("filename" = String, Path, description = "Stored resume name")),
    responses(
        (status = 200, description = "PDF document", body = String, content_type = "application/pdf"),
        (status = 400, description = "Invalid filename", body = ErrorBody),
        (status = 404, description = "Resume not found", body = ErrorBody)
    )
)]
pub async fn serve_resume(
    ctx: web::Data<AppContext>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let filename = path.into_inner();
    log::info!("📄 GET /auth/resume/{}", filename);

    let bytes = ctx.resumes.open(&filename).await?;

    Ok(HttpResponse::Ok()
        .content_type(PDF_CONTENT_TYPE)
        .insert_header((
            header::CONTENT_DISPOSITION,
            format!("inline; filename=\"{}\"", filename),
        ))
        .body(bytes))
}

async fn read_body(mut payload: web::Payload, limit: usize) -> Result<Vec<u8>, AppError> {
    let mut body = Vec::new();
    while let Some(chunk) = payload.next().await {
        let chunk = chunk.map_err(|e| AppError::invalid(format!("Failed to read body: {}", e)))?;
        if body.len() + chunk.len() > limit {
            return Err(AppError::invalid("Request body too large"));
        }
        body.extend_from_slice(&chunk);
    }
    Ok(body)
}

/// Reads one multipart field, failing as soon as it grows past `limit`.
async fn read_field(field: &mut Field, limit: usize, too_large: impl Fn() -> AppError) -> Result<Vec<u8>, AppError> {
    let mut data = Vec::new();
    while let Some(chunk) = field.next().await {
        let chunk = chunk.map_err(|e| AppError::invalid(format!("Invalid multipart payload: {}", e)))?;
        if data.len() + chunk.len() > limit {
            return Err(too_large());
        }
        data.extend_from_slice(&chunk);
    }
    Ok(data)
}

/// Form field names, as sent by plain clients and by the bracketed
/// `profile[...]` encoding.
#[derive(Debug, PartialEq, Eq)]
enum FormField {
    Name,
    Email,
    Skills,
    Experience,
    Education,
    Contact,
    Resume,
}

fn classify(name: &str) -> Option<FormField> {
    let key = name.strip_prefix("profile[").map_or(name, |rest| {
        rest.split_once(']').map_or(rest, |(inner, _)| inner)
    });
    let key = key.strip_suffix("[]").unwrap_or(key);

    match key {
        "name" if name == "name" => Some(FormField::Name),
        "email" if name == "email" => Some(FormField::Email),
        "skills" => Some(FormField::Skills),
        "experience" => Some(FormField::Experience),
        "education" => Some(FormField::Education),
        "contact" => Some(FormField::Contact),
        "resume" => Some(FormField::Resume),
        _ => None,
    }
}

/// A `skills` value is either one skill or a JSON array of them.
fn push_skills(skills: &mut Vec<String>, value: &str) {
    let value = value.trim();
    if value.starts_with('[') {
        if let Ok(list) = serde_json::from_str::<Vec<String>>(value) {
            skills.extend(list);
            return;
        }
    }
    if !value.is_empty() {
        skills.push(value.to_string());
    }
}

async fn read_profile_form(
    mut multipart: Multipart,
    max_resume_bytes: usize,
) -> Result<(ProfilePatch, Option<UploadedFile>), AppError> {
    let mut patch = ProfilePatch::default();
    let mut fields = ProfileFieldsPatch::default();
    let mut skills: Option<Vec<String>> = None;
    let mut resume = None;

    while let Some(item) = multipart.next().await {
        let mut field = item.map_err(|e| AppError::invalid(format!("Invalid multipart payload: {}", e)))?;
        let name = field.name().unwrap_or_default().to_string();

        let kind = classify(&name).ok_or_else(|| AppError::invalid(format!("Unknown field: {}", name)))?;

        if kind == FormField::Resume {
            let content_type = field.content_type().map(|m| m.essence_str().to_string());
            let bytes = read_field(&mut field, max_resume_bytes, || {
                AppError::invalid(format!(
                    "File too large. Maximum size is {} MB",
                    max_resume_bytes / (1024 * 1024)
                ))
            })
            .await?;
            resume = Some(UploadedFile { content_type, bytes });
            continue;
        }

        let bytes = read_field(&mut field, MAX_FIELD_BYTES, || AppError::invalid("Form field too large")).await?;
        let value = String::from_utf8(bytes).map_err(|_| AppError::invalid(format!("Field {} is not valid UTF-8", name)))?;

        match kind {
            FormField::Name => patch.name = Some(value),
            FormField::Email => patch.email = Some(value),
            FormField::Skills => push_skills(skills.get_or_insert_with(Vec::new), &value),
            FormField::Experience => fields.experience = Some(value),
            FormField::Education => fields.education = Some(value),
            FormField::Contact => fields.contact = Some(value),
            FormField::Resume => {}
        }
    }

    fields.skills = skills;
    if !fields.is_empty() {
        patch.profile = Some(fields);
    }

    Ok((patch, resume))
}

#[cfg(test)]
mod form_tests {
    use super::*;

    #[test]
    fn classifies_both_field_spellings() {
        assert_eq!(classify("skills"), Some(FormField::Skills));
        assert_eq!(classify("profile[skills][0]"), Some(FormField::Skills));
        assert_eq!(classify("skills[]"), Some(FormField::Skills));
        assert_eq!(classify("profile[experience]"), Some(FormField::Experience));
        assert_eq!(classify("contact"), Some(FormField::Contact));
        assert_eq!(classify("resume"), Some(FormField::Resume));
        assert_eq!(classify("name"), Some(FormField::Name));
        assert_eq!(classify("profile[name]"), None);
        assert_eq!(classify("role"), None);
    }

    #[test]
    fn skills_accept_json_arrays() {
        let mut skills = Vec::new();
        push_skills(&mut skills, r#"["rust","sql"]"#);
        push_skills(&mut skills, "go");
        push_skills(&mut skills, " ");
        assert_eq!(skills, vec!["rust", "sql", "go"]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api;
    use crate::context::testing::test_context;
    use actix_web::{http::StatusCode, test, App};
    use serde_json::{json, Value};

    const BOUNDARY: &str = "----jobboardtestboundary";

    fn multipart_body(texts: &[(&str, &str)], file: Option<(&str, &str, &[u8])>) -> Vec<u8> {
        let mut body = Vec::new();
        for (name, value) in texts {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
                )
                .as_bytes(),
            );
        }
        if let Some((name, content_type, bytes)) = file {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"; filename=\"cv.pdf\"\r\nContent-Type: {content_type}\r\n\r\n"
                )
                .as_bytes(),
            );
            body.extend_from_slice(bytes);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        body
    }

    async fn token_for(ctx: &AppContext, name: &str, email: &str, role: &str) -> String {
        let request = RegisterRequest {
            name: Some(name.into()),
            email: Some(email.into()),
            password: Some("pw".into()),
            role: Some(role.into()),
        };
        auth_service::register(ctx, request).await.unwrap().token
    }

    #[actix_web::test]
    async fn register_login_and_profile_over_http() {
        let ctx = test_context();
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(ctx.ctx.clone()))
                .configure(api::configure),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/auth/register")
            .set_json(json!({"name": "Alice", "email": "alice@x.com", "password": "pw", "role": "applicant"}))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::CREATED);
        let body: Value = test::read_body_json(res).await;
        let token = body["token"].as_str().unwrap().to_string();

        let req = test::TestRequest::post()
            .uri("/auth/register")
            .set_json(json!({"name": "A2", "email": "alice@x.com", "password": "pw", "role": "recruiter"}))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);

        let req = test::TestRequest::post()
            .uri("/auth/login")
            .set_json(json!({"email": "alice@x.com", "password": "wrong"}))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["message"], "Invalid credentials");

        let req = test::TestRequest::get()
            .uri("/auth/profile")
            .insert_header((header::AUTHORIZATION, format!("Bearer {}", token)))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["email"], "alice@x.com");
        assert_eq!(body["role"], "applicant");
        assert!(body.get("password").is_none());
    }

    #[actix_web::test]
    async fn gate_rejects_missing_and_bad_tokens() {
        let ctx = test_context();
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(ctx.ctx.clone()))
                .configure(api::configure),
        )
        .await;

        let req = test::TestRequest::get().uri("/auth/profile").to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

        let req = test::TestRequest::get()
            .uri("/auth/profile")
            .insert_header((header::AUTHORIZATION, "Bearer not-a-token"))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["message"], "Invalid token");
    }

    #[actix_web::test]
    async fn multipart_profile_update_with_resume() {
        let ctx = test_context();
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(ctx.ctx.clone()))
                .configure(api::configure),
        )
        .await;
        let token = token_for(&ctx, "Alice", "alice@x.com", "applicant").await;

        let pdf = b"%PDF-1.4 resume".to_vec();
        let body = multipart_body(
            &[
                ("profile[skills][0]", "rust"),
                ("profile[skills][1]", "sql"),
                ("profile[experience]", "3 years"),
            ],
            Some(("resume", "application/pdf", &pdf)),
        );
        let req = test::TestRequest::put()
            .uri("/auth/profile")
            .insert_header((header::AUTHORIZATION, format!("Bearer {}", token)))
            .insert_header((
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", BOUNDARY),
            ))
            .set_payload(body)
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::OK);
        let body: Value = test::read_body_json(res).await;
        let profile = &body["user"]["profile"];
        assert_eq!(profile["skills"], json!(["rust", "sql"]));
        assert_eq!(profile["experience"], "3 years");

        let filename = profile["resume"].as_str().unwrap().to_string();
        let req = test::TestRequest::get()
            .uri(&format!("/auth/resume/{}", filename))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(res.headers().get(header::CONTENT_TYPE).unwrap(), "application/pdf");
        assert_eq!(test::read_body(res).await, pdf);
    }

    #[actix_web::test]
    async fn multipart_rejects_non_pdf_resume() {
        let ctx = test_context();
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(ctx.ctx.clone()))
                .configure(api::configure),
        )
        .await;
        let token = token_for(&ctx, "Alice", "alice@x.com", "applicant").await;

        let body = multipart_body(&[], Some(("resume", "image/png", b"\x89PNG")));
        let req = test::TestRequest::put()
            .uri("/auth/profile")
            .insert_header((header::AUTHORIZATION, format!("Bearer {}", token)))
            .insert_header((
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", BOUNDARY),
            ))
            .set_payload(body)
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        assert_eq!(std::fs::read_dir(ctx.resumes.dir()).unwrap().count(), 0);
    }

    #[actix_web::test]
    async fn json_profile_update_rejects_unknown_fields() {
        let ctx = test_context();
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(ctx.ctx.clone()))
                .configure(api::configure),
        )
        .await;
        let token = token_for(&ctx, "Alice", "alice@x.com", "applicant").await;

        let req = test::TestRequest::put()
            .uri("/auth/profile")
            .insert_header((header::AUTHORIZATION, format!("Bearer {}", token)))
            .set_json(json!({"role": "recruiter"}))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);

        let req = test::TestRequest::put()
            .uri("/auth/profile")
            .insert_header((header::AUTHORIZATION, format!("Bearer {}", token)))
            .set_json(json!({"profile": {"contact": "555-0100"}}))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["message"], "Profile updated successfully");
        assert_eq!(body["user"]["profile"]["contact"], "555-0100");
    }

    #[actix_web::test]
    async fn empty_profile_update_leaves_record_unchanged() {
        let ctx = test_context();
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(ctx.ctx.clone()))
                .configure(api::configure),
        )
        .await;
        let token = token_for(&ctx, "Alice", "alice@x.com", "applicant").await;

        let req = test::TestRequest::put()
            .uri("/auth/profile")
            .insert_header((header::AUTHORIZATION, format!("Bearer {}", token)))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::OK);
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["message"], "Profile updated successfully");
        assert_eq!(body["user"]["name"], "Alice");
        assert_eq!(body["user"]["email"], "alice@x.com");
    }

    #[actix_web::test]
    async fn resume_route_refuses_traversal() {
        let ctx = test_context();
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(ctx.ctx.clone()))
                .configure(api::configure),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/auth/resume/../../etc/passwd")
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);

        let req = test::TestRequest::get().uri("/auth/resume/missing.pdf").to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }
}
