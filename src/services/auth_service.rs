use mongodb::bson::oid::ObjectId;
use std::collections::HashMap;

use crate::context::AppContext;
use crate::models::{
    normalize_email, Account, Applicant, ApplicantProfile, AppliedJobView, AuthResponse, Identity,
    LoginRequest, PostedJobView, ProfilePatch, Recruiter, RegisterRequest, Role, UserView,
};
use crate::database::StoreError;
use crate::services::resume_store::{ResumeStore, UploadedFile};
use crate::utils::AppError;

fn required(field: Option<String>, name: &str) -> Result<String, AppError> {
    field
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| AppError::invalid(format!("{} is required", name)))
}

fn validate_email(email: &str) -> Result<(), AppError> {
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(()),
        _ => Err(AppError::invalid("Invalid email address")),
    }
}

/// bcrypt is CPU-bound, so it runs on the blocking pool.
async fn hash_password(password: String, cost: u32) -> Result<String, AppError> {
    tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
        .await
        .map_err(|e| AppError::unexpected(format!("Task join error: {}", e)))?
        .map_err(|e| AppError::unexpected(format!("Failed to hash password: {}", e)))
}

async fn verify_password(password: String, hash: String) -> Result<bool, AppError> {
    tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
        .await
        .map_err(|e| AppError::unexpected(format!("Task join error: {}", e)))?
        .map_err(|e| AppError::unexpected(format!("Password verification error: {}", e)))
}

// User registration
pub async fn register(ctx: &AppContext, request: RegisterRequest) -> Result<AuthResponse, AppError> {
    let name = required(request.name, "Name")?;
    let email = normalize_email(&required(request.email, "Email")?);
    let password = request
        .password
        .filter(|p| !p.is_empty())
        .ok_or_else(|| AppError::invalid("Password is required"))?;
    validate_email(&email)?;

    if ctx.store.find_account_by_email(&email).await?.is_some() {
        return Err(AppError::conflict("User already exists"));
    }

    let role: Role = request
        .role
        .as_deref()
        .unwrap_or_default()
        .parse()
        .map_err(|_| AppError::invalid("Invalid role"))?;

    let password_hash = hash_password(password, ctx.bcrypt_cost).await?;
    let id = ObjectId::new();

    let account = match role {
        Role::Applicant => Account::Applicant(Applicant {
            id,
            name,
            email,
            password_hash,
            profile: ApplicantProfile::default(),
            applied_jobs: Vec::new(),
        }),
        Role::Recruiter => Account::Recruiter(Recruiter {
            id,
            name,
            email,
            password_hash,
            posted_jobs: Vec::new(),
        }),
    };

    // Unique index catches a concurrent registration with the same email
    ctx.store.insert_account(&account).await?;

    let token = ctx.tokens.issue(&account.identity())?;

    log::info!("✅ User registered successfully: {} ({})", account.email(), role);

    Ok(AuthResponse {
        message: "User registered successfully".to_string(),
        token,
        user: UserView::from(&account),
    })
}

// User login
pub async fn login(ctx: &AppContext, request: &LoginRequest) -> Result<AuthResponse, AppError> {
    let email = normalize_email(&request.email);

    let account = ctx
        .store
        .find_account_by_email(&email)
        .await?
        .ok_or(AppError::InvalidCredentials)?;

    let valid = verify_password(request.password.clone(), account.password_hash().to_string()).await?;
    if !valid {
        return Err(AppError::InvalidCredentials);
    }

    let token = ctx.tokens.issue(&account.identity())?;

    Ok(AuthResponse {
        message: "Login successful".to_string(),
        token,
        user: UserView::from(&account),
    })
}

async fn load_account(ctx: &AppContext, identity: &Identity) -> Result<Account, AppError> {
    ctx.store
        .find_account(identity)
        .await?
        .ok_or_else(|| AppError::not_found("User not found"))
}

/// Caller's own record with job references resolved to summaries.
pub async fn get_profile(ctx: &AppContext, identity: &Identity) -> Result<UserView, AppError> {
    let account = load_account(ctx, identity).await?;
    resolve_profile(ctx, &account).await
}

async fn resolve_profile(ctx: &AppContext, account: &Account) -> Result<UserView, AppError> {
    let mut view = UserView::from(account);

    match account {
        Account::Applicant(applicant) => {
            let ids: Vec<ObjectId> = applicant.applied_jobs.iter().map(|j| j.job_id).collect();
            let jobs: HashMap<ObjectId, _> = ctx
                .store
                .find_jobs_by_ids(&ids)
                .await?
                .into_iter()
                .map(|job| (job.id, job))
                .collect();

            view.applied_jobs = Some(
                applicant
                    .applied_jobs
                    .iter()
                    .map(|applied| {
                        let job = jobs.get(&applied.job_id);
                        AppliedJobView {
                            job_id: applied.job_id.to_hex(),
                            title: job.map(|j| j.title.clone()),
                            company: job.map(|j| j.company.clone()),
                            location: job.map(|j| j.location.clone()),
                            status: applied.status,
                        }
                    })
                    .collect(),
            );
        }
        Account::Recruiter(recruiter) => {
            let ids: Vec<ObjectId> = recruiter.posted_jobs.iter().map(|p| p.job_id).collect();
            let mut jobs: HashMap<ObjectId, _> = ctx
                .store
                .find_jobs_by_ids(&ids)
                .await?
                .into_iter()
                .map(|job| (job.id, job))
                .collect();

            // Keep posting order; refs to deleted jobs drop out
            view.posted_jobs = Some(
                ids.iter()
                    .filter_map(|id| jobs.remove(id))
                    .map(|job| PostedJobView {
                        id: job.id.to_hex(),
                        title: job.title,
                        company: job.company,
                        location: job.location,
                        salary: job.salary,
                        job_type: job.job_type,
                    })
                    .collect(),
            );
        }
    }

    Ok(view)
}

/// Applies a partial update to the caller's own record.
///
/// Profile sub-fields merge into the stored profile; an uploaded resume
/// replaces the stored reference. The file is only written once the rest
/// of the patch has been validated.
pub async fn update_profile(
    ctx: &AppContext,
    identity: &Identity,
    patch: ProfilePatch,
    resume: Option<UploadedFile>,
) -> Result<UserView, AppError> {
    let mut account = load_account(ctx, identity).await?;

    if let Account::Recruiter(_) = account {
        if patch.profile.is_some() || resume.is_some() {
            return Err(AppError::invalid("Recruiters do not have an applicant profile"));
        }
    }

    if let Some(name) = patch.name {
        let name = name.trim().to_string();
        if name.is_empty() {
            return Err(AppError::invalid("Name cannot be empty"));
        }
        account.set_name(name);
    }

    if let Some(email) = patch.email {
        let email = normalize_email(&email);
        validate_email(&email)?;
        if email != account.email() {
            if let Some(other) = ctx.store.find_account_by_email(&email).await? {
                if other.id() != account.id() {
                    return Err(AppError::conflict("Email already in use"));
                }
            }
            account.set_email(email);
        }
    }

    if let (Account::Applicant(applicant), Some(fields)) = (&mut account, patch.profile) {
        fields.merge_into(&mut applicant.profile);
    }

    if let Some(file) = &resume {
        ResumeStore::check_content_type(file.content_type.as_deref())?;
        ctx.resumes.check_size(file.bytes.len())?;
    }

    let mut replaced_resume = None;
    let mut stored_resume = None;
    if let (Account::Applicant(applicant), Some(file)) = (&mut account, resume) {
        let filename = ctx
            .resumes
            .save(file.content_type.as_deref(), &file.bytes)
            .await?;
        replaced_resume = applicant.profile.resume.replace(filename.clone());
        stored_resume = Some(filename);
    }

    let saved = match ctx.store.save_account_fields(&account).await {
        Ok(true) => Ok(()),
        Ok(false) => Err(AppError::not_found("User not found")),
        Err(StoreError::Duplicate(_)) => Err(AppError::conflict("Email already in use")),
        Err(e) => Err(e.into()),
    };

    if let Err(e) = saved {
        if let Some(filename) = &stored_resume {
            ctx.resumes.remove(filename).await;
        }
        return Err(e);
    }

    if let Some(old) = replaced_resume {
        ctx.resumes.remove(&old).await;
    }

    log::info!("✅ Profile updated: {} ({})", account.id(), account.role());

    resolve_profile(ctx, &account).await
}
