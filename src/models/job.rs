use chrono::{DateTime, Utc};
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::user::ApplicantProfile;

/// Accepted job types (canonical set enforced on create and update)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub enum JobType {
    #[serde(rename = "Full-Time")]
    FullTime,
    #[serde(rename = "Part-Time")]
    PartTime,
    #[serde(rename = "Contract")]
    Contract,
    #[serde(rename = "Internship")]
    Internship,
}

impl JobType {
    pub const ALL: [JobType; 4] = [
        JobType::FullTime,
        JobType::PartTime,
        JobType::Contract,
        JobType::Internship,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            JobType::FullTime => "Full-Time",
            JobType::PartTime => "Part-Time",
            JobType::Contract => "Contract",
            JobType::Internship => "Internship",
        }
    }
}

impl fmt::Display for JobType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JobType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        JobType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| "Invalid job type.".to_string())
    }
}

/// Application lifecycle. Any value may be set at any time by the owning recruiter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ApplicationStatus {
    #[default]
    Applied,
    Shortlisted,
    Rejected,
    Hired,
}

impl ApplicationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApplicationStatus::Applied => "applied",
            ApplicationStatus::Shortlisted => "shortlisted",
            ApplicationStatus::Rejected => "rejected",
            ApplicationStatus::Hired => "hired",
        }
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ApplicationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "applied" => Ok(ApplicationStatus::Applied),
            "shortlisted" => Ok(ApplicationStatus::Shortlisted),
            "rejected" => Ok(ApplicationStatus::Rejected),
            "hired" => Ok(ApplicationStatus::Hired),
            _ => Err("Invalid status value".to_string()),
        }
    }
}

/// Application embedded in `Job.applicants`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Application {
    pub applicant_id: ObjectId,
    #[serde(default)]
    pub status: ApplicationStatus,
    /// Unix timestamp in milliseconds
    pub applied_at: i64,
}

impl Application {
    pub fn new(applicant_id: ObjectId) -> Self {
        Application {
            applicant_id,
            status: ApplicationStatus::Applied,
            applied_at: Utc::now().timestamp_millis(),
        }
    }
}

/// Job posting (collection `jobs`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub title: String,
    pub desc: String,
    pub company: String,
    pub location: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub salary: Option<String>,
    pub job_type: JobType,
    #[serde(default)]
    pub skills_required: Vec<String>,
    /// Owning recruiter, immutable after creation
    pub recruiter: ObjectId,
    #[serde(default)]
    pub applicants: Vec<Application>,
    /// Unix timestamp in milliseconds
    pub posted_at: i64,
}

impl Job {
    pub fn application_of(&self, applicant_id: &ObjectId) -> Option<&Application> {
        self.applicants
            .iter()
            .find(|app| &app.applicant_id == applicant_id)
    }
}

/// Listing filters. Every present dimension must match.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JobFilter {
    pub search: Option<String>,
    pub location: Option<String>,
    pub job_type: Option<String>,
}

// ==================== Requests ====================

#[derive(Debug, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateJobRequest {
    pub title: Option<String>,
    pub desc: Option<String>,
    pub company: Option<String>,
    pub location: Option<String>,
    pub salary: Option<String>,
    pub job_type: Option<String>,
    pub skills_required: Option<Vec<String>>,
}

#[derive(Debug, Default, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateJobRequest {
    pub title: Option<String>,
    pub desc: Option<String>,
    pub company: Option<String>,
    pub location: Option<String>,
    pub salary: Option<String>,
    pub job_type: Option<String>,
    pub skills_required: Option<Vec<String>>,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct SetStatusRequest {
    pub status: Option<String>,
}

#[derive(Debug, Deserialize, utoipa::IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct JobListQuery {
    pub search: Option<String>,
    pub location: Option<String>,
    pub job_type: Option<String>,
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

// ==================== Responses ====================

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct RecruiterSummary {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationView {
    pub applicant_id: String,
    pub status: ApplicationStatus,
    pub applied_at: Option<DateTime<Utc>>,
}

impl From<&Application> for ApplicationView {
    fn from(app: &Application) -> Self {
        ApplicationView {
            applicant_id: app.applicant_id.to_hex(),
            status: app.status,
            applied_at: DateTime::from_timestamp_millis(app.applied_at),
        }
    }
}

/// Job as returned to clients. `applicants` is only filled for the owner.
#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct JobView {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    pub desc: String,
    pub company: String,
    pub location: String,
    pub salary: Option<String>,
    pub job_type: JobType,
    pub skills_required: Vec<String>,
    pub recruiter: RecruiterSummary,
    pub applicant_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub applicants: Option<Vec<ApplicationView>>,
    pub posted_at: Option<DateTime<Utc>>,
}

impl JobView {
    pub fn public(job: &Job, recruiter_name: Option<String>) -> Self {
        JobView {
            id: job.id.to_hex(),
            title: job.title.clone(),
            desc: job.desc.clone(),
            company: job.company.clone(),
            location: job.location.clone(),
            salary: job.salary.clone(),
            job_type: job.job_type,
            skills_required: job.skills_required.clone(),
            recruiter: RecruiterSummary {
                id: job.recruiter.to_hex(),
                name: recruiter_name,
                email: None,
            },
            applicant_count: job.applicants.len(),
            applicants: None,
            posted_at: DateTime::from_timestamp_millis(job.posted_at),
        }
    }

    pub fn owned(job: &Job, recruiter_name: Option<String>) -> Self {
        let mut view = JobView::public(job, recruiter_name);
        view.applicants = Some(job.applicants.iter().map(ApplicationView::from).collect());
        view
    }
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct JobPage {
    pub jobs: Vec<JobView>,
    pub total_count: u64,
    pub current_page: u64,
    pub total_pages: u64,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct JobListResponse {
    pub jobs: Vec<JobView>,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct JobResponse {
    pub job: JobView,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct JobMessageResponse {
    pub message: String,
    pub job: JobView,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AppliedJobSummary {
    pub job_id: String,
    pub title: String,
    pub company: String,
    pub location: String,
    pub job_type: JobType,
    pub recruiter: RecruiterSummary,
    pub application_status: ApplicationStatus,
    pub applied_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationStatusView {
    pub job_title: String,
    pub company: String,
    pub status: ApplicationStatus,
    pub applied_at: Option<DateTime<Utc>>,
}

/// One applicant on one of the recruiter's jobs, applicant reference resolved.
#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApplicantEntry {
    pub job_title: String,
    pub job_id: String,
    pub applicant_id: String,
    pub name: Option<String>,
    pub email: Option<String>,
    pub profile: Option<ApplicantProfile>,
    pub status: ApplicationStatus,
    pub applied_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ApplicantsResponse {
    pub applicants: Vec<ApplicantEntry>,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StatusUpdateResponse {
    pub message: String,
    pub updated_applicant: ApplicationView,
}
