use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::job::ApplicationStatus;

/// User role, fixed by the partition the account lives in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Applicant,
    Recruiter,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Applicant => "applicant",
            Role::Recruiter => "recruiter",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "applicant" => Ok(Role::Applicant),
            "recruiter" => Ok(Role::Recruiter),
            other => Err(format!("Invalid role: {}", other)),
        }
    }
}

/// Verified caller attached to gated requests
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Identity {
    pub id: ObjectId,
    pub role: Role,
}

/// Applicant profile (embedded in the document)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct ApplicantProfile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resume: Option<String>,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub experience: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub education: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppliedJobRef {
    pub job_id: ObjectId,
    pub status: ApplicationStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostedJobRef {
    pub job_id: ObjectId,
    pub posted_at: i64,
}

/// Applicant (collection `applicants`)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Applicant {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub name: String,
    pub email: String,
    #[serde(rename = "password")]
    pub password_hash: String,
    #[serde(default)]
    pub profile: ApplicantProfile,
    #[serde(default)]
    pub applied_jobs: Vec<AppliedJobRef>,
}

/// Recruiter (collection `recruiters`)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recruiter {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub name: String,
    pub email: String,
    #[serde(rename = "password")]
    pub password_hash: String,
    #[serde(default)]
    pub posted_jobs: Vec<PostedJobRef>,
}

/// A user record from either partition.
#[derive(Debug, Clone)]
pub enum Account {
    Applicant(Applicant),
    Recruiter(Recruiter),
}

impl Account {
    pub fn id(&self) -> ObjectId {
        match self {
            Account::Applicant(a) => a.id,
            Account::Recruiter(r) => r.id,
        }
    }

    pub fn role(&self) -> Role {
        match self {
            Account::Applicant(_) => Role::Applicant,
            Account::Recruiter(_) => Role::Recruiter,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Account::Applicant(a) => &a.name,
            Account::Recruiter(r) => &r.name,
        }
    }

    pub fn email(&self) -> &str {
        match self {
            Account::Applicant(a) => &a.email,
            Account::Recruiter(r) => &r.email,
        }
    }

    pub fn password_hash(&self) -> &str {
        match self {
            Account::Applicant(a) => &a.password_hash,
            Account::Recruiter(r) => &r.password_hash,
        }
    }

    pub fn identity(&self) -> Identity {
        Identity {
            id: self.id(),
            role: self.role(),
        }
    }

    pub fn set_name(&mut self, name: String) {
        match self {
            Account::Applicant(a) => a.name = name,
            Account::Recruiter(r) => r.name = name,
        }
    }

    pub fn set_email(&mut self, email: String) {
        match self {
            Account::Applicant(a) => a.email = email,
            Account::Recruiter(r) => r.email = email,
        }
    }
}

/// Lower-cased, trimmed form used for storage and lookup.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

// ==================== Requests ====================

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct RegisterRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub role: Option<String>,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Sub-fields of the applicant profile that a patch may carry.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, utoipa::ToSchema)]
#[serde(deny_unknown_fields)]
pub struct ProfileFieldsPatch {
    pub skills: Option<Vec<String>>,
    pub experience: Option<String>,
    pub education: Option<String>,
    pub contact: Option<String>,
}

impl ProfileFieldsPatch {
    pub fn is_empty(&self) -> bool {
        self.skills.is_none()
            && self.experience.is_none()
            && self.education.is_none()
            && self.contact.is_none()
    }

    /// Skills are replaced whole; the other fields overwrite one by one.
    pub fn merge_into(self, profile: &mut ApplicantProfile) {
        if let Some(skills) = self.skills {
            profile.skills = skills;
        }
        if let Some(experience) = self.experience {
            profile.experience = Some(experience);
        }
        if let Some(education) = self.education {
            profile.education = Some(education);
        }
        if let Some(contact) = self.contact {
            profile.contact = Some(contact);
        }
    }
}

/// Partial update of the caller's own record.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, utoipa::ToSchema)]
#[serde(deny_unknown_fields)]
pub struct ProfilePatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub profile: Option<ProfileFieldsPatch>,
}

// ==================== Responses ====================

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct AppliedJobView {
    #[serde(rename = "jobId")]
    pub job_id: String,
    pub title: Option<String>,
    pub company: Option<String>,
    pub location: Option<String>,
    pub status: ApplicationStatus,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PostedJobView {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    pub company: String,
    pub location: String,
    pub salary: Option<String>,
    pub job_type: super::job::JobType,
}

/// User record as returned to clients (no password hash).
#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserView {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile: Option<ApplicantProfile>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub applied_jobs: Option<Vec<AppliedJobView>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub posted_jobs: Option<Vec<PostedJobView>>,
}

impl From<&Account> for UserView {
    fn from(account: &Account) -> Self {
        let mut view = UserView {
            id: account.id().to_hex(),
            name: account.name().to_string(),
            email: account.email().to_string(),
            role: account.role(),
            profile: None,
            applied_jobs: None,
            posted_jobs: None,
        };
        if let Account::Applicant(applicant) = account {
            view.profile = Some(applicant.profile.clone());
        }
        view
    }
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct AuthResponse {
    pub message: String,
    pub token: String,
    pub user: UserView,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ProfileUpdateResponse {
    pub message: String,
    pub user: UserView,
}
