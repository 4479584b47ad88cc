//! Job and application models and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::common::parse_skills;
use super::user::Profile;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Job {
    pub id: String,
    pub client_id: String,
    pub title: String,
    pub description: String,
    pub category: String,
    /// JSON array of skill strings
    pub skills: Option<String>,
    pub budget_type: String,
    pub budget_amount: f64,
    pub budget_min: Option<f64>,
    pub budget_max: Option<f64>,
    pub duration: Option<String>,
    pub experience: String,
    pub status: String,
    pub hired_freelancer_id: Option<String>,
    pub deadline: Option<String>,
    pub is_active: bool,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Application {
    pub id: String,
    pub job_id: String,
    pub freelancer_id: String,
    pub proposal: String,
    pub bid_amount: f64,
    pub estimated_duration: String,
    pub status: String,
    pub applied_at: String,
}

/// Budget object as exposed on the wire
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Budget {
    #[serde(rename = "type")]
    pub budget_type: String,
    pub amount: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_amount: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_amount: Option<f64>,
}

impl Job {
    pub fn budget(&self) -> Budget {
        Budget {
            budget_type: self.budget_type.clone(),
            amount: self.budget_amount,
            min_amount: self.budget_min,
            max_amount: self.budget_max,
        }
    }

    pub fn to_response(self, client: ClientRef, applications_count: i64) -> JobResponse {
        let budget = self.budget();
        JobResponse {
            id: self.id,
            title: self.title,
            description: self.description,
            category: self.category,
            skills: parse_skills(self.skills.as_deref()),
            budget,
            duration: self.duration,
            experience: self.experience,
            status: self.status,
            hired_freelancer: self.hired_freelancer_id,
            deadline: self.deadline,
            is_active: self.is_active,
            created_at: self.created_at,
            client,
            applications_count,
        }
    }

    pub fn to_detail(self, client: ClientRef, applications: Vec<ApplicationResponse>) -> JobDetailResponse {
        let budget = self.budget();
        JobDetailResponse {
            id: self.id,
            title: self.title,
            description: self.description,
            category: self.category,
            skills: parse_skills(self.skills.as_deref()),
            budget,
            duration: self.duration,
            experience: self.experience,
            status: self.status,
            hired_freelancer: self.hired_freelancer_id,
            deadline: self.deadline,
            is_active: self.is_active,
            created_at: self.created_at,
            client,
            applications,
        }
    }
}

/// Resolved owner reference embedded in job responses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientRef {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// Resolved applicant reference embedded in application responses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FreelancerRef {
    pub id: String,
    pub name: String,
    pub profile: Profile,
}

/// Job as returned by list endpoints: client name resolved, applications counted
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobResponse {
    pub id: String,
    pub title: String,
    pub description: String,
    pub category: String,
    pub skills: Vec<String>,
    pub budget: Budget,
    pub duration: Option<String>,
    pub experience: String,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hired_freelancer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deadline: Option<String>,
    pub is_active: bool,
    pub created_at: String,
    pub client: ClientRef,
    pub applications_count: i64,
}

/// Job as returned by the detail endpoint: applications fully resolved
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobDetailResponse {
    pub id: String,
    pub title: String,
    pub description: String,
    pub category: String,
    pub skills: Vec<String>,
    pub budget: Budget,
    pub duration: Option<String>,
    pub experience: String,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hired_freelancer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deadline: Option<String>,
    pub is_active: bool,
    pub created_at: String,
    pub client: ClientRef,
    pub applications: Vec<ApplicationResponse>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationResponse {
    pub id: String,
    pub freelancer: FreelancerRef,
    pub proposal: String,
    pub bid_amount: f64,
    pub estimated_duration: String,
    pub status: String,
    pub applied_at: String,
}

// DTOs for API requests

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateJobRequest {
    pub title: String,
    pub description: String,
    pub category: String,
    #[serde(default)]
    pub skills: Vec<String>,
    pub budget: Budget,
    pub duration: Option<String>,
    pub experience: String,
    pub deadline: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateJobRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub skills: Option<Vec<String>>,
    pub budget: Option<Budget>,
    pub duration: Option<String>,
    pub experience: Option<String>,
    pub deadline: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplyRequest {
    pub proposal: String,
    pub bid_amount: f64,
    pub estimated_duration: String,
}

/// Body of the accept/reject decision
#[derive(Debug, Deserialize)]
pub struct DecideApplicationRequest {
    pub status: String,
}

/// Admin moderation update; absent fields are left unchanged
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminUpdateJobRequest {
    pub status: Option<String>,
    pub is_active: Option<bool>,
}

/// Query parameters for the public job listing
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct JobListQuery {
    pub category: Option<String>,
    pub experience: Option<String>,
    pub budget_min: Option<f64>,
    pub budget_max: Option<f64>,
    /// Case-insensitive substring match on title, description or skills
    pub search: Option<String>,
    /// Defaults to "open"
    pub status: Option<String>,
    /// Page number (1-indexed, defaults to 1)
    pub page: Option<i64>,
    /// Items per page (defaults to 10, max 100)
    pub limit: Option<i64>,
}

/// Query parameters for the admin job listing
#[derive(Debug, Clone, Deserialize, Default)]
pub struct AdminJobListQuery {
    pub status: Option<String>,
    pub category: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

/// A caller's own application, without the resolved freelancer reference
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnApplication {
    pub id: String,
    pub proposal: String,
    pub bid_amount: f64,
    pub estimated_duration: String,
    pub status: String,
    pub applied_at: String,
}

impl From<Application> for OwnApplication {
    fn from(app: Application) -> Self {
        Self {
            id: app.id,
            proposal: app.proposal,
            bid_amount: app.bid_amount,
            estimated_duration: app.estimated_duration,
            status: app.status,
            applied_at: app.applied_at,
        }
    }
}

/// One entry of a freelancer's application overview
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MyApplicationEntry {
    pub job_id: String,
    pub job_title: String,
    pub job_category: String,
    pub job_budget: Budget,
    pub job_status: String,
    pub client_name: String,
    pub application: OwnApplication,
}
