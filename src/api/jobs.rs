//! Job posting endpoints: listing, CRUD, and the application lifecycle
//! on a single job (apply, accept/reject).

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::db::{
    Application, ApplicationResponse, ApplicationStatus, ApplyRequest, ClientRef,
    CreateJobRequest, DecideApplicationRequest, FreelancerRef, Job, JobDetailResponse,
    JobListQuery, JobResponse, JobStatus, Page, PageMeta, Role, UpdateJobRequest, User,
    serialize_skills,
};
use crate::AppState;

use super::auth::{require_owner_or_admin, require_role};
use super::error::{ApiError, MessageResponse, ValidationErrorBuilder};
use super::validation::{
    validate_bid_amount, validate_budget_amount, validate_budget_type, validate_category,
    validate_decision, validate_description, validate_duration, validate_estimated_duration,
    validate_experience, validate_job_status, validate_proposal, validate_title, validate_uuid,
};

/// Default and maximum page sizes for job listings
const DEFAULT_LIMIT: i64 = 10;
const MAX_LIMIT: i64 = 100;

/// Validate a CreateJobRequest
fn validate_create_request(req: &CreateJobRequest) -> Result<(), ApiError> {
    let mut errors = ValidationErrorBuilder::new();

    if let Err(e) = validate_title(&req.title) {
        errors.add("title", &e);
    }
    if let Err(e) = validate_description(&req.description) {
        errors.add("description", &e);
    }
    if let Err(e) = validate_category(&req.category) {
        errors.add("category", &e);
    }
    if let Err(e) = validate_budget_type(&req.budget.budget_type) {
        errors.add("budget.type", &e);
    }
    if let Err(e) = validate_budget_amount(req.budget.amount) {
        errors.add("budget.amount", &e);
    }
    if let Err(e) = validate_experience(&req.experience) {
        errors.add("experience", &e);
    }
    if let Err(e) = validate_duration(&req.duration) {
        errors.add("duration", &e);
    }

    errors.finish()
}

/// Validate an UpdateJobRequest (only fields that are present)
fn validate_update_request(req: &UpdateJobRequest) -> Result<(), ApiError> {
    let mut errors = ValidationErrorBuilder::new();

    if let Some(ref title) = req.title {
        if let Err(e) = validate_title(title) {
            errors.add("title", &e);
        }
    }
    if let Some(ref description) = req.description {
        if let Err(e) = validate_description(description) {
            errors.add("description", &e);
        }
    }
    if let Some(ref category) = req.category {
        if let Err(e) = validate_category(category) {
            errors.add("category", &e);
        }
    }
    if let Some(ref budget) = req.budget {
        if let Err(e) = validate_budget_type(&budget.budget_type) {
            errors.add("budget.type", &e);
        }
        if let Err(e) = validate_budget_amount(budget.amount) {
            errors.add("budget.amount", &e);
        }
    }
    if let Some(ref experience) = req.experience {
        if let Err(e) = validate_experience(experience) {
            errors.add("experience", &e);
        }
    }
    if let Err(e) = validate_duration(&req.duration) {
        errors.add("duration", &e);
    }
    if let Some(ref status) = req.status {
        if let Err(e) = validate_job_status(status) {
            errors.add("status", &e);
        }
    }

    errors.finish()
}

/// Resolve the owning client's name for a job response
async fn client_ref(
    pool: &sqlx::SqlitePool,
    client_id: &str,
    with_email: bool,
) -> Result<ClientRef, ApiError> {
    let row: Option<(String, String)> =
        sqlx::query_as("SELECT name, email FROM users WHERE id = ?")
            .bind(client_id)
            .fetch_optional(pool)
            .await?;

    let (name, email) = row.unwrap_or_default();
    Ok(ClientRef {
        id: client_id.to_string(),
        name,
        email: if with_email { Some(email) } else { None },
    })
}

/// Count applications on a job
async fn applications_count(pool: &sqlx::SqlitePool, job_id: &str) -> Result<i64, ApiError> {
    let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM applications WHERE job_id = ?")
        .bind(job_id)
        .fetch_one(pool)
        .await?;
    Ok(count.0)
}

/// Build a list-item response for a job
async fn job_response(pool: &sqlx::SqlitePool, job: Job) -> Result<JobResponse, ApiError> {
    let client = client_ref(pool, &job.client_id, false).await?;
    let count = applications_count(pool, &job.id).await?;
    Ok(job.to_response(client, count))
}

/// Same as `job_response`, with the client's email included (admin views)
pub(super) async fn job_response_with_email(
    pool: &sqlx::SqlitePool,
    job: Job,
) -> Result<JobResponse, ApiError> {
    let client = client_ref(pool, &job.client_id, true).await?;
    let count = applications_count(pool, &job.id).await?;
    Ok(job.to_response(client, count))
}

/// Resolve a job's applications with each applicant's identity and profile
pub(super) async fn application_responses(
    pool: &sqlx::SqlitePool,
    job_id: &str,
) -> Result<Vec<ApplicationResponse>, ApiError> {
    let applications: Vec<Application> =
        sqlx::query_as("SELECT * FROM applications WHERE job_id = ? ORDER BY applied_at DESC")
            .bind(job_id)
            .fetch_all(pool)
            .await?;

    let mut results = Vec::new();
    for app in applications {
        let freelancer: Option<User> = sqlx::query_as("SELECT * FROM users WHERE id = ?")
            .bind(&app.freelancer_id)
            .fetch_optional(pool)
            .await?;

        if let Some(freelancer) = freelancer {
            let profile = freelancer.profile();
            results.push(ApplicationResponse {
                id: app.id,
                freelancer: FreelancerRef {
                    id: freelancer.id,
                    name: freelancer.name,
                    profile,
                },
                proposal: app.proposal,
                bid_amount: app.bid_amount,
                estimated_duration: app.estimated_duration,
                status: app.status,
                applied_at: app.applied_at,
            });
        }
    }

    Ok(results)
}

/// List jobs with filters and pagination
///
/// Query parameters:
/// - category, experience: exact-match filters
/// - budgetMin, budgetMax: range filter on the budget amount
/// - search: case-insensitive substring match on title, description, skills
/// - status: defaults to "open"
/// - page: 1-indexed page number (defaults to 1)
/// - limit: items per page (defaults to 10, max 100)
pub async fn list_jobs(
    State(state): State<Arc<AppState>>,
    Query(query): Query<JobListQuery>,
) -> Result<Json<Page<JobResponse>>, ApiError> {
    let page = query.page.unwrap_or(1).max(1);
    let limit = query.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
    let offset = (page - 1) * limit;

    // Build dynamic WHERE clause; the listing never exposes inactive jobs
    let mut conditions = vec!["is_active = 1".to_string()];
    let mut bindings: Vec<String> = Vec::new();

    conditions.push("status = ?".to_string());
    bindings.push(query.status.clone().unwrap_or_else(|| JobStatus::Open.to_string()));

    if let Some(category) = &query.category {
        conditions.push("category = ?".to_string());
        bindings.push(category.clone());
    }

    if let Some(experience) = &query.experience {
        conditions.push("experience = ?".to_string());
        bindings.push(experience.clone());
    }

    if let Some(min) = query.budget_min {
        conditions.push("budget_amount >= CAST(? AS REAL)".to_string());
        bindings.push(min.to_string());
    }

    if let Some(max) = query.budget_max {
        conditions.push("budget_amount <= CAST(? AS REAL)".to_string());
        bindings.push(max.to_string());
    }

    if let Some(search) = &query.search {
        if !search.trim().is_empty() {
            conditions.push(
                "(LOWER(title) LIKE ? OR LOWER(description) LIKE ? OR LOWER(COALESCE(skills, '')) LIKE ?)"
                    .to_string(),
            );
            let pattern = format!("%{}%", search.trim().to_lowercase());
            bindings.push(pattern.clone());
            bindings.push(pattern.clone());
            bindings.push(pattern);
        }
    }

    let where_clause = format!("WHERE {}", conditions.join(" AND "));

    let count_sql = format!("SELECT COUNT(*) FROM jobs {}", where_clause);
    let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql);
    for binding in &bindings {
        count_query = count_query.bind(binding);
    }
    let total = count_query.fetch_one(&state.db).await?;

    let sql = format!(
        "SELECT * FROM jobs {} ORDER BY created_at DESC LIMIT ? OFFSET ?",
        where_clause
    );
    let mut jobs_query = sqlx::query_as::<_, Job>(&sql);
    for binding in &bindings {
        jobs_query = jobs_query.bind(binding);
    }
    jobs_query = jobs_query.bind(limit).bind(offset);

    let jobs = jobs_query.fetch_all(&state.db).await?;

    let mut items = Vec::new();
    for job in jobs {
        items.push(job_response(&state.db, job).await?);
    }

    Ok(Json(Page {
        items,
        pagination: PageMeta::new(page, limit, total),
    }))
}

/// Get a single job with client and applicants resolved
pub async fn get_job(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<JobDetailResponse>, ApiError> {
    if let Err(e) = validate_uuid(&id, "job_id") {
        return Err(ApiError::validation_field("job_id", e));
    }

    let job: Job = sqlx::query_as("SELECT * FROM jobs WHERE id = ?")
        .bind(&id)
        .fetch_optional(&state.db)
        .await?
        .ok_or_else(|| ApiError::not_found("Job not found"))?;

    let client = client_ref(&state.db, &job.client_id, true).await?;
    let applications = application_responses(&state.db, &job.id).await?;

    Ok(Json(job.to_detail(client, applications)))
}

/// Create a job (clients and admins only)
pub async fn create_job(
    State(state): State<Arc<AppState>>,
    user: User,
    Json(req): Json<CreateJobRequest>,
) -> Result<(StatusCode, Json<JobResponse>), ApiError> {
    require_role(&user, &[Role::Client, Role::Admin])?;
    validate_create_request(&req)?;

    let id = Uuid::new_v4().to_string();
    let now = chrono::Utc::now().to_rfc3339();
    let skills_json = serialize_skills(&req.skills);

    sqlx::query(
        r#"
        INSERT INTO jobs (
            id, client_id, title, description, category, skills,
            budget_type, budget_amount, budget_min, budget_max,
            duration, experience, status, deadline, is_active, created_at, updated_at
        )
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, 'open', ?, 1, ?, ?)
        "#,
    )
    .bind(&id)
    .bind(&user.id)
    .bind(req.title.trim())
    .bind(req.description.trim())
    .bind(&req.category)
    .bind(&skills_json)
    .bind(&req.budget.budget_type)
    .bind(req.budget.amount)
    .bind(req.budget.min_amount)
    .bind(req.budget.max_amount)
    .bind(req.duration.as_deref().filter(|d| !d.is_empty()))
    .bind(&req.experience)
    .bind(&req.deadline)
    .bind(&now)
    .bind(&now)
    .execute(&state.db)
    .await?;

    tracing::info!(job_id = %id, client_id = %user.id, "Job created");

    let job: Job = sqlx::query_as("SELECT * FROM jobs WHERE id = ?")
        .bind(&id)
        .fetch_one(&state.db)
        .await?;

    let response = job_response(&state.db, job).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// Update a job (owner or admin)
pub async fn update_job(
    State(state): State<Arc<AppState>>,
    user: User,
    Path(id): Path<String>,
    Json(req): Json<UpdateJobRequest>,
) -> Result<Json<JobResponse>, ApiError> {
    if let Err(e) = validate_uuid(&id, "job_id") {
        return Err(ApiError::validation_field("job_id", e));
    }
    validate_update_request(&req)?;

    let job: Job = sqlx::query_as("SELECT * FROM jobs WHERE id = ?")
        .bind(&id)
        .fetch_optional(&state.db)
        .await?
        .ok_or_else(|| ApiError::not_found("Job not found"))?;

    require_owner_or_admin(&user, &job.client_id)?;

    let skills_json = req.skills.as_ref().and_then(|s| serde_json::to_string(s).ok());
    let now = chrono::Utc::now().to_rfc3339();

    sqlx::query(
        r#"
        UPDATE jobs SET
            title = COALESCE(?, title),
            description = COALESCE(?, description),
            category = COALESCE(?, category),
            skills = COALESCE(?, skills),
            duration = COALESCE(?, duration),
            experience = COALESCE(?, experience),
            deadline = COALESCE(?, deadline),
            status = COALESCE(?, status),
            updated_at = ?
        WHERE id = ?
        "#,
    )
    .bind(req.title.as_deref().map(str::trim))
    .bind(req.description.as_deref().map(str::trim))
    .bind(&req.category)
    .bind(&skills_json)
    .bind(req.duration.as_deref().filter(|d| !d.is_empty()))
    .bind(&req.experience)
    .bind(&req.deadline)
    .bind(&req.status)
    .bind(&now)
    .bind(&id)
    .execute(&state.db)
    .await?;

    // A provided budget replaces the whole object, including unset bounds
    if let Some(budget) = &req.budget {
        sqlx::query(
            r#"
            UPDATE jobs SET
                budget_type = ?, budget_amount = ?, budget_min = ?, budget_max = ?
            WHERE id = ?
            "#,
        )
        .bind(&budget.budget_type)
        .bind(budget.amount)
        .bind(budget.min_amount)
        .bind(budget.max_amount)
        .bind(&id)
        .execute(&state.db)
        .await?;
    }

    let job: Job = sqlx::query_as("SELECT * FROM jobs WHERE id = ?")
        .bind(&id)
        .fetch_one(&state.db)
        .await?;

    let response = job_response(&state.db, job).await?;
    Ok(Json(response))
}

/// Delete a job (owner or admin); applications go with it
pub async fn delete_job(
    State(state): State<Arc<AppState>>,
    user: User,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    if let Err(e) = validate_uuid(&id, "job_id") {
        return Err(ApiError::validation_field("job_id", e));
    }

    let job: Job = sqlx::query_as("SELECT * FROM jobs WHERE id = ?")
        .bind(&id)
        .fetch_optional(&state.db)
        .await?
        .ok_or_else(|| ApiError::not_found("Job not found"))?;

    require_owner_or_admin(&user, &job.client_id)?;

    sqlx::query("DELETE FROM jobs WHERE id = ?")
        .bind(&id)
        .execute(&state.db)
        .await?;

    tracing::info!(job_id = %id, user_id = %user.id, "Job deleted");

    Ok(StatusCode::NO_CONTENT)
}

/// Validate an ApplyRequest
fn validate_apply_request(req: &ApplyRequest) -> Result<(), ApiError> {
    let mut errors = ValidationErrorBuilder::new();

    if let Err(e) = validate_proposal(&req.proposal) {
        errors.add("proposal", &e);
    }
    if let Err(e) = validate_bid_amount(req.bid_amount) {
        errors.add("bidAmount", &e);
    }
    if let Err(e) = validate_estimated_duration(&req.estimated_duration) {
        errors.add("estimatedDuration", &e);
    }

    errors.finish()
}

/// Apply for a job (freelancers only)
pub async fn apply_to_job(
    State(state): State<Arc<AppState>>,
    user: User,
    Path(id): Path<String>,
    Json(req): Json<ApplyRequest>,
) -> Result<(StatusCode, Json<MessageResponse>), ApiError> {
    require_role(&user, &[Role::Freelancer])?;

    if let Err(e) = validate_uuid(&id, "job_id") {
        return Err(ApiError::validation_field("job_id", e));
    }
    validate_apply_request(&req)?;

    let job: Job = sqlx::query_as("SELECT * FROM jobs WHERE id = ?")
        .bind(&id)
        .fetch_optional(&state.db)
        .await?
        .ok_or_else(|| ApiError::not_found("Job not found"))?;

    if job.status != JobStatus::Open.to_string() {
        return Err(ApiError::bad_request("Job is not open for applications"));
    }

    let existing: Option<(String,)> = sqlx::query_as(
        "SELECT id FROM applications WHERE job_id = ? AND freelancer_id = ?",
    )
    .bind(&id)
    .bind(&user.id)
    .fetch_optional(&state.db)
    .await?;

    if existing.is_some() {
        return Err(ApiError::bad_request("You have already applied for this job"));
    }

    let application_id = Uuid::new_v4().to_string();
    let now = chrono::Utc::now().to_rfc3339();

    sqlx::query(
        r#"
        INSERT INTO applications (id, job_id, freelancer_id, proposal, bid_amount, estimated_duration, status, applied_at)
        VALUES (?, ?, ?, ?, ?, ?, 'pending', ?)
        "#,
    )
    .bind(&application_id)
    .bind(&id)
    .bind(&user.id)
    .bind(req.proposal.trim())
    .bind(req.bid_amount)
    .bind(&req.estimated_duration)
    .bind(&now)
    .execute(&state.db)
    .await
    .map_err(|e| {
        // The unique index is the real guard; two racing applies both pass
        // the read above, but only one insert wins
        if e.to_string().contains("UNIQUE constraint failed") {
            ApiError::bad_request("You have already applied for this job")
        } else {
            ApiError::from(e)
        }
    })?;

    tracing::info!(job_id = %id, freelancer_id = %user.id, "Application submitted");

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse {
            message: "Application submitted successfully".to_string(),
        }),
    ))
}

/// Accept or reject an application (job owner or admin)
pub async fn decide_application(
    State(state): State<Arc<AppState>>,
    user: User,
    Path((id, application_id)): Path<(String, String)>,
    Json(req): Json<DecideApplicationRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    require_role(&user, &[Role::Client, Role::Admin])?;

    if let Err(e) = validate_uuid(&id, "job_id") {
        return Err(ApiError::validation_field("job_id", e));
    }
    if let Err(e) = validate_decision(&req.status) {
        return Err(ApiError::validation_field("status", e));
    }

    let job: Job = sqlx::query_as("SELECT * FROM jobs WHERE id = ?")
        .bind(&id)
        .fetch_optional(&state.db)
        .await?
        .ok_or_else(|| ApiError::not_found("Job not found"))?;

    require_owner_or_admin(&user, &job.client_id)?;

    let application: Application = sqlx::query_as(
        "SELECT * FROM applications WHERE id = ? AND job_id = ?",
    )
    .bind(&application_id)
    .bind(&id)
    .fetch_optional(&state.db)
    .await?
    .ok_or_else(|| ApiError::not_found("Application not found"))?;

    // The application update and the job transition must land together
    let mut tx = state.db.begin().await?;

    sqlx::query("UPDATE applications SET status = ? WHERE id = ?")
        .bind(&req.status)
        .bind(&application.id)
        .execute(&mut *tx)
        .await?;

    if req.status == ApplicationStatus::Accepted.to_string() {
        let now = chrono::Utc::now().to_rfc3339();
        sqlx::query(
            "UPDATE jobs SET status = 'in-progress', hired_freelancer_id = ?, updated_at = ? WHERE id = ?",
        )
        .bind(&application.freelancer_id)
        .bind(&now)
        .bind(&id)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;

    tracing::info!(
        job_id = %id,
        application_id = %application.id,
        decision = %req.status,
        "Application decided"
    );

    Ok(Json(MessageResponse {
        message: format!("Application {} successfully", req.status),
    }))
}
