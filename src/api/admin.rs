//! Admin moderation endpoints: dashboard aggregates plus user and job
//! moderation. Every handler requires the admin role.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use std::sync::Arc;

use crate::db::{
    AdminJobListQuery, AdminUpdateJobRequest, AdminUpdateUserRequest, Job, JobResponse, Page,
    PageMeta, Role, User, UserListQuery, UserResponse,
};
use crate::AppState;

use super::auth::require_role;
use super::error::{ApiError, ValidationErrorBuilder};
use super::jobs::job_response_with_email;
use super::validation::{validate_job_status, validate_role, validate_uuid};

const DEFAULT_LIMIT: i64 = 10;
const MAX_LIMIT: i64 = 100;

/// User count for one role
#[derive(Debug, Clone, Serialize)]
pub struct RoleCount {
    pub role: String,
    pub count: i64,
}

/// Job count for one category
#[derive(Debug, Clone, Serialize)]
pub struct CategoryCount {
    pub category: String,
    pub count: i64,
}

/// Marketplace-wide statistics for the admin dashboard
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_users: i64,
    pub total_jobs: i64,
    /// Jobs that are open and active
    pub active_jobs: i64,
    pub completed_jobs: i64,
    /// User counts grouped by role
    pub user_stats: Vec<RoleCount>,
    /// Job counts grouped by category
    pub job_stats: Vec<CategoryCount>,
}

/// Get dashboard statistics
/// GET /api/admin/dashboard
pub async fn dashboard(
    State(state): State<Arc<AppState>>,
    user: User,
) -> Result<Json<DashboardStats>, ApiError> {
    require_role(&user, &[Role::Admin])?;

    let total_users: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
        .fetch_one(&state.db)
        .await?;

    let total_jobs: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM jobs")
        .fetch_one(&state.db)
        .await?;

    let active_jobs: (i64,) = sqlx::query_as(
        "SELECT COUNT(*) FROM jobs WHERE status = 'open' AND is_active = 1",
    )
    .fetch_one(&state.db)
    .await?;

    let completed_jobs: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM jobs WHERE status = 'completed'")
        .fetch_one(&state.db)
        .await?;

    let user_stats: Vec<(String, i64)> =
        sqlx::query_as("SELECT role, COUNT(*) FROM users GROUP BY role ORDER BY role")
            .fetch_all(&state.db)
            .await?;

    let job_stats: Vec<(String, i64)> =
        sqlx::query_as("SELECT category, COUNT(*) FROM jobs GROUP BY category ORDER BY category")
            .fetch_all(&state.db)
            .await?;

    Ok(Json(DashboardStats {
        total_users: total_users.0,
        total_jobs: total_jobs.0,
        active_jobs: active_jobs.0,
        completed_jobs: completed_jobs.0,
        user_stats: user_stats
            .into_iter()
            .map(|(role, count)| RoleCount { role, count })
            .collect(),
        job_stats: job_stats
            .into_iter()
            .map(|(category, count)| CategoryCount { category, count })
            .collect(),
    }))
}

/// List users with filtering and pagination
pub async fn list_users(
    State(state): State<Arc<AppState>>,
    user: User,
    Query(query): Query<UserListQuery>,
) -> Result<Json<Page<UserResponse>>, ApiError> {
    require_role(&user, &[Role::Admin])?;

    let page = query.page.unwrap_or(1).max(1);
    let limit = query.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
    let offset = (page - 1) * limit;

    let mut conditions = Vec::new();
    let mut bindings: Vec<String> = Vec::new();

    if let Some(role) = &query.role {
        conditions.push("role = ?".to_string());
        bindings.push(role.clone());
    }

    if let Some(search) = &query.search {
        if !search.trim().is_empty() {
            conditions.push("(LOWER(name) LIKE ? OR LOWER(email) LIKE ?)".to_string());
            let pattern = format!("%{}%", search.trim().to_lowercase());
            bindings.push(pattern.clone());
            bindings.push(pattern);
        }
    }

    let where_clause = if conditions.is_empty() {
        String::new()
    } else {
        format!("WHERE {}", conditions.join(" AND "))
    };

    let count_sql = format!("SELECT COUNT(*) FROM users {}", where_clause);
    let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql);
    for binding in &bindings {
        count_query = count_query.bind(binding);
    }
    let total = count_query.fetch_one(&state.db).await?;

    let sql = format!(
        "SELECT * FROM users {} ORDER BY created_at DESC LIMIT ? OFFSET ?",
        where_clause
    );
    let mut users_query = sqlx::query_as::<_, User>(&sql);
    for binding in &bindings {
        users_query = users_query.bind(binding);
    }
    users_query = users_query.bind(limit).bind(offset);

    let users = users_query.fetch_all(&state.db).await?;

    Ok(Json(Page {
        items: users.into_iter().map(UserResponse::from).collect(),
        pagination: PageMeta::new(page, limit, total),
    }))
}

/// Update a user's role or verification flag
pub async fn update_user(
    State(state): State<Arc<AppState>>,
    user: User,
    Path(id): Path<String>,
    Json(req): Json<AdminUpdateUserRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    require_role(&user, &[Role::Admin])?;

    let mut errors = ValidationErrorBuilder::new();
    if let Err(e) = validate_uuid(&id, "user_id") {
        errors.add("user_id", e);
    }
    if let Some(ref role) = req.role {
        if let Err(e) = validate_role(role) {
            errors.add("role", e);
        }
    }
    errors.finish()?;

    let existing: Option<User> = sqlx::query_as("SELECT * FROM users WHERE id = ?")
        .bind(&id)
        .fetch_optional(&state.db)
        .await?;

    if existing.is_none() {
        return Err(ApiError::not_found("User not found"));
    }

    let now = chrono::Utc::now().to_rfc3339();

    sqlx::query(
        r#"
        UPDATE users SET
            role = COALESCE(?, role),
            is_verified = COALESCE(?, is_verified),
            updated_at = ?
        WHERE id = ?
        "#,
    )
    .bind(&req.role)
    .bind(req.is_verified)
    .bind(&now)
    .bind(&id)
    .execute(&state.db)
    .await?;

    let updated: User = sqlx::query_as("SELECT * FROM users WHERE id = ?")
        .bind(&id)
        .fetch_one(&state.db)
        .await?;

    tracing::info!(user_id = %id, admin_id = %user.id, "User updated by admin");

    Ok(Json(UserResponse::from(updated)))
}

/// Delete a user; their jobs go with them
pub async fn delete_user(
    State(state): State<Arc<AppState>>,
    user: User,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    require_role(&user, &[Role::Admin])?;

    if let Err(e) = validate_uuid(&id, "user_id") {
        return Err(ApiError::validation_field("user_id", e));
    }

    let existing: Option<(String,)> = sqlx::query_as("SELECT id FROM users WHERE id = ?")
        .bind(&id)
        .fetch_optional(&state.db)
        .await?;

    if existing.is_none() {
        return Err(ApiError::not_found("User not found"));
    }

    let mut tx = state.db.begin().await?;

    // The user's own postings are removed outright; application rows the
    // user made on other jobs fall to the foreign-key cascade
    sqlx::query("DELETE FROM jobs WHERE client_id = ?")
        .bind(&id)
        .execute(&mut *tx)
        .await?;

    sqlx::query("DELETE FROM users WHERE id = ?")
        .bind(&id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    tracing::info!(user_id = %id, admin_id = %user.id, "User deleted by admin");

    Ok(StatusCode::NO_CONTENT)
}

/// List all jobs regardless of owner or active flag
pub async fn list_jobs(
    State(state): State<Arc<AppState>>,
    user: User,
    Query(query): Query<AdminJobListQuery>,
) -> Result<Json<Page<JobResponse>>, ApiError> {
    require_role(&user, &[Role::Admin])?;

    let page = query.page.unwrap_or(1).max(1);
    let limit = query.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
    let offset = (page - 1) * limit;

    let mut conditions = Vec::new();
    let mut bindings: Vec<String> = Vec::new();

    if let Some(status) = &query.status {
        conditions.push("status = ?".to_string());
        bindings.push(status.clone());
    }

    if let Some(category) = &query.category {
        conditions.push("category = ?".to_string());
        bindings.push(category.clone());
    }

    let where_clause = if conditions.is_empty() {
        String::new()
    } else {
        format!("WHERE {}", conditions.join(" AND "))
    };

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
        items.push(job_response_with_email(&state.db, job).await?);
    }

    Ok(Json(Page {
        items,
        pagination: PageMeta::new(page, limit, total),
    }))
}

/// Update a job's status or active flag
pub async fn update_job_status(
    State(state): State<Arc<AppState>>,
    user: User,
    Path(id): Path<String>,
    Json(req): Json<AdminUpdateJobRequest>,
) -> Result<Json<JobResponse>, ApiError> {
    require_role(&user, &[Role::Admin])?;

    let mut errors = ValidationErrorBuilder::new();
    if let Err(e) = validate_uuid(&id, "job_id") {
        errors.add("job_id", e);
    }
    if let Some(ref status) = req.status {
        if let Err(e) = validate_job_status(status) {
            errors.add("status", e);
        }
    }
    errors.finish()?;

    let existing: Option<(String,)> = sqlx::query_as("SELECT id FROM jobs WHERE id = ?")
        .bind(&id)
        .fetch_optional(&state.db)
        .await?;

    if existing.is_none() {
        return Err(ApiError::not_found("Job not found"));
    }

    let now = chrono::Utc::now().to_rfc3339();

    sqlx::query(
        r#"
        UPDATE jobs SET
            status = COALESCE(?, status),
            is_active = COALESCE(?, is_active),
            updated_at = ?
        WHERE id = ?
        "#,
    )
    .bind(&req.status)
    .bind(req.is_active)
    .bind(&now)
    .bind(&id)
    .execute(&state.db)
    .await?;

    let job: Job = sqlx::query_as("SELECT * FROM jobs WHERE id = ?")
        .bind(&id)
        .fetch_one(&state.db)
        .await?;

    tracing::info!(job_id = %id, admin_id = %user.id, "Job updated by admin");

    let response = job_response_with_email(&state.db, job).await?;
    Ok(Json(response))
}

/// Delete any job
pub async fn delete_job(
    State(state): State<Arc<AppState>>,
    user: User,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    require_role(&user, &[Role::Admin])?;

    if let Err(e) = validate_uuid(&id, "job_id") {
        return Err(ApiError::validation_field("job_id", e));
    }

    let result = sqlx::query("DELETE FROM jobs WHERE id = ?")
        .bind(&id)
        .execute(&state.db)
        .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::not_found("Job not found"));
    }

    tracing::info!(job_id = %id, admin_id = %user.id, "Job deleted by admin");

    Ok(StatusCode::NO_CONTENT)
}
