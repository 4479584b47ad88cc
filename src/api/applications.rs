//! Cross-job application views: a freelancer's own applications, the
//! applications on a client's jobs, and withdrawal.

use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;

use crate::db::{
    Application, ClientRef, Job, JobDetailResponse, MyApplicationEntry, OwnApplication, Role,
    User,
};
use crate::AppState;

use super::auth::require_role;
use super::error::{ApiError, MessageResponse};
use super::jobs::application_responses;
use super::validation::validate_uuid;

/// List the caller's applications across all jobs (freelancers only)
pub async fn my_applications(
    State(state): State<Arc<AppState>>,
    user: User,
) -> Result<Json<Vec<MyApplicationEntry>>, ApiError> {
    require_role(&user, &[Role::Freelancer])?;

    let applications: Vec<Application> = sqlx::query_as(
        "SELECT * FROM applications WHERE freelancer_id = ? ORDER BY applied_at DESC",
    )
    .bind(&user.id)
    .fetch_all(&state.db)
    .await?;

    let mut entries = Vec::new();
    for application in applications {
        let job: Option<Job> = sqlx::query_as("SELECT * FROM jobs WHERE id = ?")
            .bind(&application.job_id)
            .fetch_optional(&state.db)
            .await?;

        let Some(job) = job else {
            continue;
        };

        let client_name: Option<(String,)> = sqlx::query_as("SELECT name FROM users WHERE id = ?")
            .bind(&job.client_id)
            .fetch_optional(&state.db)
            .await?;

        entries.push(MyApplicationEntry {
            job_id: job.id,
            job_title: job.title,
            job_category: job.category,
            job_budget: crate::db::Budget {
                budget_type: job.budget_type,
                amount: job.budget_amount,
                min_amount: job.budget_min,
                max_amount: job.budget_max,
            },
            job_status: job.status,
            client_name: client_name.map(|c| c.0).unwrap_or_default(),
            application: OwnApplication::from(application),
        });
    }

    Ok(Json(entries))
}

/// List the caller's jobs with all applications resolved (clients only)
pub async fn my_jobs_applications(
    State(state): State<Arc<AppState>>,
    user: User,
) -> Result<Json<Vec<JobDetailResponse>>, ApiError> {
    require_role(&user, &[Role::Client])?;

    let jobs: Vec<Job> = sqlx::query_as(
        "SELECT * FROM jobs WHERE client_id = ? ORDER BY created_at DESC",
    )
    .bind(&user.id)
    .fetch_all(&state.db)
    .await?;

    let client = ClientRef {
        id: user.id.clone(),
        name: user.name.clone(),
        email: Some(user.email.clone()),
    };

    let mut results = Vec::new();
    for job in jobs {
        let applications = application_responses(&state.db, &job.id).await?;
        results.push(job.to_detail(client.clone(), applications));
    }

    Ok(Json(results))
}

/// Withdraw the caller's application from a job (freelancers only)
pub async fn withdraw_application(
    State(state): State<Arc<AppState>>,
    user: User,
    Path(job_id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    require_role(&user, &[Role::Freelancer])?;

    if let Err(e) = validate_uuid(&job_id, "job_id") {
        return Err(ApiError::validation_field("job_id", e));
    }

    let job: Option<(String,)> = sqlx::query_as("SELECT id FROM jobs WHERE id = ?")
        .bind(&job_id)
        .fetch_optional(&state.db)
        .await?;

    if job.is_none() {
        return Err(ApiError::not_found("Job not found"));
    }

    let result = sqlx::query(
        "DELETE FROM applications WHERE job_id = ? AND freelancer_id = ?",
    )
    .bind(&job_id)
    .bind(&user.id)
    .execute(&state.db)
    .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::not_found("Application not found"));
    }

    tracing::info!(job_id = %job_id, freelancer_id = %user.id, "Application withdrawn");

    Ok(Json(MessageResponse {
        message: "Application withdrawn successfully".to_string(),
    }))
}
