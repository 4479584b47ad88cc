mod admin;
mod applications;
pub mod auth;
pub mod error;
mod jobs;
mod validation;

use axum::{
    routing::{delete, get, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    // Account routes; register/login are public, the rest authenticate
    // through the User extractor
    let auth_routes = Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/me", get(auth::me))
        .route("/profile", put(auth::update_profile));

    // Job routes; listing and detail are public
    let job_routes = Router::new()
        .route("/", get(jobs::list_jobs).post(jobs::create_job))
        .route(
            "/:id",
            get(jobs::get_job).put(jobs::update_job).delete(jobs::delete_job),
        )
        .route("/:id/apply", post(jobs::apply_to_job))
        .route(
            "/:id/applications/:application_id",
            put(jobs::decide_application),
        );

    let application_routes = Router::new()
        .route("/my-applications", get(applications::my_applications))
        .route(
            "/my-jobs-applications",
            get(applications::my_jobs_applications),
        )
        .route("/withdraw/:job_id", delete(applications::withdraw_application));

    let admin_routes = Router::new()
        .route("/dashboard", get(admin::dashboard))
        .route("/users", get(admin::list_users))
        .route(
            "/users/:id",
            put(admin::update_user).delete(admin::delete_user),
        )
        .route("/jobs", get(admin::list_jobs))
        .route(
            "/jobs/:id",
            put(admin::update_job_status).delete(admin::delete_job),
        );

    Router::new()
        .route("/health", get(health_check))
        .nest("/api/auth", auth_routes)
        .nest("/api/jobs", job_routes)
        .nest("/api/applications", application_routes)
        .nest("/api/admin", admin_routes)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_check() -> &'static str {
    "OK"
}
