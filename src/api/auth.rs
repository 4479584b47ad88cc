//! Account endpoints and the request authentication gate.
//!
//! Login issues an opaque random token; only its SHA-256 hash is stored.
//! Handlers receive the caller through the `User` extractor, which resolves
//! the bearer token to an account or rejects with 401. Role membership is
//! a separate check (`require_role`) that rejects with 403.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use axum::{
    async_trait,
    extract::{FromRequestParts, State},
    http::{request::Parts, StatusCode},
    Json,
};
use rand::Rng;
use sha2::{Digest, Sha256};
use std::sync::Arc;

use crate::db::{
    LoginRequest, LoginResponse, RegisterRequest, Role, Session, UpdateProfileRequest, User,
    UserResponse,
};
use crate::AppState;

use super::error::{ApiError, ValidationErrorBuilder};
use super::validation::{
    validate_email, validate_name, validate_password, validate_register_role,
};

/// Session lifetime in days
const SESSION_TTL_DAYS: i64 = 7;

/// Hash a password using Argon2
pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let hash = argon2.hash_password(password.as_bytes(), &salt)?;
    Ok(hash.to_string())
}

/// Verify a password against a hash
pub fn verify_password(password: &str, hash: &str) -> bool {
    let parsed_hash = match PasswordHash::new(hash) {
        Ok(h) => h,
        Err(_) => return false,
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok()
}

/// Generate a random token
fn generate_token() -> String {
    let mut rng = rand::rng();
    let bytes: [u8; 32] = rng.random();
    hex::encode(bytes)
}

/// Hash a token for storage
fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hex::encode(hasher.finalize())
}

/// Create a session for the user and return the bearer token
async fn create_session(pool: &sqlx::SqlitePool, user_id: &str) -> Result<String, ApiError> {
    let token = generate_token();
    let token_hash = hash_token(&token);

    let expires_at = chrono::Utc::now()
        .checked_add_signed(chrono::Duration::days(SESSION_TTL_DAYS))
        .ok_or_else(|| ApiError::internal("Failed to compute session expiry"))?
        .to_rfc3339();

    let session_id = uuid::Uuid::new_v4().to_string();
    sqlx::query(
        "INSERT INTO sessions (id, user_id, token_hash, expires_at) VALUES (?, ?, ?, ?)",
    )
    .bind(&session_id)
    .bind(user_id)
    .bind(&token_hash)
    .bind(&expires_at)
    .execute(pool)
    .await?;

    Ok(token)
}

fn validate_register_request(req: &RegisterRequest) -> Result<(), ApiError> {
    let mut errors = ValidationErrorBuilder::new();

    if let Err(e) = validate_name(&req.name) {
        errors.add("name", &e);
    }
    if let Err(e) = validate_email(&req.email) {
        errors.add("email", &e);
    }
    if let Err(e) = validate_password(&req.password) {
        errors.add("password", &e);
    }
    if let Err(e) = validate_register_role(&req.role) {
        errors.add("role", &e);
    }

    errors.finish()
}

/// Register a new client or freelancer account
pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<LoginResponse>), ApiError> {
    validate_register_request(&req)?;

    let existing: Option<(String,)> = sqlx::query_as("SELECT id FROM users WHERE email = ?")
        .bind(&req.email)
        .fetch_optional(&state.db)
        .await?;

    if existing.is_some() {
        return Err(ApiError::validation_field("email", "Email is already registered"));
    }

    let id = uuid::Uuid::new_v4().to_string();
    let password_hash = hash_password(&req.password)
        .map_err(|e| ApiError::internal(format!("Failed to hash password: {}", e)))?;
    let now = chrono::Utc::now().to_rfc3339();

    sqlx::query(
        r#"
        INSERT INTO users (id, name, email, password_hash, role, is_verified, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, 0, ?, ?)
        "#,
    )
    .bind(&id)
    .bind(&req.name)
    .bind(&req.email)
    .bind(&password_hash)
    .bind(&req.role)
    .bind(&now)
    .bind(&now)
    .execute(&state.db)
    .await
    .map_err(|e| {
        // Two concurrent registrations can race past the pre-check
        if e.to_string().contains("UNIQUE constraint failed") {
            ApiError::validation_field("email", "Email is already registered")
        } else {
            ApiError::from(e)
        }
    })?;

    tracing::info!(email = %req.email, role = %req.role, "Account registered");

    let user: User = sqlx::query_as("SELECT * FROM users WHERE id = ?")
        .bind(&id)
        .fetch_one(&state.db)
        .await?;

    let token = create_session(&state.db, &user.id).await?;

    Ok((
        StatusCode::CREATED,
        Json(LoginResponse {
            token,
            user: UserResponse::from(user),
        }),
    ))
}

/// Login endpoint
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let user: Option<User> = sqlx::query_as("SELECT * FROM users WHERE email = ?")
        .bind(&req.email)
        .fetch_optional(&state.db)
        .await?;

    // Same message for unknown email and wrong password
    let user = user.ok_or_else(|| ApiError::unauthorized("Invalid credentials"))?;

    if !verify_password(&req.password, &user.password_hash) {
        return Err(ApiError::unauthorized("Invalid credentials"));
    }

    let token = create_session(&state.db, &user.id).await?;

    Ok(Json(LoginResponse {
        token,
        user: UserResponse::from(user),
    }))
}

/// Current authenticated account
pub async fn me(user: User) -> Json<UserResponse> {
    Json(UserResponse::from(user))
}

/// Self-service profile update
pub async fn update_profile(
    State(state): State<Arc<AppState>>,
    user: User,
    Json(req): Json<UpdateProfileRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    let skills_json = req.skills.as_ref().and_then(|s| serde_json::to_string(s).ok());
    let now = chrono::Utc::now().to_rfc3339();

    sqlx::query(
        r#"
        UPDATE users SET
            profile_bio = COALESCE(?, profile_bio),
            profile_skills = COALESCE(?, profile_skills),
            profile_hourly_rate = COALESCE(?, profile_hourly_rate),
            updated_at = ?
        WHERE id = ?
        "#,
    )
    .bind(&req.bio)
    .bind(&skills_json)
    .bind(req.hourly_rate)
    .bind(&now)
    .bind(&user.id)
    .execute(&state.db)
    .await?;

    let updated: User = sqlx::query_as("SELECT * FROM users WHERE id = ?")
        .bind(&user.id)
        .fetch_one(&state.db)
        .await?;

    Ok(Json(UserResponse::from(updated)))
}

/// Extract the bearer token from request headers
fn extract_token(headers: &axum::http::HeaderMap) -> Option<String> {
    headers
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(|s| s.to_string())
}

/// Resolve a bearer token to the account it belongs to
pub async fn get_current_user(pool: &sqlx::SqlitePool, token: &str) -> Result<User, ApiError> {
    let token_hash = hash_token(token);
    let session: Option<Session> = sqlx::query_as(
        "SELECT * FROM sessions WHERE token_hash = ? AND expires_at > ?",
    )
    .bind(&token_hash)
    .bind(chrono::Utc::now().to_rfc3339())
    .fetch_optional(pool)
    .await?;

    let session = session.ok_or_else(|| ApiError::unauthorized("Invalid or expired token"))?;

    let user: Option<User> = sqlx::query_as("SELECT * FROM users WHERE id = ?")
        .bind(&session.user_id)
        .fetch_optional(pool)
        .await?;

    user.ok_or_else(|| ApiError::unauthorized("Invalid or expired token"))
}

/// Extractor for the current authenticated user; rejects with 401
#[async_trait]
impl FromRequestParts<Arc<AppState>> for User {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let token = extract_token(&parts.headers)
            .ok_or_else(|| ApiError::unauthorized("Authentication required"))?;
        get_current_user(&state.db, &token).await
    }
}

/// Fail with 403 unless the user's role is in the allowed set
pub fn require_role(user: &User, allowed: &[Role]) -> Result<(), ApiError> {
    let role: Role = user
        .role
        .parse()
        .map_err(|_| ApiError::forbidden("Access denied"))?;

    if allowed.contains(&role) {
        Ok(())
    } else {
        Err(ApiError::forbidden("Access denied"))
    }
}

/// The caller must own the job (be its client) or be an admin
pub fn require_owner_or_admin(user: &User, client_id: &str) -> Result<(), ApiError> {
    if user.id == client_id || user.role.parse::<Role>() == Ok(Role::Admin) {
        Ok(())
    } else {
        Err(ApiError::forbidden("Not authorized"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_hash_round_trip() {
        let hash = hash_password("hunter2secret").unwrap();
        assert!(verify_password("hunter2secret", &hash));
        assert!(!verify_password("hunter2wrong", &hash));
    }

    #[test]
    fn test_verify_rejects_garbage_hash() {
        assert!(!verify_password("anything", "not-a-phc-string"));
    }

    #[test]
    fn test_token_hash_is_stable_and_opaque() {
        let token = generate_token();
        assert_eq!(token.len(), 64);
        assert_eq!(hash_token(&token), hash_token(&token));
        assert_ne!(hash_token(&token), token);
    }

    fn test_user(id: &str, role: &str) -> User {
        User {
            id: id.to_string(),
            name: "Test".to_string(),
            email: format!("{}@example.com", id),
            password_hash: String::new(),
            role: role.to_string(),
            is_verified: false,
            profile_bio: None,
            profile_skills: None,
            profile_hourly_rate: None,
            created_at: String::new(),
            updated_at: String::new(),
        }
    }

    #[test]
    fn test_require_role() {
        let client = test_user("u1", "client");
        assert!(require_role(&client, &[Role::Client, Role::Admin]).is_ok());
        assert!(require_role(&client, &[Role::Freelancer]).is_err());
        assert!(require_role(&client, &[Role::Admin]).is_err());
    }

    #[test]
    fn test_require_owner_or_admin() {
        let owner = test_user("u1", "client");
        let other = test_user("u2", "client");
        let admin = test_user("u3", "admin");

        assert!(require_owner_or_admin(&owner, "u1").is_ok());
        assert!(require_owner_or_admin(&other, "u1").is_err());
        assert!(require_owner_or_admin(&admin, "u1").is_ok());
    }
}
