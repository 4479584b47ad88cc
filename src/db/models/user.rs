//! User, session, and account DTO models.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::common::parse_skills;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: String,
    pub is_verified: bool,
    pub profile_bio: Option<String>,
    /// JSON array of skill strings
    pub profile_skills: Option<String>,
    pub profile_hourly_rate: Option<f64>,
    pub created_at: String,
    pub updated_at: String,
}

impl User {
    pub fn profile(&self) -> Profile {
        Profile {
            bio: self.profile_bio.clone(),
            skills: parse_skills(self.profile_skills.as_deref()),
            hourly_rate: self.profile_hourly_rate,
        }
    }
}

/// Freelancer profile data nested under a user
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub bio: Option<String>,
    pub skills: Vec<String>,
    pub hourly_rate: Option<f64>,
}

/// Response DTO for User that excludes the password hash
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: String,
    pub is_verified: bool,
    pub profile: Profile,
    pub created_at: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        let profile = user.profile();
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            role: user.role,
            is_verified: user.is_verified,
            profile,
            created_at: user.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Session {
    pub id: String,
    pub user_id: String,
    pub token_hash: String,
    pub expires_at: String,
    pub created_at: String,
}

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: UserResponse,
}

/// Self-service profile update; absent fields are left unchanged
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    pub bio: Option<String>,
    pub skills: Option<Vec<String>>,
    pub hourly_rate: Option<f64>,
}

/// Admin moderation update; absent fields are left unchanged
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminUpdateUserRequest {
    pub role: Option<String>,
    pub is_verified: Option<bool>,
}

/// Query parameters for the admin user listing
#[derive(Debug, Clone, Deserialize, Default)]
pub struct UserListQuery {
    /// Filter by role
    pub role: Option<String>,
    /// Case-insensitive substring match on name or email
    pub search: Option<String>,
    /// Page number (1-indexed, defaults to 1)
    pub page: Option<i64>,
    /// Items per page (defaults to 10, max 100)
    pub limit: Option<i64>,
}
