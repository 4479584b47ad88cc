//! Database seeders for initial data.

use anyhow::Result;
use sqlx::SqlitePool;
use tracing::info;

use crate::api::auth::hash_password;

/// Ensure the default admin account exists (runs on every startup).
pub async fn ensure_admin_user(
    pool: &SqlitePool,
    email: &str,
    password: &str,
    name: &str,
) -> Result<()> {
    let existing: Option<(String,)> = sqlx::query_as("SELECT id FROM users WHERE email = ?")
        .bind(email)
        .fetch_optional(pool)
        .await?;

    if existing.is_some() {
        return Ok(());
    }

    let id = uuid::Uuid::new_v4().to_string();
    let password_hash = hash_password(password)
        .map_err(|e| anyhow::anyhow!("Failed to hash admin password: {}", e))?;
    let now = chrono::Utc::now().to_rfc3339();

    sqlx::query(
        r#"
        INSERT INTO users (id, name, email, password_hash, role, is_verified, created_at, updated_at)
        VALUES (?, ?, ?, ?, 'admin', 1, ?, ?)
        "#,
    )
    .bind(&id)
    .bind(name)
    .bind(email)
    .bind(&password_hash)
    .bind(&now)
    .bind(&now)
    .execute(pool)
    .await?;

    info!("Created default admin account: {}", email);
    Ok(())
}
