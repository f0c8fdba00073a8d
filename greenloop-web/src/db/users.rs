//! User database operations - the storage half of the session
//! resolver

use greenloop_common::models::User;
use greenloop_common::Result;
use sqlx::{Row, SqlitePool};

use super::parse_timestamp;

/// Display name assigned when a user record is created implicitly
/// from a stored email
pub const PLACEHOLDER_NAME: &str = "Anonymous User";

/// Look up a user by email
pub async fn get_user_by_email(pool: &SqlitePool, email: &str) -> Result<Option<User>> {
    let row = sqlx::query("SELECT id, email, name, created_at FROM users WHERE email = ?")
        .bind(email)
        .fetch_optional(pool)
        .await?;

    row.map(user_from_row).transpose()
}

/// Create a new user record
pub async fn create_user(pool: &SqlitePool, email: &str, name: &str) -> Result<User> {
    let created_at = chrono::Utc::now();

    let result = sqlx::query("INSERT INTO users (email, name, created_at) VALUES (?, ?, ?)")
        .bind(email)
        .bind(name)
        .bind(created_at.to_rfc3339())
        .execute(pool)
        .await?;

    Ok(User {
        id: result.last_insert_rowid(),
        email: email.to_string(),
        name: name.to_string(),
        created_at,
    })
}

/// Return the user for this email, creating one with a placeholder
/// name on first sight. Creates at most one record per missing
/// lookup.
pub async fn get_or_create_user(pool: &SqlitePool, email: &str) -> Result<User> {
    if let Some(user) = get_user_by_email(pool, email).await? {
        return Ok(user);
    }

    tracing::info!(email = email, "Creating user on first sight");
    create_user(pool, email, PLACEHOLDER_NAME).await
}

fn user_from_row(row: sqlx::sqlite::SqliteRow) -> Result<User> {
    let created_at: String = row.get("created_at");

    Ok(User {
        id: row.get("id"),
        email: row.get("email"),
        name: row.get("name"),
        created_at: parse_timestamp(&created_at, "created_at")?,
    })
}
