//! Report database operations

use greenloop_common::models::Report;
use greenloop_common::Result;
use sqlx::{Row, SqliteExecutor, SqlitePool};

use super::parse_timestamp;

/// Default page size for the recent-reports projection
pub const DEFAULT_RECENT_LIMIT: i64 = 10;

/// Persist a new report. Takes any executor so the submission path
/// can run it inside the same transaction as the reward grant.
pub async fn create_report(
    executor: impl SqliteExecutor<'_>,
    user_id: i64,
    location: &str,
    waste_type: &str,
    amount: &str,
    image_url: Option<&str>,
    verification: Option<&str>,
) -> Result<Report> {
    let created_at = chrono::Utc::now();

    let result = sqlx::query(
        r#"
        INSERT INTO reports (user_id, location, waste_type, amount, image_url, verification, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(user_id)
    .bind(location)
    .bind(waste_type)
    .bind(amount)
    .bind(image_url)
    .bind(verification)
    .bind(created_at.to_rfc3339())
    .execute(executor)
    .await?;

    Ok(Report {
        id: result.last_insert_rowid(),
        user_id,
        location: location.to_string(),
        waste_type: waste_type.to_string(),
        amount: amount.to_string(),
        image_url: image_url.map(String::from),
        verification: verification.map(String::from),
        created_at,
    })
}

/// Fetch the most recent reports, newest first
pub async fn get_recent_reports(pool: &SqlitePool, limit: i64) -> Result<Vec<Report>> {
    let rows = sqlx::query(
        r#"
        SELECT id, user_id, location, waste_type, amount, image_url, verification, created_at
        FROM reports
        ORDER BY created_at DESC, id DESC
        LIMIT ?
        "#,
    )
    .bind(limit)
    .fetch_all(pool)
    .await?;

    rows.into_iter().map(report_from_row).collect()
}

fn report_from_row(row: sqlx::sqlite::SqliteRow) -> Result<Report> {
    let created_at: String = row.get("created_at");

    Ok(Report {
        id: row.get("id"),
        user_id: row.get("user_id"),
        location: row.get("location"),
        waste_type: row.get("waste_type"),
        amount: row.get("amount"),
        image_url: row.get("image_url"),
        verification: row.get("verification"),
        created_at: parse_timestamp(&created_at, "created_at")?,
    })
}
