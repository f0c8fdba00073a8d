//! Reward points database operations

use greenloop_common::models::Reward;
use greenloop_common::Result;
use sqlx::{Row, SqliteExecutor, SqlitePool};

use super::parse_timestamp;

/// Points granted for each accepted waste report
pub const POINTS_PER_REPORT: i64 = 10;

/// Grant points to a user. Takes any executor so the submission path
/// can run it inside the same transaction as the report insert.
pub async fn award_points(
    executor: impl SqliteExecutor<'_>,
    user_id: i64,
    points: i64,
    reason: &str,
) -> Result<Reward> {
    let created_at = chrono::Utc::now();

    let result = sqlx::query(
        "INSERT INTO rewards (user_id, points, reason, created_at) VALUES (?, ?, ?, ?)",
    )
    .bind(user_id)
    .bind(points)
    .bind(reason)
    .bind(created_at.to_rfc3339())
    .execute(executor)
    .await?;

    tracing::info!(user_id = user_id, points = points, "Awarded reward points");

    Ok(Reward {
        id: result.last_insert_rowid(),
        user_id,
        points,
        reason: reason.to_string(),
        created_at,
    })
}

/// Fetch all rewards (the impact aggregation sums their points)
pub async fn get_all_rewards(pool: &SqlitePool) -> Result<Vec<Reward>> {
    let rows = sqlx::query(
        "SELECT id, user_id, points, reason, created_at FROM rewards ORDER BY created_at DESC",
    )
    .fetch_all(pool)
    .await?;

    rows.into_iter()
        .map(|row| {
            let created_at: String = row.get("created_at");
            Ok(Reward {
                id: row.get("id"),
                user_id: row.get("user_id"),
                points: row.get("points"),
                reason: row.get("reason"),
                created_at: parse_timestamp(&created_at, "created_at")?,
            })
        })
        .collect()
}
