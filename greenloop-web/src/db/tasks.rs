//! Waste collection task database operations

use greenloop_common::models::CollectionTask;
use greenloop_common::Result;
use sqlx::{Row, SqlitePool};

use super::parse_timestamp;

/// Fetch waste collection tasks, newest first
pub async fn get_waste_collection_tasks(
    pool: &SqlitePool,
    limit: i64,
) -> Result<Vec<CollectionTask>> {
    let rows = sqlx::query(
        r#"
        SELECT id, location, waste_type, amount, status, created_at
        FROM collection_tasks
        ORDER BY created_at DESC, id DESC
        LIMIT ?
        "#,
    )
    .bind(limit)
    .fetch_all(pool)
    .await?;

    rows.into_iter()
        .map(|row| {
            let created_at: String = row.get("created_at");
            Ok(CollectionTask {
                id: row.get("id"),
                location: row.get("location"),
                waste_type: row.get("waste_type"),
                amount: row.get("amount"),
                status: row.get("status"),
                created_at: parse_timestamp(&created_at, "created_at")?,
            })
        })
        .collect()
}
