//! Community impact aggregates for the landing page

use axum::{extract::State, routing::get, Json, Router};
use greenloop_common::models::{CollectionTask, Reward};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::{db, ApiResult, AppState};

/// How many recent rows feed the aggregates
const SAMPLE_LIMIT: i64 = 100;

/// Estimated kg of CO2 offset per kg of waste collected
const CO2_PER_KG: f64 = 0.5;

/// Leading number in a task amount string ("2.5 kg" -> 2.5)
static LEADING_NUMBER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\d+(\.\d+)?").expect("leading number regex"));

#[derive(Debug, Serialize)]
pub struct ImpactResponse {
    /// Total kg across collection tasks, one decimal
    pub waste_collected: f64,
    pub reports_submitted: usize,
    /// Sum of all reward points
    pub tokens_earned: i64,
    /// Estimated kg CO2 offset, one decimal
    pub co2_offset: f64,
}

/// GET /api/impact
pub async fn impact(State(state): State<AppState>) -> ApiResult<Json<ImpactResponse>> {
    let reports = db::reports::get_recent_reports(&state.db, SAMPLE_LIMIT).await?;
    let rewards = db::rewards::get_all_rewards(&state.db).await?;
    let tasks = db::tasks::get_waste_collection_tasks(&state.db, SAMPLE_LIMIT).await?;

    Ok(Json(compute_impact(reports.len(), &rewards, &tasks)))
}

/// Pure aggregation over the fetched rows
fn compute_impact(
    reports_submitted: usize,
    rewards: &[Reward],
    tasks: &[CollectionTask],
) -> ImpactResponse {
    let waste_collected: f64 = tasks.iter().map(|t| leading_amount(&t.amount)).sum();
    let tokens_earned: i64 = rewards.iter().map(|r| r.points).sum();

    ImpactResponse {
        waste_collected: round1(waste_collected),
        reports_submitted,
        tokens_earned,
        co2_offset: round1(waste_collected * CO2_PER_KG),
    }
}

/// Parse the leading number out of an amount string; unparseable
/// amounts count as zero.
fn leading_amount(amount: &str) -> f64 {
    LEADING_NUMBER_RE
        .find(amount)
        .and_then(|m| m.as_str().parse::<f64>().ok())
        .unwrap_or(0.0)
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Build impact routes
pub fn impact_routes() -> Router<AppState> {
    Router::new().route("/api/impact", get(impact))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn task(amount: &str) -> CollectionTask {
        CollectionTask {
            id: 0,
            location: "somewhere".to_string(),
            waste_type: "plastic".to_string(),
            amount: amount.to_string(),
            status: "pending".to_string(),
            created_at: Utc::now(),
        }
    }

    fn reward(points: i64) -> Reward {
        Reward {
            id: 0,
            user_id: 1,
            points,
            reason: "test".to_string(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_leading_amount() {
        assert_eq!(leading_amount("2.5 kg"), 2.5);
        assert_eq!(leading_amount("3 kg"), 3.0);
        assert_eq!(leading_amount("approx 4.2 kg"), 4.2);
        assert_eq!(leading_amount("no number here"), 0.0);
        assert_eq!(leading_amount(""), 0.0);
    }

    #[test]
    fn test_compute_impact() {
        let tasks = vec![task("2.5 kg"), task("1.25 kg"), task("junk")];
        let rewards = vec![reward(10), reward(30)];

        let impact = compute_impact(7, &rewards, &tasks);

        assert_eq!(impact.waste_collected, 3.8); // 3.75 rounded to one decimal
        assert_eq!(impact.reports_submitted, 7);
        assert_eq!(impact.tokens_earned, 40);
        assert_eq!(impact.co2_offset, 1.9); // 3.75 * 0.5 rounded
    }

    #[test]
    fn test_compute_impact_empty() {
        let impact = compute_impact(0, &[], &[]);
        assert_eq!(impact.waste_collected, 0.0);
        assert_eq!(impact.tokens_earned, 0);
        assert_eq!(impact.co2_offset, 0.0);
    }
}
