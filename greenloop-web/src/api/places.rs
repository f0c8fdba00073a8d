//! Place search proxy endpoint
//!
//! The location input on the report page queries this instead of
//! talking to the place-search service directly, keeping the API key
//! server-side.

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::{ApiError, ApiResult, AppState};

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub query: String,
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    /// Formatted address of the first candidate, if any
    pub address: Option<String>,
}

/// GET /api/places/search?query=...
pub async fn search_places(
    State(state): State<AppState>,
    Query(params): Query<SearchQuery>,
) -> ApiResult<Json<SearchResponse>> {
    let places = state
        .places
        .clone()
        .ok_or_else(|| ApiError::Unavailable("Places API key not configured".to_string()))?;

    let query = params.query.trim();
    if query.is_empty() {
        return Err(ApiError::BadRequest("Query must not be empty".to_string()));
    }

    let address = places
        .search(query)
        .await
        .map_err(|e| ApiError::Internal(format!("Place search failed: {}", e)))?;

    Ok(Json(SearchResponse { address }))
}

/// Build place search routes
pub fn places_routes() -> Router<AppState> {
    Router::new().route("/api/places/search", get(search_places))
}
