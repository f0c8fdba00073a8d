//! Session resolution endpoint
//!
//! The browser keeps the user's email in local storage; absence of
//! the email is the logged-out state and the page redirects to
//! `/login` before ever calling this endpoint. Given an email, the
//! resolver returns the existing user or creates one with a
//! placeholder name, and opens a fresh report workflow for the page.

use axum::{extract::State, routing::post, Json, Router};
use chrono::Utc;
use greenloop_common::models::User;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

use crate::workflow::ReportWorkflow;
use crate::{db, ApiError, ApiResult, AppState, ReportSession};

/// Hard cap on tracked sessions. There is no logout, so the map is
/// bounded by evicting the oldest session once the cap is reached;
/// an evicted draft simply requires a page reload.
const MAX_SESSIONS: usize = 1024;

#[derive(Debug, Deserialize)]
pub struct OpenSessionRequest {
    pub email: String,
}

#[derive(Debug, Serialize)]
pub struct OpenSessionResponse {
    pub session_id: Uuid,
    pub user: User,
}

/// POST /api/session
///
/// Resolve the acting user and open a report workflow. Each page
/// load gets a fresh workflow; drafts do not survive a reload.
pub async fn open_session(
    State(state): State<AppState>,
    Json(payload): Json<OpenSessionRequest>,
) -> ApiResult<Json<OpenSessionResponse>> {
    let email = payload.email.trim();
    if email.is_empty() {
        return Err(ApiError::BadRequest("Email must not be empty".to_string()));
    }

    let user = db::users::get_or_create_user(&state.db, email).await?;

    let session_id = Uuid::new_v4();
    {
        let mut sessions = state.sessions.write().await;
        evict_oldest_if_full(&mut sessions);
        sessions.insert(
            session_id,
            ReportSession {
                user: user.clone(),
                workflow: ReportWorkflow::new(),
                opened_at: Utc::now(),
            },
        );
    }

    tracing::debug!(user_id = user.id, %session_id, "Opened report session");

    Ok(Json(OpenSessionResponse { session_id, user }))
}

/// Drop the oldest sessions until the map is below capacity
fn evict_oldest_if_full(sessions: &mut HashMap<Uuid, ReportSession>) {
    while sessions.len() >= MAX_SESSIONS {
        let oldest = sessions
            .iter()
            .min_by_key(|(_, session)| session.opened_at)
            .map(|(id, _)| *id);

        match oldest {
            Some(id) => {
                tracing::warn!(%id, "Session map at capacity, evicting oldest session");
                sessions.remove(&id);
            }
            None => break,
        }
    }
}

/// Build session routes
pub fn session_routes() -> Router<AppState> {
    Router::new().route("/api/session", post(open_session))
}
