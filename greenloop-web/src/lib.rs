//! greenloop-web - Waste Reporting & Rewards Web Service
//!
//! Serves the browser UI (HTML pages with inline JS) and the JSON API
//! behind it: session resolution, waste-image verification through the
//! external classification service, report submission with reward
//! points, and the impact aggregates for the landing page.

pub mod api;
pub mod db;
pub mod error;
pub mod intake;
pub mod services;
pub mod workflow;

pub use crate::error::{ApiError, ApiResult};

use axum::Router;
use chrono::{DateTime, Utc};
use greenloop_common::config::Config;
use greenloop_common::models::User;
use greenloop_common::{Error, Result};
use sqlx::SqlitePool;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::services::{PlacesClient, WasteClassifier};
use crate::workflow::ReportWorkflow;

/// One user's report-page session: the resolved user plus the draft
/// report workflow. Created by `POST /api/session` on page load;
/// the oldest session is evicted once the map reaches capacity.
#[derive(Debug)]
pub struct ReportSession {
    pub user: User,
    pub workflow: ReportWorkflow,
    pub opened_at: DateTime<Utc>,
}

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,
    /// Classification client; `None` when no API key is configured
    pub classifier: Option<Arc<WasteClassifier>>,
    /// Place search client; `None` when no API key is configured
    pub places: Option<Arc<PlacesClient>>,
    /// Active report sessions keyed by session id
    pub sessions: Arc<RwLock<HashMap<Uuid, ReportSession>>>,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    /// Build state from resolved configuration. A missing API key
    /// leaves the corresponding client unset and its feature
    /// degraded, not the whole service down.
    pub fn new(db: SqlitePool, config: &Config) -> Result<Self> {
        let classifier = config
            .classifier_api_key
            .clone()
            .map(WasteClassifier::new)
            .transpose()
            .map_err(|e| Error::Config(format!("classifier client: {}", e)))?
            .map(Arc::new);

        let places = config
            .places_api_key
            .clone()
            .map(PlacesClient::new)
            .transpose()
            .map_err(|e| Error::Config(format!("places client: {}", e)))?
            .map(Arc::new);

        Ok(Self {
            db,
            classifier,
            places,
            sessions: Arc::new(RwLock::new(HashMap::new())),
            startup_time: Utc::now(),
        })
    }

    /// Replace the classification client (test stubs)
    pub fn with_classifier(mut self, classifier: WasteClassifier) -> Self {
        self.classifier = Some(Arc::new(classifier));
        self
    }

    /// Replace the place search client (test stubs)
    pub fn with_places(mut self, places: PlacesClient) -> Self {
        self.places = Some(Arc::new(places));
        self
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        // UI routes (HTML pages)
        .merge(api::ui_routes())
        // API routes
        .merge(api::session_routes())
        .merge(api::report_routes())
        .merge(api::impact_routes())
        .merge(api::places_routes())
        .merge(api::health_routes())
        .with_state(state)
}
