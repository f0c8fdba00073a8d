//! Report endpoints: image intake, verification, submission, and the
//! recent-reports projection
//!
//! Locks on the session map are never held across a network or
//! database call: handlers read what they need, release the lock, do
//! the slow work, then re-acquire to record the outcome. The workflow
//! sequence number decides whether a late reply still applies.

use axum::{
    extract::{Query, State},
    routing::{get, post},
    Json, Router,
};
use greenloop_common::models::Report;
use greenloop_common::VerificationResult;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::workflow::{AttachedImage, VerificationStatus, WorkflowError};
use crate::{db, intake, ApiError, ApiResult, AppState};

/// Display projection of a persisted report: timestamp rendered as a
/// plain date string
#[derive(Debug, Serialize)]
pub struct ReportView {
    pub id: i64,
    pub location: String,
    pub waste_type: String,
    pub amount: String,
    pub created_at: String,
}

impl From<&Report> for ReportView {
    fn from(report: &Report) -> Self {
        ReportView {
            id: report.id,
            location: report.location.clone(),
            waste_type: report.waste_type.clone(),
            amount: report.amount.clone(),
            created_at: report.created_at.format("%Y-%m-%d").to_string(),
        }
    }
}

fn workflow_error(err: WorkflowError) -> ApiError {
    match err {
        WorkflowError::NoImage => ApiError::BadRequest(err.to_string()),
        WorkflowError::VerificationInFlight
        | WorkflowError::NotVerified
        | WorkflowError::SubmissionInFlight => ApiError::Conflict(err.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Image intake
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct AttachImageRequest {
    pub session_id: Uuid,
    /// Base64 payload, with or without a data-URL prefix
    pub image: String,
    /// Declared MIME type; content sniffing fills in when absent
    pub mime_type: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AttachImageResponse {
    pub status: VerificationStatus,
    /// Data-URL preview for immediate display
    pub preview: String,
}

/// POST /api/report/image
///
/// Attach the selected waste image to the session's workflow.
/// Replacing the image discards the previous preview and any prior
/// verification result.
pub async fn attach_image(
    State(state): State<AppState>,
    Json(payload): Json<AttachImageRequest>,
) -> ApiResult<Json<AttachImageResponse>> {
    let bytes = intake::decode_base64(&payload.image)
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;
    if bytes.is_empty() {
        return Err(ApiError::BadRequest("Image payload is empty".to_string()));
    }

    // Data-URL header wins, then the declared type, then sniffing
    let mime_type = intake::data_url_mime(&payload.image)
        .map(String::from)
        .unwrap_or_else(|| intake::resolve_mime(&bytes, payload.mime_type.as_deref()));

    let image = AttachedImage {
        base64: intake::encode_base64(&bytes),
        preview: intake::to_data_url(&bytes, &mime_type),
        mime_type,
    };
    let preview = image.preview.clone();

    let mut sessions = state.sessions.write().await;
    let session = sessions
        .get_mut(&payload.session_id)
        .ok_or_else(|| ApiError::NotFound("Unknown session".to_string()))?;

    session.workflow.attach_image(image);

    Ok(Json(AttachImageResponse {
        status: session.workflow.status(),
        preview,
    }))
}

// ---------------------------------------------------------------------------
// Verification
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct VerifyRequest {
    pub session_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct VerifyResponse {
    pub status: VerificationStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<VerificationResult>,
    /// Failure diagnostics for the user notification
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// POST /api/report/verify
///
/// Run the classification service over the attached image and drive
/// the verification state machine. A failed verification is a normal
/// domain outcome (200 with status "failure"), not a transport error.
pub async fn verify_report(
    State(state): State<AppState>,
    Json(payload): Json<VerifyRequest>,
) -> ApiResult<Json<VerifyResponse>> {
    let classifier = state
        .classifier
        .clone()
        .ok_or_else(|| ApiError::Unavailable("Classification API key not configured".to_string()))?;

    // Start the attempt and copy the image out, then release the lock
    // for the duration of the remote call
    let (seq, image) = {
        let mut sessions = state.sessions.write().await;
        let session = sessions
            .get_mut(&payload.session_id)
            .ok_or_else(|| ApiError::NotFound("Unknown session".to_string()))?;

        let seq = session.workflow.begin_verification().map_err(workflow_error)?;
        let image = session
            .workflow
            .image()
            .cloned()
            .ok_or_else(|| ApiError::Internal("Workflow lost its image".to_string()))?;
        (seq, image)
    };

    let outcome = classifier.classify(&image.base64, &image.mime_type).await;

    let mut sessions = state.sessions.write().await;
    let session = sessions
        .get_mut(&payload.session_id)
        .ok_or_else(|| ApiError::NotFound("Unknown session".to_string()))?;

    match outcome {
        Ok(result) => {
            if !session.workflow.complete_verification(seq, result.clone()) {
                // Superseded by a newer attempt or image; report the
                // current state rather than the stale result
                warn!(seq = seq, "Discarding stale verification success");
                return Ok(Json(VerifyResponse {
                    status: session.workflow.status(),
                    result: session.workflow.result().cloned(),
                    error: None,
                }));
            }

            Ok(Json(VerifyResponse {
                status: session.workflow.status(),
                result: Some(result),
                error: None,
            }))
        }
        Err(e) => {
            warn!(error = %e, "Waste verification failed");
            session.workflow.fail_verification(seq);
            Ok(Json(VerifyResponse {
                status: session.workflow.status(),
                result: None,
                error: Some(e.to_string()),
            }))
        }
    }
}

// ---------------------------------------------------------------------------
// Submission
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct SubmitRequest {
    pub session_id: Uuid,
    /// Latest value of the (always editable) location field
    pub location: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SubmitResponse {
    pub report: ReportView,
    pub points_awarded: i64,
}

/// POST /api/report/submit
///
/// Persist the verified draft. Rejected with 409 unless verification
/// status is exactly "success"; a persistence failure leaves the
/// draft intact so the user can retry without re-verifying.
pub async fn submit_report(
    State(state): State<AppState>,
    Json(payload): Json<SubmitRequest>,
) -> ApiResult<Json<SubmitResponse>> {
    // Gate the submission and copy the draft out under the lock
    let (user_id, draft, preview, verification_json) = {
        let mut sessions = state.sessions.write().await;
        let session = sessions
            .get_mut(&payload.session_id)
            .ok_or_else(|| ApiError::NotFound("Unknown session".to_string()))?;

        if let Some(location) = payload.location.clone() {
            session.workflow.set_location(location);
        }

        session.workflow.begin_submission().map_err(workflow_error)?;

        let draft = session.workflow.draft().clone();
        let preview = session.workflow.image().map(|i| i.preview.clone());
        let verification_json = session
            .workflow
            .result()
            .map(serde_json::to_string)
            .transpose()
            .map_err(|e| ApiError::Internal(format!("Serialize verification: {}", e)))?;

        (session.user.id, draft, preview, verification_json)
    };

    let outcome = persist_report(&state, user_id, &draft, preview, verification_json).await;

    let mut sessions = state.sessions.write().await;
    let session = sessions
        .get_mut(&payload.session_id)
        .ok_or_else(|| ApiError::NotFound("Unknown session".to_string()))?;
    session.workflow.finish_submission(outcome.is_ok());

    match outcome {
        Ok(report) => {
            info!(report_id = report.id, user_id = user_id, "Report submitted");
            Ok(Json(SubmitResponse {
                report: ReportView::from(&report),
                points_awarded: db::rewards::POINTS_PER_REPORT,
            }))
        }
        Err(e) => {
            warn!(error = %e, "Report submission failed");
            Err(ApiError::Internal(
                "Failed to submit report. Please try again.".to_string(),
            ))
        }
    }
}

/// Persist the report and its reward grant in one transaction, so a
/// failure on either insert leaves no partial state behind and a
/// retry cannot duplicate the report.
async fn persist_report(
    state: &AppState,
    user_id: i64,
    draft: &crate::workflow::ReportDraft,
    preview: Option<String>,
    verification_json: Option<String>,
) -> greenloop_common::Result<Report> {
    let mut tx = state.db.begin().await?;

    let report = db::reports::create_report(
        &mut *tx,
        user_id,
        &draft.location,
        &draft.waste_type,
        &draft.amount,
        preview.as_deref(),
        verification_json.as_deref(),
    )
    .await?;

    db::rewards::award_points(
        &mut *tx,
        user_id,
        db::rewards::POINTS_PER_REPORT,
        "Waste report submitted",
    )
    .await?;

    tx.commit().await?;

    Ok(report)
}

// ---------------------------------------------------------------------------
// Recent reports
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct RecentQuery {
    pub limit: Option<i64>,
}

/// GET /api/reports/recent
///
/// Display projection of the most recent reports, newest first.
pub async fn recent_reports(
    State(state): State<AppState>,
    Query(query): Query<RecentQuery>,
) -> ApiResult<Json<Vec<ReportView>>> {
    let limit = query
        .limit
        .unwrap_or(db::reports::DEFAULT_RECENT_LIMIT)
        .clamp(1, 100);

    let reports = db::reports::get_recent_reports(&state.db, limit).await?;

    Ok(Json(reports.iter().map(ReportView::from).collect()))
}

/// Build report routes
pub fn report_routes() -> Router<AppState> {
    Router::new()
        .route("/api/report/image", post(attach_image))
        .route("/api/report/verify", post(verify_report))
        .route("/api/report/submit", post(submit_report))
        .route("/api/reports/recent", get(recent_reports))
}
