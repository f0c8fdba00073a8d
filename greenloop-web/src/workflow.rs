//! Report workflow state machine
//!
//! Holds the draft report being composed by one user: the attached
//! image, the verification state, and the submission guard. All
//! transitions are pure so they can be unit tested without a server,
//! database, or classifier.
//!
//! Verification states: `idle -> verifying -> {success, failure}`.
//! A fresh attempt moves `success`/`failure` back to `verifying`;
//! attaching a new image always resets to `idle` first.

use greenloop_common::VerificationResult;
use serde::Serialize;
use thiserror::Error;

/// Verification state of the draft report
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum VerificationStatus {
    #[default]
    Idle,
    Verifying,
    Success,
    Failure,
}

/// Draft report fields. `location` is user-editable at all times;
/// `waste_type` and `amount` are sourced solely from the latest
/// successful verification result.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ReportDraft {
    pub location: String,
    pub waste_type: String,
    pub amount: String,
}

/// The uploaded image in its two encoded forms
#[derive(Debug, Clone)]
pub struct AttachedImage {
    /// Bare base64 payload for transmission to the classifier
    pub base64: String,
    pub mime_type: String,
    /// Data-URL preview for display and report storage
    pub preview: String,
}

/// Workflow transition errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum WorkflowError {
    #[error("No image attached - upload a waste image first")]
    NoImage,

    #[error("A verification is already in progress")]
    VerificationInFlight,

    #[error("Please verify the waste before submitting")]
    NotVerified,

    #[error("A submission is already in progress")]
    SubmissionInFlight,
}

/// Per-user report workflow.
///
/// Each verification attempt is tagged with a monotonically
/// increasing sequence number; only the latest-issued sequence may
/// mutate state, so a superseded reply arriving late is discarded.
#[derive(Debug, Default)]
pub struct ReportWorkflow {
    draft: ReportDraft,
    image: Option<AttachedImage>,
    status: VerificationStatus,
    result: Option<VerificationResult>,
    next_seq: u64,
    latest_seq: Option<u64>,
    submitting: bool,
}

impl ReportWorkflow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self) -> VerificationStatus {
        self.status
    }

    pub fn draft(&self) -> &ReportDraft {
        &self.draft
    }

    pub fn image(&self) -> Option<&AttachedImage> {
        self.image.as_ref()
    }

    pub fn result(&self) -> Option<&VerificationResult> {
        self.result.as_ref()
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    /// Attach (or replace) the uploaded image. Discards any prior
    /// verification result and resets status to idle - a stale
    /// success would otherwise allow submitting mismatched data.
    /// Invalidates any verification still in flight.
    pub fn attach_image(&mut self, image: AttachedImage) {
        self.image = Some(image);
        self.status = VerificationStatus::Idle;
        self.result = None;
        self.latest_seq = None;
        self.draft.waste_type.clear();
        self.draft.amount.clear();
    }

    /// The location field is editable at all times, including after
    /// verification succeeds.
    pub fn set_location(&mut self, location: String) {
        self.draft.location = location;
    }

    /// Start a verification attempt. Returns the sequence number the
    /// caller must present when the classifier reply arrives.
    pub fn begin_verification(&mut self) -> Result<u64, WorkflowError> {
        if self.image.is_none() {
            return Err(WorkflowError::NoImage);
        }
        if self.status() == VerificationStatus::Verifying {
            return Err(WorkflowError::VerificationInFlight);
        }

        let seq = self.next_seq;
        self.next_seq += 1;
        self.latest_seq = Some(seq);
        self.status = VerificationStatus::Verifying;
        Ok(seq)
    }

    /// Record a successful classifier reply. Returns false (and
    /// changes nothing) when `seq` is not the latest issued.
    pub fn complete_verification(&mut self, seq: u64, result: VerificationResult) -> bool {
        if self.latest_seq != Some(seq) {
            return false;
        }

        self.draft.waste_type = result.waste_type.to_string();
        self.draft.amount = result.quantity.clone();
        self.result = Some(result);
        self.status = VerificationStatus::Success;
        true
    }

    /// Record a failed classifier reply. The draft is left unchanged
    /// from before the call. Returns false when `seq` is stale.
    pub fn fail_verification(&mut self, seq: u64) -> bool {
        if self.latest_seq != Some(seq) {
            return false;
        }

        self.status = VerificationStatus::Failure;
        true
    }

    /// Gate submission: verification must have succeeded and no other
    /// submission may be in flight. Sets the re-entrancy guard.
    pub fn begin_submission(&mut self) -> Result<(), WorkflowError> {
        if self.status() != VerificationStatus::Success {
            return Err(WorkflowError::NotVerified);
        }
        if self.submitting {
            return Err(WorkflowError::SubmissionInFlight);
        }

        self.submitting = true;
        Ok(())
    }

    /// Settle a submission. The guard clears on every exit path; an
    /// accepted submission resets the workflow to its initial state
    /// while a rejected one keeps the draft and verification result
    /// so the user can retry without re-verifying.
    pub fn finish_submission(&mut self, accepted: bool) {
        self.submitting = false;

        if accepted {
            self.draft = ReportDraft::default();
            self.image = None;
            self.result = None;
            self.status = VerificationStatus::Idle;
            self.latest_seq = None;
        }
    }
}
