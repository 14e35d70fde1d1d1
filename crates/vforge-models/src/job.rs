//! Render job records and lifecycle states.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::request::RenderRequest;

/// Unique identifier for a render job.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct JobId(pub String);

impl JobId {
    /// Generate a new random job ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Create from an existing string.
    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Get the inner string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Opaque token returned by the render backend when it accepts a job.
///
/// Used for all subsequent status polling. Assigned to a [`JobRecord`]
/// at most once.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct RenderHandle(pub String);

impl RenderHandle {
    /// Create from a backend-supplied identifier.
    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Get the inner string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RenderHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle state of a render job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    /// Waiting for a concurrency slot
    #[default]
    Queued,
    /// Holds a slot; submitted to the backend or about to be
    Processing,
    /// Render finished, result URL available
    Completed,
    /// Submission or render failed
    Failed,
}

impl JobStatus {
    /// Get string representation of the status.
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Queued => "queued",
            JobStatus::Processing => "processing",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
        }
    }

    /// Check if this is a terminal state (no more updates expected).
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A render job owned by the queue.
///
/// The business payload (`request`) is frozen at enqueue time; the queue
/// mutates only the lifecycle fields.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct JobRecord {
    /// Unique job ID, assigned at enqueue
    pub id: JobId,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last lifecycle mutation timestamp
    pub updated_at: DateTime<Utc>,

    /// Current lifecycle state
    pub status: JobStatus,

    /// Render progress (0-100), non-decreasing while processing
    #[serde(default)]
    pub progress: u8,

    /// Backend handle; absent until submission succeeds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backend_handle: Option<RenderHandle>,

    /// Result URL, set only on completion
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result_url: Option<String>,

    /// Error message, set only on failure
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,

    /// Frozen render request snapshot
    pub request: RenderRequest,
}

impl JobRecord {
    /// Create a new queued record wrapping a frozen request snapshot.
    pub fn new(request: RenderRequest) -> Self {
        let now = Utc::now();
        Self {
            id: JobId::new(),
            created_at: now,
            updated_at: now,
            status: JobStatus::Queued,
            progress: 0,
            backend_handle: None,
            result_url: None,
            error_message: None,
            request,
        }
    }

    /// Check if the job is in a terminal state.
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Check if the job holds a slot but has not been submitted yet.
    pub fn awaiting_submission(&self) -> bool {
        self.status == JobStatus::Processing && self.backend_handle.is_none()
    }

    /// Check if the job holds a slot and has a backend handle to poll.
    pub fn pollable(&self) -> bool {
        self.status == JobStatus::Processing && self.backend_handle.is_some()
    }

    /// Move the job into the processing state (slot acquired).
    pub fn start_processing(&mut self) {
        self.status = JobStatus::Processing;
        self.updated_at = Utc::now();
    }

    /// Record the backend handle after a successful submission.
    ///
    /// Returns `false` without overwriting if a handle is already present;
    /// a handle is assigned at most once per record.
    pub fn assign_handle(&mut self, handle: RenderHandle) -> bool {
        if self.backend_handle.is_some() {
            return false;
        }
        self.backend_handle = Some(handle);
        self.updated_at = Utc::now();
        true
    }

    /// Update progress. Backend values never lower the recorded progress.
    pub fn set_progress(&mut self, progress: u8) {
        self.progress = self.progress.max(progress.min(100));
        self.updated_at = Utc::now();
    }

    /// Mark the job as completed with its result URL.
    pub fn complete(&mut self, result_url: impl Into<String>) {
        self.status = JobStatus::Completed;
        self.progress = 100;
        self.result_url = Some(result_url.into());
        self.updated_at = Utc::now();
    }

    /// Mark the job as failed with an error message.
    pub fn fail(&mut self, error: impl Into<String>) {
        self.status = JobStatus::Failed;
        self.error_message = Some(error.into());
        self.updated_at = Utc::now();
    }

    /// Demote a processing record back to queued (restart recovery).
    ///
    /// Only meaningful for records without a backend handle: a submission
    /// whose outcome was never recorded is treated as not-yet-started.
    pub fn demote_to_queued(&mut self) {
        self.status = JobStatus::Queued;
        self.updated_at = Utc::now();
    }
}
