//! Job lifecycle events for observers.
//!
//! The queue publishes events over a broadcast channel so a UI can
//! follow progress without polling the record list. Delivery is
//! best-effort: a receiver that lags loses events, and the record list
//! remains the source of truth.

use vforge_models::{JobId, RenderHandle};

/// A job lifecycle notification.
#[derive(Debug, Clone, PartialEq)]
pub enum JobEvent {
    /// Job accepted but waiting for a slot
    Queued { job_id: JobId },
    /// Job holds a processing slot
    Started { job_id: JobId },
    /// Backend accepted the submission
    Submitted { job_id: JobId, handle: RenderHandle },
    /// Backend reported render progress
    Progress { job_id: JobId, progress: u8 },
    /// Render finished
    Completed { job_id: JobId, result_url: String },
    /// Submission or render failed
    Failed { job_id: JobId, error: String },
    /// Record dismissed by the caller
    Removed { job_id: JobId },
}

impl JobEvent {
    /// The job this event concerns.
    pub fn job_id(&self) -> &JobId {
        match self {
            JobEvent::Queued { job_id }
            | JobEvent::Started { job_id }
            | JobEvent::Submitted { job_id, .. }
            | JobEvent::Progress { job_id, .. }
            | JobEvent::Completed { job_id, .. }
            | JobEvent::Failed { job_id, .. }
            | JobEvent::Removed { job_id } => job_id,
        }
    }
}
