//! Render backend contract.
//!
//! The queue is written against this seam; production wires in
//! [`crate::HttpRenderBackend`], tests wire in fakes.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use vforge_models::{RenderHandle, RenderRequest};

use crate::error::RenderResult;

/// Backend-reported lifecycle state of a submitted render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RenderState {
    /// Accepted, waiting for backend capacity
    Queued,
    /// Actively rendering
    Processing,
    /// Finished, result available
    Completed,
    /// Render failed
    Failed,
}

impl RenderState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, RenderState::Completed | RenderState::Failed)
    }
}

/// One poll's view of a submitted render.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderStatus {
    /// Current backend state
    pub state: RenderState,
    /// Render progress (0-100)
    #[serde(default)]
    pub progress: u8,
    /// Download URL, present once completed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result_url: Option<String>,
    /// Backend error text, present once failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// The remote render service as consumed by the queue.
#[async_trait]
pub trait RenderBackend: Send + Sync {
    /// Submit a render request. Returns the opaque handle used for all
    /// subsequent polling. Fails with [`crate::RenderError::Submission`]
    /// on a malformed payload or backend rejection.
    async fn submit(&self, request: &RenderRequest) -> RenderResult<RenderHandle>;

    /// Poll a submitted render. Fails with
    /// [`crate::RenderError::Transient`] on connectivity problems; the
    /// caller must not treat that as a job failure.
    async fn poll_status(&self, handle: &RenderHandle) -> RenderResult<RenderStatus>;
}
