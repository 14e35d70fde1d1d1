//! Render backend error types.

use thiserror::Error;

pub type RenderResult<T> = Result<T, RenderError>;

#[derive(Debug, Error)]
pub enum RenderError {
    /// The backend rejected the job outright: malformed payload, auth
    /// failure, unknown handle. Fatal to the job.
    #[error("Submission rejected: {0}")]
    Submission(String),

    /// Connectivity or timeout failure. The job's state is unknown;
    /// the caller retries on the next reconciliation pass.
    #[error("Transient backend error: {0}")]
    Transient(String),
}

impl RenderError {
    pub fn submission(msg: impl Into<String>) -> Self {
        Self::Submission(msg.into())
    }

    pub fn transient(msg: impl Into<String>) -> Self {
        Self::Transient(msg.into())
    }

    /// Check if the error is recoverable by retrying later.
    pub fn is_transient(&self) -> bool {
        matches!(self, RenderError::Transient(_))
    }
}
