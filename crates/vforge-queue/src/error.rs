//! Queue error types.

use thiserror::Error;
use vforge_models::JobId;

pub type QueueResult<T> = Result<T, QueueError>;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum QueueError {
    #[error("Job not found: {0}")]
    JobNotFound(JobId),

    /// A processing job cannot be removed; it must reach a terminal
    /// state first.
    #[error("Job {0} is still processing and cannot be removed")]
    JobStillProcessing(JobId),
}
