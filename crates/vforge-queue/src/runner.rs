//! Background reconciliation driver.
//!
//! The scheduler core is timer-free; this module drives it on a fixed
//! interval for production use. Tests call [`RenderQueue::tick`]
//! directly instead.

use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::scheduler::RenderQueue;

impl RenderQueue {
    /// Run the reconciliation loop until the token is cancelled.
    ///
    /// Ticks on `config.tick_interval`. A tick that would overlap a
    /// still-running one is skipped by the scheduler itself.
    pub async fn run(&self, cancel: CancellationToken) {
        let mut ticker = tokio::time::interval(self.config().tick_interval);
        info!(
            interval_ms = self.config().tick_interval.as_millis() as u64,
            max_concurrent = self.config().max_concurrent,
            "Render queue reconciliation started"
        );

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    info!("Render queue reconciliation shutting down");
                    break;
                }
                _ = ticker.tick() => {
                    let summary = self.tick().await;
                    if summary.changed() {
                        debug!(
                            submitted = summary.submitted,
                            polled = summary.polled,
                            completed = summary.completed,
                            failed = summary.failed,
                            promoted = summary.promoted,
                            "Reconciliation tick applied changes"
                        );
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::QueueConfig;
    use std::sync::Arc;
    use std::time::Duration;
    use vforge_store::MemoryStore;

    use async_trait::async_trait;
    use vforge_models::{RenderHandle, RenderRequest};
    use vforge_render::{RenderBackend, RenderResult, RenderState, RenderStatus};

    struct IdleBackend;

    #[async_trait]
    impl RenderBackend for IdleBackend {
        async fn submit(&self, _request: &RenderRequest) -> RenderResult<RenderHandle> {
            Ok(RenderHandle::from_string("h"))
        }

        async fn poll_status(&self, _handle: &RenderHandle) -> RenderResult<RenderStatus> {
            Ok(RenderStatus {
                state: RenderState::Processing,
                progress: 0,
                result_url: None,
                error: None,
            })
        }
    }

    #[tokio::test]
    async fn test_run_stops_on_cancellation() {
        let queue = Arc::new(RenderQueue::new(
            Arc::new(IdleBackend),
            Arc::new(MemoryStore::new()),
            QueueConfig {
                tick_interval: Duration::from_millis(5),
                ..Default::default()
            },
        ));

        let cancel = CancellationToken::new();
        let handle = {
            let queue = queue.clone();
            let cancel = cancel.clone();
            tokio::spawn(async move { queue.run(cancel).await })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        cancel.cancel();

        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("runner should stop after cancellation")
            .unwrap();
    }
}
