//! Render queue scheduler.
//!
//! The queue owns an ordered collection of job records and reconciles
//! them against the render backend in [`RenderQueue::tick`]: submit
//! records that hold a slot but have no backend handle, poll records
//! that do, and promote the oldest queued record whenever a slot frees.
//! Promotion never submits; the next tick's submission phase does,
//! keeping "decide to run" and "talk to the backend" separately
//! retryable.
//!
//! All state mutation happens through the public methods and `tick()`;
//! overlapping ticks are skipped, and per-record in-flight markers keep
//! a slow backend call from colliding with a later attempt on the same
//! record.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex as StdMutex, MutexGuard};

use futures_util::future::join_all;
use tokio::sync::{broadcast, Mutex};
use tracing::{debug, info, warn};

use vforge_models::{JobId, JobRecord, JobStatus, QueueSnapshot, RenderHandle, RenderRequest};
use vforge_render::{RenderBackend, RenderError, RenderState, RenderStatus};
use vforge_store::SnapshotStore;

use crate::config::QueueConfig;
use crate::error::{QueueError, QueueResult};
use crate::events::JobEvent;

const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Counters from one reconciliation tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickSummary {
    /// The tick found another tick in progress and did nothing
    pub skipped: bool,
    /// Jobs whose submission succeeded
    pub submitted: u32,
    /// Jobs that received a progress update
    pub polled: u32,
    /// Jobs that reached `Completed`
    pub completed: u32,
    /// Jobs that reached `Failed`
    pub failed: u32,
    /// Queued jobs promoted into a free slot
    pub promoted: u32,
}

impl TickSummary {
    fn skipped() -> Self {
        Self {
            skipped: true,
            ..Default::default()
        }
    }

    /// Whether the tick mutated any record.
    pub fn changed(&self) -> bool {
        self.submitted + self.polled + self.completed + self.failed + self.promoted > 0
    }
}

/// Per-status record counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QueueCounts {
    pub queued: usize,
    pub processing: usize,
    pub completed: usize,
    pub failed: usize,
}

impl QueueCounts {
    /// Records that still need reconciliation work.
    pub fn active(&self) -> usize {
        self.queued + self.processing
    }
}

#[derive(Default)]
struct QueueState {
    jobs: Vec<JobRecord>,
}

/// Client-resident render job queue.
///
/// Owns its records until the caller removes them; terminal records are
/// never evicted silently. Construct one per session with an injected
/// backend and snapshot store.
pub struct RenderQueue {
    backend: Arc<dyn RenderBackend>,
    store: Arc<dyn SnapshotStore>,
    config: QueueConfig,
    state: Mutex<QueueState>,
    tick_active: AtomicBool,
    submit_inflight: Arc<StdMutex<HashSet<JobId>>>,
    poll_inflight: Arc<StdMutex<HashSet<JobId>>>,
    events: broadcast::Sender<JobEvent>,
}

impl RenderQueue {
    /// Create an empty queue.
    pub fn new(
        backend: Arc<dyn RenderBackend>,
        store: Arc<dyn SnapshotStore>,
        config: QueueConfig,
    ) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            backend,
            store,
            config,
            state: Mutex::new(QueueState::default()),
            tick_active: AtomicBool::new(false),
            submit_inflight: Arc::new(StdMutex::new(HashSet::new())),
            poll_inflight: Arc::new(StdMutex::new(HashSet::new())),
            events,
        }
    }

    /// Create a queue from the last persisted snapshot.
    ///
    /// Processing records without a backend handle are demoted to
    /// queued: a submission whose outcome was never durably recorded is
    /// treated as not-yet-started. Records with a handle resume polling
    /// as-is.
    pub async fn restore(
        backend: Arc<dyn RenderBackend>,
        store: Arc<dyn SnapshotStore>,
        config: QueueConfig,
    ) -> Self {
        let queue = Self::new(backend, store, config);

        let loaded = match queue.store.load().await {
            Ok(loaded) => loaded,
            Err(e) => {
                warn!(error = %e, "Failed to load queue snapshot, starting empty");
                None
            }
        };

        if let Some(snapshot) = loaded {
            let mut jobs = snapshot.jobs;
            let mut demoted = 0usize;
            for job in &mut jobs {
                if job.awaiting_submission() {
                    job.demote_to_queued();
                    demoted += 1;
                }
            }
            info!(jobs = jobs.len(), demoted, "Restored queue snapshot");
            queue.state.lock().await.jobs = jobs;
        }

        queue
    }

    /// Queue configuration.
    pub fn config(&self) -> &QueueConfig {
        &self.config
    }

    /// Subscribe to job lifecycle events.
    pub fn subscribe(&self) -> broadcast::Receiver<JobEvent> {
        self.events.subscribe()
    }

    /// Add a job carrying a frozen request snapshot.
    ///
    /// The job starts processing immediately when a slot is free,
    /// otherwise it queues. Never talks to the backend; the next tick's
    /// submission phase does.
    pub async fn enqueue(&self, request: RenderRequest) -> JobId {
        let id = {
            let mut state = self.state.lock().await;
            let mut record = JobRecord::new(request);
            let id = record.id.clone();

            if Self::processing_count(&state) < self.config.max_concurrent {
                record.start_processing();
                self.emit(JobEvent::Started { job_id: id.clone() });
            } else {
                self.emit(JobEvent::Queued { job_id: id.clone() });
            }

            info!(
                job_id = %id,
                flow = record.request.flow_name(),
                status = %record.status,
                "Enqueued render job"
            );
            state.jobs.push(record);
            id
        };

        self.persist().await;
        id
    }

    /// Dismiss a record.
    ///
    /// Only queued and terminal records can be removed; a processing
    /// job must reach a terminal state first.
    pub async fn remove(&self, id: &JobId) -> QueueResult<()> {
        {
            let mut state = self.state.lock().await;
            let Some(index) = state.jobs.iter().position(|j| &j.id == id) else {
                return Err(QueueError::JobNotFound(id.clone()));
            };
            if state.jobs[index].status == JobStatus::Processing {
                return Err(QueueError::JobStillProcessing(id.clone()));
            }

            state.jobs.remove(index);
            info!(job_id = %id, "Removed render job");
            self.emit(JobEvent::Removed { job_id: id.clone() });
        }

        self.persist().await;
        Ok(())
    }

    /// Drop all completed and failed records. Returns how many were
    /// removed.
    pub async fn clear_completed(&self) -> usize {
        let removed = {
            let mut state = self.state.lock().await;
            let before = state.jobs.len();
            state.jobs.retain(|j| !j.is_terminal());
            before - state.jobs.len()
        };

        if removed > 0 {
            info!(removed, "Cleared finished render jobs");
            self.persist().await;
        }
        removed
    }

    /// Snapshot of a single record.
    pub async fn job(&self, id: &JobId) -> Option<JobRecord> {
        self.state
            .lock()
            .await
            .jobs
            .iter()
            .find(|j| &j.id == id)
            .cloned()
    }

    /// Snapshot of all records, in enqueue order.
    pub async fn jobs(&self) -> Vec<JobRecord> {
        self.state.lock().await.jobs.clone()
    }

    /// Per-status record counts.
    pub async fn counts(&self) -> QueueCounts {
        let state = self.state.lock().await;
        let mut counts = QueueCounts::default();
        for job in &state.jobs {
            match job.status {
                JobStatus::Queued => counts.queued += 1,
                JobStatus::Processing => counts.processing += 1,
                JobStatus::Completed => counts.completed += 1,
                JobStatus::Failed => counts.failed += 1,
            }
        }
        counts
    }

    /// One reconciliation pass: promote into free slots, submit
    /// unsubmitted processing records, poll the submitted ones.
    ///
    /// Faults are isolated per record; nothing propagates out of the
    /// tick. A tick that finds another tick in progress returns a
    /// skipped summary instead of overlapping it.
    pub async fn tick(&self) -> TickSummary {
        if self.tick_active.swap(true, Ordering::SeqCst) {
            debug!("Reconciliation tick already in progress, skipping");
            return TickSummary::skipped();
        }
        let _tick_guard = TickGuard(&self.tick_active);

        let mut summary = TickSummary::default();

        // Fill free slots first so a freshly restored queue makes
        // progress without waiting for a completion to trigger
        // promotion.
        {
            let mut state = self.state.lock().await;
            self.promote_queued(&mut state, &mut summary);
        }

        self.submit_pending(&mut summary).await;
        self.poll_active(&mut summary).await;

        if summary.changed() {
            self.persist().await;
        }
        summary
    }

    /// Submission phase: every processing record without a handle.
    async fn submit_pending(&self, summary: &mut TickSummary) {
        let candidates: Vec<(JobId, RenderRequest)> = {
            let state = self.state.lock().await;
            state
                .jobs
                .iter()
                .filter(|job| job.awaiting_submission())
                .map(|job| (job.id.clone(), job.request.clone()))
                .collect()
        };
        if candidates.is_empty() {
            return;
        }

        let calls = candidates.into_iter().filter_map(|(id, request)| {
            let guard = InflightGuard::acquire(&self.submit_inflight, &id)?;
            Some(async move {
                let _guard = guard;
                let result = match tokio::time::timeout(
                    self.config.call_timeout,
                    self.backend.submit(&request),
                )
                .await
                {
                    Ok(result) => result,
                    Err(_) => Err(RenderError::submission(format!(
                        "Submission timed out after {:?}",
                        self.config.call_timeout
                    ))),
                };
                (id, result)
            })
        });
        let outcomes = join_all(calls).await;

        let mut state = self.state.lock().await;
        for (id, outcome) in outcomes {
            match outcome {
                Ok(handle) => self.apply_submission(&mut state, summary, &id, handle),
                Err(e) => self.apply_failure(&mut state, summary, &id, e.to_string()),
            }
        }
    }

    /// Polling phase: every processing record with a handle.
    async fn poll_active(&self, summary: &mut TickSummary) {
        let candidates: Vec<(JobId, RenderHandle)> = {
            let state = self.state.lock().await;
            state
                .jobs
                .iter()
                .filter(|job| job.status == JobStatus::Processing)
                .filter_map(|job| job.backend_handle.clone().map(|h| (job.id.clone(), h)))
                .collect()
        };
        if candidates.is_empty() {
            return;
        }

        let calls = candidates.into_iter().filter_map(|(id, handle)| {
            let guard = InflightGuard::acquire(&self.poll_inflight, &id)?;
            Some(async move {
                let _guard = guard;
                let result = match tokio::time::timeout(
                    self.config.call_timeout,
                    self.backend.poll_status(&handle),
                )
                .await
                {
                    Ok(result) => result,
                    Err(_) => Err(RenderError::transient(format!(
                        "Poll timed out after {:?}",
                        self.config.call_timeout
                    ))),
                };
                (id, result)
            })
        });
        let outcomes = join_all(calls).await;

        let mut state = self.state.lock().await;
        for (id, outcome) in outcomes {
            match outcome {
                Ok(status) => self.apply_poll(&mut state, summary, &id, status),
                Err(e) if e.is_transient() => {
                    debug!(job_id = %id, error = %e, "Transient poll error, retrying next tick");
                }
                Err(e) => {
                    // The backend does not know the handle; retrying
                    // cannot recover this render.
                    self.apply_failure(&mut state, summary, &id, e.to_string());
                }
            }
        }
    }

    fn apply_submission(
        &self,
        state: &mut QueueState,
        summary: &mut TickSummary,
        id: &JobId,
        handle: RenderHandle,
    ) {
        let Some(job) = Self::processing_job_mut(state, id) else {
            warn!(job_id = %id, "Submission result for inactive job, ignoring");
            return;
        };

        if job.assign_handle(handle.clone()) {
            info!(job_id = %id, handle = %handle, "Render job submitted");
            summary.submitted += 1;
            self.emit(JobEvent::Submitted {
                job_id: id.clone(),
                handle,
            });
        } else {
            warn!(job_id = %id, "Handle already assigned, ignoring duplicate submission result");
        }
    }

    fn apply_poll(
        &self,
        state: &mut QueueState,
        summary: &mut TickSummary,
        id: &JobId,
        status: RenderStatus,
    ) {
        match status.state {
            RenderState::Completed => match status.result_url {
                Some(url) => {
                    let Some(job) = Self::processing_job_mut(state, id) else {
                        return;
                    };
                    job.complete(url.clone());
                    info!(job_id = %id, result_url = %url, "Render job completed");
                    summary.completed += 1;
                    self.emit(JobEvent::Completed {
                        job_id: id.clone(),
                        result_url: url,
                    });
                    self.promote_queued(state, summary);
                }
                None => self.apply_failure(
                    state,
                    summary,
                    id,
                    "Backend reported completion without a result URL".to_string(),
                ),
            },
            RenderState::Failed => {
                let error = status
                    .error
                    .unwrap_or_else(|| "Render failed".to_string());
                self.apply_failure(state, summary, id, error);
            }
            RenderState::Queued | RenderState::Processing => {
                let Some(job) = Self::processing_job_mut(state, id) else {
                    return;
                };
                let before = job.progress;
                job.set_progress(status.progress);
                summary.polled += 1;
                if job.progress != before {
                    let progress = job.progress;
                    self.emit(JobEvent::Progress {
                        job_id: id.clone(),
                        progress,
                    });
                }
            }
        }
    }

    fn apply_failure(
        &self,
        state: &mut QueueState,
        summary: &mut TickSummary,
        id: &JobId,
        error: String,
    ) {
        let Some(job) = Self::processing_job_mut(state, id) else {
            warn!(job_id = %id, "Failure for inactive job, ignoring");
            return;
        };

        job.fail(error.clone());
        warn!(job_id = %id, error = %error, "Render job failed");
        summary.failed += 1;
        self.emit(JobEvent::Failed {
            job_id: id.clone(),
            error,
        });

        // The slot just freed
        self.promote_queued(state, summary);
    }

    /// Promote the oldest queued records into free slots, FIFO by
    /// creation time.
    fn promote_queued(&self, state: &mut QueueState, summary: &mut TickSummary) {
        while Self::processing_count(state) < self.config.max_concurrent {
            let Some(job) = state
                .jobs
                .iter_mut()
                .filter(|j| j.status == JobStatus::Queued)
                .min_by_key(|j| j.created_at)
            else {
                break;
            };

            job.start_processing();
            let job_id = job.id.clone();
            info!(job_id = %job_id, "Promoted queued render job");
            summary.promoted += 1;
            self.emit(JobEvent::Started { job_id });
        }
    }

    fn processing_count(state: &QueueState) -> usize {
        state
            .jobs
            .iter()
            .filter(|j| j.status == JobStatus::Processing)
            .count()
    }

    fn processing_job_mut<'a>(state: &'a mut QueueState, id: &JobId) -> Option<&'a mut JobRecord> {
        let job = state.jobs.iter_mut().find(|j| &j.id == id)?;
        if job.status == JobStatus::Processing {
            Some(job)
        } else {
            None
        }
    }

    /// Persist the current records, best-effort.
    async fn persist(&self) {
        let snapshot = {
            let state = self.state.lock().await;
            QueueSnapshot::new(state.jobs.clone())
        };
        if let Err(e) = self.store.save(&snapshot).await {
            warn!(error = %e, "Failed to persist queue snapshot");
        }
    }

    fn emit(&self, event: JobEvent) {
        // Send fails only when nobody is subscribed
        let _ = self.events.send(event);
    }
}

/// Clears the tick re-entrancy flag when the tick ends, on any path.
struct TickGuard<'a>(&'a AtomicBool);

impl Drop for TickGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Per-record in-flight marker, held for the duration of one backend
/// call and removed on drop regardless of outcome.
struct InflightGuard {
    set: Arc<StdMutex<HashSet<JobId>>>,
    id: JobId,
}

impl InflightGuard {
    /// Acquire the marker; `None` when a call for this record is
    /// already in flight.
    fn acquire(set: &Arc<StdMutex<HashSet<JobId>>>, id: &JobId) -> Option<Self> {
        if lock_set(set).insert(id.clone()) {
            Some(Self {
                set: Arc::clone(set),
                id: id.clone(),
            })
        } else {
            None
        }
    }
}

impl Drop for InflightGuard {
    fn drop(&mut self) {
        lock_set(&self.set).remove(&self.id);
    }
}

fn lock_set(set: &StdMutex<HashSet<JobId>>) -> MutexGuard<'_, HashSet<JobId>> {
    match set.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use vforge_models::{AspectRatio, AssetKind, AudioTrack, VisualAsset};
    use vforge_render::RenderResult;
    use vforge_store::MemoryStore;

    struct NoopBackend;

    #[async_trait]
    impl RenderBackend for NoopBackend {
        async fn submit(&self, _request: &RenderRequest) -> RenderResult<RenderHandle> {
            Ok(RenderHandle::from_string("noop"))
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

    fn request() -> RenderRequest {
        RenderRequest::SingleAsset {
            asset: VisualAsset {
                id: "asset-1".into(),
                url: "https://assets.example.com/a.png".into(),
                kind: AssetKind::Image,
            },
            voiceover: AudioTrack {
                url: "https://assets.example.com/vo.mp3".into(),
                duration_secs: 15.0,
            },
            captions: Vec::new(),
            overlays: Vec::new(),
            aspect: AspectRatio::Vertical,
        }
    }

    fn queue(max_concurrent: usize) -> RenderQueue {
        RenderQueue::new(
            Arc::new(NoopBackend),
            Arc::new(MemoryStore::new()),
            QueueConfig {
                max_concurrent,
                ..Default::default()
            },
        )
    }

    #[tokio::test]
    async fn test_enqueue_respects_concurrency_cap() {
        let queue = queue(2);

        let a = queue.enqueue(request()).await;
        let b = queue.enqueue(request()).await;
        let c = queue.enqueue(request()).await;

        assert_eq!(queue.job(&a).await.unwrap().status, JobStatus::Processing);
        assert_eq!(queue.job(&b).await.unwrap().status, JobStatus::Processing);
        assert_eq!(queue.job(&c).await.unwrap().status, JobStatus::Queued);

        let counts = queue.counts().await;
        assert_eq!(counts.processing, 2);
        assert_eq!(counts.queued, 1);
    }

    #[tokio::test]
    async fn test_remove_rejects_processing_job() {
        let queue = queue(1);

        let a = queue.enqueue(request()).await;
        let b = queue.enqueue(request()).await;

        assert_eq!(
            queue.remove(&a).await.unwrap_err(),
            QueueError::JobStillProcessing(a.clone())
        );

        // Queued jobs can be dismissed
        queue.remove(&b).await.unwrap();
        assert!(queue.job(&b).await.is_none());

        let unknown = JobId::new();
        assert_eq!(
            queue.remove(&unknown).await.unwrap_err(),
            QueueError::JobNotFound(unknown)
        );
    }

    #[tokio::test]
    async fn test_clear_completed_keeps_active_jobs() {
        let queue = queue(2);

        let a = queue.enqueue(request()).await;
        let b = queue.enqueue(request()).await;

        {
            let mut state = queue.state.lock().await;
            let job = state.jobs.iter_mut().find(|j| j.id == b).unwrap();
            job.fail("backend rejected payload");
        }

        assert_eq!(queue.clear_completed().await, 1);
        assert!(queue.job(&a).await.is_some());
        assert!(queue.job(&b).await.is_none());

        // Nothing terminal left
        assert_eq!(queue.clear_completed().await, 0);
    }

    #[tokio::test]
    async fn test_enqueue_persists_snapshot() {
        let store = Arc::new(MemoryStore::new());
        let queue = RenderQueue::new(Arc::new(NoopBackend), store.clone(), QueueConfig::default());

        queue.enqueue(request()).await;
        assert_eq!(store.job_count(), Some(1));
    }
}
