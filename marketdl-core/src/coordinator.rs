//! Job coordinator — the client side of the request/progress protocol.
//!
//! Lifecycle per job: `Idle -> Requesting -> Streaming -> {Completed |
//! Failed} -> Idle`. The coordinator exclusively owns the subscription
//! receiver; dropping it is the unsubscribe, and every exit path drops it.
//!
//! The receiver is created before the engine sees the request, so the
//! subscription exists atomically with submission and a job that reports
//! 100% immediately still cannot slip an event past us.

use std::sync::mpsc::{self, Receiver, TryRecvError};

use tracing::{debug, info, warn};

use crate::domain::{JobEvent, JobId, JobPhase};
use crate::provider::{JobEngine, SubmitError};
use crate::request::DownloadRequest;

/// What `pump` surfaces to the caller for status display. Stale events
/// produce nothing.
#[derive(Debug, Clone, PartialEq)]
pub enum CoordinatorEvent {
    Progress(f32),
    Completed,
    Failed(String),
}

#[derive(Debug, Default)]
pub struct JobCoordinator {
    phase: JobPhase,
    job_id: Option<JobId>,
    progress: f32,
    subscription: Option<Receiver<JobEvent>>,
}

impl JobCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> JobPhase {
        self.phase
    }

    /// The bound id while a job is active, and still after it completed or
    /// failed (for display) until teardown.
    pub fn job_id(&self) -> Option<&JobId> {
        self.job_id.as_ref()
    }

    /// Latest progress applied from the stream, in `[0, 100]`.
    pub fn progress(&self) -> f32 {
        self.progress
    }

    pub fn is_active(&self) -> bool {
        matches!(self.phase, JobPhase::Requesting | JobPhase::Streaming)
    }

    /// Submit a request through `engine`. At most one job may be in flight:
    /// anything but `Idle` refuses with `JobActive`. On acceptance the
    /// returned id is bound and events start flowing through `pump`; on
    /// rejection the coordinator is back at `Idle` and the caller surfaces
    /// the error.
    pub fn submit(
        &mut self,
        engine: &dyn JobEngine,
        request: &DownloadRequest,
    ) -> Result<JobId, SubmitError> {
        if self.phase != JobPhase::Idle {
            return Err(SubmitError::JobActive);
        }

        self.phase = JobPhase::Requesting;
        let (events_tx, events_rx) = mpsc::channel();
        match engine.submit(request, events_tx) {
            Ok(job_id) => {
                self.subscription = Some(events_rx);
                self.job_id = Some(job_id.clone());
                self.progress = 0.0;
                self.phase = JobPhase::Streaming;
                info!(job = %job_id, "submission accepted, subscription bound");
                Ok(job_id)
            }
            Err(e) => {
                // events_rx drops here; no subscription outlives a rejection.
                self.phase = JobPhase::Idle;
                Err(e)
            }
        }
    }

    /// Drain pending events without blocking. Called once per UI tick.
    ///
    /// Events carrying a different job id than the bound one are discarded.
    /// Progress is applied in wire order; a regression is logged and still
    /// applied. Reaching 100 releases the subscription and moves to
    /// `Completed`; a failure notification releases it and moves to
    /// `Failed`.
    pub fn pump(&mut self) -> Vec<CoordinatorEvent> {
        let mut surfaced = Vec::new();
        let Some(events_rx) = self.subscription.take() else {
            return surfaced;
        };

        let mut keep_subscription = true;
        loop {
            match events_rx.try_recv() {
                Ok(event) => {
                    if self.job_id.as_ref() != Some(event.job_id()) {
                        debug!(event_job = %event.job_id(), "discarding stale progress event");
                        continue;
                    }
                    match event {
                        JobEvent::Progress { progress, .. } => {
                            if progress < self.progress {
                                warn!(
                                    from = self.progress as f64,
                                    to = progress as f64,
                                    "progress regressed; applying wire order"
                                );
                            }
                            self.progress = progress;
                            surfaced.push(CoordinatorEvent::Progress(progress));
                            if progress >= 100.0 {
                                self.phase = JobPhase::Completed;
                                keep_subscription = false;
                                surfaced.push(CoordinatorEvent::Completed);
                                info!(job = ?self.job_id, "job completed, subscription released");
                                break;
                            }
                        }
                        JobEvent::Failed { message, .. } => {
                            self.phase = JobPhase::Failed;
                            keep_subscription = false;
                            warn!(job = ?self.job_id, %message, "job failed");
                            surfaced.push(CoordinatorEvent::Failed(message));
                            break;
                        }
                    }
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    // The engine went away without a terminal event.
                    self.phase = JobPhase::Failed;
                    keep_subscription = false;
                    let message = "progress stream closed unexpectedly".to_string();
                    warn!(job = ?self.job_id, "{message}");
                    surfaced.push(CoordinatorEvent::Failed(message));
                    break;
                }
            }
        }

        if keep_subscription {
            self.subscription = Some(events_rx);
        }
        surfaced
    }

    /// Release everything and return to `Idle`, discarding any buffered
    /// events for the abandoned job. Safe to call in any phase.
    pub fn teardown(&mut self) {
        if self.subscription.take().is_some() {
            debug!(job = ?self.job_id, "subscription released on teardown");
        }
        self.phase = JobPhase::Idle;
        self.job_id = None;
        self.progress = 0.0;
    }

    /// Whether a subscription receiver is currently held.
    pub fn is_subscribed(&self) -> bool {
        self.subscription.is_some()
    }
}
