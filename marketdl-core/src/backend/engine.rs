//! Local job engine — the in-process reference implementation of the
//! download protocol's server side.
//!
//! Each accepted job runs on its own named thread, walking the requested
//! instruments and emitting one `Progress` event per completed item as
//! `completed * 100 / total`, so the final event is exactly 100. Events are
//! sent with `let _ =`: an abandoned receiver does not stop the job, which
//! matches the protocol's rule that closing the dialog sends no cancellation
//! to the backend.

use std::sync::mpsc::Sender;
use std::thread;
use std::time::Duration;

use chrono::Local;
use tracing::{info, warn};

use crate::domain::{JobEvent, JobId, Source};
use crate::provider::{JobEngine, SubmitError};
use crate::request::DownloadRequest;

/// Pacing between items so the TUI gauge is watchable. Tests use zero.
const DEFAULT_ITEM_DELAY: Duration = Duration::from_millis(150);

pub struct LocalJobEngine {
    sources: Vec<Source>,
    item_delay: Duration,
}

impl LocalJobEngine {
    pub fn new(sources: Vec<Source>) -> Self {
        Self { sources, item_delay: DEFAULT_ITEM_DELAY }
    }

    /// Override the per-item pacing (zero makes jobs finish immediately).
    pub fn with_item_delay(mut self, item_delay: Duration) -> Self {
        self.item_delay = item_delay;
        self
    }
}

impl JobEngine for LocalJobEngine {
    fn submit(
        &self,
        request: &DownloadRequest,
        events: Sender<JobEvent>,
    ) -> Result<JobId, SubmitError> {
        request.validate(Local::now().date_naive())?;

        let job_id = JobId::new(uuid::Uuid::new_v4().to_string());
        info!(
            job = %job_id,
            instruments = request.instruments.len(),
            timeframe = %request.timeframe,
            "download job accepted"
        );

        let job = job_id.clone();
        let request = request.clone();
        let sources = self.sources.clone();
        let item_delay = self.item_delay;
        let thread_name = format!("marketdl-job-{}", &job.as_str()[..job.as_str().len().min(8)]);
        thread::Builder::new()
            .name(thread_name)
            .spawn(move || {
                run_job(job, request, sources, item_delay, events);
            })
            .map_err(|e| SubmitError::Rejected(format!("spawn job thread: {e}")))?;

        Ok(job_id)
    }
}

fn run_job(
    job_id: JobId,
    request: DownloadRequest,
    sources: Vec<Source>,
    item_delay: Duration,
    events: Sender<JobEvent>,
) {
    let total = request.instruments.len();
    for (completed, instrument) in request.instruments.iter().enumerate() {
        if !sources.iter().any(|s| s.name == instrument.source_name) {
            warn!(
                job = %job_id,
                source = %instrument.source_name,
                symbol = %instrument.symbol,
                "job failed: unknown source"
            );
            let _ = events.send(JobEvent::Failed {
                job_id: job_id.clone(),
                message: format!("unknown source: {}", instrument.source_name),
            });
            return;
        }

        // Stand-in for the actual transfer; what a production engine does
        // per item is outside this subsystem.
        if !item_delay.is_zero() {
            thread::sleep(item_delay);
        }

        let progress = ((completed + 1) * 100 / total) as f32;
        let _ = events.send(JobEvent::Progress { job_id: job_id.clone(), progress });
    }
    info!(job = %job_id, items = total, "download job finished");
}
