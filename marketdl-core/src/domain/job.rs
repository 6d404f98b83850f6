use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque download job identifier, assigned by the job engine on acceptance.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JobId(pub String);

impl JobId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One message on a job's progress stream. `Progress` carries percentage in
/// `[0, 100]`; the stream ends logically at 100. `Failed` is the out-of-band
/// failure notification for a job that cannot finish.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum JobEvent {
    Progress { job_id: JobId, progress: f32 },
    Failed { job_id: JobId, message: String },
}

impl JobEvent {
    pub fn job_id(&self) -> &JobId {
        match self {
            JobEvent::Progress { job_id, .. } => job_id,
            JobEvent::Failed { job_id, .. } => job_id,
        }
    }
}

/// Coordinator-side lifecycle of the at-most-one in-flight job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobPhase {
    Idle,
    Requesting,
    Streaming,
    Completed,
    Failed,
}

impl Default for JobPhase {
    fn default() -> Self {
        JobPhase::Idle
    }
}

impl JobPhase {
    pub fn label(self) -> &'static str {
        match self {
            JobPhase::Idle => "idle",
            JobPhase::Requesting => "requesting",
            JobPhase::Streaming => "downloading",
            JobPhase::Completed => "completed",
            JobPhase::Failed => "failed",
        }
    }
}
