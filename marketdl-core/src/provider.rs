//! Boundary traits for the backend collaborators.
//!
//! The CatalogProvider trait abstracts over catalog backends (built-in set,
//! TOML file, HTTP endpoint) so implementations can be swapped and mocked in
//! tests. The JobEngine trait is the submission side of the download
//! protocol; progress comes back over the channel sender captured at submit
//! time, which is what makes subscription atomic with submission.

use std::sync::mpsc::Sender;

use thiserror::Error;

use crate::domain::{Instrument, JobEvent, JobId, Source};
use crate::request::{DownloadRequest, RequestError};
use crate::search::rank_instruments;

/// Structured errors for catalog operations.
///
/// Displayable in both CLI and TUI contexts; a load failure surfaces as an
/// empty catalog behind a persistent error indicator.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("catalog transport error: {0}")]
    Transport(String),

    #[error("catalog response decode error: {0}")]
    Decode(String),

    #[error("catalog file error: {0}")]
    Io(#[from] std::io::Error),

    #[error("catalog parse error: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Why the engine refused a submission. The coordinator stays `Idle` on any
/// of these; the caller surfaces the message and the user may resubmit.
#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("request rejected: {0}")]
    Rejected(String),

    #[error("a download job is already active")]
    JobActive,

    #[error(transparent)]
    InvalidRequest(#[from] RequestError),
}

/// Trait for catalog backends.
///
/// Both calls are one-shot loads; the workflow installs the results
/// wholesale. Implementations may block — callers run them off the UI
/// thread.
pub trait CatalogProvider: Send + Sync {
    /// Human-readable name of this provider.
    fn name(&self) -> &str;

    /// The full downloadable-instrument list.
    fn list_instruments(&self) -> Result<Vec<Instrument>, CatalogError>;

    /// Every source with its supported timeframes.
    fn list_sources(&self) -> Result<Vec<Source>, CatalogError>;

    /// Server-side search. The default runs the client-side ranking over
    /// `list_instruments`; remote providers may override with a real query.
    fn search_instruments(&self, query: &str) -> Result<Vec<Instrument>, CatalogError> {
        let instruments = self.list_instruments()?;
        Ok(rank_instruments(&instruments, query)
            .into_iter()
            .cloned()
            .collect())
    }
}

/// Trait for download job engines.
pub trait JobEngine: Send + Sync {
    /// Submit a request. `events` is the progress subscription: the engine
    /// keeps the sender for the life of the job, so no event can precede the
    /// caller holding the receiving end. Returns the assigned job id on
    /// acceptance.
    fn submit(
        &self,
        request: &DownloadRequest,
        events: Sender<JobEvent>,
    ) -> Result<JobId, SubmitError>;
}
