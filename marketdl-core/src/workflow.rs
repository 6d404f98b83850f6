//! Download workflow — the context object that owns all dialog state and
//! sequences the three screens: browse/select → configure → progress.
//!
//! Single writer: the shell holds `&mut DownloadWorkflow` and calls into it
//! from one thread. Catalog and source list are installed wholesale and read
//! everywhere else; the selection set and the job coordinator live here and
//! nowhere else, so no locking is needed.

use std::time::Instant;

use chrono::NaiveDate;
use thiserror::Error;
use tracing::{debug, error, info};

use crate::availability::AvailabilityTable;
use crate::catalog::{clamp_page, page_count, page_slice, CatalogIndex};
use crate::coordinator::{CoordinatorEvent, JobCoordinator};
use crate::domain::{Instrument, JobId, JobPhase, MarketDataType, MarketType, Source};
use crate::provider::{JobEngine, SubmitError};
use crate::request::{default_window, earliest_start, latest_end, DownloadRequest};
use crate::search::{rank_instruments, Debouncer};
use crate::selection::SelectionSet;

/// Timeframe preselected when the configure screen opens.
pub const DEFAULT_TIMEFRAME: &str = "1h";

/// The screen the dialog is currently on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Browsing,
    Configuring,
    InProgress,
}

/// Catalog load lifecycle. `Failed` is sticky until the shell retries
/// `open()`; a load failure renders as an empty catalog behind a persistent
/// indicator, never as a crash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogState {
    NotLoaded,
    Loading,
    Ready,
    Failed(String),
}

/// Why a workflow operation was refused. Submission failures pass through
/// from the coordinator; everything else is a screen or guard violation.
#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("no instruments selected")]
    EmptySelection,

    #[error("catalog is not loaded")]
    CatalogNotReady,

    #[error("not on the browse screen")]
    NotBrowsing,

    #[error("not on the configure screen")]
    NotConfiguring,

    #[error(transparent)]
    Submit(#[from] SubmitError),
}

/// What `tick` surfaces for the status line.
#[derive(Debug, Clone, PartialEq)]
pub enum WorkflowEvent {
    SearchApplied { query: String, hits: usize },
    DownloadProgress(f32),
    DownloadCompleted,
    DownloadFailed(String),
}

/// The configure screen's form: what to download, at which timeframe, over
/// which window.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigureForm {
    pub data_types: Vec<MarketDataType>,
    pub timeframe: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl ConfigureForm {
    fn defaults(today: NaiveDate) -> Self {
        let (start_date, end_date) = default_window(today);
        Self {
            data_types: vec![MarketDataType::Ohlcv],
            timeframe: DEFAULT_TIMEFRAME.to_string(),
            start_date,
            end_date,
        }
    }

    pub fn has_data_type(&self, data_type: MarketDataType) -> bool {
        self.data_types.contains(&data_type)
    }
}

pub struct DownloadWorkflow {
    today: NaiveDate,
    screen: Screen,

    catalog_state: CatalogState,
    catalog: CatalogIndex,
    sources: Vec<Source>,
    availability: AvailabilityTable,

    selection: SelectionSet,

    // Browse view.
    market_type: MarketType,
    query: String,
    displayed: Vec<Instrument>,
    page: usize,
    debouncer: Debouncer,

    form: ConfigureForm,
    coordinator: JobCoordinator,
}

impl DownloadWorkflow {
    /// `today` anchors the date bounds for the whole session; callers pass
    /// the current date, tests pass a fixed one.
    pub fn new(today: NaiveDate) -> Self {
        Self {
            today,
            screen: Screen::Browsing,
            catalog_state: CatalogState::NotLoaded,
            catalog: CatalogIndex::default(),
            sources: Vec::new(),
            availability: AvailabilityTable::default(),
            selection: SelectionSet::new(),
            market_type: MarketType::default(),
            query: String::new(),
            displayed: Vec::new(),
            page: 1,
            debouncer: Debouncer::default(),
            form: ConfigureForm::defaults(today),
            coordinator: JobCoordinator::new(),
        }
    }

    pub fn screen(&self) -> Screen {
        self.screen
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    // ── Catalog load ────────────────────────────────────────────────────

    /// Begin a session. Returns true when the shell should perform the
    /// boundary load (and feed back `catalog_loaded` / `catalog_failed`);
    /// false when the catalog is cached from a previous open or a load is
    /// already in flight.
    pub fn open(&mut self) -> bool {
        match self.catalog_state {
            CatalogState::NotLoaded | CatalogState::Failed(_) => {
                self.catalog_state = CatalogState::Loading;
                true
            }
            CatalogState::Loading => false,
            CatalogState::Ready => false,
        }
    }

    /// Install the load results wholesale: new index, new source list, new
    /// availability table. Readers never see a partial update.
    pub fn catalog_loaded(&mut self, instruments: Vec<Instrument>, sources: Vec<Source>) {
        info!(
            instruments = instruments.len(),
            sources = sources.len(),
            "catalog loaded"
        );
        self.catalog = CatalogIndex::new(instruments);
        self.availability = AvailabilityTable::build(&sources);
        self.sources = sources;
        self.catalog_state = CatalogState::Ready;

        // The default timeframe may not exist in this source set.
        if !self.availability.timeframes().contains(&self.form.timeframe) {
            if let Some(first) = self.availability.timeframes().first() {
                self.form.timeframe = first.clone();
            }
        }

        self.refresh_displayed();
        self.page = 1;
    }

    /// A failed load leaves an empty catalog behind a persistent error
    /// state; retry is the shell's policy (call `open()` again).
    pub fn catalog_failed(&mut self, message: impl Into<String>) {
        let message = message.into();
        error!(%message, "catalog load failed");
        self.catalog = CatalogIndex::default();
        self.sources = Vec::new();
        self.availability = AvailabilityTable::default();
        self.displayed = Vec::new();
        self.page = 1;
        self.catalog_state = CatalogState::Failed(message);
    }

    pub fn catalog_state(&self) -> &CatalogState {
        &self.catalog_state
    }

    pub fn catalog(&self) -> &CatalogIndex {
        &self.catalog
    }

    pub fn sources(&self) -> &[Source] {
        &self.sources
    }

    pub fn availability(&self) -> &AvailabilityTable {
        &self.availability
    }

    // ── Browse: market filter, search, pagination ───────────────────────

    pub fn market_type(&self) -> MarketType {
        self.market_type
    }

    /// Switch the market tab. Clears any active or pending query — the
    /// display returns to the market-filtered subset at page 1.
    pub fn set_market_type(&mut self, market: MarketType) {
        self.market_type = market;
        self.query.clear();
        self.debouncer.cancel();
        self.refresh_displayed();
        self.page = 1;
    }

    /// The query currently applied to the display ("" when none).
    pub fn query(&self) -> &str {
        &self.query
    }

    /// Record a search keystroke. Nothing executes until the quiet interval
    /// elapses inside `tick`; a newer keystroke cancels an older pending one.
    pub fn input_query(&mut self, query: impl Into<String>, now: Instant) {
        self.debouncer.schedule(query, now);
    }

    /// Advance time-driven work: fire a due search and drain job progress.
    /// Call once per shell tick with the current instant.
    pub fn tick(&mut self, now: Instant) -> Vec<WorkflowEvent> {
        let mut events = Vec::new();

        if let Some(query) = self.debouncer.fire(now) {
            self.apply_search(&query);
            events.push(WorkflowEvent::SearchApplied {
                query,
                hits: self.displayed.len(),
            });
        }

        for event in self.coordinator.pump() {
            events.push(match event {
                CoordinatorEvent::Progress(progress) => WorkflowEvent::DownloadProgress(progress),
                CoordinatorEvent::Completed => WorkflowEvent::DownloadCompleted,
                CoordinatorEvent::Failed(message) => WorkflowEvent::DownloadFailed(message),
            });
        }

        events
    }

    fn apply_search(&mut self, query: &str) {
        debug!(%query, "applying search");
        self.query = query.trim().to_string();
        self.refresh_displayed();
        self.page = 1;
    }

    /// Recompute the displayed list from the current predicate: ranked
    /// search hits over the whole catalog when a query is active, otherwise
    /// the market-filtered subset. Replaced wholesale every time.
    fn refresh_displayed(&mut self) {
        self.displayed = if self.query.is_empty() {
            self.catalog
                .by_market_type(self.market_type)
                .into_iter()
                .cloned()
                .collect()
        } else {
            rank_instruments(self.catalog.all(), &self.query)
                .into_iter()
                .cloned()
                .collect()
        };
    }

    /// Everything the current filter matches, across all pages.
    pub fn displayed(&self) -> &[Instrument] {
        &self.displayed
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn page_count(&self) -> usize {
        page_count(self.displayed.len())
    }

    /// The rows visible on the current page.
    pub fn page_items(&self) -> &[Instrument] {
        page_slice(&self.displayed, self.page)
    }

    pub fn set_page(&mut self, page: usize) {
        self.page = clamp_page(page, self.displayed.len());
    }

    pub fn next_page(&mut self) {
        self.set_page(self.page + 1);
    }

    pub fn prev_page(&mut self) {
        self.set_page(self.page.saturating_sub(1).max(1));
    }

    // ── Selection ───────────────────────────────────────────────────────

    pub fn selection(&self) -> &SelectionSet {
        &self.selection
    }

    /// Toggle an instrument in or out of the selection. Returns true when it
    /// is selected after the call.
    pub fn toggle(&mut self, instrument: &Instrument) -> bool {
        self.selection.toggle(instrument)
    }

    pub fn is_selected(&self, instrument: &Instrument) -> bool {
        self.selection.contains_instrument(instrument)
    }

    /// Whether the Download action is enabled on the browse screen.
    pub fn can_configure(&self) -> bool {
        !self.selection.is_empty()
    }

    // ── Screen transitions ──────────────────────────────────────────────

    /// Browse → Configure. Guarded: refuses on an empty selection (the shell
    /// renders the action disabled rather than surfacing this as an error).
    pub fn begin_configure(&mut self) -> Result<(), WorkflowError> {
        if self.screen != Screen::Browsing {
            return Err(WorkflowError::NotBrowsing);
        }
        if self.catalog_state != CatalogState::Ready {
            return Err(WorkflowError::CatalogNotReady);
        }
        if self.selection.is_empty() {
            return Err(WorkflowError::EmptySelection);
        }
        self.screen = Screen::Configuring;
        Ok(())
    }

    /// Configure → Browse, keeping the selection. Not available from
    /// `InProgress`: a submitted job is left via `close()` only.
    pub fn back_to_browse(&mut self) -> Result<(), WorkflowError> {
        if self.screen != Screen::Configuring {
            return Err(WorkflowError::NotConfiguring);
        }
        self.screen = Screen::Browsing;
        Ok(())
    }

    /// Close from any screen: tear down the subscription if one is live,
    /// cancel any pending search, clear the selection, and reset every piece
    /// of view state to its defaults. Loaded catalog data is kept so
    /// re-opening starts from a clean browse screen without a refetch.
    pub fn close(&mut self) {
        debug!(screen = ?self.screen, "workflow closed");
        self.coordinator.teardown();
        self.debouncer.cancel();
        self.selection.clear();
        self.market_type = MarketType::default();
        self.query.clear();
        self.form = ConfigureForm::defaults(self.today);
        self.screen = Screen::Browsing;
        if self.catalog_state == CatalogState::Loading {
            self.catalog_state = CatalogState::NotLoaded;
        }
        self.refresh_displayed();
        self.page = 1;
    }

    // ── Configure form ──────────────────────────────────────────────────

    pub fn form(&self) -> &ConfigureForm {
        &self.form
    }

    /// Toggle a data type checkbox. Types outside the selectable set
    /// (`Economics`) are not offered and are ignored here.
    pub fn toggle_data_type(&mut self, data_type: MarketDataType) {
        if !MarketDataType::SELECTABLE.contains(&data_type) {
            debug!(%data_type, "ignoring non-selectable data type");
            return;
        }
        if let Some(at) = self.form.data_types.iter().position(|d| *d == data_type) {
            self.form.data_types.remove(at);
        } else {
            self.form.data_types.push(data_type);
        }
    }

    pub fn set_timeframe(&mut self, timeframe: impl Into<String>) {
        self.form.timeframe = timeframe.into();
    }

    /// Step the timeframe picker through the availability union. Does
    /// nothing when the union is empty.
    pub fn cycle_timeframe(&mut self, step: i32) {
        let timeframes = self.availability.timeframes();
        if timeframes.is_empty() {
            return;
        }
        let len = timeframes.len() as i32;
        let at = timeframes
            .iter()
            .position(|t| *t == self.form.timeframe)
            .unwrap_or(0) as i32;
        let next = (at + step).rem_euclid(len) as usize;
        self.form.timeframe = timeframes[next].clone();
    }

    pub fn set_start_date(&mut self, date: NaiveDate) {
        self.form.start_date = date;
    }

    pub fn set_end_date(&mut self, date: NaiveDate) {
        self.form.end_date = date;
    }

    /// Step the start date by whole days, clamped into the permitted
    /// historical window. Ordering against the end date is not clamped here;
    /// an inverted window surfaces as a validation error on submit.
    pub fn adjust_start_date(&mut self, days: i64) {
        self.form.start_date = (self.form.start_date + chrono::Duration::days(days))
            .clamp(earliest_start(self.today), latest_end(self.today));
    }

    pub fn adjust_end_date(&mut self, days: i64) {
        self.form.end_date = (self.form.end_date + chrono::Duration::days(days))
            .clamp(earliest_start(self.today), latest_end(self.today));
    }

    /// Selected instruments whose source can serve the chosen timeframe.
    pub fn available_selection(&self) -> Vec<&Instrument> {
        self.selection
            .iter()
            .filter(|i| self.availability.is_available(i, &self.form.timeframe))
            .collect()
    }

    /// Selected instruments excluded at the chosen timeframe; rendered
    /// dimmed/struck on the configure screen, never an error.
    pub fn unavailable_selection(&self) -> Vec<&Instrument> {
        self.selection
            .iter()
            .filter(|i| !self.availability.is_available(i, &self.form.timeframe))
            .collect()
    }

    // ── Submission ──────────────────────────────────────────────────────

    /// Build a request from the *available* subset of the selection and
    /// submit it. Unavailable instruments are dropped from the request; if
    /// that leaves nothing, validation refuses before the engine is called.
    /// On acceptance the workflow moves to `InProgress`; on any failure it
    /// stays on the configure screen and the user may resubmit.
    pub fn submit_download(&mut self, engine: &dyn JobEngine) -> Result<JobId, WorkflowError> {
        if self.screen != Screen::Configuring {
            return Err(WorkflowError::NotConfiguring);
        }

        let request = DownloadRequest {
            instruments: self.available_selection().into_iter().cloned().collect(),
            data_types: self.form.data_types.clone(),
            timeframe: self.form.timeframe.clone(),
            start_date: self.form.start_date,
            end_date: self.form.end_date,
        };
        request.validate(self.today).map_err(SubmitError::from)?;

        let job_id = self.coordinator.submit(engine, &request)?;
        self.screen = Screen::InProgress;
        info!(job = %job_id, instruments = request.instruments.len(), "download started");
        Ok(job_id)
    }

    // ── Job status ──────────────────────────────────────────────────────

    pub fn job_phase(&self) -> JobPhase {
        self.coordinator.phase()
    }

    pub fn job_progress(&self) -> f32 {
        self.coordinator.progress()
    }

    pub fn job_id(&self) -> Option<&JobId> {
        self.coordinator.job_id()
    }

    #[cfg(test)]
    pub(crate) fn coordinator(&self) -> &JobCoordinator {
        &self.coordinator
    }
}
