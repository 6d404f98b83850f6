//! Integration tests for the download workflow over real collaborators.
//!
//! Tests:
//! 1. Browse: market tabs, fixed-size pagination, debounced search
//! 2. Configure: availability split across sources, submit filtering
//! 3. Progress: stale-job discarding, wire-order trust, close mid-stream
//! 4. End to end against the local engine with zero pacing

use std::collections::VecDeque;
use std::sync::mpsc::Sender;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use chrono::NaiveDate;

use marketdl_core::backend::{LocalJobEngine, StaticCatalog};
use marketdl_core::catalog::PAGE_SIZE;
use marketdl_core::domain::{Instrument, JobEvent, JobId, JobPhase, MarketType, Source};
use marketdl_core::provider::{CatalogProvider, JobEngine, SubmitError};
use marketdl_core::request::DownloadRequest;
use marketdl_core::search::SEARCH_DEBOUNCE;
use marketdl_core::workflow::{DownloadWorkflow, Screen, WorkflowEvent};

fn fixed_today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 8, 21).unwrap()
}

/// Helper: n crypto instruments on source A plus two stocks on source B.
fn mixed_catalog(crypto: usize) -> Vec<Instrument> {
    let mut instruments: Vec<Instrument> = (0..crypto)
        .map(|i| {
            Instrument::new(
                format!("Coin {i} / TetherUS"),
                format!("C{i}USDT"),
                "Binance",
                MarketType::Crypto,
            )
        })
        .collect();
    instruments.push(Instrument::new("Apple Inc.", "AAPL", "YahooFinance", MarketType::Stock));
    instruments.push(Instrument::new("Broadcom Inc.", "AVGO", "YahooFinance", MarketType::Stock));
    instruments
}

/// Helper: source A serves intraday and daily, source B daily only.
fn split_sources() -> Vec<Source> {
    vec![
        Source::new("Binance", "https://binance.com", vec!["1h", "1d"]),
        Source::new("YahooFinance", "https://finance.yahoo.com", vec!["1d"]),
    ]
}

fn loaded(crypto: usize) -> DownloadWorkflow {
    let mut wf = DownloadWorkflow::new(fixed_today());
    assert!(wf.open());
    wf.catalog_loaded(mixed_catalog(crypto), split_sources());
    wf
}

/// Engine double that records requests and hands the test the event sender,
/// so progress can be injected without a worker thread.
struct CapturingEngine {
    ids: Mutex<VecDeque<String>>,
    requests: Mutex<Vec<DownloadRequest>>,
    events: Mutex<Option<Sender<JobEvent>>>,
}

impl CapturingEngine {
    fn new(ids: &[&str]) -> Self {
        Self {
            ids: Mutex::new(ids.iter().map(|s| s.to_string()).collect()),
            requests: Mutex::new(Vec::new()),
            events: Mutex::new(None),
        }
    }

    fn sender(&self) -> Sender<JobEvent> {
        self.events.lock().unwrap().clone().expect("no job submitted")
    }

    fn drop_sender(&self) {
        *self.events.lock().unwrap() = None;
    }

    fn last_request(&self) -> DownloadRequest {
        self.requests.lock().unwrap().last().cloned().expect("no job submitted")
    }
}

impl JobEngine for CapturingEngine {
    fn submit(
        &self,
        request: &DownloadRequest,
        events: Sender<JobEvent>,
    ) -> Result<JobId, SubmitError> {
        self.requests.lock().unwrap().push(request.clone());
        *self.events.lock().unwrap() = Some(events);
        let id = self
            .ids
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| "job".to_string());
        Ok(JobId::new(id))
    }
}

fn progress(job: &str, percent: f32) -> JobEvent {
    JobEvent::Progress { job_id: JobId::new(job), progress: percent }
}

// ──────────────────────────────────────────────
// Browse: tabs, pagination, search
// ──────────────────────────────────────────────

#[test]
fn fifteen_instruments_spread_over_two_pages() {
    let mut wf = loaded(15);

    assert_eq!(wf.displayed().len(), 15);
    assert_eq!(wf.page_count(), 2);
    assert_eq!(wf.page_items().len(), PAGE_SIZE);
    assert_eq!(wf.page_items()[0].symbol, "C0USDT");

    wf.next_page();
    assert_eq!(wf.page(), 2);
    assert_eq!(wf.page_items().len(), 3);
    assert_eq!(wf.page_items()[0].symbol, "C12USDT");

    // Past the last page: clamped, not wrapped.
    wf.next_page();
    assert_eq!(wf.page(), 2);
    wf.prev_page();
    wf.prev_page();
    assert_eq!(wf.page(), 1);
}

#[test]
fn market_switch_resets_to_first_page() {
    let mut wf = loaded(15);
    wf.next_page();
    assert_eq!(wf.page(), 2);

    wf.set_market_type(MarketType::Stock);
    assert_eq!(wf.page(), 1);
    assert_eq!(wf.displayed().len(), 2);

    // Futures tab is empty but still renders one (empty) page.
    wf.set_market_type(MarketType::Futures);
    assert_eq!(wf.page_count(), 1);
    assert!(wf.page_items().is_empty());
}

#[test]
fn debounced_search_applies_once_and_resets_page() {
    let mut wf = loaded(15);
    wf.next_page();

    let t0 = Instant::now();
    wf.input_query("c1", t0);
    assert!(wf.tick(t0 + Duration::from_millis(100)).is_empty());
    wf.input_query("c1u", t0 + Duration::from_millis(200));

    // Original deadline passed, but the keystroke re-armed the timer.
    assert!(wf.tick(t0 + SEARCH_DEBOUNCE).is_empty());

    let events = wf.tick(t0 + Duration::from_millis(200) + SEARCH_DEBOUNCE);
    // "c1u" prefix-matches C1USDT and substring-matches C10..C14.
    assert_eq!(
        events,
        vec![WorkflowEvent::SearchApplied { query: "c1u".into(), hits: 6 }]
    );
    assert_eq!(wf.page(), 1);
    assert_eq!(wf.displayed()[0].symbol, "C1USDT");
}

// ──────────────────────────────────────────────
// Configure: availability split, submit filtering
// ──────────────────────────────────────────────

#[test]
fn availability_splits_selection_by_timeframe() {
    let mut wf = loaded(3);
    let coin = wf.displayed()[0].clone();
    wf.toggle(&coin);
    wf.set_market_type(MarketType::Stock);
    let stock = wf.displayed()[0].clone();
    wf.toggle(&stock);

    wf.begin_configure().unwrap();
    wf.set_timeframe("1h");
    let available: Vec<&str> = wf.available_selection().iter().map(|i| i.symbol.as_str()).collect();
    let unavailable: Vec<&str> =
        wf.unavailable_selection().iter().map(|i| i.symbol.as_str()).collect();
    assert_eq!(available, vec!["C0USDT"]);
    assert_eq!(unavailable, vec!["AAPL"]);

    wf.set_timeframe("1d");
    assert_eq!(wf.available_selection().len(), 2);
    assert!(wf.unavailable_selection().is_empty());
}

#[test]
fn submit_sends_only_the_available_subset() {
    let mut wf = loaded(3);
    let coin = wf.displayed()[0].clone();
    wf.toggle(&coin);
    wf.set_market_type(MarketType::Stock);
    let stock = wf.displayed()[0].clone();
    wf.toggle(&stock);

    wf.begin_configure().unwrap();
    wf.set_timeframe("1h");

    let engine = CapturingEngine::new(&["j1"]);
    let job_id = wf.submit_download(&engine).unwrap();
    assert_eq!(job_id.as_str(), "j1");
    assert_eq!(wf.screen(), Screen::InProgress);

    let request = engine.last_request();
    let symbols: Vec<&str> = request.instruments.iter().map(|i| i.symbol.as_str()).collect();
    assert_eq!(symbols, vec!["C0USDT"]);
    assert_eq!(request.timeframe, "1h");
}

// ──────────────────────────────────────────────
// Progress: stale events, wire order, close
// ──────────────────────────────────────────────

fn submitted_workflow(engine: &CapturingEngine) -> DownloadWorkflow {
    let mut wf = loaded(3);
    let coin = wf.displayed()[0].clone();
    wf.toggle(&coin);
    wf.begin_configure().unwrap();
    wf.set_timeframe("1h");
    wf.submit_download(engine).unwrap();
    wf
}

#[test]
fn events_for_other_jobs_are_never_applied() {
    let engine = CapturingEngine::new(&["j1"]);
    let mut wf = submitted_workflow(&engine);
    let tx = engine.sender();

    tx.send(progress("j1", 10.0)).unwrap();
    tx.send(progress("j2", 50.0)).unwrap();
    tx.send(progress("j1", 100.0)).unwrap();

    let events = wf.tick(Instant::now());
    assert_eq!(
        events,
        vec![
            WorkflowEvent::DownloadProgress(10.0),
            WorkflowEvent::DownloadProgress(100.0),
            WorkflowEvent::DownloadCompleted,
        ]
    );
    assert_eq!(wf.job_progress(), 100.0);
    assert_eq!(wf.job_phase(), JobPhase::Completed);

    // Completion released the subscription; the channel is gone.
    assert!(tx.send(progress("j1", 100.0)).is_err());
}

#[test]
fn regressing_progress_is_applied_in_wire_order() {
    let engine = CapturingEngine::new(&["j1"]);
    let mut wf = submitted_workflow(&engine);
    let tx = engine.sender();

    tx.send(progress("j1", 80.0)).unwrap();
    tx.send(progress("j1", 30.0)).unwrap();

    wf.tick(Instant::now());
    assert_eq!(wf.job_progress(), 30.0);
    assert_eq!(wf.job_phase(), JobPhase::Streaming);
}

#[test]
fn failure_event_surfaces_and_releases_subscription() {
    let engine = CapturingEngine::new(&["j1"]);
    let mut wf = submitted_workflow(&engine);
    let tx = engine.sender();

    tx.send(progress("j1", 40.0)).unwrap();
    tx.send(JobEvent::Failed { job_id: JobId::new("j1"), message: "source gone".into() })
        .unwrap();

    let events = wf.tick(Instant::now());
    assert_eq!(
        events,
        vec![
            WorkflowEvent::DownloadProgress(40.0),
            WorkflowEvent::DownloadFailed("source gone".into()),
        ]
    );
    assert_eq!(wf.job_phase(), JobPhase::Failed);
    assert!(tx.send(progress("j1", 50.0)).is_err());
}

#[test]
fn vanished_stream_without_terminal_event_fails_the_job() {
    let engine = CapturingEngine::new(&["j1"]);
    let mut wf = submitted_workflow(&engine);
    engine.drop_sender();

    let events = wf.tick(Instant::now());
    assert_eq!(
        events,
        vec![WorkflowEvent::DownloadFailed("progress stream closed unexpectedly".into())]
    );
    assert_eq!(wf.job_phase(), JobPhase::Failed);
}

#[test]
fn close_mid_stream_discards_the_job_and_resets() {
    let engine = CapturingEngine::new(&["j1", "j2"]);
    let mut wf = submitted_workflow(&engine);
    let tx = engine.sender();

    tx.send(progress("j1", 40.0)).unwrap();
    wf.tick(Instant::now());
    assert_eq!(wf.job_progress(), 40.0);

    wf.close();
    assert_eq!(wf.screen(), Screen::Browsing);
    assert_eq!(wf.job_phase(), JobPhase::Idle);
    assert_eq!(wf.job_progress(), 0.0);
    assert!(wf.selection().is_empty());
    assert!(tx.send(progress("j1", 60.0)).is_err());

    // A fresh journey can submit again immediately.
    let coin = wf.displayed()[0].clone();
    wf.toggle(&coin);
    wf.begin_configure().unwrap();
    wf.set_timeframe("1h");
    assert_eq!(wf.submit_download(&engine).unwrap().as_str(), "j2");
}

// ──────────────────────────────────────────────
// End to end with the local engine
// ──────────────────────────────────────────────

#[test]
fn local_engine_runs_a_job_to_completion() {
    let catalog = StaticCatalog::builtin();
    let instruments = catalog.list_instruments().unwrap();
    let sources = catalog.list_sources().unwrap();

    let mut wf = DownloadWorkflow::new(fixed_today());
    assert!(wf.open());
    wf.catalog_loaded(instruments, sources.clone());

    let first = wf.page_items()[0].clone();
    let second = wf.page_items()[1].clone();
    wf.toggle(&first);
    wf.toggle(&second);
    wf.begin_configure().unwrap();
    wf.set_timeframe("1h");

    let engine = LocalJobEngine::new(sources).with_item_delay(Duration::ZERO);
    wf.submit_download(&engine).unwrap();
    assert_eq!(wf.screen(), Screen::InProgress);
    assert!(wf.job_id().is_some());

    // Poll like the shell does until the worker thread reports completion.
    let mut last = Vec::new();
    for _ in 0..400 {
        last = wf.tick(Instant::now());
        if last.contains(&WorkflowEvent::DownloadCompleted) {
            break;
        }
        std::thread::sleep(Duration::from_millis(5));
    }

    assert!(last.contains(&WorkflowEvent::DownloadCompleted));
    assert_eq!(wf.job_phase(), JobPhase::Completed);
    assert_eq!(wf.job_progress(), 100.0);

    wf.close();
    assert_eq!(wf.job_phase(), JobPhase::Idle);
}
