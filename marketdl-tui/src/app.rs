//! Application state — single-owner, main-thread only.
//!
//! The workflow context object owns every piece of dialog state; this layer
//! adds what only the terminal shell cares about: cursors, the query edit
//! mode, the status line, and the worker/engine handles.

use std::collections::VecDeque;
use std::sync::mpsc::{Receiver, Sender};
use std::sync::Arc;
use std::time::Instant;

use chrono::NaiveDateTime;

use marketdl_core::catalog::row_number;
use marketdl_core::domain::{Instrument, MarketDataType};
use marketdl_core::provider::JobEngine;
use marketdl_core::workflow::{DownloadWorkflow, Screen, WorkflowError};

use crate::worker::{WorkerCommand, WorkerResponse};

/// Status message severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusLevel {
    Info,
    Warning,
    Error,
}

/// An error record for the status history.
#[derive(Debug, Clone)]
#[allow(dead_code)]
pub struct ErrorRecord {
    pub timestamp: NaiveDateTime,
    pub message: String,
}

/// A row on the configure form the cursor can land on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormRow {
    DataType(MarketDataType),
    Timeframe,
    StartDate,
    EndDate,
}

impl FormRow {
    /// Form rows top to bottom: one checkbox per selectable data type, then
    /// the timeframe picker and the two date fields.
    pub fn all() -> Vec<FormRow> {
        let mut rows: Vec<FormRow> = MarketDataType::SELECTABLE
            .iter()
            .map(|d| FormRow::DataType(*d))
            .collect();
        rows.push(FormRow::Timeframe);
        rows.push(FormRow::StartDate);
        rows.push(FormRow::EndDate);
        rows
    }
}

/// Top-level application state.
pub struct AppState {
    pub workflow: DownloadWorkflow,
    pub running: bool,

    /// Built from the loaded source list once the catalog arrives.
    pub engine: Option<Arc<dyn JobEngine>>,

    // Worker communication
    pub worker_tx: Sender<WorkerCommand>,
    pub worker_rx: Receiver<WorkerResponse>,

    // Browse screen
    /// Cursor offset within the current page.
    pub browse_cursor: usize,
    pub query_editing: bool,
    pub query_input: String,

    // Configure screen
    pub form_cursor: usize,

    // Cross-cutting
    pub status_message: Option<(String, StatusLevel)>,
    pub error_history: VecDeque<ErrorRecord>,
}

impl AppState {
    pub fn new(
        workflow: DownloadWorkflow,
        worker_tx: Sender<WorkerCommand>,
        worker_rx: Receiver<WorkerResponse>,
    ) -> Self {
        Self {
            workflow,
            running: true,
            engine: None,
            worker_tx,
            worker_rx,
            browse_cursor: 0,
            query_editing: false,
            query_input: String::new(),
            form_cursor: 0,
            status_message: None,
            error_history: VecDeque::with_capacity(50),
        }
    }

    /// Ask the worker for a catalog load if the workflow wants one.
    pub fn request_catalog_load(&mut self) {
        if self.workflow.open() {
            let _ = self.worker_tx.send(WorkerCommand::LoadCatalog);
        }
    }

    /// The instrument under the browse cursor, if the page has any rows.
    pub fn cursor_instrument(&self) -> Option<&Instrument> {
        self.workflow.page_items().get(self.browse_cursor)
    }

    /// Absolute row number of the cursor for the footer display.
    pub fn cursor_row_number(&self) -> usize {
        row_number(self.workflow.page(), self.browse_cursor)
    }

    /// Keep the browse cursor on a real row after the page shrinks.
    pub fn clamp_browse_cursor(&mut self) {
        let rows = self.workflow.page_items().len();
        if rows == 0 {
            self.browse_cursor = 0;
        } else if self.browse_cursor >= rows {
            self.browse_cursor = rows - 1;
        }
    }

    pub fn form_rows(&self) -> Vec<FormRow> {
        FormRow::all()
    }

    /// Close the dialog back to a clean browse screen. View-local state
    /// resets along with the workflow.
    pub fn close_dialog(&mut self) {
        self.workflow.close();
        self.browse_cursor = 0;
        self.form_cursor = 0;
        self.query_editing = false;
        self.query_input.clear();
        self.set_status("dialog reset");
    }

    /// Enter the configure screen; surfaces guard refusals as warnings.
    pub fn try_configure(&mut self) {
        match self.workflow.begin_configure() {
            Ok(()) => {
                self.form_cursor = 0;
                self.set_status(format!(
                    "configuring {} instrument(s)",
                    self.workflow.selection().len()
                ));
            }
            Err(WorkflowError::EmptySelection) => {
                self.set_warning("select at least one instrument first");
            }
            Err(e) => self.set_warning(e.to_string()),
        }
    }

    /// Submit the configured request through the coordinator.
    pub fn try_submit(&mut self) {
        let Some(engine) = self.engine.clone() else {
            self.set_warning("catalog not loaded yet");
            return;
        };
        match self.workflow.submit_download(engine.as_ref()) {
            Ok(job_id) => self.set_status(format!("download started: {job_id}")),
            Err(e) => self.push_error(e.to_string()),
        }
    }

    /// Apply a search keystroke; execution waits for the quiet interval.
    pub fn edit_query(&mut self, now: Instant) {
        self.workflow.input_query(self.query_input.clone(), now);
    }

    pub fn screen(&self) -> Screen {
        self.workflow.screen()
    }

    /// Push an error to the history, capping at 50.
    pub fn push_error(&mut self, message: impl Into<String>) {
        let message = message.into();
        self.error_history.push_front(ErrorRecord {
            timestamp: chrono::Local::now().naive_local(),
            message: message.clone(),
        });
        if self.error_history.len() > 50 {
            self.error_history.pop_back();
        }
        self.status_message = Some((message, StatusLevel::Error));
    }

    /// Set an info status message.
    pub fn set_status(&mut self, msg: impl Into<String>) {
        self.status_message = Some((msg.into(), StatusLevel::Info));
    }

    /// Set a warning status message.
    pub fn set_warning(&mut self, msg: impl Into<String>) {
        self.status_message = Some((msg.into(), StatusLevel::Warning));
    }
}
