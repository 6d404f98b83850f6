//! MarketDL TUI — the download dialog as a terminal application.
//!
//! Screens:
//! 1. Browse — market tabs, debounced search, paged instrument table
//! 2. Configure — data types, timeframe, date window, availability split
//! 3. Download — live progress gauge over the job's event stream

mod app;
mod input;
mod theme;
mod ui;
mod worker;

#[cfg(test)]
mod test_helpers;

use std::io::{self, stdout};
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{bail, Context, Result};
use crossterm::event::{self, Event};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tracing_subscriber::EnvFilter;

use marketdl_core::backend::{HttpCatalog, LocalJobEngine, StaticCatalog};
use marketdl_core::provider::CatalogProvider;
use marketdl_core::workflow::{DownloadWorkflow, WorkflowEvent};

use crate::app::AppState;
use crate::worker::{WorkerCommand, WorkerResponse};

fn main() -> Result<()> {
    // Install a panic hook that restores the terminal before printing the panic.
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stderr(), LeaveAlternateScreen);
        default_hook(info);
    }));

    init_logging();

    let provider = build_provider()?;

    // Worker channels
    let (cmd_tx, cmd_rx) = mpsc::channel();
    let (resp_tx, resp_rx) = mpsc::channel();
    let worker_handle = worker::spawn_worker(provider, cmd_rx, resp_tx);

    // Build app state and kick off the catalog load.
    let workflow = DownloadWorkflow::new(chrono::Local::now().date_naive());
    let mut app = AppState::new(workflow, cmd_tx.clone(), resp_rx);
    app.request_catalog_load();

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    // Run the main event loop
    let result = run_app(&mut terminal, &mut app);

    // Shutdown worker
    let _ = cmd_tx.send(WorkerCommand::Shutdown);
    let _ = worker_handle.join();

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut AppState,
) -> Result<()> {
    loop {
        // 1. Render
        terminal.draw(|f| ui::draw(f, app))?;

        // 2. Drain worker responses (non-blocking)
        while let Ok(resp) = app.worker_rx.try_recv() {
            handle_worker_response(app, resp);
        }

        // 3. Advance time-driven work: due searches, job progress.
        for event in app.workflow.tick(Instant::now()) {
            handle_workflow_event(app, event);
        }

        // 4. Poll for input events (50ms timeout for ~20 FPS tick)
        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                input::handle_key(app, key);
            }
        }

        // 5. Check quit
        if !app.running {
            break;
        }
    }
    Ok(())
}

fn handle_worker_response(app: &mut AppState, resp: WorkerResponse) {
    match resp {
        WorkerResponse::CatalogLoaded { instruments, sources } => {
            // The reference engine serves exactly the loaded sources.
            app.engine = Some(Arc::new(LocalJobEngine::new(sources.clone())));
            app.workflow.catalog_loaded(instruments, sources);
            app.clamp_browse_cursor();
            app.set_status(format!(
                "catalog loaded: {} instruments",
                app.workflow.catalog().len()
            ));
        }
        WorkerResponse::CatalogFailed { message } => {
            app.workflow.catalog_failed(message.clone());
            app.push_error(format!("catalog load failed: {message}"));
        }
    }
}

fn handle_workflow_event(app: &mut AppState, event: WorkflowEvent) {
    match event {
        WorkflowEvent::SearchApplied { query, hits } => {
            app.browse_cursor = 0;
            if query.is_empty() {
                app.set_status("filter cleared");
            } else {
                app.set_status(format!("{hits} match(es) for \"{query}\""));
            }
        }
        WorkflowEvent::DownloadProgress(progress) => {
            app.set_status(format!("downloading… {progress:.0}%"));
        }
        WorkflowEvent::DownloadCompleted => {
            app.set_status("download complete");
        }
        WorkflowEvent::DownloadFailed(message) => {
            app.push_error(format!("download failed: {message}"));
        }
    }
}

/// Pick the catalog backend from the command line. Default is the built-in
/// set; `--catalog-url` switches to the HTTP provider, `--catalog-file` to a
/// TOML catalog.
fn build_provider() -> Result<Box<dyn CatalogProvider>> {
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--catalog-url" => {
                let url = args.next().context("--catalog-url needs a value")?;
                return Ok(Box::new(HttpCatalog::new(url)?));
            }
            "--catalog-file" => {
                let path = args.next().context("--catalog-file needs a value")?;
                return Ok(Box::new(StaticCatalog::from_toml_file(Path::new(&path))?));
            }
            other => bail!("unknown argument: {other} (expected --catalog-url or --catalog-file)"),
        }
    }
    Ok(Box::new(StaticCatalog::builtin()))
}

/// Log to a file — the terminal belongs to ratatui. Best effort: a missing
/// data directory silently disables logging rather than blocking the UI.
fn init_logging() {
    let dir = dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("marketdl");
    let _ = std::fs::create_dir_all(&dir);
    if let Ok(file) = std::fs::File::create(dir.join("marketdl-tui.log")) {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_writer(std::sync::Mutex::new(file))
            .with_ansi(false)
            .try_init();
    }
}
