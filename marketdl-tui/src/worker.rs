//! Background worker thread — the blocking catalog boundary runs here.
//!
//! Communication with the TUI main thread is via `mpsc` channels. The worker
//! owns the catalog provider; the main thread never blocks on a load.

use std::sync::mpsc::{Receiver, Sender};
use std::thread::{self, JoinHandle};

use tracing::{error, info};

use marketdl_core::domain::{Instrument, Source};
use marketdl_core::provider::CatalogProvider;

/// Commands sent from the TUI to the worker.
#[derive(Debug)]
pub enum WorkerCommand {
    LoadCatalog,
    Shutdown,
}

/// Responses sent from the worker back to the TUI.
#[derive(Debug, Clone)]
pub enum WorkerResponse {
    CatalogLoaded {
        instruments: Vec<Instrument>,
        sources: Vec<Source>,
    },
    CatalogFailed {
        message: String,
    },
}

/// Spawn the background worker thread.
pub fn spawn_worker(
    provider: Box<dyn CatalogProvider>,
    rx: Receiver<WorkerCommand>,
    tx: Sender<WorkerResponse>,
) -> JoinHandle<()> {
    thread::Builder::new()
        .name("marketdl-worker".into())
        .spawn(move || {
            worker_loop(provider, rx, tx);
        })
        .expect("failed to spawn worker thread")
}

fn worker_loop(
    provider: Box<dyn CatalogProvider>,
    rx: Receiver<WorkerCommand>,
    tx: Sender<WorkerResponse>,
) {
    loop {
        match rx.recv() {
            Ok(WorkerCommand::Shutdown) | Err(_) => break,
            Ok(WorkerCommand::LoadCatalog) => {
                let response = load_catalog(provider.as_ref());
                if tx.send(response).is_err() {
                    break;
                }
            }
        }
    }
}

fn load_catalog(provider: &dyn CatalogProvider) -> WorkerResponse {
    let instruments = match provider.list_instruments() {
        Ok(instruments) => instruments,
        Err(e) => {
            error!(provider = provider.name(), %e, "instrument load failed");
            return WorkerResponse::CatalogFailed { message: e.to_string() };
        }
    };
    match provider.list_sources() {
        Ok(sources) => {
            info!(
                provider = provider.name(),
                instruments = instruments.len(),
                sources = sources.len(),
                "catalog loaded"
            );
            WorkerResponse::CatalogLoaded { instruments, sources }
        }
        Err(e) => {
            error!(provider = provider.name(), %e, "source load failed");
            WorkerResponse::CatalogFailed { message: e.to_string() }
        }
    }
}
