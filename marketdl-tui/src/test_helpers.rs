//! Shared fixtures for shell tests.

use std::sync::mpsc;

use chrono::NaiveDate;

use marketdl_core::domain::{Instrument, MarketType, Source};
use marketdl_core::workflow::DownloadWorkflow;

use crate::app::AppState;

pub fn fixed_today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 8, 21).unwrap()
}

pub fn sources() -> Vec<Source> {
    vec![
        Source::new("Binance", "https://binance.com", vec!["1m", "1h", "1d"]),
        Source::new("YahooFinance", "https://finance.yahoo.com", vec!["1d"]),
    ]
}

/// `crypto` Binance pairs plus one Yahoo stock.
pub fn instruments(crypto: usize) -> Vec<Instrument> {
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
    instruments.push(Instrument::new(
        "Apple Inc.",
        "AAPL",
        "YahooFinance",
        MarketType::Stock,
    ));
    instruments
}

/// An app with a loaded catalog and dangling worker channels. The channel
/// peers are dropped on purpose: shell tests never exercise the worker.
pub fn loaded_app(crypto: usize) -> AppState {
    let (cmd_tx, _cmd_rx) = mpsc::channel();
    let (_resp_tx, resp_rx) = mpsc::channel();
    let mut workflow = DownloadWorkflow::new(fixed_today());
    assert!(workflow.open());
    workflow.catalog_loaded(instruments(crypto), sources());
    AppState::new(workflow, cmd_tx, resp_rx)
}
