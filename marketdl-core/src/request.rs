//! Download request descriptor and its validation bounds.
//!
//! Date bounds are compile-time policy, not user configuration: history
//! reaches back at most `MAX_LOOKBACK_YEARS`, and the end date stops at
//! yesterday because the current day is still being written.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{Instrument, MarketDataType};

/// Maximum historical lookback in years.
pub const MAX_LOOKBACK_YEARS: i32 = 20;

/// Earliest permitted start date relative to `today`: January 1st of the
/// year `MAX_LOOKBACK_YEARS` ago.
pub fn earliest_start(today: NaiveDate) -> NaiveDate {
    NaiveDate::from_ymd_opt(today.year() - MAX_LOOKBACK_YEARS, 1, 1).unwrap()
}

/// Latest permitted end date relative to `today`: yesterday.
pub fn latest_end(today: NaiveDate) -> NaiveDate {
    today - chrono::Duration::days(1)
}

/// Default configure-screen window: the 30 days ending yesterday.
pub fn default_window(today: NaiveDate) -> (NaiveDate, NaiveDate) {
    let end = latest_end(today);
    (end - chrono::Duration::days(30), end)
}

/// What gets handed to the job engine on submit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DownloadRequest {
    pub instruments: Vec<Instrument>,
    pub data_types: Vec<MarketDataType>,
    pub timeframe: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

/// Why a request is unacceptable before it ever reaches the engine.
#[derive(Debug, Error, PartialEq)]
pub enum RequestError {
    #[error("no instruments to download")]
    NoInstruments,

    #[error("no data types selected")]
    NoDataTypes,

    #[error("start date {start} is after end date {end}")]
    DateOrder { start: NaiveDate, end: NaiveDate },

    #[error("start date {start} is before the earliest allowed {earliest}")]
    StartTooEarly { start: NaiveDate, earliest: NaiveDate },

    #[error("end date {end} is after the latest allowed {latest}")]
    EndTooLate { end: NaiveDate, latest: NaiveDate },
}

impl DownloadRequest {
    /// Check the request against the §3 invariants as of `today`.
    pub fn validate(&self, today: NaiveDate) -> Result<(), RequestError> {
        if self.instruments.is_empty() {
            return Err(RequestError::NoInstruments);
        }
        if self.data_types.is_empty() {
            return Err(RequestError::NoDataTypes);
        }
        if self.start_date > self.end_date {
            return Err(RequestError::DateOrder {
                start: self.start_date,
                end: self.end_date,
            });
        }
        let earliest = earliest_start(today);
        if self.start_date < earliest {
            return Err(RequestError::StartTooEarly {
                start: self.start_date,
                earliest,
            });
        }
        let latest = latest_end(today);
        if self.end_date > latest {
            return Err(RequestError::EndTooLate {
                end: self.end_date,
                latest,
            });
        }
        Ok(())
    }
}
