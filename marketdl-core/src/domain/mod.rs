//! Domain types for the download subsystem.

pub mod instrument;
pub mod job;
pub mod source;

pub use instrument::{Instrument, InstrumentKey, MarketDataType, MarketType};
pub use job::{JobEvent, JobId, JobPhase};
pub use source::{sort_timeframes, timeframe_rank, Source};

/// Timeframe type alias — opaque interval strings like "1h" or "1d".
pub type Timeframe = String;
