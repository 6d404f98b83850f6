use serde::{Deserialize, Serialize};
use std::fmt;

/// Market segment the browse view is partitioned by. Exactly one is active
/// at a time; `Crypto` is the default tab.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MarketType {
    Crypto,
    Stock,
    Futures,
}

impl MarketType {
    pub const ALL: [MarketType; 3] = [MarketType::Crypto, MarketType::Stock, MarketType::Futures];

    pub fn label(self) -> &'static str {
        match self {
            MarketType::Crypto => "Crypto",
            MarketType::Stock => "Stocks",
            MarketType::Futures => "Futures",
        }
    }

    pub fn index(self) -> usize {
        match self {
            MarketType::Crypto => 0,
            MarketType::Stock => 1,
            MarketType::Futures => 2,
        }
    }

    pub fn from_index(i: usize) -> Option<Self> {
        match i {
            0 => Some(MarketType::Crypto),
            1 => Some(MarketType::Stock),
            2 => Some(MarketType::Futures),
            _ => None,
        }
    }

    pub fn next(self) -> MarketType {
        MarketType::from_index((self.index() + 1) % 3).unwrap()
    }

    pub fn prev(self) -> MarketType {
        MarketType::from_index((self.index() + 2) % 3).unwrap()
    }
}

impl Default for MarketType {
    fn default() -> Self {
        MarketType::Crypto
    }
}

impl fmt::Display for MarketType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Kind of data a download request asks for. A request carries a non-empty
/// set of these. `Economics` stays in the type for wire compatibility but is
/// not offered per-instrument in the configure screen (see `SELECTABLE`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MarketDataType {
    #[serde(rename = "OHLCV")]
    Ohlcv,
    Spread,
    #[serde(rename = "Order Flow")]
    OrderFlow,
    #[serde(rename = "Bid/Ask")]
    BidAsk,
    News,
    Economics,
}

impl MarketDataType {
    /// The data types the configure screen offers per instrument.
    pub const SELECTABLE: [MarketDataType; 5] = [
        MarketDataType::Ohlcv,
        MarketDataType::Spread,
        MarketDataType::OrderFlow,
        MarketDataType::BidAsk,
        MarketDataType::News,
    ];

    pub fn label(self) -> &'static str {
        match self {
            MarketDataType::Ohlcv => "OHLCV",
            MarketDataType::Spread => "Spread",
            MarketDataType::OrderFlow => "Order Flow",
            MarketDataType::BidAsk => "Bid/Ask",
            MarketDataType::News => "News",
            MarketDataType::Economics => "Economics",
        }
    }
}

impl fmt::Display for MarketDataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// One downloadable series as the catalog provider describes it: a display
/// name, the exchange symbol, the providing source, and the market segment
/// it is listed under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instrument {
    pub name: String,
    pub symbol: String,
    pub source_name: String,
    pub market_type: MarketType,
}

impl Instrument {
    pub fn new(
        name: impl Into<String>,
        symbol: impl Into<String>,
        source_name: impl Into<String>,
        market_type: MarketType,
    ) -> Self {
        Self {
            name: name.into(),
            symbol: symbol.into(),
            source_name: source_name.into(),
            market_type,
        }
    }

    /// Natural key: symbol + source. The catalog does not promise symbol
    /// uniqueness across sources, so membership tests use the pair.
    pub fn key(&self) -> InstrumentKey {
        InstrumentKey {
            symbol: self.symbol.clone(),
            source_name: self.source_name.clone(),
        }
    }
}

/// Identity of an instrument for selection membership.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InstrumentKey {
    pub symbol: String,
    pub source_name: String,
}

impl fmt::Display for InstrumentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.symbol, self.source_name)
    }
}
