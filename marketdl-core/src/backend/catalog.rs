//! Built-in catalog backend — a fixed source/instrument set, also loadable
//! from a TOML file for custom catalogs.
//!
//! The built-in set mirrors the two stock backends the desktop app shipped
//! with: Binance for crypto pairs (full intraday timeframe ladder) and
//! Yahoo Finance for equities and futures (daily bars only).

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::domain::{Instrument, MarketType, Source};
use crate::provider::{CatalogError, CatalogProvider};

/// On-disk catalog shape: `[[sources]]` and `[[instruments]]` tables.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct CatalogFile {
    sources: Vec<Source>,
    instruments: Vec<Instrument>,
}

/// A catalog provider backed by in-memory tables.
#[derive(Debug, Clone)]
pub struct StaticCatalog {
    name: String,
    sources: Vec<Source>,
    instruments: Vec<Instrument>,
}

impl StaticCatalog {
    pub fn new(sources: Vec<Source>, instruments: Vec<Instrument>) -> Self {
        Self { name: "static".into(), sources, instruments }
    }

    /// Load a catalog from a TOML file.
    pub fn from_toml_file(path: &Path) -> Result<Self, CatalogError> {
        let content = std::fs::read_to_string(path)?;
        let mut catalog = Self::from_toml(&content)?;
        catalog.name = path.display().to_string();
        Ok(catalog)
    }

    /// Parse a catalog from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, CatalogError> {
        let file: CatalogFile = toml::from_str(content)?;
        Ok(Self::new(file.sources, file.instruments))
    }

    /// Serialize the tables back to TOML.
    pub fn to_toml(&self) -> Result<String, CatalogError> {
        let file = CatalogFile {
            sources: self.sources.clone(),
            instruments: self.instruments.clone(),
        };
        toml::to_string_pretty(&file)
            .map_err(|e| CatalogError::Decode(format!("serialize catalog: {e}")))
    }

    pub fn sources(&self) -> &[Source] {
        &self.sources
    }

    /// The catalog the binaries use when no file or URL is given.
    pub fn builtin() -> Self {
        let sources = vec![
            Source::new(
                "Binance",
                "https://binance.com",
                vec![
                    "1s", "1m", "5m", "10m", "15m", "30m", "45m", "1h", "2h", "3h", "4h",
                    "12h", "1d", "1W", "1M",
                ],
            ),
            Source::new("YahooFinance", "https://finance.yahoo.com", vec!["1d"]),
        ];

        let crypto: &[(&str, &str)] = &[
            ("Bitcoin / TetherUS", "BTCUSDT"),
            ("Ethereum / TetherUS", "ETHUSDT"),
            ("BNB / TetherUS", "BNBUSDT"),
            ("Solana / TetherUS", "SOLUSDT"),
            ("XRP / TetherUS", "XRPUSDT"),
            ("Cardano / TetherUS", "ADAUSDT"),
            ("Dogecoin / TetherUS", "DOGEUSDT"),
            ("Avalanche / TetherUS", "AVAXUSDT"),
            ("Polkadot / TetherUS", "DOTUSDT"),
            ("Chainlink / TetherUS", "LINKUSDT"),
            ("Litecoin / TetherUS", "LTCUSDT"),
            ("Polygon / TetherUS", "MATICUSDT"),
            ("Cosmos / TetherUS", "ATOMUSDT"),
            ("Uniswap / TetherUS", "UNIUSDT"),
            ("NEAR Protocol / TetherUS", "NEARUSDT"),
            ("Bitcoin Cash / TetherUS", "BCHUSDT"),
            ("TRON / TetherUS", "TRXUSDT"),
            ("Ethereum Classic / TetherUS", "ETCUSDT"),
        ];

        let stocks: &[(&str, &str)] = &[
            ("Apple Inc.", "AAPL"),
            ("Microsoft Corporation", "MSFT"),
            ("Alphabet Inc.", "GOOGL"),
            ("Amazon.com Inc.", "AMZN"),
            ("NVIDIA Corporation", "NVDA"),
            ("Meta Platforms Inc.", "META"),
            ("Tesla Inc.", "TSLA"),
            ("JPMorgan Chase & Co.", "JPM"),
            ("Visa Inc.", "V"),
            ("Johnson & Johnson", "JNJ"),
            ("Walmart Inc.", "WMT"),
            ("Exxon Mobil Corporation", "XOM"),
        ];

        let futures: &[(&str, &str)] = &[
            ("E-Mini S&P 500", "ES=F"),
            ("Nasdaq 100 E-Mini", "NQ=F"),
            ("Mini Dow Jones", "YM=F"),
            ("Crude Oil WTI", "CL=F"),
            ("Gold", "GC=F"),
            ("Silver", "SI=F"),
        ];

        let mut instruments = Vec::new();
        for (name, symbol) in crypto {
            instruments.push(Instrument::new(*name, *symbol, "Binance", MarketType::Crypto));
        }
        for (name, symbol) in stocks {
            instruments.push(Instrument::new(*name, *symbol, "YahooFinance", MarketType::Stock));
        }
        for (name, symbol) in futures {
            instruments.push(Instrument::new(*name, *symbol, "YahooFinance", MarketType::Futures));
        }

        Self { name: "builtin".into(), sources, instruments }
    }
}

impl CatalogProvider for StaticCatalog {
    fn name(&self) -> &str {
        &self.name
    }

    fn list_instruments(&self) -> Result<Vec<Instrument>, CatalogError> {
        Ok(self.instruments.clone())
    }

    fn list_sources(&self) -> Result<Vec<Source>, CatalogError> {
        Ok(self.sources.clone())
    }
}
