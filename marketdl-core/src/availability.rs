//! Timeframe availability — which sources can serve which timeframe.
//!
//! Derived wholesale from the source list and rebuilt whenever that list
//! changes; never patched incrementally. Output order is deterministic for
//! a fixed input set regardless of source order, so results compare equal
//! in tests.

use std::collections::HashMap;

use crate::domain::{sort_timeframes, Instrument, Source};

/// Maps each known timeframe to the set of source names supporting it.
#[derive(Debug, Clone, Default)]
pub struct AvailabilityTable {
    timeframes: Vec<String>,
    supporters: HashMap<String, Vec<String>>,
}

impl AvailabilityTable {
    /// Recompute the table from scratch for a source list.
    pub fn build(sources: &[Source]) -> Self {
        let mut supporters: HashMap<String, Vec<String>> = HashMap::new();
        for source in sources {
            for timeframe in &source.timeframes {
                let names = supporters.entry(timeframe.clone()).or_default();
                if !names.contains(&source.name) {
                    names.push(source.name.clone());
                }
            }
        }
        // Per-timeframe supporter lists sort by name; the union sorts by
        // duration. Both orders are input-order independent.
        for names in supporters.values_mut() {
            names.sort();
        }
        let mut timeframes: Vec<String> = supporters.keys().cloned().collect();
        sort_timeframes(&mut timeframes);
        Self { timeframes, supporters }
    }

    /// Union of all sources' timeframes, duration-ordered.
    pub fn timeframes(&self) -> &[String] {
        &self.timeframes
    }

    /// Names of the sources that can serve `timeframe`. Unknown timeframes
    /// yield the empty slice — callers render that as unavailable, not as an
    /// error.
    pub fn sources_supporting(&self, timeframe: &str) -> &[String] {
        self.supporters
            .get(timeframe)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// Whether `instrument`'s source can serve `timeframe`.
    pub fn is_available(&self, instrument: &Instrument, timeframe: &str) -> bool {
        self.sources_supporting(timeframe)
            .iter()
            .any(|name| *name == instrument.source_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::MarketType;

    fn sources() -> Vec<Source> {
        vec![
            Source::new("Binance", "https://binance.com", vec!["1m", "1h", "1d"]),
            Source::new("YahooFinance", "https://finance.yahoo.com", vec!["1d"]),
        ]
    }

    #[test]
    fn union_is_duration_ordered() {
        let table = AvailabilityTable::build(&sources());
        assert_eq!(table.timeframes(), &["1m", "1h", "1d"]);
    }

    #[test]
    fn order_independent_of_source_order() {
        let mut reversed = sources();
        reversed.reverse();
        let a = AvailabilityTable::build(&sources());
        let b = AvailabilityTable::build(&reversed);
        assert_eq!(a.timeframes(), b.timeframes());
        assert_eq!(a.sources_supporting("1d"), b.sources_supporting("1d"));
    }

    #[test]
    fn supporters_per_timeframe() {
        let table = AvailabilityTable::build(&sources());
        assert_eq!(table.sources_supporting("1h"), &["Binance"]);
        assert_eq!(table.sources_supporting("1d"), &["Binance", "YahooFinance"]);
    }

    #[test]
    fn unknown_timeframe_is_empty_not_error() {
        let table = AvailabilityTable::build(&sources());
        assert!(table.sources_supporting("3h").is_empty());
    }

    #[test]
    fn availability_follows_instrument_source() {
        let table = AvailabilityTable::build(&sources());
        let coin = Instrument::new("Bitcoin", "BTCUSDT", "Binance", MarketType::Crypto);
        let stock = Instrument::new("Apple", "AAPL", "YahooFinance", MarketType::Stock);
        assert!(table.is_available(&coin, "1h"));
        assert!(!table.is_available(&stock, "1h"));
        assert!(table.is_available(&stock, "1d"));
    }

    #[test]
    fn duplicate_source_entries_collapse() {
        let dup = vec![
            Source::new("Binance", "https://binance.com", vec!["1h"]),
            Source::new("Binance", "https://binance.com", vec!["1h"]),
        ];
        let table = AvailabilityTable::build(&dup);
        assert_eq!(table.sources_supporting("1h"), &["Binance"]);
    }
}
