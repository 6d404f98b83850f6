//! Search over the loaded catalog: tiered ranking plus the debounce timer.
//!
//! Ranking tiers, best first: exact symbol, symbol prefix, symbol-or-name
//! substring, then a skim fuzzy score over both fields. Ties keep catalog
//! order. Matching is case-insensitive and always runs against the whole
//! catalog, not the market-filtered subset.

use std::time::{Duration, Instant};

use fuzzy_matcher::skim::SkimMatcherV2;
use fuzzy_matcher::FuzzyMatcher;

use crate::domain::Instrument;

/// Quiet interval a keystroke must survive before its query executes.
pub const SEARCH_DEBOUNCE: Duration = Duration::from_millis(500);

/// Rank `catalog` against `query`, best match first. An empty or
/// whitespace-only query returns no matches — the caller renders the
/// market-filtered view instead of a result list in that case.
pub fn rank_instruments<'a>(catalog: &'a [Instrument], query: &str) -> Vec<&'a Instrument> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return Vec::new();
    }

    let matcher = SkimMatcherV2::default();
    let mut scored: Vec<(i64, usize, &Instrument)> = Vec::new();
    for (position, instrument) in catalog.iter().enumerate() {
        let symbol = instrument.symbol.to_lowercase();
        let name = instrument.name.to_lowercase();

        let score = if symbol == needle {
            Some(i64::MAX)
        } else if symbol.starts_with(&needle) {
            Some(i64::MAX - 1)
        } else if symbol.contains(&needle) || name.contains(&needle) {
            Some(i64::MAX - 2)
        } else {
            matcher
                .fuzzy_match(&symbol, &needle)
                .max(matcher.fuzzy_match(&name, &needle))
        };

        if let Some(score) = score {
            scored.push((score, position, instrument));
        }
    }

    scored.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)));
    scored.into_iter().map(|(_, _, instrument)| instrument).collect()
}

/// Explicit debounce timer for search input: each keystroke re-arms the
/// deadline and overwrites the pending query, so only the last query inside
/// the quiet window ever executes. Time is injected so tests never sleep.
#[derive(Debug)]
pub struct Debouncer {
    quiet: Duration,
    pending: Option<(String, Instant)>,
}

impl Debouncer {
    pub fn new(quiet: Duration) -> Self {
        Self { quiet, pending: None }
    }

    /// Record a keystroke: replaces any pending query and restarts the timer.
    pub fn schedule(&mut self, query: impl Into<String>, now: Instant) {
        self.pending = Some((query.into(), now + self.quiet));
    }

    /// Take the pending query if its quiet window has elapsed. Fires at most
    /// once per schedule.
    pub fn fire(&mut self, now: Instant) -> Option<String> {
        match &self.pending {
            Some((_, deadline)) if now >= *deadline => {
                self.pending.take().map(|(query, _)| query)
            }
            _ => None,
        }
    }

    /// Drop the pending query without executing it (workflow close).
    pub fn cancel(&mut self) {
        self.pending = None;
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new(SEARCH_DEBOUNCE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::MarketType;

    fn catalog() -> Vec<Instrument> {
        vec![
            Instrument::new("Bitcoin / TetherUS", "BTCUSDT", "Binance", MarketType::Crypto),
            Instrument::new("Ethereum / TetherUS", "ETHUSDT", "Binance", MarketType::Crypto),
            Instrument::new("Bitcoin Cash", "BCHUSDT", "Binance", MarketType::Crypto),
            Instrument::new("Apple Inc.", "AAPL", "YahooFinance", MarketType::Stock),
            Instrument::new("Broadcom Inc.", "AVGO", "YahooFinance", MarketType::Stock),
        ]
    }

    #[test]
    fn exact_symbol_beats_prefix_and_substring() {
        let cat = catalog();
        let hits = rank_instruments(&cat, "btcusdt");
        assert_eq!(hits[0].symbol, "BTCUSDT");
    }

    #[test]
    fn prefix_beats_name_substring() {
        let cat = catalog();
        let hits = rank_instruments(&cat, "btc");
        // "BTCUSDT" is a symbol prefix; "Bitcoin Cash" only matches fuzzily.
        assert_eq!(hits[0].symbol, "BTCUSDT");
    }

    #[test]
    fn name_substring_matches() {
        let cat = catalog();
        let hits = rank_instruments(&cat, "apple");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].symbol, "AAPL");
    }

    #[test]
    fn fuzzy_tier_matches_scattered_letters() {
        let cat = catalog();
        let hits = rank_instruments(&cat, "bcn");
        // b-c-n is a subsequence of "bitcoin cash" (and its symbol), not of AAPL.
        assert!(hits.iter().any(|i| i.symbol == "BCHUSDT"));
        assert!(!hits.iter().any(|i| i.symbol == "AAPL"));
    }

    #[test]
    fn fuzzy_tier_never_outranks_the_literal_tiers() {
        let cat = vec![
            Instrument::new("Solana / TetherUS", "SOLUSDT", "Binance", MarketType::Crypto),
            Instrument::new("Special Oil Ltd.", "XOIL", "YahooFinance", MarketType::Stock),
        ];
        // "sol" is a symbol prefix of SOLUSDT but only scattered letters in
        // "Special Oil"; the skim score sits far below the literal tiers.
        let hits = rank_instruments(&cat, "sol");
        let symbols: Vec<&str> = hits.iter().map(|i| i.symbol.as_str()).collect();
        assert_eq!(symbols, vec!["SOLUSDT", "XOIL"]);
    }

    #[test]
    fn empty_query_matches_nothing() {
        let cat = catalog();
        assert!(rank_instruments(&cat, "").is_empty());
        assert!(rank_instruments(&cat, "   ").is_empty());
    }

    #[test]
    fn results_are_subset_of_catalog() {
        let cat = catalog();
        let hits = rank_instruments(&cat, "usdt");
        assert!(hits.len() <= cat.len());
        for hit in hits {
            assert!(cat.iter().any(|i| i == hit));
        }
    }

    #[test]
    fn ties_keep_catalog_order() {
        let cat = catalog();
        let hits = rank_instruments(&cat, "usdt");
        // All three are substring-tier; catalog order preserved.
        let symbols: Vec<&str> = hits.iter().map(|i| i.symbol.as_str()).collect();
        assert_eq!(symbols, vec!["BTCUSDT", "ETHUSDT", "BCHUSDT"]);
    }

    #[test]
    fn debouncer_fires_only_after_quiet_window() {
        let mut d = Debouncer::new(Duration::from_millis(500));
        let t0 = Instant::now();
        d.schedule("btc", t0);
        assert_eq!(d.fire(t0 + Duration::from_millis(499)), None);
        assert_eq!(d.fire(t0 + Duration::from_millis(500)), Some("btc".into()));
        // Fires at most once.
        assert_eq!(d.fire(t0 + Duration::from_millis(600)), None);
    }

    #[test]
    fn new_keystroke_cancels_pending_query() {
        let mut d = Debouncer::new(Duration::from_millis(500));
        let t0 = Instant::now();
        d.schedule("b", t0);
        d.schedule("bt", t0 + Duration::from_millis(300));
        // The first deadline has passed, but "b" was overwritten.
        assert_eq!(d.fire(t0 + Duration::from_millis(600)), None);
        assert_eq!(
            d.fire(t0 + Duration::from_millis(800)),
            Some("bt".to_string())
        );
    }

    #[test]
    fn cancel_discards_pending() {
        let mut d = Debouncer::new(Duration::from_millis(500));
        let t0 = Instant::now();
        d.schedule("btc", t0);
        d.cancel();
        assert!(!d.is_pending());
        assert_eq!(d.fire(t0 + Duration::from_secs(5)), None);
    }
}
