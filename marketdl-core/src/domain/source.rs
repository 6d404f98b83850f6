use serde::{Deserialize, Serialize};

/// A data provider as reported by the catalog boundary: a name instruments
/// refer to via `source_name`, a homepage URL for display, and the fixed set
/// of timeframes it can serve. Loaded once per workflow open and replaced
/// wholesale, never patched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    pub name: String,
    pub url: String,
    pub timeframes: Vec<String>,
}

impl Source {
    pub fn new(
        name: impl Into<String>,
        url: impl Into<String>,
        timeframes: Vec<&str>,
    ) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            timeframes: timeframes.into_iter().map(String::from).collect(),
        }
    }

    pub fn supports(&self, timeframe: &str) -> bool {
        self.timeframes.iter().any(|t| t == timeframe)
    }
}

/// Rank a timeframe string for display ordering. Parses `<count><unit>`
/// (e.g. "5m", "1h", "1W") into an approximate duration in seconds so
/// unions of source timeframes sort shortest-first regardless of which
/// source contributed them. Unrecognized strings return `None` and sort
/// after all recognized ones, lexicographically.
pub fn timeframe_rank(timeframe: &str) -> Option<u64> {
    let unit = timeframe.chars().last()?;
    let count: u64 = timeframe[..timeframe.len() - unit.len_utf8()].parse().ok()?;
    if count == 0 {
        return None;
    }
    let unit_secs: u64 = match unit {
        's' => 1,
        'm' => 60,
        'h' => 3_600,
        'd' | 'D' => 86_400,
        'w' | 'W' => 604_800,
        'M' => 2_592_000,
        'y' | 'Y' => 31_536_000,
        _ => return None,
    };
    Some(count * unit_secs)
}

/// Sort timeframes by duration, unknown formats last in lexicographic order.
/// Used wherever a union of per-source sets must come out deterministic.
pub fn sort_timeframes(timeframes: &mut [String]) {
    timeframes.sort_by(|a, b| match (timeframe_rank(a), timeframe_rank(b)) {
        (Some(ra), Some(rb)) => ra.cmp(&rb).then_with(|| a.cmp(b)),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => a.cmp(b),
    });
}
