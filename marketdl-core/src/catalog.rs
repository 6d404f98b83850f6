//! Catalog index — the full instrument set and its paged, market-filtered views.
//!
//! The index is installed wholesale after the provider's one-shot load and
//! replaced wholesale on reload; nothing mutates it in place. Page math is
//! kept here as pure functions so the browse view and the CLI share one
//! clamping rule.

use serde::{Deserialize, Serialize};

use crate::domain::{Instrument, MarketType};

/// Fixed number of rows per catalog page.
pub const PAGE_SIZE: usize = 12;

/// The loaded instrument catalog. Read-only to everything but the workflow
/// root, which replaces it as a whole.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogIndex {
    instruments: Vec<Instrument>,
}

impl CatalogIndex {
    pub fn new(instruments: Vec<Instrument>) -> Self {
        Self { instruments }
    }

    pub fn len(&self) -> usize {
        self.instruments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instruments.is_empty()
    }

    /// Every instrument in provider order.
    pub fn all(&self) -> &[Instrument] {
        &self.instruments
    }

    /// Instruments listed under one market segment, in provider order.
    pub fn by_market_type(&self, market: MarketType) -> Vec<&Instrument> {
        self.instruments
            .iter()
            .filter(|i| i.market_type == market)
            .collect()
    }
}

/// Number of pages needed for `len` items. Never less than 1, so an empty
/// list still has a valid page 1.
pub fn page_count(len: usize) -> usize {
    len.div_ceil(PAGE_SIZE).max(1)
}

/// Clamp a requested 1-based page into `[1, page_count(len)]`.
pub fn clamp_page(page: usize, len: usize) -> usize {
    page.clamp(1, page_count(len))
}

/// The slice of `items` visible on a (clamped) 1-based page.
pub fn page_slice<T>(items: &[T], page: usize) -> &[T] {
    let page = clamp_page(page, items.len());
    let start = (page - 1) * PAGE_SIZE;
    let end = (start + PAGE_SIZE).min(items.len());
    &items[start..end.max(start)]
}

/// Absolute 1-based row number for display: offset within the page plus the
/// rows consumed by earlier pages.
pub fn row_number(page: usize, offset: usize) -> usize {
    (page - 1) * PAGE_SIZE + offset + 1
}
