//! The user's chosen instruments, independent of filter and page.
//!
//! Keyed by symbol + source so the same symbol from two sources can coexist.
//! Insertion order is preserved because the configure screen lists the
//! selection in the order it was built.

use indexmap::IndexMap;

use crate::domain::{Instrument, InstrumentKey};

#[derive(Debug, Clone, Default)]
pub struct SelectionSet {
    entries: IndexMap<InstrumentKey, Instrument>,
}

impl SelectionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add if absent, remove if present. Returns true when the instrument is
    /// selected after the call.
    pub fn toggle(&mut self, instrument: &Instrument) -> bool {
        let key = instrument.key();
        if self.entries.shift_remove(&key).is_some() {
            false
        } else {
            self.entries.insert(key, instrument.clone());
            true
        }
    }

    pub fn add(&mut self, instrument: &Instrument) {
        self.entries.insert(instrument.key(), instrument.clone());
    }

    pub fn remove(&mut self, key: &InstrumentKey) -> Option<Instrument> {
        self.entries.shift_remove(key)
    }

    pub fn contains(&self, key: &InstrumentKey) -> bool {
        self.entries.contains_key(key)
    }

    pub fn contains_instrument(&self, instrument: &Instrument) -> bool {
        self.entries.contains_key(&instrument.key())
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Selected instruments in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Instrument> {
        self.entries.values()
    }

    pub fn to_vec(&self) -> Vec<Instrument> {
        self.entries.values().cloned().collect()
    }
}
