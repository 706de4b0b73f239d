//! Latest-snapshot cache.
//!
//! Holds exactly one current snapshot per symbol. A snapshot is replaced
//! wholesale, so a reader can never observe a mix of fields from two
//! different update events.

use dashmap::DashMap;
use heights_core::{MarketSnapshot, Symbol};

/// Per-symbol latest snapshot store.
#[derive(Debug, Default)]
pub struct SnapshotCache {
    snapshots: DashMap<Symbol, MarketSnapshot>,
}

impl SnapshotCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the cached snapshot for the snapshot's symbol.
    pub fn insert(&self, snapshot: MarketSnapshot) {
        self.snapshots.insert(snapshot.symbol.clone(), snapshot);
    }

    /// Get a copy of the latest snapshot for a symbol.
    pub fn get(&self, symbol: &Symbol) -> Option<MarketSnapshot> {
        self.snapshots.get(symbol).map(|entry| entry.clone())
    }

    pub fn contains(&self, symbol: &Symbol) -> bool {
        self.snapshots.contains_key(symbol)
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }
}
