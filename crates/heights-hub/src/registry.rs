//! Subscriber registry.
//!
//! Maps symbols to callback handles and fans one snapshot out to every
//! callback registered for that symbol. Removal takes effect under the
//! same lock that dispatch holds, so once `remove` returns, the removed
//! callback can no longer be invoked.

use heights_core::{MarketSnapshot, Symbol};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

/// Subscriber callback. Receives each snapshot by value.
pub type UpdateFn = dyn Fn(MarketSnapshot) + Send + Sync;

/// Outcome of removing a registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RemoveOutcome {
    /// Whether the registration was present and got removed.
    pub removed: bool,
    /// Whether this was the last registration for the symbol.
    pub last_for_symbol: bool,
}

#[derive(Default)]
struct RegistryInner {
    next_id: u64,
    by_symbol: HashMap<Symbol, HashMap<u64, Arc<UpdateFn>>>,
}

/// Registry of `symbol -> callback handles`.
#[derive(Default)]
pub struct SubscriberRegistry {
    inner: RwLock<RegistryInner>,
}

impl SubscriberRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a callback for a symbol.
    ///
    /// Returns the registration id and whether this was the first
    /// registration for the symbol.
    pub fn register(&self, symbol: Symbol, callback: Arc<UpdateFn>) -> (u64, bool) {
        let mut inner = self.inner.write();
        inner.next_id += 1;
        let id = inner.next_id;
        let callbacks = inner.by_symbol.entry(symbol).or_default();
        let first = callbacks.is_empty();
        callbacks.insert(id, callback);
        (id, first)
    }

    /// Remove a registration. Removing an already-removed id is a no-op.
    pub fn remove(&self, symbol: &Symbol, id: u64) -> RemoveOutcome {
        let mut inner = self.inner.write();
        let Some(callbacks) = inner.by_symbol.get_mut(symbol) else {
            return RemoveOutcome {
                removed: false,
                last_for_symbol: false,
            };
        };

        let removed = callbacks.remove(&id).is_some();
        let last_for_symbol = removed && callbacks.is_empty();
        if last_for_symbol {
            inner.by_symbol.remove(symbol);
        }

        RemoveOutcome {
            removed,
            last_for_symbol,
        }
    }

    /// Invoke every callback registered for the snapshot's symbol.
    ///
    /// Callbacks run under the registry's read lock: an `unsubscribe` that
    /// has returned is guaranteed to never see another invocation.
    /// Callbacks must therefore not call back into the registry.
    ///
    /// Returns the number of callbacks invoked.
    pub fn dispatch(&self, snapshot: &MarketSnapshot) -> usize {
        let inner = self.inner.read();
        let Some(callbacks) = inner.by_symbol.get(&snapshot.symbol) else {
            return 0;
        };
        for callback in callbacks.values() {
            callback(snapshot.clone());
        }
        callbacks.len()
    }

    /// Number of registrations for a symbol.
    pub fn count(&self, symbol: &Symbol) -> usize {
        self.inner
            .read()
            .by_symbol
            .get(symbol)
            .map(|c| c.len())
            .unwrap_or(0)
    }
}
