//! Upstream subscription tracking.
//!
//! The hub registers the product ids that currently have at least one
//! live consumer; the connection manager replays this set after every
//! (re)connect so consumer subscriptions survive reconnects transparently.

use heights_core::ProductId;
use parking_lot::RwLock;
use std::collections::BTreeSet;

/// Set of product ids that must be live on the upstream feed.
///
/// Shared between the hub (which mutates it as consumers come and go)
/// and the connection manager (which replays it on reconnect).
#[derive(Debug, Default)]
pub struct SubscriptionSet {
    products: RwLock<BTreeSet<ProductId>>,
}

impl SubscriptionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a product id. Returns true if it was not already present.
    pub fn add(&self, product: ProductId) -> bool {
        self.products.write().insert(product)
    }

    /// Remove a product id. Returns true if it was present.
    pub fn remove(&self, product: &ProductId) -> bool {
        self.products.write().remove(product)
    }

    pub fn contains(&self, product: &ProductId) -> bool {
        self.products.read().contains(product)
    }

    /// Snapshot of the active product ids, in stable order.
    pub fn active(&self) -> Vec<ProductId> {
        self.products.read().iter().cloned().collect()
    }

    pub fn is_empty(&self) -> bool {
        self.products.read().is_empty()
    }

    pub fn len(&self) -> usize {
        self.products.read().len()
    }
}
