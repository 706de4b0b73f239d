//! Market snapshot value type.
//!
//! The latest known state for one instrument. Snapshots are immutable
//! values: the hub caches one per symbol and hands out clones, so a
//! subscriber can never mutate the cached copy.

use crate::{Price, ProductId, Symbol};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Latest known price state for one instrument.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketSnapshot {
    /// Instrument symbol (subscription key).
    pub symbol: Symbol,
    /// Upstream product id the data came from.
    pub product_id: ProductId,
    /// Current trade price.
    pub price: Price,
    /// Absolute change over the trailing 24h window (signed).
    pub change_24h: Decimal,
    /// Percentage change over the trailing 24h window (signed).
    pub change_24h_percent: Decimal,
    /// 24h high, when the feed provides it.
    pub high_24h: Option<Price>,
    /// 24h low, when the feed provides it.
    pub low_24h: Option<Price>,
    /// 24h base-currency volume, when the feed provides it.
    pub volume_24h: Option<Decimal>,
    /// Receipt time of the event this snapshot was built from.
    pub timestamp: DateTime<Utc>,
}

impl MarketSnapshot {
    /// Build a snapshot from the current price and the 24h open.
    ///
    /// Change fields are derived from the open; a zero open yields
    /// zero percent change rather than a division error.
    pub fn from_open(symbol: Symbol, price: Price, open_24h: Price) -> Self {
        let product_id = symbol.product_id();
        let change_24h = price.change_from(open_24h);
        let change_24h_percent = price.pct_from(open_24h).unwrap_or(Decimal::ZERO);
        Self {
            symbol,
            product_id,
            price,
            change_24h,
            change_24h_percent,
            high_24h: None,
            low_24h: None,
            volume_24h: None,
            timestamp: Utc::now(),
        }
    }

    /// Whether the instrument is up over the 24h window.
    pub fn is_up(&self) -> bool {
        self.change_24h.is_sign_positive() && !self.change_24h.is_zero()
    }

    /// Age of this snapshot in milliseconds.
    pub fn age_ms(&self) -> i64 {
        (Utc::now() - self.timestamp).num_milliseconds()
    }
}
