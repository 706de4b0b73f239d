//! Ticker parsing.
//!
//! The ingestion boundary of the hub: raw ticker frames (string-encoded
//! numbers, optional 24h stats) become validated `MarketSnapshot`s here.
//! Anything malformed — unparsable price, negative price, bad product id —
//! is rejected so it can be dropped with a warning upstream, never cached
//! and never delivered to subscribers.

use crate::error::{FeedError, FeedResult};
use heights_core::{MarketSnapshot, Price, ProductId};
use heights_ws::TickerMessage;
use rust_decimal::Decimal;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;

/// Counters for accepted/rejected ticker frames.
#[derive(Debug, Default)]
pub struct ParseStats {
    accepted_count: AtomicU64,
    rejected_count: AtomicU64,
}

impl ParseStats {
    pub fn accepted(&self) -> u64 {
        self.accepted_count.load(Ordering::Relaxed)
    }

    pub fn rejected(&self) -> u64 {
        self.rejected_count.load(Ordering::Relaxed)
    }
}

/// Parser for upstream ticker frames.
#[derive(Debug, Default)]
pub struct TickerParser {
    stats: ParseStats,
}

impl TickerParser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stats(&self) -> &ParseStats {
        &self.stats
    }

    /// Parse a ticker frame into a market snapshot.
    ///
    /// The snapshot timestamp is receipt time, not the exchange event time.
    pub fn parse(&self, ticker: &TickerMessage) -> FeedResult<MarketSnapshot> {
        let result = self.parse_inner(ticker);
        match &result {
            Ok(snapshot) => {
                self.stats.accepted_count.fetch_add(1, Ordering::Relaxed);
                debug!(symbol = %snapshot.symbol, price = %snapshot.price, "Parsed ticker");
            }
            Err(_) => {
                self.stats.rejected_count.fetch_add(1, Ordering::Relaxed);
            }
        }
        result
    }

    fn parse_inner(&self, ticker: &TickerMessage) -> FeedResult<MarketSnapshot> {
        let product_id = ProductId::parse(&ticker.product_id)?;
        let symbol = product_id.symbol()?;

        let price: Price = ticker.price.parse().map_err(|e| {
            FeedError::MalformedTicker(format!("bad price {:?}: {e}", ticker.price))
        })?;

        // Missing open means no 24h stats yet; change fields stay zero.
        let open_24h = match &ticker.open_24h {
            Some(raw) => raw.parse().map_err(|e| {
                FeedError::MalformedTicker(format!("bad open_24h {raw:?}: {e}"))
            })?,
            None => price,
        };

        let mut snapshot = MarketSnapshot::from_open(symbol, price, open_24h);
        snapshot.high_24h = parse_optional_price("high_24h", &ticker.high_24h)?;
        snapshot.low_24h = parse_optional_price("low_24h", &ticker.low_24h)?;
        snapshot.volume_24h = parse_optional_decimal("volume_24h", &ticker.volume_24h)?;

        Ok(snapshot)
    }
}

fn parse_optional_price(field: &str, raw: &Option<String>) -> FeedResult<Option<Price>> {
    match raw {
        Some(raw) => raw
            .parse()
            .map(Some)
            .map_err(|e| FeedError::MalformedTicker(format!("bad {field} {raw:?}: {e}"))),
        None => Ok(None),
    }
}

fn parse_optional_decimal(field: &str, raw: &Option<String>) -> FeedResult<Option<Decimal>> {
    match raw {
        Some(raw) => raw
            .parse()
            .map(Some)
            .map_err(|e| FeedError::MalformedTicker(format!("bad {field} {raw:?}: {e}"))),
        None => Ok(None),
    }
}
