//! Ticker ingestion for the Heights market data hub.
//!
//! Turns raw upstream ticker frames into validated `MarketSnapshot`s and
//! keeps the latest snapshot per symbol in an atomically-replaced cache.

pub mod cache;
pub mod error;
pub mod parser;

pub use cache::SnapshotCache;
pub use error::{FeedError, FeedResult};
pub use parser::TickerParser;
