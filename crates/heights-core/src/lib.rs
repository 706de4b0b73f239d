//! Core domain types for the Heights market data hub.
//!
//! This crate provides fundamental types used throughout the distribution layer:
//! - `Symbol`: Case-normalized instrument ticker (e.g. "BTC")
//! - `ProductId`: Upstream-feed pair identifier (e.g. "BTC-USD")
//! - `Price`: Precision-safe decimal price type
//! - `MarketSnapshot`: Immutable latest-known state for one instrument

pub mod decimal;
pub mod error;
pub mod snapshot;
pub mod symbol;

pub use decimal::Price;
pub use error::{CoreError, Result};
pub use snapshot::MarketSnapshot;
pub use symbol::{ProductId, Symbol};
