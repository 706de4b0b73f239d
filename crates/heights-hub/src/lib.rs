//! Real-time market data distribution hub.
//!
//! Owns exactly one upstream feed connection per process, fans per-symbol
//! snapshots out to any number of subscribers, serves last-known values to
//! late subscribers, and masks upstream connection churn. Consumers see
//! four operations: `connect`, `subscribe`, `market_data`, and
//! `connection_state`, plus an explicit `shutdown`.

pub mod config;
pub mod error;
pub mod hub;
pub mod registry;
pub mod rest;

pub use config::HubConfig;
pub use error::{HubError, HubResult};
pub use hub::{MarketDataHub, Subscription};
pub use registry::SubscriberRegistry;
pub use rest::RestClient;

pub use heights_core::{MarketSnapshot, Price, ProductId, Symbol};
pub use heights_ws::ConnectionState;
