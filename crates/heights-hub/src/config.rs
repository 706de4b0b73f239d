//! Hub configuration.

use heights_ws::ConnectionConfig;
use serde::{Deserialize, Serialize};

/// Configuration for the market data hub.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HubConfig {
    /// Upstream WebSocket feed URL.
    #[serde(default = "default_feed_url")]
    pub feed_url: String,
    /// REST base URL for one-shot snapshot fetches.
    #[serde(default = "default_rest_url")]
    pub rest_url: String,
    /// Timeout applied to every REST fetch (ms).
    #[serde(default = "default_rest_timeout_ms")]
    pub rest_timeout_ms: u64,
    /// Send an upstream unsubscribe when the last consumer for a symbol
    /// detaches. Off by default: keeping the stream warm means a returning
    /// view gets a fresh cache hit instead of a cold start.
    #[serde(default)]
    pub unsubscribe_idle_symbols: bool,
    /// Maximum reconnection attempts (0 = infinite).
    #[serde(default)]
    pub max_reconnect_attempts: u32,
    /// Base delay for reconnect backoff (ms).
    #[serde(default = "default_reconnect_base_delay_ms")]
    pub reconnect_base_delay_ms: u64,
    /// Maximum delay for reconnect backoff (ms).
    #[serde(default = "default_reconnect_max_delay_ms")]
    pub reconnect_max_delay_ms: u64,
    /// Heartbeat interval (ms).
    #[serde(default = "default_heartbeat_interval_ms")]
    pub heartbeat_interval_ms: u64,
    /// Heartbeat timeout (ms).
    #[serde(default = "default_heartbeat_timeout_ms")]
    pub heartbeat_timeout_ms: u64,
}

fn default_feed_url() -> String {
    "wss://ws-feed.exchange.coinbase.com".to_string()
}

fn default_rest_url() -> String {
    "https://api.exchange.coinbase.com".to_string()
}

fn default_rest_timeout_ms() -> u64 {
    5_000
}

fn default_reconnect_base_delay_ms() -> u64 {
    1_000
}

fn default_reconnect_max_delay_ms() -> u64 {
    60_000
}

fn default_heartbeat_interval_ms() -> u64 {
    30_000
}

fn default_heartbeat_timeout_ms() -> u64 {
    10_000
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            feed_url: default_feed_url(),
            rest_url: default_rest_url(),
            rest_timeout_ms: default_rest_timeout_ms(),
            unsubscribe_idle_symbols: false,
            max_reconnect_attempts: 0,
            reconnect_base_delay_ms: default_reconnect_base_delay_ms(),
            reconnect_max_delay_ms: default_reconnect_max_delay_ms(),
            heartbeat_interval_ms: default_heartbeat_interval_ms(),
            heartbeat_timeout_ms: default_heartbeat_timeout_ms(),
        }
    }
}

impl HubConfig {
    /// Build the connection-layer config from hub settings.
    pub fn connection_config(&self) -> ConnectionConfig {
        ConnectionConfig {
            url: self.feed_url.clone(),
            max_reconnect_attempts: self.max_reconnect_attempts,
            reconnect_base_delay_ms: self.reconnect_base_delay_ms,
            reconnect_max_delay_ms: self.reconnect_max_delay_ms,
            heartbeat_interval_ms: self.heartbeat_interval_ms,
            heartbeat_timeout_ms: self.heartbeat_timeout_ms,
        }
    }
}
