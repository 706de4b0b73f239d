//! Wire types for the upstream exchange feed.
//!
//! The feed speaks JSON frames tagged by a `type` field. Outbound frames
//! subscribe or unsubscribe the `ticker` channel for a set of product ids;
//! inbound frames are ticker events, subscription acks, and errors.
//!
//! Numeric fields arrive as strings and are kept raw here; parsing and
//! validation happen at the ingestion boundary in `heights-feed`.

use serde::{Deserialize, Serialize};

/// Channel entry in a subscribe/unsubscribe request.
#[derive(Debug, Clone, Serialize)]
pub struct ChannelRequest {
    pub name: String,
    pub product_ids: Vec<String>,
}

/// Outbound request frame.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum FeedRequest {
    Subscribe { channels: Vec<ChannelRequest> },
    Unsubscribe { channels: Vec<ChannelRequest> },
}

impl FeedRequest {
    /// Build a ticker-channel subscribe request.
    pub fn subscribe_ticker(product_ids: Vec<String>) -> Self {
        Self::Subscribe {
            channels: vec![ChannelRequest {
                name: "ticker".to_string(),
                product_ids,
            }],
        }
    }

    /// Build a ticker-channel unsubscribe request.
    pub fn unsubscribe_ticker(product_ids: Vec<String>) -> Self {
        Self::Unsubscribe {
            channels: vec![ChannelRequest {
                name: "ticker".to_string(),
                product_ids,
            }],
        }
    }
}

/// Raw ticker event from the feed.
///
/// Only `product_id` and `price` are required; the 24h stats are
/// best-effort extras some feed variants omit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickerMessage {
    pub product_id: String,
    pub price: String,
    #[serde(default)]
    pub open_24h: Option<String>,
    #[serde(default)]
    pub high_24h: Option<String>,
    #[serde(default)]
    pub low_24h: Option<String>,
    #[serde(default)]
    pub volume_24h: Option<String>,
    #[serde(default)]
    pub time: Option<String>,
    #[serde(default)]
    pub sequence: Option<u64>,
}

/// Acknowledgement listing the channels now active on this connection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubscriptionsAck {
    #[serde(default)]
    pub channels: serde_json::Value,
}

/// Error frame from the feed (e.g. unknown product id).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorMessage {
    pub message: String,
    #[serde(default)]
    pub reason: Option<String>,
}

/// Inbound frame, tagged by `type`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FeedMessage {
    Ticker(TickerMessage),
    Subscriptions(SubscriptionsAck),
    Error(ErrorMessage),
    /// Frame types this layer does not care about (heartbeats, l2 data).
    #[serde(other)]
    Unknown,
}
