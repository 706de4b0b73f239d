//! WebSocket client for the Heights upstream price feed.
//!
//! Provides robust connectivity with:
//! - Automatic reconnection with bounded exponential backoff
//! - Subscription restoration after reconnection
//! - Heartbeat monitoring (protocol ping/pong timeout detection)
//! - Channel-based message routing to the hub

pub mod connection;
pub mod error;
pub mod heartbeat;
pub mod message;
pub mod subscription;
pub mod write_handle;

pub use connection::{ConnectionConfig, ConnectionManager, ConnectionState};
pub use error::{WsError, WsResult};
pub use message::{ErrorMessage, FeedMessage, FeedRequest, SubscriptionsAck, TickerMessage};
pub use subscription::SubscriptionSet;
pub use write_handle::{SendError, WsOutbound, WsWriteHandle};

use std::sync::Once;

static INIT_CRYPTO: Once = Once::new();

/// Initialize the TLS crypto provider.
/// Must be called before any WebSocket connections are made.
pub fn init_crypto() {
    INIT_CRYPTO.call_once(|| {
        let _ = rustls::crypto::ring::default_provider().install_default();
    });
}
