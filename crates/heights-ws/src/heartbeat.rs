//! Heartbeat management for WebSocket connections.
//!
//! Monitors connection health by tracking ping/pong timing and
//! message activity. A busy ticker stream counts as activity, so
//! pings are only sent when the feed goes quiet.

use parking_lot::RwLock;
use std::time::{Duration, Instant};
use tracing::debug;

/// Heartbeat manager for WebSocket connection health.
pub struct HeartbeatManager {
    /// How often to send a ping when the connection is quiet.
    interval: Duration,
    /// How long to wait for a pong before declaring the connection dead.
    timeout: Duration,
    /// Last ping sent time.
    last_ping: RwLock<Option<Instant>>,
    /// Last message received time (any frame).
    last_message: RwLock<Instant>,
    /// Whether we are waiting for a pong.
    waiting_for_pong: RwLock<bool>,
}

impl HeartbeatManager {
    pub fn new(interval_ms: u64, timeout_ms: u64) -> Self {
        Self {
            interval: Duration::from_millis(interval_ms),
            timeout: Duration::from_millis(timeout_ms),
            last_ping: RwLock::new(None),
            last_message: RwLock::new(Instant::now()),
            waiting_for_pong: RwLock::new(false),
        }
    }

    /// Reset heartbeat state (called on connection).
    pub fn reset(&self) {
        *self.last_ping.write() = None;
        *self.last_message.write() = Instant::now();
        *self.waiting_for_pong.write() = false;
    }

    /// Record that a ping was sent.
    pub fn record_ping(&self) {
        *self.last_ping.write() = Some(Instant::now());
        *self.waiting_for_pong.write() = true;
    }

    /// Record that a pong was received.
    pub fn record_pong(&self) {
        *self.waiting_for_pong.write() = false;
        if let Some(ping_time) = *self.last_ping.read() {
            debug!(rtt_ms = ping_time.elapsed().as_millis(), "Received pong");
        }
    }

    /// Record that any message was received.
    pub fn record_message(&self) {
        *self.last_message.write() = Instant::now();
    }

    /// Check if an outstanding ping has timed out.
    pub fn is_timed_out(&self) -> bool {
        if !*self.waiting_for_pong.read() {
            return false;
        }
        self.last_ping
            .read()
            .map(|t| t.elapsed() > self.timeout)
            .unwrap_or(false)
    }

    /// Check if we should send a ping (quiet feed, no pong outstanding).
    pub fn should_send_heartbeat(&self) -> bool {
        if *self.waiting_for_pong.read() {
            return false;
        }
        self.last_message.read().elapsed() >= self.interval
    }

    /// Wait for the next heartbeat check.
    pub async fn wait_for_check(&self) {
        tokio::time::sleep(self.interval / 2).await;
    }
}
