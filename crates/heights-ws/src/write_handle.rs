//! WebSocket write handle for sending frames.
//!
//! Provides a fire-and-forget, reconnect-safe API: the handle owns a
//! channel into the connection manager's message loop rather than the
//! socket itself, so it stays valid across reconnects.

use crate::connection::ConnectionState;
use parking_lot::RwLock;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Outbound frame to be sent via WebSocket.
#[derive(Debug)]
pub enum WsOutbound {
    /// Plain text frame (subscribe/unsubscribe requests).
    Text(String),
}

/// Error type for send operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendError {
    /// Not connected; the frame was not queued.
    NotConnected,
    /// Channel closed (connection manager shut down).
    ChannelClosed,
    /// Outbound queue is full.
    QueueFull,
}

impl std::fmt::Display for SendError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotConnected => write!(f, "not connected"),
            Self::ChannelClosed => write!(f, "channel closed"),
            Self::QueueFull => write!(f, "outbound queue full"),
        }
    }
}

impl std::error::Error for SendError {}

/// Write handle for sending frames to the upstream feed.
///
/// Cloneable and shareable across tasks. Sending never suspends;
/// frames are queued for the connection manager's message loop.
#[derive(Clone)]
pub struct WsWriteHandle {
    tx: mpsc::Sender<WsOutbound>,
    state: Arc<RwLock<ConnectionState>>,
}

impl WsWriteHandle {
    pub(crate) fn new(tx: mpsc::Sender<WsOutbound>, state: Arc<RwLock<ConnectionState>>) -> Self {
        Self { tx, state }
    }

    /// Queue a text frame for sending.
    ///
    /// Returns `SendError::NotConnected` while the connection is down;
    /// callers relying on reconnect restoration can ignore that case.
    pub fn send_text(&self, text: String) -> Result<(), SendError> {
        if !self.is_connected() {
            return Err(SendError::NotConnected);
        }
        self.tx
            .try_send(WsOutbound::Text(text))
            .map_err(|e| match e {
                mpsc::error::TrySendError::Full(_) => SendError::QueueFull,
                mpsc::error::TrySendError::Closed(_) => SendError::ChannelClosed,
            })
    }

    /// Check if the upstream connection is established.
    pub fn is_connected(&self) -> bool {
        *self.state.read() == ConnectionState::Connected && !self.tx.is_closed()
    }

    /// Current connection state.
    pub fn connection_state(&self) -> ConnectionState {
        *self.state.read()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_handle(state: ConnectionState) -> (WsWriteHandle, mpsc::Receiver<WsOutbound>) {
        let (tx, rx) = mpsc::channel(16);
        let state = Arc::new(RwLock::new(state));
        (WsWriteHandle::new(tx, state), rx)
    }

    #[test]
    fn test_send_text_when_connected() {
        let (handle, mut rx) = create_handle(ConnectionState::Connected);
        handle.send_text("frame".to_string()).unwrap();

        let WsOutbound::Text(text) = rx.try_recv().unwrap();
        assert_eq!(text, "frame");
    }

    #[test]
    fn test_send_text_when_disconnected() {
        let (handle, _rx) = create_handle(ConnectionState::Disconnected);
        let result = handle.send_text("frame".to_string());
        assert_eq!(result, Err(SendError::NotConnected));
    }

    #[test]
    fn test_send_text_channel_closed() {
        let (handle, rx) = create_handle(ConnectionState::Connected);
        drop(rx);
        let result = handle.send_text("frame".to_string());
        assert_eq!(result, Err(SendError::ChannelClosed));
    }
}
