//! Mock upstream feed server for integration tests.
//!
//! Speaks just enough of the exchange feed protocol to exercise the hub:
//! acks subscribe requests, pushes ticker frames to connected clients,
//! records received frames, and can force-drop connections to simulate
//! upstream failure.

use futures_util::{SinkExt, StreamExt};
use std::collections::VecDeque;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{broadcast, mpsc, Mutex};
use tokio_tungstenite::{accept_async, tungstenite::Message};

pub struct MockFeedServer {
    addr: SocketAddr,
    shutdown_tx: mpsc::Sender<()>,
    received: Arc<Mutex<VecDeque<String>>>,
    connections: Arc<Mutex<u32>>,
    push_tx: broadcast::Sender<String>,
    drop_tx: broadcast::Sender<()>,
}

impl MockFeedServer {
    /// Start a server on an ephemeral port.
    pub async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let received: Arc<Mutex<VecDeque<String>>> = Arc::new(Mutex::new(VecDeque::new()));
        let connections: Arc<Mutex<u32>> = Arc::new(Mutex::new(0));
        let (shutdown_tx, mut shutdown_rx) = mpsc::channel::<()>(1);
        let (push_tx, _) = broadcast::channel::<String>(64);
        let (drop_tx, _) = broadcast::channel::<()>(4);

        let received_clone = received.clone();
        let connections_clone = connections.clone();
        let push_tx_clone = push_tx.clone();
        let drop_tx_clone = drop_tx.clone();

        tokio::spawn(async move {
            loop {
                tokio::select! {
                    Ok((stream, _)) = listener.accept() => {
                        tokio::spawn(handle_connection(
                            stream,
                            received_clone.clone(),
                            connections_clone.clone(),
                            push_tx_clone.subscribe(),
                            drop_tx_clone.subscribe(),
                        ));
                    }
                    _ = shutdown_rx.recv() => break,
                }
            }
        });

        Self {
            addr,
            shutdown_tx,
            received,
            connections,
            push_tx,
            drop_tx,
        }
    }

    pub fn url(&self) -> String {
        format!("ws://{}", self.addr)
    }

    /// Total connections accepted since start (never decremented).
    pub async fn connection_count(&self) -> u32 {
        *self.connections.lock().await
    }

    pub async fn received_frames(&self) -> Vec<String> {
        self.received.lock().await.iter().cloned().collect()
    }

    pub async fn clear_received(&self) {
        self.received.lock().await.clear();
    }

    /// Push a ticker frame to every live connection.
    pub fn push_ticker(&self, product_id: &str, price: &str) {
        let frame = serde_json::json!({
            "type": "ticker",
            "product_id": product_id,
            "price": price,
            "open_24h": price,
        });
        let _ = self.push_tx.send(frame.to_string());
    }

    /// Push a raw text frame to every live connection.
    pub fn push_raw(&self, frame: &str) {
        let _ = self.push_tx.send(frame.to_string());
    }

    /// Kill every live connection without a Close handshake.
    pub fn drop_connections(&self) {
        let _ = self.drop_tx.send(());
    }

    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(()).await;
    }
}

/// Minimal HTTP stub for the stats endpoint.
///
/// Answers every request with a fixed 24h-stats JSON body.
pub struct MockStatsServer {
    addr: SocketAddr,
    shutdown_tx: mpsc::Sender<()>,
}

impl MockStatsServer {
    pub async fn start(last: &str) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (shutdown_tx, mut shutdown_rx) = mpsc::channel::<()>(1);
        let body = format!(r#"{{"last":"{last}","open":"{last}"}}"#);

        tokio::spawn(async move {
            loop {
                tokio::select! {
                    Ok((mut stream, _)) = listener.accept() => {
                        let body = body.clone();
                        tokio::spawn(async move {
                            let mut buf = [0u8; 1024];
                            let _ = stream.read(&mut buf).await;
                            let response = format!(
                                "HTTP/1.1 200 OK\r\n\
                                 content-type: application/json\r\n\
                                 content-length: {}\r\n\
                                 connection: close\r\n\r\n{}",
                                body.len(),
                                body,
                            );
                            let _ = stream.write_all(response.as_bytes()).await;
                        });
                    }
                    _ = shutdown_rx.recv() => break,
                }
            }
        });

        Self { addr, shutdown_tx }
    }

    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(()).await;
    }
}

async fn handle_connection(
    stream: TcpStream,
    received: Arc<Mutex<VecDeque<String>>>,
    connections: Arc<Mutex<u32>>,
    mut push_rx: broadcast::Receiver<String>,
    mut drop_rx: broadcast::Receiver<()>,
) {
    {
        let mut count = connections.lock().await;
        *count += 1;
    }

    let ws_stream = match accept_async(stream).await {
        Ok(ws) => ws,
        Err(e) => {
            eprintln!("WebSocket handshake failed: {e}");
            return;
        }
    };

    let (mut write, mut read) = ws_stream.split();

    loop {
        tokio::select! {
            msg = read.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        received.lock().await.push_back(text.clone());

                        // Ack subscribe/unsubscribe requests the way the
                        // exchange does: echo the channel list back.
                        if let Ok(parsed) = serde_json::from_str::<serde_json::Value>(&text) {
                            let kind = parsed.get("type").and_then(|t| t.as_str());
                            if kind == Some("subscribe") || kind == Some("unsubscribe") {
                                let ack = serde_json::json!({
                                    "type": "subscriptions",
                                    "channels": parsed.get("channels").cloned()
                                        .unwrap_or(serde_json::Value::Null),
                                });
                                let _ = write.send(Message::Text(ack.to_string())).await;
                            }
                        }
                    }
                    Some(Ok(Message::Ping(data))) => {
                        let _ = write.send(Message::Pong(data)).await;
                    }
                    Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                    _ => {}
                }
            }
            frame = push_rx.recv() => {
                let Ok(frame) = frame else { break };
                if write.send(Message::Text(frame)).await.is_err() {
                    break;
                }
            }
            result = drop_rx.recv() => {
                if result.is_ok() {
                    // Drop without a Close frame: simulates an upstream crash.
                    return;
                }
                break;
            }
        }
    }
}
