//! The market data hub.
//!
//! One hub instance owns the upstream connection and the subscriber
//! registry for its whole lifetime. UI components attach and detach;
//! they never own the connection. The hub is an explicitly constructed
//! object with `connect`/`shutdown` lifecycle calls, so tests can build
//! isolated instances.

use crate::config::HubConfig;
use crate::error::HubResult;
use crate::registry::{SubscriberRegistry, UpdateFn};
use crate::rest::RestClient;
use heights_core::{MarketSnapshot, Symbol};
use heights_feed::{SnapshotCache, TickerParser};
use heights_ws::{
    ConnectionManager, ConnectionState, FeedMessage, FeedRequest, SendError, SubscriptionSet,
    TickerMessage, WsWriteHandle,
};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

struct HubInner {
    config: HubConfig,
    registry: SubscriberRegistry,
    cache: SnapshotCache,
    parser: TickerParser,
    subscriptions: Arc<SubscriptionSet>,
    connection: Arc<ConnectionManager>,
    write: WsWriteHandle,
    rest: RestClient,
    shutdown_token: CancellationToken,
    started: AtomicBool,
}

impl HubInner {
    /// Ingest one upstream ticker event: replace the cached snapshot,
    /// then fan out to every subscriber of that symbol.
    ///
    /// Malformed events are dropped with a warning and never disturb
    /// other symbols' delivery.
    fn ingest_ticker(&self, ticker: &TickerMessage) {
        let snapshot = match self.parser.parse(ticker) {
            Ok(snapshot) => snapshot,
            Err(e) => {
                warn!(product_id = %ticker.product_id, %e, "Dropping malformed ticker");
                return;
            }
        };

        self.cache.insert(snapshot.clone());
        let delivered = self.registry.dispatch(&snapshot);
        debug!(symbol = %snapshot.symbol, delivered, "Snapshot dispatched");
    }

    /// Ensure upstream delivery is active for a symbol.
    fn activate_upstream(&self, symbol: &Symbol) {
        let product = symbol.product_id();
        if !self.subscriptions.add(product.clone()) {
            return;
        }

        let request = FeedRequest::subscribe_ticker(vec![product.as_str().to_string()]);
        self.send_request(&request);
    }

    /// Drop upstream delivery for a symbol with no remaining consumers.
    ///
    /// Only done when configured; by default idle symbols stay warm so a
    /// returning view gets an immediate cache hit.
    fn deactivate_upstream(&self, symbol: &Symbol) {
        if !self.config.unsubscribe_idle_symbols {
            return;
        }

        let product = symbol.product_id();
        if !self.subscriptions.remove(&product) {
            return;
        }

        let request = FeedRequest::unsubscribe_ticker(vec![product.as_str().to_string()]);
        self.send_request(&request);
    }

    fn send_request(&self, request: &FeedRequest) {
        let frame = match serde_json::to_string(request) {
            Ok(frame) => frame,
            Err(e) => {
                warn!(?e, "Failed to encode feed request");
                return;
            }
        };

        match self.write.send_text(frame) {
            Ok(()) => {}
            // Not connected: the reconnect path replays the subscription set.
            Err(SendError::NotConnected) => {
                debug!("Feed request deferred until (re)connect");
            }
            Err(e) => {
                warn!(%e, "Failed to queue feed request");
            }
        }
    }
}

/// Real-time market data hub.
///
/// Cheap to share: wraps its state in an `Arc` internally.
pub struct MarketDataHub {
    inner: Arc<HubInner>,
    message_rx: Mutex<Option<mpsc::Receiver<FeedMessage>>>,
}

impl MarketDataHub {
    /// Create a hub. No network activity happens until `connect`.
    pub fn new(config: HubConfig) -> HubResult<Self> {
        let subscriptions = Arc::new(SubscriptionSet::new());
        let (message_tx, message_rx) = mpsc::channel(1024);
        let connection = Arc::new(ConnectionManager::new(
            config.connection_config(),
            subscriptions.clone(),
            message_tx,
        ));
        let write = connection.write_handle();
        let rest = RestClient::new(
            config.rest_url.clone(),
            Duration::from_millis(config.rest_timeout_ms),
        )?;

        Ok(Self {
            inner: Arc::new(HubInner {
                config,
                registry: SubscriberRegistry::new(),
                cache: SnapshotCache::new(),
                parser: TickerParser::new(),
                subscriptions,
                connection,
                write,
                rest,
                shutdown_token: CancellationToken::new(),
                started: AtomicBool::new(false),
            }),
            message_rx: Mutex::new(Some(message_rx)),
        })
    }

    /// Establish the upstream connection. Idempotent: repeated calls
    /// (e.g. from multiple mounted views) never create a second socket.
    /// Returns immediately; the connection is driven by background tasks.
    pub fn connect(&self) {
        if self.inner.started.swap(true, Ordering::SeqCst) {
            debug!("Hub already connected");
            return;
        }

        heights_ws::init_crypto();

        let Some(mut rx) = self.message_rx.lock().take() else {
            return;
        };

        let connection = self.inner.connection.clone();
        tokio::spawn(async move {
            if let Err(e) = connection.connect().await {
                warn!(%e, "Upstream connection loop ended");
            }
        });

        let inner = self.inner.clone();
        let token = self.inner.shutdown_token.clone();
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    () = token.cancelled() => break,
                    msg = rx.recv() => match msg {
                        Some(FeedMessage::Ticker(ticker)) => inner.ingest_ticker(&ticker),
                        Some(_) => {}
                        None => break,
                    }
                }
            }
            debug!("Hub dispatch loop exited");
        });
    }

    /// Register a callback for a symbol's snapshot stream.
    ///
    /// If a snapshot is already cached the callback is invoked with it
    /// immediately, so a newly mounted view is never left blank waiting
    /// for the next tick. Delivery is at-least-once: an update landing
    /// while the subscription is being installed can reach the callback
    /// both as live dispatch and as the cached replay, but a stale
    /// snapshot is never delivered after a fresher one. Callbacks must
    /// be fast and must not call back into the hub.
    ///
    /// Errs only on a malformed symbol (a caller bug); an unknown but
    /// well-formed symbol is accepted and simply never ticks.
    pub fn subscribe<F>(&self, symbol: &str, on_update: F) -> HubResult<Subscription>
    where
        F: Fn(MarketSnapshot) + Send + Sync + 'static,
    {
        let symbol = Symbol::parse(symbol)?;
        let callback: Arc<UpdateFn> = Arc::new(on_update);

        let (id, first) = self.inner.registry.register(symbol.clone(), callback.clone());
        if first {
            self.inner.activate_upstream(&symbol);
        }

        if let Some(snapshot) = self.inner.cache.get(&symbol) {
            callback(snapshot);
        }

        Ok(Subscription {
            inner: self.inner.clone(),
            symbol,
            id,
            active: AtomicBool::new(true),
        })
    }

    /// One-shot snapshot fetch.
    ///
    /// While the feed is live (or churning through a reconnect) a cached
    /// snapshot is served as-is. Once the connection has settled at
    /// `Disconnected` the cache only goes staler, so every call performs
    /// a bounded-timeout REST fetch and falls back to the cached value
    /// only when that fetch fails. Resolves to `Ok(None)`, never an
    /// error, for a well-formed symbol with no data anywhere.
    pub async fn market_data(&self, symbol: &str) -> HubResult<Option<MarketSnapshot>> {
        let symbol = Symbol::parse(symbol)?;

        let cached = self.inner.cache.get(&symbol);
        let live = self.connection_state() != ConnectionState::Disconnected;
        if live {
            if let Some(snapshot) = &cached {
                return Ok(Some(snapshot.clone()));
            }
        }

        match self.inner.rest.fetch_snapshot(&symbol.product_id()).await {
            Ok(Some(snapshot)) => {
                self.inner.cache.insert(snapshot.clone());
                Ok(Some(snapshot))
            }
            Ok(None) => Ok(cached),
            Err(e) => {
                warn!(%symbol, %e, "REST fallback failed");
                Ok(cached)
            }
        }
    }

    /// Synchronous read of the process-wide connection state.
    pub fn connection_state(&self) -> ConnectionState {
        self.inner.connection.state()
    }

    /// Tear the hub down: closes the upstream connection and stops the
    /// dispatch loop. Subscriptions become inert but stay safe to drop.
    pub fn shutdown(&self) {
        self.inner.connection.shutdown();
        self.inner.shutdown_token.cancel();
    }
}

/// Handle for one (symbol, callback) registration.
///
/// Unsubscribes on `Drop`; `unsubscribe` may also be called explicitly
/// and is idempotent.
pub struct Subscription {
    inner: Arc<HubInner>,
    symbol: Symbol,
    id: u64,
    active: AtomicBool,
}

impl Subscription {
    /// Remove exactly this registration. Takes effect before returning:
    /// the callback can never be invoked afterwards. Calling this more
    /// than once is a no-op.
    pub fn unsubscribe(&self) {
        if !self.active.swap(false, Ordering::SeqCst) {
            return;
        }

        let outcome = self.inner.registry.remove(&self.symbol, self.id);
        if outcome.last_for_symbol {
            self.inner.deactivate_upstream(&self.symbol);
        }
    }

    pub fn symbol(&self) -> &Symbol {
        &self.symbol
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use heights_core::ProductId;
    use parking_lot::Mutex;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn test_config() -> HubConfig {
        HubConfig {
            feed_url: "ws://127.0.0.1:1".to_string(),
            // Unroutable: the REST fallback must fail fast, not hang.
            rest_url: "http://127.0.0.1:9".to_string(),
            rest_timeout_ms: 200,
            ..Default::default()
        }
    }

    fn hub() -> MarketDataHub {
        MarketDataHub::new(test_config()).unwrap()
    }

    fn ticker(product_id: &str, price: &str, open: Option<&str>) -> TickerMessage {
        TickerMessage {
            product_id: product_id.to_string(),
            price: price.to_string(),
            open_24h: open.map(str::to_string),
            high_24h: None,
            low_24h: None,
            volume_24h: None,
            time: None,
            sequence: None,
        }
    }

    fn recording_callback() -> (Arc<Mutex<Vec<Decimal>>>, impl Fn(MarketSnapshot) + Send + Sync) {
        let prices = Arc::new(Mutex::new(Vec::new()));
        let prices_clone = prices.clone();
        let callback = move |snapshot: MarketSnapshot| {
            prices_clone.lock().push(snapshot.price.inner());
        };
        (prices, callback)
    }

    #[test]
    fn test_fan_out_reaches_every_subscriber() {
        let hub = hub();
        let mut recordings = Vec::new();
        let mut subs = Vec::new();
        for _ in 0..3 {
            let (prices, callback) = recording_callback();
            subs.push(hub.subscribe("BTC", callback).unwrap());
            recordings.push(prices);
        }

        hub.inner.ingest_ticker(&ticker("BTC-USD", "65000", None));

        for prices in &recordings {
            assert_eq!(prices.lock().as_slice(), &[dec!(65000)]);
        }
    }

    #[test]
    fn test_end_to_end_synthetic_scenario() {
        let hub = hub();
        let (btc_prices, btc_callback) = recording_callback();
        let (eth_prices, eth_callback) = recording_callback();
        let _btc = hub.subscribe("BTC", btc_callback).unwrap();
        let _eth = hub.subscribe("ETH", eth_callback).unwrap();

        hub.inner
            .ingest_ticker(&ticker("BTC-USD", "65000", Some("63414.63414634146341463415")));
        assert_eq!(btc_prices.lock().as_slice(), &[dec!(65000)]);
        assert!(eth_prices.lock().is_empty(), "ETH callback must not fire");

        hub.inner
            .ingest_ticker(&ticker("ETH-USD", "3200", Some("3235.59")));
        assert_eq!(eth_prices.lock().as_slice(), &[dec!(3200)]);
        assert_eq!(btc_prices.lock().len(), 1, "BTC callback must not re-fire");

        let eth = hub.inner.cache.get(&Symbol::parse("ETH").unwrap()).unwrap();
        assert!(eth.change_24h_percent < dec!(0));
    }

    #[test]
    fn test_per_symbol_ordering_preserved() {
        let hub = hub();
        let (prices, callback) = recording_callback();
        let _sub = hub.subscribe("BTC", callback).unwrap();

        hub.inner.ingest_ticker(&ticker("BTC-USD", "65000", None));
        hub.inner.ingest_ticker(&ticker("BTC-USD", "65100", None));
        hub.inner.ingest_ticker(&ticker("BTC-USD", "65050", None));

        assert_eq!(
            prices.lock().as_slice(),
            &[dec!(65000), dec!(65100), dec!(65050)]
        );
    }

    #[tokio::test]
    async fn test_cache_coherence_after_updates() {
        let hub = hub();
        hub.inner
            .ingest_ticker(&ticker("BTC-USD", "65000", Some("63000")));
        hub.inner
            .ingest_ticker(&ticker("BTC-USD", "66000", Some("63000")));

        let snap = hub.market_data("btc").await.unwrap().unwrap();
        assert_eq!(snap.price.inner(), dec!(66000));
        assert_eq!(snap.change_24h, dec!(3000));
    }

    #[test]
    fn test_unsubscribe_is_idempotent_and_isolated() {
        let hub = hub();
        let (btc_prices, btc_callback) = recording_callback();
        let (eth_prices, eth_callback) = recording_callback();
        let btc_sub = hub.subscribe("BTC", btc_callback).unwrap();
        let _eth_sub = hub.subscribe("ETH", eth_callback).unwrap();

        btc_sub.unsubscribe();
        btc_sub.unsubscribe();

        hub.inner.ingest_ticker(&ticker("BTC-USD", "65000", None));
        hub.inner.ingest_ticker(&ticker("ETH-USD", "3200", None));

        assert!(btc_prices.lock().is_empty());
        assert_eq!(eth_prices.lock().as_slice(), &[dec!(3200)]);
    }

    #[test]
    fn test_drop_unsubscribes() {
        let hub = hub();
        let (prices, callback) = recording_callback();
        drop(hub.subscribe("BTC", callback).unwrap());

        hub.inner.ingest_ticker(&ticker("BTC-USD", "65000", None));
        assert!(prices.lock().is_empty());
    }

    #[test]
    fn test_late_subscriber_gets_cached_snapshot() {
        let hub = hub();
        hub.inner.ingest_ticker(&ticker("BTC-USD", "65000", None));

        let (prices, callback) = recording_callback();
        let _sub = hub.subscribe("btc", callback).unwrap();
        assert_eq!(prices.lock().as_slice(), &[dec!(65000)]);
    }

    #[test]
    fn test_first_subscription_activates_upstream() {
        let hub = hub();
        let product = ProductId::parse("BTC-USD").unwrap();
        assert!(!hub.inner.subscriptions.contains(&product));

        let _sub = hub.subscribe("BTC", |_| {}).unwrap();
        assert!(hub.inner.subscriptions.contains(&product));
    }

    #[test]
    fn test_idle_symbol_stays_warm_by_default() {
        let hub = hub();
        let product = ProductId::parse("BTC-USD").unwrap();
        let sub = hub.subscribe("BTC", |_| {}).unwrap();
        sub.unsubscribe();
        assert!(hub.inner.subscriptions.contains(&product));
    }

    #[test]
    fn test_idle_symbol_dropped_when_configured() {
        let config = HubConfig {
            unsubscribe_idle_symbols: true,
            ..test_config()
        };
        let hub = MarketDataHub::new(config).unwrap();
        let product = ProductId::parse("BTC-USD").unwrap();

        let first = hub.subscribe("BTC", |_| {}).unwrap();
        let second = hub.subscribe("BTC", |_| {}).unwrap();

        first.unsubscribe();
        assert!(
            hub.inner.subscriptions.contains(&product),
            "one consumer remains"
        );

        second.unsubscribe();
        assert!(!hub.inner.subscriptions.contains(&product));
    }

    #[test]
    fn test_malformed_ticker_does_not_disturb_delivery() {
        let hub = hub();
        let (prices, callback) = recording_callback();
        let _sub = hub.subscribe("BTC", callback).unwrap();

        hub.inner.ingest_ticker(&ticker("BTC-USD", "garbage", None));
        hub.inner.ingest_ticker(&ticker("BTC-USD", "-5", None));
        hub.inner.ingest_ticker(&ticker("BTC-USD", "65000", None));

        assert_eq!(prices.lock().as_slice(), &[dec!(65000)]);
    }

    #[test]
    fn test_subscribe_rejects_malformed_symbol() {
        let hub = hub();
        assert!(hub.subscribe("", |_| {}).is_err());
        assert!(hub.subscribe("BTC-USD", |_| {}).is_err());
    }

    #[tokio::test]
    async fn test_market_data_disconnected_serves_cache_when_rest_unreachable() {
        // Degraded mode with no reachable REST endpoint: the last-known
        // snapshot is still better than nothing.
        let hub = hub();
        hub.inner.ingest_ticker(&ticker("BTC-USD", "65000", None));
        assert_eq!(hub.connection_state(), ConnectionState::Disconnected);

        let snap = hub.market_data("BTC").await.unwrap().unwrap();
        assert_eq!(snap.price.inner(), dec!(65000));
    }

    #[tokio::test]
    async fn test_market_data_rejects_malformed_symbol() {
        let hub = hub();
        assert!(hub.market_data("not a symbol").await.is_err());
    }

    #[tokio::test]
    async fn test_market_data_unknown_symbol_resolves_none() {
        let hub = hub();
        let started = std::time::Instant::now();
        let result = hub.market_data("DOESNOTEXIST").await.unwrap();
        assert!(result.is_none());
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[test]
    fn test_initial_connection_state() {
        let hub = hub();
        assert_eq!(hub.connection_state(), ConnectionState::Disconnected);
    }
}
