//! Watcher application.

use crate::config::AppConfig;
use crate::error::AppResult;
use heights_hub::{MarketDataHub, Subscription};
use std::time::Duration;
use tracing::{info, warn};

/// Console watcher: one hub, one logging subscription per symbol.
pub struct Application {
    config: AppConfig,
    hub: MarketDataHub,
    subscriptions: Vec<Subscription>,
}

impl Application {
    pub fn new(config: AppConfig) -> AppResult<Self> {
        let hub = MarketDataHub::new(config.hub.clone())?;
        Ok(Self {
            config,
            hub,
            subscriptions: Vec::new(),
        })
    }

    /// Connect, subscribe the configured symbols, and run until Ctrl-C.
    pub async fn run(&mut self) -> AppResult<()> {
        self.hub.connect();

        for raw in &self.config.symbols {
            match self.hub.subscribe(raw, |snapshot| {
                info!(
                    symbol = %snapshot.symbol,
                    price = %snapshot.price,
                    change_24h = %snapshot.change_24h,
                    change_pct = %snapshot.change_24h_percent,
                    "Tick"
                );
            }) {
                Ok(subscription) => {
                    info!(symbol = %subscription.symbol(), "Watching");
                    self.subscriptions.push(subscription);
                }
                Err(e) => {
                    warn!(symbol = %raw, %e, "Skipping invalid symbol");
                }
            }
        }

        let mut status_interval =
            tokio::time::interval(Duration::from_secs(self.config.status_interval_secs.max(1)));
        status_interval.tick().await; // First tick fires immediately.

        loop {
            tokio::select! {
                _ = status_interval.tick() => {
                    info!(
                        state = %self.hub.connection_state(),
                        symbols = self.subscriptions.len(),
                        "Hub status"
                    );
                }
                _ = tokio::signal::ctrl_c() => {
                    info!("Shutdown signal received");
                    break;
                }
            }
        }

        self.subscriptions.clear();
        self.hub.shutdown();
        info!("Watcher stopped");
        Ok(())
    }
}
