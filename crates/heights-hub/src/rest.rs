//! One-shot REST snapshot fetches.
//!
//! Cold-start and degraded-mode fallback for `market_data`: when no cached
//! snapshot exists, a single bounded-timeout stats request fills the gap.
//! The client-level timeout guarantees a hung upstream call cannot hang the
//! caller.

use crate::error::{HubError, HubResult};
use heights_core::{MarketSnapshot, Price, ProductId};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info};

/// 24h stats response for one product.
///
/// Numeric fields arrive as strings; `last` is the current trade price.
#[derive(Debug, Deserialize)]
struct StatsResponse {
    last: String,
    #[serde(default)]
    open: Option<String>,
    #[serde(default)]
    high: Option<String>,
    #[serde(default)]
    low: Option<String>,
    #[serde(default)]
    volume: Option<String>,
}

/// Client for point-in-time snapshot fetches.
pub struct RestClient {
    client: Client,
    base_url: String,
}

impl RestClient {
    /// Create a new REST client with a bounded per-request timeout.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> HubResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| HubError::HttpClient(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    /// Fetch a point-in-time snapshot for a product.
    ///
    /// Returns `Ok(None)` for a product the upstream does not know.
    /// Timeouts and transport failures surface as `Err`; the hub absorbs
    /// them into a null result.
    pub async fn fetch_snapshot(&self, product: &ProductId) -> HubResult<Option<MarketSnapshot>> {
        let url = format!("{}/products/{}/stats", self.base_url, product);
        info!(%url, "Fetching snapshot from REST");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| HubError::Rest(format!("HTTP request failed: {e}")))?;

        if response.status() == StatusCode::NOT_FOUND {
            debug!(product = %product, "Product not found upstream");
            return Ok(None);
        }

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(HubError::Rest(format!("HTTP {status}: {body}")));
        }

        let stats: StatsResponse = response
            .json()
            .await
            .map_err(|e| HubError::Rest(format!("Failed to parse response: {e}")))?;

        let snapshot = build_snapshot(product, &stats)?;
        Ok(Some(snapshot))
    }
}

fn build_snapshot(product: &ProductId, stats: &StatsResponse) -> HubResult<MarketSnapshot> {
    let symbol = product.symbol()?;
    let price: Price = stats
        .last
        .parse()
        .map_err(|e| HubError::Rest(format!("bad last price {:?}: {e}", stats.last)))?;

    let open = match &stats.open {
        Some(raw) => raw
            .parse()
            .map_err(|e| HubError::Rest(format!("bad open {raw:?}: {e}")))?,
        None => price,
    };

    let mut snapshot = MarketSnapshot::from_open(symbol, price, open);
    snapshot.high_24h = parse_optional(&stats.high)?;
    snapshot.low_24h = parse_optional(&stats.low)?;
    snapshot.volume_24h = stats
        .volume
        .as_deref()
        .map(|raw| {
            raw.parse()
                .map_err(|e| HubError::Rest(format!("bad volume {raw:?}: {e}")))
        })
        .transpose()?;

    Ok(snapshot)
}

fn parse_optional(raw: &Option<String>) -> HubResult<Option<Price>> {
    raw.as_deref()
        .map(|raw| {
            raw.parse()
                .map_err(|e| HubError::Rest(format!("bad stats field {raw:?}: {e}")))
        })
        .transpose()
}
