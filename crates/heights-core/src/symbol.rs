//! Instrument identifiers.
//!
//! `Symbol` is the subscription key used by consumers ("BTC"). The upstream
//! feed is case-sensitive while UI callers are not, so symbols are normalized
//! (trimmed, uppercased) at construction. `ProductId` is the exchange pair
//! name derived from a symbol ("BTC-USD").

use crate::error::{CoreError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Quote currency used for upstream product ids.
pub const QUOTE_CURRENCY: &str = "USD";

/// Case-normalized instrument symbol (e.g. "BTC").
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Symbol(String);

impl Symbol {
    /// Parse and normalize a symbol from caller input.
    ///
    /// Rejects empty input and characters outside ASCII alphanumerics.
    /// A malformed symbol is a caller bug and surfaces synchronously.
    pub fn parse(input: &str) -> Result<Self> {
        let normalized = input.trim().to_ascii_uppercase();
        if normalized.is_empty() {
            return Err(CoreError::InvalidSymbol("empty symbol".to_string()));
        }
        if !normalized.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(CoreError::InvalidSymbol(format!(
                "symbol must be alphanumeric, got {input:?}"
            )));
        }
        Ok(Self(normalized))
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Derive the upstream product id for this symbol.
    pub fn product_id(&self) -> ProductId {
        ProductId(format!("{}-{}", self.0, QUOTE_CURRENCY))
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Upstream-feed product identifier (e.g. "BTC-USD").
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(String);

impl ProductId {
    /// Parse a product id received from the upstream feed.
    pub fn parse(input: &str) -> Result<Self> {
        if input.is_empty() || !input.contains('-') {
            return Err(CoreError::InvalidProductId(format!(
                "expected BASE-QUOTE pair, got {input:?}"
            )));
        }
        Ok(Self(input.to_string()))
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Extract the base symbol from this product id.
    pub fn symbol(&self) -> Result<Symbol> {
        let base = self
            .0
            .split_once('-')
            .map(|(base, _)| base)
            .ok_or_else(|| CoreError::InvalidProductId(self.0.clone()))?;
        Symbol::parse(base)
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
