//! Error types for heights-feed.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("Malformed ticker: {0}")]
    MalformedTicker(String),

    #[error("Core error: {0}")]
    Core(#[from] heights_core::CoreError),
}

pub type FeedResult<T> = Result<T, FeedError>;
