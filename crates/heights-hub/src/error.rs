//! Hub error types.
//!
//! Only caller bugs (malformed symbol arguments) surface as errors on the
//! public operations; network failures are absorbed by the reconnect loop
//! and the REST fallback's null result.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum HubError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(#[from] heights_core::CoreError),

    #[error("HTTP client error: {0}")]
    HttpClient(String),

    #[error("REST fetch failed: {0}")]
    Rest(String),
}

pub type HubResult<T> = Result<T, HubError>;
