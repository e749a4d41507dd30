//! Upstream price sources.
//!
//! Defines the `PriceSource` trait and the Gold-API.com implementation.
//! The cache only ever talks to the trait, so tests swap in fakes.

pub mod gold_api;

use async_trait::async_trait;

use crate::error::FetchError;
use crate::types::SpotQuote;

/// Abstraction over the spot price feed.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PriceSource: Send + Sync {
    /// Fetch the current international spot quote.
    async fn fetch_spot(&self) -> Result<SpotQuote, FetchError>;

    /// Provider name for logging.
    fn name(&self) -> &'static str;
}
