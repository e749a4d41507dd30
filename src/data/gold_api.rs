//! Gold-API.com spot price client.
//!
//! API: `GET https://api.gold-api.com/price/{symbol}`
//! Auth: `x-access-token` header (optional; keyless calls get lower limits).
//! Response: `{ "name": "Gold", "price": 2650.1, "symbol": "XAU", "updatedAt": "..." }`

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use rust_decimal::Decimal;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use super::PriceSource;
use crate::config::UpstreamConfig;
use crate::error::FetchError;
use crate::types::SpotQuote;

const PROVIDER_NAME: &str = "gold-api.com";

/// Longest slice of an error body kept for diagnostics.
const MAX_ERROR_BODY: usize = 200;

// ---------------------------------------------------------------------------
// API response types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GoldApiPrice {
    #[serde(default)]
    price: Option<Decimal>,
    #[serde(default)]
    updated_at: Option<String>,
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

pub struct GoldApiClient {
    http: Client,
    base_url: String,
    symbol: String,
    api_key: Option<SecretString>,
}

impl GoldApiClient {
    pub fn new(cfg: &UpstreamConfig, api_key: Option<SecretString>) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(cfg.timeout_secs))
            .user_agent(concat!("gold-tracker/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build Gold-API HTTP client")?;

        Ok(Self {
            http,
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
            symbol: cfg.symbol.clone(),
            api_key,
        })
    }

    fn price_url(&self) -> String {
        format!("{}/price/{}", self.base_url, self.symbol)
    }

    /// Turn a response body into a quote, rejecting missing or non-positive prices.
    fn parse_quote(body: &str) -> Result<SpotQuote, FetchError> {
        let data: GoldApiPrice =
            serde_json::from_str(body).map_err(|e| FetchError::Decode(e.to_string()))?;

        let price = data
            .price
            .ok_or_else(|| FetchError::InvalidPrice("response has no price".into()))?;
        if price <= Decimal::ZERO {
            return Err(FetchError::InvalidPrice(format!("non-positive price {price}")));
        }

        Ok(SpotQuote {
            price_per_ounce_usd: price,
            updated_at: data.updated_at.filter(|s| !s.is_empty()),
        })
    }
}

#[async_trait]
impl PriceSource for GoldApiClient {
    async fn fetch_spot(&self) -> Result<SpotQuote, FetchError> {
        let url = self.price_url();
        debug!(%url, authenticated = self.api_key.is_some(), "Requesting spot price");

        let mut req = self
            .http
            .get(&url)
            .header(reqwest::header::CONTENT_TYPE, "application/json");
        if let Some(key) = &self.api_key {
            req = req.header("x-access-token", key.expose_secret().as_str());
        }

        let resp = req.send().await?;
        let status = resp.status();
        let body = resp.text().await?;

        if !status.is_success() {
            let body: String = body.chars().take(MAX_ERROR_BODY).collect();
            return Err(FetchError::Status { status: status.as_u16(), body });
        }

        Self::parse_quote(&body)
    }

    fn name(&self) -> &'static str {
        PROVIDER_NAME
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
