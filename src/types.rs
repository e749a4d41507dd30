//! Shared types for the gold tracker.
//!
//! These types form the data model used across all modules. Field names on
//! the serialized structs follow the JSON the browser front end reads.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Upstream quote
// ---------------------------------------------------------------------------

/// A spot quote as reported by the upstream price API.
#[derive(Debug, Clone, PartialEq)]
pub struct SpotQuote {
    /// International spot price, USD per troy ounce.
    pub price_per_ounce_usd: Decimal,
    /// Upstream's own timestamp string, passed through untouched.
    pub updated_at: Option<String>,
}

impl fmt::Display for SpotQuote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "XAU ${}/oz", self.price_per_ounce_usd.round_dp(2))?;
        if let Some(at) = &self.updated_at {
            write!(f, " @ {at}")?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Regional prices
// ---------------------------------------------------------------------------

/// Regional per-gram prices derived from one spot quote.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceSnapshot {
    #[serde(rename = "gold24K")]
    pub gold_24k: i64,
    #[serde(rename = "gold22K")]
    pub gold_22k: i64,
    #[serde(rename = "gold18K")]
    pub gold_18k: i64,
    pub location: String,
    pub source: String,
    pub disclaimer: String,
    #[serde(rename = "internationalPriceUSD")]
    pub international_price_usd: Decimal,
    #[serde(rename = "nextChennaiUpdate")]
    pub next_update: String,
    #[serde(rename = "lastUpdated")]
    pub last_updated: String,
    #[serde(rename = "cachedAt")]
    pub cached_at: DateTime<Utc>,
}

impl PriceSnapshot {
    /// Per-gram price for the given purity.
    pub fn price_for(&self, purity: Purity) -> i64 {
        match purity {
            Purity::K24 => self.gold_24k,
            Purity::K22 => self.gold_22k,
            Purity::K18 => self.gold_18k,
        }
    }
}

impl fmt::Display for PriceSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "24K: ₹{} | 22K: ₹{} | 18K: ₹{}",
            self.gold_24k, self.gold_22k, self.gold_18k
        )
    }
}

/// What `/api/gold-price` returns: the snapshot plus cache provenance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceResponse {
    #[serde(flatten)]
    pub snapshot: PriceSnapshot,
    #[serde(rename = "fromCache")]
    pub from_cache: bool,
    /// Rounded age of the served entry, e.g. "12 minutes".
    #[serde(rename = "cacheAge", skip_serializing_if = "Option::is_none", default)]
    pub cache_age: Option<String>,
    /// Set when stale data is served because the upstream failed.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub warning: Option<String>,
}

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Gold purity grades quoted by the regional market.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Purity {
    #[serde(rename = "24K")]
    K24,
    #[default]
    #[serde(rename = "22K")]
    K22,
    #[serde(rename = "18K")]
    K18,
}

impl Purity {
    /// Parse a purity selector such as "22k". Unknown values fall back to 22K,
    /// the grade most jewellery is sold in.
    pub fn from_selector(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "24k" => Purity::K24,
            "18k" => Purity::K18,
            _ => Purity::K22,
        }
    }
}

impl fmt::Display for Purity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Purity::K24 => write!(f, "24K"),
            Purity::K22 => write!(f, "22K"),
            Purity::K18 => write!(f, "18K"),
        }
    }
}

/// Whether the cached snapshot would be served without a refresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CacheStatus {
    Valid,
    Expired,
}

impl fmt::Display for CacheStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheStatus::Valid => write!(f, "Valid"),
            CacheStatus::Expired => write!(f, "Expired"),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
impl PriceSnapshot {
    /// A snapshot with round numbers for tests.
    pub fn sample() -> Self {
        PriceSnapshot {
            gold_24k: 7000,
            gold_22k: 6400,
            gold_18k: 5300,
            location: "Chennai, Tamil Nadu".to_string(),
            source: "Gold-API.com with Chennai market adjustment".to_string(),
            disclaimer: "indicative".to_string(),
            international_price_usd: Decimal::new(230055, 2),
            next_update: "3h 0m".to_string(),
            last_updated: "2026-10-16T09:00:00Z".to_string(),
            cached_at: Utc::now(),
        }
    }
}
