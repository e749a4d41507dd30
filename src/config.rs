//! Configuration loading from TOML with environment variable resolution.
//!
//! Reads `config.toml` and deserializes into strongly-typed structs.
//! Every section falls back to built-in defaults, so the file only needs to
//! list what differs. The upstream API key is referenced by env-var name and
//! resolved at runtime.

use anyhow::{Context, Result};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use secrecy::SecretString;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::warn;

use crate::error::ConfigError;

/// Top-level application configuration.
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub upstream: UpstreamConfig,
    pub market: MarketConfig,
    pub cache: CacheConfig,
    pub calculator: CalculatorConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct UpstreamConfig {
    pub base_url: String,
    /// Metal symbol queried on the upstream (`XAU` is gold).
    pub symbol: String,
    /// Name of the env var holding the `x-access-token`.
    pub api_key_env: String,
    pub timeout_secs: u64,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.gold-api.com".to_string(),
            symbol: "XAU".to_string(),
            api_key_env: "GOLD_API_KEY".to_string(),
            timeout_secs: 15,
        }
    }
}

impl UpstreamConfig {
    /// Look up the API key named by `api_key_env`.
    /// Returns `None` when the variable is unset or blank.
    pub fn api_key(&self) -> Option<SecretString> {
        std::env::var(&self.api_key_env)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .map(SecretString::new)
    }
}

/// Regional market adjustments and the local price-revision schedule.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct MarketConfig {
    pub location: String,
    /// Short region name used in labels ("Chennai").
    pub region: String,
    pub usd_to_inr: Decimal,
    pub premium_24k: Decimal,
    pub premium_22k: Decimal,
    pub premium_18k: Decimal,
    /// Gold fraction of 22K jewellery.
    pub purity_22k: Decimal,
    /// Gold fraction of 18K jewellery.
    pub purity_18k: Decimal,
    /// Offset of the local market clock from UTC.
    pub utc_offset_minutes: i32,
    /// Local hours at which the regional market revises its rates.
    pub update_hours: Vec<u32>,
    /// Minutes either side of a revision during which the cache is bypassed.
    pub update_window_minutes: u32,
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self {
            location: "Chennai, Tamil Nadu".to_string(),
            region: "Chennai".to_string(),
            usd_to_inr: dec!(83),
            premium_24k: dec!(1.143),
            premium_22k: dec!(1.145),
            premium_18k: dec!(1.16),
            purity_22k: dec!(0.916),
            purity_18k: dec!(0.75),
            utc_offset_minutes: 330,
            update_hours: vec![0, 12],
            update_window_minutes: 5,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct CacheConfig {
    pub duration_mins: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { duration_mins: 90 }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct CalculatorConfig {
    pub gst_rate: Decimal,
    pub making_charge_rate: Decimal,
}

impl Default for CalculatorConfig {
    fn default() -> Self {
        Self {
            gst_rate: dec!(0.03),
            making_charge_rate: dec!(0.02),
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &str) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {path}"))?;
        Self::from_toml(&contents)
            .with_context(|| format!("Failed to load config file: {path}"))
    }

    /// Load configuration, falling back to defaults when the file is absent.
    /// A file that exists but does not parse is still an error.
    pub fn load_or_default(path: &str) -> Result<Self> {
        if Path::new(path).exists() {
            Self::load(path)
        } else {
            warn!(path, "Config file not found, using built-in defaults");
            Ok(Self::default())
        }
    }

    /// Parse and validate a TOML document.
    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: AppConfig = toml::from_str(contents).context("Failed to parse TOML")?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values that deserialize fine but would produce nonsense prices.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(invalid("server.port", "must be non-zero"));
        }
        if self.upstream.timeout_secs == 0 {
            return Err(invalid("upstream.timeout_secs", "must be non-zero"));
        }

        let m = &self.market;
        let positives = [
            ("market.usd_to_inr", m.usd_to_inr),
            ("market.premium_24k", m.premium_24k),
            ("market.premium_22k", m.premium_22k),
            ("market.premium_18k", m.premium_18k),
            ("market.purity_22k", m.purity_22k),
            ("market.purity_18k", m.purity_18k),
            ("calculator.gst_rate", self.calculator.gst_rate),
            ("calculator.making_charge_rate", self.calculator.making_charge_rate),
        ];
        for (field, value) in positives {
            if value <= Decimal::ZERO {
                return Err(invalid(field, format!("must be positive, got {value}")));
            }
        }

        if m.update_hours.is_empty() {
            return Err(invalid("market.update_hours", "at least one hour is required"));
        }
        if let Some(h) = m.update_hours.iter().find(|h| **h > 23) {
            return Err(invalid("market.update_hours", format!("hour {h} is out of range 0-23")));
        }
        if m.update_window_minutes >= 720 {
            return Err(invalid("market.update_window_minutes", "must be under 720"));
        }
        if m.utc_offset_minutes.abs() > 14 * 60 {
            return Err(invalid("market.utc_offset_minutes", "must be within +/-14h"));
        }
        if self.cache.duration_mins == 0 {
            return Err(invalid("cache.duration_mins", "must be non-zero"));
        }

        Ok(())
    }
}

fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::InvalidValue { field, reason: reason.into() }
}
