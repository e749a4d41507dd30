//! Price cache: the one stateful piece of the service.
//!
//! Holds a single snapshot and decides per request whether it can be served:
//! the entry must exist, be younger than the configured duration, and the
//! regional market must not be about to revise its rates. When a refresh
//! fails, whatever is cached is served with a warning rather than an error.

use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use crate::config::{CacheConfig, MarketConfig};
use crate::data::PriceSource;
use crate::engine::pricing::regional_prices;
use crate::engine::schedule::UpdateSchedule;
use crate::engine::Clock;
use crate::error::{ConfigError, FetchError, PriceError};
use crate::types::{CacheStatus, PriceResponse, PriceSnapshot};

const STALE_WARNING: &str = "Using cached data (API error)";

// ---------------------------------------------------------------------------
// Cache entry
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
struct CacheEntry {
    snapshot: PriceSnapshot,
    fetched_at: DateTime<Utc>,
}

impl CacheEntry {
    fn age(&self, now: DateTime<Utc>) -> Duration {
        (now - self.fetched_at).max(Duration::zero())
    }

    /// Age rounded to the nearest minute, e.g. "12 minutes".
    fn age_label(&self, now: DateTime<Utc>) -> String {
        let minutes = (self.age(now).num_milliseconds() + 30_000) / 60_000;
        format!("{minutes} minutes")
    }
}

// ---------------------------------------------------------------------------
// Service
// ---------------------------------------------------------------------------

/// Serves regional prices from a single-slot cache, refreshing on demand.
pub struct PriceService {
    source: Arc<dyn PriceSource>,
    market: MarketConfig,
    schedule: UpdateSchedule,
    max_age: Duration,
    clock: Arc<dyn Clock>,
    /// Held across a refresh so concurrent misses share one upstream call.
    slot: Mutex<Option<CacheEntry>>,
}

impl PriceService {
    pub fn new(
        source: Arc<dyn PriceSource>,
        market: MarketConfig,
        cache: &CacheConfig,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, ConfigError> {
        let schedule = UpdateSchedule::from_config(&market)?;
        let max_age = i64::try_from(cache.duration_mins)
            .ok()
            .and_then(Duration::try_minutes)
            .ok_or_else(|| ConfigError::InvalidValue {
                field: "cache.duration_mins",
                reason: format!("{} is too large", cache.duration_mins),
            })?;

        Ok(Self {
            source,
            market,
            schedule,
            max_age,
            clock,
            slot: Mutex::new(None),
        })
    }

    pub fn market(&self) -> &MarketConfig {
        &self.market
    }

    pub fn schedule(&self) -> &UpdateSchedule {
        &self.schedule
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    fn is_entry_valid(&self, entry: Option<&CacheEntry>, now: DateTime<Utc>) -> bool {
        let Some(entry) = entry else {
            return false;
        };
        if self.schedule.is_near_update(now) {
            info!(region = %self.market.region, "Near regional update time, forcing refresh");
            return false;
        }
        entry.age(now) < self.max_age
    }

    /// Whether the next request would be served from cache.
    pub async fn is_cache_valid(&self) -> bool {
        let slot = self.slot.lock().await;
        self.is_entry_valid(slot.as_ref(), self.clock.now())
    }

    pub async fn cache_status(&self) -> CacheStatus {
        if self.is_cache_valid().await {
            CacheStatus::Valid
        } else {
            CacheStatus::Expired
        }
    }

    /// The cached snapshot regardless of age.
    pub async fn latest_snapshot(&self) -> Option<PriceSnapshot> {
        self.slot.lock().await.as_ref().map(|e| e.snapshot.clone())
    }

    /// Serve prices: from cache when valid, else refresh, else fall back to stale.
    pub async fn get_prices(&self) -> Result<PriceResponse, PriceError> {
        let mut slot = self.slot.lock().await;
        let now = self.clock.now();

        if self.is_entry_valid(slot.as_ref(), now) {
            if let Some(entry) = slot.as_ref() {
                debug!(age = %entry.age_label(now), "Serving from cache");
                return Ok(PriceResponse {
                    snapshot: entry.snapshot.clone(),
                    from_cache: true,
                    cache_age: Some(entry.age_label(now)),
                    warning: None,
                });
            }
        }

        match self.refresh().await {
            Ok(entry) => {
                let snapshot = entry.snapshot.clone();
                *slot = Some(entry);
                Ok(PriceResponse {
                    snapshot,
                    from_cache: false,
                    cache_age: None,
                    warning: None,
                })
            }
            Err(e) => {
                error!(error = %e, source = self.source.name(), "Spot price refresh failed");
                match slot.as_ref() {
                    Some(entry) => {
                        let now = self.clock.now();
                        warn!(age = %entry.age_label(now), "Serving stale cache");
                        Ok(PriceResponse {
                            snapshot: entry.snapshot.clone(),
                            from_cache: true,
                            cache_age: Some(entry.age_label(now)),
                            warning: Some(STALE_WARNING.to_string()),
                        })
                    }
                    None => Err(PriceError::Unavailable { source: e }),
                }
            }
        }
    }

    async fn refresh(&self) -> Result<CacheEntry, FetchError> {
        info!(source = self.source.name(), "Fetching spot price");
        let quote = self.source.fetch_spot().await?;

        let fetched_at = self.clock.now();
        let snapshot = regional_prices(&quote, &self.market, &self.schedule, fetched_at)?;
        info!(
            spot = %quote,
            gold_24k = snapshot.gold_24k,
            gold_22k = snapshot.gold_22k,
            gold_18k = snapshot.gold_18k,
            next_update = %snapshot.next_update,
            "Prices updated"
        );

        Ok(CacheEntry { snapshot, fetched_at })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
