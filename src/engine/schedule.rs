//! Regional rate-revision schedule.
//!
//! The regional market revises its rates at fixed local hours (midnight and
//! noon in Chennai). Around those moments the cached snapshot is likely to be
//! out of date, so the cache consults this schedule before serving.

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, TimeZone, Timelike, Utc};
use tracing::debug;

use crate::config::MarketConfig;
use crate::error::ConfigError;

const MINUTES_PER_DAY: i64 = 24 * 60;

/// The next scheduled revision relative to some instant.
#[derive(Debug, Clone, PartialEq)]
pub struct NextUpdate {
    pub at: DateTime<Utc>,
    pub remaining: Duration,
    /// "{hours}h {minutes}m", both floored.
    pub display: String,
}

/// Local revision times and the window around them in which the cache is bypassed.
#[derive(Debug, Clone)]
pub struct UpdateSchedule {
    offset: FixedOffset,
    /// Sorted, deduplicated local hours.
    hours: Vec<u32>,
    window_minutes: i64,
}

impl UpdateSchedule {
    pub fn new(offset: FixedOffset, hours: &[u32], window_minutes: u32) -> Self {
        let mut hours = hours.to_vec();
        hours.sort_unstable();
        hours.dedup();
        Self {
            offset,
            hours,
            window_minutes: i64::from(window_minutes),
        }
    }

    pub fn from_config(cfg: &MarketConfig) -> Result<Self, ConfigError> {
        let offset = FixedOffset::east_opt(cfg.utc_offset_minutes * 60).ok_or_else(|| {
            ConfigError::InvalidValue {
                field: "market.utc_offset_minutes",
                reason: format!("{} is not a valid offset", cfg.utc_offset_minutes),
            }
        })?;
        if cfg.update_hours.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "market.update_hours",
                reason: "at least one hour is required".into(),
            });
        }
        Ok(Self::new(offset, &cfg.update_hours, cfg.update_window_minutes))
    }

    /// Whether `now` falls within the window either side of a revision.
    ///
    /// Works at minute granularity on the local clock, so with a 5 minute
    /// window and a midnight revision 23:55 through 00:05 count as near.
    pub fn is_near_update(&self, now: DateTime<Utc>) -> bool {
        let local = now.with_timezone(&self.offset);
        let minute_of_day = i64::from(local.hour() * 60 + local.minute());

        let near = self.hours.iter().any(|&h| {
            let d = (minute_of_day - i64::from(h) * 60).rem_euclid(MINUTES_PER_DAY);
            d.min(MINUTES_PER_DAY - d) <= self.window_minutes
        });
        if near {
            debug!(local_time = %local.format("%H:%M"), "Inside revision window");
        }
        near
    }

    /// The first revision strictly after `now`, today or tomorrow.
    pub fn next_update(&self, now: DateTime<Utc>) -> NextUpdate {
        let local = now.with_timezone(&self.offset);
        let today = local.date_naive();

        let at = [Some(today), today.succ_opt()]
            .into_iter()
            .flatten()
            .flat_map(move |day| self.hours.iter().map(move |&h| (day, h)))
            .filter_map(|(day, h)| self.local_instant(day, h))
            .find(|t| *t > local)
            .map(|t| t.with_timezone(&Utc))
            .unwrap_or_else(|| now + Duration::days(1));

        let remaining = at - now;
        NextUpdate {
            at,
            remaining,
            display: format_remaining(remaining),
        }
    }

    /// "12:00 AM & 12:00 PM"-style listing of revision times.
    pub fn times_label(&self, separator: &str) -> String {
        self.hours
            .iter()
            .map(|&h| format_hour(h))
            .collect::<Vec<_>>()
            .join(separator)
    }

    fn local_instant(&self, day: NaiveDate, hour: u32) -> Option<DateTime<FixedOffset>> {
        let naive = day.and_hms_opt(hour, 0, 0)?;
        self.offset.from_local_datetime(&naive).single()
    }
}

/// Floor a duration to "Xh Ym".
pub fn format_remaining(remaining: Duration) -> String {
    let ms = remaining.num_milliseconds().max(0);
    let hours = ms / 3_600_000;
    let minutes = (ms % 3_600_000) / 60_000;
    format!("{hours}h {minutes}m")
}

fn format_hour(hour: u32) -> String {
    let display = match hour % 12 {
        0 => 12,
        h => h,
    };
    let meridiem = if hour < 12 { "AM" } else { "PM" };
    format!("{display}:00 {meridiem}")
}
