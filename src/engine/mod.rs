//! Core engine: regional pricing, the revision schedule, the price cache
//! and the calculators that run on top of it.

pub mod calculator;
pub mod cache;
pub mod pricing;
pub mod schedule;

use chrono::{DateTime, Utc};

/// Source of the current time, injectable so cache expiry can be tested.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
