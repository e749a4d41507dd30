//! Regional markup: converts an international spot quote into local
//! per-gram retail prices for each purity.

use chrono::{DateTime, Utc};
use rust_decimal::prelude::*;
use rust_decimal_macros::dec;

use crate::config::MarketConfig;
use crate::engine::schedule::UpdateSchedule;
use crate::error::FetchError;
use crate::types::{PriceSnapshot, SpotQuote};

/// Grams in one troy ounce.
pub const GRAMS_PER_TROY_OUNCE: Decimal = dec!(31.1035);

/// Per-gram price in the local currency before any premium.
pub fn local_price_per_gram(price_per_ounce_usd: Decimal, usd_to_inr: Decimal) -> Option<Decimal> {
    price_per_ounce_usd
        .checked_div(GRAMS_PER_TROY_OUNCE)?
        .checked_mul(usd_to_inr)
}

/// Round half away from zero to whole rupees. `None` when the result does not fit an `i64`.
pub fn round_rupees(value: Decimal) -> Option<i64> {
    value
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
}

fn purity_price(per_gram: Decimal, factors: &[Decimal]) -> Option<i64> {
    let price = factors
        .iter()
        .try_fold(per_gram, |acc, factor| acc.checked_mul(*factor))?;
    round_rupees(price)
}

/// Apply the regional premiums to a spot quote.
///
/// Fails with [`FetchError::InvalidPrice`] when the quote is too large to
/// price in whole rupees.
pub fn regional_prices(
    quote: &SpotQuote,
    market: &MarketConfig,
    schedule: &UpdateSchedule,
    now: DateTime<Utc>,
) -> Result<PriceSnapshot, FetchError> {
    let out_of_range = || FetchError::InvalidPrice(format!("{} is out of range", quote.price_per_ounce_usd));

    let per_gram = local_price_per_gram(quote.price_per_ounce_usd, market.usd_to_inr)
        .ok_or_else(out_of_range)?;
    let gold_24k = purity_price(per_gram, &[market.premium_24k]).ok_or_else(out_of_range)?;
    let gold_22k = purity_price(per_gram, &[market.purity_22k, market.premium_22k])
        .ok_or_else(out_of_range)?;
    let gold_18k = purity_price(per_gram, &[market.purity_18k, market.premium_18k])
        .ok_or_else(out_of_range)?;

    Ok(PriceSnapshot {
        gold_24k,
        gold_22k,
        gold_18k,
        location: market.location.clone(),
        source: format!("Gold-API.com with {} market adjustment", market.region),
        disclaimer: format!(
            "{} gold prices update at {} daily. These are indicative rates - verify with local jewelers.",
            market.region,
            schedule.times_label(" and "),
        ),
        international_price_usd: quote
            .price_per_ounce_usd
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero),
        next_update: schedule.next_update(now).display,
        last_updated: quote
            .updated_at
            .clone()
            .unwrap_or_else(|| now.to_rfc3339_opts(chrono::SecondsFormat::Millis, true)),
        cached_at: now,
    })
}
