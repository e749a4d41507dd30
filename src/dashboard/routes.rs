//! API route handlers.
//!
//! All endpoints return JSON except `/dashboard`. State is shared via
//! `Arc<AppContext>`.

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, warn};

use crate::config::CalculatorConfig;
use crate::engine::cache::PriceService;
use crate::engine::calculator::{
    calculate_gst, calculate_investment, parse_amount, validate_budget, GstBreakdown,
    InvestmentPlan,
};
use crate::error::{ApiError, CalcError};
use crate::types::{CacheStatus, PriceResponse, Purity};

// ---------------------------------------------------------------------------
// Shared state
// ---------------------------------------------------------------------------

/// Shared state accessible by all route handlers.
pub struct AppContext {
    pub prices: PriceService,
    pub calculator: CalculatorConfig,
    pub started_at: Instant,
}

impl AppContext {
    pub fn new(prices: PriceService, calculator: CalculatorConfig) -> Self {
        Self {
            prices,
            calculator,
            started_at: Instant::now(),
        }
    }
}

pub type AppState = Arc<AppContext>;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    pub message: String,
    pub status: &'static str,
    pub cache_status: CacheStatus,
    #[serde(rename = "nextChennaiUpdate")]
    pub next_update: String,
    pub location: String,
    pub update_schedule: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    /// Seconds since the server started.
    pub uptime: u64,
    pub timestamp: String,
}

/// Fields are raw JSON values so numeric strings from HTML inputs are accepted.
#[derive(Debug, Default, Deserialize)]
pub struct GstRequest {
    #[serde(rename = "goldPrice", default)]
    pub gold_price: Option<Value>,
    #[serde(default)]
    pub grams: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
pub struct InvestmentRequest {
    #[serde(default)]
    pub budget: Option<Value>,
    /// "24k" | "22k" | "18k"; anything else means 22K.
    #[serde(default)]
    pub purity: Option<String>,
}

// ---------------------------------------------------------------------------
// Route handlers
// ---------------------------------------------------------------------------

/// GET /
pub async fn get_status(State(state): State<AppState>) -> Json<StatusResponse> {
    let prices = &state.prices;
    let market = prices.market();
    let next = prices.schedule().next_update(prices.now());

    Json(StatusResponse {
        message: format!("Gold Tracker API - {} Edition", market.region),
        status: "Active",
        cache_status: prices.cache_status().await,
        next_update: next.display,
        location: market.location.clone(),
        update_schedule: format!("{} daily", prices.schedule().times_label(" & ")),
    })
}

/// GET /api/gold-price
pub async fn get_gold_price(
    State(state): State<AppState>,
) -> Result<Json<PriceResponse>, ApiError> {
    let resp = state.prices.get_prices().await?;
    debug!(from_cache = resp.from_cache, "Gold price served");
    Ok(Json(resp))
}

/// POST /api/calculate-gst
pub async fn calculate_gst_handler(
    State(state): State<AppState>,
    payload: Result<Json<GstRequest>, JsonRejection>,
) -> Result<Json<GstBreakdown>, ApiError> {
    let Json(req) = payload.map_err(|e| ApiError::Body(e.body_text()))?;

    let breakdown = calculate_gst(
        parse_amount(req.gold_price.as_ref()),
        parse_amount(req.grams.as_ref()),
        &state.calculator,
    )?;
    Ok(Json(breakdown))
}

/// POST /api/calculate-investment
pub async fn calculate_investment_handler(
    State(state): State<AppState>,
    payload: Result<Json<InvestmentRequest>, JsonRejection>,
) -> Result<Json<InvestmentPlan>, ApiError> {
    let Json(req) = payload.map_err(|e| ApiError::Body(e.body_text()))?;
    let budget = validate_budget(parse_amount(req.budget.as_ref()))?;
    let purity = req
        .purity
        .as_deref()
        .map(Purity::from_selector)
        .unwrap_or_default();

    let prices = state.prices.get_prices().await.map_err(|e| {
        warn!(error = %e, "No prices for investment calculation");
        CalcError::PricesNotLoaded
    })?;

    let plan = calculate_investment(Some(budget), purity, &prices.snapshot)?;
    Ok(Json(plan))
}

/// GET /api/health
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        uptime: state.started_at.elapsed().as_secs_f64().round() as u64,
        timestamp: state
            .prices
            .now()
            .to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
