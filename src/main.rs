//! Gold Tracker: regional gold price relay.
//!
//! Entry point. Loads configuration, initialises structured logging,
//! wires the upstream client into the price cache and serves the HTTP API
//! until Ctrl+C.

use anyhow::{Context, Result};
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use tracing::{error, info, warn};

use gold_tracker::config::AppConfig;
use gold_tracker::dashboard::{self, AppContext};
use gold_tracker::data::gold_api::GoldApiClient;
use gold_tracker::engine::cache::PriceService;
use gold_tracker::engine::SystemClock;

const BANNER: &str = r#"
   ____       _     _   _____               _
  / ___| ___ | | __| | |_   _| __ __ _  ___| | _____ _ __
 | |  _ / _ \| |/ _` |   | || '__/ _` |/ __| |/ / _ \ '__|
 | |_| | (_) | | (_| |   | || | | (_| | (__|   <  __/ |
  \____|\___/|_|\__,_|   |_||_|  \__,_|\___|_|\_\___|_|

  Regional gold prices, cached and served
"#;

const DEFAULT_CONFIG_PATH: &str = "config.toml";

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (non-fatal if missing)
    let _ = dotenv::dotenv();

    init_logging();

    let config_path =
        std::env::var("GOLD_TRACKER_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    let cfg = AppConfig::load_or_default(&config_path)?;

    let api_key = cfg.upstream.api_key();
    if api_key.is_none() {
        warn!(
            env = %cfg.upstream.api_key_env,
            "No upstream API key set, requests will be unauthenticated"
        );
    }

    let source = GoldApiClient::new(&cfg.upstream, api_key)?;
    let prices = PriceService::new(
        Arc::new(source),
        cfg.market.clone(),
        &cfg.cache,
        Arc::new(SystemClock),
    )
    .context("Invalid market configuration")?;

    println!("{BANNER}");
    let next = prices.schedule().next_update(prices.now());
    info!(
        location = %cfg.market.location,
        premium_24k = %cfg.market.premium_24k,
        premium_22k = %cfg.market.premium_22k,
        premium_18k = %cfg.market.premium_18k,
        usd_to_inr = %cfg.market.usd_to_inr,
        "Regional market adjustment"
    );
    info!(
        cache_mins = cfg.cache.duration_mins,
        max_calls_per_12h = 720 / cfg.cache.duration_mins,
        updates = %prices.schedule().times_label(" & "),
        next_update = %next.display,
        "Cache policy"
    );

    let host: IpAddr = cfg
        .server
        .host
        .parse()
        .with_context(|| format!("Invalid server.host: {}", cfg.server.host))?;
    let addr = SocketAddr::new(host, cfg.server.port);

    let state = Arc::new(AppContext::new(prices, cfg.calculator.clone()));
    dashboard::serve(state, addr, shutdown_signal()).await?;

    info!("Gold tracker shut down cleanly.");
    Ok(())
}

/// Resolves on Ctrl+C. Never resolves if the signal handler can't be installed.
async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received."),
        Err(e) => {
            error!(error = %e, "Failed to listen for shutdown signal");
            std::future::pending::<()>().await;
        }
    }
}

/// Initialise the `tracing` subscriber.
fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("gold_tracker=info,tower_http=info"));

    let json_logging = std::env::var("GOLD_TRACKER_LOG_JSON").is_ok();

    if json_logging {
        fmt()
            .json()
            .with_env_filter(env_filter)
            .with_target(true)
            .with_thread_ids(true)
            .init();
    } else {
        fmt()
            .with_env_filter(env_filter)
            .with_target(true)
            .init();
    }
}
