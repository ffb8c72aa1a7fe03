//! GaleTrader - Main Entry Point
//!
//! Logs in to the broker, starts the martingale bot and runs until Ctrl-C
//! or until the circuit breaker trips.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use gale_trader::bot::{BotController, BotEvent, ControllerOptions};
use gale_trader::broker::BrokerRestClient;
use gale_trader::common::channels::create_event_channel;
use gale_trader::config::{load_config, load_from_env};
use gale_trader::market_data::{fetch_with_fallback, MarketDataClient};

/// CLI arguments for the application
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    /// Log level (trace, debug, info, warn, error); overrides the config file
    #[arg(long, env = "LOG_LEVEL")]
    log_level: Option<String>,

    /// Validate the bot configuration and exit
    #[arg(long)]
    validate_only: bool,

    /// Read configuration from BROKER_* and BOT_* variables only, ignoring the file
    #[arg(long)]
    env_only: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Load environment variables from .env file if present
    dotenvy::dotenv().ok();

    let config = if args.env_only {
        load_from_env()
    } else {
        load_config(Some(args.config.as_str()))
    }
    .context("failed to load configuration")?;

    // Initialize logging
    let log_level = args
        .log_level
        .clone()
        .unwrap_or_else(|| config.settings.log_level.clone());
    let level = match log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting GaleTrader");
    if args.env_only {
        info!("Configuration read from environment");
    } else {
        info!("Configuration file: {}", args.config);
    }

    config.bot.validate().context("invalid bot configuration")?;
    info!(
        base_amount = %config.bot.base_amount,
        protections = config.bot.protections,
        stop_win_percent = %config.bot.stop_win_percent,
        stop_loss_percent = %config.bot.stop_loss_percent,
        "Bot configuration is valid"
    );
    if args.validate_only {
        return Ok(());
    }

    let api_token = config
        .broker
        .api_token
        .clone()
        .filter(|token| !token.is_empty())
        .context("no API token configured; set BROKER_API_TOKEN")?;
    let timeout = Duration::from_secs(config.settings.request_timeout_seconds);

    let broker = Arc::new(BrokerRestClient::with_timeout(
        &config.broker.rest_url,
        &api_token,
        timeout,
    )?);
    broker
        .verify_credentials()
        .await
        .context("broker login failed")?;

    // Dashboard prices, logged only
    let market = MarketDataClient::from_config(&config.market_data, timeout)?;
    let fallback = config.market_data.fallback;
    let refresh = Duration::from_secs(config.market_data.refresh_interval_seconds.max(1));
    let market_task = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(refresh);
        loop {
            ticker.tick().await;
            match fetch_with_fallback(&market, fallback).await {
                Ok(tickers) => {
                    for coin in tickers {
                        info!(
                            coin = %coin.symbol,
                            price = %coin.current_price,
                            change_24h = ?coin.price_change_percentage_24h,
                            "Market price"
                        );
                    }
                }
                Err(e) => warn!("Market data refresh failed: {}", e),
            }
        }
    });

    let (event_tx, mut event_rx) = create_event_channel();
    let controller = BotController::new(
        Arc::clone(&broker),
        ControllerOptions::from_app_config(&config),
        event_tx,
    );
    controller.start().await?;

    info!("Bot running, press Ctrl-C to stop");

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Received shutdown signal, cleaning up...");
                break;
            }
            event = event_rx.recv() => {
                match event {
                    Some(BotEvent::BreakerTripped(reason)) => {
                        warn!("{}", reason);
                        break;
                    }
                    Some(BotEvent::OrderFailed { reason }) => error!("Order failed: {}", reason),
                    Some(BotEvent::StateChanged(state)) => info!("Bot is {}", state),
                    Some(_) => {}
                    None => break,
                }
            }
        }
    }

    controller.shutdown().await;
    market_task.abort();

    Ok(())
}
