//! Configuration loader

use config::{Config, Environment, File};
use std::path::Path;

use super::types::{AppConfig, BotConfig, BrokerConfig};
use crate::common::errors::{BotError, Result};

/// Load configuration from file and environment variables
///
/// Priority (highest to lowest):
/// 1. `BROKER_API_TOKEN` for the API token
/// 2. Environment variables (prefixed with APP_, nested with `__`)
/// 3. Configuration file (TOML format)
/// 4. Default values
pub fn load_config(config_path: Option<&str>) -> Result<AppConfig> {
    let mut builder = Config::builder();

    if let Some(path) = config_path {
        if Path::new(path).exists() {
            builder = builder.add_source(File::with_name(path).required(false));
        }
    }

    builder = builder.add_source(
        Environment::with_prefix("APP")
            .separator("__")
            .try_parsing(true),
    );

    let config = builder
        .build()
        .map_err(|e| BotError::Configuration(e.to_string()))?;

    let mut app_config: AppConfig = config
        .try_deserialize()
        .map_err(|e| BotError::Configuration(e.to_string()))?;

    if let Ok(token) = std::env::var("BROKER_API_TOKEN") {
        app_config.broker.api_token = Some(token);
    }

    Ok(app_config)
}

/// Load configuration from plain environment variables only
pub fn load_from_env() -> Result<AppConfig> {
    dotenvy::dotenv().ok();

    let defaults = BrokerConfig::default();
    let broker = BrokerConfig {
        api_token: std::env::var("BROKER_API_TOKEN").ok(),
        rest_url: std::env::var("BROKER_REST_URL").unwrap_or(defaults.rest_url),
        trades_page_size: parse_env("BROKER_TRADES_PAGE_SIZE")?
            .unwrap_or(defaults.trades_page_size),
    };

    let bot_defaults = BotConfig::default();
    let bot = BotConfig {
        base_amount: parse_env("BOT_BASE_AMOUNT")?.unwrap_or(bot_defaults.base_amount),
        protections: parse_env("BOT_PROTECTIONS")?.unwrap_or(bot_defaults.protections),
        stop_win_percent: parse_env("BOT_STOP_WIN_PERCENT")?
            .unwrap_or(bot_defaults.stop_win_percent),
        stop_loss_percent: parse_env("BOT_STOP_LOSS_PERCENT")?
            .unwrap_or(bot_defaults.stop_loss_percent),
    };

    Ok(AppConfig {
        broker,
        bot,
        ..AppConfig::default()
    })
}

fn parse_env<T>(name: &str) -> Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|e| BotError::Configuration(format!("{}: {}", name, e))),
        Err(_) => Ok(None),
    }
}
