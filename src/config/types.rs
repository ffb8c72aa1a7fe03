//! Configuration types

use std::time::Duration;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::common::errors::{InvalidField, ValidationError};

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Broker API configuration
    #[serde(default)]
    pub broker: BrokerConfig,
    /// Bot trading parameters
    #[serde(default)]
    pub bot: BotConfig,
    /// Control loop timing
    #[serde(default)]
    pub scheduler: SchedulerConfig,
    /// Market-data provider configuration
    #[serde(default)]
    pub market_data: MarketDataConfig,
    /// General application settings
    #[serde(default)]
    pub settings: AppSettings,
}

/// Broker platform configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrokerConfig {
    /// Opaque API token sent with every request
    #[serde(default)]
    pub api_token: Option<String>,
    /// Base URL for the broker REST API
    #[serde(default = "default_broker_rest_url")]
    pub rest_url: String,
    /// Number of recent trades fetched per reconciliation
    #[serde(default = "default_trades_page_size")]
    pub trades_page_size: u32,
}

impl Default for BrokerConfig {
    fn default() -> Self {
        Self {
            api_token: None,
            rest_url: default_broker_rest_url(),
            trades_page_size: default_trades_page_size(),
        }
    }
}

fn default_broker_rest_url() -> String {
    "https://broker-api.mybroker.dev/token".to_string()
}

fn default_trades_page_size() -> u32 {
    10
}

/// User-editable bot parameters
///
/// `protections` is kept signed so that a negative value coming from a
/// config file or the environment is reported by [`BotConfig::validate`]
/// instead of failing deserialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BotConfig {
    /// Stake used when no martingale step applies
    #[serde(default = "default_base_amount")]
    pub base_amount: Decimal,
    /// Maximum number of consecutive doublings
    #[serde(default)]
    pub protections: i64,
    /// Stop-win threshold as a percentage of the total balance
    #[serde(default = "default_stop_win_percent")]
    pub stop_win_percent: Decimal,
    /// Stop-loss threshold as a percentage of the total balance
    #[serde(default = "default_stop_loss_percent")]
    pub stop_loss_percent: Decimal,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            base_amount: default_base_amount(),
            protections: 0,
            stop_win_percent: default_stop_win_percent(),
            stop_loss_percent: default_stop_loss_percent(),
        }
    }
}

impl BotConfig {
    /// Check every field and report all of the invalid ones at once
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut fields = Vec::new();

        if self.base_amount <= Decimal::ZERO {
            fields.push(InvalidField::BaseAmount);
        }
        if self.protections < 0 {
            fields.push(InvalidField::Protections);
        }
        if self.stop_win_percent <= Decimal::ZERO {
            fields.push(InvalidField::StopWinPercent);
        }
        if self.stop_loss_percent <= Decimal::ZERO {
            fields.push(InvalidField::StopLossPercent);
        }

        if fields.is_empty() {
            Ok(())
        } else {
            Err(ValidationError { fields })
        }
    }

    /// Protections as an unsigned count (negative values clamp to 0)
    pub fn max_protections(&self) -> u32 {
        u32::try_from(self.protections.max(0)).unwrap_or(u32::MAX)
    }
}

fn default_base_amount() -> Decimal {
    dec!(1)
}

fn default_stop_win_percent() -> Decimal {
    dec!(10)
}

fn default_stop_loss_percent() -> Decimal {
    dec!(5)
}

/// Control loop timing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Period of the trading trigger in milliseconds
    #[serde(default = "default_tick_interval")]
    pub tick_interval_ms: u64,
    /// Delay between the immediate first cycle and arming the trigger
    #[serde(default = "default_guard_delay")]
    pub guard_delay_ms: u64,
    /// Minimum time between two order attempts
    #[serde(default = "default_debounce")]
    pub debounce_ms: u64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: default_tick_interval(),
            guard_delay_ms: default_guard_delay(),
            debounce_ms: default_debounce(),
        }
    }
}

impl SchedulerConfig {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    pub fn guard_delay(&self) -> Duration {
        Duration::from_millis(self.guard_delay_ms)
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

fn default_tick_interval() -> u64 {
    10_000
}

fn default_guard_delay() -> u64 {
    2_000
}

fn default_debounce() -> u64 {
    2_000
}

/// What the market-data client does when the provider cannot be reached
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackPolicy {
    /// Serve the built-in demo dataset
    #[default]
    StaticDemo,
    /// Return the error to the caller
    Propagate,
}

/// Market-data provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketDataConfig {
    /// Base URL of the CoinGecko-compatible API
    #[serde(default = "default_market_data_url")]
    pub url: String,
    /// Coin ids to fetch
    #[serde(default = "default_coin_ids")]
    pub coin_ids: Vec<String>,
    /// Behaviour on provider failure
    #[serde(default)]
    pub fallback: FallbackPolicy,
    /// Refresh period in seconds
    #[serde(default = "default_market_refresh")]
    pub refresh_interval_seconds: u64,
}

impl Default for MarketDataConfig {
    fn default() -> Self {
        Self {
            url: default_market_data_url(),
            coin_ids: default_coin_ids(),
            fallback: FallbackPolicy::default(),
            refresh_interval_seconds: default_market_refresh(),
        }
    }
}

fn default_market_data_url() -> String {
    "https://api.coingecko.com/api/v3".to_string()
}

fn default_coin_ids() -> Vec<String> {
    ["bitcoin", "ethereum", "ripple", "binancecoin", "solana", "cardano"]
        .iter()
        .map(|id| id.to_string())
        .collect()
}

fn default_market_refresh() -> u64 {
    30
}

/// General application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppSettings {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            request_timeout_seconds: default_request_timeout(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_request_timeout() -> u64 {
    30
}
