//! GaleTrader Library
//!
//! A martingale bot for fixed-expiry trades on the broker trade API, with
//! stop-win/stop-loss circuit breaking and a read-only market price feed.

pub mod bot;
pub mod broker;
pub mod common;
pub mod config;
pub mod market_data;
pub mod strategy;

// Re-export commonly used types
pub use bot::{BotController, BotEvent, BotState, ControllerOptions, CycleOutcome};
pub use broker::rest::BrokerRestClient;
pub use common::errors::{BotError, Result};
pub use common::traits::{BrokerApi, MarketDataSource};
pub use common::types::{CoinTicker, Direction, Trade, TradeStatus, Wallet};
pub use config::types::AppConfig;
pub use market_data::MarketDataClient;

// Strategy types
pub use strategy::{
    martingale_amount, reconcile, CircuitBreaker, EntryDecision, EntryKind, EntryPolicy,
    ReconciliationSummary, SessionState, TradeReconciler, TripKind, TripReason,
};
