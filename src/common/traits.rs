//! Trait definitions for external collaborators

use async_trait::async_trait;

use super::errors::Result;
use super::types::{CoinTicker, Trade, Wallet};
use crate::broker::messages::{OpenTradeRequest, OpenTradeResponse};

/// Trait for broker trade API clients
///
/// The control loop only talks to the broker through this trait, so
/// tests can swap the HTTP client for a scripted or mocked broker.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BrokerApi: Send + Sync {
    /// Fetch one page of the most recent trades, newest first
    ///
    /// # Arguments
    /// * `page` - 1-based page number
    /// * `page_size` - Number of trades per page
    async fn fetch_trades(&self, page: u32, page_size: u32) -> Result<Vec<Trade>>;

    /// Submit a new fixed-expiry order
    async fn open_trade(&self, request: &OpenTradeRequest) -> Result<OpenTradeResponse>;

    /// Fetch every wallet of the account
    async fn fetch_wallets(&self) -> Result<Vec<Wallet>>;
}

/// Trait for read-only market price providers
#[async_trait]
pub trait MarketDataSource: Send + Sync {
    /// Current price and 24h change for the configured coins
    async fn fetch_tickers(&self) -> Result<Vec<CoinTicker>>;

    /// Name of the provider, for logging
    fn provider_name(&self) -> &'static str;
}
