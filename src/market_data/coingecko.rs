//! CoinGecko `/coins/markets` client

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, instrument};
use url::Url;

use crate::common::errors::{BotError, Result};
use crate::common::traits::MarketDataSource;
use crate::common::types::CoinTicker;
use crate::config::types::MarketDataConfig;

/// Read-only price client for the dashboard coins
#[derive(Debug, Clone)]
pub struct MarketDataClient {
    client: Client,
    base_url: String,
    coin_ids: Vec<String>,
}

impl MarketDataClient {
    /// Create a new client with the default 30 second timeout
    pub fn new(base_url: &str, coin_ids: Vec<String>) -> Result<Self> {
        Self::with_timeout(base_url, coin_ids, Duration::from_secs(30))
    }

    /// Create a new client with custom timeout
    pub fn with_timeout(base_url: &str, coin_ids: Vec<String>, timeout: Duration) -> Result<Self> {
        Url::parse(base_url).map_err(|e| {
            BotError::Configuration(format!("Invalid market data URL {}: {}", base_url, e))
        })?;

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| BotError::Internal(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            coin_ids,
        })
    }

    pub fn from_config(config: &MarketDataConfig, timeout: Duration) -> Result<Self> {
        Self::with_timeout(&config.url, config.coin_ids.clone(), timeout)
    }

    /// Get price and 24h change for the configured coins, largest market cap first
    #[instrument(skip(self))]
    pub async fn get_markets(&self) -> Result<Vec<CoinTicker>> {
        let url = format!("{}/coins/markets", self.base_url);
        debug!("Fetching market data from: {}", url);

        let ids = self.coin_ids.join(",");
        let per_page = self.coin_ids.len().to_string();
        let response = self
            .client
            .get(&url)
            .query(&[
                ("vs_currency", "usd"),
                ("ids", ids.as_str()),
                ("order", "market_cap_desc"),
                ("per_page", per_page.as_str()),
                ("page", "1"),
                ("sparkline", "false"),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(BotError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let tickers: Vec<CoinTicker> = response.json().await?;
        Ok(tickers)
    }
}

#[async_trait]
impl MarketDataSource for MarketDataClient {
    async fn fetch_tickers(&self) -> Result<Vec<CoinTicker>> {
        self.get_markets().await
    }

    fn provider_name(&self) -> &'static str {
        "coingecko"
    }
}
