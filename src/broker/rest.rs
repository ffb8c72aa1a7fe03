//! REST API client for the broker trade API

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use rust_decimal::Decimal;
use std::time::Duration;
use tracing::{debug, info, instrument};
use url::Url;

use super::auth::{generate_auth_headers, AuthHeaders};
use super::messages::{OpenTradeRequest, OpenTradeResponse, TradesResponse, WalletsResponse};
use crate::common::errors::{BotError, Result};
use crate::common::traits::BrokerApi;
use crate::common::types::{total_real_balance, Trade, Wallet};

/// REST API client for the broker
#[derive(Debug, Clone)]
pub struct BrokerRestClient {
    /// HTTP client
    client: Client,
    /// Base URL for the broker API
    base_url: String,
    /// API token sent with every request
    api_token: String,
}

impl BrokerRestClient {
    /// Create a new REST client with the default 30 second timeout
    pub fn new(base_url: &str, api_token: &str) -> Result<Self> {
        Self::with_timeout(base_url, api_token, Duration::from_secs(30))
    }

    /// Create a new REST client with custom timeout
    pub fn with_timeout(base_url: &str, api_token: &str, timeout: Duration) -> Result<Self> {
        Url::parse(base_url).map_err(|e| {
            BotError::Configuration(format!("Invalid broker URL {}: {}", base_url, e))
        })?;

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| BotError::Internal(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_token: api_token.to_string(),
        })
    }

    /// Fresh authentication headers; the timestamp must be current per request
    fn auth_headers(&self) -> Result<AuthHeaders> {
        generate_auth_headers(&self.api_token)
    }

    // ========================================================================
    // Trades
    // ========================================================================

    /// Get one page of recent trades
    #[instrument(skip(self))]
    pub async fn get_trades(&self, page: u32, page_size: u32) -> Result<Vec<Trade>> {
        let url = format!("{}/trades", self.base_url);
        debug!("Fetching trades from: {}", url);

        let request = self
            .client
            .get(&url)
            .query(&[("page", page), ("pageSize", page_size)]);
        let response = self.auth_headers()?.apply_to_request(request).send().await?;
        let response = check_status(response).await?;

        let trades: TradesResponse = response.json().await?;
        Ok(trades
            .data
            .into_iter()
            .map(|record| record.into_trade())
            .collect())
    }

    /// Open a new fixed-expiry trade
    #[instrument(
        skip(self),
        fields(symbol = %request.symbol, direction = %request.direction, amount = %request.amount)
    )]
    pub async fn post_open_trade(&self, request: &OpenTradeRequest) -> Result<OpenTradeResponse> {
        let url = format!("{}/trades/open", self.base_url);
        debug!("Submitting order to: {}", url);

        let builder = self.client.post(&url).json(request);
        let response = self.auth_headers()?.apply_to_request(builder).send().await?;
        let response = check_status(response).await?;

        let opened: OpenTradeResponse = response.json().await?;
        if opened.id.trim().is_empty() {
            return Err(BotError::InvalidResponse(
                "broker accepted the order without returning an id".to_string(),
            ));
        }
        Ok(opened)
    }

    // ========================================================================
    // Wallets
    // ========================================================================

    /// Get all wallets of the account
    #[instrument(skip(self))]
    pub async fn get_wallets(&self) -> Result<Vec<Wallet>> {
        let url = format!("{}/wallets", self.base_url);
        debug!("Fetching wallets from: {}", url);

        let request = self.client.get(&url);
        let response = self.auth_headers()?.apply_to_request(request).send().await?;
        let response = check_status(response).await?;

        let wallets: WalletsResponse = response.json().await?;
        Ok(wallets.into_wallets())
    }

    /// Total balance over REAL wallets
    pub async fn get_total_balance(&self) -> Result<Decimal> {
        let wallets = self.get_wallets().await?;
        Ok(total_real_balance(&wallets))
    }

    /// Check that the API token is accepted by the broker
    ///
    /// Returns the total REAL balance on success.
    pub async fn verify_credentials(&self) -> Result<Decimal> {
        let balance = self.get_total_balance().await?;
        info!(%balance, "Broker accepted API token");
        Ok(balance)
    }
}

/// Map non-success responses to errors, keeping the body for diagnostics
async fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        return Err(BotError::Authentication(format!(
            "Broker rejected API token ({}): {}",
            status, body
        )));
    }

    Err(BotError::Api {
        status: status.as_u16(),
        body,
    })
}

#[async_trait]
impl BrokerApi for BrokerRestClient {
    async fn fetch_trades(&self, page: u32, page_size: u32) -> Result<Vec<Trade>> {
        self.get_trades(page, page_size).await
    }

    async fn open_trade(&self, request: &OpenTradeRequest) -> Result<OpenTradeResponse> {
        self.post_open_trade(request).await
    }

    async fn fetch_wallets(&self) -> Result<Vec<Wallet>> {
        self.get_wallets().await
    }
}
