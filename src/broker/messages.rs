//! Broker wire message types

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::common::errors::{BotError, Result};
use crate::common::types::{deserialize_id, is_bot_symbol, Direction, Trade, TradeStatus, Wallet};

/// Expiry of every order the bot submits
pub const CLOSE_TYPE: &str = "01:00";
/// Expiration mode of every order the bot submits
pub const EXPIRATION_TYPE: &str = "CANDLE_CLOSE";

/// Envelope of `GET /trades`
#[derive(Debug, Clone, Deserialize)]
pub struct TradesResponse {
    #[serde(default)]
    pub data: Vec<TradeRecord>,
}

/// Trade as reported by the broker
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TradeRecord {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    pub symbol: String,
    pub direction: Direction,
    pub amount: Decimal,
    /// Lifecycle status, e.g. "OPEN", "CLOSED" or "CANCELLED"
    #[serde(default)]
    pub status: Option<String>,
    /// Outcome: "WON", "LOST", "PENDING", "CANCELLED" or "COMPLETED"
    #[serde(default)]
    pub result: Option<String>,
    #[serde(default)]
    pub pnl: Option<Decimal>,
    #[serde(default)]
    pub payout: Option<Decimal>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl TradeRecord {
    /// Map the broker's result/status pair onto a [`TradeStatus`]
    ///
    /// Anything that is not a recognised settlement or cancellation is
    /// treated as still pending.
    pub fn normalized_status(&self) -> TradeStatus {
        let result = self.result.as_deref();
        let status = self.status.as_deref();

        match result {
            Some("WON") => TradeStatus::Win,
            Some("LOST") => TradeStatus::Loss,
            Some("CANCELLED") => TradeStatus::Cancelled,
            _ if status == Some("CANCELLED") => TradeStatus::Cancelled,
            _ => TradeStatus::Pending,
        }
    }

    /// Convert into the domain [`Trade`]
    pub fn into_trade(self) -> Trade {
        let status = self.normalized_status();
        Trade {
            id: self.id,
            symbol: self.symbol,
            direction: self.direction,
            amount: self.amount,
            open_time: self.created_at,
            close_time: self.updated_at,
            status,
            payout: self.payout.or(self.pnl),
            result: self.pnl.unwrap_or(Decimal::ZERO),
        }
    }
}

/// Body of `POST /trades/open`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenTradeRequest {
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    pub close_type: String,
    pub expiration_type: String,
    pub symbol: String,
    pub direction: Direction,
    pub is_demo: bool,
}

impl OpenTradeRequest {
    /// Build a real-account order, rejecting symbols outside the bot
    /// universe and non-positive amounts
    pub fn new(symbol: impl Into<String>, direction: Direction, amount: Decimal) -> Result<Self> {
        let symbol = symbol.into();

        if !is_bot_symbol(&symbol) {
            return Err(BotError::InvalidOrder(format!(
                "symbol {} is not tradable by the bot",
                symbol
            )));
        }
        if amount <= Decimal::ZERO {
            return Err(BotError::InvalidOrder(format!(
                "amount must be positive, got {}",
                amount
            )));
        }

        Ok(Self {
            amount,
            close_type: CLOSE_TYPE.to_string(),
            expiration_type: EXPIRATION_TYPE.to_string(),
            symbol,
            direction,
            is_demo: false,
        })
    }
}

/// Response of `POST /trades/open`
#[derive(Debug, Clone, Deserialize)]
pub struct OpenTradeResponse {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    /// Remaining fields, kept for logging
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// `GET /wallets` returns a bare array; an enveloped form is also accepted
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum WalletsResponse {
    List(Vec<Wallet>),
    Envelope { data: Vec<Wallet> },
}

impl WalletsResponse {
    pub fn into_wallets(self) -> Vec<Wallet> {
        match self {
            WalletsResponse::List(wallets) => wallets,
            WalletsResponse::Envelope { data } => data,
        }
    }
}
