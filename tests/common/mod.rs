//! Common test utilities and fixtures

#![allow(dead_code)]

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use gale_trader::broker::{OpenTradeRequest, OpenTradeResponse};
use gale_trader::common::errors::{BotError, Result};
use gale_trader::common::traits::BrokerApi;
use gale_trader::common::types::{Direction, Trade, TradeStatus, Wallet};
use gale_trader::config::types::{BotConfig, SchedulerConfig};
use gale_trader::ControllerOptions;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Mutable script behind [`ScriptedBroker`]
#[derive(Debug, Default)]
pub struct BrokerScript {
    pub trades: Vec<Trade>,
    pub wallets: Vec<Wallet>,
    pub orders: Vec<OpenTradeRequest>,
    pub fail_trades: bool,
    pub fail_wallets: bool,
    pub fail_orders: bool,
    pub trades_delay: Option<Duration>,
    pub trades_calls: usize,
    next_id: u64,
}

/// In-memory broker driven by a script
///
/// Accepted orders show up as pending trades on the next fetch.
#[derive(Debug, Default)]
pub struct ScriptedBroker {
    script: Mutex<BrokerScript>,
}

impl ScriptedBroker {
    pub fn new(trades: Vec<Trade>, balance: Decimal) -> Self {
        let broker = Self::default();
        {
            let mut script = broker.script.lock().unwrap();
            script.trades = trades;
            script.wallets = vec![wallet("REAL", balance), wallet("DEMO", dec!(10000))];
        }
        broker
    }

    /// Edit the script in place
    pub fn update<F: FnOnce(&mut BrokerScript)>(&self, edit: F) {
        edit(&mut self.script.lock().unwrap());
    }

    pub fn orders(&self) -> Vec<OpenTradeRequest> {
        self.script.lock().unwrap().orders.clone()
    }

    pub fn trades_calls(&self) -> usize {
        self.script.lock().unwrap().trades_calls
    }

    /// Settle every pending trade with the given outcome
    pub fn settle_all(&self, status: TradeStatus, result: Decimal) {
        let mut script = self.script.lock().unwrap();
        let now = Utc::now();
        for trade in script.trades.iter_mut().filter(|t| t.status == TradeStatus::Pending) {
            trade.status = status;
            trade.result = result;
            trade.close_time = Some(now);
        }
    }
}

#[async_trait]
impl BrokerApi for ScriptedBroker {
    async fn fetch_trades(&self, _page: u32, page_size: u32) -> Result<Vec<Trade>> {
        let (delay, fail) = {
            let mut script = self.script.lock().unwrap();
            script.trades_calls += 1;
            (script.trades_delay, script.fail_trades)
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if fail {
            return Err(BotError::Api {
                status: 502,
                body: "bad gateway".to_string(),
            });
        }

        let mut trades = self.script.lock().unwrap().trades.clone();
        trades.sort_by(|a, b| b.open_time.cmp(&a.open_time));
        trades.truncate(page_size as usize);
        Ok(trades)
    }

    async fn open_trade(&self, request: &OpenTradeRequest) -> Result<OpenTradeResponse> {
        let mut script = self.script.lock().unwrap();
        if script.fail_orders {
            return Err(BotError::Api {
                status: 400,
                body: "market closed".to_string(),
            });
        }

        script.next_id += 1;
        let id = format!("order-{}", script.next_id);
        script.orders.push(request.clone());
        script.trades.push(Trade {
            id: id.clone(),
            symbol: request.symbol.clone(),
            direction: request.direction,
            amount: request.amount,
            open_time: Utc::now(),
            close_time: None,
            status: TradeStatus::Pending,
            payout: None,
            result: Decimal::ZERO,
        });

        Ok(OpenTradeResponse {
            id,
            extra: Default::default(),
        })
    }

    async fn fetch_wallets(&self) -> Result<Vec<Wallet>> {
        let script = self.script.lock().unwrap();
        if script.fail_wallets {
            return Err(BotError::Api {
                status: 503,
                body: "unavailable".to_string(),
            });
        }
        Ok(script.wallets.clone())
    }
}

pub fn wallet(wallet_type: &str, balance: Decimal) -> Wallet {
    Wallet {
        id: format!("wallet-{}", wallet_type.to_lowercase()),
        user_id: Some("user-1".to_string()),
        wallet_type: wallet_type.to_string(),
        balance,
        created_at: None,
    }
}

/// A settled trade opened at `opened` and closed one millisecond later
pub fn settled(
    id: &str,
    symbol: &str,
    direction: Direction,
    status: TradeStatus,
    result: Decimal,
    opened: DateTime<Utc>,
) -> Trade {
    Trade {
        id: id.to_string(),
        symbol: symbol.to_string(),
        direction,
        amount: dec!(1),
        open_time: opened,
        close_time: Some(opened + chrono::Duration::milliseconds(1)),
        status,
        payout: None,
        result,
    }
}

pub fn pending(id: &str, symbol: &str, direction: Direction, opened: DateTime<Utc>) -> Trade {
    Trade {
        id: id.to_string(),
        symbol: symbol.to_string(),
        direction,
        amount: dec!(1),
        open_time: opened,
        close_time: None,
        status: TradeStatus::Pending,
        payout: None,
        result: Decimal::ZERO,
    }
}

/// Fast scheduler for tests: 50 ms ticks, no debounce
pub fn fast_options(base_amount: Decimal, protections: i64) -> ControllerOptions {
    ControllerOptions {
        bot: BotConfig {
            base_amount,
            protections,
            stop_win_percent: dec!(10),
            stop_loss_percent: dec!(5),
        },
        scheduler: SchedulerConfig {
            tick_interval_ms: 50,
            guard_delay_ms: 20,
            debounce_ms: 0,
        },
        trades_page_size: 10,
        entry_seed: Some(99),
    }
}

/// Sample broker responses for wire-level tests
pub mod broker_responses {
    use once_cell::sync::Lazy;
    use serde_json::{json, Value};

    /// `GET /trades` page with one of each outcome
    pub static TRADES_PAGE: Lazy<Value> = Lazy::new(|| {
        json!({
            "data": [
                {
                    "id": "t-3",
                    "symbol": "BTCUSDT",
                    "direction": "BUY",
                    "amount": 4,
                    "status": "OPEN",
                    "result": "PENDING",
                    "createdAt": "2025-01-01T10:03:00Z",
                    "updatedAt": "2025-01-01T10:03:00Z",
                    "isDemo": false
                },
                {
                    "id": 2,
                    "symbol": "BTCUSDT",
                    "direction": "BUY",
                    "amount": 2,
                    "status": "CLOSED",
                    "result": "LOST",
                    "pnl": -2,
                    "createdAt": "2025-01-01T10:02:00Z",
                    "updatedAt": "2025-01-01T10:03:00Z"
                },
                {
                    "id": "t-1",
                    "symbol": "ETHUSDT",
                    "direction": "SELL",
                    "amount": 1,
                    "status": "CLOSED",
                    "result": "WON",
                    "pnl": 0.85,
                    "payout": 1.85,
                    "createdAt": "2025-01-01T10:00:00Z",
                    "updatedAt": "2025-01-01T10:01:00Z"
                },
                {
                    "id": "t-0",
                    "symbol": "SOLUSDT",
                    "direction": "SELL",
                    "amount": 1,
                    "status": "CANCELLED",
                    "createdAt": "2025-01-01T09:59:00Z"
                }
            ]
        })
    });

    /// `GET /wallets` with a real and a demo wallet
    pub static WALLETS: Lazy<Value> = Lazy::new(|| {
        json!([
            {
                "id": "w-1",
                "userId": "u-1",
                "type": "REAL",
                "balance": 600.5,
                "createdAt": "2024-12-01T00:00:00Z"
            },
            {
                "id": "w-2",
                "userId": "u-1",
                "type": "DEMO",
                "balance": 10000,
                "createdAt": "2024-12-01T00:00:00Z"
            },
            {
                "id": "w-3",
                "userId": "u-1",
                "type": "REAL",
                "balance": 399.5,
                "createdAt": "2024-12-02T00:00:00Z"
            }
        ])
    });

    /// `GET /wallets` as returned with integer ids
    pub static WALLETS_NUMERIC_IDS: Lazy<Value> = Lazy::new(|| {
        json!([
            {"id": 1, "userId": 42, "type": "REAL", "balance": 1000},
            {"id": 2, "userId": 42, "type": "DEMO", "balance": 10000}
        ])
    });
}
