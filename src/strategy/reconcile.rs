//! Trade reconciliation
//!
//! Turns one page of broker trades into the counters the control loop
//! works from: the open loss streak, the last losing entry, session profit
//! and the number of open positions.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use tracing::{debug, error, warn};

use crate::common::traits::BrokerApi;
use crate::common::types::{Direction, Trade, TradeStatus};

/// Win/loss statistics over the session's trades
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TradeStats {
    pub wins: u32,
    pub losses: u32,
    /// Pending plus completed trades
    pub total_trades: usize,
    /// Percentage of completed trades that won
    pub win_rate: Decimal,
    /// Settlement time of the most recent completed trade
    pub last_trade_time: Option<DateTime<Utc>>,
}

/// Counters derived from one reconciliation pass
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReconciliationSummary {
    pub consecutive_losses: u32,
    pub last_loss_symbol: Option<String>,
    pub last_loss_direction: Option<Direction>,
    pub cumulative_profit: Decimal,
    pub active_trade_count: usize,
    pub stats: TradeStats,
}

/// Classified trades plus their summary
#[derive(Debug, Clone, PartialEq)]
pub struct Reconciliation {
    /// Pending trades, newest open time first
    pub pending: Vec<Trade>,
    /// Won or lost trades, newest settlement first
    pub completed: Vec<Trade>,
    pub summary: ReconciliationSummary,
}

/// Classify a page of trades relative to the session start
///
/// Trades opened before `session_start` and cancelled trades are ignored.
pub fn reconcile(trades: Vec<Trade>, session_start: DateTime<Utc>) -> Reconciliation {
    let mut session_trades: Vec<Trade> = trades
        .into_iter()
        .filter(|trade| trade.open_time >= session_start)
        .collect();
    session_trades.sort_by(|a, b| b.open_time.cmp(&a.open_time));

    let (pending, rest): (Vec<Trade>, Vec<Trade>) = session_trades
        .into_iter()
        .partition(|trade| trade.status == TradeStatus::Pending);

    let mut completed: Vec<Trade> = rest
        .into_iter()
        .filter(|trade| trade.status.is_completed())
        .collect();
    completed.sort_by(|a, b| b.settled_at().cmp(&a.settled_at()));

    let mut consecutive_losses = 0u32;
    let mut last_loss: Option<(String, Direction)> = None;
    for trade in &completed {
        match trade.status {
            TradeStatus::Loss => {
                consecutive_losses += 1;
                if last_loss.is_none() {
                    last_loss = Some((trade.symbol.clone(), trade.direction));
                }
            }
            TradeStatus::Win => break,
            _ => {}
        }
    }

    let wins = completed
        .iter()
        .filter(|trade| trade.status == TradeStatus::Win)
        .count() as u32;
    let losses = completed.len() as u32 - wins;
    let cumulative_profit: Decimal = completed.iter().map(|trade| trade.result).sum();
    let win_rate = if completed.is_empty() {
        Decimal::ZERO
    } else {
        (Decimal::from(wins) * Decimal::ONE_HUNDRED / Decimal::from(completed.len() as u64))
            .round_dp(2)
    };

    let (last_loss_symbol, last_loss_direction) = match last_loss {
        Some((symbol, direction)) => (Some(symbol), Some(direction)),
        None => (None, None),
    };

    let summary = ReconciliationSummary {
        consecutive_losses,
        last_loss_symbol,
        last_loss_direction,
        cumulative_profit,
        active_trade_count: pending.len(),
        stats: TradeStats {
            wins,
            losses,
            total_trades: pending.len() + completed.len(),
            win_rate,
            last_trade_time: completed.first().map(Trade::settled_at),
        },
    };

    Reconciliation {
        pending,
        completed,
        summary,
    }
}

/// Fetches the recent trade page and reconciles it
pub struct TradeReconciler<B> {
    broker: Arc<B>,
    page_size: u32,
}

impl<B: BrokerApi> TradeReconciler<B> {
    pub fn new(broker: Arc<B>, page_size: u32) -> Self {
        Self { broker, page_size }
    }

    /// Poll the broker once
    ///
    /// Returns `None` when the request fails or the broker answers with a
    /// non-success status; callers keep their previous counters in that case.
    pub async fn poll(&self, session_start: DateTime<Utc>) -> Option<Reconciliation> {
        match self.broker.fetch_trades(1, self.page_size).await {
            Ok(trades) => {
                let reconciliation = reconcile(trades, session_start);
                let summary = &reconciliation.summary;
                debug!(
                    consecutive_losses = summary.consecutive_losses,
                    last_loss_symbol = ?summary.last_loss_symbol,
                    last_loss_direction = ?summary.last_loss_direction,
                    profit = %summary.cumulative_profit,
                    pending = summary.active_trade_count,
                    "Reconciled trades"
                );
                Some(reconciliation)
            }
            Err(err) if err.is_recoverable() => {
                warn!("Trade reconciliation failed, keeping previous counters: {}", err);
                None
            }
            Err(err) => {
                error!("Trade reconciliation rejected, keeping previous counters: {}", err);
                None
            }
        }
    }
}
