//! Stop-win / stop-loss circuit breaker
//!
//! Thresholds are a percentage of the total balance. Once tripped the bot
//! stays halted until the user re-enables it or starts a new session.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::config::types::BotConfig;

/// Which threshold was crossed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TripKind {
    StopWin,
    StopLoss,
}

/// Why the breaker tripped
#[derive(Debug, Clone, PartialEq)]
pub struct TripReason {
    pub kind: TripKind,
    /// Cumulative session profit measured at the trip
    pub profit: Decimal,
    /// Configured threshold amount (always positive)
    pub threshold: Decimal,
    pub tripped_at: DateTime<Utc>,
}

impl std::fmt::Display for TripReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.kind {
            TripKind::StopWin => write!(
                f,
                "Stop Win reached, bot stopped. Current profit: ${:.2}. Configured limit: ${:.2}",
                self.profit, self.threshold
            ),
            TripKind::StopLoss => write!(
                f,
                "Stop Loss reached, bot stopped. Current loss: ${:.2}. Configured limit: ${:.2}",
                self.profit.abs(),
                self.threshold
            ),
        }
    }
}

/// Balance-relative stop conditions
#[derive(Debug, Clone, PartialEq)]
pub struct CircuitBreaker {
    stop_win_percent: Decimal,
    stop_loss_percent: Decimal,
}

impl CircuitBreaker {
    pub fn new(stop_win_percent: Decimal, stop_loss_percent: Decimal) -> Self {
        Self {
            stop_win_percent,
            stop_loss_percent,
        }
    }

    pub fn from_config(config: &BotConfig) -> Self {
        Self::new(config.stop_win_percent, config.stop_loss_percent)
    }

    /// Stop-win amount for a balance
    pub fn stop_win_amount(&self, total_balance: Decimal) -> Decimal {
        total_balance * self.stop_win_percent / Decimal::ONE_HUNDRED
    }

    /// Stop-loss amount for a balance, as a positive number
    pub fn stop_loss_amount(&self, total_balance: Decimal) -> Decimal {
        total_balance * self.stop_loss_percent / Decimal::ONE_HUNDRED
    }

    /// Check the session profit against both thresholds
    pub fn evaluate(
        &self,
        cumulative_profit: Decimal,
        total_balance: Decimal,
    ) -> Option<TripReason> {
        let stop_win = self.stop_win_amount(total_balance);
        if cumulative_profit >= stop_win {
            return Some(TripReason {
                kind: TripKind::StopWin,
                profit: cumulative_profit,
                threshold: stop_win,
                tripped_at: Utc::now(),
            });
        }

        let stop_loss = self.stop_loss_amount(total_balance);
        if cumulative_profit <= -stop_loss {
            return Some(TripReason {
                kind: TripKind::StopLoss,
                profit: cumulative_profit,
                threshold: stop_loss,
                tripped_at: Utc::now(),
            });
        }

        None
    }
}
