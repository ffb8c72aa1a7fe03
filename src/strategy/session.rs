//! Per-session bot state

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use tokio::time::Instant;

use super::reconcile::{ReconciliationSummary, TradeStats};
use super::sizing::martingale_amount;
use crate::common::types::Direction;
use crate::config::types::BotConfig;

/// Everything the control loop remembers between cycles
///
/// Trades opened before `session_start` are never counted.
#[derive(Debug, Clone)]
pub struct SessionState {
    pub session_start: DateTime<Utc>,
    pub config: BotConfig,
    pub consecutive_losses: u32,
    pub last_loss_symbol: Option<String>,
    pub last_loss_direction: Option<Direction>,
    pub cumulative_profit: Decimal,
    pub active_trade_count: usize,
    pub bot_running: bool,
    /// Time of the last accepted order, used for debouncing
    pub last_attempt: Option<Instant>,
    /// Most recent successful balance read
    pub last_known_balance: Option<Decimal>,
    pub stats: TradeStats,
}

impl SessionState {
    pub fn new(config: BotConfig, session_start: DateTime<Utc>) -> Self {
        Self {
            session_start,
            config,
            consecutive_losses: 0,
            last_loss_symbol: None,
            last_loss_direction: None,
            cumulative_profit: Decimal::ZERO,
            active_trade_count: 0,
            bot_running: false,
            last_attempt: None,
            last_known_balance: None,
            stats: TradeStats::default(),
        }
    }

    /// Overwrite the derived counters with a fresh reconciliation
    pub fn apply(&mut self, summary: &ReconciliationSummary) {
        self.consecutive_losses = summary.consecutive_losses;
        self.last_loss_symbol = summary.last_loss_symbol.clone();
        self.last_loss_direction = summary.last_loss_direction;
        self.cumulative_profit = summary.cumulative_profit;
        self.active_trade_count = summary.active_trade_count;
        self.stats = summary.stats.clone();
    }

    /// Start a new session at `session_start`, keeping the config
    pub fn reset(&mut self, session_start: DateTime<Utc>) {
        let config = self.config.clone();
        let balance = self.last_known_balance;
        *self = Self::new(config, session_start);
        self.last_known_balance = balance;
    }

    /// Stake for the next order given the current streak
    pub fn next_amount(&self) -> Decimal {
        martingale_amount(
            self.consecutive_losses,
            self.config.base_amount,
            self.config.max_protections(),
        )
    }

    /// Whether another order may be sent at `now`
    pub fn debounced(&self, now: Instant, debounce: std::time::Duration) -> bool {
        match self.last_attempt {
            Some(last) => now.saturating_duration_since(last) < debounce,
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::time::Duration;

    fn config() -> BotConfig {
        BotConfig {
            base_amount: dec!(2),
            protections: 3,
            stop_win_percent: dec!(10),
            stop_loss_percent: dec!(5),
        }
    }

    #[test]
    fn test_apply_overwrites_counters() {
        let mut session = SessionState::new(config(), Utc::now());
        session.consecutive_losses = 5;
        session.last_loss_symbol = Some("SOLUSDT".to_string());

        let summary = ReconciliationSummary {
            consecutive_losses: 2,
            last_loss_symbol: Some("BTCUSDT".to_string()),
            last_loss_direction: Some(Direction::Sell),
            cumulative_profit: dec!(-6),
            active_trade_count: 1,
            stats: TradeStats::default(),
        };
        session.apply(&summary);

        assert_eq!(session.consecutive_losses, 2);
        assert_eq!(session.last_loss_symbol.as_deref(), Some("BTCUSDT"));
        assert_eq!(session.last_loss_direction, Some(Direction::Sell));
        assert_eq!(session.cumulative_profit, dec!(-6));
        assert_eq!(session.active_trade_count, 1);
        assert_eq!(session.next_amount(), dec!(8));
    }

    #[test]
    fn test_reset_clears_session_but_keeps_config() {
        let start = Utc::now();
        let mut session = SessionState::new(config(), start);
        session.consecutive_losses = 3;
        session.cumulative_profit = dec!(-14);
        session.bot_running = true;
        session.last_known_balance = Some(dec!(500));

        let later = start + chrono::Duration::minutes(5);
        session.reset(later);

        assert_eq!(session.session_start, later);
        assert_eq!(session.consecutive_losses, 0);
        assert_eq!(session.cumulative_profit, Decimal::ZERO);
        assert!(!session.bot_running);
        assert_eq!(session.config, config());
        assert_eq!(session.last_known_balance, Some(dec!(500)));
    }

    #[test]
    fn test_debounce_window() {
        let mut session = SessionState::new(config(), Utc::now());
        let now = Instant::now();
        assert!(!session.debounced(now, Duration::from_secs(2)));

        session.last_attempt = Some(now);
        assert!(session.debounced(now + Duration::from_millis(1500), Duration::from_secs(2)));
        assert!(!session.debounced(now + Duration::from_secs(2), Duration::from_secs(2)));
    }
}
