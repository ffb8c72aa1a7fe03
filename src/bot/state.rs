//! Controller state and per-cycle outcomes

use rust_decimal::Decimal;

use crate::common::types::Direction;
use crate::strategy::TripReason;

/// Lifecycle state of the bot
#[derive(Debug, Clone, PartialEq)]
pub enum BotState {
    /// Idle; config may be edited
    Stopped,
    /// Armed, first cycle not yet run
    Starting,
    /// Periodic trigger active
    Running,
    /// Halted by stop-win or stop-loss until re-armed or a new session begins
    BreakerTripped(TripReason),
}

impl BotState {
    /// Whether config edits must be refused
    pub fn is_active(&self) -> bool {
        matches!(self, BotState::Starting | BotState::Running)
    }
}

impl std::fmt::Display for BotState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BotState::Stopped => write!(f, "stopped"),
            BotState::Starting => write!(f, "starting"),
            BotState::Running => write!(f, "running"),
            BotState::BreakerTripped(reason) => write!(f, "breaker tripped: {}", reason),
        }
    }
}

/// What a single cycle ended up doing
#[derive(Debug, Clone, PartialEq)]
pub enum CycleOutcome {
    /// The run was stopped before or during the cycle
    Disarmed,
    /// An order was sent too recently
    Debounced,
    /// Waiting for open trades to settle
    PositionOpen { active_trades: usize },
    /// No balance has ever been read, so the breaker cannot be evaluated
    BalanceUnavailable,
    /// Stop-win or stop-loss reached
    BreakerTripped(TripReason),
    /// The broker accepted a new order
    OrderPlaced {
        trade_id: String,
        symbol: String,
        direction: Direction,
        amount: Decimal,
    },
    /// Order construction or submission failed; retried next tick
    SubmitFailed { reason: String },
}
