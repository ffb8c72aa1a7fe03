//! Notifications emitted by the controller

use rust_decimal::Decimal;

use super::state::{BotState, CycleOutcome};
use crate::common::types::Direction;
use crate::strategy::{EntryKind, ReconciliationSummary, TripReason};

/// Event sent on the controller's notification channel
#[derive(Debug, Clone, PartialEq)]
pub enum BotEvent {
    /// Lifecycle transition
    StateChanged(BotState),
    /// Counters refreshed from the broker
    Reconciled(ReconciliationSummary),
    /// The broker accepted an order
    OrderPlaced {
        trade_id: String,
        symbol: String,
        direction: Direction,
        amount: Decimal,
        kind: EntryKind,
    },
    /// An order could not be submitted
    OrderFailed { reason: String },
    /// Stop-win or stop-loss reached; the bot has stopped
    BreakerTripped(TripReason),
    /// A cycle finished
    CycleCompleted { generation: u64, outcome: CycleOutcome },
}
