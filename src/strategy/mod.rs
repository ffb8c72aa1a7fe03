//! Strategy module for bet decision making
//!
//! Everything here is pure or nearly so; the control loop in
//! [`crate::bot`] owns timing, locking and the broker.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    EACH CYCLE                               │
//! ├─────────────────────────────────────────────────────────────┤
//! │  TradeReconciler.poll()                                     │
//! │    - Fetches the recent trade page                          │
//! │    - Derives loss streak, last loss, profit, open count     │
//! │       │                                                     │
//! │       ▼                                                     │
//! │  SessionState.apply()                                       │
//! │       │                                                     │
//! │       ▼                                                     │
//! │  CircuitBreaker.evaluate() → trip / continue                │
//! │       │                                                     │
//! │       ▼ (continue)                                          │
//! │  martingale_amount() + EntryPolicy.decide()                 │
//! │    - Stake doubles per loss up to the protection bound      │
//! │    - Gale continues on the losing symbol and side           │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Components
//!
//! - [`reconcile()`]: Classifies trades and computes the [`ReconciliationSummary`]
//! - [`TradeReconciler`]: Fetches and reconciles in one step
//! - [`martingale_amount`]: Stake for the next bet
//! - [`CircuitBreaker`]: Stop-win / stop-loss evaluation
//! - [`EntryPolicy`]: Symbol and direction for the next bet
//! - [`SessionState`]: Counters carried between cycles

mod breaker;
mod entry;
mod reconcile;
mod session;
mod sizing;

pub use breaker::{CircuitBreaker, TripKind, TripReason};

pub use entry::{EntryDecision, EntryKind, EntryPolicy};

pub use reconcile::{
    reconcile,
    Reconciliation,
    ReconciliationSummary,
    TradeReconciler,
    TradeStats,
};

pub use session::SessionState;

pub use sizing::martingale_amount;
