//! Bot module - lifecycle and control loop of the martingale bot

pub mod controller;
pub mod events;
pub mod state;

pub use controller::{BotController, ControllerOptions};
pub use events::BotEvent;
pub use state::{BotState, CycleOutcome};
