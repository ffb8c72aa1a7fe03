use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::common::types::{is_bot_symbol, Direction, BOT_SYMBOLS};

/// How an entry was chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    /// Same instrument and side as the most recent loss
    GaleContinuation,
    /// Random instrument and side for a new cycle
    Fresh,
}

/// Instrument and side for the next order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryDecision {
    pub symbol: String,
    pub direction: Direction,
    pub kind: EntryKind,
}

/// Picks what to trade next
///
/// The random source is injected so tests can seed it.
#[derive(Debug, Clone)]
pub struct EntryPolicy<R = StdRng> {
    rng: R,
}

impl EntryPolicy<StdRng> {
    /// Policy backed by an OS-seeded generator
    pub fn from_entropy() -> Self {
        Self::new(StdRng::from_entropy())
    }

    /// Policy with a fixed seed
    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> EntryPolicy<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }

    /// Decide the next entry
    ///
    /// Continues the gale on the last losing symbol and direction when a
    /// loss streak is open and that symbol is tradable; otherwise draws a
    /// symbol uniformly from the universe and a direction with even odds.
    pub fn decide(
        &mut self,
        consecutive_losses: u32,
        last_loss_symbol: Option<&str>,
        last_loss_direction: Option<Direction>,
    ) -> EntryDecision {
        if consecutive_losses > 0 {
            if let (Some(symbol), Some(direction)) = (last_loss_symbol, last_loss_direction) {
                if is_bot_symbol(symbol) {
                    return EntryDecision {
                        symbol: symbol.to_string(),
                        direction,
                        kind: EntryKind::GaleContinuation,
                    };
                }
            }
        }

        let symbol = BOT_SYMBOLS[self.rng.gen_range(0..BOT_SYMBOLS.len())];
        let direction = if self.rng.gen_bool(0.5) {
            Direction::Buy
        } else {
            Direction::Sell
        };

        EntryDecision {
            symbol: symbol.to_string(),
            direction,
            kind: EntryKind::Fresh,
        }
    }
}
