//! Market data module - dashboard prices from CoinGecko
//!
//! Display only; nothing here feeds the bot's decisions.

pub mod coingecko;
pub mod fallback;

pub use coingecko::MarketDataClient;
pub use fallback::{demo_tickers, fetch_with_fallback};
