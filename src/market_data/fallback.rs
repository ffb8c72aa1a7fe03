//! Fallback handling for market data

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tracing::warn;

use crate::common::errors::Result;
use crate::common::traits::MarketDataSource;
use crate::common::types::CoinTicker;
use crate::config::types::FallbackPolicy;

/// Fixed dataset served when the provider is unreachable
pub fn demo_tickers() -> Vec<CoinTicker> {
    vec![
        ticker("bitcoin", "btc", "Bitcoin", dec!(43250.0), dec!(2.5)),
        ticker("ethereum", "eth", "Ethereum", dec!(2650.0), dec!(-1.2)),
        ticker("ripple", "xrp", "XRP", dec!(0.62), dec!(4.8)),
        ticker("binancecoin", "bnb", "BNB", dec!(315.5), dec!(1.9)),
        ticker("solana", "sol", "Solana", dec!(98.75), dec!(-0.8)),
        ticker("cardano", "ada", "Cardano", dec!(0.48), dec!(3.2)),
    ]
}

fn ticker(id: &str, symbol: &str, name: &str, price: Decimal, change: Decimal) -> CoinTicker {
    CoinTicker {
        id: id.to_string(),
        symbol: symbol.to_string(),
        name: name.to_string(),
        current_price: price,
        price_change_percentage_24h: Some(change),
    }
}

/// Fetch tickers, applying `policy` when the source fails
pub async fn fetch_with_fallback<S>(source: &S, policy: FallbackPolicy) -> Result<Vec<CoinTicker>>
where
    S: MarketDataSource + ?Sized,
{
    match source.fetch_tickers().await {
        Ok(tickers) => Ok(tickers),
        Err(err) => match policy {
            FallbackPolicy::StaticDemo => {
                warn!(
                    provider = source.provider_name(),
                    "Market data unavailable, serving demo prices: {}", err
                );
                Ok(demo_tickers())
            }
            FallbackPolicy::Propagate => Err(err),
        },
    }
}
