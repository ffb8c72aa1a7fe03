//! Domain types shared across the broker client and the bot

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};

/// Symbols the bot is allowed to trade
pub const BOT_SYMBOLS: [&str; 6] = [
    "APPLE.OTC",
    "XRPUSDT",
    "ETHUSDT",
    "BTCUSDT",
    "SOLUSDT",
    "GOOGLUSDT.OTC",
];

/// Returns true if `symbol` belongs to the bot's trading universe
pub fn is_bot_symbol(symbol: &str) -> bool {
    BOT_SYMBOLS.contains(&symbol)
}

/// Direction of a fixed-expiry bet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    Buy,
    Sell,
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Direction::Buy => write!(f, "BUY"),
            Direction::Sell => write!(f, "SELL"),
        }
    }
}

/// Normalised trade outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TradeStatus {
    Pending,
    Win,
    Loss,
    Cancelled,
}

impl TradeStatus {
    /// Whether the trade has settled as a win or a loss
    pub fn is_completed(&self) -> bool {
        matches!(self, TradeStatus::Win | TradeStatus::Loss)
    }
}

/// A trade as mirrored from the broker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    /// Broker trade identifier
    pub id: String,
    /// Instrument symbol
    pub symbol: String,
    /// Bet direction
    pub direction: Direction,
    /// Stake
    pub amount: Decimal,
    /// When the trade was opened
    pub open_time: DateTime<Utc>,
    /// When the trade was last updated by the broker
    pub close_time: Option<DateTime<Utc>>,
    /// Normalised status
    pub status: TradeStatus,
    /// Payout reported by the broker
    pub payout: Option<Decimal>,
    /// Realised profit or loss
    pub result: Decimal,
}

impl Trade {
    /// Time used to order completed trades: close time, falling back to open time
    pub fn settled_at(&self) -> DateTime<Utc> {
        self.close_time.unwrap_or(self.open_time)
    }
}

/// A broker wallet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Wallet {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    #[serde(default, deserialize_with = "deserialize_optional_id")]
    pub user_id: Option<String>,
    /// Wallet type, e.g. "REAL" or "DEMO"
    #[serde(rename = "type")]
    pub wallet_type: String,
    pub balance: Decimal,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Wallet {
    pub fn is_real(&self) -> bool {
        self.wallet_type == "REAL"
    }
}

/// Sum of balances over REAL wallets
pub fn total_real_balance(wallets: &[Wallet]) -> Decimal {
    wallets
        .iter()
        .filter(|wallet| wallet.is_real())
        .map(|wallet| wallet.balance)
        .sum()
}

/// Price snapshot for a coin from the market-data provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoinTicker {
    pub id: String,
    pub symbol: String,
    pub name: String,
    pub current_price: Decimal,
    #[serde(default)]
    pub price_change_percentage_24h: Option<Decimal>,
}

/// Broker ids arrive as strings or numbers depending on the endpoint
#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Text(String),
    Number(i64),
}

impl From<RawId> for String {
    fn from(raw: RawId) -> Self {
        match raw {
            RawId::Text(text) => text,
            RawId::Number(number) => number.to_string(),
        }
    }
}

pub(crate) fn deserialize_id<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    RawId::deserialize(deserializer).map(String::from)
}

pub(crate) fn deserialize_optional_id<'de, D>(
    deserializer: D,
) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<RawId>::deserialize(deserializer)?.map(String::from))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn wallet(wallet_type: &str, balance: Decimal) -> Wallet {
        Wallet {
            id: format!("w-{}", wallet_type),
            user_id: None,
            wallet_type: wallet_type.to_string(),
            balance,
            created_at: None,
        }
    }

    #[test]
    fn test_total_real_balance_ignores_demo() {
        let wallets = vec![
            wallet("REAL", dec!(600)),
            wallet("DEMO", dec!(10000)),
            wallet("REAL", dec!(400)),
        ];
        assert_eq!(total_real_balance(&wallets), dec!(1000));
        assert_eq!(total_real_balance(&[]), Decimal::ZERO);
    }

    #[test]
    fn test_wallet_accepts_numeric_ids() {
        let wallet: Wallet = serde_json::from_str(
            r#"{"id": 1, "userId": 42, "type": "REAL", "balance": 1000}"#,
        )
        .unwrap();
        assert_eq!(wallet.id, "1");
        assert_eq!(wallet.user_id.as_deref(), Some("42"));
        assert!(wallet.is_real());

        let wallet: Wallet = serde_json::from_str(
            r#"{"id": "w-9", "userId": null, "type": "DEMO", "balance": 5}"#,
        )
        .unwrap();
        assert_eq!(wallet.id, "w-9");
        assert_eq!(wallet.user_id, None);
    }

    #[test]
    fn test_bot_symbols() {
        assert!(is_bot_symbol("BTCUSDT"));
        assert!(is_bot_symbol("GOOGLUSDT.OTC"));
        assert!(!is_bot_symbol("DOGEUSDT"));
        assert!(!is_bot_symbol("btcusdt"));
    }

    #[test]
    fn test_settled_at_falls_back_to_open_time() {
        let open_time = Utc::now();
        let trade = Trade {
            id: "t1".to_string(),
            symbol: "BTCUSDT".to_string(),
            direction: Direction::Buy,
            amount: dec!(1),
            open_time,
            close_time: None,
            status: TradeStatus::Loss,
            payout: None,
            result: dec!(-1),
        };
        assert_eq!(trade.settled_at(), open_time);
    }
}
