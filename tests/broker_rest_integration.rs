//! Integration tests for the broker REST client
//!
//! The broker is mocked with wiremock; no real API calls are made.

mod common;

use common::broker_responses::{TRADES_PAGE, WALLETS, WALLETS_NUMERIC_IDS};
use gale_trader::broker::messages::OpenTradeRequest;
use gale_trader::broker::rest::BrokerRestClient;
use gale_trader::common::errors::BotError;
use gale_trader::common::types::{Direction, TradeStatus};
use pretty_assertions::assert_eq;
use rust_decimal_macros::dec;
use serde_json::json;
use wiremock::matchers::{body_json, header, header_exists, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TOKEN: &str = "test-token";

fn create_test_client(server: &MockServer) -> BrokerRestClient {
    BrokerRestClient::new(&server.uri(), TOKEN).expect("Failed to create REST client")
}

// ============================================================================
// Trades
// ============================================================================

#[tokio::test]
async fn test_get_trades_normalizes_records() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/trades"))
        .and(query_param("page", "1"))
        .and(query_param("pageSize", "10"))
        .and(header("api-token", TOKEN))
        .and(header_exists("x-timestamp"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&*TRADES_PAGE))
        .expect(1)
        .mount(&server)
        .await;

    let trades = create_test_client(&server).get_trades(1, 10).await.unwrap();
    assert_eq!(trades.len(), 4);

    assert_eq!(trades[0].status, TradeStatus::Pending);
    assert_eq!(trades[0].result, dec!(0));

    assert_eq!(trades[1].id, "2");
    assert_eq!(trades[1].status, TradeStatus::Loss);
    assert_eq!(trades[1].direction, Direction::Buy);
    assert_eq!(trades[1].result, dec!(-2));
    assert_eq!(trades[1].payout, Some(dec!(-2)));

    assert_eq!(trades[2].status, TradeStatus::Win);
    assert_eq!(trades[2].result, dec!(0.85));
    assert_eq!(trades[2].payout, Some(dec!(1.85)));
    assert!(trades[2].close_time.is_some());

    assert_eq!(trades[3].status, TradeStatus::Cancelled);
    assert_eq!(trades[3].close_time, None);
}

#[tokio::test]
async fn test_server_error_maps_to_api_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/trades"))
        .respond_with(ResponseTemplate::new(500).set_body_string("internal"))
        .mount(&server)
        .await;

    let result = create_test_client(&server).get_trades(1, 10).await;
    match result {
        Err(BotError::Api { status, body }) => {
            assert_eq!(status, 500);
            assert_eq!(body, "internal");
        }
        other => panic!("expected API error, got {:?}", other),
    }
}

// ============================================================================
// Orders
// ============================================================================

#[tokio::test]
async fn test_open_trade_sends_order_payload() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/trades/open"))
        .and(header("api-token", TOKEN))
        .and(header_exists("x-timestamp"))
        .and(body_json(json!({
            "amount": 4.0,
            "closeType": "01:00",
            "expirationType": "CANDLE_CLOSE",
            "symbol": "BTCUSDT",
            "direction": "BUY",
            "isDemo": false
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 981,
            "status": "OPEN"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let request = OpenTradeRequest::new("BTCUSDT", Direction::Buy, dec!(4)).unwrap();
    let opened = create_test_client(&server).post_open_trade(&request).await.unwrap();

    assert_eq!(opened.id, "981");
    assert_eq!(opened.extra.get("status"), Some(&json!("OPEN")));
}

#[tokio::test]
async fn test_open_trade_without_id_is_invalid_response() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/trades/open"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "" })))
        .mount(&server)
        .await;

    let request = OpenTradeRequest::new("BTCUSDT", Direction::Buy, dec!(4)).unwrap();
    let err = create_test_client(&server)
        .post_open_trade(&request)
        .await
        .unwrap_err();

    assert!(matches!(err, BotError::InvalidResponse(_)));
    assert!(err.is_recoverable());
}

// ============================================================================
// Wallets
// ============================================================================

#[tokio::test]
async fn test_total_balance_sums_real_wallets() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/wallets"))
        .and(header("api-token", TOKEN))
        .respond_with(ResponseTemplate::new(200).set_body_json(&*WALLETS))
        .mount(&server)
        .await;

    let client = create_test_client(&server);
    assert_eq!(client.get_wallets().await.unwrap().len(), 3);
    assert_eq!(client.get_total_balance().await.unwrap(), dec!(1000));
}

#[tokio::test]
async fn test_wallets_envelope_is_accepted() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/wallets"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": WALLETS.clone() })))
        .mount(&server)
        .await;

    let balance = create_test_client(&server).verify_credentials().await.unwrap();
    assert_eq!(balance, dec!(1000));
}

#[tokio::test]
async fn test_wallets_with_numeric_ids() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/wallets"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&*WALLETS_NUMERIC_IDS))
        .mount(&server)
        .await;

    let client = create_test_client(&server);
    let wallets = client.get_wallets().await.unwrap();
    assert_eq!(wallets[0].id, "1");
    assert_eq!(wallets[0].user_id.as_deref(), Some("42"));

    let balance = client.verify_credentials().await.unwrap();
    assert_eq!(balance, dec!(1000));
}

#[tokio::test]
async fn test_rejected_token_is_authentication_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/wallets"))
        .respond_with(ResponseTemplate::new(401).set_body_string("invalid token"))
        .mount(&server)
        .await;

    let result = create_test_client(&server).verify_credentials().await;
    assert!(matches!(result, Err(BotError::Authentication(_))), "{:?}", result);
}
