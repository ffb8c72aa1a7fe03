//! Broker module - Client implementation for the broker trade API

pub mod auth;
pub mod messages;
pub mod rest;

pub use messages::{OpenTradeRequest, OpenTradeResponse};
pub use rest::BrokerRestClient;
