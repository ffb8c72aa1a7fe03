//! Authentication headers for the broker API
//!
//! The broker authenticates with an opaque API token and expects a
//! millisecond timestamp on every request.

use crate::common::errors::{BotError, Result};

/// Header carrying the API token
pub const API_TOKEN_HEADER: &str = "api-token";
/// Header carrying the request timestamp in milliseconds
pub const TIMESTAMP_HEADER: &str = "x-timestamp";

/// Generate authentication headers for a request issued now
pub fn generate_auth_headers(api_token: &str) -> Result<AuthHeaders> {
    if api_token.trim().is_empty() {
        return Err(BotError::Authentication("API token is empty".to_string()));
    }

    Ok(AuthHeaders {
        api_token: api_token.to_string(),
        timestamp_ms: chrono::Utc::now().timestamp_millis(),
    })
}

/// Authentication headers for API requests
#[derive(Debug, Clone)]
pub struct AuthHeaders {
    pub api_token: String,
    pub timestamp_ms: i64,
}

impl AuthHeaders {
    /// Add authentication headers to a reqwest RequestBuilder
    pub fn apply_to_request(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        request
            .header(API_TOKEN_HEADER, &self.api_token)
            .header(TIMESTAMP_HEADER, self.timestamp_ms.to_string())
    }
}
