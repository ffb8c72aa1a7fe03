//! Error types for the application

use std::fmt;

use thiserror::Error;

/// Result type alias using our BotError
pub type Result<T> = std::result::Result<T, BotError>;

/// Main error type for broker, configuration and control loop operations
#[derive(Error, Debug)]
pub enum BotError {
    /// HTTP request errors (the request did not complete)
    #[error("HTTP request error: {0}")]
    HttpRequest(#[from] reqwest::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON parsing error: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// Authentication errors (rejected API token)
    #[error("Authentication error: {0}")]
    Authentication(String),

    /// Non-success API response
    #[error("API returned status {status}: {body}")]
    Api { status: u16, body: String },

    /// Invalid API response
    #[error("Invalid API response: {0}")]
    InvalidResponse(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Bot configuration failed validation
    #[error("Invalid bot configuration: {0}")]
    Validation(#[from] ValidationError),

    /// Order payload rejected before submission
    #[error("Invalid order: {0}")]
    InvalidOrder(String),

    /// Config edits attempted while the bot is running
    #[error("Bot configuration is locked while the bot is running")]
    ConfigLocked,

    /// Start requested while a run is already active
    #[error("Bot is already running")]
    AlreadyRunning,

    /// Start requested after the circuit breaker tripped
    #[error("Circuit breaker tripped ({0}); re-enable the bot or begin a new session")]
    BreakerTripped(String),

    /// Generic internal errors
    #[error("Internal error: {0}")]
    Internal(String),
}

impl BotError {
    /// Whether the error came from the transport or a non-success response.
    ///
    /// The control loop recovers from these on the next tick.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            BotError::HttpRequest(_)
                | BotError::Api { .. }
                | BotError::InvalidResponse(_)
                | BotError::JsonParse(_)
        )
    }
}

/// A single bot configuration field that failed validation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidField {
    BaseAmount,
    Protections,
    StopWinPercent,
    StopLossPercent,
}

impl fmt::Display for InvalidField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvalidField::BaseAmount => write!(f, "base amount must be greater than 0"),
            InvalidField::Protections => write!(f, "protections must be 0 or more"),
            InvalidField::StopWinPercent => write!(f, "stop win percent must be greater than 0"),
            InvalidField::StopLossPercent => write!(f, "stop loss percent must be greater than 0"),
        }
    }
}

/// Every invalid field found while validating a bot configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub fields: Vec<InvalidField>,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages: Vec<String> = self.fields.iter().map(|field| field.to_string()).collect();
        write!(f, "{}", messages.join("; "))
    }
}

impl std::error::Error for ValidationError {}
