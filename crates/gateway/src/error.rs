//! Error types for the gateway layer

use lobby_chat::ChatError;
use thiserror::Error;

/// Gateway error types
#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("Invalid frame: {0}")]
    InvalidFrame(String),

    #[error("Destination not handled by this server: {0}")]
    UnknownDestination(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error(transparent)]
    Chat(#[from] ChatError),
}

impl GatewayError {
    /// Code carried in the `error` field of error frames
    pub fn code(&self) -> &'static str {
        match self {
            GatewayError::InvalidFrame(_) => "INVALID_FRAME",
            GatewayError::UnknownDestination(_) => "UNKNOWN_DESTINATION",
            GatewayError::Configuration(_) => "CONFIGURATION_ERROR",
            GatewayError::Chat(error) => error.code(),
        }
    }
}

/// Result type for gateway operations
pub type GatewayResult<T> = Result<T, GatewayError>;

impl From<serde_json::Error> for GatewayError {
    fn from(error: serde_json::Error) -> Self {
        GatewayError::InvalidFrame(error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chat_errors_keep_their_code() {
        let error = GatewayError::from(ChatError::NotJoined);
        assert_eq!(error.code(), "NOT_JOINED");
        assert_eq!(error.to_string(), "Session has not joined the chat");
    }

    #[test]
    fn json_errors_become_invalid_frames() {
        let parse = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        assert_eq!(GatewayError::from(parse).code(), "INVALID_FRAME");
    }
}
