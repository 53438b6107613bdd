//! Error types for the chat domain.

use thiserror::Error;

/// Result type alias for chat operations
pub type ChatResult<T> = Result<T, ChatError>;

/// Main error type for the chat domain
#[derive(Debug, Error)]
pub enum ChatError {
    #[error("No broker prefix routes destination: {destination}")]
    UnroutableDestination { destination: String },

    #[error("No handler for destination: {destination}")]
    UnknownDestination { destination: String },

    #[error("Session has not joined the chat")]
    NotJoined,

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ChatError {
    /// Create an unroutable destination error
    pub fn unroutable(destination: impl Into<String>) -> Self {
        Self::UnroutableDestination {
            destination: destination.into(),
        }
    }

    /// Create an unknown destination error
    pub fn unknown_destination(destination: impl Into<String>) -> Self {
        Self::UnknownDestination {
            destination: destination.into(),
        }
    }

    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Short machine readable code, used in error frames sent to clients
    pub fn code(&self) -> &'static str {
        match self {
            ChatError::UnroutableDestination { .. } => "UNROUTABLE_DESTINATION",
            ChatError::UnknownDestination { .. } => "UNKNOWN_DESTINATION",
            ChatError::NotJoined => "NOT_JOINED",
            ChatError::Validation { .. } => "VALIDATION_ERROR",
            ChatError::Serialization(_) => "SERIALIZATION_ERROR",
        }
    }
}
