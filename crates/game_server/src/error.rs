//! Error types and handling for the game server.
//!
//! This module defines the error types that can occur during server operations,
//! providing clear categorization of different failure modes. Handler errors
//! render to the exact `Message` strings clients receive on the wire.

/// Enumeration of possible server errors.
///
/// Categorizes errors into network-related and internal server errors
/// to help with debugging and error handling.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Network-related errors such as binding failures or connection issues
    #[error("Network error: {0}")]
    Network(String),

    /// Internal server errors such as a rejected connection or a broken writer task
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Structured failures returned by message handlers.
///
/// The `Display` output of each variant is the `Message` field of the
/// `{"Status":"Error"}` reply, so the strings here are part of the wire
/// protocol and must not be reworded casually.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HandlerError {
    #[error("Invalid Login message")]
    InvalidLogin,

    #[error("Invalid UpdateResources message")]
    InvalidUpdateResources,

    #[error("Invalid SendGift message")]
    InvalidSendGift,

    #[error("Player is already connected")]
    AlreadyConnected,

    #[error("Failed to add player")]
    AddPlayerFailed,

    #[error("Invalid resource type")]
    InvalidResourceType,

    #[error("Player not found")]
    PlayerNotFound,

    #[error("Sender or friend not found")]
    SenderOrFriendNotFound,

    /// Carries the resource type exactly as the client sent it.
    #[error("Insufficient {0}")]
    Insufficient(String),

    /// The payload was not shaped like the message it claimed to be.
    #[error("Invalid JSON format")]
    InvalidJson(String),

    /// A handler failed in a way it did not anticipate (including panics).
    #[error("An unexpected error occurred")]
    Unexpected(String),
}

impl HandlerError {
    /// Diagnostic detail attached to the reply, if any.
    pub fn details(&self) -> Option<&str> {
        match self {
            HandlerError::InvalidJson(details) | HandlerError::Unexpected(details) => {
                Some(details.as_str())
            }
            _ => None,
        }
    }
}
