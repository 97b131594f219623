//! Error types for the chat relay
//!
//! Defines application-level errors and message send errors.
//! Uses thiserror for ergonomic error definitions.

use thiserror::Error;

/// Application-level errors
///
/// Covers fatal errors (IO, configuration) and state-conflict errors
/// that are rendered back to the client as a notice.
#[derive(Debug, Error)]
pub enum AppError {
    /// IO error (fatal for the affected connection)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration file could not be parsed
    #[error("Invalid configuration: {0}")]
    Config(#[from] toml::de::Error),

    /// No room registered under the given name
    #[error("Room not found: {0}")]
    RoomNotFound(String),

    /// A room with the given name already exists
    #[error("Room already exists: {0}")]
    RoomExists(String),

    /// Session is not in any room
    #[error("Not in a room")]
    NotInRoom,

    /// Session is already in a room
    #[error("Already in a room")]
    AlreadyInRoom,
}

impl AppError {
    /// Render a state-conflict error as the line sent back to the client.
    ///
    /// Fatal variants are never shown to clients; they close the connection
    /// instead, so the fallback text is only a safety net.
    pub fn user_message(&self) -> String {
        match self {
            AppError::RoomNotFound(name) => {
                format!("Error: A chat room with name '{}' does not exist.", name)
            }
            AppError::RoomExists(name) => {
                format!("Error: Chat room '{}' already exists.", name)
            }
            AppError::NotInRoom => "You are not in a chat room.".to_string(),
            AppError::AlreadyInRoom => {
                "You are already in a chat room. Please leave it first.".to_string()
            }
            _ => "Internal error.".to_string(),
        }
    }
}

/// Message send errors
///
/// Occurs when pushing a line into a session's outbound queue fails.
#[derive(Debug, Error)]
pub enum SendError {
    /// The receiving end of the queue has been closed
    #[error("Channel closed")]
    ChannelClosed,

    /// The session's outbound queue is full (slow consumer)
    #[error("Outbound queue full")]
    QueueFull,
}
