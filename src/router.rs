//! Command parsing and dispatch
//!
//! Each inbound line is trimmed and classified: a leading `/` marks a
//! control command, anything else is a chat message. The router is the
//! one place that mutates session membership, keeping the Room↔Session
//! invariant in a single pair of hands.

use std::sync::Arc;

use chrono::Local;
use tracing::{info, warn};

use crate::error::AppError;
use crate::history::HistorySink;
use crate::registry::Registry;
use crate::room::RoomDirectory;
use crate::session::{Membership, Session};

/// Reply sent to a client that chats without being in a room
const NOT_IN_ROOM_HINT: &str =
    "You are not in a chat room. Use /join <room_name> to join a chat room.";

/// A classified input line.
///
/// Command names are case-sensitive and matched exactly on the first
/// whitespace-delimited token; a wrong argument count is rejected at
/// parse time so no handler ever sees a partial command.
#[derive(Debug, PartialEq, Eq)]
pub enum Command {
    /// `/create <name>`
    Create(String),
    /// `/join <name>`
    Join(String),
    /// `/leave`
    Leave,
    /// `/setUsername <name>`
    SetUsername(String),
    /// Plain chat text (possibly empty)
    Chat(String),
    /// Recognized command with malformed arguments
    Usage(&'static str),
    /// Unrecognized `/...` token
    Unknown(String),
}

impl Command {
    /// Classify one raw input line
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        if !line.starts_with('/') {
            return Command::Chat(line.to_string());
        }

        let parts: Vec<&str> = line.split_whitespace().collect();
        match parts[0] {
            "/create" => match parts.as_slice() {
                [_, name] => Command::Create((*name).to_string()),
                _ => Command::Usage("Usage: /create <chat_name>"),
            },
            "/join" => match parts.as_slice() {
                [_, name] => Command::Join((*name).to_string()),
                _ => Command::Usage("Usage: /join <chat_name>"),
            },
            "/leave" => Command::Leave,
            "/setUsername" => match parts.as_slice() {
                [_, name] => Command::SetUsername((*name).to_string()),
                _ => Command::Usage("Usage: /setUsername <username>"),
            },
            other => Command::Unknown(other.to_string()),
        }
    }
}

/// Format one chat line for room broadcast
fn chat_line(name: &str, text: &str) -> String {
    format!("[{}] {}: {}", Local::now().format("%Y-%m-%d %H:%M:%S"), name, text)
}

/// Dispatches classified lines against the registry and room directory.
///
/// One router instance is shared by every connection handler; all state
/// lives in the structures it references.
pub struct CommandRouter {
    registry: Arc<Registry>,
    rooms: Arc<RoomDirectory>,
    history: Arc<dyn HistorySink>,
}

impl CommandRouter {
    /// Create a router over the given shared structures
    pub fn new(
        registry: Arc<Registry>,
        rooms: Arc<RoomDirectory>,
        history: Arc<dyn HistorySink>,
    ) -> Self {
        Self {
            registry,
            rooms,
            history,
        }
    }

    /// The session registry this router dispatches against
    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    /// The room directory this router dispatches against
    pub fn rooms(&self) -> &Arc<RoomDirectory> {
        &self.rooms
    }

    /// Process one inbound line from a session's read loop
    pub async fn handle_line(&self, session: &Arc<Session>, line: &str) {
        let result = match Command::parse(line) {
            Command::Create(name) => self.handle_create(session, &name).await,
            Command::Join(name) => self.handle_join(session, &name).await,
            Command::Leave => self.handle_leave(session).await,
            Command::SetUsername(name) => {
                self.handle_set_username(session, name).await;
                Ok(())
            }
            Command::Chat(text) => {
                self.handle_chat(session, &text).await;
                Ok(())
            }
            Command::Usage(usage) => {
                reply(session, usage);
                Ok(())
            }
            Command::Unknown(token) => {
                reply(session, &format!("Unknown command: {}", token));
                Ok(())
            }
        };

        // State-conflict errors become a notice; the connection stays open.
        if let Err(e) = result {
            reply(session, &e.user_message());
        }
    }

    async fn handle_create(&self, session: &Arc<Session>, name: &str) -> Result<(), AppError> {
        let (_room, created) = self.rooms.create_if_absent(name).await;
        if !created {
            return Err(AppError::RoomExists(name.to_string()));
        }
        info!("User {} created chat room {}", session.name().await, name);
        reply(session, &format!("Notice: Created chat room \"{}\".", name));
        Ok(())
    }

    async fn handle_join(&self, session: &Arc<Session>, name: &str) -> Result<(), AppError> {
        let Some(room) = self.rooms.get(name).await else {
            return Err(AppError::RoomNotFound(name.to_string()));
        };
        if session.membership().await != Membership::Unjoined {
            return Err(AppError::AlreadyInRoom);
        }

        room.add_member(session.clone()).await;
        session.set_membership(Membership::InRoom(name.to_string())).await;
        info!("User {} joined chat room {}", session.name().await, name);
        reply(session, &format!("Notice: Joined chat room \"{}\".", name));
        Ok(())
    }

    async fn handle_leave(&self, session: &Arc<Session>) -> Result<(), AppError> {
        let Membership::InRoom(name) = session.membership().await else {
            return Err(AppError::NotInRoom);
        };

        if let Some(room) = self.rooms.get(&name).await {
            room.remove_member(session.id).await;
        }
        session.set_membership(Membership::Unjoined).await;
        info!("User {} left chat room {}", session.name().await, name);
        reply(session, "Notice: Left the chat room.");
        Ok(())
    }

    async fn handle_set_username(&self, session: &Arc<Session>, name: String) {
        info!("User {} changed name to {}", session.name().await, name);
        session.set_name(name.clone()).await;
        reply(session, &format!("Username set to: {}", name));
    }

    async fn handle_chat(&self, session: &Arc<Session>, text: &str) {
        match session.membership().await {
            Membership::InRoom(name) => {
                self.history.append(text);
                if let Some(room) = self.rooms.get(&name).await {
                    let line = chat_line(&session.name().await, text);
                    room.broadcast(&line).await;
                }
            }
            Membership::Unjoined => reply(session, NOT_IN_ROOM_HINT),
        }
    }

    /// Disconnect cleanup: the equivalent of `/leave` plus registry
    /// removal, regardless of how the read loop ended. Idempotent, since
    /// an admin action may already have done part of the work.
    pub async fn cleanup(&self, session: &Arc<Session>) {
        if let Membership::InRoom(name) = session.membership().await {
            if let Some(room) = self.rooms.get(&name).await {
                room.remove_member(session.id).await;
            }
            session.set_membership(Membership::Unjoined).await;
        }
        self.registry.remove(session.id).await;
    }
}

/// Best-effort reply to a single session
fn reply(session: &Session, line: &str) {
    if let Err(e) = session.send(line) {
        warn!("Dropping reply to {}: {}", session.id, e);
    }
}
