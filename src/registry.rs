//! Session registry ("lobby")
//!
//! Tracks every live session independent of room membership. Identity-keyed
//! so removal is O(1) and works even when display names collide.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::warn;

use crate::session::Session;
use crate::types::SessionId;

/// The set of all connected sessions.
///
/// Owned explicitly and shared by `Arc` into each connection handler and
/// the admin controller; structural mutation takes the write lock,
/// broadcast iteration takes the read lock.
#[derive(Debug, Default)]
pub struct Registry {
    sessions: RwLock<HashMap<SessionId, Arc<Session>>>,
}

impl Registry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a session to the lobby.
    ///
    /// Callers issue exactly one join per connection, so no duplicate
    /// check is made.
    pub async fn join(&self, session: Arc<Session>) {
        self.sessions.write().await.insert(session.id, session);
    }

    /// Remove a session by identity. Idempotent: disconnect cleanup may
    /// race with an admin removal, and the loser is a no-op.
    pub async fn remove(&self, id: SessionId) -> Option<Arc<Session>> {
        self.sessions.write().await.remove(&id)
    }

    /// Whether the session with the given ID is currently registered
    pub async fn contains(&self, id: SessionId) -> bool {
        self.sessions.read().await.contains_key(&id)
    }

    /// Number of connected sessions
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Whether no sessions are connected
    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }

    /// Deliver a line to every registered session, best effort.
    ///
    /// The set delivered to is whatever the read lock observes; sessions
    /// joining or leaving mid-broadcast may or may not receive the line.
    /// A failed send is logged and skipped.
    pub async fn broadcast(&self, line: &str) {
        for session in self.sessions.read().await.values() {
            if let Err(e) = session.send(line) {
                warn!("Dropping lobby broadcast to {}: {}", session.id, e);
            }
        }
    }

    /// Find a session by display name; first match wins since names are
    /// not unique. Used by the admin kick/ban path.
    pub async fn find_by_name(&self, name: &str) -> Option<Arc<Session>> {
        for session in self.sessions.read().await.values() {
            if session.name().await == name {
                return Some(session.clone());
            }
        }
        None
    }
}
