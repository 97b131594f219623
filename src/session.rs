//! Session struct definition
//!
//! Represents a connected client with its display name, room membership,
//! outbound line queue, and a shutdown signal for admin-initiated removal.

use tokio::sync::{mpsc, Notify, RwLock};

use crate::error::SendError;
use crate::types::SessionId;

/// Room membership of a session, made explicit as a two-state value
/// so the router's state machine is exhaustive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Membership {
    /// Not in any room
    Unjoined,
    /// Member of the named room
    InRoom(String),
}

/// Connected session information
///
/// Shared as `Arc<Session>` between the connection's read loop, the
/// registry, rooms, and the admin controller. The display name and
/// membership are interior-mutable; the outbound queue handle is fixed
/// for the session's lifetime.
#[derive(Debug)]
pub struct Session {
    /// Unique identifier for this session
    pub id: SessionId,
    /// Display name (not required unique)
    name: RwLock<String>,
    /// Current room membership
    membership: RwLock<Membership>,
    /// Session → writer-task line queue
    outbound: mpsc::Sender<String>,
    /// Signalled by admin kick/ban to terminate the read loop
    shutdown: Notify,
}

impl Session {
    /// Default display name before `/setUsername`
    pub const DEFAULT_NAME: &'static str = "Anonymous";

    /// Create a new session with the given ID and outbound queue handle
    pub fn new(id: SessionId, outbound: mpsc::Sender<String>) -> Self {
        Self {
            id,
            name: RwLock::new(Self::DEFAULT_NAME.to_string()),
            membership: RwLock::new(Membership::Unjoined),
            outbound,
            shutdown: Notify::new(),
        }
    }

    /// Get the current display name
    pub async fn name(&self) -> String {
        self.name.read().await.clone()
    }

    /// Replace the display name (no uniqueness check)
    pub async fn set_name(&self, name: String) {
        *self.name.write().await = name;
    }

    /// Get the current membership state
    pub async fn membership(&self) -> Membership {
        self.membership.read().await.clone()
    }

    /// Replace the membership state
    ///
    /// Only the command router and disconnect cleanup call this; rooms
    /// never reach into a session to flip its membership.
    pub async fn set_membership(&self, membership: Membership) {
        *self.membership.write().await = membership;
    }

    /// Queue one line for delivery to this session's transport.
    ///
    /// Never blocks: a full queue drops the line (the slow consumer loses
    /// its own delivery only), a closed queue means the session is gone.
    pub fn send(&self, line: &str) -> Result<(), SendError> {
        self.outbound.try_send(line.to_string()).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => SendError::QueueFull,
            mpsc::error::TrySendError::Closed(_) => SendError::ChannelClosed,
        })
    }

    /// Request termination of this session's read loop (kick/ban path)
    pub fn shutdown(&self) {
        self.shutdown.notify_one();
    }

    /// Resolves once `shutdown` has been called.
    ///
    /// A permit is stored if the signal fires before the loop awaits, so
    /// the kick is never lost to a race with a pending read.
    pub async fn shutdown_requested(&self) {
        self.shutdown.notified().await;
    }
}
