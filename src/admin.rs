//! Operator command surface
//!
//! The admin controller consumes the registry and room directory to
//! kick/ban/inspect; it owns none of them. Kick is terminal: the target's
//! shutdown signal ends its read loop, which finalizes registry removal
//! the same way a disconnect would.

use std::collections::HashSet;
use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::{Notify, RwLock};
use tracing::{error, info, warn};

use crate::registry::Registry;
use crate::room::RoomDirectory;
use crate::session::Membership;

/// Names refused at connect time.
///
/// This core only maintains the set; enforcement belongs to whatever
/// accepts connections.
#[derive(Debug, Default)]
pub struct DenyList {
    names: RwLock<HashSet<String>>,
}

impl DenyList {
    /// Create an empty deny-list
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a name to the deny-list
    pub async fn insert(&self, name: &str) {
        self.names.write().await.insert(name.to_string());
    }

    /// Whether the name is denied
    pub async fn contains(&self, name: &str) -> bool {
        self.names.read().await.contains(name)
    }

    /// Number of denied names
    pub async fn len(&self) -> usize {
        self.names.read().await.len()
    }

    /// Whether no names are denied
    pub async fn is_empty(&self) -> bool {
        self.names.read().await.is_empty()
    }
}

/// Outcome of one console line, so the loop knows when to stop
#[derive(Debug, PartialEq, Eq)]
pub enum AdminOutcome {
    /// Keep reading console input
    Continue,
    /// `/stop` was issued; shut the server down
    Stop,
}

/// Operator-facing controller over the shared core structures.
pub struct AdminController {
    registry: Arc<Registry>,
    rooms: Arc<RoomDirectory>,
    deny_list: Arc<DenyList>,
}

impl AdminController {
    /// Create a controller over the given shared structures
    pub fn new(
        registry: Arc<Registry>,
        rooms: Arc<RoomDirectory>,
        deny_list: Arc<DenyList>,
    ) -> Self {
        Self {
            registry,
            rooms,
            deny_list,
        }
    }

    /// Kick the first session matching the given display name.
    ///
    /// Removes it from its current room, notifies it, and triggers its
    /// shutdown signal; the session's own read loop finalizes removal
    /// from the registry. Returns false if no session matched.
    pub async fn kick(&self, name: &str) -> bool {
        let Some(session) = self.registry.find_by_name(name).await else {
            warn!("User {} not found", name);
            return false;
        };

        if let Membership::InRoom(room_name) = session.membership().await {
            if let Some(room) = self.rooms.get(&room_name).await {
                room.remove_member(session.id).await;
            }
            session.set_membership(Membership::Unjoined).await;
        }

        let _ = session.send("You have been kicked from the chat room.");
        session.shutdown();
        info!("User {} kicked from chat room", name);
        true
    }

    /// Ban the given display name: deny it at connect time from now on,
    /// then kick any live session carrying it.
    pub async fn ban(&self, name: &str) -> bool {
        self.deny_list.insert(name).await;
        let kicked = self.kick(name).await;
        info!("User {} banned from server", name);
        kicked
    }

    /// One-line summary of current server state
    pub async fn status(&self) -> String {
        format!(
            "{} session(s) connected, {} room(s), {} banned name(s)",
            self.registry.len().await,
            self.rooms.room_count().await,
            self.deny_list.len().await,
        )
    }

    /// Process one console input line
    pub async fn handle_line(&self, line: &str) -> AdminOutcome {
        let parts: Vec<&str> = line.split_whitespace().collect();
        let Some(&command) = parts.first() else {
            return AdminOutcome::Continue;
        };

        match command {
            "/status" => {
                info!("Current server status: {}", self.status().await);
            }
            "/stop" => {
                info!("Server stopping...");
                return AdminOutcome::Stop;
            }
            "/help" => {
                info!("command '/status' - to get current server status");
                info!("command '/stop' - to terminate server");
                info!("command '/kick username' - to kick user from chat room");
                info!("command '/ban username' - to ban user from server");
            }
            "/kick" => match parts.as_slice() {
                [_, name] => {
                    self.kick(name).await;
                }
                _ => warn!("Usage: /kick username"),
            },
            "/ban" => match parts.as_slice() {
                [_, name] => {
                    self.ban(name).await;
                }
                _ => warn!("Usage: /ban username"),
            },
            _ => warn!("Unknown command: {}", line),
        }
        AdminOutcome::Continue
    }
}

/// Drive the admin controller from stdin until `/stop` or EOF, then
/// signal process shutdown.
pub async fn run_console(admin: Arc<AdminController>, shutdown: Arc<Notify>) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        match lines.next_line().await {
            Ok(Some(line)) => {
                if admin.handle_line(&line).await == AdminOutcome::Stop {
                    break;
                }
            }
            Ok(None) => break,
            Err(e) => {
                error!("Error reading from console: {}", e);
                break;
            }
        }
    }
    shutdown.notify_one();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::Session;
    use crate::types::SessionId;
    use tokio::sync::mpsc;

    struct Fixture {
        admin: AdminController,
        registry: Arc<Registry>,
        rooms: Arc<RoomDirectory>,
        deny_list: Arc<DenyList>,
    }

    fn make_fixture() -> Fixture {
        let registry = Arc::new(Registry::new());
        let rooms = Arc::new(RoomDirectory::new());
        let deny_list = Arc::new(DenyList::new());
        let admin = AdminController::new(registry.clone(), rooms.clone(), deny_list.clone());
        Fixture {
            admin,
            registry,
            rooms,
            deny_list,
        }
    }

    async fn connect_in_room(
        fixture: &Fixture,
        name: &str,
        room_name: &str,
    ) -> (Arc<Session>, mpsc::Receiver<String>) {
        let (tx, rx) = mpsc::channel(8);
        let session = Arc::new(Session::new(SessionId::new(), tx));
        session.set_name(name.to_string()).await;
        fixture.registry.join(session.clone()).await;

        let (room, _) = fixture.rooms.create_if_absent(room_name).await;
        room.add_member(session.clone()).await;
        session
            .set_membership(Membership::InRoom(room_name.to_string()))
            .await;
        (session, rx)
    }

    #[tokio::test]
    async fn test_kick_removes_from_room_and_signals() {
        let fixture = make_fixture();
        let (session, mut rx) = connect_in_room(&fixture, "mallory", "general").await;

        assert!(fixture.admin.kick("mallory").await);

        let room = fixture.rooms.get("general").await.unwrap();
        assert!(!room.contains(session.id).await);
        assert_eq!(session.membership().await, Membership::Unjoined);
        assert_eq!(
            rx.recv().await.unwrap(),
            "You have been kicked from the chat room."
        );
        // The shutdown signal is what ends the read loop.
        session.shutdown_requested().await;
        // Registry removal is the read loop's job, not the kicker's.
        assert!(fixture.registry.contains(session.id).await);
    }

    #[tokio::test]
    async fn test_kick_unknown_name() {
        let fixture = make_fixture();
        assert!(!fixture.admin.kick("nobody").await);
    }

    #[tokio::test]
    async fn test_ban_adds_to_deny_list() {
        let fixture = make_fixture();
        let (_session, _rx) = connect_in_room(&fixture, "mallory", "general").await;

        assert!(fixture.admin.ban("mallory").await);
        assert!(fixture.deny_list.contains("mallory").await);

        // Banning an absent name still maintains the set.
        assert!(!fixture.admin.ban("ghost").await);
        assert!(fixture.deny_list.contains("ghost").await);
        assert_eq!(fixture.deny_list.len().await, 2);
    }

    #[tokio::test]
    async fn test_status_counts() {
        let fixture = make_fixture();
        let (_session, _rx) = connect_in_room(&fixture, "alice", "general").await;

        let status = fixture.admin.status().await;
        assert!(status.contains("1 session(s)"));
        assert!(status.contains("1 room(s)"));
        assert!(status.contains("0 banned name(s)"));
    }

    #[tokio::test]
    async fn test_console_dispatch() {
        let fixture = make_fixture();
        let (session, _rx) = connect_in_room(&fixture, "mallory", "general").await;

        assert_eq!(fixture.admin.handle_line("/status").await, AdminOutcome::Continue);
        assert_eq!(fixture.admin.handle_line("").await, AdminOutcome::Continue);
        assert_eq!(fixture.admin.handle_line("/kick").await, AdminOutcome::Continue);
        assert_eq!(
            fixture.admin.handle_line("/ban mallory").await,
            AdminOutcome::Continue
        );
        assert!(fixture.deny_list.contains("mallory").await);
        assert_eq!(session.membership().await, Membership::Unjoined);
        assert_eq!(fixture.admin.handle_line("/stop").await, AdminOutcome::Stop);
    }
}
