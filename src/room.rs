//! Room and RoomDirectory definitions
//!
//! A room is a named set of member sessions with member-scoped broadcast.
//! The directory maps room names to rooms and is the only path to a room;
//! creation is atomic with the existence check.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::warn;

use crate::session::Session;
use crate::types::SessionId;

/// A named chat room.
///
/// Membership is identity-keyed. The room never touches a session's
/// membership value; keeping the Room↔Session invariant is the command
/// router's job.
#[derive(Debug)]
pub struct Room {
    name: String,
    members: RwLock<HashMap<SessionId, Arc<Session>>>,
}

impl Room {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            members: RwLock::new(HashMap::new()),
        }
    }

    /// The room's immutable name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Add a session to the member set
    pub async fn add_member(&self, session: Arc<Session>) {
        self.members.write().await.insert(session.id, session);
    }

    /// Remove a session from the member set. Idempotent on absence.
    pub async fn remove_member(&self, id: SessionId) {
        self.members.write().await.remove(&id);
    }

    /// Whether the session is a member of this room
    pub async fn contains(&self, id: SessionId) -> bool {
        self.members.read().await.contains_key(&id)
    }

    /// Number of current members (a room may be empty)
    pub async fn member_count(&self) -> usize {
        self.members.read().await.len()
    }

    /// Deliver a line to every current member, best effort.
    ///
    /// One unreachable member must not abort delivery to the rest, so
    /// failed sends are logged and skipped.
    pub async fn broadcast(&self, line: &str) {
        for member in self.members.read().await.values() {
            if let Err(e) = member.send(line) {
                warn!("Dropping broadcast in '{}' to {}: {}", self.name, member.id, e);
            }
        }
    }
}

/// Name → room mapping.
///
/// Rooms are created explicitly and persist until process end; no
/// delete operation exists.
#[derive(Debug, Default)]
pub struct RoomDirectory {
    rooms: RwLock<HashMap<String, Arc<Room>>>,
}

impl RoomDirectory {
    /// Create an empty directory
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a room by name
    pub async fn get(&self, name: &str) -> Option<Arc<Room>> {
        self.rooms.read().await.get(name).cloned()
    }

    /// Create the named room if absent.
    ///
    /// Atomic under the directory's write lock: of N concurrent callers
    /// for the same name, exactly one observes `created == true`, and all
    /// receive the same room instance.
    pub async fn create_if_absent(&self, name: &str) -> (Arc<Room>, bool) {
        let mut rooms = self.rooms.write().await;
        match rooms.entry(name.to_string()) {
            Entry::Occupied(entry) => (entry.get().clone(), false),
            Entry::Vacant(entry) => {
                let room = Arc::new(Room::new(name));
                entry.insert(room.clone());
                (room, true)
            }
        }
    }

    /// Number of rooms ever created this process
    pub async fn room_count(&self) -> usize {
        self.rooms.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    fn make_session() -> (Arc<Session>, mpsc::Receiver<String>) {
        let (tx, rx) = mpsc::channel(8);
        (Arc::new(Session::new(SessionId::new(), tx)), rx)
    }

    #[tokio::test]
    async fn test_membership_add_remove() {
        let (room, created) = RoomDirectory::new().create_if_absent("general").await;
        assert!(created);

        let (session, _rx) = make_session();
        let id = session.id;
        room.add_member(session).await;
        assert!(room.contains(id).await);
        assert_eq!(room.member_count().await, 1);

        room.remove_member(id).await;
        assert!(!room.contains(id).await);
        // Removing again is a no-op.
        room.remove_member(id).await;
        assert_eq!(room.member_count().await, 0);
    }

    #[tokio::test]
    async fn test_broadcast_scoped_to_members() {
        let directory = RoomDirectory::new();
        let (room_a, _) = directory.create_if_absent("a").await;
        let (room_b, _) = directory.create_if_absent("b").await;

        let (m1, mut rx1) = make_session();
        let (m2, mut rx2) = make_session();
        let (outsider, mut rx3) = make_session();
        room_a.add_member(m1).await;
        room_a.add_member(m2).await;
        room_b.add_member(outsider).await;

        room_a.broadcast("hello a").await;

        assert_eq!(rx1.recv().await.unwrap(), "hello a");
        assert_eq!(rx2.recv().await.unwrap(), "hello a");
        assert!(rx3.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_create_if_absent_returns_same_room() {
        let directory = RoomDirectory::new();
        let (first, created_first) = directory.create_if_absent("general").await;
        let (second, created_second) = directory.create_if_absent("general").await;

        assert!(created_first);
        assert!(!created_second);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(directory.room_count().await, 1);
    }

    #[tokio::test]
    async fn test_concurrent_creation_is_unique() {
        let directory = Arc::new(RoomDirectory::new());

        let mut handles = Vec::new();
        for _ in 0..32 {
            let directory = directory.clone();
            handles.push(tokio::spawn(async move {
                directory.create_if_absent("contested").await
            }));
        }

        let mut created_count = 0;
        let mut rooms: Vec<Arc<Room>> = Vec::new();
        for handle in handles {
            let (room, created) = handle.await.unwrap();
            if created {
                created_count += 1;
            }
            rooms.push(room);
        }

        assert_eq!(created_count, 1);
        assert!(rooms.windows(2).all(|w| Arc::ptr_eq(&w[0], &w[1])));
        assert_eq!(directory.room_count().await, 1);
    }

    #[tokio::test]
    async fn test_lookup_missing_room() {
        let directory = RoomDirectory::new();
        assert!(directory.get("nowhere").await.is_none());
    }
}
