use std::collections::{HashMap, HashSet};
use log::{debug, warn};
use tokio::sync::mpsc::UnboundedSender;
use tokio::sync::RwLock;
use uuid::Uuid;
use crate::chat::model::ServerEvent;

/// One live socket per user. The connection id distinguishes this socket
/// from any later one that replaces it.
struct Session {
    connection_id: Uuid,
    sender: UnboundedSender<ServerEvent>,
    joined_rooms: HashSet<String>,
}

/// Who is online, which socket is theirs, and which rooms they have joined.
/// One session per user: a new connection replaces the old one (last wins).
#[derive(Default)]
pub struct SessionRegistry {
    sessions: RwLock<HashMap<i64, Session>>,
}

impl SessionRegistry {

    pub fn new() -> Self {
        SessionRegistry::default()
    }

    /// Registers a socket for the user and returns its connection id. An
    /// existing session is dropped, which closes the stale socket's channel.
    pub async fn connect(&self, user_id: i64, sender: UnboundedSender<ServerEvent>) -> Uuid {
        let connection_id = Uuid::new_v4();
        let mut sessions = self.sessions.write().await;
        if sessions.insert(user_id, Session { connection_id, sender, joined_rooms: HashSet::new() }).is_some() {
            warn!("User {} reconnected, replacing the previous session.", user_id);
        }
        connection_id
    }

    /// Removes the session only if it still belongs to this connection. A
    /// stale socket unwinding after a reconnect must not evict its successor.
    pub async fn disconnect(&self, user_id: i64, connection_id: Uuid) {
        let mut sessions = self.sessions.write().await;
        if sessions.get(&user_id).is_some_and(|s| s.connection_id == connection_id) {
            sessions.remove(&user_id);
            debug!("User {} disconnected.", user_id);
        }
    }

    pub async fn join_room(&self, user_id: i64, connection_id: Uuid, room_id: &str) {
        let mut sessions = self.sessions.write().await;
        if let Some(session) = sessions.get_mut(&user_id) {
            if session.connection_id == connection_id {
                session.joined_rooms.insert(room_id.to_string());
            }
        }
    }

    pub async fn leave_room(&self, user_id: i64, connection_id: Uuid, room_id: &str) {
        let mut sessions = self.sessions.write().await;
        if let Some(session) = sessions.get_mut(&user_id) {
            if session.connection_id == connection_id {
                session.joined_rooms.remove(room_id);
            }
        }
    }

    pub async fn is_connected(&self, user_id: i64) -> bool {
        self.sessions.read().await.contains_key(&user_id)
    }

    pub async fn is_joined(&self, user_id: i64, room_id: &str) -> bool {
        self.sessions.read().await
            .get(&user_id)
            .is_some_and(|s| s.joined_rooms.contains(room_id))
    }

    /// Delivers directly to one user's socket, connected or not (a closed or
    /// missing session is a no-op).
    pub async fn send_to_user(&self, user_id: i64, event: ServerEvent) {
        let sessions = self.sessions.read().await;
        if let Some(session) = sessions.get(&user_id) {
            if session.sender.send(event).is_err() {
                debug!("Dropping event for user {}, channel closed.", user_id);
            }
        }
    }

    /// Fans an event out to every session that has joined the room.
    pub async fn broadcast_to_room(&self, room_id: &str, event: &ServerEvent) {
        let sessions = self.sessions.read().await;
        for (user_id, session) in sessions.iter() {
            if session.joined_rooms.contains(room_id) {
                if session.sender.send(event.clone()).is_err() {
                    debug!("Dropping room event for user {}, channel closed.", user_id);
                }
            }
        }
    }

}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc::unbounded_channel;

    #[tokio::test]
    async fn last_connection_wins() {
        let registry = SessionRegistry::new();
        let (tx1, mut rx1) = unbounded_channel();
        let (tx2, mut rx2) = unbounded_channel();

        let first = registry.connect(7, tx1).await;
        let second = registry.connect(7, tx2).await;
        assert_ne!(first, second);

        registry.send_to_user(7, ServerEvent::Left { status: "ok".to_string(), room_id: "room_1_7".to_string() }).await;
        assert!(rx2.try_recv().is_ok());
        assert!(rx1.try_recv().is_err());
    }

    #[tokio::test]
    async fn stale_disconnect_does_not_evict_successor() {
        let registry = SessionRegistry::new();
        let (tx1, _rx1) = unbounded_channel();
        let (tx2, _rx2) = unbounded_channel();

        let first = registry.connect(7, tx1).await;
        registry.connect(7, tx2).await;

        registry.disconnect(7, first).await;
        assert!(registry.is_connected(7).await);
    }

    #[tokio::test]
    async fn join_state_is_per_connection() {
        let registry = SessionRegistry::new();
        let (tx1, _rx1) = unbounded_channel();
        let (tx2, _rx2) = unbounded_channel();

        let first = registry.connect(7, tx1).await;
        registry.join_room(7, first, "room_3_7").await;
        assert!(registry.is_joined(7, "room_3_7").await);

        // a replacement session starts with no joined rooms
        let second = registry.connect(7, tx2).await;
        assert!(!registry.is_joined(7, "room_3_7").await);

        // the stale connection cannot mutate the new session
        registry.join_room(7, first, "room_3_7").await;
        assert!(!registry.is_joined(7, "room_3_7").await);

        registry.join_room(7, second, "room_3_7").await;
        registry.leave_room(7, second, "room_3_7").await;
        assert!(!registry.is_joined(7, "room_3_7").await);
    }

    #[tokio::test]
    async fn room_broadcast_reaches_joined_sessions_only() {
        let registry = SessionRegistry::new();
        let (tx1, mut rx1) = unbounded_channel();
        let (tx2, mut rx2) = unbounded_channel();
        let (tx3, mut rx3) = unbounded_channel();

        let a = registry.connect(1, tx1).await;
        let b = registry.connect(2, tx2).await;
        registry.connect(3, tx3).await;

        registry.join_room(1, a, "room_1_2").await;
        registry.join_room(2, b, "room_1_2").await;

        registry.broadcast_to_room("room_1_2", &ServerEvent::Left { status: "ok".to_string(), room_id: "room_1_2".to_string() }).await;
        assert!(rx1.try_recv().is_ok());
        assert!(rx2.try_recv().is_ok());
        assert!(rx3.try_recv().is_err());
    }
}
