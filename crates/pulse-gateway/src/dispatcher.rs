use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tokio::sync::{RwLock, mpsc};
use tracing::debug;
use uuid::Uuid;

use pulse_types::events::GatewayEvent;

/// Room key for an idea. Rooms are ephemeral grouping keys; membership lives
/// and dies with the connection.
pub fn idea_room(idea_id: i64) -> String {
    format!("idea_{idea_id}")
}

/// Connection registry and fan-out. Owns the only maps from connection to
/// {identity, rooms} and from room to members; raw senders never leave it.
#[derive(Clone)]
pub struct Dispatcher {
    registry: Arc<RwLock<Registry>>,
}

#[derive(Default)]
struct Registry {
    connections: HashMap<Uuid, ConnEntry>,
    rooms: HashMap<String, HashSet<Uuid>>,
}

struct ConnEntry {
    /// Resolved once at connect time; `None` for anonymous viewers.
    user_id: Option<i64>,
    rooms: HashSet<String>,
    tx: mpsc::UnboundedSender<GatewayEvent>,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self {
            registry: Arc::new(RwLock::new(Registry::default())),
        }
    }

    /// Register a new connection. Returns its id and the receiving end of
    /// its event channel. Anonymous connections are first-class: they can
    /// join rooms and receive everything, they just carry no identity.
    pub async fn register(
        &self,
        user_id: Option<i64>,
    ) -> (Uuid, mpsc::UnboundedReceiver<GatewayEvent>) {
        let conn_id = Uuid::new_v4();
        let (tx, rx) = mpsc::unbounded_channel();
        self.registry.write().await.connections.insert(
            conn_id,
            ConnEntry {
                user_id,
                rooms: HashSet::new(),
                tx,
            },
        );
        (conn_id, rx)
    }

    /// Idempotent room join; joining twice is a no-op.
    pub async fn join(&self, conn_id: Uuid, idea_id: i64) {
        let room = idea_room(idea_id);
        let mut reg = self.registry.write().await;
        let Some(entry) = reg.connections.get_mut(&conn_id) else {
            return;
        };
        entry.rooms.insert(room.clone());
        reg.rooms.entry(room).or_default().insert(conn_id);
    }

    /// Idempotent room leave; leaving a room the connection never joined is
    /// a no-op.
    pub async fn leave(&self, conn_id: Uuid, idea_id: i64) {
        let room = idea_room(idea_id);
        let mut reg = self.registry.write().await;
        if let Some(entry) = reg.connections.get_mut(&conn_id) {
            entry.rooms.remove(&room);
        }
        if let Some(members) = reg.rooms.get_mut(&room) {
            members.remove(&conn_id);
            if members.is_empty() {
                reg.rooms.remove(&room);
            }
        }
    }

    /// Remove the connection and all its room memberships. Publishes racing
    /// with the removal either see the connection or they don't; a send to
    /// an already-dropped channel is ignored.
    pub async fn unregister(&self, conn_id: Uuid) {
        let mut reg = self.registry.write().await;
        let Some(entry) = reg.connections.remove(&conn_id) else {
            return;
        };
        for room in entry.rooms {
            if let Some(members) = reg.rooms.get_mut(&room) {
                members.remove(&conn_id);
                if members.is_empty() {
                    reg.rooms.remove(&room);
                }
            }
        }
    }

    /// Deliver an event to every connection currently in `room`. Sends go
    /// through unbounded per-connection channels, so a stalled subscriber
    /// never blocks the publisher; its socket task drops it instead.
    /// Publishes to the same room keep program order because the sends
    /// happen under the registry lock.
    pub async fn publish(&self, room: &str, event: GatewayEvent) {
        let reg = self.registry.read().await;
        let Some(members) = reg.rooms.get(room) else {
            return;
        };
        for conn_id in members {
            if let Some(entry) = reg.connections.get(conn_id) {
                if entry.tx.send(event.clone()).is_err() {
                    debug!("Dropping event for closed connection {}", conn_id);
                }
            }
        }
    }

    /// Deliver an event to every live connection regardless of rooms.
    pub async fn broadcast_all(&self, event: GatewayEvent) {
        let reg = self.registry.read().await;
        for (conn_id, entry) in reg.connections.iter() {
            if entry.tx.send(event.clone()).is_err() {
                debug!("Dropping broadcast for closed connection {}", conn_id);
            }
        }
    }

    /// Identity bound to a connection at registration, if any.
    pub async fn connection_user(&self, conn_id: Uuid) -> Option<i64> {
        self.registry
            .read()
            .await
            .connections
            .get(&conn_id)
            .and_then(|entry| entry.user_id)
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}
