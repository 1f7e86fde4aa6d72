//! Relay hub: connection registry plus room table behind one lock
//!
//! Keeping both tables under a single `RwLock` makes disconnect atomic:
//! a connection and all of its room memberships disappear in the same
//! critical section, so no broadcast can observe a membership whose
//! connection is already gone.
//!
//! Delivery is at-most-once. Each connection has a bounded outbox drained
//! by its writer task; a frame that does not fit is dropped and logged.

use serde::Serialize;
use tokio::sync::{mpsc, RwLock};
use tracing::{debug, warn};
use trackit_common::events::Frame;

use super::registry::ConnectionRegistry;
use super::rooms::RoomTable;

/// Default outbox depth when none is configured
pub const DEFAULT_OUTBOX_CAPACITY: usize = 64;

#[derive(Debug, Default)]
struct HubState {
    registry: ConnectionRegistry,
    rooms: RoomTable,
}

/// Shared relay state, injected into the app through `AppState`
#[derive(Debug)]
pub struct RelayHub {
    state: RwLock<HubState>,
    outbox_capacity: usize,
}

impl RelayHub {
    pub fn new(outbox_capacity: usize) -> Self {
        Self {
            state: RwLock::new(HubState::default()),
            outbox_capacity: outbox_capacity.max(1),
        }
    }

    /// Register a connection and hand back the receiving end of its outbox
    ///
    /// Returns `None` if the id is already registered; the existing
    /// connection keeps its outbox.
    pub async fn register(&self, conn_id: &str) -> Option<mpsc::Receiver<String>> {
        let (tx, rx) = mpsc::channel(self.outbox_capacity);
        let mut state = self.state.write().await;
        if state.registry.register(conn_id, tx) {
            debug!(conn_id, connections = state.registry.count(), "Connection registered");
            Some(rx)
        } else {
            None
        }
    }

    /// Remove a connection and every room membership it holds
    pub async fn unregister(&self, conn_id: &str) -> bool {
        let mut state = self.state.write().await;
        let removed = state.registry.unregister(conn_id).is_some();
        let rooms = state.rooms.remove_connection(conn_id);
        if removed {
            debug!(
                conn_id,
                rooms_left = rooms.len(),
                connections = state.registry.count(),
                "Connection unregistered"
            );
        }
        removed
    }

    /// Add a connection to a room
    ///
    /// Unknown connections are ignored so that no membership can exist
    /// without a live connection behind it.
    pub async fn join(&self, conn_id: &str, room: &str) -> bool {
        let mut state = self.state.write().await;
        if !state.registry.contains(conn_id) {
            debug!(conn_id, room, "Join ignored for unknown connection");
            return false;
        }
        let added = state.rooms.join(conn_id, room);
        debug!(conn_id, room, added, "Joined room");
        added
    }

    pub async fn leave(&self, conn_id: &str, room: &str) -> bool {
        let removed = self.state.write().await.rooms.leave(conn_id, room);
        debug!(conn_id, room, removed, "Left room");
        removed
    }

    /// Deliver an event to every member of `room`, optionally skipping one
    ///
    /// Returns the number of connections the frame was queued for.
    pub async fn broadcast(
        &self,
        room: &str,
        event: &str,
        payload: &impl Serialize,
        exclude: Option<&str>,
    ) -> usize {
        let Some(text) = encode(event, payload) else {
            return 0;
        };

        let state = self.state.read().await;
        let mut delivered = 0;
        for member in state.rooms.members(room) {
            if exclude == Some(member.as_str()) {
                continue;
            }
            if let Some(entry) = state.registry.get(&member) {
                if queue(&member, &entry.outbox, text.clone()) {
                    delivered += 1;
                }
            }
        }

        debug!(room, event, recipients = delivered, "Broadcast event to room");
        delivered
    }

    /// Deliver an event to a single connection
    pub async fn send_to(&self, conn_id: &str, event: &str, payload: &impl Serialize) -> bool {
        let Some(text) = encode(event, payload) else {
            return false;
        };

        let state = self.state.read().await;
        match state.registry.get(conn_id) {
            Some(entry) => queue(conn_id, &entry.outbox, text),
            None => false,
        }
    }

    /// Number of live connections
    pub async fn count(&self) -> usize {
        self.state.read().await.registry.count()
    }

    pub async fn members(&self, room: &str) -> Vec<String> {
        self.state.read().await.rooms.members(room)
    }

    pub async fn rooms_of(&self, conn_id: &str) -> Vec<String> {
        self.state.read().await.rooms.rooms_of(conn_id)
    }

    pub async fn is_registered(&self, conn_id: &str) -> bool {
        self.state.read().await.registry.contains(conn_id)
    }
}

impl Default for RelayHub {
    fn default() -> Self {
        Self::new(DEFAULT_OUTBOX_CAPACITY)
    }
}

fn encode(event: &str, payload: &impl Serialize) -> Option<String> {
    match Frame::new(event, payload).and_then(|frame| frame.to_text()) {
        Ok(text) => Some(text),
        Err(e) => {
            warn!(event, error = %e, "Failed to serialize event");
            None
        }
    }
}

fn queue(conn_id: &str, outbox: &mpsc::Sender<String>, text: String) -> bool {
    match outbox.try_send(text) {
        Ok(()) => true,
        Err(mpsc::error::TrySendError::Full(_)) => {
            warn!(conn_id, "Outbox full, frame dropped");
            false
        }
        Err(mpsc::error::TrySendError::Closed(_)) => {
            debug!(conn_id, "Outbox closed, frame dropped");
            false
        }
    }
}
