//! Connection registry
//!
//! Tracks the currently connected clients. Purely in-memory; state is lost
//! on restart.

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tokio::sync::mpsc;

/// One live connection
#[derive(Debug, Clone)]
pub struct ConnectionEntry {
    pub connected_at: DateTime<Utc>,
    /// Serialized frames waiting for this connection's writer task
    pub outbox: mpsc::Sender<String>,
}

#[derive(Debug, Default)]
pub struct ConnectionRegistry {
    entries: HashMap<String, ConnectionEntry>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a connection stamped now
    ///
    /// Registering an id that is already present leaves the existing entry
    /// untouched and returns `false`.
    pub fn register(&mut self, conn_id: &str, outbox: mpsc::Sender<String>) -> bool {
        if self.entries.contains_key(conn_id) {
            return false;
        }
        self.entries.insert(
            conn_id.to_string(),
            ConnectionEntry {
                connected_at: Utc::now(),
                outbox,
            },
        );
        true
    }

    /// Remove a connection; no-op if absent
    pub fn unregister(&mut self, conn_id: &str) -> Option<ConnectionEntry> {
        self.entries.remove(conn_id)
    }

    pub fn get(&self, conn_id: &str) -> Option<&ConnectionEntry> {
        self.entries.get(conn_id)
    }

    pub fn contains(&self, conn_id: &str) -> bool {
        self.entries.contains_key(conn_id)
    }

    /// Number of live connections (informational only)
    pub fn count(&self) -> usize {
        self.entries.len()
    }
}
